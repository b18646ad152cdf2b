// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use chefapi_core::hash::{base64_sha1, base64_sha1_reader};
use chefapi_core::{Error, Result};
use serde::Serialize;

use crate::multipart::Multipart;

trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// FileStream is a caller-owned, seekable source of bytes.
///
/// Clones share the same underlying reader and cursor. Every read starts
/// from the position the stream had when it was created, and the stream is
/// rewound to that position once a request is done with it.
#[derive(Clone)]
pub struct FileStream {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
    filename: Option<String>,
    start: u64,
    length: u64,
}

impl Debug for FileStream {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStream")
            .field("filename", &self.filename)
            .field("start", &self.start)
            .field("length", &self.length)
            .finish()
    }
}

impl FileStream {
    /// Open the file at `path` for streaming.
    ///
    /// The file name is advertised in multipart uploads.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::request_invalid(format!("failed to open {}", path.display())).with_source(e)
        })?;
        let stream = Self::new(file)?;

        Ok(match path.file_name() {
            Some(name) => stream.with_filename(name.to_string_lossy()),
            None => stream,
        })
    }

    /// Wrap any seekable reader. Its length is everything between the
    /// current position and the end.
    pub fn new(mut reader: impl Read + Seek + Send + 'static) -> Result<Self> {
        let (start, end) = measure(&mut reader)
            .map_err(|e| Error::request_invalid("failed to measure stream length").with_source(e))?;

        Ok(Self {
            inner: Arc::new(Mutex::new(Box::new(reader))),
            filename: None,
            start,
            length: end.saturating_sub(start),
        })
    }

    /// Set the file name advertised in multipart uploads.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// File name of this stream, if known.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Number of bytes this stream yields.
    pub fn len(&self) -> u64 {
        self.length
    }

    /// Check if this stream yields no bytes.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Move the cursor back to where this stream started.
    pub fn rewind(&self) -> Result<()> {
        self.lock()
            .seek(SeekFrom::Start(self.start))
            .map_err(|e| Error::request_invalid("failed to rewind stream").with_source(e))?;
        Ok(())
    }

    /// A reader over exactly [`len`](Self::len) bytes from the start.
    ///
    /// The stream is rewound first.
    pub fn reader(&self) -> Result<impl Read + Send + 'static> {
        self.rewind()?;
        Ok(StreamReader {
            inner: self.inner.clone(),
        }
        .take(self.length))
    }

    /// Base64 SHA-1 of the stream content. The stream is rewound afterwards.
    pub fn content_hash(&self) -> Result<String> {
        let hash = base64_sha1_reader(&mut self.reader()?)
            .map_err(|e| Error::request_invalid("failed to hash stream").with_source(e));
        self.rewind()?;
        hash
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn ReadSeek>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Returns the current position and the end of `r`, leaving the cursor
/// where it was.
fn measure(r: &mut impl Seek) -> io::Result<(u64, u64)> {
    let start = r.stream_position()?;
    let end = r.seek(SeekFrom::End(0))?;
    r.seek(SeekFrom::Start(start))?;
    Ok((start, end))
}

struct StreamReader {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
}

impl Read for StreamReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .read(buf)
    }
}

/// Value of one multipart form field.
#[derive(Debug, Clone)]
pub enum FormValue {
    /// Plain text field.
    Text(String),
    /// File upload.
    File(FileStream),
}

impl From<&str> for FormValue {
    fn from(v: &str) -> Self {
        FormValue::Text(v.to_string())
    }
}

impl From<String> for FormValue {
    fn from(v: String) -> Self {
        FormValue::Text(v)
    }
}

impl From<FileStream> for FormValue {
    fn from(v: FileStream) -> Self {
        FormValue::File(v)
    }
}

/// Body of a request to the Chef Server.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// In-memory body, usually JSON.
    Bytes(Bytes),
    /// Body streamed from a file.
    Stream(FileStream),
    /// Ordered form fields, sent as `multipart/form-data`.
    Form(Vec<(String, FormValue)>),
}

impl RequestBody {
    /// Serialize `value` into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bs = serde_json::to_vec(value).map_err(|e| {
            Error::request_invalid("failed to serialize request body").with_source(e)
        })?;
        Ok(RequestBody::Bytes(Bytes::from(bs)))
    }

    /// Build a form body from `(name, value)` pairs, keeping their order.
    pub fn form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FormValue>,
    {
        RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Base64 SHA-1 of this body as it is signed.
    ///
    /// Form bodies follow [`Multipart::content_hash`]. Streams are rewound
    /// afterwards.
    pub fn content_hash(&self, sign_full_body: bool) -> Result<String> {
        match self {
            RequestBody::Empty => Ok(base64_sha1(b"")),
            RequestBody::Bytes(bs) => Ok(base64_sha1(bs)),
            RequestBody::Stream(s) => s.content_hash(),
            RequestBody::Form(fields) => Multipart::new(fields).content_hash(sign_full_body),
        }
    }

    /// Rewind every stream this body borrows.
    pub fn rewind(&self) -> Result<()> {
        match self {
            RequestBody::Stream(s) => s.rewind(),
            RequestBody::Form(fields) => fields.iter().try_for_each(|(_, v)| match v {
                FormValue::File(s) => s.rewind(),
                FormValue::Text(_) => Ok(()),
            }),
            RequestBody::Empty | RequestBody::Bytes(_) => Ok(()),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(v: &str) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(v.as_bytes()))
    }
}

impl From<String> for RequestBody {
    fn from(v: String) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<Bytes> for RequestBody {
    fn from(v: Bytes) -> Self {
        RequestBody::Bytes(v)
    }
}

impl From<FileStream> for RequestBody {
    fn from(v: FileStream) -> Self {
        RequestBody::Stream(v)
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(v: serde_json::Value) -> Self {
        RequestBody::Bytes(Bytes::from(v.to_string()))
    }
}
