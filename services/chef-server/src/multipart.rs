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

//! `multipart/form-data` encoding.
//!
//! A body is a list of parts followed by a closing boundary:
//!
//! ```text
//! --<B>\r\nContent-Disposition: form-data; name="<n>"\r\n\r\n<value>\r\n
//! --<B>\r\nContent-Disposition: form-data; name="<n>"; filename="<f>"\r\n
//! Content-Length: <len>\r\nContent-Type: <mime>\r\n
//! Content-Transfer-Encoding: binary\r\n\r\n<file bytes>\r\n
//! --<B>--\r\n\r\n
//! ```
//!
//! File content is never buffered: [`MultipartReader`] pulls it from the
//! caller's [`FileStream`] only when the reader gets there.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read};

use bytes::Bytes;
use chefapi_core::hash::base64_sha1_reader;
use chefapi_core::{Body, Error, Result};
use log::debug;

use crate::body::{FileStream, FormValue};
use crate::constants::{APPLICATION_OCTET_STREAM, MULTIPART_BOUNDARY};

const FILE_PART_FOOTER: &[u8] = b"\r\n";

#[derive(Debug, Clone)]
enum Part {
    Param(Bytes),
    File { head: Bytes, stream: FileStream },
    Ending(Bytes),
}

impl Part {
    fn param(name: &str, value: &str) -> Self {
        Part::Param(Bytes::from(format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{}\"\r\n\r\n\
             {value}\r\n",
            escape(name)
        )))
    }

    fn file(name: &str, stream: FileStream) -> Self {
        let filename = stream.filename().unwrap_or(name);
        let mime = mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(APPLICATION_OCTET_STREAM);

        let head = format!(
            "--{MULTIPART_BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
             Content-Length: {}\r\n\
             Content-Type: {mime}\r\n\
             Content-Transfer-Encoding: binary\r\n\r\n",
            escape(name),
            stream.len(),
        );

        Part::File {
            head: Bytes::from(head),
            stream,
        }
    }

    fn ending() -> Self {
        Part::Ending(Bytes::from(format!("--{MULTIPART_BOUNDARY}--\r\n\r\n")))
    }

    fn len(&self) -> u64 {
        match self {
            Part::Param(bs) | Part::Ending(bs) => bs.len() as u64,
            Part::File { head, stream } => {
                head.len() as u64 + stream.len() + FILE_PART_FOOTER.len() as u64
            }
        }
    }
}

/// Form field names are escaped like query values (`a b` becomes `a+b`).
fn escape(name: &str) -> String {
    form_urlencoded::byte_serialize(name.as_bytes()).collect()
}

/// Multipart is an encoded `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct Multipart {
    parts: Vec<Part>,
}

impl Multipart {
    /// Encode `fields` in order. Files become file parts, everything else a
    /// plain parameter.
    pub fn new(fields: &[(String, FormValue)]) -> Self {
        let mut parts: Vec<Part> = fields
            .iter()
            .map(|(name, value)| match value {
                FormValue::Text(v) => Part::param(name, v),
                FormValue::File(stream) => Part::file(name, stream.clone()),
            })
            .collect();
        parts.push(Part::ending());

        Self { parts }
    }

    /// Value of the `Content-Type` header.
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
    }

    /// Exact number of bytes [`reader`](Self::reader) yields.
    pub fn content_length(&self) -> u64 {
        self.parts.iter().map(Part::len).sum()
    }

    /// The first file of this body, if there is one.
    pub fn first_file(&self) -> Option<&FileStream> {
        self.parts.iter().find_map(|p| match p {
            Part::File { stream, .. } => Some(stream),
            _ => None,
        })
    }

    /// Content hash used for signing.
    ///
    /// Only the first uploaded file is hashed unless `full_body` is set. A
    /// body without any file always hashes the whole envelope.
    pub fn content_hash(&self, full_body: bool) -> Result<String> {
        if !full_body {
            if let Some(file) = self.first_file() {
                debug!("hashing multipart file part only");
                return file.content_hash();
            }
        }

        let hash = base64_sha1_reader(&mut self.reader())
            .map_err(|e| Error::request_invalid("failed to hash multipart body").with_source(e));
        self.rewind()?;
        hash
    }

    /// Lazy reader over the whole body.
    pub fn reader(&self) -> MultipartReader {
        let mut segments = VecDeque::with_capacity(self.parts.len() + 2);
        for part in &self.parts {
            match part {
                Part::Param(bs) | Part::Ending(bs) => {
                    segments.push_back(Segment::Bytes(Cursor::new(bs.clone())))
                }
                Part::File { head, stream } => {
                    segments.push_back(Segment::Bytes(Cursor::new(head.clone())));
                    segments.push_back(Segment::File(stream.clone()));
                    segments.push_back(Segment::Bytes(Cursor::new(Bytes::from_static(
                        FILE_PART_FOOTER,
                    ))));
                }
            }
        }

        MultipartReader { segments }
    }

    /// Rewind every file of this body.
    pub fn rewind(&self) -> Result<()> {
        self.parts.iter().try_for_each(|p| match p {
            Part::File { stream, .. } => stream.rewind(),
            _ => Ok(()),
        })
    }

    /// Wire body streaming this multipart body.
    pub fn to_body(&self) -> Body {
        Body::stream(self.reader(), self.content_length())
    }
}

enum Segment {
    Bytes(Cursor<Bytes>),
    File(FileStream),
    Open(Box<dyn Read + Send>),
}

/// MultipartReader reads the parts of a [`Multipart`] one after another.
///
/// A file is rewound and opened only once the reader reaches it.
pub struct MultipartReader {
    segments: VecDeque<Segment>,
}

impl Read for MultipartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(segment) = self.segments.front_mut() {
            let n = match segment {
                Segment::Bytes(c) => c.read(buf)?,
                Segment::Open(r) => r.read(buf)?,
                Segment::File(stream) => {
                    let r = stream.reader().map_err(io::Error::other)?;
                    *segment = Segment::Open(Box::new(r));
                    continue;
                }
            };
            if n > 0 {
                return Ok(n);
            }
            self.segments.pop_front();
        }

        Ok(0)
    }
}
