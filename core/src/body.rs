use std::fmt::{Debug, Formatter};
use std::io::Read;

use bytes::Bytes;

/// Body is the payload handed to [`HttpSend`](crate::HttpSend) for one
/// exchange.
///
/// Streams carry their exact length up front so the sender can set
/// `Content-Length` without reading the stream first.
pub enum Body {
    /// No payload at all.
    Empty,
    /// In-memory payload.
    Bytes(Bytes),
    /// Payload pulled lazily from `reader`, exactly `length` bytes long.
    Stream {
        /// Source of the payload.
        reader: Box<dyn Read + Send>,
        /// Number of bytes `reader` yields before EOF.
        length: u64,
    },
}

impl Body {
    /// Build a streaming body.
    pub fn stream(reader: impl Read + Send + 'static, length: u64) -> Self {
        Body::Stream {
            reader: Box::new(reader),
            length,
        }
    }

    /// Length of this body in bytes.
    pub fn len(&self) -> u64 {
        match self {
            Body::Empty => 0,
            Body::Bytes(bs) => bs.len() as u64,
            Body::Stream { length, .. } => *length,
        }
    }

    /// Check if this body has no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain the body into memory.
    ///
    /// Only meant for tests and small payloads: a stream body is read in full.
    pub fn into_bytes(self) -> std::io::Result<Bytes> {
        match self {
            Body::Empty => Ok(Bytes::new()),
            Body::Bytes(bs) => Ok(bs),
            Body::Stream { mut reader, length } => {
                let mut buf = Vec::with_capacity(length as usize);
                reader.read_to_end(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::Empty
    }
}

impl From<Bytes> for Body {
    fn from(bs: Bytes) -> Self {
        Body::Bytes(bs)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bs: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bs))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Bytes(Bytes::from(s))
    }
}

impl Debug for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Bytes(bs) => f.debug_tuple("Bytes").field(&bs.len()).finish(),
            Body::Stream { length, .. } => {
                f.debug_struct("Stream").field("length", length).finish()
            }
        }
    }
}
