use std::fmt;

use http::StatusCode;
use thiserror::Error;

/// The error type for chefapi operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Private key is missing, unreadable or can't be parsed.
    KeyInvalid,

    /// Path and endpoint don't combine into a valid URI.
    UriInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Request cannot be built or signed (invalid header, unreadable body, etc.)
    RequestInvalid,

    /// Server answered 400.
    BadRequest,

    /// Server answered 401.
    Unauthorized,

    /// Server answered 403.
    Forbidden,

    /// Server answered 404.
    NotFound,

    /// Server answered 405.
    MethodNotAllowed,

    /// Server answered 406.
    NotAcceptable,

    /// Server answered 504.
    GatewayTimeout,

    /// Server answered 5xx, or could not be reached at all.
    ServerUnavailable,

    /// Server answered with a status we don't handle.
    UnrecognizedStatus,

    /// Unexpected errors (I/O, malformed responses, etc.)
    Unexpected,
}

impl ErrorKind {
    /// Map a non-success HTTP status into its error kind.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => ErrorKind::BadRequest,
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            405 => ErrorKind::MethodNotAllowed,
            406 => ErrorKind::NotAcceptable,
            504 => ErrorKind::GatewayTimeout,
            500..=599 => ErrorKind::ServerUnavailable,
            _ => ErrorKind::UnrecognizedStatus,
        }
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create an error for the given HTTP status, carrying the message the
    /// server sent back.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::from_status(status), message).with_status(status)
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach the HTTP status that caused this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Check if the server reported the resource as missing.
    ///
    /// Delete-style callers usually treat this as success.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Check if this error came from the server side or the network, so the
    /// same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ServerUnavailable | ErrorKind::GatewayTimeout
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a key invalid error
    pub fn key_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyInvalid, message)
    }

    /// Create an uri invalid error
    pub fn uri_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UriInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a server unavailable error
    pub fn server_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerUnavailable, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::KeyInvalid => write!(f, "invalid private key"),
            ErrorKind::UriInvalid => write!(f, "invalid uri"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::BadRequest => write!(f, "bad request"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::Forbidden => write!(f, "forbidden"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::MethodNotAllowed => write!(f, "method not allowed"),
            ErrorKind::NotAcceptable => write!(f, "not acceptable"),
            ErrorKind::GatewayTimeout => write!(f, "gateway timeout"),
            ErrorKind::ServerUnavailable => write!(f, "server unavailable"),
            ErrorKind::UnrecognizedStatus => write!(f, "unrecognized status"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::uri_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUriParts> for Error {
    fn from(err: http::uri::InvalidUriParts) -> Self {
        Self::uri_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
