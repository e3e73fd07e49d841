use std::fmt;

/// Crate-wide error type for the document engine and the storage layer beneath it.
///
/// A flat enum plus a `CResult<T>` alias, with variants chosen to match the
/// error kinds the write path and replication protocol need to distinguish.
#[derive(Debug)]
pub enum Error {
    /// A read against a key that has no document.
    NotFound,
    /// A CAS precondition (local or remote-apply) did not hold.
    Conflict(String),
    /// A change record or request body failed validation before reaching the engine.
    InvalidPayload(String),
    /// Missing or invalid bearer token on an inbound request.
    Unauthorized,
    /// A single replication fan-out arm exceeded its per-peer timeout.
    Timeout,
    /// Underlying KV or filesystem failure.
    Io(String),
}

pub type CResult<T> = Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "not found"),
            Error::Conflict(msg) => write!(f, "conflict: {}", msg),
            Error::InvalidPayload(msg) => write!(f, "invalid payload: {}", msg),
            Error::Unauthorized => write!(f, "unauthorized"),
            Error::Timeout => write!(f, "timeout"),
            Error::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidPayload(err.to_string())
    }
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}
