//! Error types for the roadfork toolkit.
//!
//! The intersection algorithms themselves have no recoverable failure modes;
//! errors arise at the edges, when a map bundle is loaded or a debug sink is
//! opened.

use std::fmt;

/// Main error type for roadfork operations
#[derive(Debug)]
pub enum Error {
    /// Map bundle failed structural validation
    InvalidBundle(String),

    /// A way or restriction references a node that was never declared
    UnknownNode(u32),

    /// File I/O error
    Io(std::io::Error),

    /// JSON (de)serialization error
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidBundle(msg) => {
                write!(f, "Invalid map bundle: {msg}")
            }
            Error::UnknownNode(id) => {
                write!(f, "Unknown node id {id}")
            }
            Error::Io(err) => {
                write!(f, "I/O error: {err}")
            }
            Error::Json(err) => {
                write!(f, "JSON error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

/// Convenience result type for roadfork operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from(inner);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn bundle_errors_have_no_source() {
        let err = Error::InvalidBundle("way 3 references node 9".into());
        assert!(std::error::Error::source(&err).is_none());
        assert!(err.to_string().contains("way 3"));
    }
}
