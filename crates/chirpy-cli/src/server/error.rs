//! Server error types.

use std::io;

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server stopped with an error after it started.
    #[error("server runtime error: {0}")]
    Runtime(#[source] io::Error),
}

impl ServerError {
    /// Returns a human-readable hint for resolving the error, if any.
    pub fn suggestion(&self) -> Option<&'static str> {
        let (Self::Bind { source, .. } | Self::Runtime(source)) = self;
        match source.kind() {
            io::ErrorKind::PermissionDenied => {
                Some("Try using a port above 1024 or run with appropriate privileges")
            }
            io::ErrorKind::AddrInUse => Some(
                "The port is already in use. Try a different port or stop the conflicting service",
            ),
            io::ErrorKind::AddrNotAvailable => {
                Some("The address is not available. Check network interface configuration")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_in_use_has_suggestion() {
        let error = ServerError::Bind {
            address: "127.0.0.1:8080".to_owned(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(error.suggestion().is_some());
        assert!(error.to_string().contains("127.0.0.1:8080"));
    }

    #[test]
    fn unknown_runtime_error_has_no_suggestion() {
        let error = ServerError::Runtime(io::Error::other("boom"));
        assert!(error.suggestion().is_none());
    }
}
