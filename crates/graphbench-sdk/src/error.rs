//! Error types for the graphbench SDK

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to a graph store
#[derive(Error, Debug)]
pub enum ClientError {
    /// The store rejected or failed to evaluate a traversal
    #[error("Query error: {0}")]
    QueryError(String),

    /// The store is unreachable or the session was closed
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The store answered with something we could not decode
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The request did not complete within the configured deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// A request that died below HTTP: refused, reset or dropped before a full
/// response arrived. Timeouts and undecodable bodies are not included.
pub(crate) fn is_transport_failure(err: &reqwest::Error) -> bool {
    !err.is_timeout()
        && !err.is_status()
        && !err.is_decode()
        && (err.is_connect() || err.is_request() || err.is_body())
}

impl ClientError {
    /// Whether this error means the store itself is gone (as opposed to a
    /// single traversal failing).
    pub fn is_connection_error(&self) -> bool {
        match self {
            ClientError::ConnectionError(_) => true,
            ClientError::HttpError(e) => is_transport_failure(e),
            _ => false,
        }
    }

    /// Whether this error is a request deadline expiry.
    pub fn is_timeout(&self) -> bool {
        match self {
            ClientError::Timeout(_) => true,
            ClientError::HttpError(e) => e.is_timeout(),
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ClientError::ConnectionError("refused".into()).is_connection_error());
        assert!(!ClientError::QueryError("bad step".into()).is_connection_error());
        assert!(ClientError::Timeout(Duration::from_millis(5)).is_timeout());
        assert!(!ClientError::ProtocolError("garbage".into()).is_timeout());
    }
}
