//! Error types for the Redis REST backend.
//!
//! All errors convert to [`BackendError`]: transport failures (including
//! timeouts and non-2xx statuses) become
//! [`ConnectionError`](BackendError::ConnectionError), everything else
//! [`InternalError`](BackendError::InternalError).
//!
//! [`BackendError`]: showcase_backend::BackendError

use showcase_backend::BackendError;

/// Error type for Redis REST backend operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure: connect, timeout, body read.
    #[error("Redis REST request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Redis REST returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The server accepted the request but the command itself failed.
    #[error("Redis command failed: {0}")]
    Command(String),

    /// The reply did not have the expected shape.
    #[error("unexpected Redis REST reply: {0}")]
    Reply(String),

    /// Stored values must be UTF-8 strings on this protocol.
    #[error("cached value is not valid UTF-8")]
    NonUtf8Value,

    /// The endpoint URL or token is missing or unusable.
    #[error("invalid Redis REST configuration: {0}")]
    Config(String),
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        match error {
            Error::Http(_) | Error::Status { .. } => Self::ConnectionError(Box::new(error)),
            _ => Self::InternalError(Box::new(error)),
        }
    }
}
