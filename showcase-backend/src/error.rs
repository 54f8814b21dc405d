//! Error types for backend operations.

use crate::format::FormatError;
use thiserror::Error;

/// Error type for backend operations.
///
/// This enum categorizes errors that can occur during cache tier interactions
/// into distinct groups for appropriate handling.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote tiers, timeouts included.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),

    /// Serialization or deserialization error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

impl BackendError {
    /// Short, stable name of the error group, used as a metrics/log label.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::InternalError(_) => "internal",
            BackendError::ConnectionError(_) => "connection",
            BackendError::FormatError(_) => "format",
        }
    }
}
