//! Value serialization.
//!
//! Both tiers store showcase records as JSON so that the shared remote tier
//! stays readable by other tooling and so a value serialized once can be
//! written to every layer without re-encoding.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use showcase_core::Raw;
use thiserror::Error;

/// Serialization failure.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Value could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// Stored bytes could not be decoded into the requested type.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// JSON format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl JsonFormat {
    /// Encodes `value` as JSON bytes.
    pub fn serialize<T>(&self, value: &T) -> Result<Raw, FormatError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_vec(value)
            .map(Bytes::from)
            .map_err(|err| FormatError::Serialize(Box::new(err)))
    }

    /// Decodes JSON bytes into `T`.
    pub fn deserialize<T>(&self, data: &[u8]) -> Result<T, FormatError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(data).map_err(|err| FormatError::Deserialize(Box::new(err)))
    }
}
