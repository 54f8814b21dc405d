//! Where a showcase response came from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The layer that produced a showcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    /// Process-local tier.
    Memory,
    /// Shared remote tier.
    Remote,
    /// Origin database (cold read).
    Origin,
}

impl CacheSource {
    /// Returns the wire name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSource::Memory => "memory",
            CacheSource::Remote => "remote",
            CacheSource::Origin => "origin",
        }
    }
}

impl fmt::Display for CacheSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
