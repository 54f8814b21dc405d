//! Storage keys for showcase records.
//!
//! Keys have three components:
//!
//! 1. **Namespace** - groups showcase entries inside a shared store
//! 2. **Version** - bumped whenever the stored record shape changes incompatibly
//! 3. **Date** - the [`DateKey`] the record belongs to
//!
//! When serialized to string, keys follow the format
//! `{namespace}:v{version}:{date}`:
//!
//! ```
//! use showcase_core::{DateKey, ShowcaseKey};
//!
//! let key = ShowcaseKey::new("daily-showcase", 1, DateKey::parse("2024-03-01").unwrap());
//! assert_eq!(key.to_string(), "daily-showcase:v1:2024-03-01");
//! ```
//!
//! Entries written under an older version are never read back by a newer
//! deployment; they age out of the shared tier by TTL.

use std::fmt;

use smol_str::SmolStr;

use crate::DateKey;

/// Default namespace for showcase records in shared stores.
pub const DEFAULT_NAMESPACE: &str = "daily-showcase";

/// Version of the [`ShowcaseRecord`](crate::ShowcaseRecord) layout.
pub const RECORD_VERSION: u32 = 1;

/// A namespaced, versioned key identifying one day's showcase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShowcaseKey {
    namespace: SmolStr,
    version: u32,
    date: DateKey,
}

impl ShowcaseKey {
    /// Creates a key from its parts.
    pub fn new(namespace: impl Into<SmolStr>, version: u32, date: DateKey) -> Self {
        Self {
            namespace: namespace.into(),
            version,
            date,
        }
    }

    /// Creates a key with [`DEFAULT_NAMESPACE`] and [`RECORD_VERSION`].
    pub fn for_date(date: DateKey) -> Self {
        Self::new(DEFAULT_NAMESPACE, RECORD_VERSION, date)
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the record version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the date this key addresses.
    pub fn date(&self) -> &DateKey {
        &self.date
    }
}

impl fmt::Display for ShowcaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}:", self.namespace)?;
        }
        write!(f, "v{}:{}", self.version, self.date)
    }
}
