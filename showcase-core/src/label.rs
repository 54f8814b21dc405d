//! Names for cache tiers.
//!
//! A tier reports its label through `Backend::label`. The composition joins
//! its own label with a tier's (`showcase.moka`, `showcase.redis`) so logs and
//! read/write counters say which layer of which cache answered.

use smol_str::SmolStr;
use std::fmt;

/// Name of one cache tier, or of a composed pair of tiers.
///
/// ```
/// use showcase_core::BackendLabel;
///
/// let cache = BackendLabel::from("showcase");
/// let local = cache.compose(&BackendLabel::new_static("moka"));
/// assert_eq!(local.as_str(), "showcase.moka");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BackendLabel(SmolStr);

impl BackendLabel {
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `self.tier`, the label a composed cache reports for one of its tiers.
    pub fn compose(&self, tier: &BackendLabel) -> Self {
        Self(smol_str::format_smolstr!("{}.{}", self.0, tier.0))
    }
}

impl fmt::Display for BackendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BackendLabel {
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}
