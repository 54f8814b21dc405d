//! Traits and structs for showcase cache tiers.
//!
//! A tier is anything that can store [`CacheValue<Raw>`](showcase_core::CacheValue)
//! under a [`ShowcaseKey`](showcase_core::ShowcaseKey). The process-local tier
//! lives in `showcase-moka`, the shared remote tier in `showcase-redis`; this
//! crate defines the [`Backend`] contract they implement and the
//! [`CompositionBackend`] that layers them.
mod backend;
pub mod composition;
mod error;
pub mod format;
pub mod metrics;

pub use backend::{Admissible, Backend, BackendResult, CacheBackend};
pub use composition::{CompositionBackend, Layer, Layered};
pub use error::BackendError;
pub use format::{FormatError, JsonFormat};
