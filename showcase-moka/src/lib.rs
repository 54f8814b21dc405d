//! Process-local showcase tier backed by [Moka](https://docs.rs/moka).
//!
//! Entries are destroyed on process restart and are never shared between
//! processes; pair this tier with `showcase-redis` through
//! [`CompositionBackend`](showcase_backend::CompositionBackend).
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::MokaBackendBuilder;
pub use moka::policy::EvictionPolicy;
