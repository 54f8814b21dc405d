//! Shared showcase tier speaking the Upstash-style Redis REST protocol.
//!
//! Every process instance talks to the same store, so a record written by
//! one instance is visible to all of them until its TTL elapses. Commands
//! are JSON arrays posted over HTTPS with a bearer token:
//!
//! - read: `POST /pipeline` with `[["GET", key], ["PTTL", key]]`
//! - write: `POST /` with `["SET", key, value, "EX", seconds]`
#![warn(missing_docs)]

pub mod backend;
pub mod error;

#[doc(inline)]
pub use crate::backend::{RedisBackend, RedisBackendBuilder};
#[doc(inline)]
pub use crate::error::Error;
