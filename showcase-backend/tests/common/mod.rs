#![allow(dead_code)]

mod test_backend;

pub use test_backend::{ErrorBackend, TestBackend};
