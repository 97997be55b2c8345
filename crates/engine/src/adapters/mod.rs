//! Reference implementations of the lookup contracts.

pub mod memory;

pub use memory::{InMemoryCertificateStore, InMemoryCrlStore};
