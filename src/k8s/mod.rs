//! Kubernetes integration
//!
//! Client construction and ConfigMap-backed configuration storage.

pub mod client;
pub mod kvstore;

pub use client::*;
pub use kvstore::*;
