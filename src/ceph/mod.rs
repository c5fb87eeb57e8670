//! Ceph helpers
//!
//! Default formatters and parsers for ceph specific strings:
//! - CRUSH location tokens
//! - Monitor endpoint lists

pub mod crush;
pub mod mon;

pub use crush::*;
pub use mon::*;
