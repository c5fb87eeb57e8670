//! Domain layer - Cluster identity types and collaborator ports
//!
//! This module defines the traits (ports) the startup sequence depends on,
//! following hexagonal architecture principles.

pub mod ports;

pub use ports::*;
