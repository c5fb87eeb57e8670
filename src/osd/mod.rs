//! OSD Daemon Module
//!
//! Configuration, startup orchestration and the default agent of the
//! storage-node daemon.

pub mod agent;
pub mod config;
pub mod orchestrator;

pub use agent::*;
pub use config::*;
pub use orchestrator::*;
