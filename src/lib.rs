//! Rook - storage daemon launcher
//!
//! Prepares and launches the storage-node daemon (OSD) of a Ceph cluster
//! managed on Kubernetes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                  rook osd  (flags / ROOK_* environment)               │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                       Startup Orchestrator                            │
//! │  validate flags → resolve devices → CRUSH location → cluster identity │
//! │                 → connect → construct agent → run                     │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌───────────┐  │
//! │  │  Kubernetes  │  │ CRUSH / Mon  │  │  ConfigMap   │  │ OSD Agent │  │
//! │  │  Connector   │  │   Parsers    │  │   KV Store   │  │           │  │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └───────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cmd`]: Command line interface
//! - [`osd`]: OSD configuration, startup orchestration and agent
//! - [`ceph`]: CRUSH location and monitor endpoint helpers
//! - [`k8s`]: Kubernetes connector and key-value stores
//! - [`domain`]: Cluster identity types and collaborator ports
//! - [`flags`]: Flag verification and startup logging
//! - [`error`]: Error types and handling

pub mod ceph;
pub mod cmd;
pub mod domain;
pub mod error;
pub mod flags;
pub mod k8s;
pub mod osd;

// Re-export commonly used types
pub use domain::ports::{
    AgentFactory, ClusterConnector, ClusterInfo, Context, KvStore, KvStoreRef, LocationFormatter,
    MonEndpointParser, MonInfo, NetworkInfo, OsdAgent,
};

pub use error::{Error, Result};

pub use osd::{
    AgentConfig, Collaborators, DaemonConfig, DeviceMode, DeviceSelection, OsdStartup,
    StartupOrchestrator, StoreConfig, StoreType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
