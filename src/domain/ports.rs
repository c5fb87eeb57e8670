//! Domain Ports - Collaborator interfaces used while launching a daemon
//!
//! The startup sequence only talks to the outside world through these
//! traits. Default implementations live in [`crate::ceph`], [`crate::k8s`]
//! and [`crate::osd::agent`]; tests substitute their own.

use crate::error::Result;
use crate::osd::AgentConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

// =============================================================================
// Cluster Identity
// =============================================================================

/// A single monitor of the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonInfo {
    /// Monitor name (e.g. `rook-ceph-mon0`)
    pub name: String,
    /// Address of the monitor, `ip:port`
    pub endpoint: String,
}

impl MonInfo {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Identity and coordinates of the cluster the daemon joins
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    /// Cluster name, also the namespace of the key-value store
    pub name: String,
    /// Cluster uuid
    pub fsid: String,
    /// Cephx keyring secret for the monitors
    pub monitor_secret: String,
    /// Secret of the admin user
    pub admin_secret: String,
    /// Monitors in the order they were given
    pub monitors: Vec<MonInfo>,
}

impl fmt::Debug for ClusterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterInfo")
            .field("name", &self.name)
            .field("fsid", &self.fsid)
            .field("monitor_secret", &"*****")
            .field("admin_secret", &"*****")
            .field("monitors", &self.monitors)
            .finish()
    }
}

// =============================================================================
// Execution Context
// =============================================================================

/// Addresses of this machine on the cluster networks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub public_addr_ipv4: String,
    pub cluster_addr_ipv4: String,
}

/// Handles and settings shared with the agent for the daemon's lifetime
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client, absent in standalone mode
    pub client: Option<kube::Client>,
    /// Directory for storing configuration
    pub config_dir: PathBuf,
    /// Optional ceph config file appended to generated configs
    pub config_file_override: Option<PathBuf>,
    /// Log level the daemon was started with
    pub log_level: String,
    pub network: NetworkInfo,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("client", &self.client.as_ref().map(|_| "kube::Client"))
            .field("config_dir", &self.config_dir)
            .field("config_file_override", &self.config_file_override)
            .field("log_level", &self.log_level)
            .field("network", &self.network)
            .finish()
    }
}

// =============================================================================
// Key-Value Store Port
// =============================================================================

/// Namespaced key-value configuration store.
///
/// Values are grouped into named stores; each store is an independent map.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get a single value, `None` if the store or key does not exist
    async fn get_value(&self, store: &str, key: &str) -> Result<Option<String>>;

    /// Set a single value, creating the store if needed
    async fn set_value(&self, store: &str, key: &str, value: &str) -> Result<()>;

    /// Get every value of a store
    async fn get_store(&self, store: &str) -> Result<BTreeMap<String, String>>;

    /// Remove every value of a store
    async fn clear_store(&self, store: &str) -> Result<()>;
}

// =============================================================================
// Cluster Connector Port
// =============================================================================

/// Provides platform handles and the key-value store scoped to a cluster
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    /// Build the platform client, `None` when running standalone
    async fn connect(&self) -> Result<Option<kube::Client>>;

    /// Key-value store scoped to `namespace`
    fn kv_store(&self, namespace: &str, client: Option<&kube::Client>) -> KvStoreRef;
}

// =============================================================================
// Location / Endpoint Ports
// =============================================================================

/// Turns a free-form location into ordered `key=value` placement tokens
pub trait LocationFormatter: Send + Sync {
    fn format_location(&self, location: &str, host_name: &str) -> Result<Vec<String>>;
}

/// Splits a delimited monitor endpoint string into monitor descriptors
pub trait MonEndpointParser: Send + Sync {
    fn parse_mon_endpoints(&self, input: &str) -> Result<Vec<MonInfo>>;
}

// =============================================================================
// Agent Port
// =============================================================================

/// A constructed storage agent
#[async_trait]
pub trait OsdAgent: Send + Sync {
    /// Provision and run the daemon, blocking for its lifetime
    async fn run(&self) -> Result<()>;
}

/// Constructs storage agents
pub trait AgentFactory: Send + Sync {
    fn new_agent(
        &self,
        context: Context,
        config: AgentConfig,
        kv: KvStoreRef,
    ) -> Result<Box<dyn OsdAgent>>;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type KvStoreRef = Arc<dyn KvStore>;
pub type ClusterConnectorRef = Arc<dyn ClusterConnector>;
pub type LocationFormatterRef = Arc<dyn LocationFormatter>;
pub type MonEndpointParserRef = Arc<dyn MonEndpointParser>;
pub type AgentFactoryRef = Arc<dyn AgentFactory>;
