//! OSD Agent
//!
//! Default storage agent. It records the layout the node should be
//! provisioned with in the node's configuration store, then holds the
//! daemon lifecycle until a termination signal arrives. Device formatting
//! and the ceph-osd processes are handled by the provisioning engine that
//! consumes the recorded layout.

use crate::domain::ports::{AgentFactory, Context, KvStoreRef, OsdAgent};
use crate::error::{Error, Result};
use crate::osd::config::{AgentConfig, DeviceSelection, StoreConfig, StoreType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Key of the desired layout inside the node's configuration store
pub const DESIRED_LAYOUT_KEY: &str = "desired-layout";

/// Name of the configuration store of the OSDs on `node_name`
pub fn osd_config_store_name(node_name: &str) -> String {
    format!("rook-ceph-osd-{}-config", node_name)
}

// =============================================================================
// Desired Layout
// =============================================================================

/// What the node's OSDs should be provisioned on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesiredLayout {
    pub node_name: String,
    pub cluster_name: String,
    pub devices: DeviceSelection,
    pub metadata_device: Option<String>,
    pub directories: Vec<PathBuf>,
    pub force_format: bool,
    pub crush_location: String,
    pub store: StoreConfig,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Agent
// =============================================================================

/// Default [`OsdAgent`]
pub struct Agent {
    context: Context,
    config: AgentConfig,
    kv: KvStoreRef,
    shutdown: CancellationToken,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("context", &self.context)
            .field("config", &self.config)
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a new agent, rejecting store sizes that cannot be provisioned
    pub fn new(context: Context, config: AgentConfig, kv: KvStoreRef) -> Result<Self> {
        validate_store(&config.store)?;

        Ok(Self {
            context,
            config,
            kv,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token that stops [`OsdAgent::run`] when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Data directories of the node.
    ///
    /// Without any device or directory the config dir itself holds the OSD.
    pub fn directories(&self) -> Vec<PathBuf> {
        let dirs: Vec<PathBuf> = self
            .config
            .directories
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect();

        if dirs.is_empty() && self.config.devices.is_empty() {
            return vec![self.context.config_dir.clone()];
        }

        dirs
    }

    /// Layout recorded for the provisioning engine
    pub fn desired_layout(&self) -> DesiredLayout {
        DesiredLayout {
            node_name: self.config.node_name.clone(),
            cluster_name: self.config.cluster.name.clone(),
            devices: self.config.devices.clone(),
            metadata_device: Some(self.config.metadata_device.clone()).filter(|d| !d.is_empty()),
            directories: self.directories(),
            force_format: self.config.force_format,
            crush_location: self.config.crush_location.clone(),
            store: self.config.store.clone(),
            updated_at: Utc::now(),
        }
    }
}

fn validate_store(store: &StoreConfig) -> Result<()> {
    match store.store_type {
        StoreType::Bluestore if store.wal_size_mb == 0 || store.database_size_mb == 0 => {
            Err(Error::Agent(format!(
                "bluestore needs a non-zero WAL and database size (wal={}MB, db={}MB)",
                store.wal_size_mb, store.database_size_mb
            )))
        }
        StoreType::Filestore if store.journal_size_mb == 0 => Err(Error::Agent(
            "filestore needs a non-zero journal size".into(),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl OsdAgent for Agent {
    async fn run(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.context.config_dir).await?;

        let layout = self.desired_layout();
        let store = osd_config_store_name(&layout.node_name);
        let json = serde_json::to_string(&layout)?;
        self.kv
            .set_value(&store, DESIRED_LAYOUT_KEY, &json)
            .await
            .map_err(|e| Error::Agent(format!("failed to save OSD layout to {}: {}", store, e)))?;

        info!(
            node = %layout.node_name,
            devices = %layout.devices.value,
            mode = %layout.devices.mode,
            directories = layout.directories.len(),
            store = %layout.store.store_type,
            "OSD layout recorded in {}",
            store
        );

        tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!("OSD agent shutdown requested");
            }
            result = shutdown_signal() => {
                result?;
                info!("Received termination signal, stopping OSD agent");
            }
        }

        Ok(())
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = term.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

// =============================================================================
// Factory
// =============================================================================

/// Builds the default [`Agent`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OsdAgentFactory;

impl AgentFactory for OsdAgentFactory {
    fn new_agent(
        &self,
        context: Context,
        config: AgentConfig,
        kv: KvStoreRef,
    ) -> Result<Box<dyn OsdAgent>> {
        Ok(Box::new(Agent::new(context, config, kv)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{ClusterInfo, KvStore, NetworkInfo};
    use crate::k8s::MemoryKvStore;
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_context(dir: &TempDir) -> Context {
        Context {
            client: None,
            config_dir: dir.path().join("rook"),
            config_file_override: None,
            log_level: "info".into(),
            network: NetworkInfo::default(),
        }
    }

    fn test_config(devices: DeviceSelection, directories: &str) -> AgentConfig {
        AgentConfig {
            devices,
            metadata_device: String::new(),
            directories: directories.into(),
            force_format: false,
            crush_location: "host=node1 root=default".into(),
            store: StoreConfig::default(),
            cluster: ClusterInfo {
                name: "rookcluster".into(),
                ..Default::default()
            },
            node_name: "node1".into(),
        }
    }

    #[test]
    fn test_directories_default_to_config_dir() {
        let tmp = TempDir::new().unwrap();
        let agent = Agent::new(
            test_context(&tmp),
            test_config(DeviceSelection::explicit(""), ""),
            Arc::new(MemoryKvStore::new()),
        )
        .unwrap();
        assert_eq!(agent.directories(), vec![tmp.path().join("rook")]);
    }

    #[test]
    fn test_directories_from_flag() {
        let tmp = TempDir::new().unwrap();
        let agent = Agent::new(
            test_context(&tmp),
            test_config(DeviceSelection::explicit("/dev/sdb"), "/mnt/a, /mnt/b"),
            Arc::new(MemoryKvStore::new()),
        )
        .unwrap();
        assert_eq!(
            agent.directories(),
            vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")]
        );

        let agent = Agent::new(
            test_context(&tmp),
            test_config(DeviceSelection::filter("all"), ""),
            Arc::new(MemoryKvStore::new()),
        )
        .unwrap();
        assert!(agent.directories().is_empty());
    }

    #[test]
    fn test_invalid_store_sizes() {
        let tmp = TempDir::new().unwrap();
        let mut config = test_config(DeviceSelection::explicit("/dev/sdb"), "");
        config.store.wal_size_mb = 0;
        let result = Agent::new(test_context(&tmp), config, Arc::new(MemoryKvStore::new()));
        assert_matches!(result, Err(Error::Agent(_)));

        let mut config = test_config(DeviceSelection::explicit("/dev/sdb"), "");
        config.store.store_type = StoreType::Filestore;
        config.store.wal_size_mb = 0;
        assert!(Agent::new(test_context(&tmp), config, Arc::new(MemoryKvStore::new())).is_ok());
    }

    #[test]
    fn test_debug_masks_secrets() {
        let tmp = TempDir::new().unwrap();
        let mut config = test_config(DeviceSelection::explicit("/dev/sdb"), "");
        config.cluster.admin_secret = "adminsecret".into();
        let agent = Agent::new(test_context(&tmp), config, Arc::new(MemoryKvStore::new())).unwrap();

        let debug = format!("{:?}", agent);
        assert!(debug.contains("node1"));
        assert!(!debug.contains("adminsecret"));
    }

    #[tokio::test]
    async fn test_run_records_layout() {
        let tmp = TempDir::new().unwrap();
        let kv = Arc::new(MemoryKvStore::new());
        let agent = Agent::new(
            test_context(&tmp),
            test_config(DeviceSelection::explicit("/dev/sdb,/dev/sdc"), ""),
            kv.clone(),
        )
        .unwrap();

        agent.shutdown_token().cancel();
        agent.run().await.unwrap();

        assert!(tmp.path().join("rook").is_dir());

        let json = kv
            .get_value("rook-ceph-osd-node1-config", DESIRED_LAYOUT_KEY)
            .await
            .unwrap()
            .expect("layout recorded");
        let layout: DesiredLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(layout.node_name, "node1");
        assert_eq!(layout.cluster_name, "rookcluster");
        assert_eq!(layout.devices, DeviceSelection::explicit("/dev/sdb,/dev/sdc"));
        assert_eq!(layout.metadata_device, None);
        assert!(layout.directories.is_empty());
    }

    #[test]
    fn test_store_name() {
        assert_eq!(osd_config_store_name("node1"), "rook-ceph-osd-node1-config");
    }
}
