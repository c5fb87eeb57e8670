//! OSD Configuration
//!
//! Resolved configuration of a storage daemon: which devices or directories
//! it manages, where it sits in the CRUSH hierarchy and how its backing
//! store is sized.

use crate::domain::ports::{ClusterInfo, NetworkInfo};
use crate::flags::FlagSet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// Constants
// =============================================================================

/// Default size (MB) of the bluestore write ahead log
pub const WAL_DEFAULT_SIZE_MB: u64 = 576;
/// Default size (MB) of the bluestore database
pub const DB_DEFAULT_SIZE_MB: u64 = 20480;
/// Default size (MB) of the filestore journal
pub const JOURNAL_DEFAULT_SIZE_MB: u64 = 5120;

/// Filter value selecting every available device
pub const ALL_DEVICES: &str = "all";

// =============================================================================
// Store Configuration
// =============================================================================

/// Backing store engine of an OSD
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    Bluestore,
    Filestore,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::Bluestore => write!(f, "bluestore"),
            StoreType::Filestore => write!(f, "filestore"),
        }
    }
}

/// Store selection and sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub store_type: StoreType,
    /// WAL size in MB (bluestore)
    pub wal_size_mb: u64,
    /// Database size in MB (bluestore)
    pub database_size_mb: u64,
    /// Journal size in MB (filestore)
    pub journal_size_mb: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            wal_size_mb: WAL_DEFAULT_SIZE_MB,
            database_size_mb: DB_DEFAULT_SIZE_MB,
            journal_size_mb: JOURNAL_DEFAULT_SIZE_MB,
        }
    }
}

// =============================================================================
// Device Selection
// =============================================================================

/// How the data devices were selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeviceMode {
    /// Comma separated list of device names
    ExplicitList,
    /// Regex over device names, or [`ALL_DEVICES`]
    Filter,
}

impl std::fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceMode::ExplicitList => write!(f, "explicit list"),
            DeviceMode::Filter => write!(f, "filter"),
        }
    }
}

/// Resolved device selection, value kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub mode: DeviceMode,
    pub value: String,
}

impl DeviceSelection {
    pub fn explicit(devices: impl Into<String>) -> Self {
        Self {
            mode: DeviceMode::ExplicitList,
            value: devices.into(),
        }
    }

    pub fn filter(pattern: impl Into<String>) -> Self {
        Self {
            mode: DeviceMode::Filter,
            value: pattern.into(),
        }
    }

    pub fn is_filter(&self) -> bool {
        self.mode == DeviceMode::Filter
    }

    /// Whether the selection names no device at all
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

// =============================================================================
// Daemon Configuration
// =============================================================================

/// Startup configuration of the OSD daemon, built once from flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonConfig {
    pub devices: String,
    pub device_filter: String,
    pub directories: String,
    pub metadata_device: String,
    pub location: String,
    pub force_format: bool,
    pub node_name: String,
    pub store: StoreConfig,
}

/// Connection settings of the cluster the daemon joins, as given on the
/// command line. Monitors are still an unparsed endpoint string here.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClusterSettings {
    pub name: String,
    pub fsid: String,
    pub mon_endpoints: String,
    pub mon_secret: String,
    pub admin_secret: String,
}

impl std::fmt::Debug for ClusterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSettings")
            .field("name", &self.name)
            .field("fsid", &self.fsid)
            .field("mon_endpoints", &self.mon_endpoints)
            .field("mon_secret", &"*****")
            .field("admin_secret", &"*****")
            .finish()
    }
}

/// Everything the `osd` command collected before startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsdStartup {
    pub daemon: DaemonConfig,
    pub cluster: ClusterSettings,
    pub network: NetworkInfo,
    pub config_dir: PathBuf,
    pub config_file_override: Option<PathBuf>,
    pub log_level: String,
}

impl FlagSet for OsdStartup {
    fn command_name(&self) -> &str {
        "osd"
    }

    fn flag_values(&self) -> Vec<(&'static str, String)> {
        let d = &self.daemon;
        let c = &self.cluster;
        vec![
            ("data-devices", d.devices.clone()),
            ("data-device-filter", d.device_filter.clone()),
            ("data-directories", d.directories.clone()),
            ("metadata-device", d.metadata_device.clone()),
            ("location", d.location.clone()),
            ("force-format", d.force_format.to_string()),
            ("node-name", d.node_name.clone()),
            ("osd-wal-size", d.store.wal_size_mb.to_string()),
            ("osd-database-size", d.store.database_size_mb.to_string()),
            ("osd-journal-size", d.store.journal_size_mb.to_string()),
            ("osd-store", d.store.store_type.to_string()),
            ("public-ipv4", self.network.public_addr_ipv4.clone()),
            ("private-ipv4", self.network.cluster_addr_ipv4.clone()),
            ("cluster-name", c.name.clone()),
            ("fsid", c.fsid.clone()),
            ("mon-secret", c.mon_secret.clone()),
            ("admin-secret", c.admin_secret.clone()),
            ("mon-endpoints", c.mon_endpoints.clone()),
            ("config-dir", self.config_dir.display().to_string()),
            (
                "ceph-config-override",
                self.config_file_override
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
        ]
    }
}

// =============================================================================
// Agent Configuration
// =============================================================================

/// Everything a storage agent is constructed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub devices: DeviceSelection,
    pub metadata_device: String,
    pub directories: String,
    pub force_format: bool,
    /// Space separated CRUSH location tokens
    pub crush_location: String,
    pub store: StoreConfig,
    pub cluster: ClusterInfo,
    pub node_name: String,
}
