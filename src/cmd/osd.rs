//! `rook osd`: generates the OSD config and runs the OSD daemon

use super::cluster::ClusterArgs;
use crate::ceph::{CrushLocationFormatter, MonEndpoints};
use crate::error::Result;
use crate::flags::log_startup_info;
use crate::k8s::KubeConnector;
use crate::osd::{
    Collaborators, DaemonConfig, OsdAgentFactory, OsdStartup, StartupOrchestrator, StoreConfig,
    StoreType, DB_DEFAULT_SIZE_MB, JOURNAL_DEFAULT_SIZE_MB, WAL_DEFAULT_SIZE_MB,
};
use clap::Args;
use std::sync::Arc;

/// Host name of the machine, used as the default node name
pub fn default_node_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_default()
}

/// Flags of the `osd` command
#[derive(Args, Debug, Clone)]
pub struct OsdArgs {
    /// Comma separated list of devices to use for storage
    #[arg(long = "data-devices", env = "ROOK_DATA_DEVICES")]
    pub data_devices: Option<String>,

    /// A regex filter for the device names to use, or "all"
    #[arg(long = "data-device-filter", env = "ROOK_DATA_DEVICE_FILTER")]
    pub data_device_filter: Option<String>,

    /// Comma separated list of directory paths to use for storage
    #[arg(long = "data-directories", env = "ROOK_DATA_DIRECTORIES")]
    pub data_directories: Option<String>,

    /// Device to use for metadata (e.g. a high performance SSD/NVMe device)
    #[arg(long, env = "ROOK_METADATA_DEVICE")]
    pub metadata_device: Option<String>,

    /// Location of this node for CRUSH placement
    #[arg(long, env = "ROOK_LOCATION")]
    pub location: Option<String>,

    /// Force the format of any specified devices, even if they already have a filesystem. BE CAREFUL!
    #[arg(long, env = "ROOK_FORCE_FORMAT")]
    pub force_format: bool,

    /// The host name of the node
    #[arg(long, env = "ROOK_NODE_NAME", default_value_t = default_node_name())]
    pub node_name: String,

    /// Default size (MB) for OSD write ahead log (WAL) (bluestore)
    #[arg(long = "osd-wal-size", env = "ROOK_OSD_WAL_SIZE", default_value_t = WAL_DEFAULT_SIZE_MB)]
    pub osd_wal_size: u64,

    /// Default size (MB) for OSD database (bluestore)
    #[arg(long = "osd-database-size", env = "ROOK_OSD_DATABASE_SIZE", default_value_t = DB_DEFAULT_SIZE_MB)]
    pub osd_database_size: u64,

    /// Default size (MB) for OSD journal (filestore)
    #[arg(long = "osd-journal-size", env = "ROOK_OSD_JOURNAL_SIZE", default_value_t = JOURNAL_DEFAULT_SIZE_MB)]
    pub osd_journal_size: u64,

    /// Type of backing OSD store to use
    #[arg(long = "osd-store", env = "ROOK_OSD_STORE", value_enum, default_value_t = StoreType::Bluestore)]
    pub osd_store: StoreType,

    /// Run without Kubernetes, keeping configuration in memory
    #[arg(long, env = "ROOK_STANDALONE")]
    pub standalone: bool,

    #[command(flatten)]
    pub cluster: ClusterArgs,
}

impl OsdArgs {
    /// Collect the parsed flags into the startup configuration
    pub fn into_startup(self, log_level: &str) -> OsdStartup {
        let cluster = self.cluster.settings();
        let network = self.cluster.network();

        OsdStartup {
            daemon: DaemonConfig {
                devices: self.data_devices.unwrap_or_default(),
                device_filter: self.data_device_filter.unwrap_or_default(),
                directories: self.data_directories.unwrap_or_default(),
                metadata_device: self.metadata_device.unwrap_or_default(),
                location: self.location.unwrap_or_default(),
                force_format: self.force_format,
                node_name: self.node_name,
                store: StoreConfig {
                    store_type: self.osd_store,
                    wal_size_mb: self.osd_wal_size,
                    database_size_mb: self.osd_database_size,
                    journal_size_mb: self.osd_journal_size,
                },
            },
            cluster,
            network,
            config_dir: self.cluster.config_dir,
            config_file_override: self.cluster.ceph_config_override,
            log_level: log_level.to_string(),
        }
    }
}

/// Default collaborators of the OSD startup
pub fn default_collaborators(standalone: bool) -> Collaborators {
    let connector = if standalone {
        KubeConnector::standalone()
    } else {
        KubeConnector::new()
    };

    Collaborators {
        connector: Arc::new(connector),
        location_formatter: Arc::new(CrushLocationFormatter::new()),
        mon_parser: Arc::new(MonEndpoints),
        agent_factory: Arc::new(OsdAgentFactory),
    }
}

/// Run the `osd` command with the default collaborators
pub async fn start_osd(args: OsdArgs, log_level: &str) -> Result<()> {
    let collaborators = default_collaborators(args.standalone);
    let startup = args.into_startup(log_level);

    log_startup_info(&startup);

    StartupOrchestrator::new(collaborators).launch(startup).await
}
