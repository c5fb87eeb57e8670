//! Cluster connection flags shared by the daemon commands

use crate::domain::ports::NetworkInfo;
use crate::osd::config::ClusterSettings;
use clap::Args;
use std::path::PathBuf;

/// Default directory for storing configuration
pub const DEFAULT_CONFIG_DIR: &str = "/var/lib/rook";

/// Default ceph cluster name
pub const DEFAULT_CLUSTER_NAME: &str = "rookcluster";

/// Flags describing the cluster a daemon joins
#[derive(Args, Debug, Clone)]
pub struct ClusterArgs {
    /// Public IPv4 address for this machine
    #[arg(long = "public-ipv4", env = "ROOK_PUBLIC_IPV4")]
    pub public_ipv4: Option<String>,

    /// Private IPv4 address for this machine
    #[arg(long = "private-ipv4", env = "ROOK_PRIVATE_IPV4")]
    pub private_ipv4: Option<String>,

    /// Ceph cluster name
    #[arg(long, env = "ROOK_CLUSTER_NAME", default_value = DEFAULT_CLUSTER_NAME)]
    pub cluster_name: String,

    /// The cluster uuid
    #[arg(long, env = "ROOK_FSID")]
    pub fsid: Option<String>,

    /// The cephx keyring for monitors
    #[arg(long, env = "ROOK_MON_SECRET", hide_env_values = true)]
    pub mon_secret: Option<String>,

    /// Secret for the admin user
    #[arg(long, env = "ROOK_ADMIN_SECRET", hide_env_values = true)]
    pub admin_secret: Option<String>,

    /// Ceph mon endpoints, `name=ip:port` separated by commas
    #[arg(long, env = "ROOK_MON_ENDPOINTS")]
    pub mon_endpoints: Option<String>,

    /// Directory for storing configuration
    #[arg(long, env = "ROOK_CONFIG_DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: PathBuf,

    /// Optional path to a ceph config file appended to the generated config files
    #[arg(long, env = "ROOK_CEPH_CONFIG_OVERRIDE")]
    pub ceph_config_override: Option<PathBuf>,
}

impl ClusterArgs {
    pub fn settings(&self) -> ClusterSettings {
        ClusterSettings {
            name: self.cluster_name.clone(),
            fsid: self.fsid.clone().unwrap_or_default(),
            mon_endpoints: self.mon_endpoints.clone().unwrap_or_default(),
            mon_secret: self.mon_secret.clone().unwrap_or_default(),
            admin_secret: self.admin_secret.clone().unwrap_or_default(),
        }
    }

    pub fn network(&self) -> NetworkInfo {
        NetworkInfo {
            public_addr_ipv4: self.public_ipv4.clone().unwrap_or_default(),
            cluster_addr_ipv4: self.private_ipv4.clone().unwrap_or_default(),
        }
    }
}
