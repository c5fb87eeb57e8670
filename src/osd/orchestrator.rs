//! OSD Startup Orchestrator
//!
//! Turns the collected flag values into a validated configuration, builds
//! the storage agent and runs it. The sequence is linear:
//!
//! ```text
//! ValidatingFlags -> ResolvingDevices -> BuildingLocation -> AssemblingIdentity
//!     -> Connecting -> ConstructingAgent -> Running
//! ```
//!
//! Every failure is returned to the caller, which is expected to treat it
//! as fatal. Nothing external is touched before `Connecting`.

use crate::domain::ports::{
    AgentFactoryRef, ClusterConnectorRef, ClusterInfo, Context, LocationFormatter,
    LocationFormatterRef, MonEndpointParser, MonEndpointParserRef, OsdAgent,
};
use crate::ceph::format_mon_endpoints;
use crate::error::{Error, Result};
use crate::flags::verify_required_flags;
use crate::osd::config::{AgentConfig, ClusterSettings, DeviceSelection, OsdStartup};
use tracing::{debug, info, warn};

/// Flags that must be non-empty before the daemon may start
pub const REQUIRED_FLAGS: [&str; 7] = [
    "cluster-name",
    "mon-endpoints",
    "mon-secret",
    "admin-secret",
    "node-name",
    "public-ipv4",
    "private-ipv4",
];

// =============================================================================
// Startup Stages
// =============================================================================

/// Stage of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    ValidatingFlags,
    ResolvingDevices,
    BuildingLocation,
    AssemblingIdentity,
    Connecting,
    ConstructingAgent,
    Running,
}

impl std::fmt::Display for StartupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartupStage::ValidatingFlags => write!(f, "validating-flags"),
            StartupStage::ResolvingDevices => write!(f, "resolving-devices"),
            StartupStage::BuildingLocation => write!(f, "building-location"),
            StartupStage::AssemblingIdentity => write!(f, "assembling-identity"),
            StartupStage::Connecting => write!(f, "connecting"),
            StartupStage::ConstructingAgent => write!(f, "constructing-agent"),
            StartupStage::Running => write!(f, "running"),
        }
    }
}

// =============================================================================
// Collaborators
// =============================================================================

/// External services the orchestrator delegates to
#[derive(Clone)]
pub struct Collaborators {
    pub connector: ClusterConnectorRef,
    pub location_formatter: LocationFormatterRef,
    pub mon_parser: MonEndpointParserRef,
    pub agent_factory: AgentFactoryRef,
}

// =============================================================================
// Pure Steps
// =============================================================================

/// Pick the data devices from the two mutually exclusive flags
pub fn resolve_device_selection(devices: &str, device_filter: &str) -> Result<DeviceSelection> {
    if !device_filter.is_empty() {
        if !devices.is_empty() {
            return Err(Error::ConflictingConfiguration(
                "only one of data-devices and data-device-filter may be specified".into(),
            ));
        }
        return Ok(DeviceSelection::filter(device_filter));
    }

    Ok(DeviceSelection::explicit(devices))
}

/// Format the CRUSH location of this node into a single space separated string
pub fn build_placement_location(
    formatter: &dyn LocationFormatter,
    location: &str,
    node_name: &str,
) -> Result<String> {
    let tokens = formatter
        .format_location(location, node_name)
        .map_err(|e| configuration_context("invalid location", e))?;

    Ok(tokens.join(" "))
}

/// Build the identity of the cluster from its settings and monitor endpoints
pub fn assemble_cluster_identity(
    parser: &dyn MonEndpointParser,
    settings: &ClusterSettings,
) -> Result<ClusterInfo> {
    let monitors = parser
        .parse_mon_endpoints(&settings.mon_endpoints)
        .map_err(|e| configuration_context("invalid mon endpoints", e))?;

    if monitors.is_empty() {
        return Err(Error::Configuration(format!(
            "no monitors found in mon endpoints '{}'",
            settings.mon_endpoints
        )));
    }

    Ok(ClusterInfo {
        name: settings.name.clone(),
        fsid: settings.fsid.clone(),
        monitor_secret: settings.mon_secret.clone(),
        admin_secret: settings.admin_secret.clone(),
        monitors,
    })
}

fn configuration_context(what: &str, err: Error) -> Error {
    match err {
        Error::Configuration(reason) => Error::Configuration(format!("{}: {}", what, reason)),
        other => Error::Configuration(format!("{}: {}", what, other)),
    }
}

fn agent_error(err: Error) -> Error {
    match err {
        Error::Agent(_) => err,
        other => Error::Agent(other.to_string()),
    }
}

// =============================================================================
// Orchestrator
// =============================================================================

/// Runs the OSD startup sequence once
pub struct StartupOrchestrator {
    collaborators: Collaborators,
}

impl StartupOrchestrator {
    /// Create a new orchestrator
    pub fn new(collaborators: Collaborators) -> Self {
        Self { collaborators }
    }

    fn enter(&self, stage: StartupStage) {
        debug!(stage = %stage, "OSD startup stage");
    }

    /// Validate the configuration and construct the agent without running it
    pub async fn prepare(&self, startup: OsdStartup) -> Result<Box<dyn OsdAgent>> {
        self.enter(StartupStage::ValidatingFlags);
        verify_required_flags(&startup, &REQUIRED_FLAGS)?;

        let OsdStartup {
            daemon,
            cluster,
            network,
            config_dir,
            config_file_override,
            log_level,
        } = startup;

        self.enter(StartupStage::ResolvingDevices);
        let devices = resolve_device_selection(&daemon.devices, &daemon.device_filter)?;
        info!(mode = %devices.mode, devices = %devices.value, "Resolved data devices");

        self.enter(StartupStage::BuildingLocation);
        let crush_location = build_placement_location(
            self.collaborators.location_formatter.as_ref(),
            &daemon.location,
            &daemon.node_name,
        )?;
        info!(location = %crush_location, "CRUSH location");

        self.enter(StartupStage::AssemblingIdentity);
        let cluster_info =
            assemble_cluster_identity(self.collaborators.mon_parser.as_ref(), &cluster)?;
        info!(
            cluster = %cluster_info.name,
            monitors = %format_mon_endpoints(&cluster_info.monitors),
            "Cluster identity assembled"
        );

        self.enter(StartupStage::Connecting);
        let client = self.collaborators.connector.connect().await?;
        let kv = self
            .collaborators
            .connector
            .kv_store(&cluster_info.name, client.as_ref());

        let context = Context {
            client,
            config_dir,
            config_file_override,
            log_level,
            network,
        };

        // The agent is never asked to force-format; the flag is only reported.
        if daemon.force_format {
            warn!("--force-format is set but is not passed to the OSD agent; devices with an existing filesystem are left untouched");
        }

        let config = AgentConfig {
            devices,
            metadata_device: daemon.metadata_device,
            directories: daemon.directories,
            force_format: false,
            crush_location,
            store: daemon.store,
            cluster: cluster_info,
            node_name: daemon.node_name,
        };

        self.enter(StartupStage::ConstructingAgent);
        self.collaborators
            .agent_factory
            .new_agent(context, config, kv)
            .map_err(agent_error)
    }

    /// Run the full startup sequence, blocking for the daemon's lifetime
    pub async fn launch(&self, startup: OsdStartup) -> Result<()> {
        let agent = self.prepare(startup).await?;

        self.enter(StartupStage::Running);
        agent.run().await.map_err(agent_error)?;

        info!("OSD agent exited");
        Ok(())
    }
}
