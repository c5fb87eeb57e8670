//! End-to-end tests of the OSD startup sequence with substitute collaborators

use assert_matches::assert_matches;
use async_trait::async_trait;
use parking_lot::Mutex;
use rook::ceph::{CrushLocationFormatter, MonEndpoints};
use rook::domain::ports::{
    AgentFactory, ClusterConnector, Context, KvStoreRef, LocationFormatter, MonEndpointParser,
    MonInfo, NetworkInfo, OsdAgent,
};
use rook::k8s::MemoryKvStore;
use rook::osd::{
    AgentConfig, ClusterSettings, Collaborators, DaemonConfig, DeviceMode, OsdStartup,
    StartupOrchestrator, StoreConfig,
};
use rook::{Error, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// =============================================================================
// Substitutes
// =============================================================================

#[derive(Default)]
struct FakeConnector {
    fail: bool,
    connects: AtomicUsize,
    namespaces: Mutex<Vec<String>>,
}

#[async_trait]
impl ClusterConnector for FakeConnector {
    async fn connect(&self) -> Result<Option<kube::Client>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Configuration("no kubeconfig".into()));
        }
        Ok(None)
    }

    fn kv_store(&self, namespace: &str, _client: Option<&kube::Client>) -> KvStoreRef {
        self.namespaces.lock().push(namespace.to_string());
        Arc::new(MemoryKvStore::new())
    }
}

struct FailingFormatter;

impl LocationFormatter for FailingFormatter {
    fn format_location(&self, _location: &str, _host_name: &str) -> Result<Vec<String>> {
        Err(Error::Configuration("unparseable".into()))
    }
}

struct FailingParser;

impl MonEndpointParser for FailingParser {
    fn parse_mon_endpoints(&self, _input: &str) -> Result<Vec<MonInfo>> {
        Err(Error::Configuration("unreachable monitors".into()))
    }
}

#[derive(Default)]
struct RecordingFactory {
    fail_construct: bool,
    fail_run: bool,
    constructed: Mutex<Vec<(Context, AgentConfig)>>,
    runs: Arc<AtomicUsize>,
}

struct RecordingAgent {
    fail: bool,
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl OsdAgent for RecordingAgent {
    async fn run(&self) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device busy",
            )));
        }
        Ok(())
    }
}

impl AgentFactory for RecordingFactory {
    fn new_agent(
        &self,
        context: Context,
        config: AgentConfig,
        _kv: KvStoreRef,
    ) -> Result<Box<dyn OsdAgent>> {
        self.constructed.lock().push((context, config));
        if self.fail_construct {
            return Err(Error::Agent("cannot construct".into()));
        }
        Ok(Box::new(RecordingAgent {
            fail: self.fail_run,
            runs: self.runs.clone(),
        }))
    }
}

struct Harness {
    connector: Arc<FakeConnector>,
    factory: Arc<RecordingFactory>,
    orchestrator: StartupOrchestrator,
}

impl Harness {
    fn new(connector: FakeConnector, factory: RecordingFactory) -> Self {
        Self::with_parsers(
            connector,
            factory,
            Arc::new(CrushLocationFormatter::new()),
            Arc::new(MonEndpoints),
        )
    }

    fn with_parsers(
        connector: FakeConnector,
        factory: RecordingFactory,
        location_formatter: Arc<dyn LocationFormatter>,
        mon_parser: Arc<dyn MonEndpointParser>,
    ) -> Self {
        let connector = Arc::new(connector);
        let factory = Arc::new(factory);
        let orchestrator = StartupOrchestrator::new(Collaborators {
            connector: connector.clone(),
            location_formatter,
            mon_parser,
            agent_factory: factory.clone(),
        });
        Self {
            connector,
            factory,
            orchestrator,
        }
    }

    fn constructed(&self) -> usize {
        self.factory.constructed.lock().len()
    }

    fn runs(&self) -> usize {
        self.factory.runs.load(Ordering::SeqCst)
    }
}

fn startup() -> OsdStartup {
    OsdStartup {
        daemon: DaemonConfig {
            node_name: "node1".into(),
            store: StoreConfig::default(),
            ..Default::default()
        },
        cluster: ClusterSettings {
            name: "rookcluster".into(),
            fsid: "4fe8f4a4-0000-4e0b-9c3c-2d1c5f6a7b8c".into(),
            mon_endpoints: "mon0=10.0.0.1:6790,mon1=10.0.0.2:6790".into(),
            mon_secret: "monsecret".into(),
            admin_secret: "adminsecret".into(),
        },
        network: NetworkInfo {
            public_addr_ipv4: "10.0.0.10".into(),
            cluster_addr_ipv4: "192.168.0.10".into(),
        },
        config_dir: PathBuf::from("/var/lib/rook"),
        config_file_override: None,
        log_level: "info".into(),
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_explicit_devices_start_agent_once() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.devices = "/dev/sdb,/dev/sdc".into();
    input.daemon.location = "region=us-east".into();

    harness.orchestrator.launch(input).await.unwrap();

    assert_eq!(harness.constructed(), 1);
    assert_eq!(harness.runs(), 1);

    let constructed = harness.factory.constructed.lock();
    let (context, config) = &constructed[0];
    assert_eq!(config.devices.mode, DeviceMode::ExplicitList);
    assert_eq!(config.devices.value, "/dev/sdb,/dev/sdc");
    assert_eq!(config.crush_location, "region=us-east host=node1 root=default");
    assert_eq!(config.node_name, "node1");
    assert_eq!(config.cluster.name, "rookcluster");
    assert_eq!(
        config.cluster.monitors,
        vec![
            MonInfo::new("mon0", "10.0.0.1:6790"),
            MonInfo::new("mon1", "10.0.0.2:6790"),
        ]
    );
    assert_eq!(context.network.public_addr_ipv4, "10.0.0.10");
    assert_eq!(context.config_dir, PathBuf::from("/var/lib/rook"));
    assert!(context.client.is_none());

    assert_eq!(*harness.connector.namespaces.lock(), vec!["rookcluster"]);
}

#[test]
fn test_conflicting_devices_never_construct_agent() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.devices = "/dev/sdb".into();
    input.daemon.device_filter = "sd.*".into();

    let err = tokio_test::block_on(harness.orchestrator.launch(input)).unwrap_err();
    assert_matches!(err, Error::ConflictingConfiguration(_));
    assert_eq!(harness.connector.connects.load(Ordering::SeqCst), 0);
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_missing_mon_secret() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.cluster.mon_secret = String::new();

    let err = harness.orchestrator.launch(input).await.unwrap_err();
    assert_ne!(err.exit_code(), 0);
    assert_matches!(err, Error::MissingConfiguration { command, missing } => {
        assert_eq!(command, "osd");
        assert_eq!(missing, vec!["mon-secret".to_string()]);
    });
    assert_eq!(harness.connector.connects.load(Ordering::SeqCst), 0);
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_missing_flags_are_all_named() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.node_name = String::new();
    input.network.public_addr_ipv4 = String::new();
    input.cluster.mon_endpoints = String::new();

    let err = harness.orchestrator.launch(input).await.unwrap_err();
    assert_matches!(err, Error::MissingConfiguration { missing, .. } => {
        assert_eq!(missing, vec!["mon-endpoints", "node-name", "public-ipv4"]);
    });
}

#[tokio::test]
async fn test_filter_all() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.device_filter = "all".into();

    harness.orchestrator.launch(input).await.unwrap();

    let constructed = harness.factory.constructed.lock();
    let (_, config) = &constructed[0];
    assert_eq!(config.devices.mode, DeviceMode::Filter);
    assert_eq!(config.devices.value, "all");
}

#[tokio::test]
async fn test_force_format_not_forwarded() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.force_format = true;

    harness.orchestrator.launch(input).await.unwrap();

    let constructed = harness.factory.constructed.lock();
    assert!(!constructed[0].1.force_format);
}

// =============================================================================
// Collaborator Failures
// =============================================================================

#[tokio::test]
async fn test_invalid_location_is_fatal() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let mut input = startup();
    input.daemon.location = "rack".into();

    let err = harness.orchestrator.launch(input).await.unwrap_err();
    assert_matches!(err, Error::Configuration(_));
    assert_eq!(harness.connector.connects.load(Ordering::SeqCst), 0);
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_formatter_failure_is_fatal() {
    let harness = Harness::with_parsers(
        FakeConnector::default(),
        RecordingFactory::default(),
        Arc::new(FailingFormatter),
        Arc::new(MonEndpoints),
    );

    let err = harness.orchestrator.launch(startup()).await.unwrap_err();
    assert_matches!(err, Error::Configuration(msg) => {
        assert!(msg.contains("unparseable"));
    });
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_parser_failure_is_fatal() {
    let harness = Harness::with_parsers(
        FakeConnector::default(),
        RecordingFactory::default(),
        Arc::new(CrushLocationFormatter::new()),
        Arc::new(FailingParser),
    );

    let err = harness.orchestrator.launch(startup()).await.unwrap_err();
    assert_matches!(err, Error::Configuration(_));
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_connect_failure_is_fatal() {
    let connector = FakeConnector {
        fail: true,
        ..Default::default()
    };
    let harness = Harness::new(connector, RecordingFactory::default());

    let err = harness.orchestrator.launch(startup()).await.unwrap_err();
    assert_matches!(err, Error::Configuration(_));
    assert_eq!(harness.constructed(), 0);
}

#[tokio::test]
async fn test_construction_failure_is_agent_error() {
    let factory = RecordingFactory {
        fail_construct: true,
        ..Default::default()
    };
    let harness = Harness::new(FakeConnector::default(), factory);

    let err = harness.orchestrator.launch(startup()).await.unwrap_err();
    assert_matches!(err, Error::Agent(_));
    assert_eq!(harness.runs(), 0);
}

#[tokio::test]
async fn test_run_failure_is_agent_error() {
    let factory = RecordingFactory {
        fail_run: true,
        ..Default::default()
    };
    let harness = Harness::new(FakeConnector::default(), factory);

    let err = harness.orchestrator.launch(startup()).await.unwrap_err();
    assert_eq!(err.exit_code(), 1);
    assert_matches!(err, Error::Agent(msg) => {
        assert!(msg.contains("device busy"));
    });
    assert_eq!(harness.runs(), 1);
}

#[tokio::test]
async fn test_prepare_does_not_run() {
    let harness = Harness::new(FakeConnector::default(), RecordingFactory::default());

    let agent = harness.orchestrator.prepare(startup()).await.unwrap();
    assert_eq!(harness.constructed(), 1);
    assert_eq!(harness.runs(), 0);

    agent.run().await.unwrap();
    assert_eq!(harness.runs(), 1);
}
