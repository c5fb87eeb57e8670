//! Kubernetes connector
//!
//! Builds the client from the in-cluster or kubeconfig environment and
//! hands out key-value stores scoped to the cluster namespace.

use super::kvstore::{ConfigMapKvStore, MemoryKvStore};
use crate::domain::ports::{ClusterConnector, KvStoreRef};
use crate::error::Result;
use async_trait::async_trait;
use kube::Client;
use std::sync::Arc;
use tracing::info;

/// Default [`ClusterConnector`]
#[derive(Debug, Clone, Default)]
pub struct KubeConnector {
    standalone: bool,
}

impl KubeConnector {
    pub fn new() -> Self {
        Self { standalone: false }
    }

    /// Connector that never contacts Kubernetes
    pub fn standalone() -> Self {
        Self { standalone: true }
    }

    pub fn is_standalone(&self) -> bool {
        self.standalone
    }
}

#[async_trait]
impl ClusterConnector for KubeConnector {
    async fn connect(&self) -> Result<Option<Client>> {
        if self.standalone {
            info!("Standalone mode, not connecting to Kubernetes");
            return Ok(None);
        }

        let client = Client::try_default().await?;
        info!("Connected to Kubernetes API");
        Ok(Some(client))
    }

    fn kv_store(&self, namespace: &str, client: Option<&Client>) -> KvStoreRef {
        match client {
            Some(client) => Arc::new(ConfigMapKvStore::new(client.clone(), namespace)),
            None => Arc::new(MemoryKvStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_standalone_connect() {
        let connector = KubeConnector::standalone();
        assert!(connector.is_standalone());

        let client = connector.connect().await.unwrap();
        assert!(client.is_none());

        let kv = connector.kv_store("rookcluster", client.as_ref());
        kv.set_value("store", "key", "value").await.unwrap();
        assert_eq!(
            kv.get_value("store", "key").await.unwrap().as_deref(),
            Some("value")
        );
    }
}
