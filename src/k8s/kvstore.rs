//! Key-Value Stores
//!
//! - [`ConfigMapKvStore`]: one ConfigMap per store, in the cluster namespace
//! - [`MemoryKvStore`]: process local, used in standalone mode

use crate::domain::ports::KvStore;
use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, DeleteParams, ObjectMeta, Patch, PatchParams, PostParams};
use kube::Client;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

// =============================================================================
// ConfigMap Store
// =============================================================================

/// Key-value store backed by Kubernetes ConfigMaps
pub struct ConfigMapKvStore {
    namespace: String,
    api: Api<ConfigMap>,
}

impl ConfigMapKvStore {
    /// Create a store whose ConfigMaps live in `namespace`
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            api: Api::namespaced(client, namespace),
        }
    }

    async fn merge_data(
        &self,
        store: &str,
        key: &str,
        data: BTreeMap<String, String>,
    ) -> Result<()> {
        let patch = serde_json::json!({ "data": data });
        self.api
            .patch(store, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        debug!("Updated {} in configmap {}/{}", key, self.namespace, store);
        Ok(())
    }
}

fn is_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == code)
}

#[async_trait]
impl KvStore for ConfigMapKvStore {
    async fn get_value(&self, store: &str, key: &str) -> Result<Option<String>> {
        let cm = self.api.get_opt(store).await?;
        Ok(cm.and_then(|cm| cm.data).and_then(|mut data| data.remove(key)))
    }

    async fn set_value(&self, store: &str, key: &str, value: &str) -> Result<()> {
        let mut data = BTreeMap::new();
        data.insert(key.to_string(), value.to_string());

        if self.api.get_opt(store).await?.is_some() {
            return self.merge_data(store, key, data).await;
        }

        let cm = ConfigMap {
            metadata: ObjectMeta {
                name: Some(store.to_string()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            data: Some(data.clone()),
            ..Default::default()
        };
        match self.api.create(&PostParams::default(), &cm).await {
            Ok(_) => {
                debug!("Created configmap {}/{} with {}", self.namespace, store, key);
                Ok(())
            }
            // Created by another writer since the lookup
            Err(e) if is_status(&e, 409) => self.merge_data(store, key, data).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn get_store(&self, store: &str) -> Result<BTreeMap<String, String>> {
        let cm = self.api.get_opt(store).await?;
        Ok(cm.and_then(|cm| cm.data).unwrap_or_default())
    }

    async fn clear_store(&self, store: &str) -> Result<()> {
        match self.api.delete(store, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(e) if is_status(&e, 404) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Key-value store held in process memory
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    stores: RwLock<BTreeMap<String, BTreeMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get_value(&self, store: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .stores
            .read()
            .get(store)
            .and_then(|values| values.get(key).cloned()))
    }

    async fn set_value(&self, store: &str, key: &str, value: &str) -> Result<()> {
        self.stores
            .write()
            .entry(store.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_store(&self, store: &str) -> Result<BTreeMap<String, String>> {
        Ok(self.stores.read().get(store).cloned().unwrap_or_default())
    }

    async fn clear_store(&self, store: &str) -> Result<()> {
        self.stores.write().remove(store);
        Ok(())
    }
}
