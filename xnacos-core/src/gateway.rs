//! Gateway: look up a registered client by key and forward select queries to it.

use std::sync::Arc;

use crate::{ClientRegistry, DiscoveryError, Instance, QueryParams, RegisteredClient};

/// Stateless query layer over a shared registry. Adds no retries, fallback, or selection logic.
#[derive(Clone)]
pub struct DiscoveryGateway {
    registry: Arc<ClientRegistry>,
}

impl DiscoveryGateway {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    /// One healthy instance of `service_name` from the client under `key`.
    /// Unknown key -> `UnknownClientKey`; client errors are returned unchanged.
    pub async fn select_one_healthy_instance(
        &self,
        key: &str,
        service_name: &str,
        group_name: &str,
    ) -> Result<Instance, DiscoveryError> {
        let (entry, params) = self.resolve(key, service_name, group_name)?;
        tracing::debug!(key, service = %params.service_name, group = %params.group_name, "select one healthy instance");
        entry.client.select_one_healthy_instance(&params).await
    }

    /// All instances (healthy or not) of `service_name` from the client under `key`.
    pub async fn select_all_instances(
        &self,
        key: &str,
        service_name: &str,
        group_name: &str,
    ) -> Result<Vec<Instance>, DiscoveryError> {
        let (entry, params) = self.resolve(key, service_name, group_name)?;
        tracing::debug!(key, service = %params.service_name, group = %params.group_name, "select all instances");
        entry.client.select_all_instances(&params).await
    }

    // The registry lock is released before the query runs; queries on one client do not serialize here.
    fn resolve(
        &self,
        key: &str,
        service_name: &str,
        group_name: &str,
    ) -> Result<(RegisteredClient, QueryParams), DiscoveryError> {
        let entry = self.registry.get(key)?;
        let group = if group_name.is_empty() {
            entry.default_group.clone()
        } else {
            group_name.to_owned()
        };
        Ok((entry, QueryParams::new(service_name, group)))
    }
}
