//! Script-facing surface: blocking calls that scripting hosts (VUs) make into the async core.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use xnacos_core::{ClientRegistry, ConnectionConfig, DiscoveryGateway, Instance};

use crate::{HostError, NacosParams};

/// Keys starting with this belong to constructed clients; `init` refuses them.
pub const RESERVED_KEY_PREFIX: &str = "@";

/// One per host process. Owns the shared registry and the runtime that drives queries.
/// Safe to call from many script threads at once.
pub struct HostModule {
    gateway: DiscoveryGateway,
    runtime: tokio::runtime::Runtime,
    next_client: AtomicU64,
}

impl HostModule {
    /// Module backed by Nacos HTTP clients.
    pub fn new() -> Result<Self, HostError> {
        Self::with_registry(Arc::new(ClientRegistry::new()))
    }

    pub fn with_registry(registry: Arc<ClientRegistry>) -> Result<Self, HostError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("xnacos-io")
            .build()
            .map_err(|e| HostError::Runtime(e.to_string()))?;
        Ok(Self {
            gateway: DiscoveryGateway::new(registry),
            runtime,
            next_client: AtomicU64::new(0),
        })
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        self.gateway.registry()
    }

    /// Multi-key variant: marshal `args` and register the client under `key`.
    pub fn init(&self, key: &str, args: &Value) -> Result<(), HostError> {
        let config = NacosParams::from_value(args)?.into_config();
        self.init_config(key, &config)
    }

    pub fn init_config(&self, key: &str, config: &ConnectionConfig) -> Result<(), HostError> {
        if key.starts_with(RESERVED_KEY_PREFIX) {
            return Err(HostError::InvalidArgument(format!(
                "key {key:?} is reserved: keys starting with {RESERVED_KEY_PREFIX:?} belong to constructed clients"
            )));
        }
        self.registry().init(key, config)?;
        Ok(())
    }

    /// Construction call (`new NacosClient({...})`): a client object bound to a fresh key.
    pub fn construct(self: &Arc<Self>, args: &Value) -> Result<ScriptClient, HostError> {
        let config = NacosParams::from_value(args)?.into_config();
        self.construct_config(&config)
    }

    pub fn construct_config(self: &Arc<Self>, config: &ConnectionConfig) -> Result<ScriptClient, HostError> {
        let key = format!(
            "{RESERVED_KEY_PREFIX}client-{}",
            self.next_client.fetch_add(1, Ordering::Relaxed)
        );
        self.registry().init(key.as_str(), config)?;
        Ok(ScriptClient {
            module: Arc::clone(self),
            key,
        })
    }

    /// Blocks the calling script thread until the query finishes. Must not be called from inside a tokio runtime.
    pub fn select_one_healthy_instance(
        &self,
        key: &str,
        service_name: &str,
        group_name: Option<&str>,
    ) -> Result<Instance, HostError> {
        let query = self
            .gateway
            .select_one_healthy_instance(key, service_name, group_name.unwrap_or(""));
        Ok(self.runtime.block_on(query)?)
    }

    pub fn select_all_instances(
        &self,
        key: &str,
        service_name: &str,
        group_name: Option<&str>,
    ) -> Result<Vec<Instance>, HostError> {
        let query = self
            .gateway
            .select_all_instances(key, service_name, group_name.unwrap_or(""));
        Ok(self.runtime.block_on(query)?)
    }
}

/// Client object handed to a script; every query goes to the key it was constructed with.
#[derive(Clone)]
pub struct ScriptClient {
    module: Arc<HostModule>,
    key: String,
}

impl std::fmt::Debug for ScriptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptClient").field("key", &self.key).finish_non_exhaustive()
    }
}

impl ScriptClient {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn select_one_healthy_instance(&self, service_name: &str, group_name: Option<&str>) -> Result<Instance, HostError> {
        self.module.select_one_healthy_instance(&self.key, service_name, group_name)
    }

    pub fn select_all_instances(&self, service_name: &str, group_name: Option<&str>) -> Result<Vec<Instance>, HostError> {
        self.module.select_all_instances(&self.key, service_name, group_name)
    }
}
