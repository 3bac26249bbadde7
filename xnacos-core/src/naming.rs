//! Naming capability: the two queries the gateway forwards, and the constructor the registry calls.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{ConnectionConfig, DiscoveryError, Instance, QueryParams};

/// A live session with one discovery-server cluster under one namespace.
/// Implementations: `NacosNamingClient`, fakes in tests. Must be safe for concurrent queries.
#[async_trait]
pub trait NamingClient: Send + Sync {
    /// Exactly one healthy instance; "none healthy" is an error, never an empty success.
    async fn select_one_healthy_instance(&self, params: &QueryParams) -> Result<Instance, DiscoveryError>;

    /// All instances, healthy or not, in server order.
    async fn select_all_instances(&self, params: &QueryParams) -> Result<Vec<Instance>, DiscoveryError>;
}

/// Builds a client from typed config. Errors are returned to the Init caller unmodified.
pub trait ClientFactory: Send + Sync {
    fn create(&self, config: &ConnectionConfig) -> Result<Arc<dyn NamingClient>, DiscoveryError>;
}

impl<F> ClientFactory for F
where
    F: Fn(&ConnectionConfig) -> Result<Arc<dyn NamingClient>, DiscoveryError> + Send + Sync,
{
    fn create(&self, config: &ConnectionConfig) -> Result<Arc<dyn NamingClient>, DiscoveryError> {
        self(config)
    }
}
