//! xnacos core: named registry of discovery clients and the query gateway in front of it.
//! Shared by the Rust facade and the Python binding.

pub mod balancer;
pub mod config;
pub mod connectivity;
pub mod gateway;
pub mod http;
pub mod instance;
pub mod naming;
pub mod registry;

pub use config::{ConnectionConfig, QueryParams, DEFAULT_GROUP};
pub use connectivity::ConnectivityExt;
pub use gateway::DiscoveryGateway;
pub use http::{NacosClientFactory, NacosNamingClient};
pub use instance::Instance;
pub use naming::{ClientFactory, NamingClient};
pub use registry::{ClientRegistry, RegisteredClient};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("connectivity error: {0}")]
    Connectivity(String),
    #[error("no discovery client registered under key {0:?}")]
    UnknownClientKey(String),
    #[error("healthy instance list is empty for service {0:?}")]
    NoHealthyInstance(String),
    #[error("discovery server returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DiscoveryError {
    /// True when the key was never initialized (as opposed to a failure of a live client).
    pub fn is_unknown_key(&self) -> bool {
        matches!(self, DiscoveryError::UnknownClientKey(_))
    }
}
