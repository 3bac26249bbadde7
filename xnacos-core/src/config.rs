//! Typed connection parameters for one discovery-server cluster, and per-query parameters.

use std::time::Duration;

use crate::DiscoveryError;

/// Group Nacos applies when a query names none.
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

const DEFAULT_CONTEXT_PATH: &str = "/nacos";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection parameters: server address, credentials, namespace. Immutable once a client is built from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub ip_addr: String,
    pub port: u64,
    pub username: String,
    pub password: String,
    /// Empty string means the public namespace.
    pub namespace_id: String,
    /// Stored with the registry entry and used when a query passes an empty group.
    pub group: String,
    pub context_path: String,
    /// Upper bound for every request the client makes.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(ip_addr: impl Into<String>, port: u64) -> Self {
        Self {
            ip_addr: ip_addr.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn with_namespace(mut self, namespace_id: impl Into<String>) -> Self {
        self.namespace_id = namespace_id.into();
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// "host:port" authority for the HTTP client.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.ip_addr, self.port)
    }

    /// Reject parameters no client could connect with.
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        if self.ip_addr.is_empty() {
            return Err(DiscoveryError::Configuration("server address is empty".into()));
        }
        if !is_valid_host(&self.ip_addr) {
            return Err(DiscoveryError::Configuration(format!(
                "malformed server address {:?}",
                self.ip_addr
            )));
        }
        if self.port == 0 || self.port > u64::from(u16::MAX) {
            return Err(DiscoveryError::Configuration(format!(
                "server port {} out of range",
                self.port
            )));
        }
        if self.timeout.is_zero() {
            return Err(DiscoveryError::Configuration("request timeout must be positive".into()));
        }
        if !self.context_path.starts_with('/') {
            return Err(DiscoveryError::Configuration(format!(
                "context path {:?} must start with '/'",
                self.context_path
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ip_addr: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            namespace_id: String::new(),
            group: String::new(),
            context_path: DEFAULT_CONTEXT_PATH.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Hostname, IPv4 literal, or bracketed IPv6 literal.
fn is_valid_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner.parse::<std::net::Ipv6Addr>().is_ok();
    }
    if host.len() > 253 {
        return false;
    }
    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

/// Service name and group of one discovery query. An empty group falls back to the client's default.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub service_name: String,
    pub group_name: String,
}

impl QueryParams {
    pub fn new(service_name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            group_name: group_name.into(),
        }
    }

    /// Group sent to the server: the given one, or `DEFAULT_GROUP` when empty.
    pub fn effective_group(&self) -> &str {
        if self.group_name.is_empty() {
            DEFAULT_GROUP
        } else {
            &self.group_name
        }
    }
}
