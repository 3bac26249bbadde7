//! Instance: one endpoint backing a service, as returned by the naming server.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One discovered endpoint. Produced fresh per query; never cached by the registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Instance {
    pub instance_id: String,
    pub ip: String,
    pub port: u64,
    pub weight: f64,
    pub healthy: bool,
    pub enabled: bool,
    pub ephemeral: bool,
    pub cluster_name: String,
    pub service_name: String,
    pub metadata: HashMap<String, String>,
}

impl Instance {
    pub fn new(ip: impl Into<String>, port: u64) -> Self {
        Self {
            ip: ip.into(),
            port,
            weight: 1.0,
            healthy: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Eligible for single-instance selection: healthy, enabled, positive weight.
    pub fn is_selectable(&self) -> bool {
        self.healthy && self.enabled && self.weight > 0.0
    }
}

/// Body of `GET /v1/ns/instance/list`. Only the host list is used.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct InstanceList {
    pub hosts: Vec<Instance>,
}
