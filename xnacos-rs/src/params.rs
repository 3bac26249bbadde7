//! Construction arguments as scripts pass them: an untyped object with camelCase keys.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use xnacos_core::ConnectionConfig;

use crate::HostError;

/// `{ ipAddr, port, username, password, namespaceId, group }`; missing fields default to empty/zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NacosParams {
    pub ip_addr: String,
    pub port: u64,
    pub username: String,
    pub password: String,
    /// Empty for the public namespace.
    pub namespace_id: String,
    pub group: String,
    pub timeout_ms: Option<u64>,
    pub context_path: Option<String>,
}

impl NacosParams {
    /// Parse a script value. Anything but an object is rejected before reaching the registry.
    pub fn from_value(value: &Value) -> Result<Self, HostError> {
        match value {
            Value::Null => Err(HostError::InvalidArgument("not enough arguments".into())),
            Value::Object(_) => serde_json::from_value(value.clone())
                .map_err(|e| HostError::InvalidArgument(e.to_string())),
            other => Err(HostError::InvalidArgument(format!(
                "expected a configuration object, got {}",
                kind(other)
            ))),
        }
    }

    pub fn into_config(self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(self.ip_addr, self.port)
            .with_credentials(self.username, self.password)
            .with_namespace(self.namespace_id)
            .with_group(self.group);
        if let Some(ms) = self.timeout_ms {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        if let Some(path) = self.context_path {
            config = config.with_context_path(path);
        }
        config
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
