//! Client registry: caller-chosen key -> live naming client. Shared by all workers of a process.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::naming::{ClientFactory, NamingClient};
use crate::{ConnectionConfig, DiscoveryError, NacosClientFactory};

/// One registry entry. Never mutated; a later successful `init` replaces it wholesale.
#[derive(Clone)]
pub struct RegisteredClient {
    pub client: Arc<dyn NamingClient>,
    /// Group from the construction config, applied to queries that pass none.
    pub default_group: String,
}

/// Key -> client map behind a lock. Construction runs outside the lock; only the insert is serialized.
pub struct ClientRegistry {
    factory: Box<dyn ClientFactory>,
    entries: RwLock<HashMap<String, RegisteredClient>>,
}

impl ClientRegistry {
    /// Registry that builds Nacos HTTP clients.
    pub fn new() -> Self {
        Self::with_factory(NacosClientFactory)
    }

    /// Registry with a custom client constructor (e.g. a fake in tests).
    pub fn with_factory(factory: impl ClientFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Build a client from `config` and store it under `key`, replacing any previous entry.
    /// On failure nothing is written and the previous entry (if any) stays as it was.
    pub fn init(&self, key: impl Into<String>, config: &ConnectionConfig) -> Result<(), DiscoveryError> {
        let key = key.into();
        let client = match self.factory.create(config) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discovery client construction failed; keeping previous entry");
                return Err(e);
            }
        };
        let entry = RegisteredClient {
            client,
            default_group: config.group.clone(),
        };
        let replaced = self.write().insert(key.clone(), entry).is_some();
        tracing::debug!(key = %key, server = %config.authority(), replaced, "discovery client registered");
        Ok(())
    }

    /// Entry for `key`. The clone is taken under the read lock, so callers never see a partial entry.
    pub fn get(&self, key: &str) -> Result<RegisteredClient, DiscoveryError> {
        self.read()
            .get(key)
            .cloned()
            .ok_or_else(|| DiscoveryError::UnknownClientKey(key.to_owned()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    // Writers never panic mid-insert, so a poisoned map is still whole.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegisteredClient>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegisteredClient>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
