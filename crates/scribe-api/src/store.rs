//! Plugin configuration lookup
//!
//! The host owns plugin configuration persistence; the proxy layer only
//! needs to resolve a configuration id to its properties. The in-memory
//! store backs the standalone binary and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use scribe_plugin::PluginProperties;

/// Resolves a plugin configuration id to its properties
pub trait ConfigurationStore {
    fn properties(&self, configuration_id: Uuid) -> Option<PluginProperties>;
}

/// Simple in-memory store
#[derive(Default)]
pub struct InMemoryConfigurationStore {
    configurations: RwLock<HashMap<Uuid, PluginProperties>>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, configuration_id: Uuid, properties: PluginProperties) {
        if let Ok(mut configurations) = self.configurations.write() {
            configurations.insert(configuration_id, properties);
        }
    }

    /// Register a configuration built from `SCRIBE_BASE_URL`,
    /// `SCRIBE_API_KEY`, and `SCRIBE_TENANT_ID`; returns its id.
    pub fn register_from_env(&self) -> Option<Uuid> {
        let base_url = std::env::var("SCRIBE_BASE_URL").ok()?;
        let api_key = std::env::var("SCRIBE_API_KEY").ok()?;
        let tenant_id = std::env::var("SCRIBE_TENANT_ID").ok()?;
        let properties = PluginProperties {
            base_url,
            api_key,
            tenant_id,
            default_environment_id: std::env::var("SCRIBE_DEFAULT_ENVIRONMENT").ok(),
            template_sync_enabled: None,
        };
        let id = Uuid::new_v4();
        self.insert(id, properties);
        Some(id)
    }
}

impl ConfigurationStore for InMemoryConfigurationStore {
    fn properties(&self, configuration_id: Uuid) -> Option<PluginProperties> {
        self.configurations
            .read()
            .ok()
            .and_then(|configurations| configurations.get(&configuration_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_round_trip() {
        let store = InMemoryConfigurationStore::new();
        let id = Uuid::new_v4();
        store.insert(
            id,
            PluginProperties {
                base_url: "https://scribe.example.com".to_string(),
                api_key: "secret".to_string(),
                tenant_id: "acme".to_string(),
                default_environment_id: None,
                template_sync_enabled: None,
            },
        );
        assert_eq!(store.properties(id).map(|p| p.tenant_id), Some("acme".to_string()));
        assert!(store.properties(Uuid::new_v4()).is_none());
    }
}
