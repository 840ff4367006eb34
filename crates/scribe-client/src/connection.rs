//! Connection settings for the Scribe API
use scribe_core::ScribeError;

/// Where and as whom to talk to Scribe. Built from the plugin configuration
/// the host hands us; one connection per plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    base_url: String,
    api_key: String,
    tenant_id: String,
}

impl Connection {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Result<Self, ScribeError> {
        let base_url = base_url.into();
        let api_key = api_key.into();
        let tenant_id = tenant_id.into();
        if base_url.trim().is_empty() {
            return Err(ScribeError::config("base URL must not be empty"));
        }
        if api_key.trim().is_empty() {
            return Err(ScribeError::config("API key must not be empty"));
        }
        if tenant_id.trim().is_empty() {
            return Err(ScribeError::config("tenant ID must not be empty"));
        }
        Ok(Connection {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            tenant_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Absolute URL of a tenant-scoped API path
    pub fn tenant_url(&self, suffix: &str) -> String {
        format!(
            "{}/tenants/{}/{}",
            self.base_url,
            self.tenant_id,
            suffix.trim_start_matches('/')
        )
    }
}
