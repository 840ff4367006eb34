//! Plugin-level configuration properties
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use scribe_core::ScribeError;

/// Scribe slug pattern: lowercase alphanumeric with hyphens, no leading or
/// trailing hyphens. Used for tenant and environment ids.
static SLUG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new("^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("slug pattern is valid")
});

/// Connection settings and defaults of one plugin configuration, as entered
/// by an administrator in the host's plugin management UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginProperties {
    pub base_url: String,
    pub api_key: String,
    /// Tenant slug in Scribe, e.g. "acme-corp"
    pub tenant_id: String,
    /// Default environment for generation, overridable per action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment_id: Option<String>,
    /// Sync template definitions from disk on startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_sync_enabled: Option<bool>,
}

impl PluginProperties {
    /// Validate the slugs. Required-ness of the fields themselves is the
    /// host's concern; blank values pass through here.
    pub fn validate(&self) -> Result<(), ScribeError> {
        validate_slug("tenantId", &self.tenant_id, 3, 63)?;
        if let Some(environment_id) = self.default_environment_id.as_deref() {
            if !environment_id.trim().is_empty() {
                validate_slug("defaultEnvironmentId", environment_id, 3, 30)?;
            }
        }
        Ok(())
    }

    pub fn is_template_sync_enabled(&self) -> bool {
        self.template_sync_enabled == Some(true)
    }
}

fn validate_slug(property: &str, value: &str, min_len: usize, max_len: usize) -> Result<(), ScribeError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if value.len() < min_len || value.len() > max_len {
        return Err(ScribeError::config(format!(
            "'{}' must be between {} and {} characters, got {}: '{}'",
            property,
            min_len,
            max_len,
            value.len(),
            value
        )));
    }
    if !SLUG_PATTERN.is_match(value) {
        return Err(ScribeError::config(format!(
            "'{}' must be a lowercase slug (pattern: {}): '{}'",
            property,
            SLUG_PATTERN.as_str(),
            value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(tenant: &str, environment: Option<&str>) -> PluginProperties {
        PluginProperties {
            base_url: "https://scribe.example.com".to_string(),
            api_key: "secret".to_string(),
            tenant_id: tenant.to_string(),
            default_environment_id: environment.map(str::to_string),
            template_sync_enabled: None,
        }
    }

    #[test]
    fn test_valid_slugs_pass() {
        assert!(properties("acme-corp", Some("production")).validate().is_ok());
        assert!(properties("my-tenant", None).validate().is_ok());
    }

    #[test]
    fn test_uppercase_and_leading_hyphen_are_rejected() {
        assert!(properties("Acme", None).validate().is_err());
        assert!(properties("-acme", None).validate().is_err());
        assert!(properties("acme-", None).validate().is_err());
    }

    #[test]
    fn test_length_bounds() {
        assert!(properties("ab", None).validate().is_err());
        assert!(properties(&"a".repeat(64), None).validate().is_err());
        assert!(properties("acme", Some(&"e".repeat(31))).validate().is_err());
    }

    #[test]
    fn test_blank_optional_environment_is_allowed() {
        assert!(properties("acme", Some("")).validate().is_ok());
    }

    #[test]
    fn test_sync_flag_defaults_off() {
        assert!(!properties("acme", None).is_template_sync_enabled());
        let mut props = properties("acme", None);
        props.template_sync_enabled = Some(true);
        assert!(props.is_template_sync_enabled());
    }
}
