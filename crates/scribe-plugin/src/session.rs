//! Configuration session state
//!
//! In-memory state of one generate-document configuration UI session: the
//! option lists fetched from the proxy API, the current form selections, and
//! the mapping editor. The host constructs the session before any data has
//! arrived; every payload that arrives later replaces the previous one
//! wholesale (last write wins), and the emitted configuration is recomputed
//! synchronously after every accepted mutation.

use scribe_core::job::FileFormat;
use scribe_core::template::{EnvironmentInfo, TemplateField, TemplateInfo, VariantInfo};
use scribe_mapping::{CompletenessStats, TreeEditor};

use crate::config::GenerateDocumentConfig;

/// State of one generate-document configuration session
#[derive(Default)]
pub struct ConfigSession {
    templates: Vec<TemplateInfo>,
    environments: Vec<EnvironmentInfo>,
    variants: Vec<VariantInfo>,
    templates_loading: bool,
    variants_loading: bool,
    environments_loading: bool,
    fields_loading: bool,

    template_id: String,
    variant_id: String,
    environment_id: String,
    output_format: FileFormat,
    filename: String,
    correlation_id: String,
    result_process_variable: String,

    editor: TreeEditor,
    process_variables: Vec<String>,
}

impl ConfigSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(&self) -> &TreeEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TreeEditor {
        &mut self.editor
    }

    pub fn templates(&self) -> &[TemplateInfo] {
        &self.templates
    }

    pub fn variants(&self) -> &[VariantInfo] {
        &self.variants
    }

    pub fn environments(&self) -> &[EnvironmentInfo] {
        &self.environments
    }

    pub fn process_variables(&self) -> &[String] {
        &self.process_variables
    }

    pub fn is_loading(&self) -> bool {
        self.templates_loading || self.variants_loading || self.environments_loading || self.fields_loading
    }

    // --- option lists, each replacing the previous payload wholesale ---

    pub fn begin_templates_loading(&mut self) {
        self.templates_loading = true;
    }

    /// A fetch failure surfaces as an empty list; the loading flag resets
    /// either way.
    pub fn set_templates(&mut self, templates: Vec<TemplateInfo>) {
        self.templates = templates;
        self.templates_loading = false;
    }

    pub fn begin_environments_loading(&mut self) {
        self.environments_loading = true;
    }

    pub fn set_environments(&mut self, environments: Vec<EnvironmentInfo>) {
        self.environments = environments;
        self.environments_loading = false;
    }

    pub fn begin_variants_loading(&mut self) {
        self.variants_loading = true;
    }

    pub fn set_variants(&mut self, variants: Vec<VariantInfo>) {
        self.variants = variants;
        self.variants_loading = false;
    }

    pub fn begin_fields_loading(&mut self) {
        self.fields_loading = true;
    }

    pub fn set_template_fields(&mut self, fields: Vec<TemplateField>) {
        self.editor.set_template_fields(fields);
        self.fields_loading = false;
    }

    pub fn set_process_variables(&mut self, names: Vec<String>) {
        self.process_variables = names;
    }

    // --- form selections ---

    /// Select a template. Changing the template clears the variant
    /// selection; the caller is expected to refetch variants and fields.
    pub fn select_template(&mut self, template_id: &str) -> bool {
        if self.template_id == template_id {
            return false;
        }
        self.template_id = template_id.to_string();
        self.variant_id.clear();
        self.variants.clear();
        true
    }

    pub fn select_variant(&mut self, variant_id: &str) -> bool {
        if self.variant_id == variant_id {
            return false;
        }
        self.variant_id = variant_id.to_string();
        true
    }

    pub fn select_environment(&mut self, environment_id: &str) {
        self.environment_id = environment_id.to_string();
    }

    pub fn set_output_format(&mut self, format: FileFormat) {
        self.output_format = format;
    }

    pub fn set_filename(&mut self, filename: &str) {
        self.filename = filename.to_string();
    }

    pub fn set_correlation_id(&mut self, correlation_id: &str) {
        self.correlation_id = correlation_id.to_string();
    }

    pub fn set_result_process_variable(&mut self, name: &str) {
        self.result_process_variable = name.to_string();
    }

    /// Load a previously persisted configuration (the prefill), replacing
    /// all selections and the mapping wholesale.
    pub fn load_prefill(&mut self, config: &GenerateDocumentConfig) {
        self.template_id = config.template_id.clone();
        self.variant_id = config.variant_id.clone().unwrap_or_default();
        self.environment_id = config.environment_id.clone().unwrap_or_default();
        self.output_format = config.output_format;
        self.filename = config.filename.clone();
        self.correlation_id = config.correlation_id.clone().unwrap_or_default();
        self.result_process_variable = config.result_process_variable.clone();
        self.editor.load_prefill(&config.data_mapping);
    }

    /// Required-field completeness of the current mapping. Advisory: an
    /// incomplete mapping does not block saving, the backend validates again
    /// on submission.
    pub fn completeness(&self) -> CompletenessStats {
        self.editor.completeness()
    }

    /// Whether the session holds a saveable configuration
    pub fn is_valid(&self) -> bool {
        !self.template_id.trim().is_empty()
            && !self.filename.trim().is_empty()
            && !self.result_process_variable.trim().is_empty()
    }

    /// The configuration to hand back to the host, if valid
    pub fn configuration(&self) -> Option<GenerateDocumentConfig> {
        if !self.is_valid() {
            return None;
        }
        Some(GenerateDocumentConfig {
            template_id: self.template_id.clone(),
            variant_id: non_empty(&self.variant_id),
            variant_attributes: None,
            environment_id: non_empty(&self.environment_id),
            data_mapping: self.editor.mapping_json(),
            output_format: self.output_format,
            filename: self.filename.clone(),
            correlation_id: non_empty(&self.correlation_id),
            result_process_variable: self.result_process_variable.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::template::TemplateField;
    use serde_json::json;

    fn fields() -> Vec<TemplateField> {
        vec![
            TemplateField::scalar("customerName", true),
            TemplateField::scalar("amount", true),
        ]
    }

    #[test]
    fn test_session_tolerates_data_arriving_late() {
        let mut session = ConfigSession::new();
        assert_eq!(session.completeness(), CompletenessStats::default());
        session.set_template_fields(fields());
        assert_eq!(session.completeness(), CompletenessStats { mapped: 0, total: 2 });
    }

    #[test]
    fn test_template_change_clears_variant() {
        let mut session = ConfigSession::new();
        session.select_template("invoice");
        session.select_variant("invoice-nl");
        assert!(session.select_template("contract"));
        assert!(session.configuration().is_none());
        session.set_filename("contract.pdf");
        session.set_result_process_variable("requestId");
        let config = session.configuration().unwrap();
        assert_eq!(config.template_id, "contract");
        assert!(config.variant_id.is_none());
    }

    #[test]
    fn test_reselecting_same_template_keeps_the_variant() {
        let mut session = ConfigSession::new();
        session.set_filename("invoice.pdf");
        session.set_result_process_variable("requestId");
        assert!(session.select_template("invoice"));
        session.select_variant("invoice-nl");
        assert!(!session.select_template("invoice"));
        let config = session.configuration().unwrap();
        assert_eq!(config.variant_id.as_deref(), Some("invoice-nl"));
    }

    #[test]
    fn test_validity_requires_template_filename_and_variable() {
        let mut session = ConfigSession::new();
        session.set_template_fields(fields());
        assert!(!session.is_valid());
        session.select_template("invoice");
        session.set_filename("invoice.pdf");
        assert!(!session.is_valid());
        session.set_result_process_variable("requestId");
        assert!(session.is_valid());
        // Completeness is advisory, not blocking
        assert_eq!(session.completeness(), CompletenessStats { mapped: 0, total: 2 });
        assert!(session.configuration().is_some());
    }

    #[test]
    fn test_prefill_replaces_everything() {
        let mut session = ConfigSession::new();
        session.set_template_fields(fields());
        session.editor_mut().set_value("amount", "pv:total");
        session.load_prefill(&GenerateDocumentConfig {
            template_id: "invoice".to_string(),
            variant_id: Some("invoice-nl".to_string()),
            variant_attributes: None,
            environment_id: None,
            data_mapping: json!({"customerName": "doc:customer.name"}),
            output_format: FileFormat::Html,
            filename: "invoice.html".to_string(),
            correlation_id: None,
            result_process_variable: "requestId".to_string(),
        });
        let config = session.configuration().unwrap();
        assert_eq!(config.data_mapping, json!({"customerName": "doc:customer.name"}));
        assert_eq!(config.output_format, FileFormat::Html);
        assert_eq!(session.completeness(), CompletenessStats { mapped: 1, total: 2 });
    }
}
