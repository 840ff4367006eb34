//! Process variable discovery
//!
//! The `pv:` picker in the configuration UI is populated with an advisory
//! list of variable names. Names come from complementary sources (historic
//! instances, the workflow model definition); results are merged,
//! deduplicated, and sorted. A failing source degrades to nothing rather
//! than failing discovery as a whole.

use std::collections::BTreeSet;

use scribe_core::ScribeError;

/// One supplier of process variable names for a workflow definition
pub trait ProcessVariableSource {
    /// Label used when logging a failing source
    fn name(&self) -> &str;

    fn variable_names(&self, process_definition_key: &str) -> Result<Vec<String>, ScribeError>;
}

/// Merges variable names from all registered sources
#[derive(Default)]
pub struct ProcessVariableDiscovery {
    sources: Vec<Box<dyn ProcessVariableSource + Send + Sync>>,
}

impl ProcessVariableDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn ProcessVariableSource + Send + Sync>) -> Self {
        self.sources.push(source);
        self
    }

    /// Sorted, deduplicated variable names for a workflow definition
    pub fn discover(&self, process_definition_key: &str) -> Vec<String> {
        let mut names = BTreeSet::new();
        for source in &self.sources {
            match source.variable_names(process_definition_key) {
                Ok(found) => names.extend(found),
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        process_definition_key,
                        error = %e,
                        "failed to discover process variables"
                    );
                }
            }
        }
        names.into_iter().collect()
    }
}
