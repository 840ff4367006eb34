//! Data-source expression classification
//!
//! A mapping value is a string tagged by prefix: `doc:`/`case:` reference the
//! case document, `pv:` references a process variable, anything else is a
//! literal/manual expression. The prefix alone determines the kind, so
//! classification is re-derivable from the stored string at any time.

use serde::{Deserialize, Serialize};

pub const DOC_PREFIX: &str = "doc:";
pub const CASE_PREFIX: &str = "case:";
pub const PV_PREFIX: &str = "pv:";
pub const TEMPLATE_PREFIX: &str = "template:";

/// Where a mapped value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Empty,
    Document,
    ProcessVariable,
    Manual,
}

impl Default for SourceKind {
    fn default() -> Self {
        Self::Document
    }
}

/// Classify a raw expression string by its prefix
pub fn classify(expr: &str) -> SourceKind {
    if expr.trim().is_empty() {
        SourceKind::Empty
    } else if expr.starts_with(DOC_PREFIX) || expr.starts_with(CASE_PREFIX) {
        SourceKind::Document
    } else if expr.starts_with(PV_PREFIX) {
        SourceKind::ProcessVariable
    } else {
        SourceKind::Manual
    }
}

/// The recognized prefix of an expression, defaulting to `doc:` when none matches.
///
/// Together with [`extract_path`] this satisfies the round-trip contract:
/// `extract_prefix(e) + extract_path(e) == e` for any prefixed expression.
pub fn extract_prefix(expr: &str) -> &'static str {
    if expr.starts_with(CASE_PREFIX) {
        CASE_PREFIX
    } else if expr.starts_with(PV_PREFIX) {
        PV_PREFIX
    } else {
        DOC_PREFIX
    }
}

/// The expression with its matched prefix stripped
pub fn extract_path(expr: &str) -> &str {
    for prefix in [DOC_PREFIX, CASE_PREFIX, PV_PREFIX] {
        if let Some(path) = expr.strip_prefix(prefix) {
            return path;
        }
    }
    expr
}

/// Whether the expression should be handed to the host's value resolver at
/// execution time. Manual literals are passed through untouched.
pub fn is_resolvable(expr: &str) -> bool {
    expr.starts_with(DOC_PREFIX)
        || expr.starts_with(CASE_PREFIX)
        || expr.starts_with(PV_PREFIX)
        || expr.starts_with(TEMPLATE_PREFIX)
}
