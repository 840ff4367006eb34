//! API Handlers
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use scribe_client::ScribeClient;
use scribe_core::ScribeError;
use scribe_mapping::{
    find_missing_required_fields, find_missing_required_fields_nested, nested_from_json,
    ValidationResult,
};
use scribe_plugin::ScribePlugin;

use crate::AppState;

type HandlerError = (StatusCode, Json<Value>);

pub async fn get_templates(
    State(state): State<AppState>,
    Path(configuration_id): Path<Uuid>,
) -> Result<Json<Value>, HandlerError> {
    tracing::debug!(%configuration_id, "fetching templates");
    let client = client_for(&state, configuration_id)?;
    let templates = client.get_templates().await.map_err(upstream)?;
    Ok(Json(json!(templates)))
}

pub async fn get_template_details(
    State(state): State<AppState>,
    Path((configuration_id, template_id)): Path<(Uuid, String)>,
) -> Result<Json<Value>, HandlerError> {
    tracing::debug!(%configuration_id, template_id, "fetching template details");
    let client = client_for(&state, configuration_id)?;
    let details = client.get_template_details(&template_id).await.map_err(upstream)?;
    Ok(Json(json!(details)))
}

pub async fn get_environments(
    State(state): State<AppState>,
    Path(configuration_id): Path<Uuid>,
) -> Result<Json<Value>, HandlerError> {
    tracing::debug!(%configuration_id, "fetching environments");
    let client = client_for(&state, configuration_id)?;
    let environments = client.get_environments().await.map_err(upstream)?;
    Ok(Json(json!(environments)))
}

pub async fn get_variants(
    State(state): State<AppState>,
    Path((configuration_id, template_id)): Path<(Uuid, String)>,
) -> Result<Json<Value>, HandlerError> {
    tracing::debug!(%configuration_id, template_id, "fetching variants");
    let client = client_for(&state, configuration_id)?;
    let variants = client.get_variants(&template_id).await.map_err(upstream)?;
    Ok(Json(json!(variants)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVariablesQuery {
    process_definition_key: String,
}

pub async fn get_process_variables(
    State(state): State<AppState>,
    Query(query): Query<ProcessVariablesQuery>,
) -> Json<Value> {
    let names = state.variables.discover(&query.process_definition_key);
    Json(json!(names))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMappingRequest {
    #[serde(default)]
    data_mapping: Value,
}

/// Validate a data mapping against the template's current schema.
///
/// Accepts both mapping shapes: the nested shape the tree editor emits, and
/// the flat dotted-path shape of the table editor (recognized by all-string
/// values with at least one dotted key).
pub async fn validate_mapping(
    State(state): State<AppState>,
    Path((configuration_id, template_id)): Path<(Uuid, String)>,
    Json(request): Json<ValidateMappingRequest>,
) -> Result<Json<ValidationResult>, HandlerError> {
    tracing::debug!(%configuration_id, template_id, "validating mapping");
    let client = client_for(&state, configuration_id)?;
    let details = client.get_template_details(&template_id).await.map_err(upstream)?;

    let missing = match flat_entries(&request.data_mapping) {
        Some(flat) => find_missing_required_fields(&details.fields, &flat),
        None => {
            let nested = nested_from_json(&request.data_mapping);
            find_missing_required_fields_nested(&details.fields, &nested)
        }
    };
    Ok(Json(ValidationResult::new(missing)))
}

/// Interpret the payload as the flat shape when every value is a string and
/// at least one key is a dotted path
fn flat_entries(mapping: &Value) -> Option<std::collections::BTreeMap<String, String>> {
    let map = mapping.as_object()?;
    if !map.keys().any(|k| k.contains('.')) {
        return None;
    }
    let mut flat = std::collections::BTreeMap::new();
    for (key, value) in map {
        flat.insert(key.clone(), value.as_str()?.to_string());
    }
    Some(flat)
}

fn client_for(state: &AppState, configuration_id: Uuid) -> Result<ScribeClient, HandlerError> {
    let properties = state.store.properties(configuration_id).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("unknown plugin configuration: {}", configuration_id)})),
        )
    })?;
    let plugin = ScribePlugin::new(properties).map_err(|e| {
        tracing::error!(%configuration_id, error = %e, "invalid plugin configuration");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
    })?;
    Ok(plugin.client().clone())
}

fn upstream(error: ScribeError) -> HandlerError {
    tracing::error!(error = %error, "upstream Scribe call failed");
    (StatusCode::BAD_GATEWAY, Json(json!({"error": error.to_string()})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_entries_detects_dotted_string_maps() {
        let flat = flat_entries(&json!({"invoice.date": "pv:today", "customerName": "doc:x"})).unwrap();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("invoice.date").map(String::as_str), Some("pv:today"));
    }

    #[test]
    fn test_nested_payload_is_not_flat() {
        assert!(flat_entries(&json!({"invoice": {"date": "pv:today"}})).is_none());
        assert!(flat_entries(&json!({"customerName": "doc:x"})).is_none());
        assert!(flat_entries(&json!("nonsense")).is_none());
    }
}
