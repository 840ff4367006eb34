//! Scribe API: proxy REST endpoints consumed by the host configuration UI
//!
//! The configuration UI never talks to Scribe directly; it goes through
//! these endpoints, which look up the plugin configuration, call Scribe with
//! its credentials, and pass the answers through. Upstream failures surface
//! as empty option lists or a gateway error, never as partial schema data.

pub mod handlers;
pub mod store;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use scribe_plugin::ProcessVariableDiscovery;
use store::ConfigurationStore;

/// Shared state of the proxy layer
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConfigurationStore + Send + Sync>,
    pub variables: Arc<ProcessVariableDiscovery>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/v1/plugin/scribe/configurations/:configuration_id/templates",
            get(handlers::get_templates),
        )
        .route(
            "/api/v1/plugin/scribe/configurations/:configuration_id/templates/:template_id",
            get(handlers::get_template_details),
        )
        .route(
            "/api/v1/plugin/scribe/configurations/:configuration_id/environments",
            get(handlers::get_environments),
        )
        .route(
            "/api/v1/plugin/scribe/configurations/:configuration_id/templates/:template_id/variants",
            get(handlers::get_variants),
        )
        .route(
            "/api/v1/plugin/scribe/process-variables",
            get(handlers::get_process_variables),
        )
        .route(
            "/api/v1/plugin/scribe/configurations/:configuration_id/templates/:template_id/validate-mapping",
            post(handlers::validate_mapping),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!("Scribe plugin API listening on {}", addr);
    axum::serve(listener, app).await.expect("Server error");
}
