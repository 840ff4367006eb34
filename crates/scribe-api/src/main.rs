//! Binary entrypoint for the Scribe plugin API server.
use std::sync::Arc;

use scribe_api::store::InMemoryConfigurationStore;
use scribe_api::{run, AppState};
use scribe_plugin::ProcessVariableDiscovery;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let store = InMemoryConfigurationStore::new();
    match store.register_from_env() {
        Some(id) => tracing::info!(configuration_id = %id, "registered plugin configuration from environment"),
        None => tracing::warn!("SCRIBE_BASE_URL/SCRIBE_API_KEY/SCRIBE_TENANT_ID not set, no configuration registered"),
    }

    let state = AppState {
        store: Arc::new(store),
        variables: Arc::new(ProcessVariableDiscovery::new()),
    };

    // Default listen address can be overridden with SCRIBE_ADDR
    let addr = std::env::var("SCRIBE_ADDR").unwrap_or_else(|_| "0.0.0.0:8787".to_string());
    run(&addr, state).await;
}
