use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use zipcoder::builder::CacheBuilder;
use zipcoder::config::ServerConfig;
use zipcoder::dataset::JsonDataset;
use zipcoder::store::{CacheStore, HttpStore, MemoryStore};
use zipcoder::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zipcoder=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    // Networked store when configured, otherwise in-process
    let store: Arc<dyn CacheStore> = match config.store.clone() {
        Some(store_config) => {
            Arc::new(HttpStore::new(store_config).expect("Failed to create store client"))
        }
        None => Arc::new(MemoryStore::new()),
    };
    store.init().await.expect("Cache store unavailable");

    // Build the cache before serving (fail fast on a bad dataset)
    let dataset = JsonDataset::new(&config.data_path);
    let builder: CacheBuilder = CacheBuilder::new(Arc::clone(&store));
    builder
        .load(&dataset)
        .await
        .expect("Failed to load location dataset");

    let app = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listen address");
    info!(addr = %config.bind, "zipcoder listening");
    info!("  GET  /zip/:code            - Location for a code");
    info!("  GET  /city?q=City,ST       - City summary");
    info!("  GET  /zips/cities?codes=   - Cities owning a set of codes");

    axum::serve(listener, app).await.expect("Server error");
}
