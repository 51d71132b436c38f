//! `jsonapi-node`: JSON:API reference node serving an in-memory inventory.
//!
//! # Quick start
//!
//! ```sh
//! # In-memory node on the default port:
//! jsonapi-node
//!
//! # Custom bind address, mount prefix and document meta:
//! JSONAPI_BIND=0.0.0.0:8080 JSONAPI_BASE_PATH=/api JSONAPI_META_AUTHOR="ACME" jsonapi-node
//! ```
//!
//! # Environment variables
//!
//! See [`jsonapi_node::config::NodeConfig::from_env`] for the full list.

use std::sync::Arc;

use jsonapi_node::{build_router, config::NodeConfig, MemoryStorage, Storage};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jsonapi_node=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = NodeConfig::from_env();

    tracing::info!("storage: in-memory (data will not survive restart)");
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

    if !config.base_path.is_empty() {
        tracing::info!("routes mounted under {}", config.base_path);
    }
    let app = build_router(storage, config.clone());

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    axum::serve(listener, app)
        .await
        .expect("server error");
}
