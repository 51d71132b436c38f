//! Shared helpers for the JSON:API conformance test suite.
//!
//! Provides [`spawn_node`], a function that binds a `TcpListener` on an
//! ephemeral port, wires up an in-process node backed by `MemoryStorage`,
//! and returns both the local URL and a reference to the underlying storage
//! so tests can pre-populate data without going through the HTTP layer.

use std::sync::Arc;

use jsonapi_node::{build_router, config::NodeConfig, JsonApiConfig, MemoryStorage, Storage};

/// Start an ephemeral in-process node and return `(base_url, storage)`.
///
/// The node runs in a background `tokio` task and is bound to an OS-assigned
/// port on `127.0.0.1`. The returned `String` is the server root, e.g.
/// `http://127.0.0.1:51234`; routes live under `base_path` below it.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound or the node fails to start.
pub async fn spawn_node_with(base_path: &str, jsonapi: JsonApiConfig) -> (String, Arc<MemoryStorage>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let mem_storage = Arc::new(MemoryStorage::new());
    let storage: Arc<dyn Storage> = Arc::clone(&mem_storage) as Arc<dyn Storage>;

    let config = NodeConfig {
        bind_addr: addr,
        base_path: base_path.to_string(),
        jsonapi: jsonapi.with_url_prefix(base_path),
    };
    let router = build_router(storage, config);

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance node error");
    });

    (base_url, mem_storage)
}

/// [`spawn_node_with`] at the root path with conformance meta.
pub async fn spawn_node() -> (String, Arc<MemoryStorage>) {
    spawn_node_with(
        "",
        JsonApiConfig::default()
            .with_authors(["Conformance Suite"])
            .with_copyright("Public Domain"),
    )
    .await
}
