//! Assembles the Axum [`Router`] from all handler modules.

use std::sync::Arc;

use axum::{
    http::Method,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::{
    config::NodeConfig,
    handlers::{channels, devices, fallback, AppState},
    inventory,
    middleware::jsonapi::{jsonapi_middleware, panic_response, JsonApiMiddleware},
    routing::RouteTable,
    storage::Storage,
};

/// Named mirror of the routes below, consulted for `related` links.
pub fn route_table(base_path: &str) -> RouteTable {
    RouteTable::new(base_path)
        .route(&[Method::GET, Method::POST], "/devices", "devices")
        .route(&[Method::GET], "/devices/{id}", "device")
        .route(&[Method::GET], "/devices/{id}/channels", "device.channels")
        .route(
            &[Method::GET],
            "/devices/{id}/relationships/channels",
            "device.relationships.channels",
        )
        .route(&[Method::GET, Method::POST], "/channels", "channels")
        .route(&[Method::GET], "/channels/{id}", "channel")
        .route(&[Method::GET], "/channels/{id}/device", "channel.device")
        .route(
            &[Method::GET],
            "/channels/{id}/relationships/device",
            "channel.relationships.device",
        )
}

/// Build the complete application router with shared state.
pub fn build_router(storage: Arc<dyn Storage>, config: NodeConfig) -> Router {
    let state = AppState::new(storage);
    let middleware = Arc::new(JsonApiMiddleware::new(
        config.jsonapi.clone(),
        Arc::new(inventory::schemas()),
        Arc::new(route_table(&config.base_path)),
    ));

    let api = Router::new()
        // Devices
        .route("/devices", get(devices::list).post(devices::create))
        .route("/devices/{id}", get(devices::get_by_id))
        .route("/devices/{id}/channels", get(devices::channels))
        .route(
            "/devices/{id}/relationships/channels",
            get(devices::channels_relationship),
        )
        // Channels
        .route("/channels", get(channels::list).post(channels::create))
        .route("/channels/{id}", get(channels::get_by_id))
        .route("/channels/{id}/device", get(channels::device))
        .route(
            "/channels/{id}/relationships/device",
            get(channels::device_relationship),
        )
        .method_not_allowed_fallback(fallback::method_not_allowed)
        .with_state(state);

    let app = if config.base_path.is_empty() {
        api
    } else {
        Router::new().nest(&config.base_path, api)
    };

    app.fallback(fallback::not_found)
        // Panics surface as unclassified errors, so this sits inside the formatter.
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(middleware, jsonapi_middleware))
        .layer(TraceLayer::new_for_http())
}
