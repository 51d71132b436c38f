//! Channel handlers. A channel always belongs to exactly one device.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
};
use jsonapi_core::{Hydrated, JsonApiError};
use serde_json::Value;

use crate::{
    error::ApiError,
    inventory::{DeviceResource, DEVICES},
    pagination::JsonApiQuery,
    response::JsonApiResponse,
    storage::Channel,
};

use super::{parse_document, storage_page, AppState};

const DEVICE_POINTER: &str = "/data/relationships/device/data";

/// `GET /channels`
pub async fn list(State(state): State<AppState>, uri: Uri) -> Result<JsonApiResponse, ApiError> {
    let query = JsonApiQuery::from_uri(&uri);
    let listing = state.storage.list_channels(storage_page(&query)).await?;

    let mut resources = Vec::with_capacity(listing.items.len());
    for channel in listing.items {
        resources.push(state.channel_resource(channel).await?);
    }
    Ok(JsonApiResponse::collection(resources).with_total_count(listing.total))
}

/// `POST /channels`. The owning device comes from `relationships.device`.
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<JsonApiResponse, ApiError> {
    let document = parse_document(&body)?;
    let values = state.hydrators.channels.hydrate(&document)?;

    let device_id = related_device_id(&document)?;
    let device = state.storage.get_device(&device_id).await?.ok_or_else(|| {
        JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid relationship")
            .with_detail(format!("device {device_id} does not exist"))
            .with_pointer(format!("{DEVICE_POINTER}/id"))
    })?;

    let channel = new_channel(&device.id, &values);
    state.storage.put_channel(&channel).await?;
    tracing::info!(id = %channel.id, device = %device.id, "channel created");

    Ok(JsonApiResponse::resource(state.channel_resource(channel).await?)
        .with_status(StatusCode::CREATED))
}

fn related_device_id(document: &Value) -> Result<String, JsonApiError> {
    let linkage = document
        .pointer(DEVICE_POINTER)
        .filter(|l| l.get("type").and_then(Value::as_str) == Some(DEVICES));
    linkage
        .and_then(|l| l.get("id"))
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Missing relationship")
                .with_detail("A channel must reference its device")
                .with_pointer(DEVICE_POINTER)
        })
}

fn new_channel(device_id: &str, values: &Hydrated) -> Channel {
    let text = |key: &str| values.get(key).and_then(|v| v.as_str()).map(String::from);
    Channel {
        id: uuid::Uuid::now_v7().to_string(),
        device_id: device_id.to_string(),
        identifier: text("identifier").unwrap_or_default(),
        name: text("name"),
        unit: text("unit"),
        step: values.get("step").and_then(|v| v.as_f64()),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// `GET /channels/{id}`
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApiResponse, ApiError> {
    let channel = state.channel(&id).await?;
    Ok(JsonApiResponse::resource(state.channel_resource(channel).await?))
}

/// `GET /channels/{id}/device`
pub async fn device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApiResponse, ApiError> {
    let channel = state.channel(&id).await?;
    let device = state.device(&channel.device_id).await?;
    Ok(JsonApiResponse::resource(state.device_resource(device).await?))
}

/// `GET /channels/{id}/relationships/device`
pub async fn device_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApiResponse, ApiError> {
    let channel = state.channel(&id).await?;
    let device = state.device(&channel.device_id).await?;
    Ok(JsonApiResponse::resource(DeviceResource::new(device)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{JsonApiConfig, NodeConfig};
    use crate::router::build_router;
    use crate::storage::{memory::MemoryStorage, Device, Storage};

    async fn build_app() -> axum::Router {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .put_device(&Device {
                id: "d1".into(),
                identifier: "boiler".into(),
                name: Some("Boiler".into()),
                enabled: true,
                priority: None,
                created_at: "2024-01-01T00:00:00+00:00".into(),
            })
            .await
            .unwrap();
        let config = NodeConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            base_path: String::new(),
            jsonapi: JsonApiConfig::default(),
        };
        build_router(storage, config)
    }

    async fn call(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn create(device_id: Option<&str>) -> Request<Body> {
        let mut data = json!({
            "type": "channels",
            "attributes": { "identifier": "temperature", "unit": "°C", "step": "0.5" }
        });
        if let Some(id) = device_id {
            data["relationships"] = json!({ "device": { "data": { "type": "devices", "id": id } } });
        }
        Request::builder()
            .method("POST")
            .uri("/channels")
            .body(Body::from(json!({ "data": data }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch_with_included_device() {
        let app = build_app().await;
        let (status, body) = call(&app, create(Some("d1"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["attributes"]["step"], 0.5);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, get(&format!("/channels/{id}?include=device"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["relationships"]["device"]["data"],
            json!({ "type": "devices", "id": "d1" })
        );
        assert_eq!(body["included"][0]["type"], "devices");
        assert_eq!(body["included"][0]["attributes"]["name"], "Boiler");
    }

    #[tokio::test]
    async fn create_without_device_returns_422() {
        let app = build_app().await;
        let (status, body) = call(&app, create(None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["source"]["pointer"], DEVICE_POINTER);
    }

    #[tokio::test]
    async fn create_for_unknown_device_returns_422() {
        let app = build_app().await;
        let (status, body) = call(&app, create(Some("ghost"))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["detail"], "device ghost does not exist");
    }

    #[tokio::test]
    async fn device_relationship_uses_the_device_self_link() {
        let app = build_app().await;
        let (_, body) = call(&app, create(Some("d1"))).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (status, body) = call(&app, get(&format!("/channels/{id}/relationships/device"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({ "type": "devices", "id": "d1" }));
        assert_eq!(body["links"]["related"], "/devices/d1");
        assert_eq!(
            body["links"]["self"],
            format!("/channels/{id}/relationships/device")
        );
    }

    #[tokio::test]
    async fn list_reports_total_count() {
        let app = build_app().await;
        call(&app, create(Some("d1"))).await;
        let (status, body) = call(&app, get("/channels")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["totalCount"], 1);
        assert_eq!(body["data"][0]["relationships"]["device"]["data"]["id"], "d1");
    }
}
