//! Device handlers: list, fetch, create and the `channels` relationship.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, Uri},
};
use jsonapi_core::Hydrated;

use crate::{
    error::ApiError,
    inventory::{ChannelResource, DeviceResource},
    pagination::JsonApiQuery,
    response::JsonApiResponse,
    storage::{Device, Page},
};

use super::{parse_document, storage_page, AppState};

// ---------------------------------------------------------------------------
// GET /devices
// ---------------------------------------------------------------------------

/// `GET /devices`: one page of devices, each with its channel linkage.
pub async fn list(State(state): State<AppState>, uri: Uri) -> Result<JsonApiResponse, ApiError> {
    let query = JsonApiQuery::from_uri(&uri);
    let listing = state.storage.list_devices(storage_page(&query)).await?;

    let mut resources = Vec::with_capacity(listing.items.len());
    for device in listing.items {
        resources.push(state.device_resource(device).await?);
    }
    Ok(JsonApiResponse::collection(resources).with_total_count(listing.total))
}

// ---------------------------------------------------------------------------
// POST /devices
// ---------------------------------------------------------------------------

/// `POST /devices`: create a device from a JSON:API create document.
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<JsonApiResponse, ApiError> {
    let document = parse_document(&body)?;
    let values = state.hydrators.devices.hydrate(&document)?;
    let device = new_device(&values);

    state.storage.put_device(&device).await?;
    tracing::info!(id = %device.id, identifier = %device.identifier, "device created");

    Ok(JsonApiResponse::resource(DeviceResource::new(device).with_channels(Vec::new()))
        .with_status(StatusCode::CREATED))
}

fn new_device(values: &Hydrated) -> Device {
    Device {
        id: uuid::Uuid::now_v7().to_string(),
        identifier: values
            .get("identifier")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
        name: values.get("name").and_then(|v| v.as_str()).map(String::from),
        enabled: values.get("enabled").and_then(|v| v.as_bool()).unwrap_or(false),
        priority: values.get("priority").and_then(|v| v.as_i64()),
        created_at: chrono::Utc::now().to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// GET /devices/{id}
// ---------------------------------------------------------------------------

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApiResponse, ApiError> {
    let device = state.device(&id).await?;
    Ok(JsonApiResponse::resource(state.device_resource(device).await?))
}

// ---------------------------------------------------------------------------
// GET /devices/{id}/channels and its relationship
// ---------------------------------------------------------------------------

/// `GET /devices/{id}/channels`: one page of the device's channels.
pub async fn channels(
    State(state): State<AppState>,
    Path(id): Path<String>,
    uri: Uri,
) -> Result<JsonApiResponse, ApiError> {
    let device = state.device(&id).await?;
    let query = JsonApiQuery::from_uri(&uri);
    let listing = state
        .storage
        .device_channels(&device.id, storage_page(&query))
        .await?;

    let resources = listing.items.into_iter().map(|channel| ChannelResource {
        channel,
        device: device.clone(),
    });
    Ok(JsonApiResponse::collection(resources).with_total_count(listing.total))
}

/// `GET /devices/{id}/relationships/channels`: channel linkage of a device.
pub async fn channels_relationship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<JsonApiResponse, ApiError> {
    let device = state.device(&id).await?;
    let listing = state.storage.device_channels(&device.id, Page::default()).await?;

    let resources = listing.items.into_iter().map(|channel| ChannelResource {
        channel,
        device: device.clone(),
    });
    Ok(JsonApiResponse::collection(resources))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
