//! HTTP request handlers for the inventory endpoints.
//!
//! Handlers are async functions that receive Axum extractors and return
//! `Result<JsonApiResponse, ApiError>`. They never serialise documents
//! themselves; the JSON:API middleware does that.

pub mod channels;
pub mod devices;
pub mod fallback;

use std::sync::Arc;

use axum::http::StatusCode;
use jsonapi_core::JsonApiError;
use serde_json::Value;

use crate::{
    error::ApiError,
    inventory::{ChannelResource, DeviceResource, Hydrators},
    pagination::JsonApiQuery,
    storage::{Channel, Device, Page, Storage, StorageError},
};

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub hydrators: Arc<Hydrators>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            hydrators: Arc::new(Hydrators::default()),
        }
    }

    async fn device(&self, id: &str) -> Result<Device, ApiError> {
        self.storage
            .get_device(id)
            .await?
            .ok_or_else(|| not_found("device", id))
    }

    async fn channel(&self, id: &str) -> Result<Channel, ApiError> {
        self.storage
            .get_channel(id)
            .await?
            .ok_or_else(|| not_found("channel", id))
    }

    /// A device with its full channel list loaded.
    async fn device_resource(&self, device: Device) -> Result<DeviceResource, ApiError> {
        let channels = self.storage.device_channels(&device.id, Page::default()).await?;
        Ok(DeviceResource::new(device).with_channels(channels.items))
    }

    async fn channel_resource(&self, channel: Channel) -> Result<ChannelResource, ApiError> {
        let device = self.storage.get_device(&channel.device_id).await?.ok_or_else(|| {
            StorageError::Internal(format!(
                "channel {} references missing device {}",
                channel.id, channel.device_id
            ))
        })?;
        Ok(ChannelResource { channel, device })
    }
}

fn not_found(kind: &str, id: &str) -> ApiError {
    JsonApiError::new(StatusCode::NOT_FOUND, "Not found")
        .with_detail(format!("{kind} {id} not found"))
        .into()
}

/// Storage window for the `page[*]` parameters. Absent or negative values
/// mean "from the start" and "everything".
fn storage_page(query: &JsonApiQuery) -> Page {
    let offset = query.page_offset().unwrap_or(0).max(0);
    let limit = query.page_limit().filter(|l| *l > 0);
    Page::new(
        usize::try_from(offset).unwrap_or(usize::MAX),
        limit.and_then(|l| usize::try_from(l).ok()),
    )
}

/// Parse a request body as a JSON document.
fn parse_document(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        JsonApiError::new(StatusCode::BAD_REQUEST, "Malformed document")
            .with_detail(e.to_string())
            .into()
    })
}

#[cfg(test)]
mod tests {
    use axum::http::Uri;

    use super::*;

    fn page(uri: &str) -> Page {
        storage_page(&JsonApiQuery::from_uri(&uri.parse::<Uri>().unwrap()))
    }

    #[test]
    fn page_parameters_map_to_storage_windows() {
        assert_eq!(page("/devices"), Page::new(0, None));
        assert_eq!(
            page("/devices?page%5Boffset%5D=40&page%5Blimit%5D=20"),
            Page::new(40, Some(20))
        );
        assert_eq!(
            page("/devices?page%5Boffset%5D=-5&page%5Blimit%5D=0"),
            Page::new(0, None)
        );
    }

    #[test]
    fn malformed_body_is_a_bad_request() {
        let err = parse_document(b"{ nope").unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
