//! Handler-side success responses.
//!
//! Handlers return the domain data they produced, not a serialised body.
//! [`JsonApiResponse`] stores that data in the response extensions as a
//! [`ScalarEntity`]. The JSON:API middleware encodes it into the final
//! document once it knows the request context.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonapi_core::{resource, ResourceData, ResourceRef};

/// The data a handler produced: one resource, a collection or nothing.
#[derive(Clone)]
pub struct ScalarEntity(ResourceData);

impl ScalarEntity {
    pub fn data(&self) -> &ResourceData {
        &self.0
    }
}

/// Size of the full collection behind a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalCount(pub u64);

/// Successful handler output, encoded by the middleware.
pub struct JsonApiResponse {
    status: StatusCode,
    entity: ScalarEntity,
    total_count: Option<u64>,
}

impl JsonApiResponse {
    pub fn new(data: impl Into<ResourceData>) -> Self {
        Self {
            status: StatusCode::OK,
            entity: ScalarEntity(data.into()),
            total_count: None,
        }
    }

    pub fn resource<T: Any + Send + Sync>(value: T) -> Self {
        Self::new(resource(value))
    }

    pub fn collection<T, I>(values: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = T>,
    {
        Self::new(values.into_iter().map(resource).collect::<Vec<ResourceRef>>())
    }

    pub fn null() -> Self {
        Self::new(ResourceData::Null)
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Marks the data as one page of a collection of `total` items.
    pub fn with_total_count(mut self, total: u64) -> Self {
        self.total_count = Some(total);
        self
    }
}

impl IntoResponse for JsonApiResponse {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        let extensions = response.extensions_mut();
        extensions.insert(self.entity);
        if let Some(total) = self.total_count {
            extensions.insert(TotalCount(total));
        }
        response
    }
}
