//! JSON:API response formatting.
//!
//! Runs the handler, then rewrites whatever came back into a JSON:API
//! document:
//!
//! - a [`ScalarEntity`] becomes a data document with `self` (and page) links,
//!   base meta and, on `/relationships/` URLs, identifiers plus a `related`
//!   link;
//! - an [`ApiError`] becomes an error document whose shape depends on its tier;
//! - anything else passes through untouched.
//!
//! Every response leaves with `Content-Type: application/vnd.api+json`.

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, Method, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonapi_core::{Encoder, EncoderError, ResourceData, SchemaContainer};
use jsonapi_document::{keywords, JsonApiObject, Link, Links, Meta, MEDIA_TYPE};
use serde_json::Value;

use crate::{
    config::{JsonApiConfig, MetaAuthor},
    error::{ApiError, UnclassifiedError},
    pagination::{uri_string, JsonApiQuery},
    response::{ScalarEntity, TotalCount},
    routing::{RouteTable, RoutingResult},
};

const RELATIONSHIPS_SEGMENT: &str = "/relationships/";

/// Shared state of the formatting middleware.
pub struct JsonApiMiddleware {
    config: JsonApiConfig,
    schemas: Arc<SchemaContainer>,
    routes: Arc<RouteTable>,
}

impl JsonApiMiddleware {
    pub fn new(config: JsonApiConfig, schemas: Arc<SchemaContainer>, routes: Arc<RouteTable>) -> Self {
        Self {
            config,
            schemas,
            routes,
        }
    }

    /// Rewrite a handler response produced for a request to `uri`.
    pub fn process(&self, uri: &Uri, response: Response) -> Response {
        let (mut parts, body) = response.into_parts();

        if let Some(error) = parts.extensions.remove::<ApiError>() {
            return self.failure(error);
        }
        let Some(entity) = parts.extensions.remove::<ScalarEntity>() else {
            return Response::from_parts(parts, body);
        };
        let total = parts.extensions.remove::<TotalCount>();

        match self.success(uri, entity.data(), total) {
            Ok(content) => {
                parts.headers.remove(header::CONTENT_LENGTH);
                Response::from_parts(parts, Body::from(content))
            }
            Err(e) => self.failure(e.into()),
        }
    }

    fn encoder(&self) -> Encoder<'_> {
        Encoder::new(&self.schemas)
            .with_url_prefix(self.config.url_prefix.clone())
            .with_pretty_print(self.config.pretty_print)
            .with_jsonapi_version(JsonApiObject::VERSION)
    }

    fn base_meta(&self) -> Meta {
        let mut meta = Meta::new();
        match &self.config.meta_author {
            Some(MetaAuthor::One(author)) => {
                meta.insert("author".into(), author.clone().into());
            }
            Some(MetaAuthor::Many(authors)) => {
                meta.insert("authors".into(), authors.clone().into());
            }
            None => {}
        }
        if let Some(copyright) = &self.config.meta_copyright {
            meta.insert("copyright".into(), copyright.clone().into());
        }
        meta
    }

    fn success(
        &self,
        uri: &Uri,
        data: &ResourceData,
        total: Option<TotalCount>,
    ) -> Result<String, EncoderError> {
        let self_uri = uri_string(uri.path(), uri.query());
        let query = JsonApiQuery::from_uri(uri);

        let mut links = Links::new();
        links.insert(keywords::SELF.into(), Link::new(self_uri.clone()));

        let mut meta = self.base_meta();
        if let Some(TotalCount(total)) = total {
            meta.insert("totalCount".into(), total.into());
            if let Some(window) = query.window(total) {
                links.extend(window.links(uri.path()));
            }
        }

        if uri.path().contains(RELATIONSHIPS_SEGMENT) {
            if let Some(related) = self.related_link(data, &self_uri)? {
                links.insert(keywords::RELATED.into(), Link::new(related));
            }
            return self
                .encoder()
                .with_meta(meta)
                .with_links(links)
                .encode_identifiers(data);
        }

        self.encoder()
            .with_meta(meta)
            .with_links(links)
            .with_included_paths(query.include_paths())
            .encode_data(data)
    }

    /// The related resource's own `self` link when the data has one,
    /// otherwise the relationship URL without `/relationships/` if a GET
    /// route serves it.
    fn related_link(&self, data: &ResourceData, self_uri: &str) -> Result<Option<String>, EncoderError> {
        let encoded = self.encoder().encode_data_as_value(data)?;
        if let Some(href) = encoded.pointer("/data/links/self").and_then(link_href) {
            return Ok(Some(href));
        }

        let candidate = self_uri.replace(RELATIONSHIPS_SEGMENT, "/");
        let path = candidate.split('?').next().unwrap_or_default();
        match self.routes.dispatch(&Method::GET, path) {
            RoutingResult::Found { name, .. } => {
                tracing::debug!(route = %name, related = %candidate, "related link resolved");
                Ok(Some(candidate))
            }
            _ => {
                tracing::debug!(related = %candidate, "no route serves the related link");
                Ok(None)
            }
        }
    }

    fn failure(&self, error: ApiError) -> Response {
        if let ApiError::Unclassified(e) = &error {
            tracing::error!(
                message = %e.message(),
                code = e.code(),
                "an error occurred during request handling"
            );
        }

        let content = Encoder::new(&self.schemas)
            .with_pretty_print(self.config.pretty_print)
            .with_jsonapi_version(JsonApiObject::VERSION)
            .encode_errors(&error.error_objects())
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to encode error document");
                String::new()
            });

        (error.status(), content).into_response()
    }
}

fn link_href(link: &Value) -> Option<String> {
    link.as_str()
        .or_else(|| link.get("href")?.as_str())
        .map(String::from)
}

/// `axum::middleware::from_fn_with_state` entry point.
pub async fn jsonapi_middleware(
    State(middleware): State<Arc<JsonApiMiddleware>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let response = next.run(request).await;

    let mut response = middleware.process(&uri, response);
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
    response
}

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer::custom`.
///
/// Turns the panic into an unclassified [`ApiError`] so the middleware
/// renders it like any other server error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::from(UnclassifiedError::new(message, 0)).into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
