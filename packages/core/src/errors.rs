//! Domain error values that render as JSON:API error objects.
//!
//! Handlers raise these instead of building error documents themselves. The
//! response middleware picks them up, uses their status as the HTTP status
//! and encodes them into the `errors` array.

use http::StatusCode;
use jsonapi_document::{ErrorObject, ErrorSource};
use thiserror::Error;

/// A single JSON:API error.
///
/// The status doubles as the error object's `status` and `code`; the optional
/// type tag is emitted as the error object's `id`.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{title}")]
pub struct JsonApiError {
    status: StatusCode,
    title: String,
    detail: Option<String>,
    error_source: Option<ErrorSource>,
    type_tag: Option<String>,
}

impl JsonApiError {
    /// An empty title is replaced with the status' canonical reason phrase.
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        let mut title = title.into();
        if title.is_empty() {
            title = status.canonical_reason().unwrap_or("Error").to_string();
        }
        Self {
            status,
            title,
            detail: None,
            error_source: None,
            type_tag: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_source(mut self, source: ErrorSource) -> Self {
        self.error_source = Some(source);
        self
    }

    /// Shorthand for a source pointing into the request document.
    pub fn with_pointer(self, pointer: impl Into<String>) -> Self {
        self.with_source(ErrorSource::pointer(pointer))
    }

    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn error_source(&self) -> Option<&ErrorSource> {
        self.error_source.as_ref()
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    /// Render as a wire-level error object.
    pub fn to_error_object(&self) -> ErrorObject {
        let code = self.status.as_u16().to_string();
        ErrorObject {
            id: self.type_tag.clone(),
            status: Some(code.clone()),
            code: Some(code),
            title: Some(self.title.clone()),
            detail: self.detail.clone(),
            source: self.error_source.clone(),
            ..Default::default()
        }
    }
}

/// An ordered, non-empty collection of [`JsonApiError`]s raised together.
///
/// The response status is the explicit override when set, otherwise the
/// status of the first error.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{first} (+{} more)", .rest.len())]
pub struct JsonApiMultipleError {
    status: Option<StatusCode>,
    first: JsonApiError,
    rest: Vec<JsonApiError>,
}

impl JsonApiMultipleError {
    pub fn new(first: JsonApiError) -> Self {
        Self {
            status: None,
            first,
            rest: Vec::new(),
        }
    }

    /// Returns `None` for an empty list.
    pub fn from_errors(errors: impl IntoIterator<Item = JsonApiError>) -> Option<Self> {
        let mut iter = errors.into_iter();
        let first = iter.next()?;
        Some(Self {
            status: None,
            first,
            rest: iter.collect(),
        })
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn push(&mut self, error: JsonApiError) {
        self.rest.push(error);
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(self.first.status)
    }

    pub fn errors(&self) -> impl Iterator<Item = &JsonApiError> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn to_error_objects(&self) -> Vec<ErrorObject> {
        self.errors().map(JsonApiError::to_error_object).collect()
    }
}

/// Any error that knows how to render itself as JSON:API error objects.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JsonApiException {
    #[error(transparent)]
    Single(#[from] JsonApiError),

    #[error(transparent)]
    Multiple(#[from] JsonApiMultipleError),
}

impl JsonApiException {
    pub fn status(&self) -> StatusCode {
        match self {
            JsonApiException::Single(e) => e.status(),
            JsonApiException::Multiple(e) => e.status(),
        }
    }

    pub fn error_objects(&self) -> Vec<ErrorObject> {
        match self {
            JsonApiException::Single(e) => vec![e.to_error_object()],
            JsonApiException::Multiple(e) => e.to_error_objects(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_error_uses_status_as_status_and_code() {
        let err = JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid attribute")
            .with_detail("name must not be empty")
            .with_pointer("/data/attributes/name")
            .with_type("validation");

        let obj = err.to_error_object();
        assert_eq!(obj.status.as_deref(), Some("422"));
        assert_eq!(obj.code.as_deref(), Some("422"));
        assert_eq!(obj.id.as_deref(), Some("validation"));
        assert_eq!(obj.title.as_deref(), Some("Invalid attribute"));
        assert_eq!(obj.detail.as_deref(), Some("name must not be empty"));
        assert_eq!(
            obj.source.unwrap().pointer.as_deref(),
            Some("/data/attributes/name")
        );
    }

    #[test]
    fn empty_title_falls_back_to_reason_phrase() {
        let err = JsonApiError::new(StatusCode::NOT_FOUND, "");
        assert_eq!(err.title(), "Not Found");
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn multiple_errors_keep_order() {
        let mut errs = JsonApiMultipleError::new(JsonApiError::new(StatusCode::BAD_REQUEST, "first"));
        errs.push(JsonApiError::new(StatusCode::CONFLICT, "second"));
        errs.push(JsonApiError::new(StatusCode::BAD_REQUEST, "third"));

        let titles: Vec<_> = errs
            .to_error_objects()
            .into_iter()
            .map(|o| o.title.unwrap())
            .collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(errs.to_string(), "first (+2 more)");
    }

    #[test]
    fn multiple_status_defaults_to_first_error() {
        let errs = JsonApiMultipleError::from_errors([
            JsonApiError::new(StatusCode::CONFLICT, "a"),
            JsonApiError::new(StatusCode::BAD_REQUEST, "b"),
        ])
        .unwrap();
        assert_eq!(errs.status(), StatusCode::CONFLICT);
        assert_eq!(
            errs.with_status(StatusCode::UNPROCESSABLE_ENTITY).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn from_empty_list_is_none() {
        assert!(JsonApiMultipleError::from_errors(Vec::new()).is_none());
    }

    #[test]
    fn exception_dispatches_on_variant() {
        let single: JsonApiException =
            JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "bad").into();
        assert_eq!(single.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(single.error_objects().len(), 1);

        let multi: JsonApiException = JsonApiMultipleError::from_errors([
            JsonApiError::new(StatusCode::BAD_REQUEST, "a"),
            JsonApiError::new(StatusCode::BAD_REQUEST, "b"),
        ])
        .unwrap()
        .into();
        assert_eq!(multi.status(), StatusCode::BAD_REQUEST);
        assert_eq!(multi.error_objects().len(), 2);
    }
}
