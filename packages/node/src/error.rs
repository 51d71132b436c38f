//! Application-level error type returned by handlers.
//!
//! An [`ApiError`] does not render itself. Its [`IntoResponse`] impl places
//! the error in the response extensions. The JSON:API middleware then turns
//! it into an error document, and the tier decides the exact shape:
//!
//! | Variant | Status | Body |
//! |---------|--------|------|
//! | [`ApiError::JsonApi`] | the exception's status | every error object, in order |
//! | [`ApiError::Http`] | the HTTP status | one error, `code` = `status` |
//! | [`ApiError::Unclassified`] | `500` | one generic error, `code` = the failure's own code |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use jsonapi_core::{EncoderError, JsonApiError, JsonApiException, JsonApiMultipleError};
use jsonapi_document::ErrorObject;

use crate::storage::StorageError;

/// Routing-level failure: no route, wrong method and the like.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{title}: {description}")]
pub struct HttpException {
    status: StatusCode,
    title: String,
    description: String,
}

impl HttpException {
    pub fn new(status: StatusCode, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "Not found",
            "The requested resource could not be found",
        )
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            "The requested method is not supported by this resource",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn to_error_object(&self) -> ErrorObject {
        let code = self.status.as_u16().to_string();
        ErrorObject {
            status: Some(code.clone()),
            code: Some(code),
            title: Some(self.title.clone()),
            detail: Some(self.description.clone()),
            ..ErrorObject::default()
        }
    }
}

/// Any other failure. The client only sees a generic 500. The message
/// goes to the log, and the numeric code ends up in `errors[0].code`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct UnclassifiedError {
    message: String,
    code: i64,
}

impl UnclassifiedError {
    pub const TITLE: &'static str = "Server error";
    pub const DETAIL: &'static str = "There was a server error, please try again later";

    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            status: Some(StatusCode::INTERNAL_SERVER_ERROR.as_u16().to_string()),
            code: Some(self.code.to_string()),
            title: Some(Self::TITLE.into()),
            detail: Some(Self::DETAIL.into()),
            ..ErrorObject::default()
        }
    }
}

/// An error that a handler can return.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    JsonApi(#[from] JsonApiException),
    #[error(transparent)]
    Http(#[from] HttpException),
    #[error(transparent)]
    Unclassified(#[from] UnclassifiedError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::JsonApi(e) => e.status(),
            ApiError::Http(e) => e.status(),
            ApiError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error objects of the document the middleware writes for this error.
    pub fn error_objects(&self) -> Vec<ErrorObject> {
        match self {
            ApiError::JsonApi(e) => e.error_objects(),
            ApiError::Http(e) => vec![e.to_error_object()],
            ApiError::Unclassified(e) => vec![e.to_error_object()],
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<JsonApiError> for ApiError {
    fn from(e: JsonApiError) -> Self {
        ApiError::JsonApi(e.into())
    }
}

impl From<JsonApiMultipleError> for ApiError {
    fn from(e: JsonApiMultipleError) -> Self {
        ApiError::JsonApi(e.into())
    }
}

impl From<EncoderError> for ApiError {
    fn from(e: EncoderError) -> Self {
        ApiError::Unclassified(UnclassifiedError::new(e.to_string(), 0))
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => JsonApiError::new(StatusCode::NOT_FOUND, "Not found")
                .with_detail("The requested resource does not exist")
                .into(),
            StorageError::Conflict(msg) => {
                JsonApiError::new(StatusCode::CONFLICT, "Conflict").with_detail(msg).into()
            }
            StorageError::Internal(msg) => UnclassifiedError::new(msg, 0).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_response_carries_the_error() {
        let err: ApiError = JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Invalid").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.extensions().get::<ApiError>().is_some());
    }

    #[test]
    fn http_exception_code_mirrors_status() {
        let object = HttpException::method_not_allowed().to_error_object();
        assert_eq!(object.status.as_deref(), Some("405"));
        assert_eq!(object.code.as_deref(), Some("405"));
        assert_eq!(object.title.as_deref(), Some("Method not allowed"));
    }

    #[test]
    fn unclassified_hides_the_message() {
        let err = UnclassifiedError::new("db exploded at row 12", 1205);
        let object = err.to_error_object();
        assert_eq!(object.status.as_deref(), Some("500"));
        assert_eq!(object.code.as_deref(), Some("1205"));
        assert_eq!(object.title.as_deref(), Some(UnclassifiedError::TITLE));
        assert_eq!(object.detail.as_deref(), Some(UnclassifiedError::DETAIL));
        assert_eq!(ApiError::from(err).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn storage_errors_are_classified() {
        assert_eq!(ApiError::from(StorageError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StorageError::Conflict("taken".into())).status(),
            StatusCode::CONFLICT
        );
        assert!(matches!(
            ApiError::from(StorageError::Internal("io".into())),
            ApiError::Unclassified(_)
        ));
    }
}
