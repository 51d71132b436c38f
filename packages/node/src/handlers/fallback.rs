//! Router fallbacks, reported as JSON:API errors.

use crate::error::{ApiError, HttpException};

/// No route matches the path.
pub async fn not_found() -> ApiError {
    HttpException::not_found().into()
}

/// The path exists, but not for this method.
pub async fn method_not_allowed() -> ApiError {
    HttpException::method_not_allowed().into()
}
