//! Error objects (JSON:API §errors).

use serde::{Deserialize, Serialize};

use crate::link::Link;

/// A single entry of a document's `errors` array.
///
/// ```json
/// {
///   "status": "422",
///   "code": "422",
///   "title": "Invalid attribute",
///   "detail": "name must not be empty",
///   "source": { "pointer": "/data/attributes/name" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ErrorLinks>,

    /// HTTP status code as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Application-specific error code, as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// The `links` member of an error object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<Link>,
}

/// Reference to the part of the request that caused the error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorSource {
    /// JSON pointer into the request document, e.g. `/data/attributes/name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,

    /// Name of the offending query parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,

    /// Name of the offending request header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

impl ErrorSource {
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            ..Default::default()
        }
    }

    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            parameter: Some(parameter.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_source_serialises_only_pointer() {
        let json = serde_json::to_value(ErrorSource::pointer("/data/attributes/name")).unwrap();
        assert_eq!(json, serde_json::json!({ "pointer": "/data/attributes/name" }));
    }

    #[test]
    fn absent_members_are_omitted() {
        let err = ErrorObject {
            status: Some("404".into()),
            title: Some("Not found".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "404", "title": "Not found" }));
    }
}
