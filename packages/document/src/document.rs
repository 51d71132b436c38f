//! Top-level documents.

use serde::{Deserialize, Serialize};

use crate::error::ErrorObject;
use crate::link::Links;
use crate::resource::{Identifier, ResourceObject};
use crate::Meta;

/// The `jsonapi` member describing the server's implementation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonApiObject {
    pub version: String,
}

impl JsonApiObject {
    /// The version string this implementation speaks.
    pub const VERSION: &'static str = "1.0";
}

impl Default for JsonApiObject {
    fn default() -> Self {
        Self {
            version: Self::VERSION.to_string(),
        }
    }
}

/// Primary data of a document.
///
/// Resource documents carry full [`ResourceObject`]s; relationship documents
/// carry only [`Identifier`]s. `Null` is an empty to-one result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryData {
    Resource(Box<ResourceObject>),
    Resources(Vec<ResourceObject>),
    Identifier(Identifier),
    Identifiers(Vec<Identifier>),
    Null,
}

/// A document whose top level carries `data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<JsonApiObject>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,

    pub data: PrimaryData,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject>,
}

impl Document {
    pub fn new(data: PrimaryData) -> Self {
        Self {
            jsonapi: None,
            meta: Meta::new(),
            links: Links::new(),
            data,
            included: Vec::new(),
        }
    }
}

/// A document whose top level carries `errors`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<JsonApiObject>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub meta: Meta,

    pub errors: Vec<ErrorObject>,
}

impl ErrorDocument {
    pub fn new(errors: Vec<ErrorObject>) -> Self {
        Self {
            jsonapi: None,
            meta: Meta::new(),
            errors,
        }
    }
}
