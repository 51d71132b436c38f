//! Resource objects, resource identifiers and relationships.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::link::Links;
use crate::Meta;

/// A resource identifier object: the `type`/`id` pair that names a resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub resource_type: String,

    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl Identifier {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            meta: None,
        }
    }
}

/// Resource linkage of a relationship: to-one (`null` allowed) or to-many.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Linkage {
    Many(Vec<Identifier>),
    One(Option<Identifier>),
}

/// A relationship object inside a resource's `relationships` member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RelationshipObject {
    /// Omitted entirely when the schema does not expose linkage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Linkage>,

    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// A full resource object.
///
/// `id` is optional only so that client-generated create documents can be
/// deserialised; every object the encoder produces carries one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceObject {
    #[serde(rename = "type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Meta::is_empty")]
    pub attributes: Meta,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, RelationshipObject>,

    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl ResourceObject {
    /// The identifier naming this resource, if it has an `id`.
    pub fn identifier(&self) -> Option<Identifier> {
        self.id
            .as_ref()
            .map(|id| Identifier::new(self.resource_type.clone(), id.clone()))
    }
}
