//! Turns resources into JSON:API documents using the registered schemas.

use std::collections::{BTreeMap, HashSet};

use jsonapi_document::{
    Document, ErrorDocument, ErrorObject, JsonApiObject, Links, Meta, PrimaryData, ResourceObject,
};
use serde::Serialize;
use thiserror::Error;

use crate::container::SchemaContainer;
use crate::schema::{Context, ResourceRef, SchemaError};

/// Errors produced while encoding a document.
#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("no schema registered for the resource's type")]
    SchemaNotRegistered,

    #[error("resource handed to the {0:?} schema has a different type")]
    TypeMismatch(String),

    #[error("resource of type {0:?} has no identifier")]
    MissingIdentifier(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to serialise document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Primary data handed to the encoder.
#[derive(Clone)]
pub enum ResourceData {
    One(ResourceRef),
    Many(Vec<ResourceRef>),
    Null,
}

impl ResourceData {
    pub fn resources(&self) -> Vec<ResourceRef> {
        match self {
            ResourceData::One(one) => vec![one.clone()],
            ResourceData::Many(many) => many.clone(),
            ResourceData::Null => Vec::new(),
        }
    }
}

impl From<ResourceRef> for ResourceData {
    fn from(value: ResourceRef) -> Self {
        ResourceData::One(value)
    }
}

impl From<Option<ResourceRef>> for ResourceData {
    fn from(value: Option<ResourceRef>) -> Self {
        value.map_or(ResourceData::Null, ResourceData::One)
    }
}

impl From<Vec<ResourceRef>> for ResourceData {
    fn from(value: Vec<ResourceRef>) -> Self {
        ResourceData::Many(value)
    }
}

/// Requested `include` paths as a tree of relationship names.
#[derive(Default)]
struct IncludeTree(BTreeMap<String, IncludeTree>);

impl IncludeTree {
    fn parse(paths: &[String]) -> Self {
        let mut root = IncludeTree::default();
        for path in paths {
            let mut node = &mut root;
            for segment in path.split('.').map(str::trim).filter(|s| !s.is_empty()) {
                node = node.0.entry(segment.to_string()).or_default();
            }
        }
        root
    }
}

/// Document encoder.
///
/// Configure with the `with_*` builders, then call one of the `encode_*`
/// methods. The encoder itself is immutable and can encode several documents.
pub struct Encoder<'a> {
    schemas: &'a SchemaContainer,
    url_prefix: String,
    pretty: bool,
    version: Option<String>,
    meta: Meta,
    links: Links,
    included_paths: Vec<String>,
}

impl<'a> Encoder<'a> {
    pub fn new(schemas: &'a SchemaContainer) -> Self {
        Self {
            schemas,
            url_prefix: String::new(),
            pretty: false,
            version: None,
            meta: Meta::new(),
            links: Links::new(),
            included_paths: Vec::new(),
        }
    }

    /// Prefix prepended to every sub-URL link produced by schemas.
    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Emit a top-level `jsonapi` member with this version.
    pub fn with_jsonapi_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }

    /// Dot-separated relationship paths to side-load into `included`.
    pub fn with_included_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Full resource document, with `included` resolved from the include paths.
    pub fn data_document(&self, data: &ResourceData) -> Result<Document, EncoderError> {
        let root = Context::new("", self.included_paths.clone());
        let tree = IncludeTree::parse(&self.included_paths);

        let mut seen = HashSet::new();
        let mut primary = Vec::new();
        let mut related = Vec::new();
        for resource in data.resources() {
            let encoded = self.schemas.encode(&resource, &root, &self.url_prefix)?;
            seen.insert(resource_key(&encoded.object));
            primary.push(encoded.object);
            related.push(encoded.related);
        }

        let mut included = Vec::new();
        for rels in &related {
            self.collect_included(rels, &tree, &root, &mut seen, &mut included)?;
        }

        let data = match data {
            ResourceData::One(_) => primary
                .pop()
                .map_or(PrimaryData::Null, |o| PrimaryData::Resource(Box::new(o))),
            ResourceData::Many(_) => PrimaryData::Resources(primary),
            ResourceData::Null => PrimaryData::Null,
        };

        Ok(self.document(data, included))
    }

    /// Document whose primary data holds only resource identifiers.
    pub fn identifiers_document(&self, data: &ResourceData) -> Result<Document, EncoderError> {
        let data = match data {
            ResourceData::One(one) => PrimaryData::Identifier(self.schemas.identifier(one)?),
            ResourceData::Many(many) => PrimaryData::Identifiers(
                many.iter()
                    .map(|r| self.schemas.identifier(r))
                    .collect::<Result<_, _>>()?,
            ),
            ResourceData::Null => PrimaryData::Null,
        };
        Ok(self.document(data, Vec::new()))
    }

    pub fn encode_data(&self, data: &ResourceData) -> Result<String, EncoderError> {
        self.serialise(&self.data_document(data)?)
    }

    /// The resource document as a JSON value rather than a string.
    pub fn encode_data_as_value(&self, data: &ResourceData) -> Result<serde_json::Value, EncoderError> {
        Ok(serde_json::to_value(self.data_document(data)?)?)
    }

    pub fn encode_identifiers(&self, data: &ResourceData) -> Result<String, EncoderError> {
        self.serialise(&self.identifiers_document(data)?)
    }

    pub fn encode_error(&self, error: &ErrorObject) -> Result<String, EncoderError> {
        self.encode_errors(std::slice::from_ref(error))
    }

    pub fn encode_errors(&self, errors: &[ErrorObject]) -> Result<String, EncoderError> {
        let doc = ErrorDocument {
            jsonapi: self.jsonapi_object(),
            meta: self.meta.clone(),
            errors: errors.to_vec(),
        };
        self.serialise(&doc)
    }

    fn collect_included(
        &self,
        related: &[(String, Vec<ResourceRef>)],
        tree: &IncludeTree,
        context: &Context,
        seen: &mut HashSet<(String, String)>,
        included: &mut Vec<ResourceObject>,
    ) -> Result<(), EncoderError> {
        for (name, resources) in related {
            let Some(subtree) = tree.0.get(name) else {
                continue;
            };
            let child = context.child(name);
            for resource in resources {
                let encoded = self.schemas.encode(resource, &child, &self.url_prefix)?;
                if seen.insert(resource_key(&encoded.object)) {
                    included.push(encoded.object);
                }
                self.collect_included(&encoded.related, subtree, &child, seen, included)?;
            }
        }
        Ok(())
    }

    fn document(&self, data: PrimaryData, included: Vec<ResourceObject>) -> Document {
        Document {
            jsonapi: self.jsonapi_object(),
            meta: self.meta.clone(),
            links: self.links.clone(),
            data,
            included,
        }
    }

    fn jsonapi_object(&self) -> Option<JsonApiObject> {
        self.version
            .as_ref()
            .map(|version| JsonApiObject { version: version.clone() })
    }

    fn serialise<T: Serialize>(&self, value: &T) -> Result<String, EncoderError> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }
}

fn resource_key(object: &ResourceObject) -> (String, String) {
    (
        object.resource_type.clone(),
        object.id.clone().unwrap_or_default(),
    )
}
