//! Resource schemas: per-type descriptors that turn domain values into
//! JSON:API resource objects.
//!
//! A schema names the resource type, extracts the id and attributes, and
//! provides the links and meta for a resource. Everything except
//! [`ResourceSchema::attributes`] has a default, so a minimal schema is:
//!
//! ```rust,ignore
//! struct DeviceSchema(SchemaBase);
//!
//! impl ResourceSchema for DeviceSchema {
//!     type Resource = Device;
//!
//!     fn base(&self) -> &SchemaBase {
//!         &self.0
//!     }
//!
//!     fn attributes(&self, device: &Device, _: &Context) -> Meta {
//!         let mut attrs = Meta::new();
//!         attrs.insert("name".into(), device.name.clone().into());
//!         attrs
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use jsonapi_document::{keywords, Link, Meta};
use thiserror::Error;

/// A type-erased, shareable resource value.
///
/// The encoder looks up the schema for a resource by its concrete type, so
/// relationships can point at resources of any registered type.
pub type ResourceRef = Arc<dyn Any + Send + Sync>;

/// Wrap a value as a [`ResourceRef`].
pub fn resource<T: Any + Send + Sync>(value: T) -> ResourceRef {
    Arc::new(value)
}

/// Errors raised by schema hooks.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    /// A hook was called that the schema does not support (e.g. reading meta
    /// after `has_*_meta` returned `false`).
    #[error("logic error: {0}")]
    Logic(String),
}

/// Capability for resource types that expose an identifier.
///
/// Implement it explicitly on each resource type; the default reports no id.
pub trait HasIdentifier {
    fn identifier(&self) -> Option<String> {
        None
    }
}

/// A link as produced by a schema.
///
/// Sub-URL links are relative to the encoder's URL prefix and get it
/// prepended on output; other links are emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaLink {
    pub is_sub_url: bool,
    pub value: String,
    pub meta: Option<serde_json::Value>,
}

impl SchemaLink {
    pub fn sub_url(value: impl Into<String>) -> Self {
        Self {
            is_sub_url: true,
            value: value.into(),
            meta: None,
        }
    }

    pub fn absolute(value: impl Into<String>) -> Self {
        Self {
            is_sub_url: false,
            value: value.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Produce the wire link, prefixing sub-URLs with `prefix`.
    pub fn resolve(&self, prefix: &str) -> Link {
        let href = if self.is_sub_url {
            format!("{prefix}{}", self.value)
        } else {
            self.value.clone()
        };
        match &self.meta {
            Some(meta) => Link::with_meta(href, meta.clone()),
            None => Link::new(href),
        }
    }
}

/// Links keyed by name, as produced by schemas.
pub type SchemaLinks = BTreeMap<String, SchemaLink>;

/// State shared by every schema: the resource type and its lazily computed
/// collection URL.
#[derive(Debug)]
pub struct SchemaBase {
    resource_type: String,
    resources_url: OnceLock<String>,
}

impl SchemaBase {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resources_url: OnceLock::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// `/{resource_type}`, computed on first use.
    pub fn resources_url(&self) -> &str {
        self.resources_url
            .get_or_init(|| format!("/{}", self.resource_type))
    }
}

/// Linkage carried by a [`Relationship`].
#[derive(Clone)]
pub enum RelationshipData {
    One(Option<ResourceRef>),
    Many(Vec<ResourceRef>),
}

impl RelationshipData {
    /// The related resources, in order.
    pub fn resources(&self) -> Vec<ResourceRef> {
        match self {
            RelationshipData::One(one) => one.iter().cloned().collect(),
            RelationshipData::Many(many) => many.clone(),
        }
    }
}

/// One relationship of a resource as described by its schema.
#[derive(Clone, Default)]
pub struct Relationship {
    /// `None` renders a relationship with links only.
    pub data: Option<RelationshipData>,
    /// Extra links; these win over the default `self`/`related` links.
    pub links: SchemaLinks,
    /// Overrides [`ResourceSchema::add_self_link_in_relationship_by_default`].
    pub add_self_link: Option<bool>,
    /// Overrides [`ResourceSchema::add_related_link_in_relationship_by_default`].
    pub add_related_link: Option<bool>,
    pub meta: Option<serde_json::Value>,
}

impl Relationship {
    pub fn to_one(related: Option<ResourceRef>) -> Self {
        Self {
            data: Some(RelationshipData::One(related)),
            ..Default::default()
        }
    }

    pub fn to_many(related: Vec<ResourceRef>) -> Self {
        Self {
            data: Some(RelationshipData::Many(related)),
            ..Default::default()
        }
    }

    pub fn links_only() -> Self {
        Self::default()
    }

    pub fn with_self_link(mut self, add: bool) -> Self {
        self.add_self_link = Some(add);
        self
    }

    pub fn with_related_link(mut self, add: bool) -> Self {
        self.add_related_link = Some(add);
        self
    }

    pub fn with_link(mut self, name: impl Into<String>, link: SchemaLink) -> Self {
        self.links.insert(name.into(), link);
        self
    }

    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Where in the document a resource is being encoded.
#[derive(Debug, Clone, Default)]
pub struct Context {
    path: String,
    include_paths: Vec<String>,
}

impl Context {
    pub fn new(path: impl Into<String>, include_paths: Vec<String>) -> Self {
        Self {
            path: path.into(),
            include_paths,
        }
    }

    /// Dot-separated relationship path from the primary data; empty for
    /// primary resources.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn include_paths(&self) -> &[String] {
        &self.include_paths
    }

    /// Whether the relationship `name` of the current resource is requested
    /// through `include`.
    pub fn is_included(&self, name: &str) -> bool {
        let full = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        };
        self.include_paths
            .iter()
            .any(|p| p == &full || p.starts_with(&format!("{full}.")))
    }

    pub(crate) fn child(&self, name: &str) -> Context {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.path)
        };
        Context::new(path, self.include_paths.clone())
    }
}

/// Per-type encoding descriptor.
pub trait ResourceSchema: Send + Sync + 'static {
    type Resource: HasIdentifier + Send + Sync + 'static;

    fn base(&self) -> &SchemaBase;

    fn attributes(&self, resource: &Self::Resource, context: &Context) -> Meta;

    fn resource_type(&self) -> &str {
        self.base().resource_type()
    }

    fn id(&self, resource: &Self::Resource) -> Option<String> {
        resource.identifier()
    }

    fn relationships(
        &self,
        _resource: &Self::Resource,
        _context: &Context,
    ) -> Vec<(String, Relationship)> {
        Vec::new()
    }

    fn links(&self, resource: &Self::Resource) -> SchemaLinks {
        let mut links = SchemaLinks::new();
        links.insert(keywords::SELF.to_string(), self.self_link(resource));
        links
    }

    fn self_link(&self, resource: &Self::Resource) -> SchemaLink {
        SchemaLink::sub_url(self.self_sub_url(resource))
    }

    /// `/{type}/{id}`; a missing id leaves a trailing slash.
    fn self_sub_url(&self, resource: &Self::Resource) -> String {
        format!(
            "{}/{}",
            self.base().resources_url(),
            self.id(resource).unwrap_or_default()
        )
    }

    fn relationship_self_link(&self, resource: &Self::Resource, name: &str) -> SchemaLink {
        SchemaLink::sub_url(format!(
            "{}/{}/{name}",
            self.self_sub_url(resource),
            keywords::RELATIONSHIPS
        ))
    }

    fn relationship_related_link(&self, resource: &Self::Resource, name: &str) -> SchemaLink {
        SchemaLink::sub_url(format!("{}/{name}", self.self_sub_url(resource)))
    }

    fn has_identifier_meta(&self, _resource: &Self::Resource) -> bool {
        false
    }

    fn identifier_meta(&self, _resource: &Self::Resource) -> Result<serde_json::Value, SchemaError> {
        Err(SchemaError::Logic(
            "default schema does not provide any meta".into(),
        ))
    }

    fn has_resource_meta(&self, _resource: &Self::Resource) -> bool {
        false
    }

    fn resource_meta(&self, _resource: &Self::Resource) -> Result<serde_json::Value, SchemaError> {
        Err(SchemaError::Logic(
            "default schema does not provide any meta".into(),
        ))
    }

    fn add_self_link_in_relationship_by_default(&self, _relationship: &str) -> bool {
        true
    }

    fn add_related_link_in_relationship_by_default(&self, _relationship: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sensor {
        id: u32,
    }

    impl HasIdentifier for Sensor {
        fn identifier(&self) -> Option<String> {
            Some(self.id.to_string())
        }
    }

    struct Anonymous;

    impl HasIdentifier for Anonymous {}

    struct SensorSchema(SchemaBase);

    impl ResourceSchema for SensorSchema {
        type Resource = Sensor;

        fn base(&self) -> &SchemaBase {
            &self.0
        }

        fn attributes(&self, _: &Sensor, _: &Context) -> Meta {
            Meta::new()
        }
    }

    struct AnonymousSchema(SchemaBase);

    impl ResourceSchema for AnonymousSchema {
        type Resource = Anonymous;

        fn base(&self) -> &SchemaBase {
            &self.0
        }

        fn attributes(&self, _: &Anonymous, _: &Context) -> Meta {
            Meta::new()
        }
    }

    fn sensors() -> SensorSchema {
        SensorSchema(SchemaBase::new("sensors"))
    }

    #[test]
    fn id_comes_from_identifier_capability() {
        assert_eq!(sensors().id(&Sensor { id: 7 }).as_deref(), Some("7"));
        let anon = AnonymousSchema(SchemaBase::new("things"));
        assert_eq!(anon.id(&Anonymous), None);
        assert_eq!(anon.self_link(&Anonymous).value, "/things/");
    }

    #[test]
    fn resources_url_is_memoized() {
        let base = SchemaBase::new("sensors");
        let first = base.resources_url() as *const str;
        let second = base.resources_url() as *const str;
        assert_eq!(base.resources_url(), "/sensors");
        assert_eq!(first, second);
    }

    #[test]
    fn default_links() {
        let schema = sensors();
        let sensor = Sensor { id: 3 };

        let links = schema.links(&sensor);
        assert_eq!(links.len(), 1);
        assert_eq!(links["self"], SchemaLink::sub_url("/sensors/3"));

        assert_eq!(
            schema.relationship_self_link(&sensor, "readings").value,
            "/sensors/3/relationships/readings"
        );
        assert_eq!(
            schema.relationship_related_link(&sensor, "readings").value,
            "/sensors/3/readings"
        );
        assert!(schema.add_self_link_in_relationship_by_default("readings"));
        assert!(schema.add_related_link_in_relationship_by_default("readings"));
        assert!(schema.relationships(&sensor, &Context::default()).is_empty());
    }

    #[test]
    fn reading_meta_without_has_meta_is_a_logic_error() {
        let schema = sensors();
        let sensor = Sensor { id: 1 };
        assert!(!schema.has_resource_meta(&sensor));
        assert!(matches!(schema.resource_meta(&sensor), Err(SchemaError::Logic(_))));
        assert!(!schema.has_identifier_meta(&sensor));
        assert!(matches!(schema.identifier_meta(&sensor), Err(SchemaError::Logic(_))));
    }

    #[test]
    fn sub_url_links_get_prefixed() {
        let link = SchemaLink::sub_url("/sensors/1").resolve("https://api.example.com");
        assert_eq!(link.href(), "https://api.example.com/sensors/1");
        let link = SchemaLink::absolute("https://other.example.com/x").resolve("https://api.example.com");
        assert_eq!(link.href(), "https://other.example.com/x");
    }

    #[test]
    fn context_include_matching() {
        let ctx = Context::new("", vec!["channels.properties".into()]);
        assert!(ctx.is_included("channels"));
        assert!(!ctx.is_included("owner"));
        let child = ctx.child("channels");
        assert_eq!(child.path(), "channels");
        assert!(child.is_included("properties"));
        assert!(!child.is_included("device"));
    }
}
