//! Registry mapping resource types to their schemas.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use jsonapi_document::{Identifier, Linkage, RelationshipObject, ResourceObject};

use crate::encoder::EncoderError;
use crate::schema::{Context, RelationshipData, ResourceRef, ResourceSchema};

/// A resource object together with the related resources of each of its
/// relationships, used to walk `include` paths.
pub(crate) struct EncodedResource {
    pub object: ResourceObject,
    pub related: Vec<(String, Vec<ResourceRef>)>,
}

/// Object-safe view of a [`ResourceSchema`].
pub(crate) trait ErasedSchema: Send + Sync {
    fn identifier(&self, resource: &(dyn Any + Send + Sync)) -> Result<Identifier, EncoderError>;

    fn encode(
        &self,
        resource: &(dyn Any + Send + Sync),
        context: &Context,
        container: &SchemaContainer,
        url_prefix: &str,
    ) -> Result<EncodedResource, EncoderError>;
}

struct Erased<S>(S);

impl<S: ResourceSchema> Erased<S> {
    fn downcast<'r>(&self, resource: &'r (dyn Any + Send + Sync)) -> Result<&'r S::Resource, EncoderError> {
        resource
            .downcast_ref::<S::Resource>()
            .ok_or_else(|| EncoderError::TypeMismatch(self.0.resource_type().to_string()))
    }

    fn typed_identifier(&self, resource: &S::Resource) -> Result<Identifier, EncoderError> {
        let schema = &self.0;
        let id = schema
            .id(resource)
            .ok_or_else(|| EncoderError::MissingIdentifier(schema.resource_type().to_string()))?;
        let mut identifier = Identifier::new(schema.resource_type(), id);
        if schema.has_identifier_meta(resource) {
            identifier.meta = Some(schema.identifier_meta(resource)?);
        }
        Ok(identifier)
    }
}

impl<S: ResourceSchema> ErasedSchema for Erased<S> {
    fn identifier(&self, resource: &(dyn Any + Send + Sync)) -> Result<Identifier, EncoderError> {
        self.typed_identifier(self.downcast(resource)?)
    }

    fn encode(
        &self,
        resource: &(dyn Any + Send + Sync),
        context: &Context,
        container: &SchemaContainer,
        url_prefix: &str,
    ) -> Result<EncodedResource, EncoderError> {
        let schema = &self.0;
        let typed = self.downcast(resource)?;
        let identifier = self.typed_identifier(typed)?;

        let mut relationships = BTreeMap::new();
        let mut related = Vec::new();

        for (name, relationship) in schema.relationships(typed, context) {
            let mut links = jsonapi_document::Links::new();
            let add_self = relationship
                .add_self_link
                .unwrap_or_else(|| schema.add_self_link_in_relationship_by_default(&name));
            let add_related = relationship
                .add_related_link
                .unwrap_or_else(|| schema.add_related_link_in_relationship_by_default(&name));
            if add_self {
                links.insert(
                    jsonapi_document::keywords::SELF.to_string(),
                    schema.relationship_self_link(typed, &name).resolve(url_prefix),
                );
            }
            if add_related {
                links.insert(
                    jsonapi_document::keywords::RELATED.to_string(),
                    schema.relationship_related_link(typed, &name).resolve(url_prefix),
                );
            }
            for (key, link) in &relationship.links {
                links.insert(key.clone(), link.resolve(url_prefix));
            }

            let data = match &relationship.data {
                None => None,
                Some(RelationshipData::One(None)) => Some(Linkage::One(None)),
                Some(RelationshipData::One(Some(one))) => {
                    Some(Linkage::One(Some(container.identifier(one)?)))
                }
                Some(RelationshipData::Many(many)) => Some(Linkage::Many(
                    many.iter()
                        .map(|r| container.identifier(r))
                        .collect::<Result<_, _>>()?,
                )),
            };

            if let Some(data) = &relationship.data {
                related.push((name.clone(), data.resources()));
            }

            relationships.insert(
                name,
                RelationshipObject {
                    data,
                    links,
                    meta: relationship.meta.clone(),
                },
            );
        }

        let links = schema
            .links(typed)
            .iter()
            .map(|(key, link)| (key.clone(), link.resolve(url_prefix)))
            .collect();

        let meta = if schema.has_resource_meta(typed) {
            Some(schema.resource_meta(typed)?)
        } else {
            None
        };

        Ok(EncodedResource {
            object: ResourceObject {
                resource_type: identifier.resource_type,
                id: Some(identifier.id),
                attributes: schema.attributes(typed, context),
                relationships,
                links,
                meta,
            },
            related,
        })
    }
}

/// Type-keyed schema registry.
///
/// ```rust,ignore
/// let mut schemas = SchemaContainer::new();
/// schemas.register(DeviceSchema::new());
/// schemas.register(ChannelSchema::new());
/// ```
#[derive(Clone, Default)]
pub struct SchemaContainer {
    schemas: HashMap<TypeId, Arc<dyn ErasedSchema>>,
}

impl SchemaContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `schema` for its resource type, replacing any previous one.
    pub fn register<S: ResourceSchema>(&mut self, schema: S) -> &mut Self {
        self.schemas
            .insert(TypeId::of::<S::Resource>(), Arc::new(Erased(schema)));
        self
    }

    pub fn has_schema(&self, resource: &ResourceRef) -> bool {
        self.schemas.contains_key(&(**resource).type_id())
    }

    pub(crate) fn schema_for(&self, resource: &ResourceRef) -> Result<&dyn ErasedSchema, EncoderError> {
        self.schemas
            .get(&(**resource).type_id())
            .map(|s| s.as_ref())
            .ok_or(EncoderError::SchemaNotRegistered)
    }

    pub(crate) fn identifier(&self, resource: &ResourceRef) -> Result<Identifier, EncoderError> {
        self.schema_for(resource)?.identifier(&**resource)
    }

    pub(crate) fn encode(
        &self,
        resource: &ResourceRef,
        context: &Context,
        url_prefix: &str,
    ) -> Result<EncodedResource, EncoderError> {
        self.schema_for(resource)?
            .encode(&**resource, context, self, url_prefix)
    }
}
