//! JSON:API building blocks: error values, resource schemas, the document
//! encoder and request hydrators.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | [`JsonApiError`], [`JsonApiMultipleError`] and the [`JsonApiException`] wrapper |
//! | [`schema`] | [`ResourceSchema`] trait, [`SchemaBase`], relationships and links |
//! | [`container`] | [`SchemaContainer`], the type-keyed schema registry |
//! | [`encoder`] | [`Encoder`], producing data, identifier and error documents |
//! | [`hydrators`] | Typed attribute coercion and create-document hydration |
//! | [`crud`] | [`CrudTable`], declarative required/writable field metadata |

pub mod container;
pub mod crud;
pub mod encoder;
pub mod errors;
pub mod hydrators;
pub mod schema;

pub use container::SchemaContainer;
pub use crud::{Crud, CrudTable};
pub use encoder::{Encoder, EncoderError, ResourceData};
pub use errors::{JsonApiError, JsonApiException, JsonApiMultipleError};
pub use hydrators::fields::{BooleanField, Field, FieldValue, HydratorField, NumberField, TextField};
pub use hydrators::{Hydrated, Hydrator};
pub use schema::{
    resource, Context, HasIdentifier, Relationship, RelationshipData, ResourceRef, ResourceSchema,
    SchemaBase, SchemaError, SchemaLink, SchemaLinks,
};
