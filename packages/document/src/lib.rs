//! Wire-format types for JSON:API documents.
//!
//! This crate encodes the JSON:API 1.0 document structure as Rust types. It
//! has no HTTP dependencies; the encoder in `jsonapi-core` builds these
//! values and the node serialises them into response bodies.
//!
//! # Top-level members
//!
//! | Member | Type |
//! |--------|------|
//! | `data` | [`PrimaryData`] |
//! | `included` | `Vec<`[`ResourceObject`]`>` |
//! | `links` | [`Links`] |
//! | `meta` | [`Meta`] |
//! | `jsonapi` | [`JsonApiObject`] |
//! | `errors` | `Vec<`[`ErrorObject`]`>` (in an [`ErrorDocument`]) |

pub mod document;
pub mod error;
pub mod link;
pub mod resource;

pub use document::{Document, ErrorDocument, JsonApiObject, PrimaryData};
pub use error::{ErrorLinks, ErrorObject, ErrorSource};
pub use link::{Link, Links};
pub use resource::{Identifier, Linkage, RelationshipObject, ResourceObject};

/// Free-form `meta` object.
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// The JSON:API media type, used as the `Content-Type` of every document.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// Well-known member names used as link keys.
pub mod keywords {
    pub const SELF: &str = "self";
    pub const RELATED: &str = "related";
    pub const FIRST: &str = "first";
    pub const LAST: &str = "last";
    pub const NEXT: &str = "next";
    pub const PREV: &str = "prev";
    pub const RELATIONSHIPS: &str = "relationships";
}
