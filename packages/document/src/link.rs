//! Link objects (JSON:API §links).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A link is either a bare URL string or an object with `href` and `meta`.
///
/// ```json
/// "/devices/1"
/// { "href": "/devices/1", "meta": { "count": 10 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Link {
    Url(String),
    Object {
        href: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        meta: Option<serde_json::Value>,
    },
}

impl Link {
    /// A plain string link.
    pub fn new(href: impl Into<String>) -> Self {
        Link::Url(href.into())
    }

    /// A link object carrying `meta`.
    pub fn with_meta(href: impl Into<String>, meta: serde_json::Value) -> Self {
        Link::Object {
            href: href.into(),
            meta: Some(meta),
        }
    }

    pub fn href(&self) -> &str {
        match self {
            Link::Url(href) => href,
            Link::Object { href, .. } => href,
        }
    }
}

/// A `links` member, keyed by link name (`self`, `related`, `next`, ...).
pub type Links = BTreeMap<String, Link>;
