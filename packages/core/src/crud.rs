//! Declarative CRUD metadata: which entity fields are required on create and
//! which may be written by clients.
//!
//! The table is built once at startup, either in code or from static
//! configuration:
//!
//! ```json
//! { "name": { "required": true, "writable": true }, "enabled": { "writable": true } }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// CRUD flags of a single field. Both default to `false`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Crud {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub writable: bool,
}

/// Field name → [`Crud`] flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CrudTable {
    fields: HashMap<String, Crud>,
}

impl CrudTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, field_name: impl Into<String>, required: bool, writable: bool) -> Self {
        self.insert(field_name, Crud { required, writable });
        self
    }

    pub fn insert(&mut self, field_name: impl Into<String>, crud: Crud) {
        self.fields.insert(field_name.into(), crud);
    }

    /// `(required, writable)` for `field_name`; `(false, false)` when the
    /// field carries no CRUD metadata.
    pub fn read(&self, field_name: &str) -> (bool, bool) {
        self.fields
            .get(field_name)
            .map_or((false, false), |c| (c.required, c.writable))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
