//! Request-document hydration: turns the `data` member of a create request
//! into coerced field values.

pub mod fields;

use std::collections::BTreeMap;

use http::StatusCode;
use serde_json::Value;

use crate::errors::{JsonApiError, JsonApiException, JsonApiMultipleError};
use fields::{FieldValue, HydratorField};

/// Coerced values keyed by domain field name.
pub type Hydrated = BTreeMap<String, FieldValue>;

/// Field set of one resource type.
#[derive(Debug, Clone)]
pub struct Hydrator {
    resource_type: String,
    fields: Vec<HydratorField>,
}

impl Hydrator {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: impl Into<HydratorField>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields(&self) -> &[HydratorField] {
        &self.fields
    }

    /// Hydrate a create document.
    ///
    /// Fails with 400 when `data` is missing, 409 when `data.type` names
    /// another resource type and 422 (one error per field) when required
    /// attributes are absent. Only writable fields appear in the result.
    pub fn hydrate(&self, document: &Value) -> Result<Hydrated, JsonApiException> {
        let data = document.get("data").and_then(Value::as_object).ok_or_else(|| {
            JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid document")
                .with_detail("Request document must contain a data object")
                .with_pointer("/data")
        })?;

        let resource_type = data.get("type").and_then(Value::as_str).unwrap_or_default();
        if resource_type != self.resource_type {
            return Err(JsonApiError::new(StatusCode::CONFLICT, "Invalid type")
                .with_detail(format!(
                    "Expected resource type \"{}\", got \"{resource_type}\"",
                    self.resource_type
                ))
                .with_pointer("/data/type")
                .into());
        }

        let empty = serde_json::Map::new();
        let attributes = data
            .get("attributes")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let missing = self.fields.iter().map(HydratorField::field).filter(|f| {
            f.is_required() && attributes.get(f.mapped_name()).map_or(true, Value::is_null)
        });
        let errors = missing.map(|f| {
            JsonApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "Missing required attribute")
                .with_detail(format!("Attribute \"{}\" is required", f.mapped_name()))
                .with_pointer(format!("/data/attributes/{}", f.mapped_name()))
        });
        if let Some(errors) = JsonApiMultipleError::from_errors(errors) {
            return Err(errors.with_status(StatusCode::UNPROCESSABLE_ENTITY).into());
        }

        Ok(self
            .fields
            .iter()
            .filter(|f| f.field().is_writable())
            .map(|f| (f.field().field_name().to_string(), f.value(attributes)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::fields::{BooleanField, Field, NumberField, TextField};
    use super::*;
    use crate::crud::CrudTable;

    fn hydrator() -> Hydrator {
        let crud = CrudTable::new()
            .with_field("name", true, true)
            .with_field("identifier", true, true)
            .with_field("enabled", false, true)
            .with_field("priority", false, true);
        Hydrator::new("devices")
            .field(TextField::new(Field::from_crud("name", "name", &crud), false))
            .field(TextField::new(Field::from_crud("identifier", "identifier", &crud), false))
            .field(BooleanField::new(Field::from_crud("enabled", "enabled", &crud), false))
            .field(NumberField::integer(Field::from_crud("priority", "priority", &crud), true))
            .field(TextField::new(Field::from_crud("owner", "owner", &crud), true))
    }

    #[test]
    fn hydrates_writable_fields() {
        let doc = json!({
            "data": {
                "type": "devices",
                "attributes": { "name": "Boiler", "identifier": "boiler-1", "priority": "3", "owner": "x" }
            }
        });
        let values = hydrator().hydrate(&doc).unwrap();
        assert_eq!(values["name"], FieldValue::Text("Boiler".into()));
        assert_eq!(values["enabled"], FieldValue::Boolean(false));
        assert_eq!(values["priority"], FieldValue::Integer(3));
        assert!(!values.contains_key("owner"));
    }

    #[test]
    fn missing_required_attributes_yield_one_error_each() {
        let doc = json!({ "data": { "type": "devices", "attributes": { "name": null } } });
        let err = hydrator().hydrate(&doc).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let objects = err.error_objects();
        let pointers: Vec<_> = objects
            .iter()
            .map(|o| o.source.as_ref().unwrap().pointer.clone().unwrap())
            .collect();
        assert_eq!(pointers, ["/data/attributes/name", "/data/attributes/identifier"]);
    }

    #[test]
    fn wrong_type_is_a_conflict() {
        let doc = json!({ "data": { "type": "channels", "attributes": {} } });
        let err = hydrator().hydrate(&doc).unwrap_err();
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert!(matches!(err, JsonApiException::Single(_)));
    }

    #[test]
    fn missing_data_is_a_bad_request() {
        let err = hydrator().hydrate(&json!({ "meta": {} })).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
