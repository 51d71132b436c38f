//! Typed accessors over the untyped `attributes` of a request resource.
//!
//! Coercion is permissive: a missing or ill-typed attribute degrades to a
//! typed default instead of failing. Validate before or after hydration when
//! strictness is needed.

use serde_json::Value;

use crate::crud::CrudTable;

/// A coerced attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integers as-is; decimals are truncated.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Decimal(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Decimal(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(b),
            FieldValue::Integer(i) => Value::from(i),
            FieldValue::Decimal(f) => Value::from(f),
            FieldValue::Text(s) => Value::String(s),
        }
    }
}

/// Mapping from a wire attribute to a domain field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    mapped_name: String,
    field_name: String,
    required: bool,
    writable: bool,
}

impl Field {
    /// `mapped_name` is the attribute name on the wire, `field_name` the
    /// domain field it feeds.
    pub fn new(mapped_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            mapped_name: mapped_name.into(),
            field_name: field_name.into(),
            required: false,
            writable: false,
        }
    }

    /// Take `required`/`writable` from the CRUD table entry of `field_name`.
    pub fn from_crud(
        mapped_name: impl Into<String>,
        field_name: impl Into<String>,
        crud: &CrudTable,
    ) -> Self {
        let field = Self::new(mapped_name, field_name);
        let (required, writable) = crud.read(&field.field_name);
        field.required(required).writable(writable)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    pub fn mapped_name(&self) -> &str {
        &self.mapped_name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    fn raw<'a>(&self, attributes: &'a serde_json::Map<String, Value>) -> Option<&'a Value> {
        attributes.get(&self.mapped_name).filter(|v| !v.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanField {
    field: Field,
    nullable: bool,
}

impl BooleanField {
    pub fn new(field: Field, nullable: bool) -> Self {
        Self { field, nullable }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Truthiness of the attribute; absent means `Null` when nullable,
    /// otherwise `false`.
    pub fn value(&self, attributes: &serde_json::Map<String, Value>) -> FieldValue {
        match self.field.raw(attributes) {
            Some(raw) => FieldValue::Boolean(truthy(raw)),
            None if self.nullable => FieldValue::Null,
            None => FieldValue::Boolean(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberField {
    field: Field,
    decimal: bool,
    nullable: bool,
}

impl NumberField {
    pub fn integer(field: Field, nullable: bool) -> Self {
        Self {
            field,
            decimal: false,
            nullable,
        }
    }

    pub fn decimal(field: Field, nullable: bool) -> Self {
        Self {
            field,
            decimal: true,
            nullable,
        }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_decimal(&self) -> bool {
        self.decimal
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Absent or non-scalar attributes yield `Null` whatever `nullable` says.
    pub fn value(&self, attributes: &serde_json::Map<String, Value>) -> FieldValue {
        match self.field.raw(attributes).filter(|v| is_scalar(v)) {
            Some(raw) if self.decimal => FieldValue::Decimal(to_decimal(raw)),
            Some(raw) => FieldValue::Integer(to_integer(raw)),
            None => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    field: Field,
    nullable: bool,
}

impl TextField {
    pub fn new(field: Field, nullable: bool) -> Self {
        Self { field, nullable }
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// String form of a scalar attribute; an empty string is `Null` when
    /// nullable.
    pub fn value(&self, attributes: &serde_json::Map<String, Value>) -> FieldValue {
        match self.field.raw(attributes).filter(|v| is_scalar(v)) {
            Some(raw) => {
                let text = to_text(raw);
                if self.nullable && text.is_empty() {
                    FieldValue::Null
                } else {
                    FieldValue::Text(text)
                }
            }
            None => FieldValue::Null,
        }
    }
}

/// Any of the typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydratorField {
    Boolean(BooleanField),
    Number(NumberField),
    Text(TextField),
}

impl HydratorField {
    pub fn field(&self) -> &Field {
        match self {
            HydratorField::Boolean(f) => f.field(),
            HydratorField::Number(f) => f.field(),
            HydratorField::Text(f) => f.field(),
        }
    }

    pub fn value(&self, attributes: &serde_json::Map<String, Value>) -> FieldValue {
        match self {
            HydratorField::Boolean(f) => f.value(attributes),
            HydratorField::Number(f) => f.value(attributes),
            HydratorField::Text(f) => f.value(attributes),
        }
    }
}

impl From<BooleanField> for HydratorField {
    fn from(value: BooleanField) -> Self {
        HydratorField::Boolean(value)
    }
}

impl From<NumberField> for HydratorField {
    fn from(value: NumberField) -> Self {
        HydratorField::Number(value)
    }
}

impl From<TextField> for HydratorField {
    fn from(value: TextField) -> Self {
        HydratorField::Text(value)
    }
}

// ---------------------------------------------------------------------------
// Coercion rules
// ---------------------------------------------------------------------------

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Value::String(s) => {
            let prefix = numeric_prefix(s);
            prefix
                .parse::<i64>()
                .unwrap_or_else(|_| prefix.parse::<f64>().unwrap_or(0.0) as i64)
        }
        _ => 0,
    }
}

fn to_decimal(value: &Value) -> f64 {
    match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => numeric_prefix(s).parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

/// Longest leading numeric literal of `s` (after leading whitespace):
/// optional sign, digits, fraction and exponent. Empty when there is none.
fn numeric_prefix(s: &str) -> &str {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attrs(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn field() -> Field {
        Field::new("value", "value")
    }

    #[test]
    fn boolean_absent_is_false_unless_nullable() {
        let empty = attrs(json!({}));
        let null = attrs(json!({ "value": null }));
        let strict = BooleanField::new(field(), false);
        let lenient = BooleanField::new(field(), true);

        assert_eq!(strict.value(&empty), FieldValue::Boolean(false));
        assert_eq!(strict.value(&null), FieldValue::Boolean(false));
        assert_eq!(lenient.value(&empty), FieldValue::Null);
        assert_eq!(lenient.value(&null), FieldValue::Null);
    }

    #[test]
    fn boolean_truthiness() {
        let f = BooleanField::new(field(), false);
        for (raw, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!(0.0), false),
            (json!("yes"), true),
            (json!("0"), false),
            (json!(""), false),
            (json!([]), false),
            (json!([0]), true),
            (json!({}), true),
        ] {
            assert_eq!(
                f.value(&attrs(json!({ "value": raw.clone() }))),
                FieldValue::Boolean(expected),
                "raw value {raw}"
            );
        }
    }

    #[test]
    fn number_ignores_nullable() {
        for nullable in [true, false] {
            let int = NumberField::integer(field(), nullable);
            let dec = NumberField::decimal(field(), nullable);
            for raw in [json!({}), json!({ "value": null }), json!({ "value": [1] }), json!({ "value": { "a": 1 } })] {
                assert_eq!(int.value(&attrs(raw.clone())), FieldValue::Null);
                assert_eq!(dec.value(&attrs(raw)), FieldValue::Null);
            }
        }
    }

    #[test]
    fn number_coercion() {
        let int = NumberField::integer(field(), false);
        let dec = NumberField::decimal(field(), false);
        let v = |raw: Value| attrs(json!({ "value": raw }));

        assert_eq!(int.value(&v(json!(42))), FieldValue::Integer(42));
        assert_eq!(int.value(&v(json!(12.9))), FieldValue::Integer(12));
        assert_eq!(int.value(&v(json!("17"))), FieldValue::Integer(17));
        assert_eq!(int.value(&v(json!(" 12abc"))), FieldValue::Integer(12));
        assert_eq!(int.value(&v(json!("1e3"))), FieldValue::Integer(1000));
        assert_eq!(int.value(&v(json!("abc"))), FieldValue::Integer(0));
        assert_eq!(int.value(&v(json!(true))), FieldValue::Integer(1));

        assert_eq!(dec.value(&v(json!(2))), FieldValue::Decimal(2.0));
        assert_eq!(dec.value(&v(json!("2.5kg"))), FieldValue::Decimal(2.5));
        assert_eq!(dec.value(&v(json!(".5"))), FieldValue::Decimal(0.5));
        assert_eq!(dec.value(&v(json!(false))), FieldValue::Decimal(0.0));
    }

    #[test]
    fn text_empty_string_and_nullability() {
        let nullable = TextField::new(field(), true);
        let strict = TextField::new(field(), false);
        let empty = attrs(json!({ "value": "" }));

        assert_eq!(nullable.value(&empty), FieldValue::Null);
        assert_eq!(strict.value(&empty), FieldValue::Text(String::new()));
        assert_eq!(strict.value(&attrs(json!({}))), FieldValue::Null);
        assert_eq!(strict.value(&attrs(json!({ "value": ["x"] }))), FieldValue::Null);
    }

    #[test]
    fn text_coercion() {
        let f = TextField::new(field(), false);
        let v = |raw: Value| f.value(&attrs(json!({ "value": raw })));

        assert_eq!(v(json!("kitchen")), FieldValue::Text("kitchen".into()));
        assert_eq!(v(json!(5)), FieldValue::Text("5".into()));
        assert_eq!(v(json!(1.0)), FieldValue::Text("1".into()));
        assert_eq!(v(json!(0.25)), FieldValue::Text("0.25".into()));
        assert_eq!(v(json!(true)), FieldValue::Text("1".into()));
        assert_eq!(v(json!(false)), FieldValue::Text(String::new()));
    }

    #[test]
    fn numeric_prefix_scanning() {
        assert_eq!(numeric_prefix("123abc"), "123");
        assert_eq!(numeric_prefix("  -4.5e2x"), "-4.5e2");
        assert_eq!(numeric_prefix("7e"), "7");
        assert_eq!(numeric_prefix("."), "");
        assert_eq!(numeric_prefix("x1"), "");
    }

    #[test]
    fn field_from_crud_table() {
        let table = CrudTable::new().with_field("name", true, true);
        let f = Field::from_crud("name", "name", &table);
        assert!(f.is_required());
        assert!(f.is_writable());

        let other = Field::from_crud("label", "label", &table);
        assert!(!other.is_required());
        assert!(!other.is_writable());
    }
}
