//! Field-level validation of JSON request bodies.
//!
//! Bodies are inspected field by field so a single 400 response can report
//! every problem at once. Errors are keyed by field name and carry a
//! machine-readable `code` next to the human message.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    pub code: &'static str,
}

impl FieldError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn required() -> Self {
        Self::new("required", "This field is required.")
    }

    pub fn null() -> Self {
        Self::new("null", "This field may not be null.")
    }

    pub fn blank() -> Self {
        Self::new("blank", "This field may not be blank.")
    }

    pub fn invalid_string() -> Self {
        Self::new("invalid", "Not a valid string.")
    }

    pub fn max_length(max: usize) -> Self {
        Self::new(
            "max_length",
            format!("Ensure this field has no more than {} characters.", max),
        )
    }

    pub fn incorrect_type(value: &Value) -> Self {
        Self::new(
            "incorrect_type",
            format!(
                "Incorrect type. Expected pk value, received {}.",
                json_type_name(value)
            ),
        )
    }

    pub fn does_not_exist(id: i64) -> Self {
        Self::new(
            "does_not_exist",
            format!("Invalid pk \"{}\" - object does not exist.", id),
        )
    }

    pub fn cyclic_parent() -> Self {
        Self::new(
            "invalid",
            "A folder cannot be moved into itself or one of its subfolders.",
        )
    }

    pub fn unique(entity: &str, field: &str) -> Self {
        Self::new(
            "unique",
            format!("{} with this {} already exists.", entity, field),
        )
    }
}

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<FieldError>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error map with a single entry.
    pub fn single(field: &str, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: &str, error: FieldError) {
        self.0.entry(field.to_string()).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.0 {
            for error in errors {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, error.message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Whether absent fields are an error (create) or left untouched (update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

/// Constraints for a string field.
#[derive(Debug, Clone, Copy)]
pub struct StringRule {
    pub max_length: Option<usize>,
    pub trim: bool,
}

impl StringRule {
    pub const fn bounded(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            trim: true,
        }
    }

    pub const fn text() -> Self {
        Self {
            max_length: None,
            trim: false,
        }
    }
}

/// Require the body to be a JSON object.
pub fn expect_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        ValidationErrors::single(
            NON_FIELD_ERRORS,
            FieldError::new(
                "invalid",
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    json_type_name(body)
                ),
            ),
        )
    })
}

/// Read a non-nullable string field.
///
/// Returns `None` when the field is absent or invalid; in the latter case
/// (and when a required field is missing) the error is recorded.
pub fn read_string(
    body: &Map<String, Value>,
    field: &str,
    rule: StringRule,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let raw = match body.get(field) {
        None => {
            if mode == Mode::Full {
                errors.add(field, FieldError::required());
            }
            return None;
        }
        Some(Value::Null) => {
            errors.add(field, FieldError::null());
            return None;
        }
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add(field, FieldError::invalid_string());
            return None;
        }
    };

    let value = if rule.trim {
        raw.trim().to_string()
    } else {
        raw
    };

    if value.trim().is_empty() {
        errors.add(field, FieldError::blank());
        return None;
    }

    if let Some(max) = rule.max_length {
        if value.chars().count() > max {
            errors.add(field, FieldError::max_length(max));
            return None;
        }
    }

    Some(value)
}

/// A reference to another row as supplied in a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// Field absent (or rejected).
    Absent,
    /// Explicit `null` on a nullable reference.
    Null,
    Id(i64),
}

impl Reference {
    pub fn id(self) -> Option<i64> {
        match self {
            Self::Id(id) => Some(id),
            Self::Absent | Self::Null => None,
        }
    }

    /// Shape used by partial updates: outer `None` leaves the column untouched.
    pub fn as_change(self) -> Option<Option<i64>> {
        match self {
            Self::Absent => None,
            Self::Null => Some(None),
            Self::Id(id) => Some(Some(id)),
        }
    }
}

/// Read a primary-key reference field. Existence is checked by the caller.
pub fn read_reference(
    body: &Map<String, Value>,
    field: &str,
    nullable: bool,
    mode: Mode,
    errors: &mut ValidationErrors,
) -> Reference {
    match body.get(field) {
        None => {
            if mode == Mode::Full && !nullable {
                errors.add(field, FieldError::required());
            }
            Reference::Absent
        }
        Some(Value::Null) if nullable => Reference::Null,
        Some(Value::Null) => {
            errors.add(field, FieldError::null());
            Reference::Absent
        }
        Some(value) => match parse_pk(value) {
            Some(id) => Reference::Id(id),
            None => {
                errors.add(field, FieldError::incorrect_type(value));
                Reference::Absent
            }
        },
    }
}

fn parse_pk(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[rstest]
    #[case(json!({}), Mode::Full, Some("required"))]
    #[case(json!({}), Mode::Partial, None)]
    #[case(json!({"name": null}), Mode::Partial, Some("null"))]
    #[case(json!({"name": "   "}), Mode::Full, Some("blank"))]
    #[case(json!({"name": true}), Mode::Full, Some("invalid"))]
    #[case(json!({"name": ["a"]}), Mode::Full, Some("invalid"))]
    #[case(json!({"name": "f".repeat(241)}), Mode::Full, Some("max_length"))]
    #[case(json!({"name": "f".repeat(240)}), Mode::Full, None)]
    fn test_read_string_codes(
        #[case] body: Value,
        #[case] mode: Mode,
        #[case] expected: Option<&str>,
    ) {
        let mut errors = ValidationErrors::new();
        read_string(&object(body), "name", StringRule::bounded(240), mode, &mut errors);
        let code = errors.get("name").map(|e| e[0].code);
        assert_eq!(code, expected);
    }

    #[test]
    fn test_read_string_counts_characters_not_bytes() {
        let mut errors = ValidationErrors::new();
        let name = "✓".repeat(240);
        let value = read_string(
            &object(json!({ "name": name })),
            "name",
            StringRule::bounded(240),
            Mode::Full,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(value.map(|v| v.chars().count()), Some(240));
    }

    #[test]
    fn test_read_string_trims_bounded_fields_only() {
        let mut errors = ValidationErrors::new();
        let body = object(json!({ "title": "  padded  ", "content": "\n body \n" }));

        let title = read_string(&body, "title", StringRule::bounded(240), Mode::Full, &mut errors);
        let content = read_string(&body, "content", StringRule::text(), Mode::Full, &mut errors);

        assert_eq!(title.as_deref(), Some("padded"));
        assert_eq!(content.as_deref(), Some("\n body \n"));
    }

    #[test]
    fn test_read_string_coerces_numbers() {
        let mut errors = ValidationErrors::new();
        let value = read_string(
            &object(json!({ "name": 42 })),
            "name",
            StringRule::bounded(240),
            Mode::Full,
            &mut errors,
        );
        assert_eq!(value.as_deref(), Some("42"));
    }

    #[rstest]
    #[case(json!({"folder": 7}), false, Reference::Id(7))]
    #[case(json!({"folder": "7"}), false, Reference::Id(7))]
    #[case(json!({"folder": null}), true, Reference::Null)]
    #[case(json!({}), true, Reference::Absent)]
    fn test_read_reference_values(
        #[case] body: Value,
        #[case] nullable: bool,
        #[case] expected: Reference,
    ) {
        let mut errors = ValidationErrors::new();
        let reference = read_reference(&object(body), "folder", nullable, Mode::Full, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(reference, expected);
    }

    #[rstest]
    #[case(json!({}), "required")]
    #[case(json!({"folder": null}), "null")]
    #[case(json!({"folder": "abc"}), "incorrect_type")]
    #[case(json!({"folder": 1.5}), "incorrect_type")]
    #[case(json!({"folder": {"id": 1}}), "incorrect_type")]
    fn test_read_reference_errors(#[case] body: Value, #[case] expected: &str) {
        let mut errors = ValidationErrors::new();
        let reference = read_reference(&object(body), "folder", false, Mode::Full, &mut errors);
        assert_eq!(reference, Reference::Absent);
        assert_eq!(errors.get("folder").unwrap()[0].code, expected);
    }

    #[test]
    fn test_incorrect_type_names_received_type() {
        let error = FieldError::incorrect_type(&json!("abc"));
        assert_eq!(error.message, "Incorrect type. Expected pk value, received str.");
    }

    #[test]
    fn test_expect_object_rejects_arrays() {
        let errors = expect_object(&json!([1, 2])).unwrap_err();
        let entry = &errors.get(NON_FIELD_ERRORS).unwrap()[0];
        assert_eq!(entry.code, "invalid");
        assert!(entry.message.contains("list"));
    }

    #[test]
    fn test_errors_serialize_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("name", FieldError::required());
        errors.add("name", FieldError::blank());

        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["name"][0]["code"], "required");
        assert_eq!(value["name"][1]["code"], "blank");
        assert_eq!(value["name"][0]["message"], "This field is required.");
    }

    #[test]
    fn test_errors_display_joins_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("content", FieldError::required());
        errors.add("title", FieldError::max_length(240));
        assert_eq!(
            errors.to_string(),
            "content: This field is required.; title: Ensure this field has no more than 240 characters."
        );
    }
}
