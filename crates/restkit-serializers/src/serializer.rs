//! The first-error serializer.
//!
//! A [`Serializer`] validates a JSON payload against its field definitions
//! in declaration order and collects symbolic error codes per field. When
//! any errors exist, the first field's first code is resolved against the
//! status catalog: a match short-circuits the run to that catalog entry and
//! drops every other error; no match reports the complete ordered field map
//! as a generic validation failure.

use serde_json::{Map, Value};

use restkit_core::error::{FieldErrors, ValidationFailure};
use restkit_core::status::Status;

use crate::fields::FieldDef;

/// A declarative payload validator with first-error short-circuiting.
///
/// # Examples
///
/// ```
/// use restkit_serializers::{FieldDef, FieldType, Serializer};
/// use serde_json::json;
///
/// let serializer = Serializer::new()
///     .field(FieldDef::new("refresh", FieldType::char()));
///
/// let validated = serializer.validate(&json!({"refresh": "abc"})).unwrap();
/// assert_eq!(validated["refresh"], json!("abc"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    fields: Vec<FieldDef>,
}

impl Serializer {
    /// Creates a serializer with no fields.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field definition. Fields validate in the order they are
    /// declared.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the field definitions in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Validates a payload against the declared fields.
    ///
    /// On success, returns the validated data containing only the declared
    /// fields that were present. A non-object payload fails as a generic
    /// validation error.
    pub fn validate(&self, payload: &Value) -> Result<Map<String, Value>, ValidationFailure> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationFailure::Status(Status::ValidationError));
        };

        let mut errors: FieldErrors = Vec::new();
        let mut validated = Map::new();

        for field in &self.fields {
            let value = object.get(&field.name);
            let codes = field.validate(value);
            if codes.is_empty() {
                if let Some(value) = value {
                    if !value.is_null() {
                        validated.insert(field.name.clone(), value.clone());
                    }
                }
            } else {
                errors.push((field.name.clone(), codes));
            }
        }

        if errors.is_empty() {
            return Ok(validated);
        }

        // First field's first code wins when it names a catalog entry.
        let first_code = &errors[0].1[0];
        match Status::from_name(first_code) {
            Some(status) => Err(ValidationFailure::Status(status)),
            None => Err(ValidationFailure::Fields(errors)),
        }
    }
}
