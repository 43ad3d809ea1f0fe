//! Serializer field definitions and type-level validation.
//!
//! Each [`FieldDef`] describes a single field of a request payload: its type,
//! whether it is required, and an optional error-code override. The
//! [`FieldType`] enum defines the type-specific checks through
//! [`validate_field_value`], which reports failures as ordered lists of
//! symbolic error codes (`required`, `invalid`, `max_length`, ...).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// Defines the type of a serializer field, including type-specific parameters.
///
/// Each variant carries the bounds applied after type checking. The
/// [`validate_field_value`] function dispatches on this enum.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// A character (string) field.
    Char {
        /// Minimum length (characters).
        min_length: Option<usize>,
        /// Maximum length (characters).
        max_length: Option<usize>,
    },
    /// An integer field.
    Integer {
        /// Minimum allowed value.
        min_value: Option<i64>,
        /// Maximum allowed value.
        max_value: Option<i64>,
    },
    /// An email address field.
    Email,
    /// A boolean field.
    Boolean,
}

impl FieldType {
    /// A character field with no length bounds.
    pub const fn char() -> Self {
        Self::Char {
            min_length: None,
            max_length: None,
        }
    }

    /// An integer field with no value bounds.
    pub const fn integer() -> Self {
        Self::Integer {
            min_value: None,
            max_value: None,
        }
    }
}

/// Complete definition of a serializer field.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// The field name as it appears in the payload.
    pub name: String,
    /// The field type, controlling validation.
    pub field_type: FieldType,
    /// Whether this field must be present and non-null.
    pub required: bool,
    /// When set, any failure on this field is reported under this single
    /// code instead of the type-level codes. Setting a catalog entry name
    /// here lets a field failure short-circuit validation to that entry.
    pub error_code: Option<String>,
}

impl FieldDef {
    /// Creates a new required field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            error_code: None,
        }
    }

    /// Marks the field as optional.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the error-code override for this field.
    #[must_use]
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Validates a payload value against this definition.
    ///
    /// Returns the ordered list of symbolic error codes, empty on success.
    /// A missing or null value fails with `required` (or passes when the
    /// field is optional); all codes collapse to the override when one is
    /// set.
    pub fn validate(&self, value: Option<&Value>) -> Vec<String> {
        let codes = self.raw_codes(value);
        if codes.is_empty() {
            return codes;
        }
        match &self.error_code {
            Some(code) => vec![code.clone()],
            None => codes,
        }
    }

    fn raw_codes(&self, value: Option<&Value>) -> Vec<String> {
        match value {
            None | Some(Value::Null) => {
                if self.required {
                    vec!["required".to_string()]
                } else {
                    Vec::new()
                }
            }
            Some(value) => validate_field_value(&self.field_type, value),
        }
    }
}

/// Validates a present, non-null value against a field type.
///
/// Type mismatches report `invalid`; bound violations report the code of the
/// violated bound (`min_length`, `max_length`, `min_value`, `max_value`).
pub fn validate_field_value(field_type: &FieldType, value: &Value) -> Vec<String> {
    let mut codes = Vec::new();
    match field_type {
        FieldType::Char {
            min_length,
            max_length,
        } => match value.as_str() {
            Some(s) => {
                let len = s.chars().count();
                if let Some(min) = min_length {
                    if len < *min {
                        codes.push("min_length".to_string());
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        codes.push("max_length".to_string());
                    }
                }
            }
            None => codes.push("invalid".to_string()),
        },
        FieldType::Integer {
            min_value,
            max_value,
        } => match value.as_i64() {
            Some(n) => {
                if let Some(min) = min_value {
                    if n < *min {
                        codes.push("min_value".to_string());
                    }
                }
                if let Some(max) = max_value {
                    if n > *max {
                        codes.push("max_value".to_string());
                    }
                }
            }
            None => codes.push("invalid".to_string()),
        },
        FieldType::Email => match value.as_str() {
            Some(s) if EMAIL_RE.is_match(s) => {}
            _ => codes.push("invalid".to_string()),
        },
        FieldType::Boolean => {
            if !value.is_boolean() {
                codes.push("invalid".to_string());
            }
        }
    }
    codes
}
