//! Shared validation helpers for inbound HTTP adapters.
//!
//! These checks cover request shape only. Value rules (ranges, integrality)
//! belong to the domain so every caller passes through them.

use serde_json::{Value, json};

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidType,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidType => "invalid_type",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }
}

/// Error for a required field that is absent or `null`.
///
/// `message` is shared across the fields of one request body so clients see
/// a single sentence naming everything required.
pub(crate) fn missing_field_error(field: FieldName, message: &str) -> Error {
    ValidationError::new(field.as_str(), message).with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_type_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a number"))
        .with_code(ErrorCode::InvalidType)
}

/// Read a JSON number as `f64`, rejecting strings, booleans and containers.
pub(crate) fn parse_number(value: &Value, field: FieldName) -> Result<f64, Error> {
    value.as_f64().ok_or_else(|| invalid_type_error(field))
}

/// Return the present, non-null value of a required field.
pub(crate) fn require_field(
    value: Option<Value>,
    field: FieldName,
    message: &str,
) -> Result<Value, Error> {
    match value {
        Some(Value::Null) | None => Err(missing_field_error(field, message)),
        Some(value) => Ok(value),
    }
}
