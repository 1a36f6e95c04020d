//! Error types for the field type system

use thiserror::Error;
use tracker_common::{ErrorKind, ErrorSeverity, Severity};

use crate::kind::Kind;

/// Result type for field type operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while building, comparing or applying field types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldsError {
    /// Kind name outside the closed enumeration
    #[error("unknown field kind: {name}")]
    UnknownKind { name: String },

    /// Malformed field type (invalid nesting, empty enum values, ...)
    #[error("invalid field type: {message}")]
    InvalidType { message: String },

    /// Value representation does not match the expected kind
    #[error("value {value} is not a valid {kind}")]
    TypeMismatch { kind: Kind, value: String },

    /// Value has the right representation but is outside the allowed set
    #[error("value {value} is not one of the allowed values")]
    NotAllowed { value: String },

    /// Value shape the type system has no representation for (objects, nested nulls)
    #[error("unsupported value: {value}")]
    UnsupportedValue { value: String },

    /// Required field absent from the payload
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// Field name not declared by the schema
    #[error("unknown field: {field}")]
    UnknownField { field: String },

    /// A field's value was rejected by its type
    #[error("invalid value for field '{field}': {source}")]
    InvalidValue {
        field: String,
        #[source]
        source: Box<FieldsError>,
    },
}

impl FieldsError {
    /// Create an invalid type error
    pub fn invalid_type(message: impl Into<String>) -> Self {
        Self::InvalidType {
            message: message.into(),
        }
    }

    /// Create a type mismatch error, rendering the offending value
    pub fn type_mismatch(kind: Kind, value: impl std::fmt::Display) -> Self {
        Self::TypeMismatch {
            kind,
            value: value.to_string(),
        }
    }

    /// Create a not-allowed error
    pub fn not_allowed(value: impl std::fmt::Display) -> Self {
        Self::NotAllowed {
            value: value.to_string(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Attach the field name to a value error
    pub fn for_field(self, field: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            source: Box::new(self),
        }
    }

    /// Classify the error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownKind { .. } | Self::InvalidType { .. } => ErrorKind::Configuration,
            Self::TypeMismatch { .. }
            | Self::NotAllowed { .. }
            | Self::UnsupportedValue { .. }
            | Self::MissingField { .. }
            | Self::UnknownField { .. } => ErrorKind::BadParameter,
            Self::InvalidValue { source, .. } => source.kind(),
        }
    }
}

impl Severity for FieldsError {
    fn severity(&self) -> ErrorSeverity {
        self.kind().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FieldsError::missing_field("foo");
        assert_eq!(err.to_string(), "missing required field: foo");
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = FieldsError::type_mismatch(Kind::String, 123);
        assert_eq!(err.to_string(), "value 123 is not a valid string");
    }

    #[test]
    fn wrapped_error_keeps_inner_kind() {
        let err = FieldsError::not_allowed("\"foobar\"").for_field("status");
        assert_eq!(err.kind(), ErrorKind::BadParameter);
        assert!(err.to_string().contains("status"));
        assert!(err.to_string().contains("foobar"));

        let err = FieldsError::invalid_type("empty").for_field("status");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
