//! Error types for the schema engine

use thiserror::Error;
use tracker_common::{ErrorKind, ErrorSeverity, Severity};
use tracker_fields::FieldsError;

use crate::config::ConfigError;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors that can occur while creating, resolving or validating against a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Field type system error (bad value, missing or unknown field, malformed type)
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// A field definition in a create or extend request is malformed
    #[error("invalid definition for field '{field}': {source}")]
    InvalidFieldType {
        field: String,
        #[source]
        source: FieldsError,
    },

    /// Work item type not found by id
    #[error("work item type not found: {id}")]
    WorkItemTypeNotFound { id: String },

    /// Category not found by id
    #[error("category not found: {id}")]
    CategoryNotFound { id: String },

    /// Request parameter rejected
    #[error("invalid parameter '{parameter}': {message}")]
    BadParameter { parameter: String, message: String },

    /// Base type links form a cycle
    #[error("inheritance cycle detected: {path}")]
    InheritanceCycle { path: String },

    /// Base type chain longer than the configured maximum
    #[error("inheritance chain of {id} exceeds maximum depth {max}")]
    InheritanceTooDeep { id: String, max: usize },

    /// Schema change would invalidate data stored under the current definition
    #[error("field '{field}' conflicts with its current definition: {message}")]
    Conflict { field: String, message: String },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SchemaError {
    /// Create a bad parameter error
    pub fn bad_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify the error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fields(e) => e.kind(),
            Self::InvalidFieldType { .. }
            | Self::InheritanceCycle { .. }
            | Self::InheritanceTooDeep { .. }
            | Self::Config(_) => ErrorKind::Configuration,
            Self::WorkItemTypeNotFound { .. } | Self::CategoryNotFound { .. } => {
                ErrorKind::NotFound
            }
            Self::BadParameter { .. } => ErrorKind::BadParameter,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Io(_) | Self::Yaml(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Severity for SchemaError {
    fn severity(&self) -> ErrorSeverity {
        self.kind().into()
    }
}
