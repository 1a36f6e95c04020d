//! Field definitions: a field type plus the "required" flag.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{FieldsError, Result};
use crate::field_type::FieldType;
use crate::kind::Kind;
use crate::value::FieldValue;

/// The schema entry stored per field name in a work item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(field_type: impl Into<FieldType>, required: bool) -> Self {
        Self {
            field_type: field_type.into(),
            required,
            label: None,
            description: None,
        }
    }

    /// An optional field of the given type.
    pub fn optional(field_type: impl Into<FieldType>) -> Self {
        Self::new(field_type, false)
    }

    /// A required field of the given type.
    pub fn required(field_type: impl Into<FieldType>) -> Self {
        Self::new(field_type, true)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> Kind {
        self.field_type.kind()
    }

    /// Check a submitted value for the field called `name`.
    ///
    /// An absent value fails when required and is accepted as-is otherwise,
    /// without consulting the type. A present value is converted by the type
    /// and returned in stored form.
    pub fn validate(&self, name: &str, value: Option<&FieldValue>) -> Result<Option<FieldValue>> {
        trace!(field = name, kind = %self.kind(), present = value.is_some(), "validating field");
        match value {
            None if self.required => Err(FieldsError::missing_field(name)),
            None => Ok(None),
            Some(value) => self
                .field_type
                .convert_to_model(value)
                .map(Some)
                .map_err(|e| e.for_field(name)),
        }
    }

    /// Whether data valid under `old` stays valid under `self`.
    ///
    /// The type must enclose the old type, and an optional field cannot become
    /// required because stored items may lack it.
    pub fn equal_enclosing(&self, old: &FieldDefinition) -> bool {
        self.field_type.equal_enclosing(&old.field_type) && (old.required || !self.required)
    }
}
