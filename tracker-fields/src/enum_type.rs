//! Enum types: values restricted to a fixed set over a primitive base kind.

use crate::error::{FieldsError, Result};
use crate::kind::Kind;
use crate::simple_type::SimpleType;
use crate::value::FieldValue;

/// A field type whose values must come from `values`.
///
/// `base_type` is the primitive domain of the values. `rewritable_values`
/// marks a value set that may be redefined later; a rewritable enum ignores
/// its values when it is the receiver of [`EnumType::equal`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub simple_type: SimpleType,
    pub base_type: SimpleType,
    pub values: Vec<FieldValue>,
    pub rewritable_values: bool,
    pub default_value: Option<FieldValue>,
}

impl EnumType {
    /// Create an enum over `base` with the given values and no explicit default.
    pub fn new(base: Kind, values: impl IntoIterator<Item = impl Into<FieldValue>>) -> Self {
        Self {
            simple_type: SimpleType::new(Kind::Enum),
            base_type: SimpleType::new(base),
            values: values.into_iter().map(Into::into).collect(),
            rewritable_values: false,
            default_value: None,
        }
    }

    /// Mark the value set as rewritable.
    pub fn rewritable(mut self, rewritable: bool) -> Self {
        self.rewritable_values = rewritable;
        self
    }

    pub fn kind(&self) -> Kind {
        self.simple_type.kind
    }

    /// Check the type itself.
    ///
    /// Rejects an empty value set, a self-kind other than `enum`, a composite
    /// base kind, values that do not fit the base kind, and a default that is
    /// not one of the values.
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(FieldsError::invalid_type("enum values must not be empty"));
        }
        if self.simple_type.kind != Kind::Enum {
            return Err(FieldsError::invalid_type(format!(
                "enum type must have kind 'enum', not '{}'",
                self.simple_type.kind
            )));
        }
        if self.base_type.kind.is_composite() {
            return Err(FieldsError::invalid_type(format!(
                "enum base type cannot be '{}'",
                self.base_type.kind
            )));
        }
        if let Some(bad) = self.values.iter().find(|v| !self.base_type.conforms(v)) {
            return Err(FieldsError::invalid_type(format!(
                "enum value {bad} is not a valid {}",
                self.base_type.kind
            )));
        }
        if let Some(default) = &self.default_value {
            if !self.contains(default) {
                return Err(FieldsError::invalid_type(format!(
                    "enum default {default} is not one of the allowed values"
                )));
            }
        }
        Ok(())
    }

    /// The explicit default, or the first value when none is set.
    pub fn get_default_value(&self) -> Option<&FieldValue> {
        self.default_value.as_ref().or_else(|| self.values.first())
    }

    /// Return a copy with `default` as the default value.
    ///
    /// `None` clears the default and always succeeds. A value whose
    /// representation does not fit the base kind, or that is not one of the
    /// allowed values, is rejected. The receiver is never modified.
    pub fn set_default_value(&self, default: Option<FieldValue>) -> Result<EnumType> {
        let default = match default {
            None => None,
            Some(value) => {
                let stored = self.base_type.convert_to_model(&value)?;
                if !self.contains(&stored) {
                    return Err(FieldsError::not_allowed(&value));
                }
                Some(stored)
            }
        };
        Ok(EnumType {
            default_value: default,
            ..self.clone()
        })
    }

    /// Whether `value` is one of the allowed values, compared in stored form.
    pub fn contains(&self, value: &FieldValue) -> bool {
        self.values
            .iter()
            .any(|v| self.base_type.same_value(v, value))
    }

    /// Structural equality.
    ///
    /// Self-kind, base kind and default must match. When `self` is rewritable
    /// the value sets are not compared at all; otherwise the rewritable flags
    /// must agree and both sides must hold the same set of values. The relation
    /// is asymmetric when exactly one side is rewritable.
    pub fn equal(&self, other: &EnumType) -> bool {
        if !self.simple_type.equal(&other.simple_type) {
            return false;
        }
        if !self.base_type.equal(&other.base_type) {
            return false;
        }
        if !self.same_default(other) {
            return false;
        }
        if self.rewritable_values {
            return true;
        }
        if self.rewritable_values != other.rewritable_values {
            return false;
        }
        self.same_value_set(other)
    }

    /// Equality of the stored value representation; same rules as [`equal`](Self::equal).
    pub fn equal_value(&self, other: &EnumType) -> bool {
        self.equal(other)
    }

    /// Whether values typed against `other` still validate against `self`.
    ///
    /// True iff the kinds match and `self.values` is a superset of a non-empty
    /// `other.values`. Widening encloses; narrowing or emptying does not.
    pub fn equal_enclosing(&self, other: &EnumType) -> bool {
        if !self.simple_type.equal(&other.simple_type) {
            return false;
        }
        if !self.base_type.equal(&other.base_type) {
            return false;
        }
        if self.values.is_empty() || other.values.is_empty() {
            return false;
        }
        other.values.iter().all(|v| self.contains(v))
    }

    /// Check a submitted value: convert through the base type, then require
    /// membership.
    pub fn convert_to_model(&self, value: &FieldValue) -> Result<FieldValue> {
        let stored = self.base_type.convert_to_model(value)?;
        if !self.contains(&stored) {
            return Err(FieldsError::not_allowed(value));
        }
        Ok(stored)
    }

    fn same_default(&self, other: &EnumType) -> bool {
        match (&self.default_value, &other.default_value) {
            (None, None) => true,
            (Some(a), Some(b)) => self.base_type.same_value(a, b),
            _ => false,
        }
    }

    fn same_value_set(&self, other: &EnumType) -> bool {
        self.values.len() == other.values.len()
            && self.values.iter().all(|v| other.contains(v))
            && other.values.iter().all(|v| self.contains(v))
    }
}
