//! Field values: the closed set of runtime representations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldsError, Result};

/// A submitted or stored field value.
///
/// Untagged on the wire: `true`, `42`, `1.5`, `"text"`, `[...]`. Absence is
/// modelled with `Option<FieldValue>`, never with a null variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Short name of the representation, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert a JSON value. `null` maps to `None`; objects and nulls nested
    /// in arrays are rejected.
    pub fn from_json(value: &Value) -> Result<Option<FieldValue>> {
        match value {
            Value::Null => Ok(None),
            other => Self::from_json_inner(other).map(Some),
        }
    }

    fn from_json_inner(value: &Value) -> Result<FieldValue> {
        match value {
            Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(FieldValue::Integer(i)),
                None => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .ok_or_else(|| FieldsError::UnsupportedValue {
                        value: n.to_string(),
                    }),
            },
            Value::String(s) => Ok(FieldValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json_inner)
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            Value::Null | Value::Object(_) => Err(FieldsError::UnsupportedValue {
                value: value.to_string(),
            }),
        }
    }

    /// Render as JSON.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::String(s) => write!(f, "{s:?}"),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}
