//! The tagged field type variant and its wire representation.

use serde::{Deserialize, Serialize};

use crate::enum_type::EnumType;
use crate::error::{FieldsError, Result};
use crate::kind::Kind;
use crate::list_type::ListType;
use crate::simple_type::SimpleType;
use crate::value::FieldValue;

/// The type of a field: a primitive, an enum over a primitive, or a list.
///
/// Serialized as a flat tagged structure:
///
/// ```yaml
/// kind: enum
/// base_type: { kind: string }
/// values: [open, closed]
/// rewritable: false
/// default: open
/// ```
///
/// Lists carry `component_type` instead. Round-tripping is lossless, including
/// for malformed types, so a loaded type can still be rejected by
/// [`FieldType::validate`]. A bare `kind: enum` or `kind: list` parses as a
/// simple type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldTypeRepr", into = "FieldTypeRepr")]
pub enum FieldType {
    Simple(SimpleType),
    Enum(EnumType),
    List(ListType),
}

impl FieldType {
    /// The self-kind: the simple kind, `enum` or `list`.
    pub fn kind(&self) -> Kind {
        match self {
            FieldType::Simple(t) => t.kind(),
            FieldType::Enum(t) => t.kind(),
            FieldType::List(t) => t.kind(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            FieldType::Simple(t) => t.validate(),
            FieldType::Enum(t) => t.validate(),
            FieldType::List(t) => t.validate(),
        }
    }

    /// Structural equality. Different variants are never equal.
    pub fn equal(&self, other: &FieldType) -> bool {
        match (self, other) {
            (FieldType::Simple(a), FieldType::Simple(b)) => a.equal(b),
            (FieldType::Enum(a), FieldType::Enum(b)) => a.equal(b),
            (FieldType::List(a), FieldType::List(b)) => a.equal(b),
            _ => false,
        }
    }

    pub fn equal_value(&self, other: &FieldType) -> bool {
        match (self, other) {
            (FieldType::Simple(a), FieldType::Simple(b)) => a.equal(b),
            (FieldType::Enum(a), FieldType::Enum(b)) => a.equal_value(b),
            (FieldType::List(a), FieldType::List(b)) => a.equal_value(b),
            _ => false,
        }
    }

    /// Whether values valid under `other` remain valid under `self`.
    pub fn equal_enclosing(&self, other: &FieldType) -> bool {
        match (self, other) {
            (FieldType::Simple(a), FieldType::Simple(b)) => a.equal_enclosing(b),
            (FieldType::Enum(a), FieldType::Enum(b)) => a.equal_enclosing(b),
            (FieldType::List(a), FieldType::List(b)) => a.equal_enclosing(b),
            _ => false,
        }
    }

    /// Check a value and return the form to store.
    pub fn convert_to_model(&self, value: &FieldValue) -> Result<FieldValue> {
        match self {
            FieldType::Simple(t) => t.convert_to_model(value),
            FieldType::Enum(t) => t.convert_to_model(value),
            FieldType::List(t) => t.convert_to_model(value),
        }
    }

    /// Value used when a field is left out: the enum default, the empty list,
    /// or nothing for simple types.
    pub fn default_value(&self) -> Option<FieldValue> {
        match self {
            FieldType::Simple(_) => None,
            FieldType::Enum(t) => t.get_default_value().cloned(),
            FieldType::List(t) => Some(t.default_value()),
        }
    }
}

impl From<SimpleType> for FieldType {
    fn from(t: SimpleType) -> Self {
        FieldType::Simple(t)
    }
}

impl From<Kind> for FieldType {
    fn from(kind: Kind) -> Self {
        FieldType::Simple(SimpleType::new(kind))
    }
}

impl From<EnumType> for FieldType {
    fn from(t: EnumType) -> Self {
        FieldType::Enum(t)
    }
}

impl From<ListType> for FieldType {
    fn from(t: ListType) -> Self {
        FieldType::List(t)
    }
}

/// Flat on-wire shape of a [`FieldType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FieldTypeRepr {
    kind: Kind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_type: Option<SimpleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<FieldValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rewritable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    component_type: Option<Box<FieldTypeRepr>>,
}

impl FieldTypeRepr {
    fn simple(kind: Kind) -> Self {
        Self {
            kind,
            base_type: None,
            values: None,
            rewritable: None,
            default: None,
            component_type: None,
        }
    }
}

impl From<FieldType> for FieldTypeRepr {
    fn from(t: FieldType) -> Self {
        match t {
            FieldType::Simple(s) => FieldTypeRepr::simple(s.kind),
            FieldType::Enum(e) => FieldTypeRepr {
                base_type: Some(e.base_type),
                values: Some(e.values),
                rewritable: Some(e.rewritable_values),
                default: e.default_value,
                ..FieldTypeRepr::simple(e.simple_type.kind)
            },
            FieldType::List(l) => FieldTypeRepr {
                component_type: Some(Box::new((*l.component_type).into())),
                ..FieldTypeRepr::simple(l.simple_type.kind)
            },
        }
    }
}

impl TryFrom<FieldTypeRepr> for FieldType {
    type Error = FieldsError;

    fn try_from(repr: FieldTypeRepr) -> Result<Self> {
        let kind = repr.kind;
        if let Some(component) = repr.component_type {
            return Ok(FieldType::List(ListType {
                simple_type: SimpleType::new(kind),
                component_type: Box::new(FieldType::try_from(*component)?),
            }));
        }
        let has_enum_attributes = repr.base_type.is_some()
            || repr.values.is_some()
            || repr.rewritable.is_some()
            || repr.default.is_some();
        if has_enum_attributes {
            let base_type = repr
                .base_type
                .ok_or_else(|| FieldsError::invalid_type("enum type requires base_type"))?;
            return Ok(FieldType::Enum(EnumType {
                simple_type: SimpleType::new(kind),
                base_type,
                values: repr.values.unwrap_or_default(),
                rewritable_values: repr.rewritable.unwrap_or(false),
                default_value: repr.default,
            }));
        }
        Ok(FieldType::Simple(SimpleType::new(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_type_serializes_as_kind_only() {
        let t = FieldType::from(Kind::Float);
        assert_eq!(serde_json::to_value(&t).unwrap(), json!({"kind": "float"}));
    }

    #[test]
    fn enum_type_wire_shape() {
        let t: FieldType = EnumType::new(Kind::String, ["open", "closed"])
            .set_default_value(Some("closed".into()))
            .unwrap()
            .into();
        assert_eq!(
            serde_json::to_value(&t).unwrap(),
            json!({
                "kind": "enum",
                "base_type": {"kind": "string"},
                "values": ["open", "closed"],
                "rewritable": false,
                "default": "closed",
            })
        );
    }

    #[test]
    fn list_of_enum_yaml_round_trip() {
        let t: FieldType =
            ListType::new(EnumType::new(Kind::Integer, [1, 2, 3]).rewritable(true)).into();
        let yaml = serde_yaml_ng::to_string(&t).unwrap();
        assert!(yaml.contains("component_type:"));
        let parsed: FieldType = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, t);
    }

    #[test]
    fn malformed_enum_survives_round_trip() {
        let t = FieldType::Enum(EnumType {
            simple_type: SimpleType::new(Kind::String),
            ..EnumType::new(Kind::List, ["a"])
        });
        let parsed: FieldType =
            serde_json::from_value(serde_json::to_value(&t).unwrap()).unwrap();
        assert_eq!(parsed, t);
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        assert!(serde_json::from_value::<FieldType>(json!({"kind": "decimal"})).is_err());
    }

    #[test]
    fn enum_attributes_without_base_type_fail_to_parse() {
        assert!(serde_json::from_value::<FieldType>(json!({"kind": "enum", "values": ["a"]})).is_err());
        assert!(serde_json::from_value::<FieldType>(json!({"kind": "enum", "rewritable": true})).is_err());
    }

    #[test]
    fn bare_composite_kinds_survive_round_trip() {
        for kind in [Kind::Enum, Kind::List] {
            let t = FieldType::from(kind);
            let json = serde_json::to_value(&t).unwrap();
            assert_eq!(json, json!({"kind": kind.as_str()}));
            let parsed: FieldType = serde_json::from_value(json).unwrap();
            assert_eq!(parsed, t);
            assert!(parsed.validate().is_err());

            let yaml = serde_yaml_ng::to_string(&t).unwrap();
            let parsed: FieldType = serde_yaml_ng::from_str(&yaml).unwrap();
            assert_eq!(parsed, t);
        }
    }

    #[test]
    fn variants_never_compare_equal_across() {
        let simple = FieldType::from(Kind::Enum);
        let e = FieldType::from(EnumType::new(Kind::String, ["a"]));
        assert!(!simple.equal(&e));
        assert!(!e.equal(&simple));
        assert!(!e.equal_value(&simple));
        assert!(!e.equal_enclosing(&simple));
    }

    #[test]
    fn defaults_per_variant() {
        assert_eq!(FieldType::from(Kind::String).default_value(), None);
        assert_eq!(
            FieldType::from(EnumType::new(Kind::String, ["a", "b"])).default_value(),
            Some(FieldValue::from("a"))
        );
        assert_eq!(
            FieldType::from(ListType::new(Kind::Label)).default_value(),
            Some(FieldValue::List(vec![]))
        );
    }

    #[test]
    fn kind_reports_self_kind() {
        assert_eq!(FieldType::from(Kind::Url).kind(), Kind::Url);
        assert_eq!(
            FieldType::from(EnumType::new(Kind::String, ["a"])).kind(),
            Kind::Enum
        );
        assert_eq!(FieldType::from(ListType::new(Kind::User)).kind(), Kind::List);
    }
}
