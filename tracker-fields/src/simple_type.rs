//! Simple types: a field type carrying exactly one kind.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldsError, Result};
use crate::kind::{Kind, Representation};
use crate::value::FieldValue;

/// A field type that is nothing but its kind.
///
/// Used directly for primitive fields, and as the base type of an enum or the
/// self-type of enums and lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleType {
    pub kind: Kind,
}

impl SimpleType {
    pub fn new(kind: Kind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// A bare simple type must be primitive.
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_composite() {
            return Err(FieldsError::invalid_type(format!(
                "simple type cannot have composite kind '{}'",
                self.kind
            )));
        }
        Ok(())
    }

    /// Simple types are equal iff their kinds are.
    pub fn equal(&self, other: &SimpleType) -> bool {
        self.kind == other.kind
    }

    /// For simple types, enclosing is plain equality.
    pub fn equal_enclosing(&self, other: &SimpleType) -> bool {
        self.equal(other)
    }

    /// Whether `value`'s representation fits this kind.
    pub fn conforms(&self, value: &FieldValue) -> bool {
        self.convert_to_model(value).is_ok()
    }

    /// Check `value` against the kind and return its stored form.
    ///
    /// Integers are widened for `float`; instants are normalised to UTC
    /// RFC 3339. Composite kinds accept nothing.
    pub fn convert_to_model(&self, value: &FieldValue) -> Result<FieldValue> {
        let mismatch = || FieldsError::type_mismatch(self.kind, value);
        match (self.kind.representation(), value) {
            (Representation::Text, FieldValue::String(_)) => Ok(value.clone()),
            (Representation::Url, FieldValue::String(s)) => match url::Url::parse(s) {
                Ok(_) => Ok(value.clone()),
                Err(_) => Err(mismatch()),
            },
            (Representation::Instant, FieldValue::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|t| {
                    FieldValue::String(
                        t.with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    )
                })
                .map_err(|_| mismatch()),
            (Representation::Integer, FieldValue::Integer(_)) => Ok(value.clone()),
            (Representation::Float, FieldValue::Float(_)) => Ok(value.clone()),
            (Representation::Float, FieldValue::Integer(i)) => Ok(FieldValue::Float(*i as f64)),
            (Representation::Boolean, FieldValue::Boolean(_)) => Ok(value.clone()),
            _ => Err(mismatch()),
        }
    }

    /// Compare two values as this kind would store them.
    ///
    /// Values that do not conform are compared verbatim.
    pub fn same_value(&self, a: &FieldValue, b: &FieldValue) -> bool {
        match (self.convert_to_model(a), self.convert_to_model(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        }
    }
}

impl From<Kind> for SimpleType {
    fn from(kind: Kind) -> Self {
        Self::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_common::ErrorKind;

    #[test]
    fn equal_iff_kind_matches() {
        let a = SimpleType::new(Kind::String);
        assert!(a.equal(&SimpleType::new(Kind::String)));
        assert!(!a.equal(&SimpleType::new(Kind::Markup)));
        assert!(a.equal_enclosing(&a));
    }

    #[test]
    fn composite_kinds_are_rejected_as_bare_types() {
        assert!(SimpleType::new(Kind::Float).validate().is_ok());
        for kind in [Kind::Enum, Kind::List] {
            let err = SimpleType::new(kind).validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
    }

    #[test]
    fn text_kinds_accept_strings_only() {
        for kind in [Kind::String, Kind::Area, Kind::Iteration, Kind::User, Kind::WorkItem] {
            let t = SimpleType::new(kind);
            assert!(t.conforms(&FieldValue::from("abc")));
            assert!(!t.conforms(&FieldValue::from(1)));
        }
    }

    #[test]
    fn float_widens_integers() {
        let t = SimpleType::new(Kind::Float);
        assert_eq!(
            t.convert_to_model(&FieldValue::from(2)).unwrap(),
            FieldValue::Float(2.0)
        );
        assert!(t.conforms(&FieldValue::from(2.5)));
        assert!(!t.conforms(&FieldValue::from("2.5")));
    }

    #[test]
    fn integer_does_not_accept_floats() {
        let t = SimpleType::new(Kind::Integer);
        assert!(t.conforms(&FieldValue::from(7)));
        assert!(!t.conforms(&FieldValue::from(7.5)));
        assert!(SimpleType::new(Kind::Duration).conforms(&FieldValue::from(3600)));
    }

    #[test]
    fn url_must_parse() {
        let t = SimpleType::new(Kind::Url);
        assert!(t.conforms(&FieldValue::from("https://example.com/issues/1")));
        let err = t
            .convert_to_model(&FieldValue::from("not a url"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadParameter);
    }

    #[test]
    fn instant_is_normalised_to_utc() {
        let t = SimpleType::new(Kind::Instant);
        let stored = t
            .convert_to_model(&FieldValue::from("2017-03-01T10:00:00+02:00"))
            .unwrap();
        assert_eq!(stored, FieldValue::from("2017-03-01T08:00:00Z"));
        assert!(!t.conforms(&FieldValue::from("yesterday")));
    }

    #[test]
    fn boolean_accepts_booleans() {
        let t = SimpleType::new(Kind::Boolean);
        assert!(t.conforms(&FieldValue::from(true)));
        assert!(!t.conforms(&FieldValue::from("true")));
    }

    #[test]
    fn composite_kinds_accept_no_values() {
        assert!(!SimpleType::new(Kind::Enum).conforms(&FieldValue::from("a")));
        assert!(!SimpleType::new(Kind::List).conforms(&FieldValue::from(vec!["a"])));
    }

    #[test]
    fn same_value_uses_stored_form() {
        let t = SimpleType::new(Kind::Float);
        assert!(t.same_value(&FieldValue::from(1), &FieldValue::from(1.0)));
        assert!(!t.same_value(&FieldValue::from(1), &FieldValue::from(1.5)));
    }
}
