//! List types: sequences of a component type.

use crate::error::{FieldsError, Result};
use crate::field_type::FieldType;
use crate::kind::Kind;
use crate::simple_type::SimpleType;
use crate::value::FieldValue;

/// A field type whose values are sequences of `component_type`.
///
/// The component may itself be simple, an enum, or another list. A list
/// carries no values or default of its own; its default is the empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub simple_type: SimpleType,
    pub component_type: Box<FieldType>,
}

impl ListType {
    pub fn new(component: impl Into<FieldType>) -> Self {
        Self {
            simple_type: SimpleType::new(Kind::List),
            component_type: Box::new(component.into()),
        }
    }

    pub fn kind(&self) -> Kind {
        self.simple_type.kind
    }

    pub fn validate(&self) -> Result<()> {
        if self.simple_type.kind != Kind::List {
            return Err(FieldsError::invalid_type(format!(
                "list type must have kind 'list', not '{}'",
                self.simple_type.kind
            )));
        }
        self.component_type.validate()
    }

    pub fn equal(&self, other: &ListType) -> bool {
        self.simple_type.equal(&other.simple_type)
            && self.component_type.equal(&other.component_type)
    }

    pub fn equal_value(&self, other: &ListType) -> bool {
        self.simple_type.equal(&other.simple_type)
            && self.component_type.equal_value(&other.component_type)
    }

    pub fn equal_enclosing(&self, other: &ListType) -> bool {
        self.simple_type.equal(&other.simple_type)
            && self.component_type.equal_enclosing(&other.component_type)
    }

    /// Every element must convert under the component type. Empty is fine.
    pub fn convert_to_model(&self, value: &FieldValue) -> Result<FieldValue> {
        let items = value
            .as_list()
            .ok_or_else(|| FieldsError::type_mismatch(Kind::List, value))?;
        items
            .iter()
            .map(|item| self.component_type.convert_to_model(item))
            .collect::<Result<Vec<_>>>()
            .map(FieldValue::List)
    }

    pub fn default_value(&self) -> FieldValue {
        FieldValue::List(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enum_type::EnumType;
    use tracker_common::ErrorKind;

    fn strings() -> ListType {
        ListType::new(SimpleType::new(Kind::String))
    }

    #[test]
    fn accepts_empty_and_homogeneous_lists() {
        let t = strings();
        assert_eq!(
            t.convert_to_model(&FieldValue::List(vec![])).unwrap(),
            FieldValue::List(vec![])
        );
        assert!(t.convert_to_model(&vec!["a", "b"].into()).is_ok());
    }

    #[test]
    fn rejects_non_lists_and_bad_elements() {
        let t = strings();
        assert!(matches!(
            t.convert_to_model(&"a".into()),
            Err(FieldsError::TypeMismatch { kind: Kind::List, .. })
        ));
        let err = t
            .convert_to_model(&FieldValue::List(vec!["a".into(), 1.into()]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadParameter);
    }

    #[test]
    fn list_of_enum_checks_membership() {
        let t = ListType::new(EnumType::new(Kind::String, ["red", "green"]));
        assert!(t.validate().is_ok());
        assert!(t.convert_to_model(&vec!["red", "red", "green"].into()).is_ok());
        assert!(matches!(
            t.convert_to_model(&vec!["blue"].into()),
            Err(FieldsError::NotAllowed { .. })
        ));
    }

    #[test]
    fn nested_lists_recurse() {
        let t = ListType::new(ListType::new(SimpleType::new(Kind::Integer)));
        assert!(t.validate().is_ok());
        let v = FieldValue::List(vec![vec![1, 2].into(), FieldValue::List(vec![])]);
        assert!(t.convert_to_model(&v).is_ok());
        let v = FieldValue::List(vec![vec!["x"].into()]);
        assert!(t.convert_to_model(&v).is_err());
    }

    #[test]
    fn validate_delegates_to_component() {
        let bad = ListType::new(EnumType::new(Kind::String, Vec::<&str>::new()));
        assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::Configuration);

        let wrong_self = ListType {
            simple_type: SimpleType::new(Kind::String),
            ..strings()
        };
        assert!(wrong_self.validate().is_err());
    }

    #[test]
    fn equality_delegates_to_component() {
        let a = ListType::new(EnumType::new(Kind::String, ["a", "b"]));
        let b = ListType::new(EnumType::new(Kind::String, ["b", "a"]));
        let c = ListType::new(EnumType::new(Kind::String, ["a", "b", "c"]));
        assert!(a.equal(&b));
        assert!(a.equal_value(&b));
        assert!(!a.equal(&c));
        assert!(c.equal_enclosing(&a));
        assert!(!a.equal_enclosing(&c));
        assert!(!a.equal(&strings()));
    }

    #[test]
    fn default_is_empty_list() {
        assert_eq!(strings().default_value(), FieldValue::List(vec![]));
    }
}
