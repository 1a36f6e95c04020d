//! The closed set of field kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FieldsError;

/// Primitive or composite tag identifying a field's basic type.
///
/// Serialized as its lowercase name (`"string"`, `"workitem"`, ...). Parsing
/// an unknown name fails, so a kind outside this set can never reach a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    String,
    Integer,
    Float,
    Boolean,
    /// Elapsed time, stored as an integer.
    Duration,
    Url,
    /// Point in time, RFC 3339.
    Instant,
    Markup,
    User,
    Iteration,
    Area,
    Codebase,
    Label,
    /// Reference to another work item.
    #[serde(rename = "workitem")]
    WorkItem,
    Enum,
    List,
}

/// How a kind's values are represented at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Representation {
    Text,
    Url,
    Instant,
    Integer,
    Float,
    Boolean,
    Composite,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 16] = [
        Kind::String,
        Kind::Integer,
        Kind::Float,
        Kind::Boolean,
        Kind::Duration,
        Kind::Url,
        Kind::Instant,
        Kind::Markup,
        Kind::User,
        Kind::Iteration,
        Kind::Area,
        Kind::Codebase,
        Kind::Label,
        Kind::WorkItem,
        Kind::Enum,
        Kind::List,
    ];

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::Duration => "duration",
            Kind::Url => "url",
            Kind::Instant => "instant",
            Kind::Markup => "markup",
            Kind::User => "user",
            Kind::Iteration => "iteration",
            Kind::Area => "area",
            Kind::Codebase => "codebase",
            Kind::Label => "label",
            Kind::WorkItem => "workitem",
            Kind::Enum => "enum",
            Kind::List => "list",
        }
    }

    /// `enum` and `list` carry other types and have no scalar representation.
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Enum | Kind::List)
    }

    pub(crate) fn representation(&self) -> Representation {
        match self {
            Kind::String
            | Kind::Markup
            | Kind::User
            | Kind::Iteration
            | Kind::Area
            | Kind::Codebase
            | Kind::Label
            | Kind::WorkItem => Representation::Text,
            Kind::Url => Representation::Url,
            Kind::Instant => Representation::Instant,
            Kind::Integer | Kind::Duration => Representation::Integer,
            Kind::Float => Representation::Float,
            Kind::Boolean => Representation::Boolean,
            Kind::Enum | Kind::List => Representation::Composite,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = FieldsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| FieldsError::UnknownKind { name: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_common::ErrorKind;

    #[test]
    fn parse_every_kind_by_name() {
        for kind in Kind::ALL {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn unknown_kind_is_configuration_error() {
        let err = "decimal".parse::<Kind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "unknown field kind: decimal");
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Kind::WorkItem).unwrap(), "\"workitem\"");
        let kind: Kind = serde_json::from_str("\"duration\"").unwrap();
        assert_eq!(kind, Kind::Duration);
        assert!(serde_json::from_str::<Kind>("\"nope\"").is_err());
    }

    #[test]
    fn only_enum_and_list_are_composite() {
        let composite: Vec<_> = Kind::ALL.iter().filter(|k| k.is_composite()).collect();
        assert_eq!(composite, vec![&Kind::Enum, &Kind::List]);
    }
}
