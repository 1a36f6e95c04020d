//! Persisted model: work item types, categories and their ids

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracker_fields::{FieldDefinition, FieldValue, FieldsError};
use ulid::Ulid;

/// Flattened field definitions of a work item type, including inherited ones.
///
/// Inherited fields come first in ancestor order; a field redefined lower in
/// the chain keeps its original position with the overriding definition.
pub type Schema = IndexMap<String, FieldDefinition>;

/// Field values as submitted by a caller; `None` marks an explicit null.
pub type Payload = IndexMap<String, Option<FieldValue>>;

/// Field values in stored form, as returned by validation.
pub type FieldValues = IndexMap<String, FieldValue>;

/// Unique identifier for a work item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkItemTypeId(Ulid);

impl WorkItemTypeId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for WorkItemTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkItemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkItemTypeId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// Unique identifier for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Ulid);

impl CategoryId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// A work item type as stored: its own fields plus an optional base link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemType {
    pub id: WorkItemTypeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type_id: Option<WorkItemTypeId>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
}

/// A work item type together with its flattened schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedWorkItemType {
    #[serde(flatten)]
    pub work_item_type: WorkItemType,
    pub schema: Schema,
}

/// Request to create a work item type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewWorkItemType {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub base_type_id: Option<WorkItemTypeId>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDefinition>,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

impl NewWorkItemType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Inherit all fields of `base`.
    pub fn extends(mut self, base: WorkItemTypeId) -> Self {
        self.base_type_id = Some(base);
        self
    }

    pub fn field(mut self, name: impl Into<String>, definition: FieldDefinition) -> Self {
        self.fields.insert(name.into(), definition);
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.categories.push(category);
        self
    }
}

/// A named grouping of work item types (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Stable id of the built-in requirements category.
const PLANNER_REQUIREMENTS_ID: u128 = 0x0000_0000_0000_0000_0000_0000_0000_0001;
/// Stable id of the built-in issues category.
const PLANNER_ISSUES_ID: u128 = 0x0000_0000_0000_0000_0000_0000_0000_0002;

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The built-in planner categories, seeded into fresh stores.
    pub fn planner_defaults() -> Vec<Category> {
        vec![
            Category {
                id: CategoryId::from_ulid(Ulid(PLANNER_REQUIREMENTS_ID)),
                name: "planner.requirements".to_string(),
                description: Some("Work item types that capture requirements".to_string()),
            },
            Category {
                id: CategoryId::from_ulid(Ulid(PLANNER_ISSUES_ID)),
                name: "planner.issues".to_string(),
                description: Some("Work item types that capture issues".to_string()),
            },
        ]
    }
}

/// Convert a JSON object into a [`Payload`].
///
/// Nulls become explicit absences; objects are rejected for the field they
/// appear in.
pub fn payload_from_json(object: &serde_json::Map<String, Value>) -> Result<Payload, FieldsError> {
    object
        .iter()
        .map(|(name, value)| {
            FieldValue::from_json(value)
                .map(|value| (name.clone(), value))
                .map_err(|e| e.for_field(name.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_fields::Kind;

    #[test]
    fn test_id_roundtrip() {
        let id = WorkItemTypeId::new();
        let parsed: WorkItemTypeId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-ulid".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = CategoryId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, json!(id.to_string()));
    }

    #[test]
    fn test_work_item_type_yaml() {
        let yaml = r#"
id: 01ARZ3NDEKTSV4RRFFQ69G5FAV
name: bug
fields:
  severity:
    type:
      kind: enum
      base_type:
        kind: string
      values: [low, high]
    required: true
  title:
    type:
      kind: string
"#;
        let wit: WorkItemType = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(wit.name, "bug");
        assert!(wit.base_type_id.is_none());
        let names: Vec<_> = wit.fields.keys().cloned().collect();
        assert_eq!(names, vec!["severity", "title"]);
        assert_eq!(wit.fields["severity"].kind(), Kind::Enum);
        assert!(!wit.fields["title"].required);

        let back: WorkItemType =
            serde_yaml_ng::from_str(&serde_yaml_ng::to_string(&wit).unwrap()).unwrap();
        assert_eq!(back, wit);
    }

    #[test]
    fn test_planner_defaults_are_stable() {
        let a = Category::planner_defaults();
        let b = Category::planner_defaults();
        assert_eq!(a, b);
        assert_eq!(a[0].name, "planner.requirements");
        assert_eq!(a[1].name, "planner.issues");
        assert_ne!(a[0].id, a[1].id);
    }

    #[test]
    fn test_payload_from_json() {
        let object = json!({"title": "x", "points": 3, "gone": null});
        let payload = payload_from_json(object.as_object().unwrap()).unwrap();
        assert_eq!(payload["title"], Some(FieldValue::from("x")));
        assert_eq!(payload["points"], Some(FieldValue::Integer(3)));
        assert_eq!(payload["gone"], None);
    }

    #[test]
    fn test_payload_rejects_objects() {
        let object = json!({"meta": {"a": 1}});
        let err = payload_from_json(object.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, FieldsError::InvalidValue { ref field, .. } if field == "meta"));
    }
}
