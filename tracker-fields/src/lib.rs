//! Dynamic field type system for work item types
//!
//! `tracker-fields` is the schema-only core of the tracker: it knows what a
//! field *type* is, how to compare two of them, and how to check a submitted
//! value against one. It knows nothing about storage or inheritance; the
//! `tracker-schema` crate builds work item types on top of it.
//!
//! # Architecture
//!
//! - **Closed kind set**: [`Kind`] is a fixed enumeration of primitive and
//!   composite tags. Unknown kind names are rejected when parsed.
//! - **Tagged composition**: [`FieldType`] is `Simple | Enum | List`; every
//!   operation dispatches by pattern match, lists recurse into their component.
//! - **Value semantics**: mutators such as [`EnumType::set_default_value`]
//!   return a new value and never touch the receiver.
//! - **Typed values**: [`FieldValue`] is a closed sum over booleans, integers,
//!   floats, strings and lists; conformance to a kind is a tag match.
//!
//! # Comparisons
//!
//! Two relations are defined on field types:
//!
//! - `equal` / `equal_value`: structural identity. Enums marked rewritable
//!   ignore their value set when they are the receiver.
//! - `equal_enclosing`: "does the new definition accept everything the old one
//!   accepted". Widening an enum is enclosing, narrowing is not.

pub mod definition;
pub mod enum_type;
pub mod error;
pub mod field_type;
pub mod kind;
pub mod list_type;
pub mod simple_type;
pub mod value;

pub use definition::FieldDefinition;
pub use enum_type::EnumType;
pub use error::{FieldsError, Result};
pub use field_type::FieldType;
pub use kind::Kind;
pub use list_type::ListType;
pub use simple_type::SimpleType;
pub use value::FieldValue;
