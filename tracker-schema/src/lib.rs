//! Work item type schemas
//!
//! A work item type (WIT) declares named fields, each typed with a
//! [`tracker_fields::FieldDefinition`], and may extend a base WIT to inherit its
//! fields. This crate owns:
//!
//! - the persisted model ([`WorkItemType`], [`Category`]) and their ids,
//! - the storage seam ([`WorkItemTypeStore`]) with an in-memory and a YAML
//!   directory implementation,
//! - the [`SchemaEngine`], which creates and evolves WITs, flattens inheritance
//!   chains into resolved schemas, and validates submitted field values,
//! - the [`SchemaCache`] of resolved schemas shared by engine clones,
//! - [`SchemaConfig`], loaded with figment from defaults, a file and `TRACKER_*`
//!   environment variables.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tracker_fields::{FieldDefinition, Kind};
//! use tracker_schema::{MemoryStore, NewWorkItemType, SchemaConfig, SchemaEngine};
//!
//! # async fn example() -> tracker_schema::Result<()> {
//! let engine = SchemaEngine::new(Arc::new(MemoryStore::new()), SchemaConfig::default());
//! let base = engine
//!     .create(NewWorkItemType::new("base").field("foo", FieldDefinition::required(Kind::Float)))
//!     .await?;
//! let derived = engine
//!     .create(NewWorkItemType::new("derived").extends(base.work_item_type.id))
//!     .await?;
//! assert!(derived.schema.contains_key("foo"));
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod store;
pub mod types;

pub use cache::SchemaCache;
pub use config::{ConfigError, SchemaConfig};
pub use engine::SchemaEngine;
pub use error::{Result, SchemaError};
pub use store::{MemoryStore, SkippedFile, WorkItemTypeStore, YamlStore, YamlStoreBuilder};
pub use types::{
    payload_from_json, Category, CategoryId, FieldValues, NewWorkItemType, Payload,
    ResolvedWorkItemType, Schema, WorkItemType, WorkItemTypeId,
};
