//! Command implementations. Each writes its report to `out` so it can be
//! captured in tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::debug;
use tracker_schema::{
    payload_from_json, Category, SchemaConfig, SchemaEngine, WorkItemTypeId, YamlStore,
};

/// Store directory used when neither `--root` nor the configuration names one.
pub const DEFAULT_ROOT: &str = ".tracker";

/// Load configuration and open the engine over the YAML store.
pub async fn open_engine(config_file: Option<&Path>, root: Option<PathBuf>) -> Result<SchemaEngine> {
    let mut config = SchemaConfig::load(config_file).context("loading configuration")?;
    if root.is_some() {
        config.store_root = root;
    }
    let root = config
        .store_root
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    debug!(root = %root.display(), "opening schema store");
    let store = YamlStore::open(&root)
        .with_defaults(Category::planner_defaults())
        .build()
        .await
        .with_context(|| format!("opening schema store at {}", root.display()))?;
    Ok(SchemaEngine::new(Arc::new(store), config))
}

fn parse_id(id: &str) -> Result<WorkItemTypeId> {
    id.parse()
        .with_context(|| format!("'{id}' is not a valid work item type id"))
}

pub async fn run_list(engine: &SchemaEngine, out: &mut impl Write) -> Result<()> {
    let types = engine.list().await?;
    if types.is_empty() {
        writeln!(out, "No work item types.")?;
        return Ok(());
    }
    for work_item_type in types {
        match work_item_type.base_type_id {
            Some(base) => writeln!(
                out,
                "{}  {}  (extends {base})",
                work_item_type.id, work_item_type.name
            )?,
            None => writeln!(out, "{}  {}", work_item_type.id, work_item_type.name)?,
        }
    }
    Ok(())
}

pub async fn run_show(engine: &SchemaEngine, id: &str, out: &mut impl Write) -> Result<()> {
    let resolved = engine.resolve(&parse_id(id)?).await?;
    write!(out, "{}", serde_yaml_ng::to_string(&resolved)?)?;
    Ok(())
}

/// Validate the payload file; prints the stored values as JSON.
pub async fn run_validate(
    engine: &SchemaEngine,
    id: &str,
    payload: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let id = parse_id(id)?;
    let content = std::fs::read_to_string(payload)
        .with_context(|| format!("reading {}", payload.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("parsing {}", payload.display()))?;
    let Some(object) = json.as_object() else {
        bail!("{} must contain a JSON object", payload.display());
    };

    let values = engine.validate_fields(&id, &payload_from_json(object)?).await?;
    let stored: serde_json::Map<String, serde_json::Value> = values
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    writeln!(out, "{}", serde_json::to_string_pretty(&stored)?)?;
    Ok(())
}

/// Report definition files the store could not load, then resolve every work
/// item type and validate each field type in its schema. Returns whether
/// everything checked out.
pub async fn run_check(engine: &SchemaEngine, out: &mut impl Write) -> Result<bool> {
    let mut healthy = true;
    for skipped in engine.skipped_files() {
        healthy = false;
        writeln!(
            out,
            "error  {}: [configuration] {}",
            skipped.path.display(),
            skipped.error
        )?;
    }
    for work_item_type in engine.list().await? {
        let schema = match engine.resolve_schema(&work_item_type.id).await {
            Ok(schema) => schema,
            Err(e) => {
                healthy = false;
                writeln!(
                    out,
                    "error  {}  {}: [{}] {e}",
                    work_item_type.id,
                    work_item_type.name,
                    e.kind()
                )?;
                continue;
            }
        };
        let broken: Vec<String> = schema
            .iter()
            .filter_map(|(name, definition)| {
                definition
                    .field_type
                    .validate()
                    .err()
                    .map(|e| format!("{name}: {e}"))
            })
            .collect();
        if broken.is_empty() {
            writeln!(
                out,
                "ok     {}  {} ({} fields)",
                work_item_type.id,
                work_item_type.name,
                schema.len()
            )?;
        } else {
            healthy = false;
            writeln!(
                out,
                "error  {}  {}: [configuration] {}",
                work_item_type.id,
                work_item_type.name,
                broken.join("; ")
            )?;
        }
    }
    Ok(healthy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracker_fields::{EnumType, FieldDefinition, Kind};
    use tracker_schema::NewWorkItemType;

    async fn engine(tmp: &TempDir) -> SchemaEngine {
        open_engine(None, Some(tmp.path().to_path_buf())).await.unwrap()
    }

    #[tokio::test]
    async fn list_empty_store() {
        let tmp = TempDir::new().unwrap();
        let mut out = Vec::new();
        run_list(&engine(&tmp).await, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No work item types.\n");
    }

    #[tokio::test]
    async fn show_prints_resolved_schema() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp).await;
        let base = engine
            .create(NewWorkItemType::new("base").field("title", FieldDefinition::required(Kind::String)))
            .await
            .unwrap();
        let bug = engine
            .create(NewWorkItemType::new("bug").extends(base.work_item_type.id))
            .await
            .unwrap();

        let mut out = Vec::new();
        run_show(&engine, &bug.work_item_type.id.to_string(), &mut out)
            .await
            .unwrap();
        let yaml = String::from_utf8(out).unwrap();
        assert!(yaml.contains("name: bug"));
        assert!(yaml.contains("schema:"));
        assert!(yaml.contains("title:"));

        let mut out = Vec::new();
        run_list(&engine, &mut out).await.unwrap();
        let listing = String::from_utf8(out).unwrap();
        assert!(listing.contains(&format!("(extends {})", base.work_item_type.id)));
    }

    #[tokio::test]
    async fn show_rejects_bad_id() {
        let tmp = TempDir::new().unwrap();
        let mut out = Vec::new();
        let err = run_show(&engine(&tmp).await, "nope", &mut out).await.unwrap_err();
        assert!(err.to_string().contains("not a valid work item type id"));
    }

    #[tokio::test]
    async fn validate_payload_file() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp).await;
        let state = EnumType::new(Kind::String, ["open", "closed"]);
        let bug = engine
            .create(
                NewWorkItemType::new("bug")
                    .field("state", FieldDefinition::required(state))
                    .field("estimate", FieldDefinition::optional(Kind::Float)),
            )
            .await
            .unwrap();
        let id = bug.work_item_type.id.to_string();

        let good = tmp.path().join("good.json");
        std::fs::write(&good, r#"{"state": "open", "estimate": 2}"#).unwrap();
        let mut out = Vec::new();
        run_validate(&engine, &id, &good, &mut out).await.unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(stored, serde_json::json!({"state": "open", "estimate": 2.0}));

        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, r#"{"state": "reopened"}"#).unwrap();
        let mut out = Vec::new();
        let err = run_validate(&engine, &id, &bad, &mut out).await.unwrap_err();
        assert!(err.to_string().contains("state"));

        let not_object = tmp.path().join("list.json");
        std::fs::write(&not_object, "[1, 2]").unwrap();
        let mut out = Vec::new();
        assert!(run_validate(&engine, &id, &not_object, &mut out).await.is_err());
    }

    #[tokio::test]
    async fn check_reports_every_type() {
        let tmp = TempDir::new().unwrap();
        let engine = engine(&tmp).await;
        engine.create(NewWorkItemType::new("task")).await.unwrap();
        engine.create(NewWorkItemType::new("bug")).await.unwrap();

        let mut out = Vec::new();
        assert!(run_check(&engine, &mut out).await.unwrap());
        let report = String::from_utf8(out).unwrap();
        assert_eq!(report.lines().count(), 2);
        assert!(report.lines().all(|line| line.starts_with("ok")));
    }

    #[tokio::test]
    async fn check_flags_dangling_base_type() {
        let tmp = TempDir::new().unwrap();
        engine(&tmp).await;
        let orphan = WorkItemTypeId::new();
        std::fs::write(
            tmp.path().join("types").join(format!("{orphan}.yaml")),
            format!("id: {orphan}\nname: orphan\nbase_type_id: {}\n", WorkItemTypeId::new()),
        )
        .unwrap();

        let engine = engine(&tmp).await;
        let mut out = Vec::new();
        assert!(!run_check(&engine, &mut out).await.unwrap());
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("error"));
        assert!(report.contains("[not_found]"));
    }

    #[tokio::test]
    async fn check_flags_malformed_field_type() {
        let tmp = TempDir::new().unwrap();
        engine(&tmp).await;
        let id = WorkItemTypeId::new();
        std::fs::write(
            tmp.path().join("types").join(format!("{id}.yaml")),
            format!(
                "id: {id}\nname: broken\nfields:\n  state:\n    type:\n      kind: enum\n      base_type:\n        kind: string\n      values: []\n"
            ),
        )
        .unwrap();

        let engine = engine(&tmp).await;
        let mut out = Vec::new();
        assert!(!run_check(&engine, &mut out).await.unwrap());
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("[configuration] state:"));
    }

    #[tokio::test]
    async fn check_flags_unparseable_type_files() {
        let tmp = TempDir::new().unwrap();
        engine(&tmp).await;
        let id = WorkItemTypeId::new();
        std::fs::write(
            tmp.path().join("types").join(format!("{id}.yaml")),
            format!("id: {id}\nname: money\nfields:\n  amount:\n    type:\n      kind: decimal\n"),
        )
        .unwrap();

        let engine = engine(&tmp).await;
        let mut out = Vec::new();
        assert!(!run_check(&engine, &mut out).await.unwrap());
        let report = String::from_utf8(out).unwrap();
        assert!(report.starts_with("error"));
        assert!(report.contains(&format!("{id}.yaml: [configuration]")));
        assert!(report.contains("decimal"));
    }
}
