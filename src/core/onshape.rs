//! Import of BOM files
//!
//! Understands Onshape assembly BOM exports (a `headers` table plus `rows`
//! keyed by header id) as well as plain part lists in JSON or YAML.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::entities::part::{Part, Quantity, Stage, StageKind, UNKNOWN_LABEL};
use crate::yaml::{parse_yaml, YamlError};

/// Errors that can occur while importing a BOM file
#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid BOM JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Yaml(#[from] YamlError),

    #[error("BOM export has no '{0}' column")]
    #[diagnostic(
        code(rbt::import::missing_column),
        help("add the column to the assembly's BOM table in Onshape and export again")
    )]
    MissingColumn(&'static str),
}

#[derive(Debug, Deserialize)]
struct BomExport {
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Header {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default, rename = "headerIdToValue")]
    values: Map<String, Value>,
    #[serde(default, rename = "itemSource")]
    item_source: Option<ItemSource>,
}

#[derive(Debug, Deserialize)]
struct ItemSource {
    #[serde(default, rename = "partId")]
    part_id: Option<String>,
}

/// Column ids resolved from the export's header table
struct Columns<'a> {
    name: &'a str,
    description: Option<&'a str>,
    quantity: Option<&'a str>,
    material: Option<&'a str>,
    material_bom: Option<&'a str>,
    stages: [Option<&'a str>; 3],
}

impl<'a> Columns<'a> {
    fn resolve(headers: &'a [Header]) -> Result<Self, ImportError> {
        let find = |name: &str| {
            headers
                .iter()
                .find(|h| h.name.as_deref() == Some(name))
                .and_then(|h| h.id.as_deref())
        };
        let material = find("Material");
        Ok(Self {
            name: find("Name").ok_or(ImportError::MissingColumn("Name"))?,
            description: find("Description"),
            quantity: find("Quantity").or_else(|| find("QTY")),
            material,
            material_bom: find("Bom Material").or(material),
            stages: [find("Pre Process"), find("Process 1"), find("Process 2")],
        })
    }
}

/// Render a cell as text; objects contribute their `displayName`
fn cell_text(values: &Map<String, Value>, column: Option<&str>) -> Option<String> {
    let value = values.get(column?)?;
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => obj
            .get("displayName")
            .or_else(|| obj.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::Array(_) => None,
    }
}

fn cell_quantity(values: &Map<String, Value>, column: Option<&str>) -> Quantity {
    match column.and_then(|c| values.get(c)) {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => Quantity::Count(i),
            None => Quantity::Text(n.to_string()),
        },
        Some(Value::String(s)) => Quantity::Text(s.clone()),
        _ => Quantity::Text("N/A".to_string()),
    }
}

/// Metadata cells use the "Unknown" placeholder for blanks; drop it
fn known(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.trim().is_empty() && s != UNKNOWN_LABEL)
}

/// Parse an Onshape assembly BOM export
pub fn parse_onshape_bom(json: &str) -> Result<Vec<Part>, ImportError> {
    let export: BomExport = serde_json::from_str(json)?;
    let columns = Columns::resolve(&export.headers)?;

    let parts = export
        .rows
        .iter()
        .map(|row| {
            let values = &row.values;
            let mut part = Part::new(
                cell_text(values, Some(columns.name)).unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                cell_quantity(values, columns.quantity),
            );
            for (kind, column) in StageKind::ALL.into_iter().zip(columns.stages) {
                *part.stage_mut(kind) = Stage::from_label(cell_text(values, column).as_deref());
            }
            part.description = known(cell_text(values, columns.description));
            part.material = known(cell_text(values, columns.material));
            part.material_bom = known(cell_text(values, columns.material_bom));
            part.part_id = row
                .item_source
                .as_ref()
                .and_then(|s| s.part_id.clone())
                .filter(|id| !id.is_empty());
            part
        })
        .collect::<Vec<_>>();

    warn_duplicates(&parts);
    Ok(parts)
}

/// Parse a plain list of parts in JSON
pub fn parse_part_list(json: &str) -> Result<Vec<Part>, ImportError> {
    let parts: Vec<Part> = serde_json::from_str(json)?;
    warn_duplicates(&parts);
    Ok(parts)
}

/// Import a BOM file, picking the parser from its extension and shape
pub fn import_file(path: &Path) -> Result<Vec<Part>, ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        let parts: Vec<Part> = parse_yaml(&content, &path.display().to_string())?;
        warn_duplicates(&parts);
        return Ok(parts);
    }

    if content.trim_start().starts_with('[') {
        parse_part_list(&content)
    } else {
        parse_onshape_bom(&content)
    }
}

fn warn_duplicates(parts: &[Part]) {
    let mut seen = HashSet::new();
    for part in parts {
        if !seen.insert(part.name.as_str()) {
            tracing::warn!(part = %part.name, "duplicate part name; edits will only reach the first one");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EXPORT: &str = r#"{
        "headers": [
            {"id": "h1", "name": "Name"},
            {"id": "h2", "name": "Quantity"},
            {"id": "h3", "name": "Material"},
            {"id": "h4", "name": "Pre Process"},
            {"id": "h5", "name": "Process 1"},
            {"id": "h6", "name": "Process 2"},
            {"id": "h7", "name": "Description"}
        ],
        "rows": [
            {
                "headerIdToValue": {
                    "h1": "Bracket",
                    "h2": 10,
                    "h3": {"displayName": "Aluminum 6061"},
                    "h4": "Laser",
                    "h5": "Unknown",
                    "h7": "Side plate bracket"
                },
                "itemSource": {"partId": "JHD"}
            },
            {
                "headerIdToValue": {"h1": "Bolt", "h2": "4"},
                "itemSource": {}
            }
        ]
    }"#;

    #[test]
    fn test_parse_onshape_export() {
        let parts = parse_onshape_bom(EXPORT).unwrap();
        assert_eq!(parts.len(), 2);

        let bracket = &parts[0];
        assert_eq!(bracket.name, "Bracket");
        assert_eq!(bracket.quantity, Quantity::Count(10));
        assert_eq!(bracket.pre_process, Stage::from("Laser"));
        assert!(bracket.process1.is_undefined());
        assert!(bracket.process2.is_undefined());
        assert_eq!(bracket.material.as_deref(), Some("Aluminum 6061"));
        // No "Bom Material" column: falls back to Material
        assert_eq!(bracket.material_bom.as_deref(), Some("Aluminum 6061"));
        assert_eq!(bracket.description.as_deref(), Some("Side plate bracket"));
        assert_eq!(bracket.part_id.as_deref(), Some("JHD"));

        let bolt = &parts[1];
        assert_eq!(bolt.quantity.units(), Some(4));
        assert_eq!(bolt.part_id, None);
        assert!(bolt.defined_stages().next().is_none());
    }

    #[test]
    fn test_qty_header_alias() {
        let json = r#"{
            "headers": [{"id": "a", "name": "Name"}, {"id": "b", "name": "QTY"}],
            "rows": [{"headerIdToValue": {"a": "Nut", "b": 8}}]
        }"#;
        let parts = parse_onshape_bom(json).unwrap();
        assert_eq!(parts[0].quantity, Quantity::Count(8));
    }

    #[test]
    fn test_missing_quantity_column_is_not_applicable() {
        let json = r#"{
            "headers": [{"id": "a", "name": "Name"}],
            "rows": [{"headerIdToValue": {"a": "Nut"}}]
        }"#;
        let parts = parse_onshape_bom(json).unwrap();
        assert!(!parts[0].quantity.is_valid());
    }

    #[test]
    fn test_missing_name_column() {
        let json = r#"{"headers": [{"id": "b", "name": "QTY"}], "rows": []}"#;
        assert!(matches!(
            parse_onshape_bom(json),
            Err(ImportError::MissingColumn("Name"))
        ));
    }

    #[test]
    fn test_import_file_detects_formats() {
        let tmp = TempDir::new().unwrap();

        let export = tmp.path().join("export.json");
        fs::write(&export, EXPORT).unwrap();
        assert_eq!(import_file(&export).unwrap().len(), 2);

        let list = tmp.path().join("parts.json");
        fs::write(&list, r#"[{"name": "Gear", "quantity": 2, "process1": "CNC"}]"#).unwrap();
        let parts = import_file(&list).unwrap();
        assert_eq!(parts[0].process1, Stage::from("CNC"));

        let yaml = tmp.path().join("parts.yaml");
        fs::write(
            &yaml,
            "- name: Hub\n  quantity: 3\n  process1: Lathe\n  process1_qty: 1\n",
        )
        .unwrap();
        let parts = import_file(&yaml).unwrap();
        assert_eq!(parts[0].name, "Hub");
        assert_eq!(parts[0].process1_qty, 1);
    }

    #[test]
    fn test_import_missing_file() {
        let result = import_file(Path::new("/nonexistent/bom.json"));
        assert!(matches!(result, Err(ImportError::Read { .. })));
    }
}
