//! Render input documents.

use crate::error::{Result, ResultExt, StatsError};
use crate::pipeline::{StatsPipeline, StatsReport};
use crate::record::{Group, MapRecord};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// A complete render request:
/// `{"properties": [...], "groups": [...], "settings": {...}}`.
///
/// Every key is optional. Groups accept `records` or `entries` for their
/// record list; see [`MapRecord`] for the record shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderInput {
    pub properties: Vec<String>,
    pub groups: Vec<Group<MapRecord>>,
    pub settings: Value,
}

impl RenderInput {
    /// Parse a render input document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)?;
        if !raw.is_object() {
            return Err(StatsError::InvalidInput(
                "render input must be a JSON object".to_string(),
            ));
        }
        let input: Self = serde_json::from_value(raw)?;
        debug!(
            "Parsed render input: {} properties, {} groups",
            input.properties.len(),
            input.groups.len()
        );
        Ok(input)
    }

    /// Read and parse a render input file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        Self::from_json_str(&text).context(format!("Failed to parse {}", path.display()))
    }

    /// Display properties; when none are listed, every property key in
    /// first-seen record order.
    pub fn display_properties(&self) -> Vec<String> {
        if !self.properties.is_empty() {
            return self.properties.clone();
        }
        let mut seen: Vec<String> = Vec::new();
        for record in self.groups.iter().flat_map(|g| g.records.iter()) {
            for (key, _) in record.values().iter() {
                if !seen.iter().any(|k| k == key) {
                    seen.push(key.to_string());
                }
            }
        }
        if !seen.is_empty() {
            warn!("No properties listed; using {} record keys", seen.len());
        }
        seen
    }

    pub fn pipeline(&self) -> StatsPipeline {
        StatsPipeline::from_settings(&self.settings)
    }

    /// Render with the document's own settings.
    pub fn render(&self) -> StatsReport<'_, MapRecord> {
        self.pipeline()
            .render(&self.display_properties(), &self.groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;
    use pretty_assertions::assert_eq;

    const INPUT: &str = r#"{
        "properties": ["note.amount", "status"],
        "groups": [
            {
                "value": "open",
                "records": [
                    {"values": {"note.amount": "1,200", "status": "open"}},
                    {"values": {"status": "open"}, "frontmatter": {"Amount": 300}}
                ]
            },
            {
                "entries": [{"values": {"note.amount": 5, "status": "closed"}}]
            }
        ],
        "settings": {"groupBy": "status", "stats": {"tiles": [{"type": "count"}]}}
    }"#;

    #[test]
    fn test_parse_and_render() {
        let input = RenderInput::from_json_str(INPUT).unwrap();
        assert_eq!(input.groups.len(), 2);
        assert_eq!(input.groups[1].records.len(), 1);

        let report = input.render();
        assert_eq!(report.caption, "Groups: 2 • Grouped by: Status");
        assert_eq!(report.columns[0].header, "Sum(Amount)");
        assert_eq!(report.rows[0].values[0], CellValue::Number(1500.0));
        assert_eq!(report.rows[1].label, "closed");
        assert_eq!(report.tiles[0].value, CellValue::Count(3));
    }

    #[test]
    fn test_display_properties_fallback() {
        let input = RenderInput::from_json_str(
            r#"{"groups": [{"records": [{"values": {"b": 1, "a": 2}}, {"values": {"a": 3, "c": "x"}}]}]}"#,
        )
        .unwrap();
        assert_eq!(input.display_properties(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rejects_non_object() {
        let err = RenderInput::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        let err = RenderInput::from_json_str(r#"{"groups": 3}"#).unwrap_err();
        assert_eq!(err.error_code(), "JSON_ERROR");
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = RenderInput::from_path("/no/such/render-input.json").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("render-input.json"));
    }
}
