//! Configuration types for a statistics render.
//!
//! [`RenderOptions`] carries the primitive display settings (grouping
//! property, group cutoff, chart options, planner limits) and is built with a
//! fluent builder. [`StatsConfig`] is the reduced form of the raw statistics
//! configuration object (`tiles` and `columns`).
//!
//! Both are lenient: malformed settings fall back to defaults and malformed
//! configuration entries are dropped, never rejected.

use crate::error::{Result, StatsError};
use crate::profiler::DEFAULT_SAMPLE_LIMIT;
use crate::value::format_number_plain;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Upper bound for the group cutoff.
pub const MAX_GROUPS_LIMIT: usize = 500;

/// Maximum number of configured tiles kept.
pub const MAX_TILES: usize = 50;

/// Maximum number of configured columns kept.
pub const MAX_COLUMNS: usize = 100;

/// Maximum number of explicit count-by values kept per column.
pub const MAX_COLUMN_VALUES: usize = 100;

const DEFAULT_CHART_TOP_N: usize = 6;
const DEFAULT_COLUMN_CAP: usize = 6;
const DEFAULT_PROBE_TOP_N: usize = 3;

fn clamp_usize(n: usize, min: usize, max: usize) -> usize {
    n.max(min).min(max)
}

// =============================================================================
// Render Options
// =============================================================================

/// Options for one statistics render.
///
/// Use [`RenderOptions::builder()`] or [`RenderOptions::from_settings`].
///
/// # Example
///
/// ```rust,ignore
/// use group_stats::config::RenderOptions;
///
/// let options = RenderOptions::builder()
///     .group_by("note.status")
///     .max_groups(20)
///     .chart_top_n(4)
///     .build();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Property the groups were built from, used for row labels and the caption.
    /// Default: None
    pub group_by: Option<String>,

    /// Number of rows kept after building, clamped to `[0, 500]`.
    /// Default: None (all rows)
    pub max_groups: Option<usize>,

    /// Whether per-group breakdowns skip null-like values.
    /// Default: false
    pub ignore_nulls: bool,

    /// Entries shown per breakdown, clamped to `[1, 10]`.
    /// Default: 6
    pub chart_top_n: usize,

    /// Whether the rendering layer should draw chart legends.
    /// Default: false
    pub show_chart_legends: bool,

    /// Values sampled per property during type inference.
    /// Default: 20
    pub sample_limit: usize,

    /// Column cap in automatic planning mode.
    /// Default: 6
    pub column_cap: usize,

    /// Top values probed per property in automatic planning mode.
    /// Default: 3
    pub probe_top_n: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            group_by: None,
            max_groups: None,
            ignore_nulls: false,
            chart_top_n: DEFAULT_CHART_TOP_N,
            show_chart_legends: false,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            column_cap: DEFAULT_COLUMN_CAP,
            probe_top_n: DEFAULT_PROBE_TOP_N,
        }
    }
}

impl RenderOptions {
    /// Create a new options builder.
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    /// Read options from a host settings object.
    ///
    /// Recognized keys: `groupBy` (a string, or an object with a string
    /// `property`), `limit`, `ignoreNulls`, `chartTopN` and `showChartLegends`.
    /// Anything else, including a non-object argument, is ignored.
    pub fn from_settings(settings: &Value) -> Self {
        let mut builder = Self::builder();

        if let Some(group_by) = settings.get("groupBy").and_then(group_by_setting) {
            builder = builder.group_by(group_by);
        }
        if let Some(limit) = settings.get("limit").and_then(number_setting) {
            builder = builder.max_groups(limit.max(0) as usize);
        }
        if let Some(top_n) = settings.get("chartTopN").and_then(number_setting) {
            builder = builder.chart_top_n(top_n.max(0) as usize);
        }
        if let Some(ignore) = settings.get("ignoreNulls").and_then(bool_setting) {
            builder = builder.ignore_nulls(ignore);
        }
        if let Some(legends) = settings.get("showChartLegends").and_then(bool_setting) {
            builder = builder.show_chart_legends(legends);
        }

        builder.build()
    }

    /// Truncate `len` items to the group cutoff.
    pub fn visible_groups(&self, len: usize) -> usize {
        self.max_groups.map_or(len, |max| len.min(max))
    }
}

fn group_by_setting(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("property")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// Numbers or numeric strings, floored. Empty strings and non-finite
/// values count as unset.
fn number_setting(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then(|| n.floor() as i64)
}

/// `true/1/yes/on` (case-insensitive) are true; null and `""` are unset.
fn bool_setting(value: &Value) -> Option<bool> {
    let text = match value {
        Value::Null => return None,
        Value::Bool(b) => return Some(*b),
        Value::String(s) if s.is_empty() => return None,
        Value::String(s) => s.to_lowercase(),
        other => other.to_string(),
    };
    Some(matches!(text.as_str(), "true" | "1" | "yes" | "on"))
}

/// Builder for [`RenderOptions`] with fluent API.
#[derive(Debug, Default)]
pub struct RenderOptionsBuilder {
    group_by: Option<String>,
    max_groups: Option<usize>,
    ignore_nulls: Option<bool>,
    chart_top_n: Option<usize>,
    show_chart_legends: Option<bool>,
    sample_limit: Option<usize>,
    column_cap: Option<usize>,
    probe_top_n: Option<usize>,
}

impl RenderOptionsBuilder {
    /// Set the grouping property.
    pub fn group_by(mut self, property_id: impl Into<String>) -> Self {
        self.group_by = Some(property_id.into());
        self
    }

    /// Set the group cutoff. Values above 500 are clamped.
    pub fn max_groups(mut self, max: usize) -> Self {
        self.max_groups = Some(max);
        self
    }

    pub fn ignore_nulls(mut self, ignore: bool) -> Self {
        self.ignore_nulls = Some(ignore);
        self
    }

    /// Set the breakdown size. Clamped to `[1, 10]`.
    pub fn chart_top_n(mut self, n: usize) -> Self {
        self.chart_top_n = Some(n);
        self
    }

    pub fn show_chart_legends(mut self, show: bool) -> Self {
        self.show_chart_legends = Some(show);
        self
    }

    /// Set the inference sample size (minimum 1).
    pub fn sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    /// Set the automatic-mode column cap (minimum 1).
    pub fn column_cap(mut self, cap: usize) -> Self {
        self.column_cap = Some(cap);
        self
    }

    /// Set the number of top values probed per property (minimum 1).
    pub fn probe_top_n(mut self, n: usize) -> Self {
        self.probe_top_n = Some(n);
        self
    }

    /// Build the options, clamping every bounded field.
    pub fn build(self) -> RenderOptions {
        RenderOptions {
            group_by: self.group_by.filter(|g| !g.is_empty()),
            max_groups: self.max_groups.map(|m| m.min(MAX_GROUPS_LIMIT)),
            ignore_nulls: self.ignore_nulls.unwrap_or(false),
            chart_top_n: clamp_usize(self.chart_top_n.unwrap_or(DEFAULT_CHART_TOP_N), 1, 10),
            show_chart_legends: self.show_chart_legends.unwrap_or(false),
            sample_limit: self.sample_limit.unwrap_or(DEFAULT_SAMPLE_LIMIT).max(1),
            column_cap: self.column_cap.unwrap_or(DEFAULT_COLUMN_CAP).max(1),
            probe_top_n: self.probe_top_n.unwrap_or(DEFAULT_PROBE_TOP_N).max(1),
        }
    }
}

// =============================================================================
// Statistics Configuration
// =============================================================================

/// A configured KPI tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TileSpec {
    /// Total record count across all groups.
    Count {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// Lenient total of `field` across all groups.
    Sum {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

impl TileSpec {
    /// Configured label, else the tile type.
    pub fn display_label(&self) -> &str {
        match self {
            TileSpec::Count { label } => label.as_deref().unwrap_or("count"),
            TileSpec::Sum { label, .. } => label.as_deref().unwrap_or("sum"),
        }
    }
}

/// A configured table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ColumnSpec {
    Sum {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
    /// One column per value, plus an optional others bucket.
    ///
    /// Explicit `values` win over `top_n`.
    #[serde(rename_all = "camelCase")]
    CountBy {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        others_bucket: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        values: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        top_n: Option<usize>,
    },
}

impl ColumnSpec {
    pub fn field(&self) -> &str {
        match self {
            ColumnSpec::Sum { field, .. } | ColumnSpec::CountBy { field, .. } => field,
        }
    }
}

/// Reduced statistics configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub tiles: Vec<TileSpec>,
    pub columns: Vec<ColumnSpec>,
}

impl StatsConfig {
    /// Reduce a raw configuration object.
    ///
    /// Arrays are truncated to 50 tiles and 100 columns. Entries that are not
    /// objects, have an unrecognized `type` or miss a required `field` are
    /// dropped. A non-object argument yields the empty configuration.
    pub fn parse(raw: &Value) -> Self {
        let tiles: Vec<TileSpec> = config_entries(raw, "tiles", MAX_TILES)
            .into_iter()
            .filter_map(|entry| {
                let tile = parse_tile(entry);
                if tile.is_none() {
                    debug!("Dropping malformed tile entry: {}", entry);
                }
                tile
            })
            .collect();

        let columns: Vec<ColumnSpec> = config_entries(raw, "columns", MAX_COLUMNS)
            .into_iter()
            .filter_map(|entry| {
                let column = parse_column(entry);
                if column.is_none() {
                    debug!("Dropping malformed column entry: {}", entry);
                }
                column
            })
            .collect();

        Self { tiles, columns }
    }

    /// Reduce the `stats` key of a host settings object.
    pub fn from_settings(settings: &Value) -> Self {
        settings.get("stats").map(Self::parse).unwrap_or_default()
    }

    /// Parse and reduce a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json)?;
        if !raw.is_object() {
            return Err(StatsError::InvalidConfig(
                "statistics configuration must be a JSON object".to_string(),
            ));
        }
        Ok(Self::parse(&raw))
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.columns.is_empty()
    }
}

fn config_entries<'a>(raw: &'a Value, key: &str, cap: usize) -> Vec<&'a Value> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().take(cap).collect())
        .unwrap_or_default()
}

/// Stringify a scalar the way it would be displayed; `None` for null.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map_or_else(|| n.to_string(), format_number_plain)),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn entry_type(entry: &Value) -> String {
    entry
        .get("type")
        .and_then(scalar_string)
        .unwrap_or_default()
        .to_lowercase()
}

fn entry_string(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(scalar_string)
}

fn entry_field(entry: &Value) -> Option<String> {
    entry_string(entry, "field").filter(|f| !f.is_empty())
}

fn parse_tile(entry: &Value) -> Option<TileSpec> {
    if !entry.is_object() {
        return None;
    }
    let label = entry_string(entry, "label");
    match entry_type(entry).as_str() {
        "count" => Some(TileSpec::Count { label }),
        "sum" => Some(TileSpec::Sum {
            field: entry_field(entry)?,
            label,
        }),
        _ => None,
    }
}

fn parse_column(entry: &Value) -> Option<ColumnSpec> {
    if !entry.is_object() {
        return None;
    }
    let label = entry_string(entry, "label");
    match entry_type(entry).as_str() {
        "sum" => Some(ColumnSpec::Sum {
            field: entry_field(entry)?,
            label,
        }),
        "countby" => {
            let field = entry_field(entry)?;
            let others_bucket = entry_string(entry, "othersBucket").filter(|b| !b.is_empty());
            let values: Vec<String> = entry
                .get("values")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(scalar_string)
                        .take(MAX_COLUMN_VALUES)
                        .collect()
                })
                .unwrap_or_default();
            let top_n = if values.is_empty() {
                entry
                    .get("topN")
                    .and_then(Value::as_f64)
                    .map(|n| clamp_usize(n.floor().max(0.0) as usize, 1, 20))
            } else {
                None
            };
            Some(ColumnSpec::CountBy {
                field,
                label,
                others_bucket,
                values,
                top_n,
            })
        }
        _ => None,
    }
}
