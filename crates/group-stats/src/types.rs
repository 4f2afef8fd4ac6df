use crate::resolver::base_pid;
use crate::utils::pretty_prop;
use crate::value::format_number_plain;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Reserved count-by value selecting the missing-rate aggregate.
pub const MISSING_SENTINEL: &str = "__MISSING__";

/// Header and bucket label used for automatic "others" columns.
pub const OTHERS_LABEL: &str = "Other";

// ============================================================================
// Column Definitions
// ============================================================================

/// The aggregate a column computes per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnKind {
    /// Sum of the values that coerce to a finite number.
    Sum,
    /// Count of records by label.
    ///
    /// Without an others bucket the column counts records whose label equals
    /// `values[0]`. With one it counts records whose label is outside
    /// `values`. `values == ["__MISSING__"]` yields the missing rate instead.
    #[serde(rename_all = "camelCase")]
    CountBy {
        #[serde(default)]
        values: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        others_bucket: Option<String>,
    },
    /// Number of distinct labels.
    Distinct,
    /// Percentage of records with a filled value.
    Coverage,
}

/// One planned column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub property_id: String,
    pub header: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnDefinition {
    pub fn sum(property_id: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            header: header.into(),
            kind: ColumnKind::Sum,
        }
    }

    /// Sum column with the default `Sum(<Property>)` header.
    pub fn default_sum(property_id: &str) -> Self {
        Self::sum(property_id, format!("Sum({})", pretty_prop(property_id)))
    }

    /// Count of records whose label equals `value`.
    pub fn count_label(
        property_id: impl Into<String>,
        header: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            property_id: property_id.into(),
            header: header.into(),
            kind: ColumnKind::CountBy {
                values: vec![value.into()],
                others_bucket: None,
            },
        }
    }

    /// Count of records whose label is not one of `values`.
    pub fn others_bucket(
        property_id: impl Into<String>,
        bucket: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        let bucket = bucket.into();
        Self {
            property_id: property_id.into(),
            header: bucket.clone(),
            kind: ColumnKind::CountBy {
                values,
                others_bucket: Some(bucket),
            },
        }
    }

    pub fn distinct(property_id: &str) -> Self {
        Self {
            property_id: property_id.to_string(),
            header: format!("Distinct {}", pretty_prop(property_id)),
            kind: ColumnKind::Distinct,
        }
    }

    pub fn coverage(property_id: &str) -> Self {
        Self {
            property_id: property_id.to_string(),
            header: format!("{} Coverage (%)", pretty_prop(property_id)),
            kind: ColumnKind::Coverage,
        }
    }

    /// Percentage of records missing a value.
    pub fn missing_rate(property_id: &str) -> Self {
        Self {
            property_id: property_id.to_string(),
            header: format!("{} Missing (%)", pretty_prop(property_id)),
            kind: ColumnKind::CountBy {
                values: vec![MISSING_SENTINEL.to_string()],
                others_bucket: None,
            },
        }
    }

    pub fn base(&self) -> &str {
        base_pid(&self.property_id)
    }

    pub fn is_sum(&self) -> bool {
        matches!(self.kind, ColumnKind::Sum)
    }

    pub fn is_count_by(&self) -> bool {
        matches!(self.kind, ColumnKind::CountBy { .. })
    }
}

// ============================================================================
// Computed Values
// ============================================================================

/// One computed aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    /// Sums and lenient totals.
    Number(f64),
    /// Exact record counts.
    Count(usize),
    /// Percentage rounded to one decimal place.
    Percent(f64),
}

impl CellValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            CellValue::Number(n) | CellValue::Percent(n) => *n,
            CellValue::Count(c) => *c as f64,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => f.write_str(&format_number_plain(*n)),
            CellValue::Count(c) => write!(f, "{c}"),
            CellValue::Percent(p) => write!(f, "{}%", format_number_plain(*p)),
        }
    }
}

/// Numbers serialize as JSON numbers, percentages as `"<value>%"` strings.
impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Count(c) => serializer.serialize_u64(*c as u64),
            CellValue::Percent(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

/// One output row per group.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""), rename_all = "camelCase")]
pub struct AggregateRow<'a, R> {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    pub count: usize,
    /// Aligned 1:1 with the column list.
    pub values: Vec<CellValue>,
    /// The group's records, retained for drill-down.
    #[serde(skip)]
    pub records: &'a [R],
}

/// A computed KPI tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub label: String,
    pub value: CellValue,
}

/// A label with its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCount {
    pub label: String,
    pub count: usize,
}

/// Per-group label frequencies split into the top entries and the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    pub tops: Vec<TopCount>,
    pub others: Vec<TopCount>,
}

impl Breakdown {
    /// Combined count of everything outside the top entries.
    pub fn others_total(&self) -> usize {
        self.others.iter().map(|t| t.count).sum()
    }
}
