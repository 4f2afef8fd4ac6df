//! Loosely-typed values as they arrive from the host data layer.
//!
//! Records hand back numbers, strings, lists and host wrapper objects under the
//! same property. [`RawValue`] keeps those shapes apart as a tagged union, and
//! wrapper objects expose what they can do through the [`ValueLike`] probes
//! instead of being inspected structurally.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::Arc;

/// Label used for absent, null and empty values.
pub const EMPTY_LABEL: &str = "(empty)";

/// Capability probes for host wrapper objects.
///
/// Every probe defaults to "not supported"; implementations override only the
/// capabilities their wrapper actually exposes.
pub trait ValueLike: fmt::Debug + Send + Sync {
    /// Dedicated numeric conversion.
    fn as_number(&self) -> Option<f64> {
        None
    }

    /// Generic primitive coercion, tried after [`ValueLike::as_number`].
    fn primitive(&self) -> Option<f64> {
        None
    }

    /// Textual representation.
    fn as_text(&self) -> Option<String> {
        None
    }

    /// Emptiness probe.
    fn is_empty(&self) -> Option<bool> {
        None
    }
}

/// A single resolved property value.
#[derive(Debug, Clone, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Wrapped(Arc<dyn ValueLike>),
}

impl RawValue {
    /// Wrap a host object exposing [`ValueLike`] capabilities.
    pub fn wrapped(value: impl ValueLike + 'static) -> Self {
        RawValue::Wrapped(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Plain stringification of the value.
    ///
    /// Null renders as an empty string, lists join their elements with `,`
    /// and wrappers fall back to an empty string when they expose no text.
    pub fn display_text(&self) -> String {
        match self {
            RawValue::Null => String::new(),
            RawValue::Bool(b) => b.to_string(),
            RawValue::Number(n) => format_number_plain(*n),
            RawValue::Text(s) => s.clone(),
            RawValue::List(items) => items
                .iter()
                .map(RawValue::display_text)
                .collect::<Vec<_>>()
                .join(","),
            RawValue::Wrapped(w) => w.as_text().unwrap_or_default(),
        }
    }
}

impl PartialEq for RawValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RawValue::Null, RawValue::Null) => true,
            (RawValue::Bool(a), RawValue::Bool(b)) => a == b,
            (RawValue::Number(a), RawValue::Number(b)) => a == b,
            (RawValue::Text(a), RawValue::Text(b)) => a == b,
            (RawValue::List(a), RawValue::List(b)) => a == b,
            (RawValue::Wrapped(a), RawValue::Wrapped(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Render a number the way a host script runtime stringifies it:
/// integral values carry no fractional part.
pub fn format_number_plain(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Label for frequency tables and count-by matching.
///
/// Absent, null and empty-string values all collapse to [`EMPTY_LABEL`].
pub fn label_of(value: Option<&RawValue>) -> String {
    let text = value.map(RawValue::display_text).unwrap_or_default();
    if text.is_empty() {
        EMPTY_LABEL.to_string()
    } else {
        text
    }
}

/// Display form of a grouping value. Only absent and null map to
/// [`EMPTY_LABEL`]; an empty string stays empty.
pub fn format_value(value: Option<&RawValue>) -> String {
    match value {
        None | Some(RawValue::Null) => EMPTY_LABEL.to_string(),
        Some(v) => v.display_text(),
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Number(n as f64)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Null)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or_default(),
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from).collect())
            }
            serde_json::Value::Object(map) => RawValue::wrapped(JsonObject(map)),
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(RawValue::from)
    }
}

/// A nested JSON object carried as a record value.
///
/// It has no numeric capability; its text is the compact JSON form.
#[derive(Debug, Clone)]
pub struct JsonObject(pub serde_json::Map<String, serde_json::Value>);

impl ValueLike for JsonObject {
    fn as_text(&self) -> Option<String> {
        serde_json::to_string(&self.0).ok()
    }

    fn is_empty(&self) -> Option<bool> {
        Some(self.0.is_empty())
    }
}
