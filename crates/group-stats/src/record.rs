//! Records and groups supplied by the host data layer.

use crate::value::RawValue;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

/// Nested metadata containers a record may expose, in the order the
/// resolver scans them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataLocation {
    FileFrontmatter,
    Frontmatter,
    NoteFrontmatter,
    FileMetadataFrontmatter,
    MetadataFrontmatter,
}

impl MetadataLocation {
    /// All locations in scan priority order.
    pub const ALL: [MetadataLocation; 5] = [
        MetadataLocation::FileFrontmatter,
        MetadataLocation::Frontmatter,
        MetadataLocation::NoteFrontmatter,
        MetadataLocation::FileMetadataFrontmatter,
        MetadataLocation::MetadataFrontmatter,
    ];
}

/// An insertion-ordered key/value container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, RawValue)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value stored under exactly `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First entry whose lower-cased key equals any lower-cased candidate.
    pub fn find_ignore_case<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&RawValue> {
        let wanted: Vec<String> = candidates
            .iter()
            .map(|c| c.as_ref().to_lowercase())
            .collect();
        self.entries
            .iter()
            .find(|(k, _)| wanted.contains(&k.to_lowercase()))
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

impl<'de> Deserialize<'de> for Metadata {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(map.into_iter().map(|(k, v)| (k, RawValue::from(v))).collect())
    }
}

/// A single data item being grouped and aggregated.
///
/// Records are read-only snapshots for the duration of a render.
pub trait Record {
    /// Direct lookup of a property by its exact identifier.
    fn resolve_raw(&self, property_id: &str) -> Option<RawValue>;

    /// Nested metadata container at `location`, if the record has one.
    fn metadata(&self, _location: MetadataLocation) -> Option<&Metadata> {
        None
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn resolve_raw(&self, property_id: &str) -> Option<RawValue> {
        (**self).resolve_raw(property_id)
    }

    fn metadata(&self, location: MetadataLocation) -> Option<&Metadata> {
        (**self).metadata(location)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn resolve_raw(&self, property_id: &str) -> Option<RawValue> {
        (**self).resolve_raw(property_id)
    }

    fn metadata(&self, location: MetadataLocation) -> Option<&Metadata> {
        (**self).metadata(location)
    }
}

impl<R: Record + ?Sized> Record for Arc<R> {
    fn resolve_raw(&self, property_id: &str) -> Option<RawValue> {
        (**self).resolve_raw(property_id)
    }

    fn metadata(&self, location: MetadataLocation) -> Option<&Metadata> {
        (**self).metadata(location)
    }
}

/// A record backed by an ordered property map.
///
/// Deserializes from
/// `{"values": {...}, "frontmatter": {...}, "note": {"frontmatter": {...}},
/// "file": {"frontmatter": {...}, "metadata": {"frontmatter": {...}}},
/// "metadata": {"frontmatter": {...}}}` with every key optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RecordDocument")]
pub struct MapRecord {
    values: Metadata,
    containers: Vec<(MetadataLocation, Metadata)>,
}

impl MapRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style property setter.
    pub fn with(mut self, property_id: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.values.insert(property_id, value);
        self
    }

    /// Attach a metadata container, replacing any existing one at `location`.
    pub fn with_metadata(mut self, location: MetadataLocation, metadata: Metadata) -> Self {
        self.containers.retain(|(loc, _)| *loc != location);
        self.containers.push((location, metadata));
        self
    }

    pub fn values(&self) -> &Metadata {
        &self.values
    }
}

impl Record for MapRecord {
    fn resolve_raw(&self, property_id: &str) -> Option<RawValue> {
        self.values.get(property_id).cloned()
    }

    fn metadata(&self, location: MetadataLocation) -> Option<&Metadata> {
        self.containers
            .iter()
            .find(|(loc, _)| *loc == location)
            .map(|(_, m)| m)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RecordDocument {
    values: Metadata,
    frontmatter: Option<Metadata>,
    note: Option<NestedFrontmatter>,
    file: Option<FileDocument>,
    metadata: Option<NestedFrontmatter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedFrontmatter {
    frontmatter: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileDocument {
    frontmatter: Option<Metadata>,
    metadata: Option<NestedFrontmatter>,
}

impl From<RecordDocument> for MapRecord {
    fn from(doc: RecordDocument) -> Self {
        let located = [
            (
                MetadataLocation::FileFrontmatter,
                doc.file.as_ref().and_then(|f| f.frontmatter.clone()),
            ),
            (MetadataLocation::Frontmatter, doc.frontmatter),
            (
                MetadataLocation::NoteFrontmatter,
                doc.note.and_then(|n| n.frontmatter),
            ),
            (
                MetadataLocation::FileMetadataFrontmatter,
                doc.file.and_then(|f| f.metadata).and_then(|m| m.frontmatter),
            ),
            (
                MetadataLocation::MetadataFrontmatter,
                doc.metadata.and_then(|m| m.frontmatter),
            ),
        ];

        MapRecord {
            values: doc.values,
            containers: located
                .into_iter()
                .filter_map(|(loc, m)| m.map(|m| (loc, m)))
                .collect(),
        }
    }
}

/// An ordered bucket of records sharing a grouping key.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Group<R> {
    #[serde(default, alias = "entries")]
    pub records: Vec<R>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub key: Option<RawValue>,
}

impl<R> Group<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            label: None,
            value: None,
            key: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<RawValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<RawValue>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_insert_replaces_exact_key() {
        let mut m = Metadata::new();
        m.insert("Status", "open");
        m.insert("status", "closed");
        m.insert("Status", "review");
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("Status"), Some(&RawValue::from("review")));
    }

    #[test]
    fn test_find_ignore_case_first_key_wins() {
        let m: Metadata = [("Amount", 1), ("AMOUNT", 2)].into_iter().collect();
        assert_eq!(m.find_ignore_case(&["amount"]), Some(&RawValue::from(1)));
        assert_eq!(m.find_ignore_case(&["missing"]), None);
    }

    #[test]
    fn test_map_record_from_json_document() {
        let record: MapRecord = serde_json::from_str(
            r#"{
                "values": {"note.status": "open"},
                "frontmatter": {"b": 2},
                "file": {"frontmatter": {"a": 1}, "metadata": {"frontmatter": {"c": 3}}}
            }"#,
        )
        .unwrap();

        assert_eq!(record.resolve_raw("note.status"), Some(RawValue::from("open")));
        assert_eq!(record.resolve_raw("status"), None);
        assert!(record.metadata(MetadataLocation::FileFrontmatter).is_some());
        assert!(record.metadata(MetadataLocation::Frontmatter).is_some());
        assert!(record.metadata(MetadataLocation::FileMetadataFrontmatter).is_some());
        assert!(record.metadata(MetadataLocation::NoteFrontmatter).is_none());
    }

    #[test]
    fn test_group_accepts_entries_alias() {
        let group: Group<MapRecord> =
            serde_json::from_str(r#"{"entries": [{}, {}], "label": "A"}"#).unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group.label.as_deref(), Some("A"));
        assert!(group.value.is_none());
    }
}
