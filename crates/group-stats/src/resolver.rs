//! Property value resolution across namespace and casing variants.
//!
//! Records may store a logical property under `note.`, `file.` or `formula.`
//! prefixes and in inconsistent casing. [`resolve`] tries a fixed, ordered set
//! of identifier variants against the record's direct lookup and then falls
//! back to a case-insensitive scan of the record's metadata containers.

use crate::record::{MetadataLocation, Record};
use crate::value::RawValue;

/// Namespace prefixes recognised on property identifiers.
pub const KNOWN_PREFIXES: [&str; 3] = ["note.", "file.", "formula."];

/// Prefix of file-level properties, which are never aggregated.
pub const FILE_PREFIX: &str = "file.";

/// Strip a recognised namespace prefix.
pub fn base_pid(property_id: &str) -> &str {
    KNOWN_PREFIXES
        .iter()
        .find_map(|prefix| property_id.strip_prefix(prefix))
        .unwrap_or(property_id)
}

pub fn is_file_property(property_id: &str) -> bool {
    property_id.starts_with(FILE_PREFIX)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered, de-duplicated identifier variants to try for `property_id`.
pub fn candidate_ids(property_id: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    let mut add = |s: String| {
        if !s.is_empty() && !candidates.contains(&s) {
            candidates.push(s);
        }
    };

    let base = base_pid(property_id);
    add(property_id.to_string());
    add(base.to_string());
    add(property_id.to_lowercase());
    add(base.to_lowercase());

    let name = match property_id.split_once('.') {
        Some((prefix, name)) => {
            add(format!("{prefix}.{name}"));
            add(format!("{prefix}.{}", capitalize(name)));
            add(format!("{prefix}.{}", name.to_lowercase()));
            add(format!("{prefix}.{}", capitalize(&name.to_lowercase())));
            name
        }
        None => property_id,
    };

    for variant in [name.to_string(), capitalize(name), name.to_lowercase()] {
        for prefix in KNOWN_PREFIXES {
            add(format!("{prefix}{variant}"));
        }
    }

    candidates
}

/// Resolve `property_id` on `record`.
///
/// Returns `None` when nothing matched. A resolved null comes back as
/// `Some(RawValue::Null)` and stops the search like any other value.
pub fn resolve<R: Record + ?Sized>(record: &R, property_id: &str) -> Option<RawValue> {
    candidate_ids(property_id)
        .iter()
        .find_map(|candidate| record.resolve_raw(candidate))
        .or_else(|| resolve_from_metadata(record, property_id))
}

fn resolve_from_metadata<R: Record + ?Sized>(record: &R, property_id: &str) -> Option<RawValue> {
    let base = base_pid(property_id);
    let keys = [property_id, base];
    MetadataLocation::ALL.iter().find_map(|location| {
        record
            .metadata(*location)
            .and_then(|metadata| metadata.find_ignore_case(&keys))
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MapRecord, Metadata};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_base_pid_strips_known_prefixes() {
        assert_eq!(base_pid("note.amount"), "amount");
        assert_eq!(base_pid("file.name"), "name");
        assert_eq!(base_pid("formula.total"), "total");
        assert_eq!(base_pid("amount"), "amount");
        assert_eq!(base_pid("project.owner"), "project.owner");
    }

    #[test]
    fn test_base_pid_same_for_prefixed_and_plain() {
        for prefix in KNOWN_PREFIXES {
            let prefixed = format!("{prefix}status");
            assert_eq!(base_pid(&prefixed), base_pid("status"));
        }
    }

    #[test]
    fn test_candidate_order_for_plain_id() {
        let candidates = candidate_ids("Amount");
        assert_eq!(
            candidates,
            vec![
                "Amount",
                "amount",
                "note.Amount",
                "file.Amount",
                "formula.Amount",
                "note.amount",
                "file.amount",
                "formula.amount",
            ]
        );
    }

    #[test]
    fn test_candidate_order_for_prefixed_id() {
        let candidates = candidate_ids("note.status");
        assert_eq!(&candidates[..4], &["note.status", "status", "note.Status", "file.status"]);
        assert!(candidates.contains(&"formula.Status".to_string()));
        let unique: std::collections::HashSet<_> = candidates.iter().collect();
        assert_eq!(unique.len(), candidates.len());
    }

    #[test]
    fn test_resolve_across_prefix_and_case() {
        let record = MapRecord::new().with("note.Status", "open");
        assert_eq!(resolve(&record, "status"), Some(RawValue::from("open")));
        assert_eq!(resolve(&record, "formula.status"), Some(RawValue::from("open")));
    }

    #[test]
    fn test_resolved_null_stops_search() {
        let record = MapRecord::new()
            .with("amount", RawValue::Null)
            .with("note.amount", 5);
        assert_eq!(resolve(&record, "amount"), Some(RawValue::Null));
    }

    #[test]
    fn test_metadata_fallback_in_priority_order() {
        let frontmatter: Metadata = [("Priority", "high")].into_iter().collect();
        let file_frontmatter: Metadata = [("PRIORITY", "low")].into_iter().collect();
        let record = MapRecord::new()
            .with_metadata(MetadataLocation::Frontmatter, frontmatter)
            .with_metadata(MetadataLocation::FileFrontmatter, file_frontmatter);

        assert_eq!(resolve(&record, "note.priority"), Some(RawValue::from("low")));
    }

    #[test]
    fn test_unresolvable_is_absent() {
        let record = MapRecord::new().with("other", 1);
        assert_eq!(resolve(&record, "amount"), None);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let record = MapRecord::new().with("file.Size", 10);
        assert_eq!(resolve(&record, "size"), resolve(&record, "size"));
    }
}
