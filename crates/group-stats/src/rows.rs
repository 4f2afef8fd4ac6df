//! Row building: one [`AggregateRow`] per group, in group order.

use crate::aggregate::aggregate;
use crate::record::{Group, Record};
use crate::resolver::resolve;
use crate::types::{AggregateRow, ColumnDefinition};
use crate::value::{RawValue, format_value};

/// Display text of a group's own value or key; `None` when null or empty.
fn group_value_text(value: Option<&RawValue>) -> Option<String> {
    match value {
        None | Some(RawValue::Null) => None,
        Some(v) => Some(v.display_text()).filter(|text| !text.is_empty()),
    }
}

/// Label and key string for the group at 1-based `position`.
///
/// The label is the group's own label, else its value, else its key, else
/// the grouping property of its first record. A group with none of these is
/// labeled `Group {position}`, counting every group.
fn derive_label<R: Record>(
    group: &Group<R>,
    group_by: Option<&str>,
    position: usize,
) -> (String, Option<String>) {
    let mut group_key = group
        .value
        .as_ref()
        .filter(|v| !v.is_null())
        .map(|v| format_value(Some(v)));

    let mut label = group
        .label
        .clone()
        .filter(|l| !l.is_empty())
        .or_else(|| group_value_text(group.value.as_ref()))
        .or_else(|| group_value_text(group.key.as_ref()));

    if label.is_none()
        && let (Some(pid), Some(first)) = (group_by, group.records.first())
        && let Some(value) = resolve(first, pid)
    {
        let text = format_value(Some(&value));
        if !text.is_empty() {
            group_key = Some(text.clone());
            label = Some(text);
        }
    }

    let label = label.unwrap_or_else(|| format!("Group {position}"));
    (label, group_key)
}

/// Build one row per group, aggregating every column in list order.
pub fn build_rows<'a, R: Record>(
    groups: &'a [Group<R>],
    columns: &[ColumnDefinition],
    group_by: Option<&str>,
) -> Vec<AggregateRow<'a, R>> {
    groups
        .iter()
        .enumerate()
        .map(|(index, group)| {
            let (label, group_key) = derive_label(group, group_by, index + 1);
            AggregateRow {
                label,
                group_key,
                count: group.len(),
                values: columns
                    .iter()
                    .map(|column| aggregate(&group.records, column))
                    .collect(),
                records: &group.records,
            }
        })
        .collect()
}
