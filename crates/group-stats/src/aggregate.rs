//! Per-group aggregates over a record slice.
//!
//! Every function here is total: unresolvable properties and uncoercible
//! values degrade to "absent" or "not counted" and never abort aggregation.

use crate::coercion::{is_filled, is_missing, to_number_strict};
use crate::profiler::sort_by_frequency;
use crate::record::Record;
use crate::resolver::resolve;
use crate::types::{
    Breakdown, CellValue, ColumnDefinition, ColumnKind, MISSING_SENTINEL, TopCount,
};
use crate::utils::{is_unusable_numeric_text, percent_one_decimal};
use crate::value::{RawValue, format_value, label_of};
use std::collections::{HashMap, HashSet};

/// Result of summing one property over a record slice.
///
/// A record contributes when its value is present and coerces to a finite
/// number; explicit zeros contribute like any other number. Present values
/// that fail coercion are counted in `skipped`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericSum {
    pub total: f64,
    pub contributing: usize,
    pub skipped: usize,
}

fn is_absent_for_sum(value: Option<&RawValue>) -> bool {
    match value {
        None | Some(RawValue::Null) => true,
        Some(RawValue::Text(s)) => s.is_empty(),
        _ => false,
    }
}

/// Sum `property_id` over `records` with contribution bookkeeping.
pub fn numeric_sum<R: Record>(records: &[R], property_id: &str) -> NumericSum {
    let mut sum = NumericSum::default();
    for record in records {
        let value = resolve(record, property_id);
        if is_absent_for_sum(value.as_ref()) {
            continue;
        }
        match value.as_ref().and_then(to_number_strict) {
            Some(n) => {
                sum.total += n;
                sum.contributing += 1;
            }
            None => sum.skipped += 1,
        }
    }
    sum
}

/// Sum of `property_id` over `records`; `0.0` for an empty slice.
pub fn sum_values<R: Record>(records: &[R], property_id: &str) -> f64 {
    numeric_sum(records, property_id).total
}

/// Lenient total: every value coerced with unusable values as zero.
pub fn lenient_total<R: Record>(records: &[R], property_id: &str) -> f64 {
    records
        .iter()
        .filter_map(|record| resolve(record, property_id))
        .filter_map(|value| to_number_strict(&value))
        .sum()
}

/// Records whose label equals `label`.
pub fn count_label<R: Record>(records: &[R], property_id: &str, label: &str) -> usize {
    records
        .iter()
        .filter(|record| label_of(resolve(*record, property_id).as_ref()) == label)
        .count()
}

/// Records whose label is not in `allowed`.
pub fn count_others<R: Record>(records: &[R], property_id: &str, allowed: &[String]) -> usize {
    let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
    records
        .iter()
        .filter(|record| {
            let label = label_of(resolve(*record, property_id).as_ref());
            !allowed.contains(label.as_str())
        })
        .count()
}

/// Records with a filled (present and numeric-bearing) value.
pub fn count_filled<R: Record>(records: &[R], property_id: &str) -> usize {
    records
        .iter()
        .filter(|record| is_filled(resolve(*record, property_id).as_ref()))
        .count()
}

/// Records with a missing value.
pub fn count_missing<R: Record>(records: &[R], property_id: &str) -> usize {
    records
        .iter()
        .filter(|record| is_missing(resolve(*record, property_id).as_ref()))
        .count()
}

/// Number of distinct labels.
pub fn distinct_count<R: Record>(records: &[R], property_id: &str) -> usize {
    records
        .iter()
        .map(|record| label_of(resolve(record, property_id).as_ref()))
        .collect::<HashSet<_>>()
        .len()
}

/// Filled share in percent, one decimal; `0` for an empty slice.
pub fn coverage_rate<R: Record>(records: &[R], property_id: &str) -> f64 {
    percent_one_decimal(count_filled(records, property_id), records.len())
}

/// Missing share in percent, one decimal; `0` for an empty slice.
pub fn missing_rate<R: Record>(records: &[R], property_id: &str) -> f64 {
    percent_one_decimal(count_missing(records, property_id), records.len())
}

/// Compute the aggregate `column` describes over one group's records.
pub fn aggregate<R: Record>(records: &[R], column: &ColumnDefinition) -> CellValue {
    let pid = column.property_id.as_str();
    match &column.kind {
        ColumnKind::Sum => CellValue::Number(sum_values(records, pid)),
        ColumnKind::CountBy {
            values,
            others_bucket,
        } => match values.as_slice() {
            [only] if only == MISSING_SENTINEL => CellValue::Percent(missing_rate(records, pid)),
            [] => CellValue::Count(0),
            [first, ..] => match others_bucket {
                Some(_) => CellValue::Count(count_others(records, pid, values)),
                None => CellValue::Count(count_label(records, pid, first)),
            },
        },
        ColumnKind::Distinct => CellValue::Count(distinct_count(records, pid)),
        ColumnKind::Coverage => CellValue::Percent(coverage_rate(records, pid)),
    }
}

// =============================================================================
// Per-group Breakdown
// =============================================================================

fn is_ignorable(value: Option<&RawValue>) -> bool {
    match value {
        None | Some(RawValue::Null) => true,
        Some(v) => is_unusable_numeric_text(&v.display_text()),
    }
}

/// Label frequencies within one group, split at `top_n`.
///
/// With `ignore_nulls`, absent, null, blank and `null`/`nan`/`undefined`
/// values are left out entirely.
pub fn top_counts<R: Record>(
    records: &[R],
    property_id: &str,
    top_n: usize,
    ignore_nulls: bool,
) -> Breakdown {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let value = resolve(record, property_id);
        if ignore_nulls && is_ignorable(value.as_ref()) {
            continue;
        }
        *counts.entry(label_of(value.as_ref())).or_insert(0) += 1;
    }

    let mut all: Vec<TopCount> = sort_by_frequency(counts)
        .into_iter()
        .map(|(label, count)| TopCount { label, count })
        .collect();
    let others = all.split_off(top_n.min(all.len()));
    Breakdown { tops: all, others }
}

/// Records whose formatted grouping value equals `label`.
///
/// Without a grouping property every record matches.
pub fn records_for_label<'a, R: Record>(
    records: &'a [R],
    group_by: Option<&str>,
    label: &str,
) -> Vec<&'a R> {
    match group_by {
        None => records.iter().collect(),
        Some(pid) => records
            .iter()
            .filter(|record| format_value(resolve(*record, pid).as_ref()) == label)
            .collect(),
    }
}
