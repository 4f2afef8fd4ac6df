//! Label frequency statistics over all records.

use super::PropertyProfiler;
use crate::record::Record;
use crate::value::label_of;
use std::collections::HashMap;

/// Sort `(label, count)` pairs by descending count, then ascending label.
pub(crate) fn sort_by_frequency(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

impl<R: Record> PropertyProfiler<'_, R> {
    /// Label frequencies of `property_id` across every record (no sampling).
    pub fn frequencies(&self, property_id: &str) -> HashMap<String, usize> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for value in self.resolved_values(property_id) {
            *counts.entry(label_of(value.as_ref())).or_insert(0) += 1;
        }
        counts
    }

    /// The `n` most frequent labels, ties broken by ascending label.
    pub fn top_n_values(&self, property_id: &str, n: usize) -> Vec<String> {
        sort_by_frequency(self.frequencies(property_id))
            .into_iter()
            .take(n)
            .map(|(label, _)| label)
            .collect()
    }
}
