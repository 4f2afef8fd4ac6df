//! Numeric and link-like classification of properties.

use super::PropertyProfiler;
use crate::record::Record;
use crate::utils::{is_blank_marker, is_numeric_like};
use crate::value::RawValue;
use tracing::debug;

/// Samples at or below this size count as numeric only when every value is.
const SMALL_SAMPLE: usize = 5;

/// Cross-reference marker embedded in link-like values.
const LINK_MARKER: &str = "[[";

/// Values skipped while sampling: null and blank strings.
fn is_sampled(value: &RawValue) -> bool {
    match value {
        RawValue::Null => false,
        RawValue::Text(s) => !is_blank_marker(s),
        _ => true,
    }
}

fn is_numeric_sample(value: &RawValue) -> bool {
    match value {
        RawValue::Number(_) => true,
        RawValue::Text(s) => is_numeric_like(s),
        _ => false,
    }
}

impl<R: Record> PropertyProfiler<'_, R> {
    /// Whether `property_id` behaves as a numeric property.
    ///
    /// Samples up to `sample_limit` non-missing values. A small sample must be
    /// entirely numeric; otherwise at least 60% (floored, minimum one) of the
    /// observed values must be.
    pub fn consider_numeric(&self, property_id: &str) -> bool {
        let mut observed = 0usize;
        let mut numeric = 0usize;

        for value in self.resolved_values(property_id).flatten() {
            if !is_sampled(&value) {
                continue;
            }
            observed += 1;
            if is_numeric_sample(&value) {
                numeric += 1;
            }
            if observed >= self.sample_limit {
                break;
            }
        }

        if observed == 0 {
            return false;
        }
        if observed <= SMALL_SAMPLE && numeric == observed {
            return true;
        }
        let threshold = (observed * 3 / 5).max(1);
        let is_numeric = numeric >= threshold;
        debug!(
            "consider_numeric({}): {}/{} numeric -> {}",
            property_id, numeric, observed, is_numeric
        );
        is_numeric
    }

    /// Whether any of the first `sample_limit` records holds a string value
    /// embedding a `[[...]]` cross-reference.
    pub fn is_link_like(&self, property_id: &str) -> bool {
        self.resolved_values(property_id)
            .take(self.sample_limit)
            .flatten()
            .any(|value| value.as_str().is_some_and(|s| s.contains(LINK_MARKER)))
    }

    /// Whether any record, unsampled, holds a finite number or a non-blank
    /// numeric-looking string for `property_id`.
    pub fn has_numeric_sample(&self, property_id: &str) -> bool {
        self.resolved_values(property_id)
            .flatten()
            .any(|value| match value {
                RawValue::Number(n) => n.is_finite(),
                RawValue::Text(s) => !is_blank_marker(&s) && is_numeric_like(&s),
                _ => false,
            })
    }
}
