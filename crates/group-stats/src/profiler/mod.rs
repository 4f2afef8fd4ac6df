//! Property profiling across groups.
//!
//! This module provides the sampling-based classification used by the column
//! planner and the renderer:
//! - Numeric vs. categorical inference over a bounded sample
//! - Link-like detection (values embedding `[[...]]` cross-references)
//! - Frequency tables and top-N value selection over all records

mod statistics;
mod type_inference;

pub(crate) use statistics::sort_by_frequency;

use crate::record::{Group, Record};
use crate::resolver::resolve;
use crate::value::RawValue;

/// Default number of values sampled per property.
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

/// Read-only view over one render's groups.
///
/// Holds no caches; every query resolves values afresh.
pub struct PropertyProfiler<'a, R> {
    groups: &'a [Group<R>],
    sample_limit: usize,
}

impl<'a, R: Record> PropertyProfiler<'a, R> {
    pub fn new(groups: &'a [Group<R>]) -> Self {
        Self::with_sample_limit(groups, DEFAULT_SAMPLE_LIMIT)
    }

    pub fn with_sample_limit(groups: &'a [Group<R>], sample_limit: usize) -> Self {
        Self {
            groups,
            sample_limit: sample_limit.max(1),
        }
    }

    pub fn groups(&self) -> &'a [Group<R>] {
        self.groups
    }

    pub fn sample_limit(&self) -> usize {
        self.sample_limit
    }

    /// Resolved values of `property_id` in group order, then record order.
    pub fn resolved_values<'s>(
        &'s self,
        property_id: &'s str,
    ) -> impl Iterator<Item = Option<RawValue>> + 's {
        self.groups
            .iter()
            .flat_map(|group| group.records.iter())
            .map(move |record| resolve(record, property_id))
    }
}

impl<R> Clone for PropertyProfiler<'_, R> {
    fn clone(&self) -> Self {
        Self {
            groups: self.groups,
            sample_limit: self.sample_limit,
        }
    }
}
