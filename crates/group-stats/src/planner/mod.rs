//! Column planning.
//!
//! Turns the display properties and the configured columns into the ordered
//! [`ColumnDefinition`] list every row is aggregated against.
//!
//! # Modes
//!
//! - **Explicit**: a non-empty column configuration is expanded entry by entry,
//!   then numeric properties it references are promoted to leading sums.
//! - **Automatic**: properties are classified by sampling and turned into
//!   sums, categorical breakdowns or link summaries, capped at `column_cap`.
//!
//! Both modes end with [`ColumnPlanner::sanitize`], which guarantees that no
//! base property is summarized both as a sum and as a count-by breakdown.

mod automatic;
mod explicit;
mod sanitize;

use crate::config::{ColumnSpec, RenderOptions};
use crate::profiler::PropertyProfiler;
use crate::record::{Group, Record};
use crate::types::ColumnDefinition;
use tracing::debug;

/// Default column cap in automatic mode.
pub const DEFAULT_COLUMN_CAP: usize = 6;

/// Default number of top values probed per property.
pub const DEFAULT_PROBE_TOP_N: usize = 3;

/// Plans columns over one render's groups.
pub struct ColumnPlanner<'a, R> {
    profiler: PropertyProfiler<'a, R>,
    column_cap: usize,
    probe_top_n: usize,
}

impl<'a, R: Record> ColumnPlanner<'a, R> {
    pub fn new(groups: &'a [Group<R>]) -> Self {
        Self {
            profiler: PropertyProfiler::new(groups),
            column_cap: DEFAULT_COLUMN_CAP,
            probe_top_n: DEFAULT_PROBE_TOP_N,
        }
    }

    /// Planner using the sampling and cap settings of `options`.
    pub fn from_options(groups: &'a [Group<R>], options: &RenderOptions) -> Self {
        Self {
            profiler: PropertyProfiler::with_sample_limit(groups, options.sample_limit),
            column_cap: options.column_cap.max(1),
            probe_top_n: options.probe_top_n.max(1),
        }
    }

    pub fn with_column_cap(mut self, cap: usize) -> Self {
        self.column_cap = cap.max(1);
        self
    }

    pub fn with_probe_top_n(mut self, n: usize) -> Self {
        self.probe_top_n = n.max(1);
        self
    }

    pub fn profiler(&self) -> &PropertyProfiler<'a, R> {
        &self.profiler
    }

    /// Plan the column list.
    ///
    /// `columns` selects the mode: explicit when non-empty, automatic over
    /// `properties` otherwise. The result is always sanitized.
    pub fn plan(&self, properties: &[String], columns: &[ColumnSpec]) -> Vec<ColumnDefinition> {
        let planned = if columns.is_empty() {
            self.plan_automatic(properties)
        } else {
            self.plan_explicit(columns)
        };
        let sanitized = self.sanitize(planned);
        debug!(
            "Planned {} columns: {:?}",
            sanitized.len(),
            sanitized.iter().map(|c| c.header.as_str()).collect::<Vec<_>>()
        );
        sanitized
    }
}
