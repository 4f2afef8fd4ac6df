//! Group Statistics Library
//!
//! Per-group statistics over records that an external data layer has
//! already grouped: numeric sums, category counts, distinct counts and
//! coverage rates, laid out as one table row per group.
//!
//! # Overview
//!
//! - **Value resolution**: forgiving property lookup across namespace
//!   prefixes, casings and nested metadata containers
//! - **Numeric coercion**: grouped-thousands tolerant parsing that keeps
//!   "missing" distinct from zero
//! - **Type inference**: sampling-based numeric and link-like classification
//! - **Column planning**: explicit or automatic column selection with
//!   sanitization so no property is both summed and broken down
//! - **Aggregation**: per-group sums, counts, distinct counts, coverage and
//!   missing rates
//!
//! Every core operation is total. Malformed values degrade to "absent" and
//! malformed configuration entries are dropped; nothing panics or fails a
//! render. Only the input boundary ([`RenderInput`], [`StatsConfig::from_json_str`])
//! returns [`StatsError`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use group_stats::{Group, MapRecord, RenderOptions, StatsPipeline};
//!
//! let groups = vec![
//!     Group::new(vec![
//!         MapRecord::new().with("note.amount", "1,200").with("status", "open"),
//!         MapRecord::new().with("note.amount", 300).with("status", "closed"),
//!     ])
//!     .with_label("Q1"),
//! ];
//! let properties = vec!["note.amount".to_string(), "status".to_string()];
//!
//! let report = StatsPipeline::builder()
//!     .options(RenderOptions::builder().group_by("quarter").build())
//!     .build()
//!     .render(&properties, &groups);
//!
//! println!("{report}");
//! ```
//!
//! # Host Records
//!
//! Implement [`Record`] for host items. Only direct lookup is required;
//! exposing [`Metadata`] containers enables the case-insensitive fallback:
//!
//! ```rust,ignore
//! use group_stats::{Record, RawValue};
//!
//! struct Note { fields: HashMap<String, RawValue> }
//!
//! impl Record for Note {
//!     fn resolve_raw(&self, property_id: &str) -> Option<RawValue> {
//!         self.fields.get(property_id).cloned()
//!     }
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing`. Without an installed subscriber all
//! logging is a no-op.

pub mod aggregate;
pub mod coercion;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod planner;
pub mod profiler;
pub mod record;
pub mod resolver;
pub mod rows;
pub mod types;
pub mod utils;
pub mod value;

// Re-exports for convenient access
pub use aggregate::{aggregate, numeric_sum, records_for_label, top_counts, NumericSum};
pub use coercion::{is_filled, is_missing, to_number, to_number_strict};
pub use config::{ColumnSpec, RenderOptions, RenderOptionsBuilder, StatsConfig, TileSpec};
pub use error::{Result as StatsResult, ResultExt, StatsError};
pub use pipeline::{RenderInput, StatsPipeline, StatsPipelineBuilder, StatsReport};
pub use planner::ColumnPlanner;
pub use profiler::PropertyProfiler;
pub use record::{Group, MapRecord, Metadata, MetadataLocation, Record};
pub use resolver::{base_pid, candidate_ids, resolve};
pub use rows::build_rows;
pub use types::{
    AggregateRow, Breakdown, CellValue, ColumnDefinition, ColumnKind, MISSING_SENTINEL, Tile,
    TopCount,
};
pub use utils::pretty_prop;
pub use value::{RawValue, ValueLike, format_value, label_of};
