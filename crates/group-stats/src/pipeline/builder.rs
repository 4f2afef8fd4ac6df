//! The `StatsPipeline` struct and its builder.

use crate::aggregate::lenient_total;
use crate::config::{RenderOptions, StatsConfig, TileSpec};
use crate::pipeline::StatsReport;
use crate::planner::ColumnPlanner;
use crate::profiler::PropertyProfiler;
use crate::record::{Group, Record};
use crate::resolver::{base_pid, is_file_property};
use crate::rows::build_rows;
use crate::types::{CellValue, ColumnDefinition, Tile};
use crate::utils::pretty_prop;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Computes a full statistics report over pre-grouped records.
///
/// The pipeline holds only configuration; every [`render`](Self::render)
/// recomputes everything from the groups it is given.
///
/// # Example
///
/// ```rust,ignore
/// use group_stats::{RenderOptions, StatsPipeline};
///
/// let pipeline = StatsPipeline::builder()
///     .options(RenderOptions::builder().group_by("status").build())
///     .build();
/// let report = pipeline.render(&properties, &groups);
/// println!("{report}");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatsPipeline {
    options: RenderOptions,
    config: StatsConfig,
}

static_assertions::assert_impl_all!(StatsPipeline: Send, Sync);

impl StatsPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> StatsPipelineBuilder {
        StatsPipelineBuilder::default()
    }

    /// Pipeline configured from a host settings object.
    ///
    /// Render options come from the top-level keys, the statistics
    /// configuration from the `stats` key.
    pub fn from_settings(settings: &Value) -> Self {
        Self {
            options: RenderOptions::from_settings(settings),
            config: StatsConfig::from_settings(settings),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Render statistics for `groups`, with `properties` in display order.
    pub fn render<'a, R: Record>(
        &self,
        properties: &[String],
        groups: &'a [Group<R>],
    ) -> StatsReport<'a, R> {
        info!(
            "Rendering statistics: {} groups, {} properties, {} configured columns",
            groups.len(),
            properties.len(),
            self.config.columns.len()
        );

        let planner = ColumnPlanner::from_options(groups, &self.options);
        let columns = planner.plan(properties, &self.config.columns);

        let group_by = self.options.group_by.as_deref();
        let mut rows = build_rows(groups, &columns, group_by);
        rows.truncate(self.options.visible_groups(rows.len()));

        let numeric_properties = numeric_properties(planner.profiler(), properties, &columns);
        let tiles = compute_tiles(&self.config.tiles, groups);
        let caption = caption(groups.len(), group_by);

        info!(
            "Rendered {} columns, {} of {} rows, {} tiles",
            columns.len(),
            rows.len(),
            groups.len(),
            tiles.len()
        );

        StatsReport {
            caption,
            tiles,
            columns,
            rows,
            numeric_properties,
            options: self.options.clone(),
        }
    }
}

/// Bases of non-file properties that sample as numeric, plus every base
/// backed by a sum column.
fn numeric_properties<R: Record>(
    profiler: &PropertyProfiler<'_, R>,
    properties: &[String],
    columns: &[ColumnDefinition],
) -> BTreeSet<String> {
    let inferred = properties
        .iter()
        .filter(|p| !is_file_property(p) && profiler.consider_numeric(p))
        .map(|p| base_pid(p).to_string());
    let summed = columns
        .iter()
        .filter(|c| c.is_sum())
        .map(|c| c.base().to_string());
    let numeric: BTreeSet<String> = inferred.chain(summed).collect();
    debug!("Numeric properties: {:?}", numeric);
    numeric
}

/// KPI tiles over every record of every group.
fn compute_tiles<R: Record>(specs: &[TileSpec], groups: &[Group<R>]) -> Vec<Tile> {
    specs
        .iter()
        .map(|spec| {
            let value = match spec {
                TileSpec::Count { .. } => CellValue::Count(groups.iter().map(Group::len).sum()),
                TileSpec::Sum { field, .. } => CellValue::Number(
                    groups
                        .iter()
                        .map(|g| lenient_total(&g.records, field))
                        .sum(),
                ),
            };
            Tile {
                label: spec.display_label().to_string(),
                value,
            }
        })
        .collect()
}

fn caption(group_count: usize, group_by: Option<&str>) -> String {
    match group_by {
        Some(pid) => format!("Groups: {group_count} • Grouped by: {}", pretty_prop(pid)),
        None => format!("Groups: {group_count}"),
    }
}

/// Builder for [`StatsPipeline`] with fluent API.
#[derive(Debug, Default)]
pub struct StatsPipelineBuilder {
    options: Option<RenderOptions>,
    config: Option<StatsConfig>,
}

impl StatsPipelineBuilder {
    /// Set the render options.
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the statistics configuration (tiles and explicit columns).
    pub fn config(mut self, config: StatsConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> StatsPipeline {
        StatsPipeline {
            options: self.options.unwrap_or_default(),
            config: self.config.unwrap_or_default(),
        }
    }
}
