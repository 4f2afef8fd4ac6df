//! The rendered statistics report.

use crate::aggregate::{records_for_label, top_counts};
use crate::config::RenderOptions;
use crate::record::Record;
use crate::resolver::base_pid;
use crate::types::{AggregateRow, Breakdown, ColumnDefinition, Tile};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Everything one render produces for the rendering layer.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""), rename_all = "camelCase")]
pub struct StatsReport<'a, R> {
    /// `Groups: N`, plus the grouping property when one is configured.
    pub caption: String,
    pub tiles: Vec<Tile>,
    pub columns: Vec<ColumnDefinition>,
    /// One row per group, cut to the group limit.
    pub rows: Vec<AggregateRow<'a, R>>,
    /// Base ids the rendering layer should present as numeric.
    pub numeric_properties: BTreeSet<String>,
    pub options: RenderOptions,
}

impl<'a, R: Record> StatsReport<'a, R> {
    /// Label frequencies of `property_id` within `row`'s group, split at the
    /// configured chart size.
    pub fn breakdown(&self, row: &AggregateRow<'a, R>, property_id: &str) -> Breakdown {
        top_counts(
            row.records,
            property_id,
            self.options.chart_top_n,
            self.options.ignore_nulls,
        )
    }

    /// Records of `row` whose grouping value is displayed as `label`.
    pub fn records_for(&self, row: &AggregateRow<'a, R>, label: &str) -> Vec<&'a R> {
        records_for_label(row.records, self.options.group_by.as_deref(), label)
    }

    /// Whether `property_id` (by base) should be presented as numeric.
    pub fn is_numeric(&self, property_id: &str) -> bool {
        self.numeric_properties
            .contains(base_pid(property_id))
    }
}

/// Plain-text rendering: caption, tiles, then an aligned table.
impl<R> fmt::Display for StatsReport<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.caption)?;
        for tile in &self.tiles {
            writeln!(f, "{}: {}", tile.label, tile.value)?;
        }

        let mut header = vec!["Group".to_string(), "Count".to_string()];
        header.extend(self.columns.iter().map(|c| c.header.clone()));
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.label.clone(), row.count.to_string()];
                cells.extend(row.values.iter().map(ToString::to_string));
                cells
            })
            .collect();

        let widths: Vec<usize> = (0..header.len())
            .map(|i| {
                body.iter()
                    .map(|cells| cells[i].chars().count())
                    .chain(std::iter::once(header[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&header))?;
        writeln!(
            f,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-")
        )?;
        for cells in &body {
            writeln!(f, "{}", line(cells))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RenderOptions;
    use crate::pipeline::StatsPipeline;
    use crate::record::{Group, MapRecord};
    use crate::types::TopCount;
    use pretty_assertions::assert_eq;

    fn groups() -> Vec<Group<MapRecord>> {
        let record = |status: &str, owner: Option<&str>| {
            let r = MapRecord::new().with("status", status);
            match owner {
                Some(o) => r.with("owner", o),
                None => r,
            }
        };
        vec![
            Group::new(vec![
                record("open", Some("ann")),
                record("open", Some("ann")),
                record("open", Some("bo")),
                record("open", None),
            ])
            .with_value("open"),
            Group::new(vec![record("closed", Some("cy"))]).with_value("closed"),
        ]
    }

    #[test]
    fn test_breakdown_uses_options() {
        let groups = groups();
        let pipeline = StatsPipeline::builder()
            .options(RenderOptions::builder().chart_top_n(1).ignore_nulls(true).build())
            .build();
        let report = pipeline.render(&["owner".to_string()], &groups);

        let breakdown = report.breakdown(&report.rows[0], "owner");
        assert_eq!(
            breakdown.tops,
            vec![TopCount {
                label: "ann".into(),
                count: 2
            }]
        );
        assert_eq!(breakdown.others_total(), 1);
    }

    #[test]
    fn test_records_for_label() {
        let groups = groups();
        let pipeline = StatsPipeline::builder()
            .options(RenderOptions::builder().group_by("status").build())
            .build();
        let report = pipeline.render(&[], &groups);
        assert_eq!(report.records_for(&report.rows[0], "open").len(), 4);
        assert!(report.records_for(&report.rows[1], "open").is_empty());
    }

    #[test]
    fn test_display_table() {
        let groups = groups();
        let report = StatsPipeline::default().render(&["status".to_string()], &groups);
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Groups: 2");
        assert!(lines[1].starts_with("Group  | Count | Status: open"));
        assert!(lines[3].starts_with("open   | 4     | 4"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_report_serialization() {
        let groups = groups();
        let report = StatsPipeline::default().render(&["status".to_string()], &groups);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["caption"], "Groups: 2");
        assert_eq!(json["rows"][0]["label"], "open");
        assert_eq!(json["rows"][0]["groupKey"], "open");
        assert!(json["rows"][0].get("records").is_none());
        assert_eq!(json["columns"][0]["header"], "Status: open");
    }
}
