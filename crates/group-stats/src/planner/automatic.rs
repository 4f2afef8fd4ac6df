//! Automatic mode: infer columns from the display properties.

use super::ColumnPlanner;
use crate::record::Record;
use crate::resolver::{base_pid, is_file_property};
use crate::types::{ColumnDefinition, OTHERS_LABEL};
use crate::utils::{is_missing_like, is_numeric_like, pretty_prop};
use std::collections::HashSet;
use tracing::debug;

impl<R: Record> ColumnPlanner<'_, R> {
    /// Classify each non-file property and emit its columns.
    ///
    /// Sum candidates are merged ahead of every other candidate and the merged
    /// list is cut at the column cap.
    pub(crate) fn plan_automatic(&self, properties: &[String]) -> Vec<ColumnDefinition> {
        let numeric_bases = self.numeric_bases(properties);
        let mut sums = Vec::new();
        let mut summed: HashSet<&str> = HashSet::new();
        let mut others = Vec::new();

        for pid in properties.iter().filter(|p| !is_file_property(p)) {
            let base = base_pid(pid);
            if numeric_bases.contains(base) || self.probe_is_numeric(pid) {
                if summed.insert(base) {
                    debug!("{}: numeric, sum column", pid);
                    sums.push(ColumnDefinition::default_sum(pid));
                } else {
                    debug!("{}: base {} already summed", pid, base);
                }
                continue;
            }

            let tops = self.non_missing_tops(pid);
            if self.profiler.is_link_like(pid) {
                debug!("{}: link-like, distinct and coverage columns", pid);
                others.push(ColumnDefinition::distinct(pid));
                others.extend(category_columns(pid, tops));
                others.push(ColumnDefinition::coverage(pid));
            } else {
                debug!("{}: categorical, top {:?}", pid, tops);
                others.extend(category_columns(pid, tops));
            }
        }

        let mut columns: Vec<ColumnDefinition> =
            sums.into_iter().chain(others).take(self.column_cap).collect();
        self.ensure_sum(properties, &numeric_bases, &mut columns);
        columns
    }

    /// Bases of non-file properties that sample as numeric.
    fn numeric_bases<'p>(&self, properties: &'p [String]) -> HashSet<&'p str> {
        properties
            .iter()
            .filter(|p| !is_file_property(p) && self.profiler.consider_numeric(p))
            .map(|p| base_pid(p))
            .collect()
    }

    /// Whether the probed top values are all numeric-looking or missing.
    fn probe_is_numeric(&self, property_id: &str) -> bool {
        let tops = self.profiler.top_n_values(property_id, self.probe_top_n);
        !tops.is_empty()
            && tops
                .iter()
                .all(|v| is_numeric_like(v) || is_missing_like(v))
    }

    fn non_missing_tops(&self, property_id: &str) -> Vec<String> {
        self.profiler
            .top_n_values(property_id, self.probe_top_n)
            .into_iter()
            .filter(|v| !is_missing_like(v))
            .collect()
    }

    /// Guarantee a sum column when the merged list has none.
    ///
    /// The first numeric-like property either replaces a count-by column on
    /// its base or is appended while room remains.
    fn ensure_sum(
        &self,
        properties: &[String],
        numeric_bases: &HashSet<&str>,
        columns: &mut Vec<ColumnDefinition>,
    ) {
        if columns.iter().any(ColumnDefinition::is_sum) {
            return;
        }
        let Some(pid) = properties.iter().find(|p| {
            !is_file_property(p) && (self.probe_is_numeric(p) || numeric_bases.contains(base_pid(p)))
        }) else {
            return;
        };

        let base = base_pid(pid);
        let sum = ColumnDefinition::default_sum(pid);
        match columns
            .iter()
            .position(|c| c.is_count_by() && c.base() == base)
        {
            Some(index) => columns[index] = sum,
            None if columns.len() < self.column_cap => columns.push(sum),
            None => debug!("No room for a sum column on {}", pid),
        }
    }
}

/// One count column per value plus an `Other` bucket over the same values.
fn category_columns(property_id: &str, tops: Vec<String>) -> Vec<ColumnDefinition> {
    if tops.is_empty() {
        return Vec::new();
    }
    let pretty = pretty_prop(property_id);
    let mut columns: Vec<ColumnDefinition> = tops
        .iter()
        .map(|value| {
            ColumnDefinition::count_label(property_id, format!("{pretty}: {value}"), value.as_str())
        })
        .collect();
    columns.push(ColumnDefinition::others_bucket(property_id, OTHERS_LABEL, tops));
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Group, MapRecord};
    use crate::types::ColumnKind;
    use crate::value::RawValue;
    use pretty_assertions::assert_eq;

    fn props(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_link_like_property_columns() {
        let values = ["[[Alpha]]", "[[Alpha]]", "[[Beta]]", ""];
        let records = values
            .iter()
            .map(|v| MapRecord::new().with("related", *v))
            .collect();
        let groups = vec![Group::new(records)];
        let planner = ColumnPlanner::new(&groups);

        let columns = planner.plan_automatic(&props(&["related"]));
        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(
            headers,
            vec![
                "Distinct Related",
                "Related: [[Alpha]]",
                "Related: [[Beta]]",
                "Other",
                "Related Coverage (%)"
            ]
        );
        assert_eq!(
            columns[3].kind,
            ColumnKind::CountBy {
                values: vec!["[[Alpha]]".into(), "[[Beta]]".into()],
                others_bucket: Some("Other".into()),
            }
        );
    }

    #[test]
    fn test_probe_detects_numeric_strings() {
        // Numeric-looking labels mixed with blanks: the sample says numeric too,
        // but the probe alone must already decide it.
        let values = ["10", "20", "", "null"];
        let records = values
            .iter()
            .map(|v| MapRecord::new().with("score", *v))
            .collect();
        let groups = vec![Group::new(records)];
        let planner = ColumnPlanner::new(&groups);
        assert!(planner.probe_is_numeric("score"));
        assert_eq!(planner.plan_automatic(&props(&["score"]))[0].header, "Sum(Score)");
    }

    #[test]
    fn test_one_sum_per_base_across_prefixes() {
        let records = vec![
            MapRecord::new().with("amount", 3).with("status", "open"),
            MapRecord::new().with("amount", "1,200").with("status", "closed"),
        ];
        let groups = vec![Group::new(records)];
        let planner = ColumnPlanner::new(&groups).with_column_cap(4);
        let columns = planner.plan_automatic(&props(&["amount", "note.amount", "status"]));

        let sums: Vec<&str> = columns
            .iter()
            .filter(|c| c.is_sum())
            .map(|c| c.property_id.as_str())
            .collect();
        assert_eq!(sums, vec!["amount"]);
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[3].header, "Other");
    }

    #[test]
    fn test_file_properties_and_missing_only_values() {
        let records = vec![
            MapRecord::new().with("file.size", 10).with("blank", RawValue::Null),
            MapRecord::new().with("file.size", 12).with("blank", ""),
        ];
        let groups = vec![Group::new(records)];
        let planner = ColumnPlanner::new(&groups);
        let columns = planner.plan_automatic(&props(&["file.size", "blank"]));
        // "blank" probes as all-missing, which counts as numeric-or-missing.
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].property_id, "blank");
        assert!(columns[0].is_sum());
    }

    #[test]
    fn test_ensure_sum_replaces_count_by_on_same_base() {
        let groups: Vec<Group<MapRecord>> = vec![Group::new(vec![
            MapRecord::new().with("hours", 4),
            MapRecord::new().with("hours", 6),
        ])];
        let planner = ColumnPlanner::new(&groups);
        let hours_props = props(&["hours"]);
        let numeric_bases = planner.numeric_bases(&hours_props);
        let mut columns = vec![
            ColumnDefinition::count_label("note.hours", "Hours: 4", "4"),
            ColumnDefinition::count_label("status", "Status: open", "open"),
        ];
        planner.ensure_sum(&props(&["hours"]), &numeric_bases, &mut columns);
        assert_eq!(columns[0], ColumnDefinition::default_sum("hours"));
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_ensure_sum_appends_while_room_remains() {
        let groups: Vec<Group<MapRecord>> =
            vec![Group::new(vec![MapRecord::new().with("hours", 4)])];
        let planner = ColumnPlanner::new(&groups).with_column_cap(2);
        let hours_props = props(&["hours"]);
        let numeric_bases = planner.numeric_bases(&hours_props);

        let mut columns = vec![ColumnDefinition::distinct("owner")];
        planner.ensure_sum(&props(&["hours"]), &numeric_bases, &mut columns);
        assert_eq!(columns.len(), 2);
        assert!(columns[1].is_sum());

        let mut full = vec![
            ColumnDefinition::distinct("owner"),
            ColumnDefinition::coverage("owner"),
        ];
        planner.ensure_sum(&props(&["hours"]), &numeric_bases, &mut full);
        assert!(!full.iter().any(ColumnDefinition::is_sum));
    }
}
