//! Final column filtering shared by both planning modes.

use super::ColumnPlanner;
use crate::record::Record;
use crate::types::{ColumnDefinition, ColumnKind};
use crate::utils::is_numeric_like;
use std::collections::HashSet;
use tracing::debug;

impl<R: Record> ColumnPlanner<'_, R> {
    /// Drop repeated sums and count-by columns that would describe a numeric
    /// property.
    ///
    /// Only the first sum column per base is kept. A count-by column is
    /// dropped when its base already has a sum column, when its property
    /// samples as numeric, when any record holds a numeric value for it, or
    /// when all of its values look numeric. Other columns pass through in
    /// order.
    pub fn sanitize(&self, columns: Vec<ColumnDefinition>) -> Vec<ColumnDefinition> {
        let sum_bases: HashSet<String> = columns
            .iter()
            .filter(|c| c.is_sum())
            .map(|c| c.base().to_string())
            .collect();
        let mut summed: HashSet<String> = HashSet::new();

        columns
            .into_iter()
            .filter(|column| {
                let reason = if column.is_sum() {
                    (!summed.insert(column.base().to_string())).then_some("base already summed")
                } else {
                    self.drop_reason(column, &sum_bases)
                };
                match reason {
                    Some(reason) => {
                        debug!("Dropping column '{}': {}", column.header, reason);
                        false
                    }
                    None => true,
                }
            })
            .collect()
    }

    fn drop_reason(
        &self,
        column: &ColumnDefinition,
        sum_bases: &HashSet<String>,
    ) -> Option<&'static str> {
        let ColumnKind::CountBy { values, .. } = &column.kind else {
            return None;
        };
        let pid = column.property_id.as_str();

        if sum_bases.contains(column.base()) {
            Some("base already summed")
        } else if self.profiler.consider_numeric(pid) {
            Some("property is numeric")
        } else if self.profiler.has_numeric_sample(pid) {
            Some("property has numeric values")
        } else if !values.is_empty() && values.iter().all(|v| is_numeric_like(v)) {
            Some("values are numeric")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Group, MapRecord};
    use pretty_assertions::assert_eq;

    fn groups() -> Vec<Group<MapRecord>> {
        vec![Group::new(vec![
            MapRecord::new().with("status", "open").with("code", "A1"),
            MapRecord::new().with("status", "closed").with("code", "17"),
            MapRecord::new().with("status", "open").with("code", "B2"),
            MapRecord::new().with("status", "open").with("code", "C3"),
            MapRecord::new().with("status", "open").with("code", "D4"),
            MapRecord::new().with("status", "open").with("code", "E5"),
        ])]
    }

    #[test]
    fn test_keeps_categorical_and_non_count_columns() {
        let groups = groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = vec![
            ColumnDefinition::count_label("status", "Status: open", "open"),
            ColumnDefinition::distinct("code"),
            ColumnDefinition::coverage("code"),
            ColumnDefinition::missing_rate("status"),
        ];
        assert_eq!(planner.sanitize(columns.clone()), columns);
    }

    #[test]
    fn test_drops_count_by_on_summed_base() {
        let groups = groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = vec![
            ColumnDefinition::count_label("note.status", "Status: open", "open"),
            ColumnDefinition::default_sum("status"),
        ];
        let sanitized = planner.sanitize(columns);
        assert_eq!(sanitized, vec![ColumnDefinition::default_sum("status")]);
    }

    #[test]
    fn test_keeps_first_sum_per_base() {
        let groups = groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = vec![
            ColumnDefinition::sum("amount", "Total"),
            ColumnDefinition::default_sum("note.amount"),
            ColumnDefinition::default_sum("hours"),
            ColumnDefinition::default_sum("formula.amount"),
        ];
        let sanitized = planner.sanitize(columns);
        let headers: Vec<&str> = sanitized.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Total", "Sum(Hours)"]);
    }

    #[test]
    fn test_drops_count_by_with_any_numeric_sample() {
        // One numeric code out of six: not numeric by sampling, but still dropped.
        let groups = groups();
        let planner = ColumnPlanner::new(&groups);
        assert!(!planner.profiler().consider_numeric("code"));
        let columns = vec![ColumnDefinition::count_label("code", "Code: A1", "A1")];
        assert!(planner.sanitize(columns).is_empty());
    }

    #[test]
    fn test_drops_numeric_looking_values() {
        let groups = groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = vec![
            ColumnDefinition::count_label("priority", "Priority: 1", "1"),
            ColumnDefinition::others_bucket("priority", "Other", vec!["1".into(), "2,000".into()]),
            ColumnDefinition::count_label("priority", "Priority: high", "high"),
        ];
        let sanitized = planner.sanitize(columns);
        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].header, "Priority: high");
    }
}
