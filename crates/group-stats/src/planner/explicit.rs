//! Explicit mode: expand configured column entries.

use super::ColumnPlanner;
use crate::config::ColumnSpec;
use crate::record::Record;
use crate::resolver::base_pid;
use crate::types::ColumnDefinition;
use crate::utils::pretty_prop;
use std::collections::HashSet;
use tracing::debug;

impl<R: Record> ColumnPlanner<'_, R> {
    /// Expand `specs` in order, then promote numeric fields to leading sums.
    ///
    /// A count-by entry without explicit values uses the top `top_n` labels.
    /// An entry with neither values nor `top_n`, or whose top labels come up
    /// empty, emits nothing.
    pub(crate) fn plan_explicit(&self, specs: &[ColumnSpec]) -> Vec<ColumnDefinition> {
        let mut columns = Vec::new();

        for spec in specs {
            match spec {
                ColumnSpec::Sum { field, label } => columns.push(match label {
                    Some(label) => ColumnDefinition::sum(field.as_str(), label.as_str()),
                    None => ColumnDefinition::default_sum(field),
                }),
                ColumnSpec::CountBy {
                    field,
                    label,
                    others_bucket,
                    values,
                    top_n,
                } => {
                    let values = match (values.is_empty(), top_n) {
                        (false, _) => values.clone(),
                        (true, Some(n)) => self.profiler.top_n_values(field, *n),
                        (true, None) => Vec::new(),
                    };
                    if values.is_empty() {
                        debug!("countBy({}) has no values, skipped", field);
                        continue;
                    }

                    let prefix = label.clone().unwrap_or_else(|| pretty_prop(field));
                    for value in &values {
                        columns.push(ColumnDefinition::count_label(
                            field.as_str(),
                            format!("{prefix}: {value}"),
                            value.as_str(),
                        ));
                    }
                    if let Some(bucket) = others_bucket {
                        columns.push(ColumnDefinition::others_bucket(
                            field.as_str(),
                            bucket.as_str(),
                            values,
                        ));
                    }
                }
            }
        }

        self.promote_numeric(specs, &mut columns);
        columns
    }

    /// Prepend a default sum for every referenced field that samples as
    /// numeric and has no sum for its base yet.
    fn promote_numeric(&self, specs: &[ColumnSpec], columns: &mut Vec<ColumnDefinition>) {
        let mut sum_bases: HashSet<String> = columns
            .iter()
            .filter(|c| c.is_sum())
            .map(|c| c.base().to_string())
            .collect();
        let mut seen: HashSet<&str> = HashSet::new();

        for field in specs.iter().map(ColumnSpec::field) {
            if !seen.insert(field) {
                continue;
            }
            let base = base_pid(field);
            if sum_bases.contains(base) || !self.profiler.consider_numeric(field) {
                continue;
            }
            debug!("Promoting {} to a sum column", field);
            columns.insert(0, ColumnDefinition::default_sum(field));
            sum_bases.insert(base.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Group, MapRecord};
    use crate::types::ColumnKind;
    use pretty_assertions::assert_eq;

    fn status_groups() -> Vec<Group<MapRecord>> {
        let records = ["open", "open", "closed", "open", "review"]
            .iter()
            .map(|s| MapRecord::new().with("status", *s).with("hours", 2))
            .collect();
        vec![Group::new(records)]
    }

    fn count_by(field: &str, values: &[&str], top_n: Option<usize>, others: Option<&str>) -> ColumnSpec {
        ColumnSpec::CountBy {
            field: field.into(),
            label: None,
            others_bucket: others.map(str::to_string),
            values: values.iter().map(|s| s.to_string()).collect(),
            top_n,
        }
    }

    #[test]
    fn test_count_by_with_top_n_and_others() {
        let groups = status_groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = planner.plan_explicit(&[count_by("status", &[], Some(2), Some("Rest"))]);

        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Status: open", "Status: closed", "Rest"]);
        assert_eq!(
            columns[2].kind,
            ColumnKind::CountBy {
                values: vec!["open".into(), "closed".into()],
                others_bucket: Some("Rest".into()),
            }
        );
    }

    #[test]
    fn test_explicit_values_and_label() {
        let groups = status_groups();
        let planner = ColumnPlanner::new(&groups);
        let spec = ColumnSpec::CountBy {
            field: "status".into(),
            label: Some("State".into()),
            others_bucket: None,
            values: vec!["review".into()],
            top_n: Some(5),
        };
        let columns = planner.plan_explicit(&[spec]);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].header, "State: review");
    }

    #[test]
    fn test_sum_label_and_default_header() {
        let groups = status_groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = planner.plan_explicit(&[
            ColumnSpec::Sum {
                field: "hours".into(),
                label: Some("Total hours".into()),
            },
            ColumnSpec::Sum {
                field: "note.cost".into(),
                label: None,
            },
        ]);
        assert_eq!(columns[0].header, "Total hours");
        assert_eq!(columns[1].header, "Sum(Cost)");
    }

    #[test]
    fn test_numeric_fields_are_promoted_once() {
        let groups = status_groups();
        let planner = ColumnPlanner::new(&groups);
        let columns = planner.plan_explicit(&[
            count_by("status", &["open"], None, None),
            count_by("hours", &["2"], None, None),
            count_by("note.hours", &["3"], None, None),
        ]);
        assert_eq!(columns[0].header, "Sum(Hours)");
        assert_eq!(columns.iter().filter(|c| c.is_sum()).count(), 1);
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn test_count_by_without_values_or_top_n_emits_nothing() {
        let groups = status_groups();
        let planner = ColumnPlanner::new(&groups);
        assert!(planner
            .plan_explicit(&[count_by("status", &[], None, Some("Other"))])
            .is_empty());
    }

    #[test]
    fn test_count_by_without_values_on_empty_data() {
        let groups: Vec<Group<MapRecord>> = Vec::new();
        let planner = ColumnPlanner::new(&groups);
        assert!(planner
            .plan_explicit(&[count_by("status", &[], Some(3), Some("Other"))])
            .is_empty());
    }
}
