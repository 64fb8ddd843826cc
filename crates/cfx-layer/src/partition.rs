//! Hive-style partition grouping and directory naming.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use cfx_model::polars_utils::any_to_string;
use polars::prelude::{DataFrame, IdxSize};

use crate::error::{LayerError, Result};

/// Directory value used for null (or empty) partition values.
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// One partition: its values, in partition-column order, and the rows that
/// carry them, in frame order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionGroup {
    pub values: Vec<Option<String>>,
    pub rows: Vec<IdxSize>,
}

impl PartitionGroup {
    /// Relative directory of this partition, e.g. `region=Europe`.
    pub fn relative_dir(&self, columns: &[String]) -> PathBuf {
        columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| format!("{column}={}", partition_value(value.as_deref())))
            .collect()
    }
}

/// Render a partition value as a path segment.
///
/// `/`, `\`, `=`, `%` and control characters are percent-encoded so a value
/// can never introduce a new path component.
pub fn partition_value(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return HIVE_DEFAULT_PARTITION.to_string();
    };
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '/' | '\\' | '=' | '%') || ch.is_control() {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Check that every partition column exists in `frame`.
pub fn check_columns(frame: &DataFrame, columns: &[String]) -> Result<()> {
    for column in columns {
        if frame.column(column).is_err() {
            let available = frame
                .get_column_names()
                .iter()
                .map(|name| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(LayerError::MissingPartitionColumn {
                column: column.clone(),
                available,
            });
        }
    }
    Ok(())
}

/// Group rows by their partition directory.
///
/// Rows are keyed by the rendered path segments, so values that map to the
/// same directory (a null and an empty string, say) share one group. Groups
/// come back sorted by directory, so the same frame always produces the same
/// partitions in the same order.
pub fn group_rows(frame: &DataFrame, columns: &[String]) -> Result<Vec<PartitionGroup>> {
    check_columns(frame, columns)?;

    let series: Vec<_> = columns
        .iter()
        .map(|name| frame.column(name).map(|c| c.as_materialized_series().clone()))
        .collect::<std::result::Result<_, _>>()?;

    let mut groups: BTreeMap<Vec<String>, PartitionGroup> = BTreeMap::new();
    for row in 0..frame.height() {
        let mut values = Vec::with_capacity(series.len());
        for s in &series {
            values.push(any_to_string(s.get(row)?).filter(|v| !v.is_empty()));
        }
        let segments = values
            .iter()
            .map(|value| partition_value(value.as_deref()))
            .collect();
        groups
            .entry(segments)
            .or_insert_with(|| PartitionGroup {
                values,
                rows: Vec::new(),
            })
            .rows
            .push(row as IdxSize);
    }

    Ok(groups.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(partition_value(Some("Europe")), "Europe");
        assert_eq!(partition_value(Some("a/b=c")), "a%2Fb%3Dc");
        assert_eq!(partition_value(Some("50%\\")), "50%25%5C");
        assert_eq!(partition_value(Some("tab\there")), "tab%09here");
        assert_eq!(partition_value(Some("Åland")), "Åland");
    }

    #[test]
    fn null_and_empty_use_default_partition() {
        assert_eq!(partition_value(None), HIVE_DEFAULT_PARTITION);
        assert_eq!(partition_value(Some("")), HIVE_DEFAULT_PARTITION);
    }

    #[test]
    fn relative_dir_nests_columns() {
        let group = PartitionGroup {
            values: vec![Some("Americas".to_string()), None],
            rows: vec![0],
        };
        let dir = group.relative_dir(&["region".to_string(), "subregion".to_string()]);
        assert_eq!(
            dir,
            PathBuf::from("region=Americas").join("subregion=__HIVE_DEFAULT_PARTITION__")
        );
    }

    #[test]
    fn null_and_empty_values_share_one_group() {
        use polars::prelude::{NamedFrom, Series};

        let frame = DataFrame::new(vec![
            Series::new("region".into(), vec![None, Some(""), Some("Europe")]).into(),
        ])
        .unwrap();
        let groups = group_rows(&frame, &["region".to_string()]).unwrap();
        assert_eq!(groups.len(), 2);
        let default = groups
            .iter()
            .find(|group| group.values == vec![None])
            .unwrap();
        assert_eq!(default.rows, vec![0, 1]);
    }
}
