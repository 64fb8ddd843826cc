//! Data-quality report produced alongside every normalization.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::SchemaError;

/// What a normalization pass did to its input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub dataset: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub columns: usize,
    /// Rows removed, with the reason each was removed.
    #[serde(skip)]
    pub dropped: Vec<SchemaError>,
    /// Problems that did not remove the row (ignored values).
    #[serde(skip)]
    pub warnings: Vec<SchemaError>,
    pub dropped_by_kind: BTreeMap<String, usize>,
    pub defaulted_region: usize,
    pub defaulted_subregion: usize,
    pub unresolved_currency: usize,
    pub multi_currency: usize,
    pub null_counts: BTreeMap<String, usize>,
}

impl NormalizationReport {
    pub fn new(dataset: impl Into<String>, input_rows: usize) -> Self {
        Self {
            dataset: dataset.into(),
            input_rows,
            ..Self::default()
        }
    }

    pub(crate) fn drop_row(&mut self, error: SchemaError) {
        *self
            .dropped_by_kind
            .entry(error.kind().to_string())
            .or_default() += 1;
        self.dropped.push(error);
    }

    pub(crate) fn warn(&mut self, error: SchemaError) {
        self.warnings.push(error);
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Number of dropped rows of one kind (see [`SchemaError::kind`]).
    pub fn dropped_of(&self, kind: &str) -> usize {
        self.dropped_by_kind.get(kind).copied().unwrap_or(0)
    }

    /// Emit the report through `tracing`.
    pub fn log(&self) {
        info!(
            dataset = %self.dataset,
            input_rows = self.input_rows,
            output_rows = self.output_rows,
            dropped = self.dropped.len(),
            defaulted_region = self.defaulted_region,
            unresolved_currency = self.unresolved_currency,
            multi_currency = self.multi_currency,
            "normalized"
        );
        for error in &self.dropped {
            warn!(dataset = %self.dataset, kind = error.kind(), "dropped {error}");
        }
        for error in &self.warnings {
            tracing::debug!(dataset = %self.dataset, kind = error.kind(), "{error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_rows_are_counted_by_kind() {
        let mut report = NormalizationReport::new("countries", 3);
        report.drop_row(SchemaError::Unidentifiable { row: 0 });
        report.drop_row(SchemaError::Unidentifiable { row: 2 });
        assert_eq!(report.dropped_count(), 2);
        assert_eq!(report.dropped_of("unidentifiable"), 2);
        assert_eq!(report.dropped_of("duplicate_code"), 0);
    }
}
