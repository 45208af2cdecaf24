//! Snapshot and restore report types

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{Record, RecordId};

/// The visible record set of a store, materialized for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for Snapshot {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

/// A record left out of a restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: RecordId,
    pub reason: String,
}

/// Outcome of `restore`: what was imported and what was skipped, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    imported: Vec<RecordId>,
    skipped: Vec<SkippedRecord>,
}

impl RestoreReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_imported(&mut self, id: RecordId) {
        self.imported.push(id);
    }

    pub fn record_skipped(&mut self, id: RecordId, reason: impl Into<String>) {
        self.skipped.push(SkippedRecord {
            id,
            reason: reason.into(),
        });
    }

    pub fn imported(&self) -> &[RecordId] {
        &self.imported
    }

    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Human-readable summary.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record(s) imported, {} skipped",
            self.imported.len(),
            self.skipped.len()
        )?;
        for skipped in &self.skipped {
            write!(f, "\nrecord #{} skipped: {}", skipped.id, skipped.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_skipped_ids() {
        let mut report = RestoreReport::new();
        report.record_imported(1);
        report.record_imported(3);
        report.record_skipped(2, "invalid height: must be between 120 and 250, got 20");

        let summary = report.summary();
        assert!(summary.starts_with("2 record(s) imported, 1 skipped"));
        assert!(summary.contains("record #2 skipped: invalid height"));
    }

    #[test]
    fn test_empty_report() {
        let report = RestoreReport::new();
        assert_eq!(report.summary(), "0 record(s) imported, 0 skipped");
        assert!(report.imported().is_empty());
    }
}
