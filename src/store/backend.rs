//! The record store contract
//!
//! Both backends implement [`RecordStore`] with identical observable
//! semantics; callers hold a store handle and never care which one it is.

use std::fmt;

use tracing::{info, warn};

use super::errors::{StoreError, StoreResult};
use super::query::Query;
use super::snapshot::{RestoreReport, Snapshot};
use crate::record::{Record, RecordField, RecordId, RecordParameters};
use crate::observability::RESTORE_TARGET;
use crate::validation::{RecordValidator, ValidationError};

/// Physical occupancy of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStat {
    /// Physical slots, visible or not
    pub total: usize,
    /// Slots holding soft-deleted records
    pub deleted: usize,
}

impl StoreStat {
    pub fn visible(&self) -> usize {
        self.total - self.deleted
    }
}

impl fmt::Display for StoreStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record(s), {} deleted", self.total, self.deleted)
    }
}

/// Operations shared by every backend.
pub trait RecordStore {
    /// Backend name, for logs and diagnostics.
    fn kind(&self) -> &'static str;

    /// The validator gating writes into this store.
    fn validator(&self) -> &dyn RecordValidator;

    /// Validates `params`, assigns the next id and stores the record.
    fn create(&mut self, params: &RecordParameters) -> StoreResult<RecordId>;

    /// Overwrites every field of the visible record `id`.
    ///
    /// Fails with `NotFound` if no visible record has that id.
    fn edit(&mut self, id: RecordId, params: &RecordParameters) -> StoreResult<()>;

    /// Upsert by explicit id: replaces the visible record with the same id,
    /// otherwise appends.
    fn insert(&mut self, record: Record) -> StoreResult<()>;

    /// Soft-deletes every visible record whose `field` equals `value`
    /// (case-insensitive). Returns the affected ids, possibly none.
    fn delete(&mut self, field: RecordField, value: &str) -> StoreResult<Vec<RecordId>>;

    /// Visible records selected by `query`, in storage order.
    fn search(&mut self, query: &Query) -> StoreResult<Vec<Record>>;

    /// The visible record with `id`.
    fn get(&self, id: RecordId) -> StoreResult<Option<Record>>;

    /// All visible records, in storage order.
    fn records(&self) -> StoreResult<Vec<Record>>;

    /// Reclaims soft-deleted storage. Returns the number of slots removed.
    fn purge(&mut self) -> StoreResult<usize>;

    fn stat(&self) -> StoreResult<StoreStat>;

    fn snapshot(&self) -> StoreResult<Snapshot> {
        Ok(Snapshot::new(self.records()?))
    }

    /// Assigns `(field, text)` pairs on every visible record matching
    /// `filter`.
    ///
    /// All resulting parameter sets are validated before the first write,
    /// so a rejected value leaves the store unchanged.
    fn update(
        &mut self,
        assignments: &[(RecordField, String)],
        filter: &Query,
    ) -> StoreResult<Vec<RecordId>> {
        if assignments.iter().any(|(field, _)| *field == RecordField::Id) {
            return Err(ValidationError::new(RecordField::Id, "id cannot be assigned").into());
        }

        let mut staged = Vec::new();
        for record in self.search(filter)? {
            let mut params = record.parameters();
            for (field, text) in assignments {
                field.assign(&mut params, text)?;
            }
            self.validator().validate(&params)?;
            staged.push((record.id, params));
        }

        for (id, params) in &staged {
            self.edit(*id, params)?;
        }
        Ok(staged.into_iter().map(|(id, _)| id).collect())
    }

    /// Upserts every valid record of `snapshot`.
    ///
    /// Invalid records are skipped and reported; any other error aborts.
    fn restore(&mut self, snapshot: &Snapshot) -> StoreResult<RestoreReport> {
        let mut report = RestoreReport::new();

        for record in snapshot.records() {
            let id = record.id;
            match self.insert(record.clone()) {
                Ok(()) => report.record_imported(id),
                Err(StoreError::Validation(e)) => {
                    warn!(
                        target: RESTORE_TARGET,
                        store = self.kind(),
                        id,
                        reason = %e,
                        "Skipping invalid record"
                    );
                    report.record_skipped(id, e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            target: RESTORE_TARGET,
            store = self.kind(),
            imported = report.imported().len(),
            skipped = report.skipped().len(),
            "Restore complete"
        );
        Ok(report)
    }
}

/// Rejects non-positive ids at the store boundary.
pub(crate) fn check_id(id: RecordId) -> StoreResult<()> {
    if id <= 0 {
        return Err(ValidationError::new(
            RecordField::Id,
            format!("must be greater than zero, got {}", id),
        )
        .into());
    }
    Ok(())
}

/// The id `create` hands out after `last_id`.
pub(crate) fn next_id(last_id: RecordId) -> StoreResult<RecordId> {
    last_id.checked_add(1).ok_or_else(|| {
        ValidationError::new(
            RecordField::Id,
            format!("no id left after {}", last_id),
        )
        .into()
    })
}
