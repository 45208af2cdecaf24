//! In-memory record store
//!
//! Owns a list of records plus three secondary indexes (first name, last
//! name, date of birth) and a search memoizer.
//!
//! # Invariants
//!
//! - Indexes and memoizer reflect exactly the current record list; every
//!   mutation updates the indexes and clears the memoizer before returning
//! - Deletion is eager: a deleted record leaves the list and every index at
//!   once, so there is never a lingering deleted slot to purge

use std::collections::BTreeSet;

use tracing::debug;

use super::backend::{check_id, next_id, RecordStore, StoreStat};
use super::errors::{StoreError, StoreResult};
use super::index::RecordIndexes;
use super::memoizer::{MemoStats, Memoizer};
use super::query::{MatchSource, Predicate, Query, QueryEvaluator, ScanSource};
use crate::observability::MEMORY_TARGET as TARGET;
use crate::record::{normalize, Record, RecordField, RecordId, RecordParameters};
use crate::validation::RecordValidator;

/// Record store held entirely in memory.
pub struct MemoryBackend {
    records: Vec<Record>,
    indexes: RecordIndexes,
    memo: Memoizer,
    validator: Box<dyn RecordValidator>,
    /// Largest id ever assigned or inserted
    last_id: RecordId,
}

impl MemoryBackend {
    pub fn new(validator: impl RecordValidator + 'static) -> Self {
        Self {
            records: Vec::new(),
            indexes: RecordIndexes::new(),
            memo: Memoizer::new(),
            validator: Box::new(validator),
            last_id: 0,
        }
    }

    /// Number of visible records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Memoizer statistics.
    pub fn memo_stats(&self) -> MemoStats {
        self.memo.stats()
    }

    /// Number of cached search results.
    pub fn cached_queries(&self) -> usize {
        self.memo.len()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Replaces the fields of the record at `pos`, re-indexing it.
    fn overwrite(&mut self, pos: usize, params: RecordParameters) {
        self.indexes.remove(&self.records[pos]);
        self.records[pos].apply(params);
        self.indexes.add(&self.records[pos]);
    }

    fn append(&mut self, record: Record) {
        self.last_id = self.last_id.max(record.id);
        self.indexes.add(&record);
        self.records.push(record);
    }

    fn cloned(&self, ids: &BTreeSet<RecordId>) -> Vec<Record> {
        QueryEvaluator::select(&self.records, ids)
            .into_iter()
            .cloned()
            .collect()
    }
}

impl MatchSource for MemoryBackend {
    fn all_ids(&self) -> BTreeSet<RecordId> {
        self.records.iter().map(|r| r.id).collect()
    }

    fn matching_ids(&self, predicate: &Predicate) -> BTreeSet<RecordId> {
        match self.indexes.get(predicate.field) {
            Some(index) => index
                .lookup(&normalize(&predicate.value))
                .iter()
                .copied()
                .collect(),
            None => ScanSource::new(&self.records).matching_ids(predicate),
        }
    }
}

impl RecordStore for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn validator(&self) -> &dyn RecordValidator {
        self.validator.as_ref()
    }

    fn create(&mut self, params: &RecordParameters) -> StoreResult<RecordId> {
        self.validator.validate(params)?;

        let id = next_id(self.last_id)?;
        self.append(Record::new(id, params.clone()));
        self.memo.clear();

        debug!(target: TARGET, id, "Record created");
        Ok(id)
    }

    fn edit(&mut self, id: RecordId, params: &RecordParameters) -> StoreResult<()> {
        self.validator.validate(params)?;

        let pos = self.position(id).ok_or(StoreError::not_found(id))?;
        self.overwrite(pos, params.clone());
        self.memo.clear();

        debug!(target: TARGET, id, "Record edited");
        Ok(())
    }

    fn insert(&mut self, record: Record) -> StoreResult<()> {
        check_id(record.id)?;
        let params = record.parameters();
        self.validator.validate(&params)?;

        let id = record.id;
        match self.position(id) {
            Some(pos) => {
                self.overwrite(pos, params);
                self.last_id = self.last_id.max(id);
                debug!(target: TARGET, id, "Record replaced");
            }
            None => {
                self.append(record);
                debug!(target: TARGET, id, "Record inserted");
            }
        }
        self.memo.clear();
        Ok(())
    }

    fn delete(&mut self, field: RecordField, value: &str) -> StoreResult<Vec<RecordId>> {
        let matched = self.matching_ids(&Predicate::new(field, value));

        let mut deleted = Vec::with_capacity(matched.len());
        let indexes = &mut self.indexes;
        self.records.retain(|record| {
            if matched.contains(&record.id) {
                indexes.remove(record);
                deleted.push(record.id);
                false
            } else {
                true
            }
        });
        self.memo.clear();

        debug!(target: TARGET, %field, value, count = deleted.len(), "Records deleted");
        Ok(deleted)
    }

    fn search(&mut self, query: &Query) -> StoreResult<Vec<Record>> {
        if let Some(ids) = self.memo.get(query) {
            let ids: BTreeSet<RecordId> = ids.iter().copied().collect();
            debug!(target: TARGET, hits = ids.len(), "Search served from memoizer");
            return Ok(self.cloned(&ids));
        }

        let ids = QueryEvaluator::evaluate(&*self, query);
        self.memo.put(query, ids.iter().copied().collect());
        Ok(self.cloned(&ids))
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<Record>> {
        Ok(self.position(id).map(|pos| self.records[pos].clone()))
    }

    fn records(&self) -> StoreResult<Vec<Record>> {
        Ok(self.records.clone())
    }

    /// Nothing to reclaim: deletion already removed the records.
    fn purge(&mut self) -> StoreResult<usize> {
        Ok(0)
    }

    fn stat(&self) -> StoreResult<StoreStat> {
        Ok(StoreStat {
            total: self.records.len(),
            deleted: 0,
        })
    }
}
