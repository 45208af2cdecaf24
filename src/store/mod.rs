//! Record store subsystem
//!
//! Two backends behind one [`RecordStore`] contract:
//!
//! - [`MemoryBackend`]: a record list with first-name, last-name and
//!   date-of-birth indexes plus a search memoizer
//! - [`FileBackend`]: fixed-size binary slots with soft delete and
//!   compaction
//!
//! # Invariants
//!
//! - Every record written passes the store's validator first; a rejected
//!   write leaves the store unchanged
//! - Ids are unique among visible records and `create` never hands out an
//!   id at or below the largest id the store has seen
//! - Searches, `records` and snapshots return records in storage order
//! - A malformed store file is fatal (`CABINET_MALFORMED_STORE`)

mod backend;
mod errors;
pub mod file;
mod index;
mod memoizer;
mod memory;
mod query;
mod snapshot;

pub use backend::{RecordStore, StoreStat};
pub use errors::{Severity, StoreError, StoreResult};
pub use file::FileBackend;
pub use index::{RecordIndexes, SecondaryIndex};
pub use memoizer::{MemoStats, Memoizer};
pub use memory::MemoryBackend;
pub use query::{MatchSource, Predicate, Query, QueryEvaluator, ScanSource, SearchOperator};
pub use snapshot::{RestoreReport, SkippedRecord, Snapshot};
