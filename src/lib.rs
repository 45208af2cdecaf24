//! filecabinet - person records behind one store contract
//!
//! Records are validated on every write and kept either in memory (with
//! secondary indexes and a search memoizer) or in a file of fixed-size
//! binary slots with soft delete and compaction.
//!
//! ```no_run
//! use filecabinet::store::{FileBackend, Query, RecordStore};
//! use filecabinet::validation::{ValidationPipeline, ValidationRules};
//!
//! let rules = ValidationRules::default_rules();
//! let mut store = FileBackend::open("cabinet.db", ValidationPipeline::from_rules(&rules))?;
//! let everyone = store.search(&Query::all())?;
//! # Ok::<(), filecabinet::store::StoreError>(())
//! ```

pub mod cli;
pub mod codec;
pub mod observability;
pub mod record;
pub mod store;
pub mod validation;
