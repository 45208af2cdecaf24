//! Slot-file backend
//!
//! Records live in fixed-size binary slots. Deletion is soft (a flag byte
//! per slot) and `purge` compacts the file.

mod backend;
mod reader;
pub mod slot;

pub use backend::FileBackend;
pub use reader::SlotReader;
pub use slot::{Slot, SLOT_SIZE};
