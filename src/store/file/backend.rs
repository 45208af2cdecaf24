//! File-backed record store
//!
//! One file of fixed-size slots (see [`super::slot`]). Creates append at
//! the end of the file, edits overwrite in place, deletes flip the slot's
//! deleted byte. Nothing is cached: every lookup rescans the file.
//!
//! # Durability
//!
//! Every mutation is followed by `sync_data` before it returns.

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::reader::{check_length, SlotReader};
use super::slot::{Slot, DELETED_OFFSET, SLOT_SIZE};
use crate::observability::FILE_TARGET as TARGET;
use crate::record::{Record, RecordField, RecordId, RecordParameters};
use crate::store::backend::{check_id, next_id, RecordStore, StoreStat};
use crate::store::errors::{StoreError, StoreResult};
use crate::store::query::{Predicate, Query, QueryEvaluator, ScanSource};
use crate::validation::RecordValidator;

/// Record store persisted as fixed-size slots in a single file.
pub struct FileBackend {
    path: PathBuf,
    file: File,
    validator: Box<dyn RecordValidator>,
    /// Largest id found in any slot or assigned since open
    last_id: RecordId,
}

impl FileBackend {
    /// Opens the store at `path`, creating an empty file if missing.
    ///
    /// Every slot is checked once on open: a partial trailing slot or a
    /// corrupt deleted flag fails with `MalformedStore`.
    pub fn open(
        path: impl AsRef<Path>,
        validator: impl RecordValidator + 'static,
    ) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| {
                StoreError::io(format!("Failed to open store file: {}", path.display()), e)
            })?;

        let mut last_id = 0;
        let mut total = 0;
        let mut deleted = 0;
        {
            let mut reader = SlotReader::open(&file)?;
            while let Some((offset, slot)) = reader.read_next()? {
                total += 1;
                if slot.is_deleted(offset)? {
                    deleted += 1;
                }
                last_id = last_id.max(slot.id());
            }
        }

        info!(
            target: TARGET,
            path = %path.display(),
            total,
            deleted,
            last_id,
            "Store file opened"
        );

        Ok(Self {
            path,
            file,
            validator: Box::new(validator),
            last_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file length in bytes.
    pub fn file_len(&self) -> StoreResult<u64> {
        let len = self
            .file
            .metadata()
            .map_err(|e| StoreError::io("Failed to read store metadata", e))?
            .len();
        check_length(len)?;
        Ok(len)
    }

    /// Visible records paired with their slot offsets, in slot order.
    fn visible(&self) -> StoreResult<Vec<(u64, Record)>> {
        let mut reader = SlotReader::open(&self.file)?;
        let mut visible = Vec::new();
        while let Some((offset, slot)) = reader.read_next()? {
            if !slot.is_deleted(offset)? {
                visible.push((offset, slot.decode(offset)?));
            }
        }
        Ok(visible)
    }

    /// Offset of the visible slot holding `id`. Only the id and deleted
    /// flag are read; the rest of each slot is left undecoded.
    fn locate(&self, id: RecordId) -> StoreResult<Option<u64>> {
        let mut reader = SlotReader::open(&self.file)?;
        while let Some((offset, slot)) = reader.read_next()? {
            if slot.id() == id && !slot.is_deleted(offset)? {
                return Ok(Some(offset));
            }
        }
        Ok(None)
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> StoreResult<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| StoreError::io(format!("Failed to seek to byte offset {}", offset), e))?;
        self.file
            .write_all(bytes)
            .map_err(|e| StoreError::io(format!("Failed to write at byte offset {}", offset), e))
    }

    fn sync(&self) -> StoreResult<()> {
        self.file
            .sync_data()
            .map_err(|e| StoreError::io("fsync failed on store file", e))
    }

    fn write_slot(&mut self, offset: u64, record: &Record) -> StoreResult<()> {
        let slot = Slot::encode(record, false)?;
        self.write_at(offset, slot.as_bytes())?;
        self.sync()
    }

    fn append(&mut self, record: &Record) -> StoreResult<()> {
        let offset = self.file_len()?;
        self.write_slot(offset, record)?;
        self.last_id = self.last_id.max(record.id);
        Ok(())
    }
}

impl RecordStore for FileBackend {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn validator(&self) -> &dyn RecordValidator {
        self.validator.as_ref()
    }

    fn create(&mut self, params: &RecordParameters) -> StoreResult<RecordId> {
        self.validator.validate(params)?;

        let id = next_id(self.last_id)?;
        self.append(&Record::new(id, params.clone()))?;

        debug!(target: TARGET, id, "Record created");
        Ok(id)
    }

    fn edit(&mut self, id: RecordId, params: &RecordParameters) -> StoreResult<()> {
        self.validator.validate(params)?;

        let offset = self.locate(id)?.ok_or(StoreError::not_found(id))?;
        self.write_slot(offset, &Record::new(id, params.clone()))?;

        debug!(target: TARGET, id, offset, "Record edited");
        Ok(())
    }

    fn insert(&mut self, record: Record) -> StoreResult<()> {
        check_id(record.id)?;
        self.validator.validate(&record.parameters())?;

        let id = record.id;
        match self.locate(id)? {
            Some(offset) => {
                self.write_slot(offset, &record)?;
                self.last_id = self.last_id.max(id);
                debug!(target: TARGET, id, offset, "Record replaced");
            }
            None => {
                self.append(&record)?;
                debug!(target: TARGET, id, "Record inserted");
            }
        }
        Ok(())
    }

    fn delete(&mut self, field: RecordField, value: &str) -> StoreResult<Vec<RecordId>> {
        let predicate = Predicate::new(field, value);
        let targets: Vec<(u64, RecordId)> = self
            .visible()?
            .into_iter()
            .filter(|(_, record)| predicate.matches(record))
            .map(|(offset, record)| (offset, record.id))
            .collect();

        for (offset, _) in &targets {
            self.write_at(offset + DELETED_OFFSET as u64, &[1])?;
        }
        if !targets.is_empty() {
            self.sync()?;
        }

        let deleted: Vec<RecordId> = targets.into_iter().map(|(_, id)| id).collect();
        debug!(target: TARGET, %field, value, count = deleted.len(), "Records soft-deleted");
        Ok(deleted)
    }

    fn search(&mut self, query: &Query) -> StoreResult<Vec<Record>> {
        let records: Vec<Record> = self.visible()?.into_iter().map(|(_, r)| r).collect();
        let ids: BTreeSet<RecordId> = QueryEvaluator::evaluate(&ScanSource::new(&records), query);

        Ok(QueryEvaluator::select(&records, &ids)
            .into_iter()
            .cloned()
            .collect())
    }

    fn get(&self, id: RecordId) -> StoreResult<Option<Record>> {
        Ok(self
            .visible()?
            .into_iter()
            .map(|(_, record)| record)
            .find(|record| record.id == id))
    }

    fn records(&self) -> StoreResult<Vec<Record>> {
        Ok(self.visible()?.into_iter().map(|(_, r)| r).collect())
    }

    /// Rewrites the file with only the visible slots, in their current
    /// order, then truncates it.
    fn purge(&mut self) -> StoreResult<usize> {
        let physical = (self.file_len()? / SLOT_SIZE as u64) as usize;
        let visible = self.visible()?;
        let removed = physical - visible.len();
        if removed == 0 {
            return Ok(0);
        }

        for (slot_index, (_, record)) in visible.iter().enumerate() {
            let slot = Slot::encode(record, false)?;
            self.write_at((slot_index * SLOT_SIZE) as u64, slot.as_bytes())?;
        }
        self.file
            .set_len((visible.len() * SLOT_SIZE) as u64)
            .map_err(|e| StoreError::io("Failed to truncate store file", e))?;
        self.sync()?;

        info!(
            target: TARGET,
            removed,
            remaining = visible.len(),
            "Store file compacted"
        );
        Ok(removed)
    }

    fn stat(&self) -> StoreResult<StoreStat> {
        let mut reader = SlotReader::open(&self.file)?;
        let mut stat = StoreStat {
            total: reader.slot_count(),
            deleted: 0,
        };
        while let Some((offset, slot)) = reader.read_next()? {
            if slot.is_deleted(offset)? {
                stat.deleted += 1;
            }
        }
        Ok(stat)
    }
}
