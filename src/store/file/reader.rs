//! Sequential slot reader
//!
//! Every lookup on the file store is a full scan; this reader walks the
//! slots front to back through a buffered handle borrowed from the store.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};

use super::slot::{Slot, SLOT_SIZE};
use crate::store::errors::{StoreError, StoreResult};

/// Buffered front-to-back reader over the slots of a store file.
pub struct SlotReader<'a> {
    reader: BufReader<&'a File>,
    current_offset: u64,
    file_size: u64,
}

impl<'a> SlotReader<'a> {
    /// Positions a reader at the first slot.
    ///
    /// Fails with `MalformedStore` if the file length is not a whole number
    /// of slots.
    pub fn open(file: &'a File) -> StoreResult<Self> {
        let file_size = file
            .metadata()
            .map_err(|e| StoreError::io("Failed to read store metadata", e))?
            .len();
        check_length(file_size)?;

        let mut handle = file;
        handle
            .seek(SeekFrom::Start(0))
            .map_err(|e| StoreError::io("Failed to rewind store file", e))?;

        Ok(Self {
            reader: BufReader::new(handle),
            current_offset: 0,
            file_size,
        })
    }

    /// Number of slots in the file.
    pub fn slot_count(&self) -> usize {
        (self.file_size / SLOT_SIZE as u64) as usize
    }

    /// Reads the next slot with its byte offset, or `None` at end of file.
    pub fn read_next(&mut self) -> StoreResult<Option<(u64, Slot)>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let offset = self.current_offset;
        let mut bytes = [0u8; SLOT_SIZE];
        self.reader.read_exact(&mut bytes).map_err(|e| {
            StoreError::io(format!("Failed to read slot at byte offset {}", offset), e)
        })?;
        self.current_offset += SLOT_SIZE as u64;

        Ok(Some((offset, Slot::from_bytes(bytes))))
    }
}

/// Rejects a file length that is not a multiple of the slot size.
pub fn check_length(len: u64) -> StoreResult<()> {
    let rem = len % SLOT_SIZE as u64;
    if rem != 0 {
        return Err(StoreError::malformed_at(
            len - rem,
            format!(
                "file length {} is not a multiple of the {}-byte slot size",
                len, SLOT_SIZE
            ),
        ));
    }
    Ok(())
}
