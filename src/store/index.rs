//! Secondary indexes for the memory store
//!
//! Each index maps a normalized field key to the ids of the records sharing
//! it. Indexes hold ids only; the record list stays the single owner of
//! record data. Id lists are kept sorted ascending and duplicate-free.

use std::collections::BTreeMap;

use crate::record::{normalize, Record, RecordField, RecordId};

/// One field index: normalized key -> sorted ids.
#[derive(Debug, Default)]
pub struct SecondaryIndex {
    tree: BTreeMap<String, Vec<RecordId>>,
}

impl SecondaryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id under `key`, keeping the id list sorted.
    pub fn insert(&mut self, key: String, id: RecordId) {
        let ids = self.tree.entry(key).or_default();
        if let Err(pos) = ids.binary_search(&id) {
            ids.insert(pos, id);
        }
    }

    /// Remove an id from `key`. Empty keys are dropped.
    pub fn remove(&mut self, key: &str, id: RecordId) {
        if let Some(ids) = self.tree.get_mut(key) {
            if let Ok(pos) = ids.binary_search(&id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                self.tree.remove(key);
            }
        }
    }

    /// Ids stored under `key`, ascending.
    pub fn lookup(&self, key: &str) -> &[RecordId] {
        self.tree.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.tree.len()
    }

    /// Total number of indexed ids.
    pub fn entry_count(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }
}

/// The three secondary indexes kept by the memory store.
#[derive(Debug, Default)]
pub struct RecordIndexes {
    first_name: SecondaryIndex,
    last_name: SecondaryIndex,
    date_of_birth: SecondaryIndex,
}

impl RecordIndexes {
    /// Fields answered from an index.
    pub const INDEXED: [RecordField; 3] = [
        RecordField::FirstName,
        RecordField::LastName,
        RecordField::DateOfBirth,
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `field`, if it is indexed.
    pub fn get(&self, field: RecordField) -> Option<&SecondaryIndex> {
        match field {
            RecordField::FirstName => Some(&self.first_name),
            RecordField::LastName => Some(&self.last_name),
            RecordField::DateOfBirth => Some(&self.date_of_birth),
            _ => None,
        }
    }

    fn get_mut(&mut self, field: RecordField) -> Option<&mut SecondaryIndex> {
        match field {
            RecordField::FirstName => Some(&mut self.first_name),
            RecordField::LastName => Some(&mut self.last_name),
            RecordField::DateOfBirth => Some(&mut self.date_of_birth),
            _ => None,
        }
    }

    /// Adds `record` to every index.
    pub fn add(&mut self, record: &Record) {
        for field in Self::INDEXED {
            let key = normalize(&field.render(record));
            if let Some(index) = self.get_mut(field) {
                index.insert(key, record.id);
            }
        }
    }

    /// Removes `record` from every index. Must be called with the field
    /// values the record was indexed under.
    pub fn remove(&mut self, record: &Record) {
        for field in Self::INDEXED {
            let key = normalize(&field.render(record));
            if let Some(index) = self.get_mut(field) {
                index.remove(&key, record.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordParameters, Salary};
    use chrono::NaiveDate;

    fn person(id: RecordId, first: &str, last: &str) -> Record {
        Record::new(
            id,
            RecordParameters::new(
                first,
                last,
                NaiveDate::from_ymd_opt(1992, 5, 17).unwrap(),
                175,
                Salary::from_units(10),
                'F',
            ),
        )
    }

    #[test]
    fn test_insert_keeps_sorted_unique() {
        let mut index = SecondaryIndex::new();
        index.insert("jo".into(), 5);
        index.insert("jo".into(), 2);
        index.insert("jo".into(), 9);
        index.insert("jo".into(), 2);

        assert_eq!(index.lookup("jo"), &[2, 5, 9]);
        assert_eq!(index.entry_count(), 3);
    }

    #[test]
    fn test_remove_drops_empty_key() {
        let mut index = SecondaryIndex::new();
        index.insert("jo".into(), 1);
        index.remove("jo", 1);
        assert_eq!(index.key_count(), 0);
        assert!(index.lookup("jo").is_empty());
    }

    #[test]
    fn test_record_indexes_normalize_keys() {
        let mut indexes = RecordIndexes::new();
        indexes.add(&person(1, "Jo", "Doe"));
        indexes.add(&person(2, "JO", "Roe"));

        let first = indexes.get(RecordField::FirstName).unwrap();
        assert_eq!(first.lookup("jo"), &[1, 2]);

        let dob = indexes.get(RecordField::DateOfBirth).unwrap();
        assert_eq!(dob.lookup("1992-05-17"), &[1, 2]);

        assert!(indexes.get(RecordField::Height).is_none());
    }

    #[test]
    fn test_record_indexes_remove() {
        let mut indexes = RecordIndexes::new();
        let jo = person(1, "Jo", "Doe");
        indexes.add(&jo);
        indexes.remove(&jo);

        for field in RecordIndexes::INDEXED {
            assert_eq!(indexes.get(field).unwrap().entry_count(), 0);
        }
    }
}
