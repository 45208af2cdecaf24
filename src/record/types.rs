//! Record and record-parameter types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::salary::Salary;

/// Record identity. Positive, unique among visible records of one store.
pub type RecordId = i32;

/// Maximum encoded size of a name, in UTF-8 bytes (the file slot width).
pub const NAME_MAX_BYTES: usize = 120;

/// Canonical textual form of a date of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input for create and edit: every record field except the id.
///
/// Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordParameters {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: i16,
    pub salary: Salary,
    pub sex: char,
}

impl RecordParameters {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        height: i16,
        salary: Salary,
        sex: char,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            height,
            salary,
            sex,
        }
    }
}

/// A stored person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub height: i16,
    pub salary: Salary,
    pub sex: char,
}

impl Record {
    /// Builds a record from an id and its field values.
    pub fn new(id: RecordId, params: RecordParameters) -> Self {
        Self {
            id,
            first_name: params.first_name,
            last_name: params.last_name,
            date_of_birth: params.date_of_birth,
            height: params.height,
            salary: params.salary,
            sex: params.sex,
        }
    }

    /// Returns the field values of this record, without the id.
    pub fn parameters(&self) -> RecordParameters {
        RecordParameters {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            height: self.height,
            salary: self.salary,
            sex: self.sex,
        }
    }

    /// Overwrites every field in place, preserving the id.
    pub fn apply(&mut self, params: RecordParameters) {
        let id = self.id;
        *self = Record::new(id, params);
    }
}
