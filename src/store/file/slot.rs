//! Fixed-size record slot codec
//!
//! Slot layout (all integers little-endian):
//!
//! ```text
//! offset  size  field
//! ------  ----  ------------------------------------------
//!      0     4  id (i32)
//!      4   120  first name (UTF-8, NUL-padded)
//!    124   120  last name (UTF-8, NUL-padded)
//!    244     4  birth year (i32)
//!    248     4  birth month (i32)
//!    252     4  birth day (i32)
//!    256     2  height (i16)
//!    258    16  salary (decimal: lo, mid, hi, flags as u32)
//!    274     2  sex (one UTF-16 code unit)
//!    276     1  is_deleted (0 = live, 1 = deleted)
//! ```

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, NaiveDate};

use crate::record::{Record, RecordField, RecordId, Salary, NAME_MAX_BYTES};
use crate::store::errors::{StoreError, StoreResult};
use crate::validation::ValidationError;

pub const ID_OFFSET: usize = 0;
pub const FIRST_NAME_OFFSET: usize = ID_OFFSET + 4;
pub const LAST_NAME_OFFSET: usize = FIRST_NAME_OFFSET + NAME_MAX_BYTES;
pub const YEAR_OFFSET: usize = LAST_NAME_OFFSET + NAME_MAX_BYTES;
pub const MONTH_OFFSET: usize = YEAR_OFFSET + 4;
pub const DAY_OFFSET: usize = MONTH_OFFSET + 4;
pub const HEIGHT_OFFSET: usize = DAY_OFFSET + 4;
pub const SALARY_OFFSET: usize = HEIGHT_OFFSET + 2;
pub const SEX_OFFSET: usize = SALARY_OFFSET + 16;
pub const DELETED_OFFSET: usize = SEX_OFFSET + 2;

/// Size of one slot in bytes.
pub const SLOT_SIZE: usize = DELETED_OFFSET + 1;

const LIVE: u8 = 0;
const DELETED: u8 = 1;

/// One encoded slot.
#[derive(Clone, PartialEq, Eq)]
pub struct Slot {
    bytes: [u8; SLOT_SIZE],
}

impl Slot {
    /// Encodes `record` with the given deleted flag.
    ///
    /// Fails if a name overflows its slot or `sex` needs more than one
    /// UTF-16 code unit.
    pub fn encode(record: &Record, deleted: bool) -> StoreResult<Self> {
        let mut bytes = [0u8; SLOT_SIZE];

        LittleEndian::write_i32(&mut bytes[ID_OFFSET..], record.id);
        write_name(&mut bytes, FIRST_NAME_OFFSET, RecordField::FirstName, &record.first_name)?;
        write_name(&mut bytes, LAST_NAME_OFFSET, RecordField::LastName, &record.last_name)?;

        let dob = record.date_of_birth;
        LittleEndian::write_i32(&mut bytes[YEAR_OFFSET..], dob.year());
        LittleEndian::write_i32(&mut bytes[MONTH_OFFSET..], dob.month() as i32);
        LittleEndian::write_i32(&mut bytes[DAY_OFFSET..], dob.day() as i32);

        LittleEndian::write_i16(&mut bytes[HEIGHT_OFFSET..], record.height);
        LittleEndian::write_u32_into(
            &record.salary.to_decimal_words(),
            &mut bytes[SALARY_OFFSET..SEX_OFFSET],
        );

        let mut units = [0u16; 2];
        let encoded = record.sex.encode_utf16(&mut units);
        if encoded.len() != 1 {
            return Err(ValidationError::new(
                RecordField::Sex,
                format!("'{}' does not fit a single UTF-16 code unit", record.sex),
            )
            .into());
        }
        LittleEndian::write_u16(&mut bytes[SEX_OFFSET..], units[0]);

        bytes[DELETED_OFFSET] = if deleted { DELETED } else { LIVE };
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: [u8; SLOT_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn id(&self) -> RecordId {
        LittleEndian::read_i32(&self.bytes[ID_OFFSET..])
    }

    /// Reads the deleted flag. `offset` is the slot's byte offset in the
    /// file, used for error context.
    pub fn is_deleted(&self, offset: u64) -> StoreResult<bool> {
        match self.bytes[DELETED_OFFSET] {
            LIVE => Ok(false),
            DELETED => Ok(true),
            other => Err(StoreError::malformed_at(
                offset + DELETED_OFFSET as u64,
                format!("deleted flag is {}, expected 0 or 1", other),
            )),
        }
    }

    /// Materializes the record held in this slot.
    pub fn decode(&self, offset: u64) -> StoreResult<Record> {
        let first_name = read_name(&self.bytes, FIRST_NAME_OFFSET, offset)?;
        let last_name = read_name(&self.bytes, LAST_NAME_OFFSET, offset)?;

        let year = LittleEndian::read_i32(&self.bytes[YEAR_OFFSET..]);
        let month = LittleEndian::read_i32(&self.bytes[MONTH_OFFSET..]);
        let day = LittleEndian::read_i32(&self.bytes[DAY_OFFSET..]);
        let date_of_birth = u32::try_from(month)
            .ok()
            .zip(u32::try_from(day).ok())
            .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d))
            .ok_or_else(|| {
                StoreError::malformed_at(
                    offset + YEAR_OFFSET as u64,
                    format!("invalid date of birth {}-{}-{}", year, month, day),
                )
            })?;

        let height = LittleEndian::read_i16(&self.bytes[HEIGHT_OFFSET..]);

        let mut words = [0u32; 4];
        LittleEndian::read_u32_into(&self.bytes[SALARY_OFFSET..SEX_OFFSET], &mut words);
        let salary = Salary::from_decimal_words(words).map_err(|e| {
            StoreError::malformed_at(offset + SALARY_OFFSET as u64, e.to_string())
        })?;

        let unit = LittleEndian::read_u16(&self.bytes[SEX_OFFSET..]);
        let sex = char::from_u32(u32::from(unit)).ok_or_else(|| {
            StoreError::malformed_at(
                offset + SEX_OFFSET as u64,
                format!("sex code unit {:#06x} is not a character", unit),
            )
        })?;

        Ok(Record {
            id: self.id(),
            first_name,
            last_name,
            date_of_birth,
            height,
            salary,
            sex,
        })
    }
}

fn write_name(
    bytes: &mut [u8; SLOT_SIZE],
    at: usize,
    field: RecordField,
    name: &str,
) -> StoreResult<()> {
    let encoded = name.as_bytes();
    if encoded.len() > NAME_MAX_BYTES {
        return Err(ValidationError::new(
            field,
            format!("must fit in {} bytes when UTF-8 encoded", NAME_MAX_BYTES),
        )
        .into());
    }
    bytes[at..at + encoded.len()].copy_from_slice(encoded);
    Ok(())
}

fn read_name(bytes: &[u8; SLOT_SIZE], at: usize, offset: u64) -> StoreResult<String> {
    let buf = &bytes[at..at + NAME_MAX_BYTES];
    let end = buf.iter().position(|b| *b == 0).unwrap_or(NAME_MAX_BYTES);
    String::from_utf8(buf[..end].to_vec()).map_err(|e| {
        StoreError::malformed_at(offset + at as u64, format!("name is not valid UTF-8: {}", e))
    })
}
