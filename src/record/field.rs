//! Field descriptors
//!
//! `RecordField` is the closed set of addressable record fields. Each variant
//! pairs a getter (its textual rendering) with, where mutable, a setter that
//! parses text into a `RecordParameters` slot.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

use super::salary::Salary;
use super::types::{Record, RecordParameters, DATE_FORMAT};
use crate::validation::{ValidationError, ValidationResult};

/// Alternate date spelling accepted on input (month/day/year).
const US_DATE_FORMAT: &str = "%m/%d/%Y";

/// Raised when a field name does not resolve to a `RecordField`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown record field '{0}'")]
pub struct UnknownFieldError(pub String);

/// Addressable record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordField {
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Height,
    Salary,
    Sex,
}

impl RecordField {
    pub const ALL: [RecordField; 7] = [
        RecordField::Id,
        RecordField::FirstName,
        RecordField::LastName,
        RecordField::DateOfBirth,
        RecordField::Height,
        RecordField::Salary,
        RecordField::Sex,
    ];

    /// Canonical lower-case field name.
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::FirstName => "firstname",
            RecordField::LastName => "lastname",
            RecordField::DateOfBirth => "dateofbirth",
            RecordField::Height => "height",
            RecordField::Salary => "salary",
            RecordField::Sex => "sex",
        }
    }

    /// Textual form of this field of `record`.
    pub fn render(&self, record: &Record) -> String {
        match self {
            RecordField::Id => record.id.to_string(),
            RecordField::FirstName => record.first_name.clone(),
            RecordField::LastName => record.last_name.clone(),
            RecordField::DateOfBirth => record.date_of_birth.format(DATE_FORMAT).to_string(),
            RecordField::Height => record.height.to_string(),
            RecordField::Salary => record.salary.to_string(),
            RecordField::Sex => record.sex.to_string(),
        }
    }

    /// Case-insensitive equality of the rendered field against `value`.
    pub fn matches(&self, record: &Record, value: &str) -> bool {
        normalize(&self.render(record)) == normalize(value)
    }

    /// Parses `text` into the matching slot of `params`.
    ///
    /// The id is not assignable.
    pub fn assign(&self, params: &mut RecordParameters, text: &str) -> ValidationResult<()> {
        let text = text.trim();
        match self {
            RecordField::Id => {
                return Err(ValidationError::new(*self, "id cannot be assigned"));
            }
            RecordField::FirstName => params.first_name = text.to_string(),
            RecordField::LastName => params.last_name = text.to_string(),
            RecordField::DateOfBirth => params.date_of_birth = parse_date(text)?,
            RecordField::Height => {
                params.height = text.parse().map_err(|_| {
                    ValidationError::new(*self, format!("'{}' is not a whole number", text))
                })?;
            }
            RecordField::Salary => {
                params.salary = text
                    .parse::<Salary>()
                    .map_err(|e| ValidationError::new(*self, e.to_string()))?;
            }
            RecordField::Sex => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => params.sex = c,
                    _ => {
                        return Err(ValidationError::new(
                            *self,
                            format!("'{}' is not a single character", text),
                        ))
                    }
                }
            }
        }
        Ok(())
    }
}

/// Parses a date of birth in `YYYY-MM-DD` or `MM/DD/YYYY` form.
pub fn parse_date(text: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, US_DATE_FORMAT))
        .map_err(|_| {
            ValidationError::new(
                RecordField::DateOfBirth,
                format!("'{}' is not a date (expected YYYY-MM-DD)", text),
            )
        })
}

/// Comparison key for field text: trimmed and lower-cased.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RecordField {
    type Err = UnknownFieldError;

    /// Case-insensitive; `_` and `-` are ignored (`first_name` == `FirstName`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        RecordField::ALL
            .into_iter()
            .find(|field| field.name() == key)
            .ok_or_else(|| UnknownFieldError(s.to_string()))
    }
}
