//! Person record model for filecabinet
//!
//! A record is a fixed-schema person entry: identity, first and last name,
//! date of birth, height, salary and sex. Records are owned by exactly one
//! store; everything else (indexes, caches) refers to them by id.
//!
//! # Field access
//!
//! Generic operations (search, delete, update) address fields through the
//! closed [`RecordField`] descriptor set instead of runtime name lookup.
//! Every comparison is performed on the field's textual form, compared
//! case-insensitively.

mod field;
mod salary;
mod types;

pub use field::{normalize, parse_date, RecordField, UnknownFieldError};
pub use salary::{Salary, SalaryError};
pub use types::{Record, RecordId, RecordParameters, DATE_FORMAT, NAME_MAX_BYTES};
