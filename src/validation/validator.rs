//! Field validators and the validation pipeline
//!
//! Each validator inspects the full `RecordParameters` but is responsible
//! for exactly one field. The pipeline runs them in insertion order and
//! stops at the first failure.

use chrono::{Local, NaiveDate};

use super::errors::{ValidationError, ValidationResult};
use super::rules::ValidationRules;
use crate::record::{RecordField, RecordParameters, Salary, DATE_FORMAT, NAME_MAX_BYTES};

/// The contract stores depend on: reject invalid parameters.
pub trait RecordValidator {
    fn validate(&self, params: &RecordParameters) -> ValidationResult<()>;
}

impl<F> RecordValidator for F
where
    F: Fn(&RecordParameters) -> ValidationResult<()>,
{
    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        self(params)
    }
}

/// A validator for one record field.
pub trait FieldValidator {
    /// The field this validator guards.
    fn field(&self) -> RecordField;

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()>;
}

/// Name validator (first or last name).
///
/// Besides the configured length bounds, names must be non-blank, free of
/// NUL characters and fit the fixed name slot.
#[derive(Debug, Clone)]
pub struct NameValidator {
    field: RecordField,
    min_len: usize,
    max_len: usize,
}

impl NameValidator {
    pub fn first_name(min_len: usize, max_len: usize) -> Self {
        Self {
            field: RecordField::FirstName,
            min_len,
            max_len,
        }
    }

    pub fn last_name(min_len: usize, max_len: usize) -> Self {
        Self {
            field: RecordField::LastName,
            min_len,
            max_len,
        }
    }
}

impl FieldValidator for NameValidator {
    fn field(&self) -> RecordField {
        self.field
    }

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        let name = match self.field {
            RecordField::LastName => &params.last_name,
            _ => &params.first_name,
        };

        if name.trim().is_empty() {
            return Err(ValidationError::new(self.field, "must not be blank"));
        }
        if name.contains('\0') {
            return Err(ValidationError::new(
                self.field,
                "must not contain NUL characters",
            ));
        }

        let len = name.chars().count();
        if len < self.min_len || len > self.max_len {
            return Err(ValidationError::new(
                self.field,
                format!(
                    "length must be between {} and {} characters, got {}",
                    self.min_len, self.max_len, len
                ),
            ));
        }
        if name.len() > NAME_MAX_BYTES {
            return Err(ValidationError::new(
                self.field,
                format!("must fit in {} bytes when UTF-8 encoded", NAME_MAX_BYTES),
            ));
        }

        Ok(())
    }
}

/// Date-of-birth range validator. An open upper bound means today.
#[derive(Debug, Clone)]
pub struct DateOfBirthValidator {
    from: NaiveDate,
    to: Option<NaiveDate>,
}

impl DateOfBirthValidator {
    pub fn new(from: NaiveDate, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }
}

impl FieldValidator for DateOfBirthValidator {
    fn field(&self) -> RecordField {
        RecordField::DateOfBirth
    }

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        let to = self.to.unwrap_or_else(|| Local::now().date_naive());
        let dob = params.date_of_birth;

        if dob < self.from || dob > to {
            return Err(ValidationError::new(
                RecordField::DateOfBirth,
                format!(
                    "must be between {} and {}, got {}",
                    self.from.format(DATE_FORMAT),
                    to.format(DATE_FORMAT),
                    dob.format(DATE_FORMAT)
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HeightValidator {
    min: i16,
    max: i16,
}

impl HeightValidator {
    pub fn new(min: i16, max: i16) -> Self {
        Self { min, max }
    }
}

impl FieldValidator for HeightValidator {
    fn field(&self) -> RecordField {
        RecordField::Height
    }

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        if !(self.min..=self.max).contains(&params.height) {
            return Err(ValidationError::new(
                RecordField::Height,
                format!(
                    "must be between {} and {}, got {}",
                    self.min, self.max, params.height
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SalaryValidator {
    min: Salary,
    max: Salary,
}

impl SalaryValidator {
    pub fn new(min: Salary, max: Salary) -> Self {
        Self { min, max }
    }
}

impl FieldValidator for SalaryValidator {
    fn field(&self) -> RecordField {
        RecordField::Salary
    }

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        if !(self.min..=self.max).contains(&params.salary) {
            return Err(ValidationError::new(
                RecordField::Salary,
                format!(
                    "must be between {} and {}, got {}",
                    self.min, self.max, params.salary
                ),
            ));
        }
        Ok(())
    }
}

/// Sex must be one of an allowed set of characters (exact match).
#[derive(Debug, Clone)]
pub struct SexValidator {
    allowed: Vec<char>,
}

impl SexValidator {
    pub fn new(allowed: impl IntoIterator<Item = char>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }
}

impl FieldValidator for SexValidator {
    fn field(&self) -> RecordField {
        RecordField::Sex
    }

    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        if !self.allowed.contains(&params.sex) {
            let allowed: Vec<String> = self.allowed.iter().map(char::to_string).collect();
            return Err(ValidationError::new(
                RecordField::Sex,
                format!(
                    "must be one of [{}], got '{}'",
                    allowed.join(", "),
                    params.sex
                ),
            ));
        }
        Ok(())
    }
}

/// Ordered, fail-fast set of field validators.
#[derive(Default)]
pub struct ValidationPipeline {
    validators: Vec<Box<dyn FieldValidator>>,
}

impl ValidationPipeline {
    pub fn builder() -> ValidationPipelineBuilder {
        ValidationPipelineBuilder::default()
    }

    /// Builds the canonical pipeline: first name, last name, date of birth,
    /// height, salary, sex.
    pub fn from_rules(rules: &ValidationRules) -> Self {
        Self::builder()
            .first_name(rules.first_name.min, rules.first_name.max)
            .last_name(rules.last_name.min, rules.last_name.max)
            .date_of_birth(rules.date_of_birth.from, rules.date_of_birth.to)
            .height(rules.height.min, rules.height.max)
            .salary(rules.salary.min, rules.salary.max)
            .sex(rules.sex.iter().copied())
            .build()
    }

    /// Fields in evaluation order.
    pub fn fields(&self) -> Vec<RecordField> {
        self.validators.iter().map(|v| v.field()).collect()
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl RecordValidator for ValidationPipeline {
    fn validate(&self, params: &RecordParameters) -> ValidationResult<()> {
        for validator in &self.validators {
            validator.validate(params)?;
        }
        Ok(())
    }
}

/// Collects validators in call order.
#[derive(Default)]
pub struct ValidationPipelineBuilder {
    validators: Vec<Box<dyn FieldValidator>>,
}

impl ValidationPipelineBuilder {
    pub fn first_name(self, min_len: usize, max_len: usize) -> Self {
        self.with(NameValidator::first_name(min_len, max_len))
    }

    pub fn last_name(self, min_len: usize, max_len: usize) -> Self {
        self.with(NameValidator::last_name(min_len, max_len))
    }

    pub fn date_of_birth(self, from: NaiveDate, to: Option<NaiveDate>) -> Self {
        self.with(DateOfBirthValidator::new(from, to))
    }

    pub fn height(self, min: i16, max: i16) -> Self {
        self.with(HeightValidator::new(min, max))
    }

    pub fn salary(self, min: Salary, max: Salary) -> Self {
        self.with(SalaryValidator::new(min, max))
    }

    pub fn sex(self, allowed: impl IntoIterator<Item = char>) -> Self {
        self.with(SexValidator::new(allowed))
    }

    /// Appends an arbitrary validator.
    pub fn with(mut self, validator: impl FieldValidator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn build(self) -> ValidationPipeline {
        ValidationPipeline {
            validators: self.validators,
        }
    }
}
