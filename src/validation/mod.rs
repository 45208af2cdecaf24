//! Validation pipeline for filecabinet
//!
//! Every write entering a store passes through a [`RecordValidator`] before
//! any mutation is applied. The stock implementation is
//! [`ValidationPipeline`], an ordered list of independent field validators
//! evaluated fail-fast.
//!
//! # Design Principles
//!
//! - Validation happens before mutation; a rejected record is never stored
//! - First failing validator wins; errors are not accumulated
//! - Thresholds are plain data ([`ValidationRules`]); where they come from
//!   (profile name, config file) is not the pipeline's concern

mod errors;
mod rules;
mod validator;

pub use errors::{ValidationError, ValidationResult};
pub use rules::{DateRule, LengthRule, RangeRule, ValidationProfile, ValidationRules};
pub use validator::{
    DateOfBirthValidator, FieldValidator, HeightValidator, NameValidator, RecordValidator,
    SalaryValidator, SexValidator, ValidationPipeline, ValidationPipelineBuilder,
};
