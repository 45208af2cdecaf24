//! Validation thresholds
//!
//! Two named rule sets exist: `default` (strict) and `custom` (looser).
//! Both feed the same validator set; only the numbers differ.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::Salary;

/// Inclusive character-count bounds for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
}

/// Inclusive bounds for an ordered value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRule<T> {
    pub min: T,
    pub max: T,
}

/// Inclusive date-of-birth bounds. A missing `to` means "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub from: NaiveDate,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// Complete set of thresholds fed into the validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub first_name: LengthRule,
    pub last_name: LengthRule,
    pub date_of_birth: DateRule,
    pub height: RangeRule<i16>,
    pub salary: RangeRule<Salary>,
    pub sex: Vec<char>,
}

impl ValidationRules {
    /// The strict rule set.
    pub fn default_rules() -> Self {
        Self {
            first_name: LengthRule { min: 2, max: 60 },
            last_name: LengthRule { min: 2, max: 60 },
            date_of_birth: DateRule {
                from: ymd(1950, 1, 1),
                to: None,
            },
            height: RangeRule { min: 120, max: 250 },
            salary: RangeRule {
                min: Salary::ZERO,
                max: Salary::from_units(1_000_000),
            },
            sex: vec!['M', 'F'],
        }
    }

    /// The looser rule set.
    pub fn custom_rules() -> Self {
        Self {
            first_name: LengthRule { min: 1, max: 60 },
            last_name: LengthRule { min: 1, max: 60 },
            date_of_birth: DateRule {
                from: ymd(1900, 1, 1),
                to: None,
            },
            height: RangeRule { min: 50, max: 300 },
            salary: RangeRule {
                min: Salary::ZERO,
                max: Salary::from_units(10_000_000),
            },
            sex: vec!['M', 'F', 'X'],
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::default_rules()
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Named rule set selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    #[default]
    Default,
    Custom,
}

impl ValidationProfile {
    pub fn rules(&self) -> ValidationRules {
        match self {
            ValidationProfile::Default => ValidationRules::default_rules(),
            ValidationProfile::Custom => ValidationRules::custom_rules(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationProfile::Default => "default",
            ValidationProfile::Custom => "custom",
        }
    }
}

impl fmt::Display for ValidationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(ValidationProfile::Default),
            "custom" => Ok(ValidationProfile::Custom),
            other => Err(format!(
                "unknown validation profile '{}' (expected 'default' or 'custom')",
                other
            )),
        }
    }
}
