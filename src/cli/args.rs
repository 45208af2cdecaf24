//! CLI argument definitions using clap
//!
//! Commands:
//! - filecabinet create --first-name .. --last-name .. --date-of-birth .. ...
//! - filecabinet edit <id> --set field=value ...
//! - filecabinet get <id>
//! - filecabinet find [--where field=value ...] [--operator and|or]
//! - filecabinet delete <field> <value>
//! - filecabinet update --set field=value ... [--where field=value ...]
//! - filecabinet purge | stat
//! - filecabinet export [--output <path>] | import <path>
//! - filecabinet generate [--count N] [--start-id K] [--output <path>]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::record::{parse_date, RecordField, RecordId, RecordParameters, Salary};
use crate::store::SearchOperator;

/// filecabinet - person records in memory or in a slot file
#[derive(Parser, Debug)]
#[command(name = "filecabinet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./filecabinet.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a record and print its id
    Create(RecordArgs),

    /// Change fields of one record
    Edit {
        id: RecordId,

        /// Field assignment, e.g. `--set lastname=Smith`
        #[arg(long = "set", value_parser = parse_pair, required = true)]
        set: Vec<(RecordField, String)>,
    },

    /// Print one record
    Get { id: RecordId },

    /// Print the records matching every (or any) predicate
    Find {
        /// Predicate, e.g. `--where firstname=John`
        #[arg(long = "where", value_parser = parse_pair)]
        predicates: Vec<(RecordField, String)>,

        #[arg(long, default_value = "and")]
        operator: SearchOperator,
    },

    /// Delete the records whose field equals the value
    Delete { field: RecordField, value: String },

    /// Assign fields on every matching record
    Update {
        #[arg(long = "set", value_parser = parse_pair, required = true)]
        set: Vec<(RecordField, String)>,

        #[arg(long = "where", value_parser = parse_pair)]
        predicates: Vec<(RecordField, String)>,

        #[arg(long, default_value = "and")]
        operator: SearchOperator,
    },

    /// Reclaim space held by deleted records
    Purge,

    /// Print record counts
    Stat,

    /// Write every visible record as JSON lines
    Export {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Upsert records from a JSON-lines file
    Import { input: PathBuf },

    /// Write random valid records as JSON lines
    Generate {
        #[arg(long, default_value_t = 10)]
        count: usize,

        #[arg(long, default_value_t = 1)]
        start_id: RecordId,

        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Field values for `create`.
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// YYYY-MM-DD or MM/DD/YYYY
    #[arg(long, value_parser = parse_date_arg)]
    pub date_of_birth: NaiveDate,

    /// Height in centimetres
    #[arg(long, allow_negative_numbers = true)]
    pub height: i16,

    /// Amount with up to two decimals, e.g. 1250.50
    #[arg(long)]
    pub salary: Salary,

    #[arg(long)]
    pub sex: char,
}

impl RecordArgs {
    pub fn into_parameters(self) -> RecordParameters {
        RecordParameters::new(
            self.first_name,
            self.last_name,
            self.date_of_birth,
            self.height,
            self.salary,
            self.sex,
        )
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Parses `field=value`.
pub fn parse_pair(text: &str) -> Result<(RecordField, String), String> {
    let (field, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{}'", text))?;
    let field = field.parse::<RecordField>().map_err(|e| e.to_string())?;
    Ok((field, value.to_string()))
}

fn parse_date_arg(text: &str) -> Result<NaiveDate, String> {
    parse_date(text).map_err(|e| e.to_string())
}
