//! CLI module for filecabinet
//!
//! Provides command-line access to a record store:
//! - record commands: create, edit, get, find, delete, update
//! - maintenance: purge, stat
//! - data exchange: export, import, generate
//!
//! Configuration comes from a JSON file (`--config`, default
//! `./filecabinet.json`); see [`Config`].

mod args;
mod commands;
mod config;
mod errors;
mod generate;
mod io;

pub use args::{parse_pair, Cli, Command, RecordArgs};
pub use commands::{run, run_command};
pub use config::{Config, StorageKind};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use generate::RecordGenerator;
