//! JSON output handling for CLI
//!
//! - Command results: one JSON object per line
//! - Record listings: JSON lines, one record per line
//! - UTF-8 only

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::errors::{CliError, CliResult};
use crate::codec::{Decoded, JsonLinesCodec, RecordCodec};
use crate::record::Record;

/// Write a single JSON value followed by a newline
pub fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write records as JSON lines
pub fn write_records(out: &mut dyn Write, records: &[Record]) -> CliResult<()> {
    JsonLinesCodec.encode(records, out)?;
    Ok(())
}

/// Write records as JSON lines to `path`, or to `out` if no path is given
pub fn export_records(
    path: Option<&Path>,
    out: &mut dyn Write,
    records: &[Record],
) -> CliResult<()> {
    match path {
        Some(path) => save_records(path, records),
        None => write_records(out, records),
    }
}

/// Write records as JSON lines to `path`, replacing its contents
pub fn save_records(path: &Path, records: &[Record]) -> CliResult<()> {
    let file = File::create(path)
        .map_err(|e| CliError::io_error(format!("Failed to create {}: {}", path.display(), e)))?;
    write_records(&mut BufWriter::new(file), records)
}

/// Read every parseable record from a JSON-lines file
pub fn read_records(path: &Path) -> CliResult<Decoded> {
    let file = File::open(path)
        .map_err(|e| CliError::io_error(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(JsonLinesCodec.decode(&mut BufReader::new(file))?)
}

/// Stdout, locked for the duration of one command
pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}
