//! CLI command implementations
//!
//! Each invocation loads the configuration, opens the configured store,
//! runs one command and exits. With `"storage": "memory"` the store is
//! loaded from the JSON-lines snapshot at `data_path` and written back
//! after every mutating command. A snapshot that did not load in full is
//! never written back: mutating commands fail with
//! `CABINET_CLI_UNSAFE_WRITE` and leave the file as it is.

use std::io::Write;
use std::path::Path;

use rand::thread_rng;
use serde_json::json;
use tracing::{debug, info, warn};

use super::args::{Cli, Command};
use super::config::{Config, StorageKind};
use super::errors::{CliError, CliResult};
use super::generate::RecordGenerator;
use super::io::{export_records, read_records, save_records, stdout, write_json, write_records};
use crate::observability::{self, CLI_TARGET};
use crate::record::{RecordField, RecordId};
use crate::store::{FileBackend, MemoryBackend, Query, RecordStore, Snapshot, StoreError};

/// Parse arguments, load configuration and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = Config::load(&cli.config)?;
    observability::init_tracing(&config.log_filter);

    run_command(&config, cli.command, &mut stdout())
}

/// Run one command against the store described by `config`
pub fn run_command(config: &Config, command: Command, out: &mut dyn Write) -> CliResult<()> {
    if let Command::Generate {
        count,
        start_id,
        output,
    } = command
    {
        return generate(config, count, start_id, output.as_deref(), out);
    }

    let mutating = is_mutating(&command);
    let (mut store, dropped) = load_store(config)?;
    if mutating && dropped > 0 {
        return Err(CliError::unsafe_write(format!(
            "{} entr(ies) in {} could not be loaded; refusing to rewrite it",
            dropped,
            config.data_path().display()
        )));
    }
    debug!(target: CLI_TARGET, store = store.kind(), ?command, "Running command");

    execute(store.as_mut(), command, out)?;

    if mutating {
        save_store(config, store.as_ref())?;
    }
    Ok(())
}

fn is_mutating(command: &Command) -> bool {
    matches!(
        command,
        Command::Create(_)
            | Command::Edit { .. }
            | Command::Delete { .. }
            | Command::Update { .. }
            | Command::Purge
            | Command::Import { .. }
    )
}

/// Opens the store selected by `config` and counts the snapshot entries
/// that did not make it in.
fn load_store(config: &Config) -> CliResult<(Box<dyn RecordStore>, usize)> {
    let validator = config.validator();
    match config.storage {
        StorageKind::File => {
            let store: Box<dyn RecordStore> =
                Box::new(FileBackend::open(config.data_path(), validator)?);
            Ok((store, 0))
        }
        StorageKind::Memory => {
            let mut store: Box<dyn RecordStore> = Box::new(MemoryBackend::new(validator));
            let path = config.data_path();
            if !path.exists() {
                return Ok((store, 0));
            }

            let decoded = read_records(path)?;
            let report = store.restore(&Snapshot::new(decoded.records))?;
            let dropped = decoded.unreadable.len() + report.skipped().len();
            if dropped > 0 {
                warn!(
                    target: CLI_TARGET,
                    path = %path.display(),
                    unreadable = ?decoded.unreadable,
                    skipped = report.skipped().len(),
                    "Memory store loaded partially; it will not be rewritten"
                );
            } else {
                info!(
                    target: CLI_TARGET,
                    path = %path.display(),
                    loaded = report.imported().len(),
                    "Memory store loaded"
                );
            }
            Ok((store, dropped))
        }
    }
}

/// Persist a memory store back to its snapshot file. File stores write
/// through on every operation, so there is nothing to do for them.
fn save_store(config: &Config, store: &dyn RecordStore) -> CliResult<()> {
    if config.storage != StorageKind::Memory {
        return Ok(());
    }

    let path = config.data_path();
    let records = store.records()?;
    save_records(path, &records)?;
    debug!(target: CLI_TARGET, path = %path.display(), count = records.len(), "Memory store saved");
    Ok(())
}

fn execute(store: &mut dyn RecordStore, command: Command, out: &mut dyn Write) -> CliResult<()> {
    match command {
        Command::Create(args) => {
            let id = store.create(&args.into_parameters())?;
            write_json(out, &json!({ "id": id }))
        }
        Command::Edit { id, set } => {
            edit(store, id, &set)?;
            write_json(out, &json!({ "id": id }))
        }
        Command::Get { id } => {
            let record = store.get(id)?.ok_or(StoreError::not_found(id))?;
            write_json(out, &record)
        }
        Command::Find {
            predicates,
            operator,
        } => {
            let records = store.search(&Query::from_pairs(predicates, operator))?;
            write_records(out, &records)
        }
        Command::Delete { field, value } => {
            let deleted = store.delete(field, &value)?;
            write_json(out, &json!({ "deleted": deleted }))
        }
        Command::Update {
            set,
            predicates,
            operator,
        } => {
            let updated = store.update(&set, &Query::from_pairs(predicates, operator))?;
            write_json(out, &json!({ "updated": updated }))
        }
        Command::Purge => {
            let purged = store.purge()?;
            write_json(out, &json!({ "purged": purged }))
        }
        Command::Stat => {
            let stat = store.stat()?;
            write_json(
                out,
                &json!({
                    "total": stat.total,
                    "deleted": stat.deleted,
                    "visible": stat.visible(),
                }),
            )
        }
        Command::Export { output } => {
            let records = store.records()?;
            export_records(output.as_deref(), out, &records)
        }
        Command::Import { input } => {
            let decoded = read_records(&input)?;
            let report = store.restore(&Snapshot::new(decoded.records))?;
            let skipped: Vec<_> = report
                .skipped()
                .iter()
                .map(|s| json!({ "id": s.id, "reason": s.reason }))
                .collect();
            write_json(
                out,
                &json!({
                    "imported": report.imported(),
                    "skipped": skipped,
                    "unreadable_lines": decoded.unreadable,
                }),
            )
        }
        Command::Generate { .. } => Err(CliError::invalid_input(
            "generate does not operate on a store",
        )),
    }
}

/// Apply `set` to the visible record `id` and write it back
fn edit(store: &mut dyn RecordStore, id: RecordId, set: &[(RecordField, String)]) -> CliResult<()> {
    let record = store.get(id)?.ok_or(StoreError::not_found(id))?;
    let mut params = record.parameters();
    for (field, text) in set {
        field.assign(&mut params, text)?;
    }
    store.edit(id, &params)?;
    Ok(())
}

fn generate(
    config: &Config,
    count: usize,
    start_id: RecordId,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult<()> {
    if start_id <= 0 {
        return Err(CliError::invalid_input("--start-id must be greater than zero"));
    }
    let last = RecordId::try_from(count.saturating_sub(1))
        .ok()
        .and_then(|span| start_id.checked_add(span));
    if last.is_none() {
        return Err(CliError::invalid_input(format!(
            "--count {} from --start-id {} runs past the largest id",
            count, start_id
        )));
    }

    let mut generator = RecordGenerator::new(thread_rng(), config.effective_rules());
    let records = generator.records(start_id, count);
    info!(target: CLI_TARGET, count, start_id, "Records generated");

    export_records(output, out, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::RecordArgs;
    use crate::record::{Record, RecordParameters, Salary};
    use crate::store::SearchOperator;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tempfile::TempDir;

    fn config(dir: &TempDir, storage: StorageKind) -> Config {
        Config {
            storage,
            data_path: dir.path().join("cabinet.db").display().to_string(),
            ..Config::default()
        }
    }

    fn create_args(first: &str) -> Command {
        Command::Create(RecordArgs {
            first_name: first.to_string(),
            last_name: "Lee".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
            height: 170,
            salary: Salary::from_units(2_000),
            sex: 'F',
        })
    }

    fn run(config: &Config, command: Command) -> CliResult<String> {
        let mut out = Vec::new();
        run_command(config, command, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn json_line(text: &str) -> Value {
        serde_json::from_str(text.trim()).unwrap()
    }

    #[test]
    fn test_file_storage_persists_between_commands() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);

        assert_eq!(json_line(&run(&config, create_args("Ann")).unwrap())["id"], 1);
        assert_eq!(json_line(&run(&config, create_args("Bea")).unwrap())["id"], 2);

        let found = run(
            &config,
            Command::Find {
                predicates: vec![(RecordField::FirstName, "bea".to_string())],
                operator: SearchOperator::And,
            },
        )
        .unwrap();
        let record: Record = serde_json::from_str(found.trim()).unwrap();
        assert_eq!(record.id, 2);
    }

    #[test]
    fn test_memory_storage_round_trips_through_snapshot() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::Memory);

        run(&config, create_args("Ann")).unwrap();
        run(&config, create_args("Bea")).unwrap();
        run(
            &config,
            Command::Delete {
                field: RecordField::FirstName,
                value: "ann".to_string(),
            },
        )
        .unwrap();

        let stat = json_line(&run(&config, Command::Stat).unwrap());
        assert_eq!(stat["total"], 1);
        assert_eq!(stat["deleted"], 0);
    }

    fn write_snapshot(config: &Config, records: &[Record], trailer: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_records(&mut bytes, records).unwrap();
        bytes.extend_from_slice(trailer.as_bytes());
        std::fs::write(config.data_path(), &bytes).unwrap();
        bytes
    }

    fn stored(id: RecordId, sex: char) -> Record {
        Record::new(
            id,
            RecordParameters::new(
                "Ann",
                "Lee",
                NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
                170,
                Salary::from_units(2_000),
                sex,
            ),
        )
    }

    #[test]
    fn test_memory_snapshot_with_invalid_record_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::Memory);
        let before = write_snapshot(&config, &[stored(1, 'X'), stored(2, 'F')], "");

        let err = run(
            &config,
            Command::Delete {
                field: RecordField::FirstName,
                value: "nobody".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "CABINET_CLI_UNSAFE_WRITE");
        assert_eq!(std::fs::read(config.data_path()).unwrap(), before);

        // reads still work on what did load
        let stat = json_line(&run(&config, Command::Stat).unwrap());
        assert_eq!(stat["total"], 1);
        assert_eq!(std::fs::read(config.data_path()).unwrap(), before);
    }

    #[test]
    fn test_memory_snapshot_with_unreadable_line_is_not_rewritten() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::Memory);
        let before = write_snapshot(&config, &[stored(1, 'F')], "{\"id\": 2}\n");

        let err = run(&config, create_args("Bea")).unwrap_err();
        assert_eq!(err.code_str(), "CABINET_CLI_UNSAFE_WRITE");
        assert_eq!(std::fs::read(config.data_path()).unwrap(), before);
    }

    #[test]
    fn test_import_reports_unreadable_lines() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        let input = dir.path().join("in.jsonl");
        let mut bytes = Vec::new();
        write_records(&mut bytes, &[stored(1, 'F')]).unwrap();
        bytes.extend_from_slice(b"garbage\n");
        std::fs::write(&input, &bytes).unwrap();

        let report = json_line(&run(&config, Command::Import { input }).unwrap());
        assert_eq!(report["imported"], json!([1]));
        assert_eq!(report["unreadable_lines"], json!([2]));
    }

    #[test]
    fn test_edit_changes_only_given_fields() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        run(&config, create_args("Ann")).unwrap();

        run(
            &config,
            Command::Edit {
                id: 1,
                set: vec![(RecordField::Height, "181".to_string())],
            },
        )
        .unwrap();

        let record: Record =
            serde_json::from_str(run(&config, Command::Get { id: 1 }).unwrap().trim()).unwrap();
        assert_eq!(record.height, 181);
        assert_eq!(record.first_name, "Ann");
    }

    #[test]
    fn test_get_missing_record_fails() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        let err = run(&config, Command::Get { id: 9 }).unwrap_err();
        assert_eq!(err.code_str(), "CABINET_RECORD_NOT_FOUND");
    }

    #[test]
    fn test_invalid_create_reports_validation_code() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        let err = run(&config, create_args("A")).unwrap_err();
        assert_eq!(err.code_str(), "CABINET_VALIDATION_FAILED");
    }

    #[test]
    fn test_generate_then_import() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        let seed = dir.path().join("seed.jsonl");

        run(
            &config,
            Command::Generate {
                count: 5,
                start_id: 10,
                output: Some(seed.clone()),
            },
        )
        .unwrap();

        let report = json_line(&run(&config, Command::Import { input: seed }).unwrap());
        assert_eq!(report["imported"], json!([10, 11, 12, 13, 14]));
        assert_eq!(report["skipped"], json!([]));

        assert_eq!(json_line(&run(&config, create_args("Ann")).unwrap())["id"], 15);
    }

    #[test]
    fn test_generate_refuses_ids_past_the_maximum() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);

        let err = run(
            &config,
            Command::Generate {
                count: 2,
                start_id: i32::MAX,
                output: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.code_str(), "CABINET_CLI_INVALID_INPUT");

        let one = run(
            &config,
            Command::Generate {
                count: 1,
                start_id: i32::MAX,
                output: None,
            },
        )
        .unwrap();
        assert_eq!(one.lines().count(), 1);
    }

    #[test]
    fn test_update_and_purge() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, StorageKind::File);
        run(&config, create_args("Ann")).unwrap();
        run(&config, create_args("Bea")).unwrap();

        let updated = json_line(
            &run(
                &config,
                Command::Update {
                    set: vec![(RecordField::LastName, "Park".to_string())],
                    predicates: vec![],
                    operator: SearchOperator::And,
                },
            )
            .unwrap(),
        );
        assert_eq!(updated["updated"], json!([1, 2]));

        run(
            &config,
            Command::Delete {
                field: RecordField::LastName,
                value: "park".to_string(),
            },
        )
        .unwrap();
        let purged = json_line(&run(&config, Command::Purge).unwrap());
        assert_eq!(purged["purged"], 2);
    }
}
