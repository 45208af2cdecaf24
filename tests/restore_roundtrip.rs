//! Snapshot / Restore Tests
//!
//! - restore imports every valid record and reports each invalid one by id
//! - an invalid record is never partially applied
//! - snapshot then restore into an empty store reproduces the visible set
//! - the JSON-lines codec carries a snapshot between backends

use chrono::NaiveDate;
use filecabinet::codec::{JsonLinesCodec, RecordCodec};
use filecabinet::record::{Record, RecordField, RecordId, RecordParameters, Salary};
use filecabinet::store::{FileBackend, MemoryBackend, RecordStore, Snapshot};
use filecabinet::validation::{ValidationPipeline, ValidationRules};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn pipeline() -> ValidationPipeline {
    ValidationPipeline::from_rules(&ValidationRules::default_rules())
}

fn record(id: RecordId, first: &str, height: i16) -> Record {
    Record::new(
        id,
        RecordParameters::new(
            first,
            "Okafor",
            NaiveDate::from_ymd_opt(1970 + id, 3, 1 + id as u32).unwrap(),
            height,
            Salary::from_cents(100_000 + i64::from(id)),
            if id % 2 == 0 { 'F' } else { 'M' },
        ),
    )
}

/// Five records, #2 with an impossible height.
fn batch() -> Snapshot {
    Snapshot::new(vec![
        record(1, "Ada", 170),
        record(2, "Bola", 12),
        record(3, "Chidi", 180),
        record(4, "Dayo", 165),
        record(5, "Emeka", 190),
    ])
}

fn stores(dir: &TempDir) -> Vec<Box<dyn RecordStore>> {
    vec![
        Box::new(MemoryBackend::new(pipeline())),
        Box::new(FileBackend::open(dir.path().join("cabinet.db"), pipeline()).unwrap()),
    ]
}

fn ids(records: &[Record]) -> Vec<RecordId> {
    records.iter().map(|r| r.id).collect()
}

// =============================================================================
// Restore
// =============================================================================

#[test]
fn test_restore_skips_invalid_record() {
    let dir = TempDir::new().unwrap();
    for mut store in stores(&dir) {
        let report = store.restore(&batch()).unwrap();

        assert_eq!(report.imported(), &[1, 3, 4, 5]);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(report.skipped()[0].id, 2);
        assert!(report.skipped()[0].reason.contains("height"));

        let summary = report.to_string();
        assert!(summary.starts_with("4 record(s) imported, 1 skipped"));
        assert!(summary.contains("record #2 skipped"));

        assert_eq!(ids(&store.records().unwrap()), vec![1, 3, 4, 5]);
        assert!(store.get(2).unwrap().is_none());
    }
}

#[test]
fn test_restore_upserts_over_existing_records() {
    let dir = TempDir::new().unwrap();
    for mut store in stores(&dir) {
        store.insert(record(3, "Old", 150)).unwrap();
        store.insert(record(9, "Kept", 150)).unwrap();

        store.restore(&batch()).unwrap();

        let records = store.records().unwrap();
        assert_eq!(ids(&records), vec![3, 9, 1, 4, 5], "{}", store.kind());
        assert_eq!(store.get(3).unwrap().unwrap().first_name, "Chidi");
    }
}

#[test]
fn test_restore_invalid_replacement_keeps_original() {
    let dir = TempDir::new().unwrap();
    for mut store in stores(&dir) {
        store.insert(record(2, "Bola", 160)).unwrap();

        let report = store.restore(&batch()).unwrap();
        assert_eq!(report.skipped()[0].id, 2);
        assert_eq!(store.get(2).unwrap().unwrap().height, 160);
    }
}

#[test]
fn test_restore_reports_non_positive_ids() {
    let dir = TempDir::new().unwrap();
    for mut store in stores(&dir) {
        let snapshot = Snapshot::new(vec![record(0, "Zero", 170), record(1, "Ada", 170)]);
        let report = store.restore(&snapshot).unwrap();

        assert_eq!(report.imported(), &[1]);
        assert_eq!(report.skipped()[0].id, 0);
        assert!(report.skipped()[0].reason.contains("id"));
    }
}

#[test]
fn test_restore_clears_memoized_searches() {
    let mut store = MemoryBackend::new(pipeline());
    store.insert(record(1, "Ada", 170)).unwrap();
    let query = filecabinet::store::Query::and().with(RecordField::LastName, "okafor");
    assert_eq!(store.search(&query).unwrap().len(), 1);

    store.restore(&batch()).unwrap();
    assert_eq!(store.cached_queries(), 0);
    assert_eq!(store.search(&query).unwrap().len(), 4);
}

// =============================================================================
// Round trip
// =============================================================================

#[test]
fn test_snapshot_restore_reproduces_visible_set() {
    let dir = TempDir::new().unwrap();
    let fresh_dir = TempDir::new().unwrap();
    for (mut source, mut target) in stores(&dir).into_iter().zip(stores(&fresh_dir)) {
        source.restore(&batch()).unwrap();
        source.delete(RecordField::FirstName, "dayo").unwrap();
        source
            .edit(5, &record(5, "Emeka", 199).parameters())
            .unwrap();

        let snapshot = source.snapshot().unwrap();
        let report = target.restore(&snapshot).unwrap();
        assert!(report.skipped().is_empty());

        assert_eq!(target.records().unwrap(), source.records().unwrap());
        assert_eq!(ids(&target.records().unwrap()), vec![1, 3, 5]);
    }
}

#[test]
fn test_json_lines_carry_snapshot_between_backends() {
    let dir = TempDir::new().unwrap();
    let mut memory = MemoryBackend::new(pipeline());
    memory.restore(&batch()).unwrap();

    let mut bytes = Vec::new();
    JsonLinesCodec
        .encode(memory.snapshot().unwrap().records(), &mut bytes)
        .unwrap();
    let decoded = JsonLinesCodec.decode(&mut bytes.as_slice()).unwrap();
    assert!(decoded.is_complete());

    let mut file = FileBackend::open(dir.path().join("cabinet.db"), pipeline()).unwrap();
    file.restore(&Snapshot::new(decoded.records)).unwrap();

    assert_eq!(file.records().unwrap(), memory.records().unwrap());
}
