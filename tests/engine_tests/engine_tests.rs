//! Tests for Engine
//!
//! These tests verify:
//! - Table creation, listing, and validation
//! - Insert / lookup / scan with schema-width truncation
//! - Update column mapping, padding, and append-only versioning
//! - Delete tombstones and not-found behavior
//! - Rejection of line breaks before anything is written
//! - Column filtering
//! - Command execution
//! - Concurrent access patterns

use std::fs;
use std::io::BufReader;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ledgerdb::config::{Config, SyncStrategy};
use ledgerdb::engine::Engine;
use ledgerdb::index::replay;
use ledgerdb::protocol::{Command, Reply};
use ledgerdb::row;
use ledgerdb::LedgerError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .sync_strategy(SyncStrategy::OsBuffered)
        .build();
    let engine = Engine::open(config).unwrap();
    (temp_dir, engine)
}

fn setup_tx_engine() -> (TempDir, Engine) {
    let (temp, engine) = setup_temp_engine();
    engine
        .create_table("tx", &["id int", "merchant text", "amount int"])
        .unwrap();
    (temp, engine)
}

/// Every line of a table's log, decoded
fn log_records(engine: &Engine, table: &str) -> Vec<Vec<String>> {
    fs::read_to_string(engine.table_path(table))
        .unwrap()
        .lines()
        .map(|line| row::decode(line).unwrap())
        .collect()
}

// =============================================================================
// Table Tests
// =============================================================================

#[test]
fn test_create_table_creates_file_and_metadata() {
    let (temp, engine) = setup_tx_engine();

    assert!(engine.table_path("tx").exists());
    assert!(temp.path().join("metadata.json").exists());
    assert_eq!(engine.list_tables(), vec!["tx"]);
    assert_eq!(engine.live_count("tx").unwrap(), 0);
}

#[test]
fn test_create_duplicate_table_fails() {
    let (_temp, engine) = setup_tx_engine();

    let err = engine.create_table("tx", &["id int"]).unwrap_err();

    assert!(matches!(err, LedgerError::TableExists(ref name) if name == "tx"));
}

#[test]
fn test_create_table_validation() {
    let (_temp, engine) = setup_temp_engine();
    let no_columns: [&str; 0] = [];

    assert!(matches!(
        engine.create_table("bad/name", &["id"]),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        engine.create_table("t", &no_columns),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        engine.create_table("t", &["id", "ID text"]),
        Err(LedgerError::Validation(_))
    ));
    assert!(engine.list_tables().is_empty());
}

#[test]
fn test_list_tables_sorted() {
    let (_temp, engine) = setup_temp_engine();
    for name in ["zeta", "alpha", "mid"] {
        engine.create_table(name, &["id"]).unwrap();
    }

    assert_eq!(engine.list_tables(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_describe() {
    let (_temp, engine) = setup_tx_engine();

    assert_eq!(
        engine.describe("tx").unwrap(),
        vec!["id int", "merchant text", "amount int"]
    );
    assert!(matches!(engine.describe("nope"), Err(LedgerError::TableNotFound(_))));
}

// =============================================================================
// Insert / Lookup Tests
// =============================================================================

#[test]
fn test_insert_then_lookup() {
    let (_temp, engine) = setup_tx_engine();

    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap(), vec!["1", "1", "Coffee", "550"]);
}

#[test]
fn test_lookup_truncates_to_schema_width() {
    let (_temp, engine) = setup_tx_engine();

    engine
        .insert("tx", &["1", "1", "Coffee", "550", "legacy", "extra"])
        .unwrap();

    // 3 declared columns -> width 5
    assert_eq!(
        engine.lookup("tx", "1").unwrap(),
        vec!["1", "1", "Coffee", "550", "legacy"]
    );
}

#[test]
fn test_insert_too_few_fields() {
    let (_temp, engine) = setup_tx_engine();

    assert!(matches!(engine.insert("tx", &["1"]), Err(LedgerError::Validation(_))));
    let empty: [&str; 0] = [];
    assert!(matches!(engine.insert("tx", &empty), Err(LedgerError::Validation(_))));
}

#[test]
fn test_insert_unknown_table() {
    let (_temp, engine) = setup_temp_engine();

    let err = engine.insert("ghost", &["1", "1"]).unwrap_err();

    assert!(matches!(err, LedgerError::TableNotFound(_)));
    assert!(!engine.table_path("ghost").exists());
}

#[test]
fn test_reinsert_repoints_key() {
    let (_temp, engine) = setup_tx_engine();

    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.insert("tx", &["1", "1", "Tea", "300"]).unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap()[2], "Tea");
    assert_eq!(engine.live_count("tx").unwrap(), 1);
    // Both physical records remain
    assert_eq!(log_records(&engine, "tx").len(), 2);
}

#[test]
fn test_insert_tombstone_flag_removes_key() {
    let (_temp, engine) = setup_tx_engine();

    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.insert("tx", &["1", "0", "Coffee", "550"]).unwrap();

    assert!(matches!(engine.lookup("tx", "1"), Err(LedgerError::KeyNotFound { .. })));
}

#[test]
fn test_lookup_not_found() {
    let (_temp, engine) = setup_tx_engine();

    let err = engine.lookup("tx", "404").unwrap_err();
    assert!(matches!(err, LedgerError::KeyNotFound { ref key, .. } if key == "404"));

    let err = engine.lookup("nope", "1").unwrap_err();
    assert!(matches!(err, LedgerError::TableNotFound(_)));
}

#[test]
fn test_line_breaks_rejected_before_write() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    let len_before = fs::metadata(engine.table_path("tx")).unwrap().len();

    assert!(matches!(
        engine.insert("tx", &["k", "1", "x\ny", "1"]),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        engine.insert("tx", &["k\n2", "1"]),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        engine.update("tx", "1", &[("merchant", "Tea\nTime")]),
        Err(LedgerError::Validation(_))
    ));

    assert_eq!(fs::metadata(engine.table_path("tx")).unwrap().len(), len_before);
    assert_eq!(engine.lookup("tx", "1").unwrap(), vec!["1", "1", "Coffee", "550"]);
    assert!(matches!(engine.lookup("tx", "k"), Err(LedgerError::KeyNotFound { .. })));
    assert_eq!(engine.scan_all("tx").unwrap().len(), 1);

    let file = fs::File::open(engine.table_path("tx")).unwrap();
    let (replayed, _) = replay(BufReader::new(file)).unwrap();
    assert_eq!(replayed, engine.index_snapshot("tx").unwrap());
}

#[test]
fn test_delimiter_in_field_splits_on_read() {
    let (_temp, engine) = setup_tx_engine();

    engine.insert("tx", &["p", "1", "a|b", "5"]).unwrap();

    assert_eq!(engine.lookup("tx", "p").unwrap(), vec!["p", "1", "a", "b", "5"]);
}

// =============================================================================
// Scan Tests
// =============================================================================

#[test]
fn test_scan_all_in_log_order() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["3", "1", "c", "3"]).unwrap();
    engine.insert("tx", &["1", "1", "a", "1"]).unwrap();
    engine.insert("tx", &["2", "1", "b", "2"]).unwrap();

    let keys: Vec<String> = engine
        .scan_all("tx")
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();

    assert_eq!(keys, vec!["3", "1", "2"]);
}

#[test]
fn test_scan_all_updated_row_moves_last() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "a", "1"]).unwrap();
    engine.insert("tx", &["2", "1", "b", "2"]).unwrap();

    engine.update("tx", "1", &[("amount", "10")]).unwrap();

    let rows = engine.scan_all("tx").unwrap();
    assert_eq!(rows[0][0], "2");
    assert_eq!(rows[1], vec!["1", "1", "a", "10"]);
}

#[test]
fn test_scan_all_empty_and_unknown() {
    let (_temp, engine) = setup_tx_engine();

    assert!(engine.scan_all("tx").unwrap().is_empty());
    assert!(matches!(engine.scan_all("nope"), Err(LedgerError::TableNotFound(_))));
}

#[test]
fn test_scan_all_aborts_on_tampered_row() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.insert("tx", &["2", "1", "Taxi", "1200"]).unwrap();

    let path = engine.table_path("tx");
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replacen("Taxi", "Tax1", 1)).unwrap();

    assert!(matches!(engine.scan_all("tx"), Err(LedgerError::Integrity { .. })));
    // Untampered row is still readable on its own
    assert_eq!(engine.lookup("tx", "1").unwrap()[2], "Coffee");
    assert!(matches!(engine.lookup("tx", "2"), Err(LedgerError::Integrity { .. })));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_columns_case_insensitive() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    engine
        .update("tx", "1", &[("MERCHANT", "Tea"), ("Amount", "300")])
        .unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap(), vec!["1", "1", "Tea", "300"]);
}

#[test]
fn test_update_appends_new_version() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    let before = engine.index_snapshot("tx").unwrap().get("1").unwrap();

    engine.update("tx", "1", &[("amount", "600")]).unwrap();

    let after = engine.index_snapshot("tx").unwrap().get("1").unwrap();
    assert!(after > before);
    let records = log_records(&engine, "tx");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], vec!["1", "1", "Coffee", "550"]);
    assert_eq!(records[1], vec!["1", "1", "Coffee", "600"]);
}

#[test]
fn test_update_pads_short_row_and_drops_extras() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1"]).unwrap();
    engine.insert("tx", &["2", "1", "a", "b", "legacy"]).unwrap();

    engine.update("tx", "1", &[("amount", "550")]).unwrap();
    engine.update("tx", "2", &[("merchant", "z")]).unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap(), vec!["1", "1", "", "550"]);
    assert_eq!(engine.lookup("tx", "2").unwrap(), vec!["2", "1", "z", "b"]);
}

#[test]
fn test_update_key_column_keeps_index_key() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    engine.update("tx", "1", &[("id", "99")]).unwrap();

    // Stored key field changes, index key does not
    assert_eq!(engine.lookup("tx", "1").unwrap()[0], "99");
    assert!(matches!(engine.lookup("tx", "99"), Err(LedgerError::KeyNotFound { .. })));
}

#[test]
fn test_update_last_duplicate_wins() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    engine
        .update("tx", "1", &[("amount", "1"), ("AMOUNT", "2")])
        .unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap()[3], "2");
}

#[test]
fn test_update_unknown_column_writes_nothing() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    let len_before = fs::metadata(engine.table_path("tx")).unwrap().len();

    let err = engine
        .update("tx", "1", &[("amount", "9"), ("color", "red")])
        .unwrap_err();

    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(fs::metadata(engine.table_path("tx")).unwrap().len(), len_before);
    assert_eq!(engine.lookup("tx", "1").unwrap()[3], "550");
}

#[test]
fn test_update_errors() {
    let (_temp, engine) = setup_tx_engine();
    let none: [(&str, &str); 0] = [];

    assert!(matches!(
        engine.update("tx", "1", &[("amount", "1")]),
        Err(LedgerError::KeyNotFound { .. })
    ));
    assert!(matches!(
        engine.update("nope", "1", &[("amount", "1")]),
        Err(LedgerError::TableNotFound(_))
    ));
    assert!(matches!(
        engine.update("tx", "1", &none),
        Err(LedgerError::Validation(_))
    ));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_lookup_not_found() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    engine.delete("tx", "1").unwrap();

    assert!(matches!(engine.lookup("tx", "1"), Err(LedgerError::KeyNotFound { .. })));
    assert_eq!(engine.live_count("tx").unwrap(), 0);
}

#[test]
fn test_delete_writes_full_tombstone() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    engine.delete("tx", "1").unwrap();

    let records = log_records(&engine, "tx");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1], vec!["1", "0", "Coffee", "550"]);
}

#[test]
fn test_delete_missing_key() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.delete("tx", "1").unwrap();

    assert!(matches!(engine.delete("tx", "1"), Err(LedgerError::KeyNotFound { .. })));
    assert!(matches!(engine.delete("nope", "1"), Err(LedgerError::TableNotFound(_))));
    assert_eq!(log_records(&engine, "tx").len(), 2);
}

#[test]
fn test_reinsert_after_delete_resurrects() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.delete("tx", "1").unwrap();

    engine.insert("tx", &["1", "1", "Tea", "300"]).unwrap();

    assert_eq!(engine.lookup("tx", "1").unwrap(), vec!["1", "1", "Tea", "300"]);
}

// =============================================================================
// Select By Column Tests
// =============================================================================

#[test]
fn test_select_by_column() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.insert("tx", &["2", "1", "Taxi", "1200"]).unwrap();
    engine.insert("tx", &["3", "1", "coffee", "480"]).unwrap();

    let rows = engine.select_by_column("tx", "Merchant", "COFFEE").unwrap();
    let keys: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(keys, vec!["1", "3"]);

    let by_key = engine.select_by_column("tx", "id", "2").unwrap();
    assert_eq!(by_key, vec![vec!["2", "1", "Taxi", "1200"]]);

    assert!(engine.select_by_column("tx", "amount", "0").unwrap().is_empty());
}

#[test]
fn test_select_by_column_skips_deleted_rows() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();
    engine.insert("tx", &["2", "1", "Coffee", "600"]).unwrap();
    engine.delete("tx", "1").unwrap();

    let rows = engine.select_by_column("tx", "merchant", "coffee").unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "2");
}

#[test]
fn test_select_by_column_folds_per_character() {
    let (_temp, engine) = setup_tx_engine();
    engine.insert("tx", &["1", "1", "ΟΔΟΣ", "10"]).unwrap();
    engine.insert("tx", &["2", "1", "Straße", "20"]).unwrap();

    let sigma = engine.select_by_column("tx", "merchant", "οδοσ").unwrap();
    assert_eq!(sigma.len(), 1);
    assert_eq!(sigma[0][0], "1");

    let sharp_s = engine.select_by_column("tx", "merchant", "STRASSE").unwrap();
    assert!(sharp_s.is_empty());
    let exact = engine.select_by_column("tx", "merchant", "STRAßE").unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0][0], "2");
}

#[test]
fn test_select_by_column_errors() {
    let (_temp, engine) = setup_tx_engine();

    assert!(matches!(
        engine.select_by_column("tx", "color", "red"),
        Err(LedgerError::ColumnNotFound { ref column, .. }) if column == "color"
    ));
    assert!(matches!(
        engine.select_by_column("nope", "id", "1"),
        Err(LedgerError::TableNotFound(_))
    ));
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[test]
fn test_execute_each_command() {
    let (_temp, engine) = setup_temp_engine();

    let reply = engine
        .execute(Command::CreateTable {
            name: "tx".to_string(),
            columns: vec!["id int".to_string(), "merchant text".to_string()],
        })
        .unwrap();
    assert_eq!(reply, Reply::Done);

    engine
        .execute(Command::Insert {
            table: "tx".to_string(),
            row: vec!["1".to_string(), "1".to_string(), "Coffee".to_string()],
        })
        .unwrap();

    assert_eq!(
        engine.execute(Command::ListTables).unwrap(),
        Reply::Tables(vec!["tx".to_string()])
    );
    assert_eq!(
        engine
            .execute(Command::SelectById {
                table: "tx".to_string(),
                key: "1".to_string(),
            })
            .unwrap(),
        Reply::Row(vec!["1".to_string(), "1".to_string(), "Coffee".to_string()])
    );

    engine
        .execute(Command::Update {
            table: "tx".to_string(),
            key: "1".to_string(),
            updates: vec![("merchant".to_string(), "Tea".to_string())],
        })
        .unwrap();
    assert_eq!(
        engine
            .execute(Command::SelectByColumn {
                table: "tx".to_string(),
                column: "merchant".to_string(),
                value: "tea".to_string(),
            })
            .unwrap(),
        Reply::Rows(vec![vec!["1".to_string(), "1".to_string(), "Tea".to_string()]])
    );

    engine
        .execute(Command::Delete {
            table: "tx".to_string(),
            key: "1".to_string(),
        })
        .unwrap();
    assert_eq!(
        engine
            .execute(Command::SelectAll {
                table: "tx".to_string()
            })
            .unwrap(),
        Reply::Rows(vec![])
    );
    assert_eq!(engine.execute(Command::Ping).unwrap(), Reply::Pong);
}

#[test]
fn test_execute_propagates_errors() {
    let (_temp, engine) = setup_temp_engine();

    let err = engine
        .execute(Command::Describe {
            table: "nope".to_string(),
        })
        .unwrap_err();

    assert!(err.is_not_found());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_distinct_inserts() {
    let (_temp, engine) = setup_tx_engine();
    let engine = Arc::new(engine);
    let threads = 8;
    let per_thread = 50;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let key = format!("{}-{}", t, i);
                    let amount = (t * 1000 + i).to_string();
                    engine.insert("tx", &[key.as_str(), "1", "m", amount.as_str()]).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.live_count("tx").unwrap(), threads * per_thread);
    for t in 0..threads {
        for i in 0..per_thread {
            let row = engine.lookup("tx", &format!("{}-{}", t, i)).unwrap();
            assert_eq!(row[3], (t * 1000 + i).to_string());
        }
    }

    // The live index matches a replay of the log
    let file = fs::File::open(engine.table_path("tx")).unwrap();
    let (replayed, _) = replay(BufReader::new(file)).unwrap();
    assert_eq!(replayed, engine.index_snapshot("tx").unwrap());
}

#[test]
fn test_concurrent_same_key_writes_match_log_order() {
    let (_temp, engine) = setup_tx_engine();
    let engine = Arc::new(engine);
    engine.insert("tx", &["hot", "1", "seed", "0"]).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..25 {
                    let amount = format!("{}", t * 100 + i);
                    match i % 3 {
                        0 => engine.insert("tx", &["hot", "1", "ins", amount.as_str()]).unwrap(),
                        1 => {
                            let _ = engine.update("tx", "hot", &[("amount", amount.as_str())]);
                        }
                        _ => {
                            let _ = engine.delete("tx", "hot");
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let file = fs::File::open(engine.table_path("tx")).unwrap();
    let (replayed, _) = replay(BufReader::new(file)).unwrap();
    assert_eq!(replayed, engine.index_snapshot("tx").unwrap());
}

#[test]
fn test_concurrent_readers_and_writers() {
    let (_temp, engine) = setup_tx_engine();
    let engine = Arc::new(engine);
    for i in 0..20 {
        let key = i.to_string();
        engine.insert("tx", &[key.as_str(), "1", "base", "0"]).unwrap();
    }

    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            for i in 20..120 {
                let key = i.to_string();
                engine.insert("tx", &[key.as_str(), "1", "new", "1"]).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for _ in 0..50 {
                    for i in 0..20 {
                        let row = engine.lookup("tx", &i.to_string()).unwrap();
                        assert_eq!(row[2], "base");
                    }
                    assert!(engine.scan_all("tx").unwrap().len() >= 20);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(engine.live_count("tx").unwrap(), 120);
}

#[cfg(unix)]
#[test]
fn test_index_reads_not_blocked_by_append_to_other_table() {
    use std::io::Read;
    use std::process::Command as Process;

    use crossbeam::channel::bounded;

    let (_temp, engine) = setup_tx_engine();
    engine.create_table("slow", &["id"]).unwrap();
    engine.insert("tx", &["1", "1", "Coffee", "550"]).unwrap();

    // With no reader on the FIFO, opening it for append blocks
    let fifo = engine.table_path("slow");
    fs::remove_file(&fifo).unwrap();
    assert!(Process::new("mkfifo").arg(&fifo).status().unwrap().success());

    let engine = Arc::new(engine);
    let writer = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.insert("slow", &["k", "1"]))
    };
    thread::sleep(Duration::from_millis(100));

    let (done_tx, done_rx) = bounded(1);
    let reader = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            let tables = engine.list_tables();
            let live = engine.live_count("tx").unwrap();
            let columns = engine.describe("tx").unwrap().len();
            let _ = done_tx.send((tables, live, columns));
        })
    };

    let (tables, live, columns) = done_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("index reads waited on an append to another table");
    assert_eq!(tables, vec!["slow", "tx"]);
    assert_eq!(live, 1);
    assert_eq!(columns, 3);

    // Drain the FIFO so the blocked append can finish
    let mut pipe = fs::File::open(&fifo).unwrap();
    let mut written = String::new();
    pipe.read_to_string(&mut written).unwrap();

    writer.join().unwrap().unwrap();
    reader.join().unwrap();
    assert!(written.starts_with("k|1|"));
    assert_eq!(engine.live_count("slow").unwrap(), 1);
}
