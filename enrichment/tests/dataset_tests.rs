use std::{env, fs, process};

use common::{generate_unique_id, sample_record};
use enrichment::dataset::{DatasetError, DatasetStore, RecordStore};
use serde_json::{json, Value};

fn store_from(rows: Vec<Value>) -> DatasetStore {
    DatasetStore::from_rows(rows, "test-dataset".to_string())
}

#[test]
fn find_by_exact_transaction_id() {
    let store = store_from(vec![
        sample_record("tx_a", "x@e.com", "2026-01-01T00:00:00Z"),
        sample_record("tx_b", "y@e.com", "2026-01-02T00:00:00Z"),
    ]);

    let row = store.find("tx_b", "nobody@nowhere.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_b"));
}

#[test]
fn exact_id_wins_over_email_resolution() {
    let store = store_from(vec![
        sample_record("tx_a", "shared@e.com", "2026-01-01T00:00:00Z"),
        sample_record("tx_b", "shared@e.com", "2026-02-01T00:00:00Z"),
    ]);

    // tx_a is older, but the id match short-circuits the email index.
    let row = store.find("tx_a", "shared@e.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_a"));
}

#[test]
fn email_resolution_picks_most_recent_record() {
    let store = store_from(vec![
        sample_record("tx_old", "x@e.com", "2026-01-01T00:00:00Z"),
        sample_record("tx_new", "x@e.com", "2026-03-01T00:00:00Z"),
        sample_record("tx_mid", "x@e.com", "2026-02-01T00:00:00Z"),
    ]);

    let row = store.find("unknown", "x@e.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_new"));
}

#[test]
fn unparsable_timestamps_sort_as_oldest() {
    let store = store_from(vec![
        sample_record("tx_bad", "x@e.com", "not-a-timestamp"),
        sample_record("tx_good", "x@e.com", "2020-01-01T00:00:00Z"),
    ]);

    let row = store.find("", "x@e.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_good"));
}

#[test]
fn all_unparsable_timestamps_keep_insertion_order() {
    let store = store_from(vec![
        sample_record("tx_first", "x@e.com", "garbage"),
        sample_record("tx_second", "x@e.com", "also-garbage"),
    ]);

    let row = store.find("", "x@e.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_first"));
}

#[test]
fn equal_timestamps_keep_insertion_order() {
    let store = store_from(vec![
        sample_record("tx_first", "x@e.com", "2026-01-01T00:00:00Z"),
        sample_record("tx_second", "x@e.com", "2026-01-01T00:00:00Z"),
    ]);

    let row = store.find("", "x@e.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_first"));
}

#[test]
fn email_lookup_is_trimmed_and_case_insensitive() {
    let store = store_from(vec![sample_record(
        "tx_a",
        "  Vik@Example.COM ",
        "2026-01-01T00:00:00Z",
    )]);

    let row = store.find("", "vik@example.com").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_a"));

    let row = store.find("", " VIK@EXAMPLE.COM  ").expect("hit");
    assert_eq!(row["transaction"]["transaction_id"], json!("tx_a"));
}

#[test]
fn unknown_id_and_email_is_a_miss_not_an_error() {
    let store = store_from(vec![sample_record("tx_a", "x@e.com", "2026-01-01T00:00:00Z")]);
    assert!(store.find("tx_zzz", "nobody@nowhere.com").is_none());
}

#[test]
fn duplicate_transaction_ids_last_write_wins() {
    let mut first = sample_record("tx_dup", "x@e.com", "2026-01-01T00:00:00Z");
    first["transaction"]["status"] = json!("Declined");
    let mut second = sample_record("tx_dup", "x@e.com", "2026-01-01T00:00:00Z");
    second["transaction"]["status"] = json!("Completed");

    let store = store_from(vec![first, second]);

    assert_eq!(store.count(), 1);
    let row = store.find("tx_dup", "").expect("hit");
    assert_eq!(row["transaction"]["status"], json!("Completed"));
}

#[test]
fn rows_without_transaction_id_are_skipped() {
    let store = store_from(vec![
        json!({ "customer": { "email": "x@e.com" } }),
        sample_record("tx_a", "x@e.com", "2026-01-01T00:00:00Z"),
    ]);

    assert_eq!(store.count(), 1);
}

#[tokio::test]
async fn load_with_missing_file_yields_empty_store() {
    let store = DatasetStore::load("does/not/exist.json")
        .await
        .expect("missing file should not be an error");

    assert_eq!(store.count(), 0);
    assert!(store.find("tx_a", "x@e.com").is_none());
}

#[tokio::test]
async fn load_with_malformed_json_is_an_error() {
    let path = env::temp_dir().join(format!(
        "{}-{}.json",
        generate_unique_id("bad-dataset"),
        process::id()
    ));
    fs::write(&path, "this is not json").expect("temp file should be written");

    let result = DatasetStore::load(&path).await;
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(DatasetError::Parse { .. })));
}

#[tokio::test]
async fn load_with_valid_file_indexes_records() {
    let path = env::temp_dir().join(format!(
        "{}-{}.json",
        generate_unique_id("dataset"),
        process::id()
    ));
    let rows = json!([
        sample_record("tx_a", "x@e.com", "2026-01-01T00:00:00Z"),
        sample_record("tx_b", "y@e.com", "2026-01-02T00:00:00Z"),
    ]);
    fs::write(&path, serde_json::to_string(&rows).unwrap()).expect("temp file should be written");

    let store = DatasetStore::load(&path).await.expect("load should succeed");
    fs::remove_file(&path).ok();

    assert_eq!(store.count(), 2);
    assert!(store.find("tx_a", "").is_some());
    assert!(store.find("", "y@e.com").is_some());
}
