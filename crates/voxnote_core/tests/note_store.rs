mod support;

use std::collections::HashSet;
use support::FlakyStore;
use voxnote_core::db::DbError;
use voxnote_core::{
    InMemoryKeyValueStore, KeyValueStore, LoadStatus, NoSecureSource, Note,
    NoteSnapshotRepository, NoteStore, NoteStoreError, NoteValidationError, RepoError,
    SqliteKeyValueStore, StorageError, UuidGenerator,
};

fn empty_store() -> NoteStore<InMemoryKeyValueStore> {
    NoteStore::load(NoteSnapshotRepository::new(InMemoryKeyValueStore::new())).unwrap()
}

fn contents(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|note| note.content.as_str()).collect()
}

fn stored_snapshot(store: &NoteStore<InMemoryKeyValueStore>) -> Option<String> {
    store.repository().storage().get("notes").unwrap()
}

#[test]
fn create_filter_delete_scenario() {
    let mut store = empty_store();

    store.create("Buy milk").unwrap();
    assert_eq!(contents(store.notes()), vec!["Buy milk"]);

    let walk = store.create("Walk dog").unwrap();
    assert_eq!(contents(store.notes()), vec!["Walk dog", "Buy milk"]);

    let filtered = store.filter("milk");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].content, "Buy milk");

    store.delete(&walk.id).unwrap();
    assert_eq!(contents(store.notes()), vec!["Buy milk"]);
}

#[test]
fn creates_are_newest_first_with_unique_ids() {
    let mut store = empty_store();
    for idx in 0..50 {
        store.create(format!("note {idx}")).unwrap();
    }

    let expected: Vec<String> = (0..50).rev().map(|idx| format!("note {idx}")).collect();
    let actual: Vec<String> = store.notes().iter().map(|n| n.content.clone()).collect();
    assert_eq!(actual, expected);

    let ids: HashSet<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn fallback_generator_still_yields_unique_ids() {
    let repo = NoteSnapshotRepository::new(InMemoryKeyValueStore::new());
    let mut store =
        NoteStore::load_with_generator(repo, UuidGenerator::with_source(NoSecureSource)).unwrap();
    for idx in 0..200 {
        store.create(format!("n{idx}")).unwrap();
    }
    let ids: HashSet<&str> = store.notes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), 200);
}

#[test]
fn blank_content_is_rejected_without_side_effects() {
    let mut store = empty_store();
    store.create("keep").unwrap();
    let snapshot_before = stored_snapshot(&store);
    let writes_before = store.repository().storage().write_count();

    for blank in ["", "   ", "\n\t"] {
        let err = store.create(blank).unwrap_err();
        assert!(matches!(
            err,
            NoteStoreError::Validation(NoteValidationError::EmptyContent)
        ));
    }

    assert_eq!(contents(store.notes()), vec!["keep"]);
    assert_eq!(stored_snapshot(&store), snapshot_before);
    assert_eq!(store.repository().storage().write_count(), writes_before);
}

#[test]
fn deleting_unknown_id_changes_nothing() {
    let mut store = empty_store();
    store.create("a").unwrap();
    let snapshot_before = stored_snapshot(&store);
    let writes_before = store.repository().storage().write_count();

    store.delete("does-not-exist").unwrap();

    assert_eq!(contents(store.notes()), vec!["a"]);
    assert_eq!(stored_snapshot(&store), snapshot_before);
    assert_eq!(store.repository().storage().write_count(), writes_before);
}

#[test]
fn snapshot_round_trips_through_load() {
    let mut store = empty_store();
    store.create("first").unwrap();
    store.create("second\nwith newline").unwrap();
    let original = store.notes().to_vec();

    let raw = stored_snapshot(&store).unwrap();
    let mut storage = InMemoryKeyValueStore::new();
    storage.set("notes", &raw).unwrap();
    let reloaded = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();

    assert_eq!(reloaded.load_status(), LoadStatus::Loaded);
    assert_eq!(reloaded.notes(), original.as_slice());
}

#[test]
fn snapshot_uses_documented_field_names() {
    let mut store = empty_store();
    let note = store.create("Buy milk").unwrap();

    let raw = stored_snapshot(&store).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], note.id.as_str());
    assert_eq!(entries[0]["content"], "Buy milk");
    assert!(entries[0]["date"].is_string());
}

#[test]
fn malformed_snapshot_loads_as_empty_and_is_overwritten_on_write() {
    let mut storage = InMemoryKeyValueStore::new();
    storage.set("notes", "definitely not json").unwrap();

    let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
    assert_eq!(store.load_status(), LoadStatus::Malformed);
    assert!(store.is_empty());

    store.create("fresh start").unwrap();
    let raw = stored_snapshot(&store).unwrap();
    let parsed: Vec<Note> = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[test]
fn quota_failure_surfaces_and_keeps_memory_in_sync_with_storage() {
    let mut seed = empty_store();
    seed.create("small").unwrap();
    let snapshot_before = stored_snapshot(&seed);

    let mut storage = InMemoryKeyValueStore::new();
    storage.set("notes", snapshot_before.as_deref().unwrap()).unwrap();
    storage.set_quota(Some(storage.used_bytes() + 10));
    let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();

    let err = store.create("x".repeat(500)).unwrap_err();
    assert!(matches!(
        err.storage_error(),
        Some(StorageError::QuotaExceeded { .. })
    ));
    assert_eq!(contents(store.notes()), vec!["small"]);
    assert_eq!(stored_snapshot(&store), snapshot_before);
}

#[test]
fn one_offset_less_date_does_not_discard_other_notes() {
    let mut storage = InMemoryKeyValueStore::new();
    storage
        .set(
            "notes",
            r#"[{"id":"a","date":"2024-02-01T12:30:00.000Z","content":"Buy milk"},
                {"id":"b","date":"2024-02-01T12:30:00","content":"Walk dog"}]"#,
        )
        .unwrap();

    let store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();

    assert_eq!(store.load_status(), LoadStatus::Loaded);
    assert_eq!(contents(store.notes()), vec!["Buy milk", "Walk dog"]);
    assert_eq!(store.notes()[0].created_at, store.notes()[1].created_at);
}

#[test]
fn undecodable_entry_is_dropped_and_the_rest_survive_the_next_write() {
    let mut storage = InMemoryKeyValueStore::new();
    storage
        .set(
            "notes",
            r#"[{"id":"a","date":"2024-02-01T12:30:00Z","content":"keep me"},
                {"id":"b","date":"not a date","content":"lost"}]"#,
        )
        .unwrap();

    let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
    assert_eq!(
        store.load_status(),
        LoadStatus::Repaired {
            invalid: 1,
            duplicates: 0
        }
    );

    store.create("new").unwrap();
    let raw = stored_snapshot(&store).unwrap();
    let parsed: Vec<Note> = serde_json::from_str(&raw).unwrap();
    assert_eq!(contents(&parsed), vec!["new", "keep me"]);
}

#[test]
fn storage_read_failure_at_load_is_returned() {
    let storage = FlakyStore::default();
    storage.fail_reads.set(true);

    let err = match NoteStore::load(NoteSnapshotRepository::new(storage)) {
        Ok(_) => panic!("load must fail when the backend read fails"),
        Err(err) => err,
    };

    assert!(matches!(
        err,
        NoteStoreError::Repo(RepoError::Storage(StorageError::Db(DbError::Sqlite(_))))
    ));
}

#[test]
fn failed_delete_write_restores_note_at_its_position() {
    let storage = FlakyStore::default();
    let fail_writes = storage.fail_writes.clone();
    let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
    store.create("a").unwrap();
    let middle = store.create("b").unwrap();
    store.create("c").unwrap();
    let snapshot_before = store.repository().storage().inner.get("notes").unwrap();

    fail_writes.set(true);
    let err = store.delete(&middle.id).unwrap_err();

    assert!(matches!(err.storage_error(), Some(StorageError::Db(_))));
    assert_eq!(contents(store.notes()), vec!["c", "b", "a"]);
    assert_eq!(
        store.repository().storage().inner.get("notes").unwrap(),
        snapshot_before
    );

    fail_writes.set(false);
    store.delete(&middle.id).unwrap();
    assert_eq!(contents(store.notes()), vec!["c", "a"]);
}

#[test]
fn sqlite_backend_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let created_id = {
        let storage = SqliteKeyValueStore::open(&path).unwrap();
        let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
        assert_eq!(store.load_status(), LoadStatus::Missing);
        store.create("Buy milk").unwrap();
        store.create("Walk dog").unwrap().id
    };

    let storage = SqliteKeyValueStore::open(&path).unwrap();
    let mut store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
    assert_eq!(contents(store.notes()), vec!["Walk dog", "Buy milk"]);

    store.delete(&created_id).unwrap();
    drop(store);

    let storage = SqliteKeyValueStore::open(&path).unwrap();
    let store = NoteStore::load(NoteSnapshotRepository::new(storage)).unwrap();
    assert_eq!(contents(store.notes()), vec!["Buy milk"]);
}
