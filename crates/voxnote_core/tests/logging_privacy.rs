use std::fs;
use voxnote_core::{init_logging, InMemoryKeyValueStore, NoteSnapshotRepository, NoteStore};

const SECRET: &str = "senha do cofre 4821";

#[test]
fn note_events_carry_ids_and_lengths_but_never_content() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    init_logging("debug", &log_dir.to_string_lossy()).unwrap();

    let mut store =
        NoteStore::load(NoteSnapshotRepository::new(InMemoryKeyValueStore::new())).unwrap();
    let note = store.create(SECRET).unwrap();
    store.delete(&note.id).unwrap();
    log::logger().flush();

    let mut logged = String::new();
    for entry in fs::read_dir(&log_dir).unwrap() {
        logged.push_str(&fs::read_to_string(entry.unwrap().path()).unwrap());
    }

    assert!(logged.contains("event=note_create module=service status=ok"));
    assert!(logged.contains(&format!("note_id={}", note.id)));
    assert!(logged.contains(&format!("content_len={}", SECRET.chars().count())));
    assert!(logged.contains("event=note_delete module=service status=ok"));
    assert!(!logged.contains(SECRET));
}
