//! Keyed-store contract tests
//!
//! Exercises the shared store contract against both backends: replace-on-save,
//! no-op delete of absent keys, the NotFound/AccessDenied distinction, and
//! the no-torn-read guarantee under concurrent access.
//!
//! These tests are self-contained and do not touch the OS credential store.
//!
//! Run with: cargo test --test store_test

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread;

use keeper_vault::{
    FileStore, KeyedStore, MemoryEnclave, SecretStore, StoreError, StoreKey,
};

// ============================================================================
// Helpers
// ============================================================================

struct NoteKey(&'static str);

impl StoreKey for NoteKey {
    fn storage_key(&self) -> String {
        format!("note.{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Note {
    title: String,
    lines: Vec<String>,
}

fn note(title: &str, line_count: usize) -> Note {
    Note {
        title: title.to_string(),
        lines: (0..line_count).map(|i| format!("{}-{}", title, i)).collect(),
    }
}

fn file_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path().join("vault"));
    (dir, store)
}

fn secret_store() -> SecretStore<MemoryEnclave> {
    SecretStore::new("keeper-vault-test", MemoryEnclave::new())
}

// ============================================================================
// Contract: load / save / delete
// ============================================================================

#[test]
fn test_file_store_load_absent_is_not_found() {
    let (_dir, store) = file_store();
    let result: Result<Note, _> = store.load(&NoteKey("missing"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_file_store_save_replaces_prior_value() {
    let (_dir, store) = file_store();
    let key = NoteKey("replace");

    store.save(&note("first", 3), &key).unwrap();
    store.save(&note("second", 5), &key).unwrap();

    let loaded: Note = store.load(&key).unwrap();
    assert_eq!(loaded, note("second", 5));
}

#[test]
fn test_file_store_delete_absent_is_noop_success() {
    let (_dir, store) = file_store();
    let key = NoteKey("never-written");

    <FileStore as KeyedStore<NoteKey, Note>>::delete(&store, &key).unwrap();

    store.save(&note("written", 1), &key).unwrap();
    <FileStore as KeyedStore<NoteKey, Note>>::delete(&store, &key).unwrap();
    let result: Result<Note, _> = store.load(&key);
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_file_store_corrupt_record_surfaces_as_corrupt_not_absent() {
    let (_dir, store) = file_store();
    let key = NoteKey("corrupt");
    store.save(&note("ok", 2), &key).unwrap();

    let path = store.base_dir().join("note.corrupt.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let result: Result<Note, _> = store.load(&key);
    assert!(matches!(result, Err(StoreError::CorruptData(_))));
}

#[test]
fn test_secret_store_duplicate_save_leaves_single_value() {
    let store = secret_store();
    let key = NoteKey("mnemonic-slot");

    store.save(&note("old", 2), &key).unwrap();
    // Second save hits the existing enclave item and must update it in place.
    store.save(&note("new", 2), &key).unwrap();

    let loaded: Note = store.load(&key).unwrap();
    assert_eq!(loaded, note("new", 2));
}

#[test]
fn test_secret_store_delete_absent_is_noop_success() {
    let store = secret_store();
    let key = NoteKey("never-written");
    <SecretStore<MemoryEnclave> as KeyedStore<NoteKey, Note>>::delete(&store, &key).unwrap();
    let result: Result<Note, _> = store.load(&key);
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}

#[test]
fn test_secret_store_locked_device_is_access_denied_not_not_found() {
    let store = secret_store();
    let key = NoteKey("guarded");
    store.save(&note("secret", 1), &key).unwrap();

    store.provider().set_locked(true);
    let result: Result<Note, _> = store.load(&key);
    assert!(matches!(result, Err(StoreError::AccessDenied(_))));

    store.provider().set_locked(false);
    let loaded: Note = store.load(&key).unwrap();
    assert_eq!(loaded, note("secret", 1));

    // Absence is still reported as absence once unlocked.
    let absent: Result<Note, _> = store.load(&NoteKey("absent"));
    assert!(matches!(absent, Err(StoreError::NotFound(_))));
}

// ============================================================================
// Concurrency: no torn reads
// ============================================================================

fn assert_no_torn_reads<S>(store: Arc<S>)
where
    S: KeyedStore<NoteKey, Note> + Send + Sync + 'static,
{
    let old = note("old", 64);
    let new = note("new", 64);
    store.save(&old, &NoteKey("shared")).unwrap();

    let writer = {
        let store = Arc::clone(&store);
        let (old, new) = (old.clone(), new.clone());
        thread::spawn(move || {
            for i in 0..200 {
                let value = if i % 2 == 0 { &new } else { &old };
                store.save(value, &NoteKey("shared")).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..2)
        .map(|_| {
            let store = Arc::clone(&store);
            let (old, new) = (old.clone(), new.clone());
            thread::spawn(move || {
                for _ in 0..200 {
                    let loaded: Note = store.load(&NoteKey("shared")).unwrap();
                    assert!(
                        loaded == old || loaded == new,
                        "observed a partially written value"
                    );
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_file_store_concurrent_save_load_never_tears() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FileStore::open(dir.path().join("vault")));
    assert_no_torn_reads(store);
}

#[test]
fn test_secret_store_concurrent_save_load_never_tears() {
    assert_no_torn_reads(Arc::new(secret_store()));
}
