//! Integration tests for the one-shot output store.

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;

use texforge_core::{OutputStore, StoreError};

/// Test: repeated persists under one name never collide
#[test]
fn test_repeated_persist_yields_distinct_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = OutputStore::new(dir.path()).unwrap();

    let mut names = HashSet::new();
    for i in 0..5u8 {
        let stored = store.persist(&[i], Some("report")).unwrap();
        names.insert(stored.name);
        // Microsecond suffixes; keep successive calls apart.
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    // First write takes the plain name, later ones get suffixed names.
    assert!(names.contains("report.pdf"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), names.len());
    assert!(names.len() >= 2);
}

/// Test: one store handle shared across threads hands each file out once
#[test]
fn test_shared_store_retrieves_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(OutputStore::new(dir.path()).unwrap());
    let stored = store.persist(b"%PDF", Some("shared")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let name = stored.name.clone();
            std::thread::spawn(move || store.retrieve(&name))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert!(successes >= 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(StoreError::NotFound(_)))));
    assert!(!stored.path.exists());
}

/// Test: a store reopened on an existing directory sees earlier files
#[test]
fn test_reopen_existing_root() {
    let dir = tempfile::tempdir().unwrap();
    let first = OutputStore::new(dir.path()).unwrap();
    first.persist(b"%PDF", Some("kept")).unwrap();

    let second = OutputStore::new(dir.path()).unwrap();
    assert!(second.exists("kept.pdf"));
    assert_eq!(second.retrieve("kept.pdf").unwrap(), b"%PDF");
}
