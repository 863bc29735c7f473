use std::fs;

use taskflow::storage::Storage;
use taskflow::store::TaskStore;
use taskflow::task::{Category, Priority, TaskDraft};

fn draft(title: &str, date: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: "with details".to_string(),
        date: date.to_string(),
        time: "14:30".to_string(),
        category: Category::Work,
        priority: Priority::High,
        completed: false,
    }
}

#[test]
fn collection_survives_a_restart_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskflow.json");

    let mut store = TaskStore::load(Storage::new(&path));
    store.add(draft("write report", "2024-06-03")).unwrap();
    store.add(draft("review PR", "2024-06-04")).unwrap();
    let toggled = store.tasks()[0].id.clone();
    store.set_completed(&toggled, true).unwrap();
    let saved: Vec<_> = store.tasks().to_vec();

    // Same file, fresh process.
    let reloaded = TaskStore::load(Storage::new(&path));
    assert_eq!(reloaded.tasks(), saved.as_slice());
}

#[test]
fn cold_start_with_no_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = TaskStore::load(Storage::new(dir.path().join("taskflow.json")));
    assert!(store.tasks().is_empty());
}

#[test]
fn corrupt_file_degrades_to_an_empty_usable_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskflow.json");
    fs::write(&path, "{ this is not json").unwrap();

    let mut store = TaskStore::load(Storage::new(&path));
    assert!(store.tasks().is_empty());

    // The store still accepts writes and the next load sees them.
    store.add(draft("fresh start", "2024-06-05")).unwrap();
    let reloaded = TaskStore::load(Storage::new(&path));
    assert_eq!(reloaded.tasks().len(), 1);
    assert_eq!(reloaded.tasks()[0].title, "fresh start");
}

#[test]
fn persisted_layout_matches_the_documented_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskflow.json");

    let mut store = TaskStore::load(Storage::new(&path));
    store.add(draft("write report", "2024-06-03")).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value.as_array().unwrap()[0];
    assert!(entry["id"].is_string());
    assert_eq!(entry["title"], "write report");
    assert_eq!(entry["date"], "2024-06-03");
    assert_eq!(entry["time"], "14:30");
    assert_eq!(entry["category"], "work");
    assert_eq!(entry["priority"], "high");
    assert_eq!(entry["completed"], false);
}
