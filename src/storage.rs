use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::task::Task;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access task file: {0}")]
    Io(#[from] std::io::Error),
    #[error("task file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Adapter over the single JSON file that holds the whole task collection.
///
/// A missing file is a cold start, not an error; an unreadable or
/// unparseable file is.
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Vec<Task>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path)?;
        let tasks = serde_json::from_str(&data)?;
        Ok(Some(tasks))
    }

    pub fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        fs::write(&self.path, serde_json::to_string_pretty(tasks)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Priority};

    fn task(id: &str, title: &str) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            date: "2024-06-01".to_string(),
            time: "09:00".to_string(),
            category: Category::Work,
            priority: Priority::Medium,
            completed: false,
        }
    }

    #[test]
    fn missing_file_is_a_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("tasks.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "not json at all").unwrap();
        let storage = Storage::new(path);
        assert!(matches!(storage.load(), Err(StorageError::Parse(_))));
    }

    #[test]
    fn save_then_load_preserves_tasks_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("tasks.json"));
        let tasks = vec![task("2", "second"), task("1", "first")];
        storage.save(&tasks).unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), tasks);
    }
}
