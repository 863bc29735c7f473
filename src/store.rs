use chrono::Utc;

use crate::storage::{Storage, StorageError};
use crate::task::{Category, Task, TaskDraft, TaskPatch};

/// Aggregate counts shown on the dashboard and settings views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub work: usize,
    pub personal: usize,
}

/// Sole owner of the task collection. Every mutation writes the whole
/// collection back through the storage adapter before returning, so the
/// file always mirrors the in-memory state.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
}

impl TaskStore {
    /// Reads the persisted collection once at startup. A missing file
    /// starts empty; an unreadable file also starts empty but is logged,
    /// since that means losing data the user once saved.
    pub fn load(storage: Storage) -> Self {
        let tasks = match storage.load() {
            Ok(Some(tasks)) => tasks,
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!(
                    "starting with an empty collection, {} is unreadable: {err}",
                    storage.path().display()
                );
                Vec::new()
            }
        };
        Self { tasks, storage }
    }

    pub fn storage_path(&self) -> &std::path::Path {
        self.storage.path()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Appends a new task with a freshly assigned id and persists.
    pub fn add(&mut self, draft: TaskDraft) -> Result<(), StorageError> {
        let id = self.fresh_id();
        self.tasks.push(draft.into_task(id));
        self.persist()
    }

    /// Merges the patch into the matching task. `Ok(false)` when no task
    /// has that id; nothing is written in that case.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<bool, StorageError> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                patch.apply(task);
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replaces every field of the matching task except its id. This is
    /// the edit-form save path.
    pub fn replace(&mut self, id: &str, draft: TaskDraft) -> Result<bool, StorageError> {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                *task = draft.into_task(task.id.clone());
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deletes the matching task. `Ok(false)` when no task has that id.
    pub fn remove(&mut self, id: &str) -> Result<bool, StorageError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn set_completed(&mut self, id: &str, completed: bool) -> Result<bool, StorageError> {
        self.update(id, TaskPatch::completed(completed))
    }

    /// Tasks whose `date` equals the given string exactly, in collection
    /// order. No date parsing, so there are no timezone-shifted matches.
    pub fn tasks_for_date(&self, date: &str) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.date == date).collect()
    }

    pub fn tasks_by_category(&self, category: Category) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.category == category).collect()
    }

    pub fn pending(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.completed).collect()
    }

    pub fn completed(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.completed).collect()
    }

    /// Open tasks dated strictly after `today`, first `limit` in
    /// collection order. ISO dates compare correctly as strings.
    pub fn upcoming(&self, today: &str, limit: usize) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.date.as_str() > today && !t.completed)
            .take(limit)
            .collect()
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            total: self.tasks.len(),
            completed: self.tasks.iter().filter(|t| t.completed).count(),
            work: self.tasks.iter().filter(|t| t.category == Category::Work).count(),
            personal: self
                .tasks
                .iter()
                .filter(|t| t.category == Category::Personal)
                .count(),
        }
    }

    /// Completed share of all tasks, rounded to a whole percent. Zero for
    /// an empty collection.
    pub fn progress_percent(&self) -> u16 {
        let counts = self.counts();
        if counts.total == 0 {
            return 0;
        }
        ((counts.completed as f64 / counts.total as f64) * 100.0).round() as u16
    }

    /// Millisecond timestamp, bumped past any id already in use. Two adds
    /// within the same millisecond still get distinct ids.
    fn fresh_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = millis.to_string();
            if !self.tasks.iter().any(|t| t.id == id) {
                return id;
            }
            millis += 1;
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.save(&self.tasks)
    }
}
