use serde::{Deserialize, Serialize};

/// Grouping used for filtering and visual tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Category::Personal => Category::Work,
            Category::Work => Category::Personal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

/// A schedulable unit of work. `date` is `YYYY-MM-DD` and `time` is `HH:MM`
/// (24-hour); both are stored and compared as plain strings, with no
/// timezone handling anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

/// Everything a task carries except its id. Payload for create and for
/// full-field replacement; the store assigns or keeps the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub category: Category,
    pub priority: Priority,
    pub completed: bool,
}

impl TaskDraft {
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            time: self.time,
            category: self.category,
            priority: self.priority,
            completed: self.completed,
        }
    }
}

/// Partial update: `Some` fields replace, `None` fields keep the current
/// value. The id is never part of a patch.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch touching only the completion flag.
    pub fn completed(value: bool) -> Self {
        TaskPatch {
            completed: Some(value),
            ..TaskPatch::default()
        }
    }

    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(time) = self.time {
            task.time = time;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "1717230000000".to_string(),
            title: "Pay rent".to_string(),
            description: String::new(),
            date: "2024-06-01".to_string(),
            time: "09:00".to_string(),
            category: Category::Personal,
            priority: Priority::High,
            completed: false,
        }
    }

    #[test]
    fn patch_replaces_only_some_fields() {
        let mut task = sample();
        TaskPatch::completed(true).apply(&mut task);
        assert!(task.completed);
        assert_eq!(task.title, "Pay rent");
        assert_eq!(task.date, "2024-06-01");
        assert_eq!(task.priority, Priority::High);
    }

    #[test]
    fn enums_serialize_lowercase() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"category\":\"personal\""));
        assert!(json.contains("\"priority\":\"high\""));
    }

    #[test]
    fn completed_defaults_false_when_missing() {
        let json = r#"{
            "id": "1",
            "title": "t",
            "description": "",
            "date": "2024-06-01",
            "time": "09:00",
            "category": "work",
            "priority": "low"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
    }
}
