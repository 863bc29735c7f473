use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::calendar::{today_string, MonthCursor};
use crate::storage::StorageError;
use crate::store::TaskStore;
use crate::task::{Category, Priority, Task, TaskDraft};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Calendar,
    Tasks,
    Settings,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Calendar, View::Tasks, View::Settings];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Calendar => "Calendar",
            View::Tasks => "Tasks",
            View::Settings => "Settings",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Calendar,
            View::Calendar => View::Tasks,
            View::Tasks => View::Settings,
            View::Settings => View::Dashboard,
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

/// List-view filter, cycled with the `f` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    Pending,
    Completed,
    Work,
    Personal,
}

impl TaskFilter {
    pub fn cycle(self) -> Self {
        match self {
            TaskFilter::All => TaskFilter::Pending,
            TaskFilter::Pending => TaskFilter::Completed,
            TaskFilter::Completed => TaskFilter::Work,
            TaskFilter::Work => TaskFilter::Personal,
            TaskFilter::Personal => TaskFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Pending => "Pending",
            TaskFilter::Completed => "Completed",
            TaskFilter::Work => "Work",
            TaskFilter::Personal => "Personal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Date,
    Time,
    Category,
    Priority,
    Completed,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Date => "Date",
            FormField::Time => "Time",
            FormField::Category => "Category",
            FormField::Priority => "Priority",
            FormField::Completed => "Completed",
        }
    }
}

/// Modal editor state for creating or editing one task.
#[derive(Debug, Clone)]
pub struct TaskForm {
    /// Id of the task being edited; `None` while creating.
    pub editing: Option<String>,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub category: Category,
    pub priority: Priority,
    pub completed: bool,
    pub focus: FormField,
}

impl TaskForm {
    /// Empty form: given date or today, 09:00, personal, medium priority.
    pub fn blank(date: Option<String>) -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            date: date.unwrap_or_else(today_string),
            time: "09:00".to_string(),
            category: Category::Personal,
            priority: Priority::Medium,
            completed: false,
            focus: FormField::Title,
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            editing: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            date: task.date.clone(),
            time: task.time.clone(),
            category: task.category,
            priority: task.priority,
            completed: task.completed,
            focus: FormField::Title,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Focusable fields in display order. The completed checkbox only
    /// exists while editing; a brand-new task is never pre-completed.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Title,
            FormField::Description,
            FormField::Date,
            FormField::Time,
            FormField::Category,
            FormField::Priority,
        ];
        if self.is_editing() {
            fields.push(FormField::Completed);
        }
        fields
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let at = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(at + fields.len() - 1) % fields.len()];
    }

    fn text_buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        match self.focus {
            FormField::Category | FormField::Priority | FormField::Completed if c == ' ' => {
                self.cycle_focused();
            }
            _ => {
                if let Some(buffer) = self.text_buffer_mut() {
                    buffer.push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.text_buffer_mut() {
            buffer.pop();
        }
    }

    pub fn cycle_focused(&mut self) {
        match self.focus {
            FormField::Category => self.category = self.category.cycle(),
            FormField::Priority => self.priority = self.priority.cycle(),
            FormField::Completed => self.completed = !self.completed,
            _ => {}
        }
    }

    /// Checks each field independently at the form boundary: non-empty
    /// title, well-formed date, well-formed time. There is no combined
    /// date+time check.
    pub fn validate(&self) -> Result<TaskDraft, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required");
        }
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err("Date must be YYYY-MM-DD");
        }
        if NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() {
            return Err("Time must be HH:MM");
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description.clone(),
            date: self.date.clone(),
            time: self.time.clone(),
            category: self.category,
            priority: self.priority,
            completed: self.completed,
        })
    }
}

/// Local UI state: which view is showing, what is selected, and the modal
/// form when one is open. Views never touch storage; every mutation goes
/// through the store passed into `on_key`.
pub struct App {
    pub view: View,
    pub filter: TaskFilter,
    pub theme: Theme,
    pub month: MonthCursor,
    pub selected_day: u32,
    pub task_selection: usize,
    pub today_selection: usize,
    pub form: Option<TaskForm>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            view: View::Dashboard,
            filter: TaskFilter::All,
            theme: Theme::default(),
            month: MonthCursor::current(),
            selected_day: Local::now().day(),
            task_selection: 0,
            today_selection: 0,
            form: None,
            status: None,
            should_quit: false,
        }
    }

    /// The list view's current slice of the collection.
    pub fn filtered_tasks<'a>(&self, store: &'a TaskStore) -> Vec<&'a Task> {
        match self.filter {
            TaskFilter::All => store.tasks().iter().collect(),
            TaskFilter::Pending => store.pending(),
            TaskFilter::Completed => store.completed(),
            TaskFilter::Work => store.tasks_by_category(Category::Work),
            TaskFilter::Personal => store.tasks_by_category(Category::Personal),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        self.status = None;
        if self.form.is_some() {
            self.on_form_key(key, store);
        } else {
            self.on_view_key(key, store);
        }
        self.clamp_selections(store);
    }

    fn on_view_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('1') => self.view = View::Dashboard,
            KeyCode::Char('2') => self.view = View::Calendar,
            KeyCode::Char('3') => self.view = View::Tasks,
            KeyCode::Char('4') => self.view = View::Settings,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('a') => {
                let date = match self.view {
                    View::Calendar => Some(self.month.date_string(self.selected_day)),
                    _ => None,
                };
                self.form = Some(TaskForm::blank(date));
            }
            _ => match self.view {
                View::Dashboard => self.on_dashboard_key(key, store),
                View::Calendar => self.on_calendar_key(key, store),
                View::Tasks => self.on_tasks_key(key, store),
                View::Settings => self.on_settings_key(key),
            },
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        let today = today_string();
        let selected_id = store
            .tasks_for_date(&today)
            .get(self.today_selection)
            .map(|t| t.id.clone());
        match key.code {
            KeyCode::Up => self.today_selection = self.today_selection.saturating_sub(1),
            KeyCode::Down => self.today_selection += 1,
            KeyCode::Char(' ') => {
                if let Some(id) = selected_id {
                    self.toggle_completed(&id, store);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = selected_id {
                    self.open_editor(&id, store);
                }
            }
            _ => {}
        }
    }

    fn on_calendar_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        let days = self.month.days_in_month();
        match key.code {
            KeyCode::Left => self.selected_day = self.selected_day.saturating_sub(1).max(1),
            KeyCode::Right => self.selected_day = (self.selected_day + 1).min(days),
            KeyCode::Up => self.selected_day = self.selected_day.saturating_sub(7).max(1),
            KeyCode::Down => self.selected_day = (self.selected_day + 7).min(days),
            KeyCode::Char('p') => {
                self.month = self.month.prev();
                self.selected_day = self.selected_day.min(self.month.days_in_month());
            }
            KeyCode::Char('n') => {
                self.month = self.month.next();
                self.selected_day = self.selected_day.min(self.month.days_in_month());
            }
            KeyCode::Enter => {
                // A day with tasks opens the first of them, an empty day
                // starts a new task on that date.
                let date = self.month.date_string(self.selected_day);
                let first_id = store.tasks_for_date(&date).first().map(|t| t.id.clone());
                match first_id {
                    Some(id) => self.open_editor(&id, store),
                    None => self.form = Some(TaskForm::blank(Some(date))),
                }
            }
            _ => {}
        }
    }

    fn on_tasks_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        let selected_id = self
            .filtered_tasks(store)
            .get(self.task_selection)
            .map(|t| t.id.clone());
        match key.code {
            KeyCode::Up => self.task_selection = self.task_selection.saturating_sub(1),
            KeyCode::Down => self.task_selection += 1,
            KeyCode::Char('f') => {
                self.filter = self.filter.cycle();
                self.task_selection = 0;
            }
            KeyCode::Char(' ') => {
                if let Some(id) = selected_id {
                    self.toggle_completed(&id, store);
                }
            }
            KeyCode::Enter => {
                if let Some(id) = selected_id {
                    self.open_editor(&id, store);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = selected_id {
                    let result = store.remove(&id).map(|_| ());
                    self.report_save(result, "Task deleted");
                }
            }
            _ => {}
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('t') {
            self.theme = self.theme.toggle();
        }
    }

    fn on_form_key(&mut self, key: KeyEvent, store: &mut TaskStore) {
        let Some(mut form) = self.form.take() else {
            return;
        };
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                match form.validate() {
                    Ok(draft) => {
                        let (result, message) = match &form.editing {
                            Some(id) => (store.replace(id, draft).map(|_| ()), "Task updated"),
                            None => (store.add(draft), "Task added"),
                        };
                        self.report_save(result, message);
                    }
                    Err(message) => {
                        self.status = Some(message.to_string());
                        self.form = Some(form);
                    }
                }
                return;
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(id) = &form.editing {
                    let result = store.remove(id).map(|_| ());
                    self.report_save(result, "Task deleted");
                    return;
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left | KeyCode::Right => form.cycle_focused(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.insert_char(c),
            _ => {}
        }
        self.form = Some(form);
    }

    fn open_editor(&mut self, id: &str, store: &TaskStore) {
        if let Some(task) = store.get(id) {
            self.form = Some(TaskForm::edit(task));
        }
    }

    fn toggle_completed(&mut self, id: &str, store: &mut TaskStore) {
        let Some(completed) = store.get(id).map(|t| t.completed) else {
            return;
        };
        let result = store.set_completed(id, !completed).map(|_| ());
        self.report_save(result, if completed { "Task reopened" } else { "Task completed" });
    }

    /// Persistence failures reach the user instead of vanishing: logged
    /// and echoed in the status line. The in-memory change still stands.
    fn report_save(&mut self, result: Result<(), StorageError>, success: &str) {
        match result {
            Ok(()) => self.status = Some(success.to_string()),
            Err(err) => {
                log::error!("failed to persist tasks: {err}");
                self.status = Some(format!("Save failed: {err}"));
            }
        }
    }

    fn clamp_selections(&mut self, store: &TaskStore) {
        let filtered = self.filtered_tasks(store).len();
        self.task_selection = self.task_selection.min(filtered.saturating_sub(1));
        let today = store.tasks_for_date(&today_string()).len();
        self.today_selection = self.today_selection.min(today.saturating_sub(1));
        self.selected_day = self.selected_day.clamp(1, self.month.days_in_month());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn store() -> (TaskStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::load(Storage::new(dir.path().join("tasks.json")));
        (store, dir)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, store: &mut TaskStore, text: &str) {
        for c in text.chars() {
            app.on_key(key(KeyCode::Char(c)), store);
        }
    }

    #[test]
    fn empty_title_is_rejected_at_the_form_boundary() {
        let form = TaskForm::blank(None);
        assert_eq!(form.validate(), Err("Title is required"));

        let mut spaces = TaskForm::blank(None);
        spaces.title = "   ".to_string();
        assert_eq!(spaces.validate(), Err("Title is required"));
    }

    #[test]
    fn malformed_date_and_time_are_rejected_independently() {
        let mut form = TaskForm::blank(None);
        form.title = "t".to_string();
        form.date = "June first".to_string();
        assert_eq!(form.validate(), Err("Date must be YYYY-MM-DD"));

        form.date = "2024-06-01".to_string();
        form.time = "9am".to_string();
        assert_eq!(form.validate(), Err("Time must be HH:MM"));
    }

    #[test]
    fn submitting_the_form_adds_a_task() {
        let (mut store, _dir) = store();
        let mut app = App::new();

        app.on_key(key(KeyCode::Char('a')), &mut store);
        assert!(app.form.is_some());
        type_text(&mut app, &mut store, "Pay rent");
        app.on_key(key(KeyCode::Enter), &mut store);

        assert!(app.form.is_none());
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].title, "Pay rent");
        assert_eq!(app.status.as_deref(), Some("Task added"));
    }

    #[test]
    fn submit_with_empty_title_keeps_the_form_open() {
        let (mut store, _dir) = store();
        let mut app = App::new();

        app.on_key(key(KeyCode::Char('a')), &mut store);
        app.on_key(key(KeyCode::Enter), &mut store);

        assert!(app.form.is_some());
        assert!(store.tasks().is_empty());
        assert_eq!(app.status.as_deref(), Some("Title is required"));
    }

    #[test]
    fn space_toggles_completion_in_the_list_view() {
        let (mut store, _dir) = store();
        let mut app = App::new();

        app.on_key(key(KeyCode::Char('a')), &mut store);
        type_text(&mut app, &mut store, "x");
        app.on_key(key(KeyCode::Enter), &mut store);

        app.view = View::Tasks;
        app.on_key(key(KeyCode::Char(' ')), &mut store);
        assert!(store.tasks()[0].completed);
        app.on_key(key(KeyCode::Char(' ')), &mut store);
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn filter_cycles_through_all_modes() {
        let mut filter = TaskFilter::All;
        for _ in 0..5 {
            filter = filter.cycle();
        }
        assert_eq!(filter, TaskFilter::All);
    }

    #[test]
    fn calendar_selection_stays_inside_the_month() {
        let (mut store, _dir) = store();
        let mut app = App::new();
        app.view = View::Calendar;
        app.month = MonthCursor {
            year: 2024,
            month: 6,
        };
        app.selected_day = 1;

        app.on_key(key(KeyCode::Left), &mut store);
        assert_eq!(app.selected_day, 1);
        app.selected_day = 30;
        app.on_key(key(KeyCode::Right), &mut store);
        assert_eq!(app.selected_day, 30);
        app.on_key(key(KeyCode::Char('p')), &mut store);
        assert_eq!(app.month.month, 5);
    }
}
