use std::io;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};

use crate::app::{App, FormField, TaskForm, View};
use crate::calendar::{today_string, DAY_NAMES};
use crate::store::TaskStore;
use crate::task::{Category, Task};
use crate::theme::Theme;

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &mut TaskStore,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app, store))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.on_key(key, store);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn draw(f: &mut Frame, app: &App, store: &TaskStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_nav(f, chunks[0], app);
    match app.view {
        View::Dashboard => draw_dashboard(f, chunks[1], app, store),
        View::Calendar => draw_calendar(f, chunks[1], app, store),
        View::Tasks => draw_tasks(f, chunks[1], app, store),
        View::Settings => draw_settings(f, chunks[1], app, store),
    }
    draw_status(f, chunks[2], app);

    if let Some(form) = &app.form {
        draw_form(f, form, app.theme);
    }
}

fn draw_nav(f: &mut Frame, area: Rect, app: &App) {
    let titles = View::ALL.iter().map(|v| v.title());
    let tabs = Tabs::new(titles)
        .block(Block::default().title("taskflow").borders(Borders::ALL))
        .style(app.theme.dim_style())
        .highlight_style(app.theme.highlight())
        .select(app.view.index());
    f.render_widget(tabs, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = match &app.status {
        Some(status) => (status.clone(), app.theme.accent_style()),
        None => (hints(app), app.theme.dim_style()),
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}

fn hints(app: &App) -> String {
    if app.form.is_some() {
        let delete = if app
            .form
            .as_ref()
            .is_some_and(TaskForm::is_editing)
        {
            "  ctrl-d delete"
        } else {
            ""
        };
        return format!("enter save  esc cancel  tab next field  \u{2190}\u{2192} change{delete}");
    }
    let common = "a add  tab view  q quit";
    match app.view {
        View::Dashboard => format!("\u{2191}\u{2193} select  space toggle  enter edit  {common}"),
        View::Calendar => format!("\u{2190}\u{2191}\u{2192}\u{2193} day  p/n month  enter open  {common}"),
        View::Tasks => format!("\u{2191}\u{2193} select  space toggle  enter edit  d delete  f filter  {common}"),
        View::Settings => format!("t theme  {common}"),
    }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App, store: &TaskStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let counts = store.counts();
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(app.theme.accent_style())
        .percent(store.progress_percent())
        .label(format!(
            "{}%  {}/{} tasks completed",
            store.progress_percent(),
            counts.completed,
            counts.total
        ));
    f.render_widget(gauge, chunks[0]);

    let today = today_string();
    let stats = [
        (store.tasks_for_date(&today).len(), "Today", app.theme.accent()),
        (counts.completed, "Completed", app.theme.done()),
        (counts.work, "Work", app.theme.category_color(Category::Work)),
        (
            counts.personal,
            "Personal",
            app.theme.category_color(Category::Personal),
        ),
    ];
    draw_stat_row(f, chunks[1], app.theme, &stats);

    let lists = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    draw_today_list(f, lists[0], app, store, &today);
    draw_upcoming_list(f, lists[1], app, store, &today);
}

fn draw_stat_row(f: &mut Frame, area: Rect, theme: Theme, stats: &[(usize, &str, ratatui::style::Color)]) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, 4); 4])
        .split(area);
    for (i, (value, caption, color)) in stats.iter().enumerate() {
        let text = Text::from(vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().fg(*color).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(*caption, theme.dim_style())),
        ]);
        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, columns[i]);
    }
}

fn draw_today_list(f: &mut Frame, area: Rect, app: &App, store: &TaskStore, today: &str) {
    let tasks = store.tasks_for_date(today);
    let block = Block::default()
        .title("Today's Schedule")
        .borders(Borders::ALL);
    if tasks.is_empty() {
        let empty = Paragraph::new("No tasks scheduled for today")
            .style(app.theme.dim_style())
            .block(block);
        f.render_widget(empty, area);
        return;
    }
    let items: Vec<ListItem> = tasks.iter().map(|t| task_line_item(t, app.theme)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.today_selection));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_upcoming_list(f: &mut Frame, area: Rect, app: &App, store: &TaskStore, today: &str) {
    let upcoming = store.upcoming(today, 5);
    let block = Block::default().title("Upcoming Tasks").borders(Borders::ALL);
    if upcoming.is_empty() {
        let empty = Paragraph::new("No upcoming tasks")
            .style(app.theme.dim_style())
            .block(block);
        f.render_widget(empty, area);
        return;
    }
    let items: Vec<ListItem> = upcoming
        .iter()
        .map(|t| {
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(t.title.clone(), title_style(t, app.theme))),
                Line::from(Span::styled(
                    format!("  {} at {}", format_date_label(&t.date), format_time_12h(&t.time)),
                    app.theme.dim_style(),
                )),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(block), area);
}

fn draw_calendar(f: &mut Frame, area: Rect, app: &App, store: &TaskStore) {
    let block = Block::default()
        .title(app.month.label())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cells = app.month.day_cells();
    let weeks = cells.len().div_ceil(7).max(1);

    let mut constraints = vec![Constraint::Length(1)];
    constraints.extend(vec![Constraint::Ratio(1, weeks as u32); weeks]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, 7); 7])
        .split(rows[0]);
    for (i, name) in DAY_NAMES.iter().enumerate() {
        let label = Paragraph::new(*name)
            .alignment(Alignment::Center)
            .style(app.theme.dim_style());
        f.render_widget(label, header_cols[i]);
    }

    let today = today_string();
    for week in 0..weeks {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, 7); 7])
            .split(rows[week + 1]);
        for slot in 0..7 {
            let cell = cells.get(week * 7 + slot).copied().flatten();
            if let Some(day) = cell {
                draw_day_cell(f, cols[slot], app, store, day, &today);
            }
        }
    }
}

fn draw_day_cell(f: &mut Frame, area: Rect, app: &App, store: &TaskStore, day: u32, today: &str) {
    let date = app.month.date_string(day);
    let tasks = store.tasks_for_date(&date);

    let selected = day == app.selected_day;
    let border_style = if selected {
        app.theme.highlight()
    } else {
        app.theme.dim_style()
    };
    let title_style = if date == today {
        Style::default()
            .fg(app.theme.accent())
            .add_modifier(Modifier::BOLD)
    } else {
        app.theme.base()
    };

    let block = Block::default()
        .title(Span::styled(day.to_string(), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    // Two chips per cell, the rest collapse into a "+N more" line.
    let mut lines: Vec<Line> = tasks
        .iter()
        .take(2)
        .map(|t| {
            Line::from(Span::styled(
                format!("{} {}", t.time, t.title),
                Style::default().fg(app.theme.category_color(t.category)),
            ))
        })
        .collect();
    if tasks.len() > 2 {
        lines.push(Line::from(Span::styled(
            format!("+{} more", tasks.len() - 2),
            app.theme.dim_style(),
        )));
    }

    f.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn draw_tasks(f: &mut Frame, area: Rect, app: &App, store: &TaskStore) {
    let tasks = app.filtered_tasks(store);
    let title = format!("Tasks \u{2014} {} ({})", app.filter.label(), tasks.len());
    let block = Block::default().title(title).borders(Borders::ALL);

    if tasks.is_empty() {
        let empty = Paragraph::new("No tasks found")
            .style(app.theme.dim_style())
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks.iter().map(|t| task_detail_item(t, app.theme)).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.task_selection));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_settings(f: &mut Frame, area: Rect, app: &App, store: &TaskStore) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let theme_line = Line::from(vec![
        Span::styled("Theme: ", app.theme.base()),
        Span::styled(app.theme.label(), app.theme.accent_style()),
        Span::styled(
            format!("  (press t to switch to {})", app.theme.toggle().label()),
            app.theme.dim_style(),
        ),
    ]);
    let theme_widget =
        Paragraph::new(theme_line).block(Block::default().title("Appearance").borders(Borders::ALL));
    f.render_widget(theme_widget, chunks[0]);

    let counts = store.counts();
    let stats = [
        (counts.total, "Total", app.theme.accent()),
        (counts.completed, "Completed", app.theme.done()),
        (counts.work, "Work", app.theme.category_color(Category::Work)),
        (
            counts.personal,
            "Personal",
            app.theme.category_color(Category::Personal),
        ),
    ];
    draw_stat_row(f, chunks[1], app.theme, &stats);

    let storage_line = Line::from(vec![
        Span::styled("Task file: ", app.theme.base()),
        Span::styled(
            store.storage_path().display().to_string(),
            app.theme.dim_style(),
        ),
    ]);
    let storage_widget =
        Paragraph::new(storage_line).block(Block::default().title("Storage").borders(Borders::ALL));
    f.render_widget(storage_widget, chunks[2]);
}

fn draw_form(f: &mut Frame, form: &TaskForm, theme: Theme) {
    let fields = form.fields();
    let height = fields.len() as u16 + 2;
    let area = centered_rect(60, height, f.area());

    let title = if form.is_editing() { "Edit Task" } else { "New Task" };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.accent_style());

    f.render_widget(Clear, area);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); fields.len()])
        .split(inner);

    for (i, field) in fields.iter().enumerate() {
        let focused = *field == form.focus;
        let value = match field {
            FormField::Title => form.title.clone(),
            FormField::Description => form.description.clone(),
            FormField::Date => form.date.clone(),
            FormField::Time => form.time.clone(),
            FormField::Category => format!("< {} >", form.category.label()),
            FormField::Priority => format!("< {} >", form.priority.label()),
            FormField::Completed => if form.completed { "[x]" } else { "[ ]" }.to_string(),
        };
        let cursor = if focused && matches!(
            field,
            FormField::Title | FormField::Description | FormField::Date | FormField::Time
        ) {
            "_"
        } else {
            ""
        };
        let label_style = if focused { theme.highlight() } else { theme.dim_style() };
        let line = Line::from(vec![
            Span::styled(format!("{:>11}: ", field.label()), label_style),
            Span::styled(format!("{value}{cursor}"), theme.base()),
        ]);
        f.render_widget(Paragraph::new(line), rows[i]);
    }
}

fn task_line_item(task: &Task, theme: Theme) -> ListItem<'static> {
    let marker = if task.completed { "[x] " } else { "[ ] " };
    ListItem::new(Line::from(vec![
        Span::styled(marker, theme.dim_style()),
        Span::styled(format!("{} ", task.time), theme.dim_style()),
        Span::styled(task.title.clone(), title_style(task, theme)),
        Span::styled(
            format!("  #{}", task.category.label()),
            Style::default().fg(theme.category_color(task.category)),
        ),
    ]))
}

fn task_detail_item(task: &Task, theme: Theme) -> ListItem<'static> {
    let marker = if task.completed { "[x] " } else { "[ ] " };
    let mut first = vec![
        Span::styled(marker, theme.dim_style()),
        Span::styled(task.title.clone(), title_style(task, theme)),
        Span::styled(
            format!("  #{}", task.category.label()),
            Style::default().fg(theme.category_color(task.category)),
        ),
        Span::styled(
            format!("  {} priority", task.priority.label()),
            Style::default().fg(theme.priority_color(task.priority)),
        ),
    ];
    if task.completed {
        first.push(Span::styled("  done", Style::default().fg(theme.done())));
    }

    let mut second = format!(
        "      {}  {}",
        format_time_12h(&task.time),
        format_date_label(&task.date)
    );
    if !task.description.is_empty() {
        second.push_str("  \u{2014} ");
        second.push_str(&task.description);
    }

    ListItem::new(Text::from(vec![
        Line::from(first),
        Line::from(Span::styled(second, theme.dim_style())),
    ]))
}

fn title_style(task: &Task, theme: Theme) -> Style {
    if task.completed {
        theme.completed_style()
    } else {
        theme.base()
    }
}

/// `HH:MM` (24-hour) to a `h:MM AM/PM` display string; anything that does
/// not parse is shown as stored.
fn format_time_12h(time: &str) -> String {
    let Some((hours, minutes)) = time.split_once(':') else {
        return time.to_string();
    };
    let Ok(hour) = hours.parse::<u32>() else {
        return time.to_string();
    };
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let display = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display}:{minutes} {suffix}")
}

/// `YYYY-MM-DD` to a short weekday label such as `Sat, Jun 1`.
fn format_date_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a, %b %-d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = (u32::from(r.width) * u32::from(percent_x) / 100) as u16;
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(r.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formats_as_12_hour() {
        assert_eq!(format_time_12h("09:00"), "9:00 AM");
        assert_eq!(format_time_12h("00:30"), "12:30 AM");
        assert_eq!(format_time_12h("12:05"), "12:05 PM");
        assert_eq!(format_time_12h("23:59"), "11:59 PM");
        assert_eq!(format_time_12h("garbage"), "garbage");
    }

    #[test]
    fn date_label_is_short_and_tolerant() {
        assert_eq!(format_date_label("2024-06-01"), "Sat, Jun 1");
        assert_eq!(format_date_label("not-a-date"), "not-a-date");
    }

    #[test]
    fn popup_fits_inside_the_frame() {
        let area = Rect::new(0, 0, 100, 30);
        let popup = centered_rect(60, 9, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 9);
        assert!(popup.x + popup.width <= area.width);
        assert!(popup.y + popup.height <= area.height);
    }
}
