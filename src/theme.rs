use ratatui::style::{Color, Modifier, Style};

use crate::task::{Category, Priority};

/// Color scheme selectable from the settings view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn text(self) -> Color {
        match self {
            Theme::Dark => Color::White,
            Theme::Light => Color::Black,
        }
    }

    pub fn dim(self) -> Color {
        match self {
            Theme::Dark => Color::DarkGray,
            Theme::Light => Color::Gray,
        }
    }

    pub fn accent(self) -> Color {
        Color::Cyan
    }

    pub fn done(self) -> Color {
        Color::Green
    }

    pub fn base(self) -> Style {
        Style::default().fg(self.text())
    }

    pub fn dim_style(self) -> Style {
        Style::default().fg(self.dim())
    }

    pub fn accent_style(self) -> Style {
        Style::default().fg(self.accent())
    }

    pub fn highlight(self) -> Style {
        Style::default()
            .fg(self.accent())
            .add_modifier(Modifier::BOLD)
    }

    /// Completed tasks render dimmed and struck through everywhere.
    pub fn completed_style(self) -> Style {
        Style::default()
            .fg(self.dim())
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn category_color(self, category: Category) -> Color {
        match category {
            Category::Work => Color::Blue,
            Category::Personal => Color::Green,
        }
    }

    pub fn priority_color(self, priority: Priority) -> Color {
        match priority {
            Priority::High => Color::Red,
            Priority::Medium => Color::Yellow,
            Priority::Low => Color::Blue,
        }
    }
}
