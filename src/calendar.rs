use chrono::{Datelike, Local, NaiveDate};

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Local calendar date as `YYYY-MM-DD`, the format every task date uses.
pub fn today_string() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// The month the calendar view is looking at. Navigation moves whole
/// months and rolls over year boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn current() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize - 1], self.year)
    }

    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .map_or(30, |last| last.day())
    }

    /// Number of empty cells before day 1 in a Sunday-first week.
    pub fn leading_blanks(&self) -> usize {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map_or(0, |first| first.weekday().num_days_from_sunday() as usize)
    }

    /// The month as a flat grid: `None` leading blanks for the first
    /// week's offset, then one `Some(day)` per day of the month.
    pub fn day_cells(&self) -> Vec<Option<u32>> {
        let mut cells: Vec<Option<u32>> = vec![None; self.leading_blanks()];
        cells.extend((1..=self.days_in_month()).map(Some));
        cells
    }

    pub fn date_string(&self, day: u32) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn june_2024_starts_on_saturday() {
        let cursor = MonthCursor {
            year: 2024,
            month: 6,
        };
        assert_eq!(cursor.leading_blanks(), 6);
        assert_eq!(cursor.days_in_month(), 30);
        let cells = cursor.day_cells();
        assert_eq!(cells.len(), 36);
        assert_eq!(cells[5], None);
        assert_eq!(cells[6], Some(1));
        assert_eq!(cells[35], Some(30));
    }

    #[test]
    fn leap_february_has_29_days() {
        let cursor = MonthCursor {
            year: 2024,
            month: 2,
        };
        assert_eq!(cursor.days_in_month(), 29);
        assert_eq!(cursor.leading_blanks(), 4);
    }

    #[test]
    fn sunday_start_has_no_blanks() {
        let cursor = MonthCursor {
            year: 2023,
            month: 1,
        };
        assert_eq!(cursor.leading_blanks(), 0);
        assert_eq!(cursor.day_cells()[0], Some(1));
    }

    #[test]
    fn navigation_rolls_over_years() {
        let january = MonthCursor {
            year: 2024,
            month: 1,
        };
        assert_eq!(
            january.prev(),
            MonthCursor {
                year: 2023,
                month: 12
            }
        );
        let december = MonthCursor {
            year: 2024,
            month: 12,
        };
        assert_eq!(
            december.next(),
            MonthCursor {
                year: 2025,
                month: 1
            }
        );
    }

    #[test]
    fn date_string_is_zero_padded() {
        let cursor = MonthCursor {
            year: 2024,
            month: 6,
        };
        assert_eq!(cursor.date_string(1), "2024-06-01");
        assert_eq!(cursor.label(), "June 2024");
    }
}
