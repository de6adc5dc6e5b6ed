use crate::day::Day;
use std::str::FromStr;
use thiserror::Error;
use time::{Month, Weekday};

pub const DAYS_IN_WEEK: u8 = 7;

static ENGLISH_MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static ENGLISH_WEEKDAYS_MIN: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

pub trait WeekdayExt {
    /// Zero-based position of the weekday counting from Sunday
    fn index0(&self) -> u8;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u8 {
        self.number_days_from_sunday()
    }
}

/// Locale descriptor: the first day of the week plus the month and weekday
/// names shown in headers
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Locale {
    week_start: Weekday,
    months: [String; 12],
    // Sunday first, regardless of `week_start`
    weekdays_min: [String; 7],
}

impl Locale {
    pub fn new(week_start: Weekday, months: [String; 12], weekdays_min: [String; 7]) -> Locale {
        Locale {
            week_start,
            months,
            weekdays_min,
        }
    }

    pub fn english() -> Locale {
        Locale::new(
            Weekday::Sunday,
            ENGLISH_MONTHS.map(String::from),
            ENGLISH_WEEKDAYS_MIN.map(String::from),
        )
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Locale {
        self.week_start = week_start;
        self
    }

    pub const fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn month_name(&self, month: Month) -> &str {
        self.months
            .get(usize::from(u8::from(month)) - 1)
            .map_or("", String::as_str)
    }

    /// Short weekday names in display order, starting at the locale's first
    /// day of the week
    pub fn weekday_names(&self) -> impl Iterator<Item = &str> + '_ {
        let start = usize::from(self.week_start.index0());
        self.weekdays_min
            .iter()
            .cycle()
            .skip(start)
            .take(usize::from(DAYS_IN_WEEK))
            .map(String::as_str)
    }

    /// Column of `weekday` in a week row, counting from the locale's first
    /// day of the week
    pub fn column_of(&self, weekday: Weekday) -> u8 {
        (weekday.index0() + DAYS_IN_WEEK - self.week_start.index0()) % DAYS_IN_WEEK
    }

    /// Returns the first day of the week containing `day`, or `None` if that
    /// day would precede the earliest representable date
    pub fn start_of_week(&self, day: Day) -> Option<Day> {
        day.checked_add_days(-i64::from(self.column_of(day.weekday())))
    }
}

impl Default for Locale {
    fn default() -> Locale {
        Locale::english()
    }
}

/// Parses a weekday given by its English name or any unambiguous prefix of at
/// least two letters, e.g. "mon" or "Sunday"
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeekStart(pub Weekday);

impl FromStr for WeekStart {
    type Err = ParseWeekStartError;

    fn from_str(s: &str) -> Result<WeekStart, ParseWeekStartError> {
        let lower = s.to_ascii_lowercase();
        if lower.len() >= 2 {
            for wd in [
                Weekday::Sunday,
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
            ] {
                if wd.to_string().to_ascii_lowercase().starts_with(&lower) {
                    return Ok(WeekStart(wd));
                }
            }
        }
        Err(ParseWeekStartError(s.to_owned()))
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid weekday {0:?}")]
pub struct ParseWeekStartError(String);

/// Upper-cases the first character of `s`
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_weekday_names_rotate() {
        let locale = Locale::english().with_week_start(Weekday::Monday);
        let names = locale.weekday_names().collect::<Vec<_>>();
        assert_eq!(names, ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]);
    }

    #[test]
    fn test_column_of() {
        let locale = Locale::english();
        assert_eq!(locale.column_of(Weekday::Sunday), 0);
        assert_eq!(locale.column_of(Weekday::Saturday), 6);
        let locale = locale.with_week_start(Weekday::Monday);
        assert_eq!(locale.column_of(Weekday::Sunday), 6);
        assert_eq!(locale.column_of(Weekday::Monday), 0);
    }

    #[test]
    fn test_start_of_week() {
        let day = Day::new(date!(2023 - 11 - 16));
        let locale = Locale::english();
        assert_eq!(locale.start_of_week(day), Some(Day::new(date!(2023 - 11 - 12))));
        let locale = locale.with_week_start(Weekday::Monday);
        assert_eq!(locale.start_of_week(day), Some(Day::new(date!(2023 - 11 - 13))));
        let sunday = Day::new(date!(2023 - 11 - 12));
        assert_eq!(locale.start_of_week(sunday), Some(Day::new(date!(2023 - 11 - 06))));
    }

    #[test]
    fn test_month_name() {
        let locale = Locale::english();
        assert_eq!(locale.month_name(Month::January), "january");
        assert_eq!(upper_first(locale.month_name(Month::October)), "October");
        assert_eq!(upper_first(""), "");
    }

    #[test]
    fn test_parse_week_start() {
        assert_eq!("mon".parse::<WeekStart>(), Ok(WeekStart(Weekday::Monday)));
        assert_eq!("Sunday".parse::<WeekStart>(), Ok(WeekStart(Weekday::Sunday)));
        assert_eq!("th".parse::<WeekStart>(), Ok(WeekStart(Weekday::Thursday)));
        assert!("s".parse::<WeekStart>().is_err());
        assert!("funday".parse::<WeekStart>().is_err());
    }
}
