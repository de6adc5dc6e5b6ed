use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{
    format_description::FormatItem, macros::format_description, macros::time, Date, Duration,
    Month, OffsetDateTime, Time, Weekday,
};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Time of day at which every [`Day`] is anchored when it has to be turned
/// back into an instant
const NOON: Time = time!(12:00);

/// A calendar date with no time-of-day component.
///
/// Equality and ordering are by calendar date only.  When an instant is
/// needed, the date is anchored at noon UTC so that arithmetic never crosses
/// a date boundary because of a timezone or daylight-saving shift.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Day(Date);

impl Day {
    pub const fn new(date: Date) -> Day {
        Day(date)
    }

    pub fn from_calendar_date(year: i32, month: Month, day: u8) -> Result<Day, DayError> {
        Date::from_calendar_date(year, month, day)
            .map(Day)
            .map_err(|_| DayError::OutOfRange)
    }

    pub fn from_ordinal_date(year: i32, ordinal: u16) -> Result<Day, DayError> {
        Date::from_ordinal_date(year, ordinal)
            .map(Day)
            .map_err(|_| DayError::OutOfRange)
    }

    /// Takes the calendar date of `datetime` in its own offset, so a local
    /// timestamp yields the local date.
    pub fn from_datetime(datetime: OffsetDateTime) -> Day {
        Day(datetime.date())
    }

    pub const fn date(self) -> Date {
        self.0
    }

    pub fn at_noon_utc(self) -> OffsetDateTime {
        self.0.with_time(NOON).assume_utc()
    }

    pub const fn year(self) -> i32 {
        self.0.year()
    }

    pub const fn month(self) -> Month {
        self.0.month()
    }

    pub const fn day(self) -> u8 {
        self.0.day()
    }

    /// Day of the year, starting at 1
    pub const fn ordinal(self) -> u16 {
        self.0.ordinal()
    }

    pub const fn weekday(self) -> Weekday {
        self.0.weekday()
    }

    pub const fn next_day(self) -> Option<Day> {
        match self.0.next_day() {
            Some(d) => Some(Day(d)),
            None => None,
        }
    }

    pub fn checked_add_days(self, days: i64) -> Option<Day> {
        self.0.checked_add(Duration::days(days)).map(Day)
    }
}

impl From<Date> for Day {
    fn from(date: Date) -> Day {
        Day(date)
    }
}

impl From<Day> for Date {
    fn from(day: Day) -> Date {
        day.0
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            u8::from(self.month()),
            self.day()
        )
    }
}

impl FromStr for Day {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Day, ParseDayError> {
        Date::parse(s, &YMD_FMT)
            .map(Day)
            .map_err(|source| ParseDayError {
                value: s.to_owned(),
                source,
            })
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid date {value:?}; expected YYYY-MM-DD")]
pub struct ParseDayError {
    value: String,
    source: time::error::Parse,
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DayError {
    #[error("date is out of the supported range")]
    OutOfRange,
}

/// An inclusive range of days, either end of which may be unbounded
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct DateRange {
    min: Option<Day>,
    max: Option<Day>,
}

impl DateRange {
    pub fn new(min: Option<Day>, max: Option<Day>) -> Result<DateRange, RangeError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(RangeError::MinAfterMax { min, max });
            }
        }
        Ok(DateRange { min, max })
    }

    pub const fn unbounded() -> DateRange {
        DateRange {
            min: None,
            max: None,
        }
    }

    pub const fn min(&self) -> Option<Day> {
        self.min
    }

    pub const fn max(&self) -> Option<Day> {
        self.max
    }

    pub fn contains(&self, day: Day) -> bool {
        self.min.is_none_or(|min| min <= day) && self.max.is_none_or(|max| day <= max)
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum RangeError {
    #[error("start of range ({min}) is after end of range ({max})")]
    MinAfterMax { min: Day, max: Day },
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_parse_and_display() {
        let day = "2024-02-15".parse::<Day>().unwrap();
        assert_eq!(day, Day::new(date!(2024 - 02 - 15)));
        assert_eq!(day.to_string(), "2024-02-15");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("2024-02-30".parse::<Day>().is_err());
        assert!("15/02/2024".parse::<Day>().is_err());
        assert!("".parse::<Day>().is_err());
    }

    #[test]
    fn test_noon_anchor() {
        let day = Day::new(date!(2024 - 03 - 31));
        let dt = day.at_noon_utc();
        assert_eq!(dt.hour(), 12);
        assert_eq!(dt.offset(), time::UtcOffset::UTC);
        assert_eq!(Day::from_datetime(dt), day);
    }

    #[test]
    fn test_range_contains_inclusive() {
        let range = DateRange::new(
            Some(Day::new(date!(2024 - 01 - 01))),
            Some(Day::new(date!(2024 - 03 - 31))),
        )
        .unwrap();
        assert!(range.contains(Day::new(date!(2024 - 01 - 01))));
        assert!(range.contains(Day::new(date!(2024 - 03 - 31))));
        assert!(!range.contains(Day::new(date!(2023 - 12 - 31))));
        assert!(!range.contains(Day::new(date!(2024 - 04 - 01))));
    }

    #[test]
    fn test_range_half_open() {
        let range = DateRange::new(None, Some(Day::new(date!(2024 - 03 - 31)))).unwrap();
        assert!(range.contains(Day::new(date!(1900 - 01 - 01))));
        assert!(!range.contains(Day::new(date!(2024 - 04 - 01))));
        assert!(DateRange::unbounded().contains(Day::new(date!(2024 - 04 - 01))));
    }

    #[test]
    fn test_range_min_after_max() {
        let r = DateRange::new(
            Some(Day::new(date!(2024 - 03 - 31))),
            Some(Day::new(date!(2024 - 01 - 01))),
        );
        assert!(matches!(r, Err(RangeError::MinAfterMax { .. })));
    }
}
