use super::{week_from, PageError, PageIndex, PageKind, PageType};
use crate::day::Day;
use crate::locale::Locale;
use std::fmt;

/// Identity of a week page: the year and day of the year of the week's first
/// day
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct WeekPageIndex {
    year: i32,
    day_of_year: u16,
}

impl WeekPageIndex {
    /// Names the week starting on the given day.  Whether that day is
    /// actually a first day of the week depends on the locale and is not
    /// checked.
    pub const fn new(year: i32, day_of_year: u16) -> WeekPageIndex {
        WeekPageIndex { year, day_of_year }
    }

    pub fn starting_on(day: Day) -> WeekPageIndex {
        WeekPageIndex::new(day.year(), day.ordinal())
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    pub const fn day_of_year(self) -> u16 {
        self.day_of_year
    }

    /// The seven days of the week in display order
    pub fn days(self) -> Result<[Day; 7], PageError> {
        week_from(self.first_day()?).ok_or(PageError::OutOfTime)
    }

    /// Returns `true` if `day` falls within this week
    pub fn contains(self, day: Day) -> Result<bool, PageError> {
        Ok(self.first_day()? <= day && day <= self.last_day()?)
    }
}

impl PageKind for WeekPageIndex {
    const PAGE_TYPE: PageType = PageType::Week;

    fn containing(day: Day, locale: &Locale) -> Result<WeekPageIndex, PageError> {
        locale
            .start_of_week(day)
            .map(WeekPageIndex::starting_on)
            .ok_or(PageError::OutOfTime)
    }

    fn first_day(self) -> Result<Day, PageError> {
        Day::from_ordinal_date(self.year, self.day_of_year)
            .map_err(|_| PageError::InvalidPage(PageIndex::Week(self)))
    }

    fn last_day(self) -> Result<Day, PageError> {
        self.first_day()?
            .checked_add_days(6)
            .ok_or(PageError::OutOfTime)
    }

    fn next(self) -> Result<WeekPageIndex, PageError> {
        self.first_day()?
            .checked_add_days(7)
            .map(WeekPageIndex::starting_on)
            .ok_or(PageError::OutOfTime)
    }

    fn row_count(self, _locale: &Locale) -> Result<u8, PageError> {
        Ok(1)
    }
}

impl fmt::Display for WeekPageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {}/{:03}", self.year, self.day_of_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{macros::date, Weekday};

    #[test]
    fn test_containing() {
        let locale = Locale::english();
        let week = WeekPageIndex::containing(Day::new(date!(2023 - 11 - 16)), &locale).unwrap();
        assert_eq!(week, WeekPageIndex::new(2023, 316));
        assert_eq!(week.first_day().unwrap(), Day::new(date!(2023 - 11 - 12)));
        assert_eq!(week.last_day().unwrap(), Day::new(date!(2023 - 11 - 18)));
    }

    #[test]
    fn test_containing_from_week_start() {
        let locale = Locale::english();
        let sunday = Day::new(date!(2023 - 11 - 12));
        let saturday = Day::new(date!(2023 - 11 - 18));
        assert_eq!(
            WeekPageIndex::containing(sunday, &locale).unwrap(),
            WeekPageIndex::containing(saturday, &locale).unwrap(),
        );
    }

    #[test]
    fn test_containing_across_year() {
        let locale = Locale::english().with_week_start(Weekday::Monday);
        let week = WeekPageIndex::containing(Day::new(date!(2025 - 01 - 01)), &locale).unwrap();
        assert_eq!(week, WeekPageIndex::new(2024, 365));
        assert_eq!(week.first_day().unwrap(), Day::new(date!(2024 - 12 - 30)));
        assert_eq!(week.next().unwrap(), WeekPageIndex::new(2025, 6));
    }

    #[test]
    fn test_days() {
        let week = WeekPageIndex::starting_on(Day::new(date!(2024 - 02 - 25)));
        let days = week.days().unwrap();
        assert_eq!(days[0], Day::new(date!(2024 - 02 - 25)));
        assert_eq!(days[4], Day::new(date!(2024 - 02 - 29)));
        assert_eq!(days[6], Day::new(date!(2024 - 03 - 02)));
        assert!(week.contains(Day::new(date!(2024 - 03 - 02))).unwrap());
        assert!(!week.contains(Day::new(date!(2024 - 03 - 03))).unwrap());
    }

    #[test]
    fn test_invalid_ordinal() {
        let week = WeekPageIndex::new(2023, 366);
        assert_eq!(
            week.first_day(),
            Err(PageError::InvalidPage(PageIndex::Week(week)))
        );
    }
}
