use super::{week_from, PageError, PageIndex, PageKind, PageType};
use crate::day::Day;
use crate::locale::{Locale, DAYS_IN_WEEK};
use std::fmt;
use time::Month;

/// Identity of a month page.  The month number is zero-based.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MonthPageIndex {
    year: i32,
    month: u8,
}

impl MonthPageIndex {
    pub fn new(year: i32, month: Month) -> MonthPageIndex {
        MonthPageIndex {
            year,
            month: u8::from(month) - 1,
        }
    }

    /// Returns `None` if `month` is not in `0..12`
    pub fn from_parts(year: i32, month: u8) -> Option<MonthPageIndex> {
        (month < 12).then_some(MonthPageIndex { year, month })
    }

    pub const fn year(self) -> i32 {
        self.year
    }

    /// Zero-based month number
    pub const fn month0(self) -> u8 {
        self.month
    }

    pub const fn month(self) -> Month {
        Month::January.nth_next(self.month)
    }

    /// The week rows of the month grid, starting at the locale's first day of
    /// the week on or before the 1st.  Days outside the month fill the first
    /// and last rows.
    pub fn weeks(self, locale: &Locale) -> Result<Vec<[Day; 7]>, PageError> {
        let mut start = locale
            .start_of_week(self.first_day()?)
            .ok_or(PageError::OutOfTime)?;
        let rows = self.row_count(locale)?;
        let mut weeks = Vec::with_capacity(usize::from(rows));
        for _ in 0..rows {
            weeks.push(week_from(start).ok_or(PageError::OutOfTime)?);
            start = match start.checked_add_days(7) {
                Some(d) => d,
                None => break,
            };
        }
        Ok(weeks)
    }
}

impl PageKind for MonthPageIndex {
    const PAGE_TYPE: PageType = PageType::Month;

    fn containing(day: Day, _locale: &Locale) -> Result<MonthPageIndex, PageError> {
        Ok(MonthPageIndex::new(day.year(), day.month()))
    }

    fn first_day(self) -> Result<Day, PageError> {
        Day::from_calendar_date(self.year, self.month(), 1)
            .map_err(|_| PageError::InvalidPage(PageIndex::Month(self)))
    }

    fn last_day(self) -> Result<Day, PageError> {
        Day::from_calendar_date(
            self.year,
            self.month(),
            self.month().length(self.year),
        )
        .map_err(|_| PageError::InvalidPage(PageIndex::Month(self)))
    }

    fn next(self) -> Result<MonthPageIndex, PageError> {
        let next = if self.month == 11 {
            MonthPageIndex {
                year: self.year + 1,
                month: 0,
            }
        } else {
            MonthPageIndex {
                year: self.year,
                month: self.month + 1,
            }
        };
        // Reject months past the last representable date
        next.first_day()?;
        Ok(next)
    }

    fn row_count(self, locale: &Locale) -> Result<u8, PageError> {
        let first = self.first_day()?;
        let lead = locale.column_of(first.weekday());
        let cells = lead + self.month().length(self.year);
        Ok(cells.div_ceil(DAYS_IN_WEEK))
    }
}

impl fmt::Display for MonthPageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month {}-{:02}", self.year, self.month + 1)
    }
}
