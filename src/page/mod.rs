mod month;
mod week;
pub use self::month::MonthPageIndex;
pub use self::week::WeekPageIndex;
use crate::day::{DateRange, Day};
use crate::locale::Locale;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use time::{Date, Month};

/// When a range bound is not given, page lists extend this many years before
/// and after the anchor day
pub const DEFAULT_YEARS_AROUND: i32 = 5;

/// Granularity of a page
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PageType {
    Week,
    Month,
}

impl PageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PageType::Week => "week",
            PageType::Month => "month",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a page of either granularity
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PageIndex {
    Week(WeekPageIndex),
    Month(MonthPageIndex),
}

impl PageIndex {
    pub const fn page_type(self) -> PageType {
        match self {
            PageIndex::Week(_) => PageType::Week,
            PageIndex::Month(_) => PageType::Month,
        }
    }

    pub fn first_day(self) -> Result<Day, PageError> {
        match self {
            PageIndex::Week(w) => w.first_day(),
            PageIndex::Month(m) => m.first_day(),
        }
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageIndex::Week(w) => write!(f, "{w}"),
            PageIndex::Month(m) => write!(f, "{m}"),
        }
    }
}

impl From<WeekPageIndex> for PageIndex {
    fn from(value: WeekPageIndex) -> PageIndex {
        PageIndex::Week(value)
    }
}

impl From<MonthPageIndex> for PageIndex {
    fn from(value: MonthPageIndex) -> PageIndex {
        PageIndex::Month(value)
    }
}

/// A page identity of one granularity.  Ordering is chronological.
pub trait PageKind: Copy + Ord + fmt::Debug + fmt::Display + Into<PageIndex> {
    const PAGE_TYPE: PageType;

    /// The page containing `day` under the locale's week convention
    fn containing(day: Day, locale: &Locale) -> Result<Self, PageError>;

    fn first_day(self) -> Result<Day, PageError>;

    fn last_day(self) -> Result<Day, PageError>;

    /// The page immediately after this one
    fn next(self) -> Result<Self, PageError>;

    /// Number of week rows the page shows
    fn row_count(self, locale: &Locale) -> Result<u8, PageError>;

    /// First page of the list when no lower bound is given
    fn default_range_start(anchor: Day, locale: &Locale) -> Result<Self, PageError> {
        Self::containing(default_first_day(anchor), locale)
    }

    /// Last page of the list when no upper bound is given
    fn default_range_end(anchor: Day, locale: &Locale) -> Result<Self, PageError> {
        Self::containing(default_last_day(anchor), locale)
    }

    /// First and last pages covering `range`, substituting the default window
    /// around `anchor` for missing bounds
    fn bounds(range: DateRange, anchor: Day, locale: &Locale) -> Result<(Self, Self), PageError> {
        let start = match range.min() {
            Some(day) => Self::containing(day, locale)?,
            None => Self::default_range_start(anchor, locale)?,
        };
        let end = match range.max() {
            Some(day) => Self::containing(day, locale)?,
            None => Self::default_range_end(anchor, locale)?,
        };
        Ok((start, end))
    }
}

const FIRST_DAY: Day = Day::new(Date::MIN);

const LAST_DAY: Day = Day::new(Date::MAX);

fn default_first_day(anchor: Day) -> Day {
    Day::from_calendar_date(anchor.year() - DEFAULT_YEARS_AROUND, Month::January, 1)
        .unwrap_or(FIRST_DAY)
}

fn default_last_day(anchor: Day) -> Day {
    Day::from_calendar_date(anchor.year() + DEFAULT_YEARS_AROUND, Month::December, 31)
        .unwrap_or(LAST_DAY)
}

/// Returns the seven consecutive days starting at `start`, or `None` if the
/// calendar ends first
pub fn week_from(start: Day) -> Option<[Day; 7]> {
    let mut days = [start; 7];
    let mut d = start;
    for slot in days.iter_mut().skip(1) {
        d = d.next_day()?;
        *slot = d;
    }
    Some(days)
}

/// An ordered, gap-free, non-empty list of page identities.
///
/// Lists are immutable snapshots; when the range they were built from
/// changes, a new list is built and the old one is discarded.  Cloning is
/// cheap.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageIndexList<T> {
    pages: Arc<[T]>,
}

impl<T: PageKind> PageIndexList<T> {
    /// Enumerates every page from `start` to `end` inclusive.  Fails if `end`
    /// precedes `start`.
    pub fn build(start: T, end: T) -> Result<Self, PageError> {
        if end < start {
            return Err(PageError::EndBeforeStart {
                start: start.into(),
                end: end.into(),
            });
        }
        let mut pages = vec![start];
        let mut p = start;
        while p < end {
            p = p.next()?;
            pages.push(p);
        }
        Ok(PageIndexList {
            pages: pages.into(),
        })
    }

    /// Builds the list covering `range`, with missing bounds replaced by the
    /// default window around `anchor`
    pub fn for_range(range: DateRange, anchor: Day, locale: &Locale) -> Result<Self, PageError> {
        let (start, end) = T::bounds(range, anchor, locale)?;
        Self::build(start, end)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, array_index: usize) -> Option<T> {
        self.pages.get(array_index).copied()
    }

    pub fn first(&self) -> Option<T> {
        self.pages.first().copied()
    }

    pub fn last(&self) -> Option<T> {
        self.pages.last().copied()
    }

    /// Highest valid array index
    pub fn index_max(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.pages.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.pages
    }

    /// Position of `page` in the list, or `None` if it is not present
    pub fn array_index_of(&self, page: T) -> Option<usize> {
        self.pages.binary_search(&page).ok()
    }

    /// Position of `page`, or of the end of the list nearest to it if the
    /// page falls outside
    pub fn nearest_array_index(&self, page: T) -> usize {
        match self.pages.binary_search(&page) {
            Ok(i) => i,
            Err(i) => i.min(self.index_max()),
        }
    }

    /// Like [`PageIndexList::array_index_of`], but treats a missing page as
    /// an error
    pub fn require_array_index(&self, page: T) -> Result<usize, PageError> {
        self.array_index_of(page)
            .ok_or(PageError::NotInList(page.into()))
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum PageError {
    #[error("page range ends ({end}) before it starts ({start})")]
    EndBeforeStart { start: PageIndex, end: PageIndex },
    #[error("{0} is not in the page list")]
    NotInList(PageIndex),
    #[error("{0} does not name a representable date")]
    InvalidPage(PageIndex),
    #[error("array index {index} is out of bounds for a list of {len} pages")]
    ArrayIndexOutOfBounds { index: usize, len: usize },
    #[error("reached the end of time")]
    OutOfTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn day(d: Date) -> Day {
        Day::new(d)
    }

    #[test]
    fn test_month_scenario() {
        let locale = Locale::english();
        let range = DateRange::new(
            Some(day(date!(2024 - 01 - 01))),
            Some(day(date!(2024 - 03 - 31))),
        )
        .unwrap();
        let anchor = day(date!(2024 - 02 - 15));
        let list = PageIndexList::<MonthPageIndex>::for_range(range, anchor, &locale).unwrap();
        let expected = [
            MonthPageIndex::from_parts(2024, 0).unwrap(),
            MonthPageIndex::from_parts(2024, 1).unwrap(),
            MonthPageIndex::from_parts(2024, 2).unwrap(),
        ];
        assert_eq!(list.as_slice(), expected);
        let page = MonthPageIndex::containing(anchor, &locale).unwrap();
        assert_eq!(page, MonthPageIndex::from_parts(2024, 1).unwrap());
        assert_eq!(list.array_index_of(page), Some(1));
    }

    #[test]
    fn test_build_lengths() {
        let locale = Locale::english();
        let start = WeekPageIndex::containing(day(date!(2023 - 12 - 20)), &locale).unwrap();
        let end = WeekPageIndex::containing(day(date!(2024 - 01 - 20)), &locale).unwrap();
        let list = PageIndexList::build(start, end).unwrap();
        // Weeks starting 12-17, 12-24, 12-31, 01-07, 01-14
        assert_eq!(list.len(), 5);
        assert!(list.as_slice().windows(2).all(|w| w[0] < w[1]));
        let start = MonthPageIndex::from_parts(2022, 10).unwrap();
        let end = MonthPageIndex::from_parts(2024, 1).unwrap();
        let list = PageIndexList::build(start, end).unwrap();
        assert_eq!(list.len(), 16);
        assert_eq!(list.first(), Some(start));
        assert_eq!(list.last(), Some(end));
    }

    #[test]
    fn test_build_single_page() {
        let page = MonthPageIndex::from_parts(2024, 5).unwrap();
        let list = PageIndexList::build(page, page).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.index_max(), 0);
    }

    #[test]
    fn test_build_end_before_start() {
        let start = MonthPageIndex::from_parts(2024, 5).unwrap();
        let end = MonthPageIndex::from_parts(2024, 4).unwrap();
        assert_eq!(
            PageIndexList::build(start, end),
            Err(PageError::EndBeforeStart {
                start: start.into(),
                end: end.into()
            })
        );
    }

    #[test]
    fn test_round_trip_and_lookup() {
        let locale = Locale::english().with_week_start(time::Weekday::Monday);
        let anchor = day(date!(2024 - 02 - 29));
        let list =
            PageIndexList::<WeekPageIndex>::for_range(DateRange::unbounded(), anchor, &locale)
                .unwrap();
        for (i, page) in list.iter().enumerate() {
            let first = page.first_day().unwrap();
            assert_eq!(WeekPageIndex::containing(first, &locale).unwrap(), page);
            assert_eq!(list.array_index_of(page), Some(i));
        }
        let page = WeekPageIndex::containing(anchor, &locale).unwrap();
        assert!(list.array_index_of(page).is_some());
    }

    #[test]
    fn test_default_window() {
        let locale = Locale::english();
        let anchor = day(date!(2024 - 06 - 15));
        let list =
            PageIndexList::<MonthPageIndex>::for_range(DateRange::unbounded(), anchor, &locale)
                .unwrap();
        assert_eq!(list.first(), MonthPageIndex::from_parts(2019, 0));
        assert_eq!(list.last(), MonthPageIndex::from_parts(2029, 11));
        assert_eq!(list.len(), 11 * 12);
    }

    #[test]
    fn test_missing_page() {
        let start = MonthPageIndex::from_parts(2024, 0).unwrap();
        let end = MonthPageIndex::from_parts(2024, 2).unwrap();
        let list = PageIndexList::build(start, end).unwrap();
        let outside = MonthPageIndex::from_parts(2024, 3).unwrap();
        assert_eq!(list.array_index_of(outside), None);
        assert_eq!(list.nearest_array_index(outside), 2);
        let before = MonthPageIndex::from_parts(2023, 11).unwrap();
        assert_eq!(list.nearest_array_index(before), 0);
        assert_eq!(
            list.require_array_index(outside),
            Err(PageError::NotInList(outside.into()))
        );
    }

    #[test]
    fn test_week_from() {
        let days = week_from(day(date!(2024 - 02 - 26))).unwrap();
        assert_eq!(days[6], day(date!(2024 - 03 - 03)));
        assert_eq!(week_from(day(Date::MAX)), None);
    }
}
