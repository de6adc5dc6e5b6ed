use crate::day::{DateRange, Day};
use crate::locale::Locale;
use crate::page::{PageError, PageIndexList, PageKind};

/// Reported whenever the current page of a [`Pages`] model changes
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PageIndexChanged<T> {
    pub value: T,
}

/// Where a [`Pages`] model starts
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct InitialPage<T> {
    /// Explicitly requested start page; takes priority when set
    pub explicit: Option<T>,
    pub selected_day: Option<Day>,
    pub today: Day,
}

impl<T: PageKind> InitialPage<T> {
    /// Starts at `page` regardless of the selection
    pub fn at(page: T, today: Day) -> Self {
        InitialPage {
            explicit: Some(page),
            selected_day: None,
            today,
        }
    }

    /// Picks the explicit page, else the page of the selected day, else the
    /// page of today
    pub fn resolve(&self, locale: &Locale) -> Result<T, PageError> {
        match (self.explicit, self.selected_day) {
            (Some(page), _) => Ok(page),
            (None, Some(day)) => T::containing(day, locale),
            (None, None) => T::containing(self.today, locale),
        }
    }

    /// Day around which the default range window is centered
    pub fn anchor(&self) -> Day {
        self.selected_day.unwrap_or(self.today)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum PageState<T> {
    Uninitialized,
    Active(T),
}

/// The page list of one granularity together with the current page.
///
/// A model starts out uninitialized and becomes active once
/// [`Pages::initialize`] picks the starting page.  From then on the current
/// page only changes through [`Pages::change_index`] (navigation) or
/// [`Pages::follow_selected_day`] (an external selection change).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pages<T> {
    list: PageIndexList<T>,
    state: PageState<T>,
}

impl<T: PageKind> Pages<T> {
    pub fn new(list: PageIndexList<T>) -> Self {
        Pages {
            list,
            state: PageState::Uninitialized,
        }
    }

    /// Builds the list for `range` and activates the model at the page chosen
    /// by `initial`
    pub fn for_range(
        range: DateRange,
        initial: &InitialPage<T>,
        locale: &Locale,
    ) -> Result<Self, PageError> {
        let list = PageIndexList::for_range(range, initial.anchor(), locale)?;
        let mut pages = Pages::new(list);
        pages.initialize(initial, locale)?;
        Ok(pages)
    }

    pub fn initialize(&mut self, initial: &InitialPage<T>, locale: &Locale) -> Result<T, PageError> {
        let page = initial.resolve(locale)?;
        tracing::debug!(page_type = %T::PAGE_TYPE, %page, "initialized page index");
        self.state = PageState::Active(page);
        Ok(page)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PageState::Active(_))
    }

    pub fn list(&self) -> &PageIndexList<T> {
        &self.list
    }

    /// Replaces the page list wholesale.  The current page is kept even if it
    /// is not in the new list.
    pub fn set_list(&mut self, list: PageIndexList<T>) {
        self.list = list;
    }

    pub fn current(&self) -> Option<T> {
        match self.state {
            PageState::Active(page) => Some(page),
            PageState::Uninitialized => None,
        }
    }

    /// Position of the current page in the list
    pub fn array_index(&self) -> Option<usize> {
        self.current().and_then(|page| self.list.array_index_of(page))
    }

    /// Moves to `page`, reporting the change if it is a different page
    pub fn change_index(&mut self, page: T) -> Option<PageIndexChanged<T>> {
        if self.current() == Some(page) {
            return None;
        }
        tracing::debug!(page_type = %T::PAGE_TYPE, %page, "page index changed");
        self.state = PageState::Active(page);
        Some(PageIndexChanged { value: page })
    }

    /// Moves to the page at `array_index` in the list
    pub fn change_array_index(
        &mut self,
        array_index: usize,
    ) -> Result<Option<PageIndexChanged<T>>, PageError> {
        let page = self
            .list
            .get(array_index)
            .ok_or(PageError::ArrayIndexOutOfBounds {
                index: array_index,
                len: self.list.len(),
            })?;
        Ok(self.change_index(page))
    }

    /// Moves to the page containing a newly selected day.  Does nothing until
    /// the model is active.
    pub fn follow_selected_day(
        &mut self,
        day: Day,
        locale: &Locale,
    ) -> Result<Option<PageIndexChanged<T>>, PageError> {
        if !self.is_active() {
            return Ok(None);
        }
        let page = T::containing(day, locale)?;
        Ok(self.change_index(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{MonthPageIndex, WeekPageIndex};
    use time::{macros::date, Month};

    fn q1_2024() -> DateRange {
        DateRange::new(
            Some(Day::new(date!(2024 - 01 - 01))),
            Some(Day::new(date!(2024 - 03 - 31))),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_priority() {
        let locale = Locale::english();
        let today = Day::new(date!(2024 - 03 - 10));
        let selected = Day::new(date!(2024 - 02 - 15));
        let explicit = MonthPageIndex::new(2024, Month::January);
        let initial = InitialPage {
            explicit: Some(explicit),
            selected_day: Some(selected),
            today,
        };
        assert_eq!(initial.resolve(&locale), Ok(explicit));
        let initial = InitialPage {
            explicit: None,
            ..initial
        };
        assert_eq!(
            initial.resolve(&locale),
            Ok(MonthPageIndex::new(2024, Month::February))
        );
        let initial = InitialPage {
            selected_day: None,
            ..initial
        };
        assert_eq!(
            initial.resolve(&locale),
            Ok(MonthPageIndex::new(2024, Month::March))
        );
    }

    #[test]
    fn test_uninitialized_to_active() {
        let locale = Locale::english();
        let list = PageIndexList::build(
            MonthPageIndex::new(2024, Month::January),
            MonthPageIndex::new(2024, Month::March),
        )
        .unwrap();
        let mut pages = Pages::new(list);
        assert!(!pages.is_active());
        assert_eq!(pages.current(), None);
        let day = Day::new(date!(2024 - 02 - 15));
        assert_eq!(pages.follow_selected_day(day, &locale), Ok(None));
        let initial = InitialPage {
            explicit: None,
            selected_day: Some(day),
            today: day,
        };
        pages.initialize(&initial, &locale).unwrap();
        assert!(pages.is_active());
        assert_eq!(pages.array_index(), Some(1));
    }

    #[test]
    fn test_change_index_reports_once() {
        let locale = Locale::english();
        let initial = InitialPage {
            explicit: None,
            selected_day: Some(Day::new(date!(2024 - 02 - 15))),
            today: Day::new(date!(2024 - 02 - 15)),
        };
        let mut pages = Pages::<MonthPageIndex>::for_range(q1_2024(), &initial, &locale).unwrap();
        let march = MonthPageIndex::new(2024, Month::March);
        assert_eq!(
            pages.change_index(march),
            Some(PageIndexChanged { value: march })
        );
        assert_eq!(pages.change_index(march), None);
        assert_eq!(pages.array_index(), Some(2));
        assert_eq!(
            pages.change_array_index(0).unwrap(),
            Some(PageIndexChanged {
                value: MonthPageIndex::new(2024, Month::January)
            })
        );
        assert!(pages.change_array_index(3).is_err());
    }

    #[test]
    fn test_follow_selected_day() {
        let locale = Locale::english();
        let today = Day::new(date!(2024 - 01 - 10));
        let initial = InitialPage {
            explicit: None,
            selected_day: None,
            today,
        };
        let mut pages = Pages::<WeekPageIndex>::for_range(q1_2024(), &initial, &locale).unwrap();
        assert_eq!(pages.array_index(), Some(1));
        let changed = pages
            .follow_selected_day(Day::new(date!(2024 - 01 - 31)), &locale)
            .unwrap();
        assert_eq!(
            changed,
            Some(PageIndexChanged {
                value: WeekPageIndex::new(2024, 28)
            })
        );
        assert_eq!(pages.array_index(), Some(4));
        // Same week, no change
        assert_eq!(
            pages.follow_selected_day(Day::new(date!(2024 - 02 - 03)), &locale),
            Ok(None)
        );
    }
}
