use crate::day::{DateRange, Day};
use crate::locale::{upper_first, Locale};
use crate::page::{
    MonthPageIndex, PageError, PageIndex, PageIndexList, PageKind, PageType, WeekPageIndex,
};
use crate::pager::{Pager, PagerError};
use crate::pages::{InitialPage, PageIndexChanged, Pages};
use crate::sync::{ScrollCommand, SyncIndexConfig};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;

/// The granularity a hybrid calendar is currently showing
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CalendarType {
    Week,
    #[default]
    Month,
}

impl CalendarType {
    pub const fn page_type(self) -> PageType {
        match self {
            CalendarType::Week => PageType::Week,
            CalendarType::Month => PageType::Month,
        }
    }

    pub const fn toggled(self) -> CalendarType {
        match self {
            CalendarType::Week => CalendarType::Month,
            CalendarType::Month => CalendarType::Week,
        }
    }

    /// Position of this type on the week-to-month transition
    pub const fn progress(self) -> f64 {
        match self {
            CalendarType::Week => 0.0,
            CalendarType::Month => 1.0,
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.page_type().as_str())
    }
}

impl FromStr for CalendarType {
    type Err = ParseCalendarTypeError;

    fn from_str(s: &str) -> Result<CalendarType, ParseCalendarTypeError> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "w" => Ok(CalendarType::Week),
            "month" | "m" => Ok(CalendarType::Month),
            _ => Err(ParseCalendarTypeError(s.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("unknown calendar type {0:?}; expected \"week\" or \"month\"")]
pub struct ParseCalendarTypeError(String);

/// The month page matching a week page: the selected day's month if the
/// selected day is in the week, else the month that begins inside the week,
/// else the month of the week's first day
pub fn synced_month_index(
    week: WeekPageIndex,
    selected: Option<Day>,
) -> Result<MonthPageIndex, PageError> {
    if let Some(day) = selected {
        if week.contains(day)? {
            return Ok(MonthPageIndex::new(day.year(), day.month()));
        }
    }
    let first = week.first_day()?;
    let day = week
        .days()?
        .into_iter()
        .find(|d| d.day() == 1)
        .unwrap_or(first);
    Ok(MonthPageIndex::new(day.year(), day.month()))
}

/// The week page matching a month page: the selected day's week if the
/// selected day is in the month, else the week of the 1st
pub fn synced_week_index(
    month: MonthPageIndex,
    selected: Option<Day>,
    locale: &Locale,
) -> Result<WeekPageIndex, PageError> {
    let first = month.first_day()?;
    let day = match selected {
        Some(d) if first <= d && d <= month.last_day()? => d,
        _ => first,
    };
    WeekPageIndex::containing(day, locale)
}

/// Week pages spanning the same days as a list of month pages
pub fn week_list_for(
    months: &PageIndexList<MonthPageIndex>,
    locale: &Locale,
) -> Result<PageIndexList<WeekPageIndex>, PageError> {
    let (Some(first), Some(last)) = (months.first(), months.last()) else {
        return Err(PageError::OutOfTime);
    };
    PageIndexList::build(
        WeekPageIndex::containing(first.first_day()?, locale)?,
        WeekPageIndex::containing(last.last_day()?, locale)?,
    )
}

/// The month the header shows.  In month view this is the current month
/// page.  In week view it is the selected day's month if the selected day is
/// in the viewed week, otherwise the month of the week's first day.
pub fn header_month(
    calendar_type: CalendarType,
    week: WeekPageIndex,
    month: MonthPageIndex,
    selected: Option<Day>,
) -> Result<MonthPageIndex, PageError> {
    match calendar_type {
        CalendarType::Month => Ok(month),
        CalendarType::Week => {
            if let Some(day) = selected {
                if week.contains(day)? {
                    return Ok(MonthPageIndex::new(day.year(), day.month()));
                }
            }
            let first = week.first_day()?;
            Ok(MonthPageIndex::new(first.year(), first.month()))
        }
    }
}

/// Header title, e.g. "February 2024"
pub fn month_title(month: MonthPageIndex, locale: &Locale) -> String {
    format!(
        "{} {}",
        upper_first(locale.month_name(month.month())),
        month.year()
    )
}

/// Displayed-month notification.  `month` is zero-based.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MonthEvent {
    Initialized { year: i32, month: u8 },
    Changed { year: i32, month: u8 },
}

/// Turns the stream of displayed months into [`MonthEvent`]s: one
/// `Initialized` for the first value, then `Changed` whenever it differs
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MonthHeaderTracker {
    last: Option<MonthPageIndex>,
}

impl MonthHeaderTracker {
    pub fn new() -> MonthHeaderTracker {
        MonthHeaderTracker::default()
    }

    pub fn current(&self) -> Option<MonthPageIndex> {
        self.last
    }

    pub fn update(&mut self, month: MonthPageIndex) -> Option<MonthEvent> {
        let (year, m) = (month.year(), month.month0());
        match self.last.replace(month) {
            None => Some(MonthEvent::Initialized { year, month: m }),
            Some(prev) if prev != month => Some(MonthEvent::Changed { year, month: m }),
            Some(_) => None,
        }
    }
}

/// Blends the week and month pager heights for a container transitioning
/// between them.  `None` until both heights are known.
pub fn blend_heights(type_progress: f64, week: Option<f64>, month: Option<f64>) -> Option<f64> {
    let (week, month) = (week?, month?);
    let t = type_progress.clamp(0.0, 1.0);
    Some((month - week).mul_add(t, week))
}

fn initial_page_of<T: PageKind>(
    day: Option<Day>,
    locale: &Locale,
) -> Result<Option<T>, PageError> {
    day.map(|d| T::containing(d, locale)).transpose()
}

/// Construction parameters of a [`HybridCalendar`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HybridConfig {
    pub calendar_type: CalendarType,
    /// When `false` the calendar stays on `calendar_type`
    pub switchable: bool,
    pub range: DateRange,
    pub selected_day: Option<Day>,
    /// Day whose page is shown first, ahead of the selected day and today
    pub initial_page: Option<Day>,
    pub today: Day,
    pub sync: SyncIndexConfig,
    /// Page lengths of the week and month pagers along the scroll axis
    pub week_page_length: f64,
    pub month_page_length: f64,
}

/// A week pager and a month pager kept pointing at the same dates, only one
/// of which is shown at a time
#[derive(Clone, Debug, PartialEq)]
pub struct HybridCalendar {
    calendar_type: CalendarType,
    switchable: bool,
    sync: SyncIndexConfig,
    week: Pager<WeekPageIndex>,
    month: Pager<MonthPageIndex>,
    header: MonthHeaderTracker,
}

impl HybridCalendar {
    /// Builds both pagers.  The pager of the starting type picks its page the
    /// usual way (the initial page, else the selected day, else today); the
    /// other is synced from it.  Switchable calendars derive their week range
    /// from their month range.
    pub fn new(config: HybridConfig, locale: &Locale) -> Result<HybridCalendar, PagerError> {
        let anchor = config
            .initial_page
            .or(config.selected_day)
            .unwrap_or(config.today);
        let months = PageIndexList::<MonthPageIndex>::for_range(config.range, anchor, locale)?;
        let weeks = if config.switchable {
            week_list_for(&months, locale)?
        } else {
            PageIndexList::for_range(config.range, anchor, locale)?
        };
        let mut week_pages = Pages::new(weeks);
        let mut month_pages = Pages::new(months);
        match config.calendar_type {
            CalendarType::Week => {
                let week = week_pages.initialize(
                    &InitialPage {
                        explicit: initial_page_of(config.initial_page, locale)?,
                        selected_day: config.selected_day,
                        today: config.today,
                    },
                    locale,
                )?;
                let month = synced_month_index(week, config.selected_day)?;
                month_pages.initialize(&InitialPage::at(month, config.today), locale)?;
            }
            CalendarType::Month => {
                let month = month_pages.initialize(
                    &InitialPage {
                        explicit: initial_page_of(config.initial_page, locale)?,
                        selected_day: config.selected_day,
                        today: config.today,
                    },
                    locale,
                )?;
                let week = synced_week_index(month, config.selected_day, locale)?;
                week_pages.initialize(&InitialPage::at(week, config.today), locale)?;
            }
        }
        let mut calendar = HybridCalendar {
            calendar_type: config.calendar_type,
            switchable: config.switchable,
            sync: config.sync,
            week: Pager::new(week_pages, config.week_page_length, config.sync)?,
            month: Pager::new(month_pages, config.month_page_length, config.sync)?,
            header: MonthHeaderTracker::new(),
        };
        calendar.apply_sync_configs();
        Ok(calendar)
    }

    // The shown pager repositions as configured; the hidden one jumps.
    fn apply_sync_configs(&mut self) {
        let hidden = SyncIndexConfig {
            animated: false,
            ..self.sync
        };
        let (week, month) = match self.calendar_type {
            CalendarType::Week => (self.sync, hidden),
            CalendarType::Month => (hidden, self.sync),
        };
        self.week.set_sync_config(week);
        self.month.set_sync_config(month);
    }

    pub fn calendar_type(&self) -> CalendarType {
        self.calendar_type
    }

    pub fn is_switchable(&self) -> bool {
        self.switchable
    }

    pub fn week(&self) -> &Pager<WeekPageIndex> {
        &self.week
    }

    pub fn month(&self) -> &Pager<MonthPageIndex> {
        &self.month
    }

    /// Current page of the shown pager
    pub fn current_page(&self) -> Option<PageIndex> {
        match self.calendar_type {
            CalendarType::Week => self.week.current().map(PageIndex::Week),
            CalendarType::Month => self.month.current().map(PageIndex::Month),
        }
    }

    /// Array index and scroll offset of the shown pager
    pub fn position(&self) -> (usize, f64) {
        match self.calendar_type {
            CalendarType::Week => (self.week.array_index(), self.week.offset()),
            CalendarType::Month => (self.month.array_index(), self.month.offset()),
        }
    }

    fn forward<T: PageKind>(
        &self,
        changed: Option<PageIndexChanged<T>>,
    ) -> Option<PageIndexChanged<PageIndex>> {
        let changed = changed?;
        (T::PAGE_TYPE == self.calendar_type.page_type()).then(|| PageIndexChanged {
            value: changed.value.into(),
        })
    }

    /// Feeds a scroll sample to the pager of `page_type`.  Only changes of the
    /// shown type are reported.
    pub fn on_scroll(
        &mut self,
        page_type: PageType,
        offset: f64,
    ) -> Result<Option<PageIndexChanged<PageIndex>>, PagerError> {
        match page_type {
            PageType::Week => {
                let changed = self.week.on_scroll(offset)?;
                Ok(self.forward(changed))
            }
            PageType::Month => {
                let changed = self.month.on_scroll(offset)?;
                Ok(self.forward(changed))
            }
        }
    }

    /// Moves both pagers to the pages of a newly selected day
    pub fn follow_selected_day(
        &mut self,
        day: Day,
        locale: &Locale,
        now: Instant,
    ) -> Result<Option<PageIndexChanged<PageIndex>>, PagerError> {
        let week = self.week.follow_selected_day(day, locale, now)?;
        let month = self.month.follow_selected_day(day, locale, now)?;
        Ok(self.forward(week).or_else(|| self.forward(month)))
    }

    /// Switches the shown granularity.  The target pager is recomputed once
    /// from the source pager's page and the selected day, and jumps there
    /// without animation.  Does nothing if `target` is already shown or the
    /// calendar is not switchable.
    pub fn switch_type(
        &mut self,
        target: CalendarType,
        selected: Option<Day>,
        locale: &Locale,
    ) -> Result<Option<PageIndexChanged<PageIndex>>, PagerError> {
        if target == self.calendar_type || !self.switchable {
            return Ok(None);
        }
        tracing::debug!(from = %self.calendar_type, to = %target, "switching calendar type");
        self.calendar_type = target;
        self.apply_sync_configs();
        let changed = match target {
            CalendarType::Month => {
                let week = self.week.current().ok_or(PagerError::Uninitialized)?;
                let month = synced_month_index(week, selected)?;
                let list = self.month.list();
                let Some(month) = list.get(list.nearest_array_index(month)) else {
                    return Ok(None);
                };
                let changed = self.month.jump_to(month)?;
                self.forward(changed)
            }
            CalendarType::Week => {
                let month = self.month.current().ok_or(PagerError::Uninitialized)?;
                let week = synced_week_index(month, selected, locale)?;
                let list = self.week.list();
                let Some(week) = list.get(list.nearest_array_index(week)) else {
                    return Ok(None);
                };
                let changed = self.week.jump_to(week)?;
                self.forward(changed)
            }
        };
        Ok(changed)
    }

    /// Immediate scroll of the shown pager to today's page
    pub fn scroll_to_today(
        &mut self,
        today: Day,
        locale: &Locale,
        animated: bool,
    ) -> Result<Option<ScrollCommand>, PagerError> {
        match self.calendar_type {
            CalendarType::Week => self.week.scroll_to_today(today, locale, animated),
            CalendarType::Month => self.month.scroll_to_today(today, locale, animated),
        }
    }

    /// Immediate scroll of the shown pager by `delta` pages
    pub fn step(
        &mut self,
        delta: isize,
        animated: bool,
    ) -> Result<Option<ScrollCommand>, PagerError> {
        match self.calendar_type {
            CalendarType::Week => self.week.step(delta, animated),
            CalendarType::Month => self.month.step(delta, animated),
        }
    }

    /// Collects due repositions of both pagers
    pub fn poll(&mut self, now: Instant) -> Result<Vec<(PageType, ScrollCommand)>, PagerError> {
        let mut commands = Vec::new();
        if let Some(c) = self.week.poll(now)? {
            commands.push((PageType::Week, c));
        }
        if let Some(c) = self.month.poll(now)? {
            commands.push((PageType::Month, c));
        }
        Ok(commands)
    }

    pub fn deadline(&self) -> Option<Instant> {
        match (self.week.deadline(), self.month.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn set_page_length(
        &mut self,
        page_type: PageType,
        page_length: f64,
    ) -> Result<ScrollCommand, PagerError> {
        match page_type {
            PageType::Week => self.week.set_page_length(page_length),
            PageType::Month => self.month.set_page_length(page_length),
        }
    }

    pub fn cancel(&mut self) {
        self.week.cancel();
        self.month.cancel();
    }

    /// The month the header currently shows
    pub fn header_month(&self, selected: Option<Day>) -> Result<MonthPageIndex, PagerError> {
        let week = self.week.current().ok_or(PagerError::Uninitialized)?;
        let month = self.month.current().ok_or(PagerError::Uninitialized)?;
        Ok(header_month(self.calendar_type, week, month, selected)?)
    }

    /// Recomputes the header month and reports it if it is new
    pub fn update_header(
        &mut self,
        selected: Option<Day>,
    ) -> Result<Option<MonthEvent>, PagerError> {
        let month = self.header_month(selected)?;
        let event = self.header.update(month);
        if let Some(ev) = event {
            tracing::debug!(?ev, "month header");
        }
        Ok(event)
    }
}
