mod widget;
pub(crate) use self::widget::Calendar;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};
use swipecal::{
    day::{DateRange, Day},
    hybrid::{blend_heights, month_title, CalendarType, HybridCalendar, HybridConfig, MonthEvent},
    layout::{HeightTable, PageHeight},
    locale::{Locale, DAYS_IN_WEEK},
    page::{MonthPageIndex, PageError, PageIndex, PageIndexList, PageKind, PageType},
    pager::PagerError,
    pages::PageIndexChanged,
    registry::{PageData, RenderedPageRegistry},
    selection::{DaySelection, SelectionMode},
    sync::{index_to_f64, ScrollCommand, SyncIndexConfig},
    theme::ThemeConfig,
};

/// Columns per day when the terminal is wide enough for them
const WIDE_DAY_WIDTH: u16 = 7;

const NARROW_DAY_WIDTH: u16 = 5;

/// Terminal metrics in lines: one line per week row, a blank line between
/// rows, and a blank line above the first row
pub(crate) const TERMINAL_THEME: ThemeConfig = ThemeConfig {
    calendar_horizontal_paddings: 0.0,
    page_padding_top: 1.0,
    page_padding_bottom: 0.0,
    page_between_rows: 1.0,
    day_container_size: 1.0,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const SWIPE_DURATION: Duration = Duration::from_millis(200);

const TRANSITION_DURATION: Duration = Duration::from_millis(200);

/// How the calendar starts out
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ViewOptions {
    pub(crate) calendar_type: CalendarType,
    pub(crate) switchable: bool,
    pub(crate) range: DateRange,
    pub(crate) selected: Option<Day>,
    /// Day whose page is shown first
    pub(crate) initial_page: Option<Day>,
    pub(crate) locale: Locale,
}

/// A value moving from `from` to `to` over `duration`, easing out
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: f64,
    to: f64,
    start: Instant,
    duration: Duration,
}

impl Tween {
    fn new(from: f64, to: f64, start: Instant, duration: Duration) -> Tween {
        Tween {
            from,
            to,
            start,
            duration,
        }
    }

    fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }

    fn value(&self, now: Instant) -> f64 {
        if self.is_done(now) {
            return self.to;
        }
        let t = now.saturating_duration_since(self.start).as_secs_f64()
            / self.duration.as_secs_f64();
        let eased = t * (2.0 - t);
        (self.to - self.from).mul_add(eased, self.from)
    }
}

/// A page of the shown pager that overlaps the viewport
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct VisiblePage {
    /// Column of the page's left edge relative to the viewport
    pub(crate) x: i32,
    pub(crate) rows: Vec<[Day; 7]>,
    /// The month of a month page; days outside it are drawn dimmed
    pub(crate) month: Option<MonthPageIndex>,
}

/// Everything the terminal calendar shows: the selection, the week and month
/// pagers, the mounted pages and their heights, and running animations
#[derive(Clone, Debug)]
pub(crate) struct CalendarView {
    locale: Locale,
    selection: DaySelection,
    calendar: HybridCalendar,
    registry: RenderedPageRegistry,
    week_heights: HeightTable,
    month_heights: HeightTable,
    today: Day,
    day_width: u16,
    scroll: Option<(PageType, Tween)>,
    transition: Option<Tween>,
    type_progress: f64,
    status: Option<String>,
}

impl CalendarView {
    pub(crate) fn new(options: ViewOptions, today: Day) -> Result<CalendarView, PagerError> {
        let page_length = page_length_for(WIDE_DAY_WIDTH);
        let calendar = HybridCalendar::new(
            HybridConfig {
                calendar_type: options.calendar_type,
                switchable: options.switchable,
                range: options.range,
                selected_day: options.selected,
                initial_page: options.initial_page,
                today,
                sync: SyncIndexConfig::default(),
                week_page_length: page_length,
                month_page_length: page_length,
            },
            &options.locale,
        )?;
        let mut view = CalendarView {
            selection: DaySelection::new(
                options.selected,
                options.range,
                SelectionMode::Uncontrolled,
            ),
            locale: options.locale,
            calendar,
            registry: RenderedPageRegistry::new(),
            week_heights: HeightTable::new(),
            month_heights: HeightTable::new(),
            today,
            day_width: WIDE_DAY_WIDTH,
            scroll: None,
            transition: None,
            type_progress: options.calendar_type.progress(),
            status: None,
        };
        view.update_header()?;
        view.mount_pages()?;
        Ok(view)
    }

    pub(crate) fn locale(&self) -> &Locale {
        &self.locale
    }

    pub(crate) fn selection(&self) -> &DaySelection {
        &self.selection
    }

    pub(crate) fn calendar(&self) -> &HybridCalendar {
        &self.calendar
    }

    pub(crate) fn today(&self) -> Day {
        self.today
    }

    pub(crate) fn day_width(&self) -> u16 {
        self.day_width
    }

    pub(crate) fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub(crate) fn is_animating(&self) -> bool {
        self.scroll.is_some() || self.transition.is_some()
    }

    /// Header text naming the month in view
    pub(crate) fn title(&self) -> String {
        self.calendar
            .header_month(self.selection.selected_day())
            .map_or_else(|_| String::new(), |m| month_title(m, &self.locale))
    }

    /// Height of the page container in lines, blended between the week and
    /// month heights while the calendar type is switching
    pub(crate) fn container_height(&self) -> Option<f64> {
        let week = self
            .week_heights
            .interpolated_height(self.calendar.week().index_progress());
        let month = self
            .month_heights
            .interpolated_height(self.calendar.month().index_progress());
        blend_heights(self.type_progress, week, month)
    }

    /// Pages of the shown pager overlapping the viewport at the current
    /// scroll offset
    pub(crate) fn visible_pages(&self) -> Vec<VisiblePage> {
        match self.calendar.calendar_type() {
            CalendarType::Week => {
                let pager = self.calendar.week();
                overlapping(pager.offset(), pager.page_length(), pager.list().len())
                    .filter_map(|i| {
                        let week = pager.list().get(i)?;
                        Some(VisiblePage {
                            x: page_x(i, pager.offset(), pager.page_length()),
                            rows: vec![week.days().ok()?],
                            month: None,
                        })
                    })
                    .collect()
            }
            CalendarType::Month => {
                let pager = self.calendar.month();
                overlapping(pager.offset(), pager.page_length(), pager.list().len())
                    .filter_map(|i| {
                        let month = pager.list().get(i)?;
                        Some(VisiblePage {
                            x: page_x(i, pager.offset(), pager.page_length()),
                            rows: month.weeks(&self.locale).ok()?,
                            month: Some(month),
                        })
                    })
                    .collect()
            }
        }
    }

    /// Adapts the day width to a terminal of `width` columns.  The pagers
    /// keep their current pages.
    pub(crate) fn resize(&mut self, width: u16) -> Result<(), PagerError> {
        let day_width = day_width_for(width);
        if day_width == self.day_width {
            return Ok(());
        }
        tracing::debug!(width, day_width, "resizing calendar");
        self.finish_scroll()?;
        self.day_width = day_width;
        let page_length = page_length_for(day_width);
        for page_type in [PageType::Week, PageType::Month] {
            self.calendar.set_page_length(page_type, page_length)?;
        }
        self.mount_pages()
    }

    /// Starts an animated swipe `delta` pages away.  Returns `false` at either
    /// end of the page list.
    pub(crate) fn swipe(&mut self, delta: isize, now: Instant) -> Result<bool, PagerError> {
        self.finish_scroll()?;
        let page_type = self.calendar.calendar_type().page_type();
        let Some(command) = self.calendar.step(delta, true)? else {
            return Ok(false);
        };
        self.start_scroll(page_type, command, now)?;
        Ok(true)
    }

    /// Presses `day`.  Returns `false` if the day cannot be selected.
    pub(crate) fn select(&mut self, day: Day, now: Instant) -> Result<bool, PagerError> {
        let outcome = self.selection.press(day);
        tracing::debug!(
            day = %outcome.pressed.day,
            previous = ?outcome.pressed.selected_day,
            "day pressed"
        );
        let Some(changed) = outcome.changed else {
            if self.selection.is_day_disabled(day) {
                self.report(format!("{day} cannot be selected"));
                return Ok(false);
            }
            return Ok(true);
        };
        self.report(format!("selected {}", changed.day));
        let page = self
            .calendar
            .follow_selected_day(changed.day, &self.locale, now)?;
        self.page_changed(page);
        self.update_header()?;
        self.mount_pages()?;
        Ok(true)
    }

    /// Selects the day `days` days away from the selected day, or from today
    /// if nothing is selected
    pub(crate) fn select_relative(&mut self, days: i64, now: Instant) -> Result<bool, PagerError> {
        let base = self.selection.selected_day().unwrap_or(self.today);
        let Some(day) = base.checked_add_days(days) else {
            return Ok(false);
        };
        self.select(day, now)
    }

    pub(crate) fn select_today(&mut self, now: Instant) -> Result<bool, PagerError> {
        self.select(self.today, now)
    }

    /// Scrolls to today's page.  Returns `false` if today is outside the
    /// page list.
    pub(crate) fn scroll_to_today(&mut self, now: Instant) -> Result<bool, PagerError> {
        self.finish_scroll()?;
        let page_type = self.calendar.calendar_type().page_type();
        let Some(command) = self
            .calendar
            .scroll_to_today(self.today, &self.locale, true)?
        else {
            return Ok(false);
        };
        self.start_scroll(page_type, command, now)?;
        Ok(true)
    }

    /// Switches between the week and month views.  Returns `false` if the
    /// calendar is locked to one of them.
    pub(crate) fn toggle_type(&mut self, now: Instant) -> Result<bool, PagerError> {
        if !self.calendar.is_switchable() {
            return Ok(false);
        }
        self.finish_scroll()?;
        let target = self.calendar.calendar_type().toggled();
        let changed =
            self.calendar
                .switch_type(target, self.selection.selected_day(), &self.locale)?;
        self.transition = Some(Tween::new(
            self.type_progress,
            target.progress(),
            now,
            TRANSITION_DURATION,
        ));
        self.report(format!("switched to {target} view"));
        self.page_changed(changed);
        self.update_header()?;
        self.mount_pages()?;
        Ok(true)
    }

    pub(crate) fn set_today(&mut self, today: Day) {
        self.today = today;
        self.report(format!("today is now {today}"));
    }

    /// Advances animations and fires due repositions
    pub(crate) fn tick(&mut self, now: Instant) -> Result<(), PagerError> {
        if let Some((page_type, tween)) = self.scroll {
            if tween.is_done(now) {
                self.scroll = None;
            }
            self.apply_offset(page_type, tween.value(now))?;
        }
        if let Some(tween) = self.transition {
            self.type_progress = tween.value(now);
            if tween.is_done(now) {
                self.transition = None;
            }
        }
        for (page_type, command) in self.calendar.poll(now)? {
            self.start_scroll(page_type, command, now)?;
        }
        Ok(())
    }

    /// When [`CalendarView::tick`] next has something to do
    pub(crate) fn deadline(&self, now: Instant) -> Option<Instant> {
        if self.is_animating() {
            Some(now + FRAME_INTERVAL)
        } else {
            self.calendar.deadline()
        }
    }

    fn offset_of(&self, page_type: PageType) -> f64 {
        match page_type {
            PageType::Week => self.calendar.week().offset(),
            PageType::Month => self.calendar.month().offset(),
        }
    }

    fn start_scroll(
        &mut self,
        page_type: PageType,
        command: ScrollCommand,
        now: Instant,
    ) -> Result<(), PagerError> {
        tracing::trace!(%page_type, ?command, "scroll command");
        if command.animated {
            let from = self.offset_of(page_type);
            self.scroll = Some((
                page_type,
                Tween::new(from, command.offset, now, SWIPE_DURATION),
            ));
            Ok(())
        } else {
            if matches!(self.scroll, Some((t, _)) if t == page_type) {
                self.scroll = None;
            }
            self.apply_offset(page_type, command.offset)
        }
    }

    fn finish_scroll(&mut self) -> Result<(), PagerError> {
        match self.scroll.take() {
            Some((page_type, tween)) => self.apply_offset(page_type, tween.to),
            None => Ok(()),
        }
    }

    fn apply_offset(&mut self, page_type: PageType, offset: f64) -> Result<(), PagerError> {
        let changed = self.calendar.on_scroll(page_type, offset)?;
        self.page_changed(changed);
        self.update_header()?;
        self.mount_pages()
    }

    fn page_changed(&mut self, changed: Option<PageIndexChanged<PageIndex>>) {
        if let Some(changed) = changed {
            self.report(format!("now showing {}", changed.value));
        }
    }

    fn update_header(&mut self) -> Result<(), PagerError> {
        let Some(event) = self
            .calendar
            .update_header(self.selection.selected_day())?
        else {
            return Ok(());
        };
        let title = self.title();
        match event {
            MonthEvent::Initialized { .. } => tracing::info!(%title, "month initialized"),
            MonthEvent::Changed { .. } => self.report(format!("month changed to {title}")),
        }
        Ok(())
    }

    fn report(&mut self, message: String) {
        tracing::info!("{message}");
        self.status = Some(message);
    }

    /// Mounts the pages around the current position of both pagers,
    /// unmounts the rest, and rebuilds the height tables
    fn mount_pages(&mut self) -> Result<(), PagerError> {
        let week = self.calendar.week();
        let weeks = mounted_indices(week.index_progress(), week.array_index(), week.list().len());
        let month = self.calendar.month();
        let months =
            mounted_indices(month.index_progress(), month.array_index(), month.list().len());
        let mut mounted = Vec::new();
        for i in weeks.clone() {
            mounted.extend(page_data(week.list(), i, &self.locale)?);
        }
        for i in months.clone() {
            mounted.extend(page_data(month.list(), i, &self.locale)?);
        }
        self.registry
            .retain(PageType::Week, |key| weeks.contains(&key.array_index));
        self.registry
            .retain(PageType::Month, |key| months.contains(&key.array_index));
        for page in mounted {
            if self.registry.upsert(page) {
                tracing::trace!(key = %page.key(), height = page.page_height, "page measured");
            }
        }
        self.week_heights
            .update(&self.registry.query(Some(PageType::Week)));
        self.month_heights
            .update(&self.registry.query(Some(PageType::Month)));
        Ok(())
    }
}

fn day_width_for(width: u16) -> u16 {
    if width >= WIDE_DAY_WIDTH * u16::from(DAYS_IN_WEEK) {
        WIDE_DAY_WIDTH
    } else {
        NARROW_DAY_WIDTH
    }
}

fn page_length_for(day_width: u16) -> f64 {
    f64::from(day_width * u16::from(DAYS_IN_WEEK))
}

fn page_data<T: PageKind>(
    list: &PageIndexList<T>,
    array_index: usize,
    locale: &Locale,
) -> Result<Option<PageData>, PageError> {
    let Some(page) = list.get(array_index) else {
        return Ok(None);
    };
    let row_count = page.row_count(locale)?;
    Ok(Some(PageData {
        array_index,
        page_type: T::PAGE_TYPE,
        start: page.first_day()?,
        end: page.last_day()?,
        page_height: PageHeight::Theme.resolve(row_count, &TERMINAL_THEME),
        row_count,
    }))
}

// The pages between the continuous position and the current index, plus one
// on either side
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn mounted_indices(progress: f64, index: usize, len: usize) -> RangeInclusive<usize> {
    let last = len.saturating_sub(1);
    let (lo, hi) = if progress.is_finite() && progress >= 0.0 {
        (progress.floor() as usize, progress.ceil() as usize)
    } else {
        (index, index)
    };
    let hi = hi.max(index).saturating_add(1).min(last);
    let lo = lo.min(index).saturating_sub(1).min(hi);
    lo..=hi
}

// Array indices of the pages intersecting `[offset, offset + page_length)`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn overlapping(offset: f64, page_length: f64, len: usize) -> impl Iterator<Item = usize> {
    let first = if page_length > 0.0 && offset.is_finite() && offset > 0.0 {
        (offset / page_length).floor() as usize
    } else {
        0
    };
    (first..=first.saturating_add(1)).filter(move |&i| i < len)
}

#[allow(clippy::cast_possible_truncation)]
fn page_x(array_index: usize, offset: f64, page_length: f64) -> i32 {
    let x = index_to_f64(array_index).mul_add(page_length, -offset).round();
    x.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Rounds a length in lines to whole terminal lines
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn to_lines(value: f64) -> u16 {
    if value.is_nan() {
        0
    } else {
        value.round().clamp(0.0, f64::from(u16::MAX)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn view(calendar_type: CalendarType, switchable: bool) -> CalendarView {
        CalendarView::new(
            ViewOptions {
                calendar_type,
                switchable,
                range: DateRange::unbounded(),
                selected: None,
                initial_page: None,
                locale: Locale::english(),
            },
            Day::new(date!(2024 - 02 - 15)),
        )
        .unwrap()
    }

    fn settle(view: &mut CalendarView, start: Instant) -> Instant {
        let mut now = start;
        for _ in 0..100 {
            now += FRAME_INTERVAL;
            view.tick(now).unwrap();
            if view.deadline(now).is_none() {
                break;
            }
        }
        now
    }

    #[test]
    fn test_tween() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 100.0, start, Duration::from_millis(200));
        assert!((tween.value(start) - 0.0).abs() < 1e-9, "tween starts at `from`");
        let mid = tween.value(start + Duration::from_millis(100));
        assert!(mid > 50.0 && mid < 100.0, "tween eases out");
        assert!(
            (tween.value(start + Duration::from_secs(1)) - 100.0).abs() < 1e-9,
            "tween ends at `to`"
        );
        let instant = Tween::new(0.0, 1.0, start, Duration::ZERO);
        assert!(instant.is_done(start), "zero-length tween is done at once");
    }

    #[test]
    fn test_initial_state() {
        let view = view(CalendarType::Month, true);
        assert_eq!(view.title(), "February 2024");
        // 1 + 5 rows + 4 gaps
        assert_eq!(view.container_height(), Some(10.0));
        assert_eq!(view.registry.query(Some(PageType::Month)).len(), 3);
        assert_eq!(view.registry.query(Some(PageType::Week)).len(), 3);
        assert_eq!(view.status(), None);
    }

    #[test]
    fn test_initial_page_over_selection() {
        let view = CalendarView::new(
            ViewOptions {
                calendar_type: CalendarType::Month,
                switchable: true,
                range: DateRange::unbounded(),
                selected: Some(Day::new(date!(2024 - 02 - 20))),
                initial_page: Some(Day::new(date!(2024 - 06 - 10))),
                locale: Locale::english(),
            },
            Day::new(date!(2024 - 02 - 15)),
        )
        .unwrap();
        assert_eq!(view.title(), "June 2024");
        assert_eq!(
            view.selection().selected_day(),
            Some(Day::new(date!(2024 - 02 - 20)))
        );
    }

    #[test]
    fn test_swipe_animates_to_next_month() {
        let mut view = view(CalendarType::Month, true);
        let start = Instant::now();
        assert!(view.swipe(1, start).unwrap());
        assert!(view.is_animating());
        settle(&mut view, start);
        assert!(!view.is_animating());
        assert_eq!(view.title(), "March 2024");
        assert_eq!(view.status(), Some("month changed to March 2024"));
        // March 2024 spans six weeks
        assert_eq!(view.container_height(), Some(12.0));
    }

    #[test]
    fn test_select_follows_day() {
        let mut view = view(CalendarType::Month, true);
        let start = Instant::now();
        assert!(view.select(Day::new(date!(2024 - 04 - 10)), start).unwrap());
        assert_eq!(view.title(), "April 2024");
        let end = settle(&mut view, start);
        assert!(view.deadline(end).is_none(), "reposition has fired");
        let (index, offset) = view.calendar().position();
        assert_eq!(index, 63);
        assert!((offset - 63.0 * 49.0).abs() < 1e-9, "pager scrolled to April");
    }

    #[test]
    fn test_select_relative_from_today() {
        let mut view = view(CalendarType::Week, true);
        let now = Instant::now();
        assert!(view.select_relative(1, now).unwrap());
        assert_eq!(
            view.selection().selected_day(),
            Some(Day::new(date!(2024 - 02 - 16)))
        );
        assert_eq!(view.status(), Some("selected 2024-02-16"));
    }

    #[test]
    fn test_select_disabled_day() {
        let mut view = CalendarView::new(
            ViewOptions {
                calendar_type: CalendarType::Month,
                switchable: true,
                range: DateRange::new(
                    Some(Day::new(date!(2024 - 02 - 01))),
                    Some(Day::new(date!(2024 - 02 - 29))),
                )
                .unwrap(),
                selected: None,
                initial_page: None,
                locale: Locale::english(),
            },
            Day::new(date!(2024 - 02 - 15)),
        )
        .unwrap();
        let now = Instant::now();
        assert!(!view.select(Day::new(date!(2024 - 03 - 01)), now).unwrap());
        assert_eq!(view.selection().selected_day(), None);
        assert_eq!(view.status(), Some("2024-03-01 cannot be selected"));
    }

    #[test]
    fn test_toggle_type() {
        let mut view = view(CalendarType::Month, true);
        let start = Instant::now();
        assert!(view.toggle_type(start).unwrap());
        assert_eq!(view.calendar().calendar_type(), CalendarType::Week);
        assert!(view.is_animating());
        settle(&mut view, start);
        // 1 + 1 row
        assert_eq!(view.container_height(), Some(2.0));
        // The week of February 1st starts in January
        assert_eq!(view.title(), "January 2024");
        assert_eq!(view.status(), Some("month changed to January 2024"));
    }

    #[test]
    fn test_locked_type() {
        let mut view = view(CalendarType::Week, false);
        assert!(!view.toggle_type(Instant::now()).unwrap());
        assert_eq!(view.calendar().calendar_type(), CalendarType::Week);
    }

    #[test]
    fn test_narrow_resize_keeps_page() {
        let mut view = view(CalendarType::Month, true);
        view.resize(40).unwrap();
        assert_eq!(view.day_width(), NARROW_DAY_WIDTH);
        assert_eq!(view.title(), "February 2024");
        let (index, offset) = view.calendar().position();
        assert!(
            (offset - index_to_f64(index) * 35.0).abs() < 1e-9,
            "offset follows the new page length"
        );
    }

    #[test]
    fn test_mounted_indices() {
        assert_eq!(mounted_indices(5.0, 5, 10), 4..=6);
        assert_eq!(mounted_indices(4.5, 5, 10), 3..=6);
        assert_eq!(mounted_indices(0.0, 0, 10), 0..=1);
        assert_eq!(mounted_indices(9.0, 9, 10), 8..=9);
        assert_eq!(mounted_indices(0.0, 0, 1), 0..=0);
    }

    #[test]
    fn test_overlapping_pages() {
        assert_eq!(overlapping(98.0, 49.0, 5).collect::<Vec<_>>(), [2, 3]);
        assert_eq!(overlapping(0.0, 49.0, 1).collect::<Vec<_>>(), [0]);
        assert_eq!(page_x(3, 98.0, 49.0), 49);
        assert_eq!(page_x(2, 120.0, 49.0), -22);
    }
}
