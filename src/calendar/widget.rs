use super::{to_lines, CalendarView, VisiblePage, TERMINAL_THEME};
use crate::style::{
    BASE_STYLE, DISABLED_STYLE, SECONDARY_STYLE, SELECTED_STYLE, STATUS_STYLE, TITLE_STYLE,
    TODAY_STYLE, WEEKDAY_STYLE,
};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::StatefulWidget};
use swipecal::{
    day::Day,
    locale::{Locale, DAYS_IN_WEEK},
};

const TITLE_LINE: u16 = 0;

const WEEKDAY_LINE: u16 = 1;

const RULE_LINE: u16 = 2;

/// First line of the page container
const PAGES_TOP: u16 = 3;

/// Number of lines at the bottom of the area used for status text
const STATUS_LINES: u16 = 2;

/// Columns taken up by the text of a day, e.g. "[15]"
const CELL_WIDTH: u16 = 4;

const ACS_HLINE: char = '─';

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Calendar;

impl StatefulWidget for Calendar {
    type State = CalendarView;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut CalendarView) {
        if let Err(e) = state.resize(area.width) {
            tracing::error!(error = %e, "failed to resize calendar");
        }
        let day_width = state.day_width();
        let page_width = day_width * u16::from(DAYS_IN_WEEK);
        let left = area.width.saturating_sub(page_width) / 2;
        let viewport = Rect {
            x: area.x + left,
            y: area.y,
            width: page_width.min(area.width.saturating_sub(left)),
            height: area.height,
        };
        let status_top = area.height.saturating_sub(STATUS_LINES);
        let container = state
            .container_height()
            .map_or(0, to_lines)
            .min(status_top.saturating_sub(PAGES_TOP));
        let mut canvas = BufferCanvas::new(viewport, buf, day_width);
        canvas.draw_title(&state.title());
        canvas.draw_weekdays(state.locale());
        canvas.hline(RULE_LINE, page_width);
        for page in state.visible_pages() {
            canvas.draw_page(&page, container, state);
        }
        let mut canvas = BufferCanvas::new(area, buf, day_width);
        canvas.draw_status(status_top, left, state);
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
    day_width: u16,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer, day_width: u16) -> Self {
        Self {
            area,
            buf,
            day_width,
        }
    }

    fn draw_title(&mut self, title: &str) {
        let len = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
        let x = self.area.width.saturating_sub(len) / 2;
        self.print(TITLE_LINE, i32::from(x), title, TITLE_STYLE);
    }

    fn draw_weekdays(&mut self, locale: &Locale) {
        let day_width = i32::from(self.day_width);
        for (col, name) in (0i32..).zip(locale.weekday_names()) {
            let len = i32::try_from(name.chars().count()).unwrap_or(day_width);
            let x = col * day_width + (day_width - len) / 2;
            self.print(WEEKDAY_LINE, x, name, WEEKDAY_STYLE);
        }
    }

    // Rows past `container` lines are cut off
    fn draw_page(&mut self, page: &VisiblePage, container: u16, view: &CalendarView) {
        let top = to_lines(TERMINAL_THEME.page_padding_top);
        let stride =
            to_lines(TERMINAL_THEME.day_container_size + TERMINAL_THEME.page_between_rows);
        let day_width = i32::from(self.day_width);
        let pad = i32::from(self.day_width.saturating_sub(CELL_WIDTH) / 2);
        for (row, week) in (0u16..).zip(&page.rows) {
            let y = top.saturating_add(row.saturating_mul(stride));
            if y >= container {
                break;
            }
            for (col, &day) in (0i32..).zip(week) {
                let x = page.x + col * day_width + pad;
                self.print(
                    PAGES_TOP + y,
                    x,
                    &day_text(day, view.today()),
                    day_style(day, page, view),
                );
            }
        }
    }

    fn draw_status(&mut self, y: u16, x: u16, view: &CalendarView) {
        let selected = view
            .selection()
            .selected_day()
            .map_or_else(|| String::from("-"), |day| day.to_string());
        let line = format!(
            "{} view  selected: {selected}  today: {}",
            view.calendar().calendar_type(),
            view.today()
        );
        self.print(y, i32::from(x), &line, STATUS_STYLE);
        if let Some(status) = view.status() {
            self.print(y + 1, i32::from(x), status, STATUS_STYLE);
        }
    }

    fn hline(&mut self, y: u16, length: u16) {
        self.print(
            y,
            0,
            &String::from(ACS_HLINE).repeat(length.into()),
            BASE_STYLE,
        );
    }

    // Prints `s` starting at column `x`, dropping characters outside the
    // canvas.  `x` may be negative for pages scrolled partly out of view.
    fn print(&mut self, y: u16, x: i32, s: &str, style: Style) {
        if y >= self.area.height {
            return;
        }
        for (col, ch) in (x..).zip(s.chars()) {
            let Ok(col) = u16::try_from(col) else {
                continue;
            };
            if col >= self.area.width {
                break;
            }
            if let Some(cell) = self.buf.cell_mut((self.area.x + col, self.area.y + y)) {
                cell.set_char(ch).set_style(style);
            }
        }
    }
}

fn day_text(day: Day, today: Day) -> String {
    if day == today {
        format!("[{:>2}]", day.day())
    } else {
        format!(" {:>2} ", day.day())
    }
}

fn day_style(day: Day, page: &VisiblePage, view: &CalendarView) -> Style {
    let selection = view.selection();
    if selection.is_selected(day) {
        SELECTED_STYLE
    } else if selection.is_day_disabled(day) {
        DISABLED_STYLE
    } else if day == view.today() {
        TODAY_STYLE
    } else if page
        .month
        .is_some_and(|m| m.year() != day.year() || m.month() != day.month())
    {
        SECONDARY_STYLE
    } else {
        BASE_STYLE
    }
}
