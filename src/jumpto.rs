use crate::style::{
    jumpto::{READY_ENTER_STYLE, UNFILLED_CELL_STYLE},
    BASE_STYLE,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Margin, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Clear, StatefulWidget, Widget},
};
use swipecal::day::Day;
use time::Month;

const OUTER_WIDTH: u16 = 17;
const OUTER_HEIGHT: u16 = 8;
const YEAR_END: usize = 4;
const MONTH_END: usize = 6;
const ENTER_POS: usize = 8;

/// Dialog for typing in a date to select
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct JumpTo;

impl StatefulWidget for JumpTo {
    type State = JumpToState;

    /*
     * .................
     * .┌── Go To… ───┐.
     * .│             │.
     * .│ -YYYY-MM-DD │.
     * .│             │.
     * .│   [ENTER]   │.
     * .└─────────────┘.
     * .................
     */

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let [outer_area] = Layout::horizontal([OUTER_WIDTH])
            .flex(Flex::Center)
            .areas(area);
        let [outer_area] = Layout::vertical([OUTER_HEIGHT])
            .flex(Flex::Center)
            .areas(outer_area);
        Clear.render(outer_area, buf);
        Block::new().style(BASE_STYLE).render(outer_area, buf);
        let block_area = outer_area.inner(Margin::new(1, 1));
        Block::bordered()
            .title(" Go To… ")
            .title_alignment(Alignment::Center)
            .render(block_area, buf);
        let text_area = block_area.inner(Margin::new(1, 1));
        state.to_text().render(text_area, buf);
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct JumpToState {
    negative: bool,
    // Year, month, and day digits in entry order
    digits: [Option<u8>; ENTER_POS],
    pos: usize,
}

impl JumpToState {
    pub(crate) fn new() -> JumpToState {
        JumpToState::default()
    }

    fn to_text(self) -> Text<'static> {
        Text::from_iter([
            Line::styled("", BASE_STYLE),
            self.to_line(),
            Line::styled("", BASE_STYLE),
            // Style a span and convert it to a line rather than creating a
            // styled line directly so that only the "[ENTER]" text and not any
            // of its centering padding will be underlined:
            Line::from(Span::styled(
                "[ENTER]",
                if self.pos == ENTER_POS {
                    READY_ENTER_STYLE
                } else {
                    BASE_STYLE
                },
            )),
        ])
        .centered()
    }

    fn to_line(self) -> Line<'static> {
        let mut spans = Vec::new();
        spans.push(Span::styled(
            if self.negative { "-" } else { " " },
            BASE_STYLE,
        ));
        for (i, dg) in self.digits.iter().enumerate() {
            if i == YEAR_END || i == MONTH_END {
                spans.push(Span::styled("-", BASE_STYLE));
            }
            spans.push(match dg {
                Some(d) => Span::styled(format!("{d}"), BASE_STYLE),
                None => Span::styled(placeholder(i), UNFILLED_CELL_STYLE),
            });
        }
        Line::from_iter(spans)
    }

    pub(crate) fn handle_input(&mut self, input: JumpToInput) -> JumpToOutput {
        match (input, self.pos) {
            (JumpToInput::Negative, 0) => {
                self.negative = !self.negative;
                JumpToOutput::Ok
            }
            (JumpToInput::Positive, 0) => {
                self.negative = false;
                JumpToOutput::Ok
            }
            (JumpToInput::Digit(d), 0..ENTER_POS) => {
                if let Some(slot) = self.digits.get_mut(self.pos) {
                    *slot = Some(d);
                }
                self.pos += 1;
                JumpToOutput::Ok
            }
            (JumpToInput::Backspace, 1..) => {
                self.pos -= 1;
                if let Some(slot) = self.digits.get_mut(self.pos) {
                    *slot = None;
                }
                JumpToOutput::Ok
            }
            (JumpToInput::Enter, ENTER_POS) => match self.to_day() {
                Some(day) => JumpToOutput::Jump(day),
                None => JumpToOutput::Invalid,
            },
            _ => JumpToOutput::Invalid,
        }
    }

    fn to_day(self) -> Option<Day> {
        let year = i32::try_from(number(self.digits.get(..YEAR_END)?)?).ok()?;
        let year = if self.negative { -year } else { year };
        let month = u8::try_from(number(self.digits.get(YEAR_END..MONTH_END)?)?).ok()?;
        let month = Month::try_from(month).ok()?;
        let day = u8::try_from(number(self.digits.get(MONTH_END..)?)?).ok()?;
        Day::from_calendar_date(year, month, day).ok()
    }
}

fn placeholder(i: usize) -> &'static str {
    if i < YEAR_END {
        "Y"
    } else if i < MONTH_END {
        "M"
    } else {
        "D"
    }
}

// Returns `None` if any digit is unset
fn number(digits: &[Option<u8>]) -> Option<u32> {
    digits
        .iter()
        .try_fold(0u32, |acc, &d| Some(acc * 10 + u32::from(d?)))
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToInput {
    Negative,
    Positive,
    Digit(u8),
    Backspace,
    Enter,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum JumpToOutput {
    Ok,
    Invalid,
    Jump(Day),
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn enter(state: &mut JumpToState, s: &str) {
        for c in s.chars() {
            let input = match c {
                '-' => JumpToInput::Negative,
                '<' => JumpToInput::Backspace,
                d => JumpToInput::Digit(u8::try_from(d.to_digit(10).unwrap()).unwrap()),
            };
            assert_eq!(state.handle_input(input), JumpToOutput::Ok);
        }
    }

    #[test]
    fn test_enter_date() {
        let mut state = JumpToState::new();
        enter(&mut state, "20240215");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(Day::new(date!(2024 - 02 - 15)))
        );
    }

    #[test]
    fn test_backspace() {
        let mut state = JumpToState::new();
        enter(&mut state, "2024021<<<0301");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(Day::new(date!(2024 - 03 - 01)))
        );
    }

    #[test]
    fn test_invalid_date() {
        let mut state = JumpToState::new();
        enter(&mut state, "20230229");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        let mut state = JumpToState::new();
        enter(&mut state, "20241301");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
    }

    #[test]
    fn test_early_enter() {
        let mut state = JumpToState::new();
        enter(&mut state, "2024");
        assert_eq!(state.handle_input(JumpToInput::Enter), JumpToOutput::Invalid);
        assert_eq!(state.handle_input(JumpToInput::Negative), JumpToOutput::Invalid);
    }

    #[test]
    fn test_negative_year() {
        let mut state = JumpToState::new();
        enter(&mut state, "-00440315");
        assert_eq!(
            state.handle_input(JumpToInput::Enter),
            JumpToOutput::Jump(Day::from_calendar_date(-44, Month::March, 15).unwrap())
        );
    }
}
