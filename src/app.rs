use crate::calendar::{Calendar, CalendarView};
use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::style::BASE_STYLE;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    DefaultTerminal,
};
use std::io::{self, Write};
use std::time::Instant;
use swipecal::clock::{CalendarClock, TimeSource};
use swipecal::pager::PagerError;

#[derive(Clone, Debug)]
pub(crate) struct App<T> {
    view: CalendarView,
    clock: CalendarClock<T>,
    state: AppState,
}

impl<T: TimeSource> App<T> {
    pub(crate) fn new(view: CalendarView, clock: CalendarClock<T>) -> App<T> {
        App {
            view,
            clock,
            state: AppState::Calendar,
        }
    }

    pub(crate) fn run(mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.quitting() {
            terminal.draw(|frame| frame.render_widget(&mut self, frame.area()))?;
            self.wait()?;
        }
        Ok(())
    }

    // Blocks until input arrives or an animation frame, reposition, or clock
    // sample is due, then handles whatever is ready
    fn wait(&mut self) -> anyhow::Result<()> {
        let now = Instant::now();
        let timeout = self.deadline(now).saturating_duration_since(now);
        if event::poll(timeout)? {
            let ev = event::read()?;
            self.handle_event(&ev, Instant::now())?;
        }
        // else: Redraw after a tick
        self.tick(Instant::now())?;
        Ok(())
    }

    fn deadline(&self, now: Instant) -> Instant {
        let clock = self.clock.deadline();
        self.view
            .deadline(now)
            .map_or(clock, |deadline| deadline.min(clock))
    }

    fn tick(&mut self, now: Instant) -> Result<(), PagerError> {
        if let Some(today) = self.clock.poll(now) {
            self.view.set_today(today);
        }
        self.view.tick(now)
    }

    fn handle_event(&mut self, ev: &Event, now: Instant) -> anyhow::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = ev.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code, now)? {
                self.beep()?;
            }
        }
        // Resizes are picked up by the next draw
        Ok(())
    }

    // Returns `false` if the key was invalid or had nothing to act on
    fn handle_key(&mut self, key: KeyCode, now: Instant) -> Result<bool, PagerError> {
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.view.swipe(-1, now),
                KeyCode::Char('l') | KeyCode::Right => self.view.swipe(1, now),
                KeyCode::Char('p') => self.view.select_relative(-1, now),
                KeyCode::Char('n') => self.view.select_relative(1, now),
                KeyCode::Char('v') => self.view.toggle_type(now),
                KeyCode::Char('t') => self.view.select_today(now),
                KeyCode::Char('0') | KeyCode::Home => self.view.scroll_to_today(now),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    Ok(true)
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    Ok(true)
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    Ok(true)
                }
                _ => Ok(false),
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                Ok(true)
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    return Ok(true);
                }
                let output = match key {
                    KeyCode::Char('-') => state.handle_input(JumpToInput::Negative),
                    KeyCode::Char('+') => state.handle_input(JumpToInput::Positive),
                    KeyCode::Char(c) => match c.to_digit(10).and_then(|d| u8::try_from(d).ok()) {
                        Some(d) => state.handle_input(JumpToInput::Digit(d)),
                        None => JumpToOutput::Invalid,
                    },
                    KeyCode::Backspace | KeyCode::Delete => {
                        state.handle_input(JumpToInput::Backspace)
                    }
                    KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                    _ => JumpToOutput::Invalid,
                };
                match output {
                    JumpToOutput::Ok => Ok(true),
                    JumpToOutput::Invalid => Ok(false),
                    JumpToOutput::Jump(day) => {
                        self.state = AppState::Calendar;
                        self.view.select(day, now)
                    }
                }
            }
            AppState::Quitting => Ok(false),
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }
}

impl<T> Widget for &mut App<T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        Calendar.render(area, buf, &mut self.view);
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}
