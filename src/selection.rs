use crate::day::{DateRange, Day};
use std::collections::BTreeSet;

/// Who owns the selected day
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SelectionMode {
    /// The selection belongs to an external owner that re-supplies it through
    /// [`DaySelection::supply`]; local writes only request a change.
    Controlled,
    /// The selection is owned here and changes are reported as events.
    #[default]
    Uncontrolled,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DayChanged {
    pub day: Day,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DayPressed {
    pub day: Day,
    pub selected_day: Option<Day>,
}

/// Everything that results from pressing a day cell
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PressOutcome {
    pub pressed: DayPressed,
    pub changed: Option<DayChanged>,
}

/// Tracks the single selected day and the range of days that may be
/// selected
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DaySelection {
    selected: Option<Day>,
    // Last value handed to the external owner in controlled mode and not yet
    // re-supplied by it
    requested: Option<Day>,
    range: DateRange,
    disabled: BTreeSet<Day>,
    mode: SelectionMode,
}

impl DaySelection {
    pub fn new(selected: Option<Day>, range: DateRange, mode: SelectionMode) -> DaySelection {
        DaySelection {
            selected,
            requested: None,
            range,
            disabled: BTreeSet::new(),
            mode,
        }
    }

    pub fn with_disabled_days<I: IntoIterator<Item = Day>>(mut self, days: I) -> DaySelection {
        self.disabled.extend(days);
        self
    }

    pub fn selected_day(&self) -> Option<Day> {
        self.selected
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    pub fn set_range(&mut self, range: DateRange) {
        self.range = range;
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_day_in_range(&self, day: Day) -> bool {
        self.range.contains(day)
    }

    /// A day is disabled if it is outside the range or explicitly marked
    pub fn is_day_disabled(&self, day: Day) -> bool {
        !self.is_day_in_range(day) || self.disabled.contains(&day)
    }

    pub fn is_selected(&self, day: Day) -> bool {
        self.selected == Some(day)
    }

    /// Changes the selected day.
    ///
    /// Selecting the day that is already selected is a no-op.  In
    /// uncontrolled mode the new value is stored and reported; in controlled
    /// mode it is only reported, and the stored value changes once the owner
    /// passes it back to [`DaySelection::supply`].  Clearing the selection
    /// never produces an event.
    pub fn set_selected_day(&mut self, day: Option<Day>) -> Option<DayChanged> {
        if day == self.selected {
            return None;
        }
        match self.mode {
            SelectionMode::Uncontrolled => {
                self.selected = day;
                day.map(|day| DayChanged { day })
            }
            SelectionMode::Controlled => {
                let day = day?;
                if self.requested == Some(day) {
                    return None;
                }
                self.requested = Some(day);
                Some(DayChanged { day })
            }
        }
    }

    /// Adopts a value supplied by the external owner.  Returns `true` if the
    /// stored selection changed.
    pub fn supply(&mut self, day: Option<Day>) -> bool {
        self.requested = None;
        let Some(day) = day else {
            return false;
        };
        if self.selected == Some(day) {
            false
        } else {
            self.selected = Some(day);
            true
        }
    }

    /// Handles a press on a day cell.  The press is always reported; the
    /// selection only changes if the day is enabled.
    pub fn press(&mut self, day: Day) -> PressOutcome {
        let pressed = DayPressed {
            day,
            selected_day: self.selected,
        };
        let changed = if self.is_day_disabled(day) {
            None
        } else {
            self.set_selected_day(Some(day))
        };
        PressOutcome { pressed, changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn q1_2024() -> DateRange {
        DateRange::new(
            Some(Day::new(date!(2024 - 01 - 01))),
            Some(Day::new(date!(2024 - 03 - 31))),
        )
        .unwrap()
    }

    #[test]
    fn test_set_same_day_twice() {
        let mut sel = DaySelection::new(None, q1_2024(), SelectionMode::Uncontrolled);
        let day = Day::new(date!(2024 - 02 - 15));
        assert_eq!(sel.set_selected_day(Some(day)), Some(DayChanged { day }));
        assert_eq!(sel.set_selected_day(Some(day)), None);
        assert_eq!(sel.selected_day(), Some(day));
    }

    #[test]
    fn test_clear_selection() {
        let day = Day::new(date!(2024 - 02 - 15));
        let mut sel = DaySelection::new(Some(day), q1_2024(), SelectionMode::Uncontrolled);
        assert_eq!(sel.set_selected_day(None), None);
        assert_eq!(sel.selected_day(), None);
    }

    #[test]
    fn test_controlled_write_is_blocked() {
        let old = Day::new(date!(2024 - 02 - 01));
        let new = Day::new(date!(2024 - 02 - 15));
        let mut sel = DaySelection::new(Some(old), q1_2024(), SelectionMode::Controlled);
        assert_eq!(sel.set_selected_day(Some(new)), Some(DayChanged { day: new }));
        assert_eq!(sel.selected_day(), Some(old));
        // Requesting the same change again is not reported twice
        assert_eq!(sel.set_selected_day(Some(new)), None);
        assert!(sel.supply(Some(new)));
        assert_eq!(sel.selected_day(), Some(new));
        assert!(!sel.supply(Some(new)));
        assert!(!sel.supply(None));
        assert_eq!(sel.selected_day(), Some(new));
    }

    #[test]
    fn test_press_enabled_day() {
        let mut sel = DaySelection::new(None, q1_2024(), SelectionMode::Uncontrolled);
        let day = Day::new(date!(2024 - 03 - 31));
        let outcome = sel.press(day);
        assert_eq!(
            outcome.pressed,
            DayPressed {
                day,
                selected_day: None
            }
        );
        assert_eq!(outcome.changed, Some(DayChanged { day }));
        assert!(sel.is_selected(day));
    }

    #[test]
    fn test_press_out_of_range_day() {
        let selected = Day::new(date!(2024 - 02 - 15));
        let mut sel = DaySelection::new(Some(selected), q1_2024(), SelectionMode::Uncontrolled);
        let day = Day::new(date!(2024 - 04 - 01));
        let outcome = sel.press(day);
        assert_eq!(
            outcome.pressed,
            DayPressed {
                day,
                selected_day: Some(selected)
            }
        );
        assert_eq!(outcome.changed, None);
        assert_eq!(sel.selected_day(), Some(selected));
    }

    #[test]
    fn test_press_explicitly_disabled_day() {
        let day = Day::new(date!(2024 - 02 - 20));
        let mut sel = DaySelection::new(None, q1_2024(), SelectionMode::Uncontrolled)
            .with_disabled_days([day]);
        assert!(sel.is_day_in_range(day));
        assert!(sel.is_day_disabled(day));
        let outcome = sel.press(day);
        assert_eq!(outcome.changed, None);
        assert_eq!(sel.selected_day(), None);
    }
}
