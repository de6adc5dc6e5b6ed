use crate::day::Day;
use std::time::{Duration, Instant};
use time::OffsetDateTime;

/// How often the clock re-samples the system time by default
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(5);

/// Source of the current wall-clock time
pub trait TimeSource {
    fn now(&self) -> OffsetDateTime;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }
}

/// Reads the system clock in the local timezone, falling back to UTC when the
/// local offset cannot be determined
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Supplies "today", re-sampling the time source on a fixed interval and
/// reporting a new value only when the calendar date actually changes.
///
/// The clock holds no background resources: its owner drives it by calling
/// [`CalendarClock::poll`] and can wait until [`CalendarClock::deadline`].
/// Dropping the clock cancels its timer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CalendarClock<T> {
    source: T,
    today: Day,
    refresh: Duration,
    next_sample: Instant,
}

impl<T: TimeSource> CalendarClock<T> {
    pub fn new(source: T, refresh: Duration, now: Instant) -> Self {
        let today = Day::from_datetime(source.now());
        CalendarClock {
            source,
            today,
            refresh,
            next_sample: now + refresh,
        }
    }

    pub fn today(&self) -> Day {
        self.today
    }

    pub fn deadline(&self) -> Instant {
        self.next_sample
    }

    /// Re-samples the time source if the refresh interval has elapsed.
    /// Returns the new day only if the date differs from the previous sample.
    pub fn poll(&mut self, now: Instant) -> Option<Day> {
        if now < self.next_sample {
            return None;
        }
        self.next_sample = now + self.refresh;
        let today = Day::from_datetime(self.source.now());
        if today == self.today {
            None
        } else {
            tracing::debug!(from = %self.today, to = %today, "calendar date rolled over");
            self.today = today;
            Some(today)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use time::macros::datetime;

    struct FakeTime(Cell<OffsetDateTime>);

    impl TimeSource for FakeTime {
        fn now(&self) -> OffsetDateTime {
            self.0.get()
        }
    }

    #[test]
    fn test_poll_only_on_date_change() {
        let source = FakeTime(Cell::new(datetime!(2024-02-15 23:59:50 UTC)));
        let start = Instant::now();
        let mut clock = CalendarClock::new(&source, Duration::from_secs(1), start);
        assert_eq!(clock.today().to_string(), "2024-02-15");
        // Not due yet
        source.0.set(datetime!(2024-02-16 00:00:10 UTC));
        assert_eq!(clock.poll(start + Duration::from_millis(500)), None);
        assert_eq!(clock.today().to_string(), "2024-02-15");
        // Due, and the date changed
        let day = clock.poll(start + Duration::from_secs(1)).unwrap();
        assert_eq!(day.to_string(), "2024-02-16");
        // Due, same date
        source.0.set(datetime!(2024-02-16 00:00:11 UTC));
        assert_eq!(clock.poll(start + Duration::from_secs(2)), None);
        assert_eq!(clock.deadline(), start + Duration::from_secs(3));
    }

    #[test]
    fn test_local_date_is_kept() {
        let source = FakeTime(Cell::new(datetime!(2024-02-15 23:30 -05:00)));
        let clock = CalendarClock::new(&source, DEFAULT_REFRESH, Instant::now());
        assert_eq!(clock.today().to_string(), "2024-02-15");
    }
}
