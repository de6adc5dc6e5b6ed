use std::time::{Duration, Instant};
use thiserror::Error;

/// How a pager repositions itself when its index is changed by something
/// other than scrolling
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SyncIndexConfig {
    pub enable: bool,
    pub animated: bool,
    pub delay: Duration,
}

impl Default for SyncIndexConfig {
    fn default() -> SyncIndexConfig {
        SyncIndexConfig {
            enable: true,
            animated: true,
            delay: Duration::from_millis(200),
        }
    }
}

/// Offsets closer than this are treated as the same position
const OFFSET_TOLERANCE: f64 = 1e-6;

/// Page geometry used to turn a scroll offset into an array index
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetGeometry {
    /// Length of one page along the scroll axis
    pub length: f64,
    pub index_min: usize,
    pub index_max: usize,
}

/// Returns the array index of the page nearest to `offset`, clamped to
/// `index_min..=index_max`.  An offset exactly halfway between two pages
/// rounds to the later page.
///
/// A page length of zero or less is a configuration error.  Debug builds
/// report it; release builds fall back to `index_min`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn index_by_offset(offset: f64, geometry: OffsetGeometry) -> Result<usize, SyncError> {
    let OffsetGeometry {
        length,
        index_min,
        index_max,
    } = geometry;
    if length.is_nan() || length <= 0.0 {
        if cfg!(debug_assertions) {
            return Err(SyncError::InvalidPageLength(length));
        }
        return Ok(index_min);
    }
    let whole = (offset / length).trunc();
    let part = offset % length;
    let calc = if part >= length / 2.0 {
        whole + 1.0
    } else {
        whole
    };
    if calc.is_nan() || calc <= index_to_f64(index_min) {
        Ok(index_min)
    } else if calc >= index_to_f64(index_max) {
        Ok(index_max)
    } else {
        // In range and integral, so the conversion is exact
        Ok(calc as usize)
    }
}

/// Converts an array index to a float for offset arithmetic
pub fn index_to_f64(index: usize) -> f64 {
    u32::try_from(index).map_or(f64::from(u32::MAX), f64::from)
}

/// Holds only the latest requested argument and fires it once no newer
/// request has arrived for `delay`.  A new request replaces a pending one and
/// restarts the wait.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, arg: T, now: Instant) {
        self.pending = Some((arg, now + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|&(_, at)| at)
    }

    /// Returns the pending argument if its deadline has passed
    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.pending.take() {
            Some((arg, at)) if now >= at => Some(arg),
            other => {
                self.pending = other;
                None
            }
        }
    }
}

/// An instruction to the presentation layer to scroll a pager
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollCommand {
    pub index: usize,
    pub offset: f64,
    pub animated: bool,
}

/// Reconciles a continuously sampled scroll offset with the discrete array
/// index of the current page.
///
/// Scroll samples update the index immediately.  Index changes from
/// elsewhere are turned into a debounced [`ScrollCommand`]; when the debounce
/// fires, the command is computed from the offset and index current at that
/// moment, and is skipped if the offset already shows the target page.
///
/// While a command is in flight, scroll samples only move the offset; the
/// index changes again once the target page is reached or the command is
/// cancelled.  A sample that moves away from the target, or that repeats an
/// offset at which some other page is fully shown, means the scroll was
/// interrupted: the command is dropped and the sample is handled normally.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSynchronizer {
    config: SyncIndexConfig,
    page_length: f64,
    len: usize,
    index: usize,
    offset: f64,
    reposition: Debouncer<()>,
    /// Target of the issued command and the offset it was issued at
    in_flight: Option<(usize, f64)>,
}

impl PageSynchronizer {
    /// Creates a synchronizer for a list of `len` pages, positioned at
    /// `index`
    pub fn new(
        len: usize,
        index: usize,
        page_length: f64,
        config: SyncIndexConfig,
    ) -> Result<PageSynchronizer, SyncError> {
        check_page_length(page_length)?;
        if len == 0 {
            return Err(SyncError::EmptyList);
        }
        let index = index.min(len - 1);
        Ok(PageSynchronizer {
            config,
            page_length,
            len,
            index,
            offset: index_to_f64(index) * page_length,
            reposition: Debouncer::new(config.delay),
            in_flight: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn page_length(&self) -> f64 {
        self.page_length
    }

    /// Number of pages in the list
    pub fn page_count(&self) -> usize {
        self.len
    }

    pub fn config(&self) -> SyncIndexConfig {
        self.config
    }

    /// Takes effect for the next reposition; a pending one keeps its
    /// deadline
    pub fn set_config(&mut self, config: SyncIndexConfig) {
        self.config = config;
        self.reposition.delay = config.delay;
    }

    /// Continuous position: the scroll offset in units of pages
    pub fn index_progress(&self) -> f64 {
        self.offset / self.page_length
    }

    fn geometry(&self) -> OffsetGeometry {
        OffsetGeometry {
            length: self.page_length,
            index_min: 0,
            index_max: self.len.saturating_sub(1),
        }
    }

    /// Index the current offset shows
    pub fn index_at_offset(&self) -> Result<usize, SyncError> {
        index_by_offset(self.offset, self.geometry())
    }

    /// Records a scroll sample.  Returns the new array index if the sample
    /// moved the pager onto a different page.
    pub fn on_scroll(&mut self, offset: f64) -> Result<Option<usize>, SyncError> {
        let previous = std::mem::replace(&mut self.offset, offset);
        let candidate = self.index_at_offset()?;
        if let Some((target, origin)) = self.in_flight {
            if candidate != target {
                if !self.is_interrupted(target, origin, previous, candidate) {
                    return Ok(None);
                }
                tracing::debug!(
                    target_index = target,
                    index = candidate,
                    "reposition interrupted"
                );
            }
            self.in_flight = None;
        }
        if candidate == self.index {
            Ok(None)
        } else {
            self.index = candidate;
            Ok(Some(candidate))
        }
    }

    fn is_interrupted(&self, target: usize, origin: f64, previous: f64, candidate: usize) -> bool {
        let goal = self.offset_of(target);
        if (self.offset - goal).abs() > (previous - goal).abs() + OFFSET_TOLERANCE {
            return true;
        }
        // Resting on a page the scroll has moved to, not the one it left
        (self.offset - origin).abs() > OFFSET_TOLERANCE
            && (self.offset - previous).abs() <= OFFSET_TOLERANCE
            && (self.offset - self.offset_of(candidate)).abs() <= OFFSET_TOLERANCE
    }

    /// Records an index change that did not come from scrolling and
    /// schedules the pager to be repositioned
    pub fn set_index(&mut self, index: usize, now: Instant) {
        if index == self.index {
            return;
        }
        self.index = index;
        if self.config.enable {
            self.reposition.schedule((), now);
        }
    }

    /// Fires the pending reposition if it is due
    pub fn poll(&mut self, now: Instant) -> Result<Option<ScrollCommand>, SyncError> {
        if self.reposition.take_ready(now).is_none() {
            return Ok(None);
        }
        let shown = self.index_at_offset()?;
        if shown == self.index || self.index >= self.len {
            return Ok(None);
        }
        let command = ScrollCommand {
            index: self.index,
            offset: self.offset_of(self.index),
            animated: self.config.animated,
        };
        tracing::debug!(
            index = command.index,
            animated = command.animated,
            "repositioning pager"
        );
        self.in_flight = Some((command.index, self.offset));
        Ok(Some(command))
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.reposition.deadline()
    }

    /// Offset at which the page at `index` is fully shown
    pub fn offset_of(&self, index: usize) -> f64 {
        index_to_f64(index) * self.page_length
    }

    /// An immediate scroll to `index`, bypassing the debounce
    pub fn scroll_to(&mut self, index: usize, animated: bool) -> Result<ScrollCommand, SyncError> {
        if index >= self.len {
            return Err(SyncError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        self.reposition.cancel();
        self.in_flight = Some((index, self.offset));
        Ok(ScrollCommand {
            index,
            offset: self.offset_of(index),
            animated,
        })
    }

    /// Changes the page length (e.g. the container was resized) and jumps
    /// to the current index without animation.  The offset is updated at
    /// once, so the change never registers as navigation.
    pub fn set_page_length(&mut self, page_length: f64) -> Result<ScrollCommand, SyncError> {
        check_page_length(page_length)?;
        self.page_length = page_length;
        self.in_flight = None;
        self.offset = self.offset_of(self.index);
        Ok(ScrollCommand {
            index: self.index,
            offset: self.offset,
            animated: false,
        })
    }

    /// Adopts a rebuilt page list of `len` pages with the current page at
    /// `index`.  Jumps there without animation.
    pub fn reset(&mut self, len: usize, index: usize) -> Result<ScrollCommand, SyncError> {
        if len == 0 {
            return Err(SyncError::EmptyList);
        }
        self.len = len;
        self.index = index.min(len - 1);
        self.cancel();
        self.offset = self.offset_of(self.index);
        Ok(ScrollCommand {
            index: self.index,
            offset: self.offset,
            animated: false,
        })
    }

    /// Returns `true` while a scroll command has been issued but its target
    /// page has not been reached
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Drops any pending reposition and forgets the in-flight target
    pub fn cancel(&mut self) {
        self.reposition.cancel();
        self.in_flight = None;
    }
}

fn check_page_length(page_length: f64) -> Result<(), SyncError> {
    if page_length.is_nan() || page_length <= 0.0 {
        Err(SyncError::InvalidPageLength(page_length))
    } else {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SyncError {
    #[error("page length must be positive, got {0}")]
    InvalidPageLength(f64),
    #[error("pager has no pages")]
    EmptyList,
    #[error("array index {index} is out of bounds for a list of {len} pages")]
    IndexOutOfBounds { index: usize, len: usize },
}
