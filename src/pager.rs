use crate::day::Day;
use crate::locale::Locale;
use crate::page::{PageError, PageIndexList, PageKind};
use crate::pages::{PageIndexChanged, Pages};
use crate::sync::{PageSynchronizer, ScrollCommand, SyncError, SyncIndexConfig};
use std::time::Instant;
use thiserror::Error;

/// A horizontally scrolling list of pages of one granularity.
///
/// Scrolling reports page changes straight away.  Changing the page any
/// other way (following a selected day, say) schedules a debounced
/// [`ScrollCommand`] that the caller collects with [`Pager::poll`] and
/// carries out by feeding the resulting offsets back to
/// [`Pager::on_scroll`].
#[derive(Clone, Debug, PartialEq)]
pub struct Pager<T> {
    pages: Pages<T>,
    sync: PageSynchronizer,
}

impl<T: PageKind> Pager<T> {
    /// `pages` must already be active.  A current page outside the list is
    /// moved to the nearest end of the list.
    pub fn new(
        mut pages: Pages<T>,
        page_length: f64,
        config: SyncIndexConfig,
    ) -> Result<Pager<T>, PagerError> {
        let current = pages.current().ok_or(PagerError::Uninitialized)?;
        let index = pages.list().nearest_array_index(current);
        if pages.list().array_index_of(current).is_none() {
            tracing::warn!(%current, "initial page is outside the page list");
            pages.change_array_index(index)?;
        }
        let sync = PageSynchronizer::new(pages.list().len(), index, page_length, config)?;
        Ok(Pager { pages, sync })
    }

    pub fn pages(&self) -> &Pages<T> {
        &self.pages
    }

    pub fn list(&self) -> &PageIndexList<T> {
        self.pages.list()
    }

    pub fn synchronizer(&self) -> &PageSynchronizer {
        &self.sync
    }

    pub fn current(&self) -> Option<T> {
        self.pages.current()
    }

    pub fn array_index(&self) -> usize {
        self.sync.index()
    }

    pub fn offset(&self) -> f64 {
        self.sync.offset()
    }

    pub fn page_length(&self) -> f64 {
        self.sync.page_length()
    }

    /// Scroll position in pages
    pub fn index_progress(&self) -> f64 {
        self.sync.index_progress()
    }

    /// Feeds a scroll sample, reporting the page change if the pager has
    /// settled on a different page
    pub fn on_scroll(&mut self, offset: f64) -> Result<Option<PageIndexChanged<T>>, PagerError> {
        let Some(index) = self.sync.on_scroll(offset)? else {
            return Ok(None);
        };
        Ok(self.pages.change_array_index(index)?)
    }

    /// Moves to `page` without scrolling; the pager catches up once the
    /// debounce fires
    pub fn change_index(
        &mut self,
        page: T,
        now: Instant,
    ) -> Result<Option<PageIndexChanged<T>>, PagerError> {
        let index = self.pages.list().require_array_index(page)?;
        let changed = self.pages.change_index(page);
        self.sync.set_index(index, now);
        Ok(changed)
    }

    /// Moves to the page containing the newly selected `day`.  A day whose
    /// page is outside the list leaves the pager where it is.
    pub fn follow_selected_day(
        &mut self,
        day: Day,
        locale: &Locale,
        now: Instant,
    ) -> Result<Option<PageIndexChanged<T>>, PagerError> {
        let page = T::containing(day, locale)?;
        if self.pages.list().array_index_of(page).is_none() {
            tracing::warn!(%day, %page, "selected day is outside the page list");
            return Ok(None);
        }
        if !self.pages.is_active() {
            return Ok(None);
        }
        self.change_index(page, now)
    }

    /// Moves to `page` and repositions at once without animation, leaving
    /// nothing to poll for
    pub fn jump_to(&mut self, page: T) -> Result<Option<PageIndexChanged<T>>, PagerError> {
        let index = self.pages.list().require_array_index(page)?;
        let changed = self.pages.change_index(page);
        self.sync.reset(self.pages.list().len(), index)?;
        Ok(changed)
    }

    pub fn set_sync_config(&mut self, config: SyncIndexConfig) {
        self.sync.set_config(config);
    }

    /// Collects a due reposition
    pub fn poll(&mut self, now: Instant) -> Result<Option<ScrollCommand>, PagerError> {
        Ok(self.sync.poll(now)?)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.sync.deadline()
    }

    /// Immediate scroll to the page containing `today`.  Returns `None` with
    /// a warning if that page is not in the list.
    pub fn scroll_to_today(
        &mut self,
        today: Day,
        locale: &Locale,
        animated: bool,
    ) -> Result<Option<ScrollCommand>, PagerError> {
        let page = T::containing(today, locale)?;
        let Some(index) = self.pages.list().array_index_of(page) else {
            tracing::warn!(%today, %page, "today is outside the page list");
            return Ok(None);
        };
        Ok(Some(self.sync.scroll_to(index, animated)?))
    }

    /// Immediate scroll `delta` pages away from the current one.  Returns
    /// `None` at either end of the list.
    pub fn step(
        &mut self,
        delta: isize,
        animated: bool,
    ) -> Result<Option<ScrollCommand>, PagerError> {
        let Some(index) = self.array_index().checked_add_signed(delta) else {
            return Ok(None);
        };
        if index >= self.sync.page_count() || index == self.array_index() {
            return Ok(None);
        }
        self.sync.cancel();
        Ok(Some(self.sync.scroll_to(index, animated)?))
    }

    /// Adopts a new page length and returns the silent jump that keeps the
    /// current page in view
    pub fn set_page_length(&mut self, page_length: f64) -> Result<ScrollCommand, PagerError> {
        Ok(self.sync.set_page_length(page_length)?)
    }

    /// Replaces the page list, keeping the current page if it is still
    /// listed and otherwise clamping to the nearest end
    pub fn set_list(&mut self, list: PageIndexList<T>) -> Result<ScrollCommand, PagerError> {
        let index = self
            .pages
            .current()
            .map_or(0, |page| list.nearest_array_index(page));
        let len = list.len();
        self.pages.set_list(list);
        let command = self.sync.reset(len, index)?;
        self.pages.change_array_index(index)?;
        Ok(command)
    }

    pub fn cancel(&mut self) {
        self.sync.cancel();
    }
}

#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum PagerError {
    #[error("pager created before its first page was chosen")]
    Uninitialized,
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}
