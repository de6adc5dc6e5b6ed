//! Paging engine for swipeable week and month calendars.
//!
//! A calendar is a horizontally scrolled list of pages, each a week or a
//! month.  [`pager::Pager`] maps the scroll offset reported by the
//! presentation layer onto the list built by [`page::PageIndexList`], and
//! repositions the view when the page changes for other reasons, such as a
//! new selection.  [`hybrid::HybridCalendar`] keeps a week pager and a month
//! pager on the same dates.  Page heights come from [`layout`], measured
//! pages are tracked in [`registry`], and [`clock`] supplies today's date.
pub mod clock;
pub mod day;
pub mod hybrid;
pub mod layout;
pub mod locale;
pub mod page;
pub mod pager;
pub mod pages;
pub mod registry;
pub mod selection;
pub mod sync;
pub mod theme;
