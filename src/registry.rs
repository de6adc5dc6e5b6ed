use crate::day::Day;
use crate::page::PageType;
use std::fmt;
use thiserror::Error;

/// Identity of a mounted page: its granularity and its position in the page
/// list.  Fixed for the lifetime of the mount.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PageKey {
    pub page_type: PageType,
    pub array_index: usize,
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.page_type, self.array_index)
    }
}

/// Observed state of a mounted page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageData {
    pub array_index: usize,
    pub page_type: PageType,
    pub start: Day,
    pub end: Day,
    pub page_height: f64,
    pub row_count: u8,
}

impl PageData {
    pub fn key(&self) -> PageKey {
        PageKey {
            page_type: self.page_type,
            array_index: self.array_index,
        }
    }
}

/// The pages currently mounted by a renderer, in mount order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedPageRegistry {
    pages: Vec<PageData>,
}

impl RenderedPageRegistry {
    pub fn new() -> RenderedPageRegistry {
        RenderedPageRegistry::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn position(&self, key: PageKey) -> Option<usize> {
        self.pages.iter().position(|p| p.key() == key)
    }

    pub fn get(&self, key: PageKey) -> Option<&PageData> {
        self.pages.iter().find(|p| p.key() == key)
    }

    pub fn contains(&self, key: PageKey) -> bool {
        self.position(key).is_some()
    }

    /// Records a newly mounted page.  A key that is already registered is an
    /// error and leaves the registry untouched.
    pub fn register(&mut self, page: PageData) -> Result<(), RegistryError> {
        let key = page.key();
        if self.contains(key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        tracing::trace!(%key, height = page.page_height, "page mounted");
        self.pages.push(page);
        Ok(())
    }

    /// Replaces the data of a mounted page, e.g. after it was re-measured
    pub fn update(&mut self, page: PageData) -> Result<(), RegistryError> {
        let key = page.key();
        let slot = self
            .position(key)
            .and_then(|i| self.pages.get_mut(i))
            .ok_or(RegistryError::NotFound(key))?;
        *slot = page;
        Ok(())
    }

    /// Registers `page`, or updates it if its key is already present.
    /// Returns `true` if anything changed.
    pub fn upsert(&mut self, page: PageData) -> bool {
        match self.position(page.key()).and_then(|i| self.pages.get_mut(i)) {
            Some(slot) if *slot == page => false,
            Some(slot) => {
                *slot = page;
                true
            }
            None => {
                self.pages.push(page);
                true
            }
        }
    }

    /// Forgets an unmounted page and returns its last data
    pub fn unregister(&mut self, key: PageKey) -> Result<PageData, RegistryError> {
        let i = self.position(key).ok_or(RegistryError::NotFound(key))?;
        tracing::trace!(%key, "page unmounted");
        Ok(self.pages.remove(i))
    }

    /// Unregisters every page of `page_type` whose key `keep` rejects,
    /// returning the removed pages
    pub fn retain<F: FnMut(PageKey) -> bool>(
        &mut self,
        page_type: PageType,
        mut keep: F,
    ) -> Vec<PageData> {
        let mut removed = Vec::new();
        self.pages.retain(|p| {
            if p.page_type != page_type || keep(p.key()) {
                true
            } else {
                removed.push(*p);
                false
            }
        });
        removed
    }

    /// Snapshot of the registered pages in mount order, optionally only those
    /// of one type
    pub fn query(&self, page_type: Option<PageType>) -> Vec<PageData> {
        self.pages
            .iter()
            .filter(|p| page_type.is_none_or(|t| p.page_type == t))
            .copied()
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum RegistryError {
    #[error("page {0} is already registered")]
    DuplicateKey(PageKey),
    #[error("page {0} not found")]
    NotFound(PageKey),
}
