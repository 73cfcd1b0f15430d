use std::collections::{BTreeMap, HashMap, HashSet};

use core::fmt;

use crate::{AtomicCell, Identity};

/// Default number of pages kept on either side of the reference page.
pub const DEFAULT_PAGES_TO_RETAIN: usize = 5;

/// An identity-keyed cache whose entries are tagged with the page they were fetched for.
///
/// Eviction is driven by distance from the *reference page* (the page of the most recent write
/// that moved it). The reference page only moves when a write lands more than
/// `pages_to_retain` pages away from it; when it moves, every entry farther than
/// `pages_to_retain` from the new reference page is evicted. Small back-and-forth movement within
/// the retained window therefore never triggers a sweep.
///
/// Entries are indexed by page, so a sweep only visits the pages it evicts.
pub struct WindowedCache<Id, E> {
    state: AtomicCell<CacheState<Id, E>>,
    pages_to_retain: usize,
}

struct CacheEntry<E> {
    element: E,
    page: usize,
}

struct CacheState<Id, E> {
    entries: HashMap<Id, CacheEntry<E>>,
    pages: BTreeMap<usize, HashSet<Id>>,
    last_reference_page: usize,
}

impl<Id: Identity, E> CacheState<Id, E> {
    fn unlink(&mut self, id: &Id, page: usize) {
        if let Some(ids) = self.pages.get_mut(&page) {
            ids.remove(id);
            if ids.is_empty() {
                self.pages.remove(&page);
            }
        }
    }

    /// Removes every entry whose page is more than `retain` pages away from `page`.
    fn evict_far_from(&mut self, page: usize, retain: usize) -> usize {
        let mut far = self
            .pages
            .split_off(&page.saturating_add(retain).saturating_add(1));
        if let Some(low) = page.checked_sub(retain) {
            let kept = self.pages.split_off(&low);
            far.append(&mut self.pages);
            self.pages = kept;
        }

        let mut evicted = 0usize;
        for ids in far.into_values() {
            for id in ids {
                if self.entries.remove(&id).is_some() {
                    evicted += 1;
                }
            }
        }
        evicted
    }
}

impl<Id: Identity, E> WindowedCache<Id, E> {
    pub fn new(pages_to_retain: usize) -> Self {
        Self {
            state: AtomicCell::new(CacheState {
                entries: HashMap::new(),
                pages: BTreeMap::new(),
                last_reference_page: 0,
            }),
            pages_to_retain,
        }
    }

    pub fn pages_to_retain(&self) -> usize {
        self.pages_to_retain
    }

    pub fn last_reference_page(&self) -> usize {
        self.state.with(|s| s.last_reference_page)
    }

    pub fn len(&self) -> usize {
        self.state.with(|s| s.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.state.with(|s| s.entries.contains_key(id))
    }

    /// Returns the page the entry for `id` was written with.
    pub fn page_of(&self, id: &Id) -> Option<usize> {
        self.state.with(|s| s.entries.get(id).map(|e| e.page))
    }

    pub fn get(&self, id: &Id) -> Option<E>
    where
        E: Clone,
    {
        self.state
            .with(|s| s.entries.get(id).map(|e| e.element.clone()))
    }

    /// Inserts or overwrites the entry for `id` and moves the reference page if `page` lies
    /// outside the retained window.
    ///
    /// Returns the number of entries evicted by this write.
    pub fn put(&self, id: Id, element: E, page: usize) -> usize {
        let retain = self.pages_to_retain;
        let (evicted, from, swept) = self.state.update(|s| {
            if let Some(prev) = s.entries.insert(id.clone(), CacheEntry { element, page }) {
                if prev.page != page {
                    s.unlink(&id, prev.page);
                }
            }
            s.pages.entry(page).or_default().insert(id);

            let from = s.last_reference_page;
            if page.abs_diff(from) <= retain {
                return (0, from, false);
            }
            let evicted = s.evict_far_from(page, retain);
            s.last_reference_page = page;
            (evicted, from, true)
        });
        if swept {
            pdebug!(from, to = page, evicted, "WindowedCache: reference page moved");
        }
        evicted
    }

    pub fn remove(&self, id: &Id) -> Option<E> {
        self.state.update(|s| {
            let entry = s.entries.remove(id)?;
            s.unlink(id, entry.page);
            Some(entry.element)
        })
    }

    /// Drops every entry. The reference page is left where it is.
    pub fn clear(&self) {
        self.state.update(|s| {
            s.entries.clear();
            s.pages.clear();
        });
    }
}

impl<Id: Identity, E> Default for WindowedCache<Id, E> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGES_TO_RETAIN)
    }
}

impl<Id: Identity, E> fmt::Debug for WindowedCache<Id, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (len, pages, last_reference_page) = self
            .state
            .with(|s| (s.entries.len(), s.pages.len(), s.last_reference_page));
        f.debug_struct("WindowedCache")
            .field("len", &len)
            .field("pages", &pages)
            .field("last_reference_page", &last_reference_page)
            .field("pages_to_retain", &self.pages_to_retain)
            .finish()
    }
}
