use alloc::sync::Arc;
use core::fmt;
use std::collections::HashMap;

use crate::{
    AtomicCell, BatchFetcher, DataWindowOptions, ElementsReadyCallback, Error, Identified,
    PageRange, SerialLane, WindowStats, WindowedCache,
};

/// An index-addressed view over a large collection whose elements are fetched lazily, one page
/// at a time.
///
/// Reads translate an index to its identity and look the identity up in a [`WindowedCache`].
/// A miss schedules a fetch of the whole page containing the index on the window's
/// [`SerialLane`]. At most one fetch is in flight per window: a prefetch requested while another
/// one is running is dropped, not queued, and must be requested again once the first completes.
///
/// When a fetch completes, every returned element is written to the cache and the
/// `on_elements_ready` callback (if any) is fired with the requested index range, before the
/// window accepts another fetch. Missing elements are not retried until requested again. If
/// the fetcher panics, nothing is written, the callback does not fire, and the window accepts
/// new fetches.
pub struct DataWindow<E: Identified> {
    inner: Arc<WindowInner<E>>,
}

struct WindowInner<E: Identified> {
    ids: Arc<[E::Id]>,
    window_size: usize,
    cache: WindowedCache<E::Id, E>,
    fetcher: BatchFetcher<E>,
    on_elements_ready: Option<ElementsReadyCallback>,
    is_prefetching: AtomicCell<bool>,
    current_prefetch_page: AtomicCell<usize>,
    stats: AtomicCell<WindowStats>,
    lane: SerialLane,
}

/// Clears the in-flight flag when a fetch finishes, including by panic.
struct InFlight<'a>(&'a AtomicCell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<E> DataWindow<E>
where
    E: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(options: DataWindowOptions<E>) -> Result<Self, Error> {
        if options.window_size == 0 {
            return Err(Error::InvalidWindowSize);
        }
        let lane = SerialLane::new(options.lane_name.clone())?;
        pdebug!(
            len = options.ids.len(),
            window_size = options.window_size,
            pages_to_retain = options.pages_to_retain,
            "DataWindow::new"
        );

        Ok(Self {
            inner: Arc::new(WindowInner {
                ids: options.ids,
                window_size: options.window_size,
                cache: WindowedCache::new(options.pages_to_retain),
                fetcher: options.fetcher,
                on_elements_ready: options.on_elements_ready,
                is_prefetching: AtomicCell::new(false),
                current_prefetch_page: AtomicCell::new(0),
                stats: AtomicCell::default(),
                lane,
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.ids.is_empty()
    }

    pub fn ids(&self) -> &[E::Id] {
        &self.inner.ids
    }

    pub fn id_at(&self, index: usize) -> Result<&E::Id, Error> {
        self.inner.id_at(index)
    }

    pub fn window_size(&self) -> usize {
        self.inner.window_size
    }

    pub fn page_for(&self, index: usize) -> usize {
        self.inner.page_for(index)
    }

    /// The indices covered by `page`, clamped to the sequence length.
    pub fn page_range(&self, page: usize) -> PageRange {
        self.inner.page_range(page)
    }

    pub fn cache(&self) -> &WindowedCache<E::Id, E> {
        &self.inner.cache
    }

    pub fn lane(&self) -> &SerialLane {
        &self.inner.lane
    }

    pub fn is_prefetching(&self) -> bool {
        self.inner.is_prefetching.get()
    }

    /// The page of the most recently scheduled fetch.
    pub fn current_prefetch_page(&self) -> usize {
        self.inner.current_prefetch_page.get()
    }

    pub fn stats(&self) -> WindowStats {
        self.inner.stats.get()
    }

    /// Returns the element at `index` if it is cached.
    ///
    /// On a miss this schedules a prefetch of the page containing `index` and returns
    /// `Ok(None)`; poll again later or wait for `on_elements_ready`.
    pub fn get(&self, index: usize) -> Result<Option<E>, Error> {
        let id = self.inner.id_at(index)?;
        if let Some(element) = self.inner.lookup(id) {
            return Ok(Some(element));
        }
        self.prefetch(index)?;
        Ok(None)
    }

    /// Like [`DataWindow::get`], but on a miss waits for the in-flight fetch to finish and then
    /// reads the cache again.
    ///
    /// The fetch waited on is whichever one is running. If that fetch is for a different page
    /// (because this request was dropped by the single-flight gate), the result may still be
    /// `None`.
    ///
    /// # Panics
    ///
    /// Panics when called from the window's own lane (e.g. from `on_elements_ready`) on a miss.
    pub fn get_blocking(&self, index: usize) -> Result<Option<E>, Error> {
        let id = self.inner.id_at(index)?;
        if let Some(element) = self.inner.lookup(id) {
            return Ok(Some(element));
        }
        self.prefetch(index)?;
        self.wait_for_fetch();
        Ok(self.inner.cache.get(id))
    }

    /// Writes `element` at `index`, tagged with the index's page.
    pub fn set(&self, index: usize, element: E) -> Result<(), Error> {
        let id = self.inner.id_at(index)?;
        self.inner
            .cache
            .put(id.clone(), element, self.inner.page_for(index));
        Ok(())
    }

    /// Drops the cached element at `index`, if any.
    pub fn remove(&self, index: usize) -> Result<Option<E>, Error> {
        let id = self.inner.id_at(index)?;
        Ok(self.inner.cache.remove(id))
    }

    /// Schedules a fetch of the page containing `index`.
    ///
    /// Does nothing when the element is already cached or another fetch is in flight. Returns
    /// whether a fetch was scheduled.
    pub fn prefetch(&self, index: usize) -> Result<bool, Error> {
        let id = self.inner.id_at(index)?;
        if self.inner.cache.contains(id) {
            return Ok(false);
        }
        if self.inner.is_prefetching.replace(true) {
            ptrace!(index, "DataWindow::prefetch dropped; fetch in flight");
            self.inner.stats.update(|s| s.requests_dropped += 1);
            return Ok(false);
        }

        let range = self.inner.page_range(self.inner.page_for(index));
        self.inner.current_prefetch_page.set(range.page);
        self.inner.stats.update(|s| s.fetches_scheduled += 1);
        ptrace!(
            index,
            page = range.page,
            start = range.start_index,
            end = range.end_index,
            "DataWindow::prefetch scheduled"
        );

        let inner = Arc::downgrade(&self.inner);
        self.inner.lane.spawn(move || {
            // The window was dropped before the fetch started.
            let Some(inner) = inner.upgrade() else {
                return;
            };
            inner.fetch_page(range);
        });
        Ok(true)
    }

    /// Blocks until the in-flight fetch, if any, has finished.
    pub fn wait_for_fetch(&self) {
        assert!(
            !self.inner.lane.is_current(),
            "DataWindow: blocking wait from the window's own lane"
        );
        ptrace!("DataWindow::wait_for_fetch");
        self.inner.is_prefetching.wait_until(|in_flight| !*in_flight);
    }

    /// Blocks until every job submitted to the window's lane has finished.
    pub fn wait_idle(&self) {
        self.inner.lane.wait_idle();
    }
}

impl<E> WindowInner<E>
where
    E: Identified + Clone + Send + Sync + 'static,
{
    fn id_at(&self, index: usize) -> Result<&E::Id, Error> {
        self.ids.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.ids.len(),
        })
    }

    fn page_for(&self, index: usize) -> usize {
        index / self.window_size
    }

    fn page_range(&self, page: usize) -> PageRange {
        let len = self.ids.len();
        let start_index = page.saturating_mul(self.window_size).min(len);
        let end_index = start_index.saturating_add(self.window_size).min(len);
        PageRange {
            page,
            start_index,
            end_index,
        }
    }

    fn lookup(&self, id: &E::Id) -> Option<E> {
        let element = self.cache.get(id);
        self.stats.update(|s| {
            if element.is_some() {
                s.hits += 1;
            } else {
                s.misses += 1;
            }
        });
        element
    }

    /// Runs on the lane.
    fn fetch_page(&self, range: PageRange) {
        let _in_flight = InFlight(&self.is_prefetching);

        let ids = &self.ids[range.indices()];
        let mut requested: HashMap<&E::Id, usize> = ids
            .iter()
            .enumerate()
            .map(|(offset, id)| (id, range.start_index + offset))
            .collect();

        let elements = (self.fetcher)(ids);
        let returned = elements.len();
        let mut written = 0usize;
        for element in elements {
            let id = element.id();
            let Some(index) = requested.remove(&id) else {
                pwarn!(
                    page = range.page,
                    "DataWindow: fetcher returned an element that was not requested"
                );
                continue;
            };
            self.cache.put(id, element, self.page_for(index));
            written += 1;
        }

        if written < range.len() {
            pwarn!(
                page = range.page,
                requested = range.len(),
                written,
                "DataWindow: partial fetch result"
            );
        }
        pdebug!(
            page = range.page,
            requested = range.len(),
            returned,
            written,
            "DataWindow: fetch completed"
        );
        self.stats.update(|s| {
            s.fetches_completed += 1;
            s.elements_fetched += written as u64;
        });

        if let Some(on_elements_ready) = &self.on_elements_ready {
            on_elements_ready(range.indices());
        }
    }
}

impl<E: Identified> fmt::Debug for DataWindow<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataWindow")
            .field("len", &self.inner.ids.len())
            .field("window_size", &self.inner.window_size)
            .field("cache", &self.inner.cache)
            .field("is_prefetching", &self.inner.is_prefetching.get())
            .field("lane", &self.inner.lane)
            .finish()
    }
}
