use core::ops::Range;

use prefetched::{DataWindow, DataWindowOptions, Error, Identified};

/// A framework-neutral controller that wraps a `prefetched::DataWindow` and translates list
/// events into page fetches.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_visible_range` whenever the set of visible rows changes
/// - `prefetch_rows` when the list reports rows that are about to scroll into view
/// - `row` / `row_blocking` when a row is rendered
///
/// The window fetches one page at a time, so at most one of the pages requested by a single
/// call is scheduled; the others are requested again by the next event.
#[derive(Debug)]
pub struct RowPrefetcher<E: Identified> {
    w: DataWindow<E>,
}

impl<E> RowPrefetcher<E>
where
    E: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(options: DataWindowOptions<E>) -> Result<Self, Error> {
        Ok(Self {
            w: DataWindow::new(options)?,
        })
    }

    pub fn from_window(w: DataWindow<E>) -> Self {
        Self { w }
    }

    pub fn window(&self) -> &DataWindow<E> {
        &self.w
    }

    pub fn into_window(self) -> DataWindow<E> {
        self.w
    }

    /// Call this when the visible rows change.
    ///
    /// Requests, in order, the page of the first visible row, the page of the last visible row,
    /// and the page after it. Stops at the first request that schedules a fetch.
    ///
    /// Returns the page that was scheduled, if any.
    pub fn on_visible_range(&self, visible: Range<usize>) -> Result<Option<usize>, Error> {
        let end = visible.end.min(self.w.len());
        if visible.start >= end {
            return Ok(None);
        }
        let last = end - 1;
        let next_page_start = self.w.page_range(self.w.page_for(last) + 1).start_index;

        let mut candidates = vec![visible.start, last];
        if next_page_start < self.w.len() {
            candidates.push(next_page_start);
        }
        for index in candidates {
            if self.w.is_prefetching() {
                break;
            }
            if self.w.prefetch(index)? {
                let page = self.w.page_for(index);
                atrace!(start = visible.start, end, page, "on_visible_range scheduled");
                return Ok(Some(page));
            }
        }
        Ok(None)
    }

    /// Call this with the rows the list expects to show soon.
    ///
    /// Issues one prefetch per distinct page, in the order the pages first appear. Returns the
    /// number of fetches scheduled (at most one while the window is single-flight).
    pub fn prefetch_rows(&self, rows: impl IntoIterator<Item = usize>) -> Result<usize, Error> {
        let mut seen_pages = Vec::new();
        let mut scheduled = 0usize;
        for index in rows {
            self.w.id_at(index)?;
            let page = self.w.page_for(index);
            if seen_pages.contains(&page) {
                continue;
            }
            seen_pages.push(page);
            if self.w.prefetch(index)? {
                scheduled += 1;
            }
        }
        adebug!(pages = seen_pages.len(), scheduled, "prefetch_rows");
        Ok(scheduled)
    }

    /// Non-blocking row read; a miss schedules the row's page.
    pub fn row(&self, index: usize) -> Result<Option<E>, Error> {
        self.w.get(index)
    }

    /// Blocking row read; see [`DataWindow::get_blocking`].
    pub fn row_blocking(&self, index: usize) -> Result<Option<E>, Error> {
        self.w.get_blocking(index)
    }

    /// Returns the rows in `range` that are currently cached, without scheduling any fetch.
    ///
    /// Useful from an `on_elements_ready` handler to learn which of the reported indices were
    /// actually returned by the backing store.
    pub fn ready_rows(&self, range: Range<usize>) -> Vec<(usize, E)> {
        let end = range.end.min(self.w.len());
        (range.start..end)
            .filter_map(|index| {
                let id = self.w.ids().get(index)?;
                self.w.cache().get(id).map(|e| (index, e))
            })
            .collect()
    }
}
