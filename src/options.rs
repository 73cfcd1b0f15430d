use alloc::sync::Arc;
use core::fmt;
use core::ops::Range;

use crate::Identified;

/// Default page size.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Default number of pages a [`crate::DataWindow`] keeps around the reference page.
pub const DEFAULT_WINDOW_PAGES_TO_RETAIN: usize = 3;

/// Turns a batch of identities into elements.
///
/// Called on the window's lane with at most `window_size` identities. Elements may come back in
/// any order and may be fewer than requested; elements whose identity was not requested are
/// ignored.
pub type BatchFetcher<E> = Arc<dyn Fn(&[<E as Identified>::Id]) -> Vec<E> + Send + Sync>;

/// Fired once per completed fetch with the index range that was requested.
///
/// The range does not say which indices were actually returned; query the window per index.
pub type ElementsReadyCallback = Arc<dyn Fn(Range<usize>) + Send + Sync>;

/// Configuration for [`crate::DataWindow`].
///
/// Heavy fields are stored in `Arc`s, so cloning options to tweak a field is cheap.
pub struct DataWindowOptions<E: Identified> {
    /// The ordered identities that define the index space `[0, len)`.
    pub ids: Arc<[E::Id]>,
    pub fetcher: BatchFetcher<E>,
    /// Number of indices fetched together.
    pub window_size: usize,
    /// Pages kept on either side of the reference page before eviction.
    pub pages_to_retain: usize,
    pub on_elements_ready: Option<ElementsReadyCallback>,
    /// Thread name of the window's lane.
    pub lane_name: String,
}

impl<E: Identified> Clone for DataWindowOptions<E> {
    fn clone(&self) -> Self {
        Self {
            ids: Arc::clone(&self.ids),
            fetcher: Arc::clone(&self.fetcher),
            window_size: self.window_size,
            pages_to_retain: self.pages_to_retain,
            on_elements_ready: self.on_elements_ready.clone(),
            lane_name: self.lane_name.clone(),
        }
    }
}

impl<E: Identified> DataWindowOptions<E> {
    pub fn new(
        ids: impl Into<Arc<[E::Id]>>,
        fetcher: impl Fn(&[E::Id]) -> Vec<E> + Send + Sync + 'static,
    ) -> Self {
        Self {
            ids: ids.into(),
            fetcher: Arc::new(fetcher),
            window_size: DEFAULT_WINDOW_SIZE,
            pages_to_retain: DEFAULT_WINDOW_PAGES_TO_RETAIN,
            on_elements_ready: None,
            lane_name: "prefetched-window".into(),
        }
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_pages_to_retain(mut self, pages_to_retain: usize) -> Self {
        self.pages_to_retain = pages_to_retain;
        self
    }

    pub fn with_on_elements_ready(
        mut self,
        on_elements_ready: Option<impl Fn(Range<usize>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_elements_ready = on_elements_ready.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_lane_name(mut self, lane_name: impl Into<String>) -> Self {
        self.lane_name = lane_name.into();
        self
    }
}

impl<E: Identified> fmt::Debug for DataWindowOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataWindowOptions")
            .field("len", &self.ids.len())
            .field("window_size", &self.window_size)
            .field("pages_to_retain", &self.pages_to_retain)
            .field("on_elements_ready", &self.on_elements_ready.is_some())
            .field("lane_name", &self.lane_name)
            .finish()
    }
}
