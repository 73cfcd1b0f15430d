use core::ops::Range;

/// A contiguous run of indices fetched together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRange {
    pub page: usize,
    pub start_index: usize,
    pub end_index: usize, // exclusive, clamped to the sequence length
}

impl PageRange {
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    pub fn indices(&self) -> Range<usize> {
        self.start_index..self.end_index
    }
}

/// Production state of a [`crate::PrefetchedValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Fresh,
    Producing,
    Ready,
    /// The producer panicked; the value will never become available.
    Poisoned,
}

/// Counters describing how a [`crate::DataWindow`] has been used.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowStats {
    pub hits: u64,
    pub misses: u64,
    pub fetches_scheduled: u64,
    pub fetches_completed: u64,
    pub elements_fetched: u64,
    /// Prefetch requests rejected because another fetch was in flight.
    pub requests_dropped: u64,
}
