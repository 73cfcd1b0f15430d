//! A windowed prefetching cache for large, index-addressed collections.
//!
//! For list-adapter utilities (row prefetching, per-row values), see the `prefetched-adapter`
//! crate.
//!
//! A [`DataWindow`] lets a consumer address a very large, ordered collection of identity-bearing
//! elements (e.g. rows backing a scrollable list) as if it were fully in memory, while fetching
//! elements lazily, one page at a time, from an expensive backing source:
//! - a miss schedules a fetch of the page around the requested index on a private lane
//! - at most one fetch is in flight per window (single-flight)
//! - fetched elements are kept in a [`WindowedCache`] that evicts pages far from the current
//!   access locus
//!
//! [`PrefetchedValue`] applies the same fetch-once/block-until-ready pattern to a single value.
//!
//! It is UI-agnostic. A list layer is expected to provide:
//! - the ordered identities of the collection
//! - a batch fetch function `(ids) -> elements`
//! - (optionally) a callback to learn when fetched indices become available
#![forbid(unsafe_code)]

extern crate alloc;

#[macro_use]
mod macros;

mod cache;
mod cell;
mod error;
mod key;
mod lane;
mod options;
mod prefetched;
mod types;
mod window;


pub use cache::{DEFAULT_PAGES_TO_RETAIN, WindowedCache};
pub use cell::AtomicCell;
pub use error::Error;
pub use key::Identified;
pub use lane::SerialLane;
pub use options::{
    BatchFetcher, DEFAULT_WINDOW_PAGES_TO_RETAIN, DEFAULT_WINDOW_SIZE, DataWindowOptions,
    ElementsReadyCallback,
};
pub use prefetched::PrefetchedValue;
pub use types::{PageRange, Status, WindowStats};
pub use window::DataWindow;

#[doc(hidden)]
pub use key::Identity;
