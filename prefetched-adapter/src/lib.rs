//! List adapter utilities for the `prefetched` crate.
//!
//! The `prefetched` crate provides the paging cache and the single-value prefetch primitive.
//! This crate provides small, framework-neutral helpers a list view typically needs on top:
//!
//! - Driving a [`prefetched::DataWindow`] from visible-range and "rows about to appear" events
//! - A row collection of [`prefetched::PrefetchedValue`]s sharing one lane
//!
//! This crate is intentionally framework-agnostic (no UI toolkit bindings).
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod rows;

#[cfg(test)]
mod tests;

pub use controller::RowPrefetcher;
pub use rows::PrefetchedRows;
