use core::hash::Hash;

/// Bound for values that identify an element independently of its position.
#[doc(hidden)]
pub trait Identity: Hash + Eq + Clone + Send + Sync + 'static {}
impl<T: Hash + Eq + Clone + Send + Sync + 'static> Identity for T {}

/// An element that carries its own identity.
///
/// The batch fetcher of a [`crate::DataWindow`] may return elements in any order; the window
/// uses `id()` to match each element back to the index it was requested for.
pub trait Identified {
    type Id: Identity;

    fn id(&self) -> Self::Id;
}
