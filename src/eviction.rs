//! Pluggable victim selection for bounded caches.
//!
//! This module provides the [`EvictionPolicy`] trait that a [`CacheStore`]
//! consults when it is full and must make room for a new entry.
//!
//! [`CacheStore`]: crate::CacheStore

mod random;

pub use random::RandomEviction;

/// Trait for cache eviction strategies.
///
/// The policy sees only the number of entries, never their keys or any
/// access history, so a store keeps no bookkeeping beyond its entry table.
pub trait EvictionPolicy {
    /// Select the entry to remove from a full store holding `len` entries.
    ///
    /// `len` is never zero. The returned position must be in `0..len`; it
    /// indexes the store's dense entry table. The store panics on any other
    /// position rather than grow past its bound.
    fn select_victim(&mut self, len: usize) -> usize;
}
