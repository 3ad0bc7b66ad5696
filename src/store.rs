use std::fmt;
use std::num::NonZeroUsize;

use crate::eviction::{EvictionPolicy, RandomEviction};
use crate::hash::FxIndexMap;
use crate::key::ArgumentKey;
use crate::tracing;

/// How many entries a [`CacheStore`] may hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// No bound; the store grows with every distinct key.
    Unbounded,

    /// A bound of zero: nothing is ever stored and every call recomputes.
    Disabled,

    /// At most this many entries.
    Bounded(NonZeroUsize),
}

impl Capacity {
    /// Interprets a `max_count` option: `None` is unbounded, `Some(0)`
    /// disables caching.
    pub const fn new(max_count: Option<usize>) -> Self {
        match max_count {
            None => Capacity::Unbounded,
            Some(count) => match NonZeroUsize::new(count) {
                Some(count) => Capacity::Bounded(count),
                None => Capacity::Disabled,
            },
        }
    }

    /// The inverse of [`Capacity::new`].
    pub const fn max_count(self) -> Option<usize> {
        match self {
            Capacity::Unbounded => None,
            Capacity::Disabled => Some(0),
            Capacity::Bounded(count) => Some(count.get()),
        }
    }
}

impl From<Option<usize>> for Capacity {
    fn from(max_count: Option<usize>) -> Self {
        Capacity::new(max_count)
    }
}

/// A count-bounded map from call arguments to computed results.
///
/// When a bounded store is full, inserting a new key first removes one
/// entry picked by the eviction policy `P`, so the store never holds more
/// than its capacity.
///
/// The store performs no synchronization. It is owned by exactly one
/// cache holder (see [`crate::scope`]), which decides how it is shared.
pub struct CacheStore<K, V, P = RandomEviction> {
    entries: FxIndexMap<K, V>,
    capacity: Capacity,
    policy: P,
}

impl<K, V> CacheStore<K, V>
where
    K: ArgumentKey,
{
    /// Creates a store evicting uniformly at random once it holds
    /// `max_count` entries.
    pub fn new(max_count: Option<usize>) -> Self {
        Self::with_policy(max_count, RandomEviction::default())
    }
}

impl<K, V, P> CacheStore<K, V, P>
where
    K: ArgumentKey,
    P: EvictionPolicy,
{
    pub fn with_policy(max_count: Option<usize>, policy: P) -> Self {
        Self {
            entries: FxIndexMap::default(),
            capacity: Capacity::new(max_count),
            policy,
        }
    }

    /// Returns the memoized value for `key`, if any. Has no side effects.
    #[inline]
    pub fn lookup(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Stores `value` under `key`, evicting one entry first if the store is full.
    ///
    /// `key` must not already be present. Callers always [`lookup`](Self::lookup)
    /// before computing, so a second insert for the same key is a logic error;
    /// debug builds assert on it, release builds overwrite the old value
    /// without evicting anything.
    pub fn insert(&mut self, key: K, value: V) {
        let bound = match self.capacity {
            Capacity::Disabled => return,
            Capacity::Unbounded => None,
            Capacity::Bounded(bound) => Some(bound.get()),
        };

        debug_assert!(!self.entries.contains_key(&key), "memoized key inserted twice");
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            return;
        }

        if bound.is_some_and(|bound| self.entries.len() >= bound) {
            self.evict_one();
        }

        self.entries.insert(key, value);
    }

    /// Number of memoized entries.
    #[inline]
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Removes every entry. The capacity is unchanged.
    pub fn clear(&mut self) {
        tracing::debug!(evicted = self.entries.len(), "clearing memoized entries");
        self.entries.clear();
    }

    /// Changes the bound, evicting entries until the new bound holds.
    ///
    /// A bound of `Some(0)` drops every entry and disables caching.
    pub fn set_capacity(&mut self, max_count: Option<usize>) {
        self.capacity = Capacity::new(max_count);
        tracing::debug!(capacity = ?self.capacity, "memo capacity changed");

        match self.capacity {
            Capacity::Unbounded => {}
            Capacity::Disabled => self.entries.clear(),
            Capacity::Bounded(bound) => {
                while self.entries.len() > bound.get() {
                    self.evict_one();
                }
            }
        }
    }

    fn evict_one(&mut self) {
        let len = self.entries.len();
        let victim = self.policy.select_victim(len);
        // Panics before anything is inserted, so the bound holds even under a
        // broken policy.
        assert!(victim < len, "eviction policy chose position {victim} of {len}");
        self.entries.swap_remove_index(victim);
        tracing::debug!(victim, len, "evicted memoized entry");
    }
}

impl<K, V, P> fmt::Debug for CacheStore<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("count", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
