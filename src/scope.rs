//! Where a memoized function's store lives, and for how long.
//!
//! * A free function keeps its entries in a [`StaticCache`] declared as a
//!   `static` next to the function: one store for the whole process.
//! * A method whose results depend on its receiver keeps an
//!   [`InstanceCache`] field, so every value has a store of its own that is
//!   dropped with it.
//! * An associated function keeps a [`StaticCache`] inside an accessor on
//!   its type, so the store is shared by the type rather than by any value.
//!
//! [`LocalCache`] is the shared handle behind [`memoize`](crate::memoize).
//!
//! ```
//! use memoize::InstanceCache;
//!
//! struct Fib {
//!     fibonacci_cache: InstanceCache<u64, u64>,
//! }
//!
//! impl Fib {
//!     fn fibonacci(&self, n: u64) -> u64 {
//!         self.fibonacci_cache.fetch(n, |&n| {
//!             if n <= 1 { n } else { self.fibonacci(n - 1) + self.fibonacci(n - 2) }
//!         })
//!     }
//! }
//!
//! let fib = Fib { fibonacci_cache: InstanceCache::new("fibonacci_cache", Some(150)) };
//! assert_eq!(fib.fibonacci(40), 102_334_155);
//! assert_eq!(fib.fibonacci_cache.count(), 41);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::eviction::{EvictionPolicy, RandomEviction};
use crate::invoke::{self, StoreAccess};
use crate::key::ArgumentKey;
use crate::store::{CacheStore, Capacity};
use crate::tracing;

/// The owner a cache is bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A free function; one store for the process.
    Global,
    /// A single value; one store per value.
    Instance,
    /// A type; one store shared by every value of the type.
    Type,
}

/// A store owned by a single value, typically a field of the struct whose
/// method is memoized.
///
/// No synchronization is performed and the type is not `Sync`. Lookups on
/// one instance never see entries computed by another.
pub struct InstanceCache<K, V, P = RandomEviction> {
    name: &'static str,
    store: RefCell<CacheStore<K, V, P>>,
}

impl<K, V> InstanceCache<K, V>
where
    K: ArgumentKey,
{
    pub fn new(name: &'static str, max_count: Option<usize>) -> Self {
        Self::with_policy(name, max_count, RandomEviction::default())
    }
}

impl<K, V, P> InstanceCache<K, V, P>
where
    K: ArgumentKey,
    P: EvictionPolicy,
{
    pub fn with_policy(name: &'static str, max_count: Option<usize>, policy: P) -> Self {
        Self {
            name,
            store: RefCell::new(CacheStore::with_policy(max_count, policy)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn scope(&self) -> Scope {
        Scope::Instance
    }

    pub fn count(&self) -> usize {
        self.store.borrow().count()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.borrow().contains(key)
    }

    pub fn capacity(&self) -> Capacity {
        self.store.borrow().capacity()
    }

    pub fn set_capacity(&self, max_count: Option<usize>) {
        self.store.borrow_mut().set_capacity(max_count)
    }

    /// Drops every memoized entry.
    pub fn remove_all(&self) {
        tracing::debug!(cache = self.name, "remove_all");
        self.store.borrow_mut().clear()
    }
}

impl<K, V, P> InstanceCache<K, V, P>
where
    K: ArgumentKey,
    V: Clone,
    P: EvictionPolicy,
{
    /// See [`crate::fetch`].
    pub fn fetch(&self, key: K, base: impl FnOnce(&K) -> V) -> V {
        invoke::fetch(self, key, base)
    }

    /// See [`crate::try_fetch`].
    pub fn try_fetch<E>(&self, key: K, base: impl FnOnce(&K) -> Result<V, E>) -> Result<V, E> {
        invoke::try_fetch(self, key, base)
    }
}

impl<K, V, P> StoreAccess for InstanceCache<K, V, P>
where
    K: ArgumentKey,
    V: Clone,
    P: EvictionPolicy,
{
    type Key = K;
    type Value = V;

    fn cache_name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, key: &K) -> Option<V> {
        self.store.borrow().lookup(key).cloned()
    }

    fn store(&self, key: K, value: V) {
        self.store.borrow_mut().insert(key, value)
    }
}

impl<K, V, P> fmt::Debug for InstanceCache<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InstanceCache");
        debug.field("name", &self.name);
        match self.store.try_borrow() {
            Ok(store) => debug.field("store", &*store),
            Err(_) => debug.field("store", &"<borrowed>"),
        };
        debug.finish()
    }
}

/// A reference-counted [`InstanceCache`], shared between a memoized callable
/// and the handle returned next to it.
///
/// Single-threaded like the cache it wraps.
pub struct LocalCache<K, V, P = RandomEviction> {
    inner: Rc<InstanceCache<K, V, P>>,
}

impl<K, V> LocalCache<K, V>
where
    K: ArgumentKey,
{
    pub fn new(name: &'static str, max_count: Option<usize>) -> Self {
        Self {
            inner: Rc::new(InstanceCache::new(name, max_count)),
        }
    }
}

impl<K, V, P> LocalCache<K, V, P>
where
    K: ArgumentKey,
    P: EvictionPolicy,
{
    pub fn with_policy(name: &'static str, max_count: Option<usize>, policy: P) -> Self {
        Self {
            inner: Rc::new(InstanceCache::with_policy(name, max_count, policy)),
        }
    }
}

impl<K, V, P> Clone for LocalCache<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V, P> Deref for LocalCache<K, V, P> {
    type Target = InstanceCache<K, V, P>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<K, V, P> fmt::Debug for LocalCache<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

/// A store that lives for the whole process, for free functions
/// ([`StaticCache::global`]) and for associated functions of a type
/// ([`StaticCache::for_type`]).
///
/// Rust statics must be `Sync`, so this is the one holder that locks: a
/// `parking_lot` mutex guards the store, taken only for the lookup and for
/// the insert and never while the base computation runs. Two threads
/// missing on the same key may both compute it; the second result is
/// discarded. The store itself is created on first use.
///
/// ```
/// use memoize::StaticCache;
///
/// static TARAI_CACHE: StaticCache<(i64, i64, i64), i64> =
///     StaticCache::global("tarai_cache", Some(1000));
///
/// fn tarai(x: i64, y: i64, z: i64) -> i64 {
///     TARAI_CACHE.fetch((x, y, z), |&(x, y, z)| {
///         if x <= y {
///             y
///         } else {
///             tarai(tarai(x - 1, y, z), tarai(y - 1, z, x), tarai(z - 1, x, y))
///         }
///     })
/// }
///
/// TARAI_CACHE.remove_all();
/// assert_eq!(tarai(20, 10, 0), 20);
/// assert!(TARAI_CACHE.count() <= 1000);
/// ```
pub struct StaticCache<K, V, P = RandomEviction> {
    name: &'static str,
    scope: Scope,
    max_count: Option<usize>,
    store: OnceLock<Mutex<CacheStore<K, V, P>>>,
}

impl<K, V, P> StaticCache<K, V, P> {
    /// The cache of a free function.
    pub const fn global(name: &'static str, max_count: Option<usize>) -> Self {
        Self::new(name, Scope::Global, max_count)
    }

    /// The cache of an associated function, shared by its type.
    pub const fn for_type(name: &'static str, max_count: Option<usize>) -> Self {
        Self::new(name, Scope::Type, max_count)
    }

    const fn new(name: &'static str, scope: Scope, max_count: Option<usize>) -> Self {
        Self {
            name,
            scope,
            max_count,
            store: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

impl<K, V, P> StaticCache<K, V, P>
where
    K: ArgumentKey,
    P: EvictionPolicy + Default,
{
    fn shared(&self) -> &Mutex<CacheStore<K, V, P>> {
        self.store.get_or_init(|| {
            tracing::debug!(cache = self.name, scope = ?self.scope, "initializing store");
            Mutex::new(CacheStore::with_policy(self.max_count, P::default()))
        })
    }

    /// Number of memoized entries. Does not create the store.
    pub fn count(&self) -> usize {
        self.store.get().map_or(0, |store| store.lock().count())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.get().is_some_and(|store| store.lock().contains(key))
    }

    pub fn capacity(&self) -> Capacity {
        match self.store.get() {
            Some(store) => store.lock().capacity(),
            None => Capacity::new(self.max_count),
        }
    }

    pub fn set_capacity(&self, max_count: Option<usize>) {
        self.shared().lock().set_capacity(max_count)
    }

    /// Drops every memoized entry.
    pub fn remove_all(&self) {
        tracing::debug!(cache = self.name, "remove_all");
        if let Some(store) = self.store.get() {
            store.lock().clear()
        }
    }
}

impl<K, V, P> StaticCache<K, V, P>
where
    K: ArgumentKey,
    V: Clone,
    P: EvictionPolicy + Default,
{
    /// See [`crate::fetch`].
    pub fn fetch(&self, key: K, base: impl FnOnce(&K) -> V) -> V {
        invoke::fetch(self, key, base)
    }

    /// See [`crate::try_fetch`].
    pub fn try_fetch<E>(&self, key: K, base: impl FnOnce(&K) -> Result<V, E>) -> Result<V, E> {
        invoke::try_fetch(self, key, base)
    }
}

impl<K, V, P> StoreAccess for StaticCache<K, V, P>
where
    K: ArgumentKey,
    V: Clone,
    P: EvictionPolicy + Default,
{
    type Key = K;
    type Value = V;

    fn cache_name(&self) -> &'static str {
        self.name
    }

    fn lookup(&self, key: &K) -> Option<V> {
        self.shared().lock().lookup(key).cloned()
    }

    fn store(&self, key: K, value: V) {
        let mut store = self.shared().lock();
        if store.contains(&key) {
            tracing::debug!(cache = self.name, "computed concurrently, keeping first result");
            return;
        }
        store.insert(key, value)
    }
}

impl<K, V, P> fmt::Debug for StaticCache<K, V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StaticCache");
        debug.field("name", &self.name).field("scope", &self.scope);
        match self.store.get() {
            Some(store) => debug.field("store", &*store.lock()),
            None => debug.field("store", &"<uninitialized>"),
        };
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_cache_is_lazy() {
        static SQUARE_CACHE: StaticCache<u32, u32> = StaticCache::global("square_cache", Some(2));

        assert_eq!(SQUARE_CACHE.scope(), Scope::Global);
        // Reading and clearing leave the store uncreated.
        assert_eq!(SQUARE_CACHE.count(), 0);
        assert!(!SQUARE_CACHE.contains(&3));
        assert_eq!(SQUARE_CACHE.capacity().max_count(), Some(2));
        SQUARE_CACHE.remove_all();
        assert_eq!(
            format!("{:?}", SQUARE_CACHE),
            r#"StaticCache { name: "square_cache", scope: Global, store: "<uninitialized>" }"#
        );
        assert_eq!(SQUARE_CACHE.fetch(3, |&n| n * n), 9);
        assert_eq!(SQUARE_CACHE.count(), 1);
        assert_eq!(SQUARE_CACHE.capacity().max_count(), Some(2));
    }

    #[test]
    fn static_cache_keeps_first_result() {
        static CUBE_CACHE: StaticCache<u32, u32> = StaticCache::global("cube_cache", Some(4));

        assert_eq!(CUBE_CACHE.fetch(2, |&n| n * n * n), 8);
        // A second thread finishing the same miss stores after the first.
        StoreAccess::store(&CUBE_CACHE, 2, 0);
        assert_eq!(CUBE_CACHE.count(), 1);
        assert_eq!(CUBE_CACHE.fetch(2, |_| unreachable!()), 8);
    }

    #[test]
    fn instance_cache_debug() {
        let cache: InstanceCache<u32, u32> = InstanceCache::new("double_cache", None);
        cache.fetch(1, |&n| n * 2);
        assert_eq!(
            format!("{cache:?}"),
            r#"InstanceCache { name: "double_cache", store: CacheStore { count: 1, capacity: Unbounded, .. } }"#
        );
    }

    #[test]
    fn local_cache_clones_share_one_store() {
        let cache: LocalCache<u32, u32> = LocalCache::new("shared_cache", None);
        let handle = cache.clone();
        cache.fetch(1, |&n| n);
        assert_eq!(handle.count(), 1);
        handle.remove_all();
        assert_eq!(cache.count(), 0);
    }

    #[test]
    fn set_capacity_through_holder() {
        let cache: InstanceCache<u32, u32> = InstanceCache::new("identity_cache", None);
        for i in 0..10 {
            cache.fetch(i, |&n| n);
        }
        cache.set_capacity(Some(3));
        assert_eq!(cache.count(), 3);
        assert_eq!(cache.capacity(), Capacity::new(Some(3)));
    }
}
