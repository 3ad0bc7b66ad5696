use std::fmt;

use crate::eviction::{EvictionPolicy, RandomEviction};
use crate::key::ArgumentKey;
use crate::scope::LocalCache;
use crate::tracing;

/// Read and write access to the store a memoized function is bound to.
///
/// Implemented by the cache holders in [`crate::scope`]. Neither method may
/// keep the store borrowed or locked after it returns: the computation
/// running between a missed `lookup` and its `store` re-enters the cache
/// for its own recursive calls.
pub trait StoreAccess {
    type Key: ArgumentKey;
    type Value: Clone;

    /// Name used for tracing, conventionally `<function>_cache`.
    fn cache_name(&self) -> &'static str;

    fn lookup(&self, key: &Self::Key) -> Option<Self::Value>;

    fn store(&self, key: Self::Key, value: Self::Value);
}

/// Returns the memoized value for `key`, computing it with `base` on a miss.
///
/// On a hit `base` is not called. On a miss the result of `base` is stored
/// (evicting if the store is full) and returned. Any call `base` makes back
/// into the same cache follows this same protocol, so recursive definitions
/// populate the store bottom-up as the recursion unwinds.
///
/// If `base` panics, the panic propagates and nothing is stored for `key`.
pub fn fetch<S>(cache: &S, key: S::Key, base: impl FnOnce(&S::Key) -> S::Value) -> S::Value
where
    S: StoreAccess + ?Sized,
{
    if let Some(value) = cache.lookup(&key) {
        tracing::hit!(cache.cache_name());
        return value;
    }

    let value = execute(cache, &key, base);
    cache.store(key, value.clone());
    value
}

/// Like [`fetch`], for computations that can fail.
///
/// An `Err` from `base` is returned unchanged and is not memoized, so the
/// next call with the same key runs `base` again.
pub fn try_fetch<S, E>(
    cache: &S,
    key: S::Key,
    base: impl FnOnce(&S::Key) -> Result<S::Value, E>,
) -> Result<S::Value, E>
where
    S: StoreAccess + ?Sized,
{
    if let Some(value) = cache.lookup(&key) {
        tracing::hit!(cache.cache_name());
        return Ok(value);
    }

    let result = execute(cache, &key, base);
    match result {
        Ok(value) => {
            cache.store(key, value.clone());
            Ok(value)
        }
        Err(error) => {
            tracing::debug!(cache = cache.cache_name(), "computation failed, not memoized");
            Err(error)
        }
    }
}

#[inline(never)]
fn execute<S, R>(cache: &S, key: &S::Key, base: impl FnOnce(&S::Key) -> R) -> R
where
    S: StoreAccess + ?Sized,
{
    let _span = tracing::execute_span!(cache.cache_name());
    tracing::debug!("miss, executing");
    base(key)
}

/// A memoized function: a base computation bound to its own cache.
///
/// The base receives the memoized function itself as its first argument,
/// so recursive calls go back through the cache instead of straight to the
/// base:
///
/// ```
/// use memoize::Memoized;
///
/// let fib = Memoized::new(None, |fib, &n: &u64| {
///     if n <= 1 { n } else { fib(n - 1) + fib(n - 2) }
/// });
/// assert_eq!(fib.call(40), 102_334_155);
/// assert_eq!(fib.count(), 41);
/// ```
///
/// Like [`LocalCache`], this type is single-threaded.
pub struct Memoized<K, V, F, P = RandomEviction> {
    cache: LocalCache<K, V, P>,
    base: F,
}

impl<K, V, F> Memoized<K, V, F>
where
    K: ArgumentKey,
    V: Clone,
    F: Fn(&dyn Fn(K) -> V, &K) -> V,
{
    pub fn new(max_count: Option<usize>, base: F) -> Self {
        Self::named("memoized_cache", max_count, base)
    }

    pub fn named(name: &'static str, max_count: Option<usize>, base: F) -> Self {
        Self::with_cache(LocalCache::new(name, max_count), base)
    }
}

impl<K, V, F, P> Memoized<K, V, F, P>
where
    K: ArgumentKey,
    V: Clone,
    F: Fn(&dyn Fn(K) -> V, &K) -> V,
    P: EvictionPolicy,
{
    /// Binds `base` to an existing cache, such as one built with a seeded policy.
    pub fn with_cache(cache: LocalCache<K, V, P>, base: F) -> Self {
        Self { cache, base }
    }

    pub fn call(&self, key: K) -> V {
        let recurse: &dyn Fn(K) -> V = &|key| self.call(key);
        self.cache.fetch(key, |key| (self.base)(recurse, key))
    }

    pub fn cache(&self) -> &LocalCache<K, V, P> {
        &self.cache
    }

    pub fn count(&self) -> usize {
        self.cache.count()
    }

    pub fn remove_all(&self) {
        self.cache.remove_all()
    }
}

impl<K, V, F, P> fmt::Debug for Memoized<K, V, F, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Wraps `base` in a cache holding at most `max_count` entries.
///
/// Returns the memoized callable together with a handle to its cache, which
/// can be used to inspect the entry count or reset the cache between runs.
/// `base` receives the callable for its recursive calls.
///
/// ```
/// let (tarai, cache) = memoize::memoize(Some(1000), |tarai, &(x, y, z): &(i64, i64, i64)| {
///     if x <= y {
///         y
///     } else {
///         tarai((tarai((x - 1, y, z)), tarai((y - 1, z, x)), tarai((z - 1, x, y))))
///     }
/// });
/// assert_eq!(tarai((20, 10, 0)), 20);
/// assert!(cache.count() <= 1000);
/// ```
pub fn memoize<K, V, F>(max_count: Option<usize>, base: F) -> (impl Fn(K) -> V, LocalCache<K, V>)
where
    K: ArgumentKey,
    V: Clone,
    F: Fn(&dyn Fn(K) -> V, &K) -> V,
{
    let memoized = Memoized::new(max_count, base);
    let cache = memoized.cache().clone();
    (move |key| memoized.call(key), cache)
}
