//! Bounded memoization for recursive functions.
//!
//! Results are cached by argument value in a [`CacheStore`] holding at most
//! `max_count` entries; once full, an entry chosen uniformly at random makes
//! room for the next one. Recursive calls go back through the same cache, so
//! every intermediate result is memoized, not just the outermost call.
//!
//! A cache is bound to its owner by one of the holders in [`scope`]:
//! [`StaticCache`] for free functions and types, [`InstanceCache`] for a
//! single value, and [`LocalCache`] for the callable built by [`memoize`].
//!
//! Only [`StaticCache`] synchronizes; everything else assumes a single thread.
#![forbid(unsafe_code)]

mod eviction;
mod hash;
mod invoke;
mod key;
pub mod scope;
mod store;
mod tracing;

pub use self::eviction::{EvictionPolicy, RandomEviction};
pub use self::invoke::{fetch, memoize, try_fetch, Memoized, StoreAccess};
pub use self::key::ArgumentKey;
pub use self::scope::{InstanceCache, LocalCache, Scope, StaticCache};
pub use self::store::{CacheStore, Capacity};

/// The traits needed to write a custom key, eviction policy or cache holder.
pub mod prelude {
    pub use crate::{ArgumentKey, EvictionPolicy, StoreAccess};
}
