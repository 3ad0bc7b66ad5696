use std::hash::Hash;

/// The arguments of one memoized call, used as the cache key.
///
/// Equality and hashing must be structural over every argument: two keys
/// are equal iff each corresponding argument compares equal. Single
/// arguments are used as-is; several arguments are grouped into a tuple
/// in declaration order, which keeps each argument's type intact.
///
/// Types without a total `Eq` (such as `f64`) need a wrapper that
/// provides one before they can take part in a key.
pub trait ArgumentKey: Hash + Eq {}

impl<T: Hash + Eq> ArgumentKey for T {}
