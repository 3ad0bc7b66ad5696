//! Logging for cache operations.
//!
//! Hits are logged at `TRACE`; anything that runs a base computation or
//! changes a store is logged at `DEBUG`. The `tracing` calls live in cold
//! closures behind an `enabled!` check, so with logging off a hit costs a
//! single branch.

/// A lookup answered from `cache` without running the base.
macro_rules! hit {
    ($cache:expr) => {
        crate::tracing::event!(TRACE, cache = $cache, "hit")
    };
}

macro_rules! debug {
    ($($x:tt)*) => {
        crate::tracing::event!(DEBUG, $($x)*)
    };
}

/// Enters the span covering one base computation for `cache`, returning
/// its guard.
macro_rules! execute_span {
    ($cache:expr) => {{
        if ::tracing::enabled!(::tracing::Level::DEBUG) {
            let span = {
                #[cold] #[inline(never)] || { ::tracing::debug_span!("execute", cache = $cache) }
            };

            span().entered()
        } else {
            ::tracing::Span::none().entered()
        }
    }};
}

macro_rules! event {
    ($level:ident, $($x:tt)*) => {{
        if ::tracing::enabled!(::tracing::Level::$level) {
            let event = {
                #[cold] #[inline(never)] || { ::tracing::event!(::tracing::Level::$level, $($x)*) }
            };

            event();
        }
    }};
}

pub(crate) use {debug, event, execute_span, hit};
