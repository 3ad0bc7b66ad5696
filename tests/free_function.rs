//! A free function memoized through a process-wide `StaticCache`.

mod common;

use common::tarai_closed_form;
use memoize::{Scope, StaticCache};
use test_log::test;

static TARAI2_CACHE: StaticCache<(i64, i64, i64), i64> =
    StaticCache::global("tarai2_cache", Some(1000));

fn tarai2(x: i64, y: i64, z: i64) -> i64 {
    TARAI2_CACHE.fetch((x, y, z), |&(x, y, z)| {
        if x <= y {
            y
        } else {
            tarai2(tarai2(x - 1, y, z), tarai2(y - 1, z, x), tarai2(z - 1, x, y))
        }
    })
}

#[test]
fn tarai_with_bounded_cache() {
    TARAI2_CACHE.remove_all();
    assert_eq!(TARAI2_CACHE.count(), 0);

    assert_eq!(tarai2(20, 10, 0), 20);
    assert_eq!(tarai2(20, 10, 0), tarai_closed_form(20, 10, 0));

    // 617 distinct argument triples are reached from (20, 10, 0), which
    // fits under the bound, so nothing was evicted on the way.
    assert_eq!(TARAI2_CACHE.count(), 617);
    assert!(TARAI2_CACHE.contains(&(20, 10, 0)));
    assert_eq!(TARAI2_CACHE.name(), "tarai2_cache");
    assert_eq!(TARAI2_CACHE.scope(), Scope::Global);

    // Resetting between runs, as a benchmark would.
    TARAI2_CACHE.remove_all();
    assert_eq!(TARAI2_CACHE.count(), 0);
    assert_eq!(tarai2(20, 10, 0), 20);
    assert_eq!(TARAI2_CACHE.count(), 617);
}

static TAK_CACHE: StaticCache<(i64, i64, i64), i64> = StaticCache::global("tak_cache", Some(1000));

fn tarai(x: i64, y: i64, z: i64) -> i64 {
    TAK_CACHE.fetch((x, y, z), |&(x, y, z)| {
        if x <= y {
            y
        } else {
            tarai(tarai(x - 1, y, z), tarai(y - 1, z, x), tarai(z - 1, x, y))
        }
    })
}

#[test]
fn tarai_matches_closed_form() {
    for x in 0..12 {
        for y in 0..12 {
            for z in 0..12 {
                assert_eq!(tarai(x, y, z), tarai_closed_form(x, y, z), "tarai({x}, {y}, {z})");
                assert!(TAK_CACHE.count() <= 1000);
            }
        }
    }
}

static SLOW_SQUARE_CACHE: StaticCache<u64, u64> = StaticCache::global("slow_square_cache", None);

#[test]
fn shared_across_threads() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    static EXECUTIONS: AtomicUsize = AtomicUsize::new(0);

    fn slow_square(n: u64) -> u64 {
        SLOW_SQUARE_CACHE.fetch(n, |&n| {
            EXECUTIONS.fetch_add(1, Ordering::SeqCst);
            n * n
        })
    }

    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| (0..100).map(slow_square).sum::<u64>()))
        .collect();
    let sums: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let expected: u64 = (0..100).map(|n| n * n).sum();
    assert!(sums.iter().all(|&sum| sum == expected));
    assert_eq!(SLOW_SQUARE_CACHE.count(), 100);

    // Racing threads may compute a key twice, but each key is stored once.
    let executions = EXECUTIONS.load(Ordering::SeqCst);
    assert!((100..=400).contains(&executions), "{executions} executions");
}
