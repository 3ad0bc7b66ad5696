//! Utility for tests that lets us log when a memoized computation runs.

#![allow(dead_code)]

use std::sync::Mutex;

/// Records the executions of instrumented base computations.
#[derive(Default)]
pub struct Logger {
    logs: Mutex<Vec<String>>,
}

impl Logger {
    /// Log an event from inside a base computation.
    pub fn push_log(&self, string: String) {
        self.logs.lock().unwrap().push(string);
    }

    /// Asserts what the (formatted) logs should look like,
    /// clearing the logged events.
    pub fn assert_logs(&self, expected: expect_test::Expect) {
        let logs = std::mem::take(&mut *self.logs.lock().unwrap());
        expected.assert_eq(&format!("{:#?}", logs));
    }

    /// Asserts the length of the logs,
    /// clearing the logged events.
    pub fn assert_logs_len(&self, expected: usize) {
        let logs = std::mem::take(&mut *self.logs.lock().unwrap());
        assert_eq!(logs.len(), expected);
    }
}

/// McCarthy's variant of the Takeuchi function, without memoization.
///
/// Only its closed form is cheap: `y` if `x <= y`, else `z` if `y <= z`,
/// else `x`.
pub fn tarai_closed_form(x: i64, y: i64, z: i64) -> i64 {
    if x <= y {
        y
    } else if y <= z {
        z
    } else {
        x
    }
}

/// Plain doubly recursive Fibonacci, for small `n` only.
pub fn fib_plain(n: u64) -> u64 {
    if n <= 1 {
        n
    } else {
        fib_plain(n - 1) + fib_plain(n - 2)
    }
}
