//! Change notification between the surface and pipeline threads.
//!
//! [`ChangeSignal`] is a generation counter guarded by a mutex plus a
//! condition variable. Every state change that a waiting thread may care
//! about bumps the generation and wakes all waiters.
//!
//! Waiters follow a read-check-wait pattern that cannot lose a wakeup:
//!
//! ```ignore
//! loop {
//!     let seen = signal.generation();
//!     if condition_holds() {
//!         break;
//!     }
//!     signal.wait_for_change(seen, poll);
//! }
//! ```
//!
//! A change that lands between `generation()` and `wait_for_change()` has
//! already moved the counter past `seen`, so the wait returns immediately.
//! The timeout bounds the wait even if a notifier forgets to bump.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Generation counter with wait/notify.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    generation: Mutex<u64>,
    changed: Condvar,
}

impl ChangeSignal {
    /// Create a new signal at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        *self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Bump the generation and wake every waiter.
    pub fn notify(&self) {
        let mut generation = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation = generation.wrapping_add(1);
        self.changed.notify_all();
    }

    /// Wait until the generation moves past `seen` or `timeout` elapses.
    ///
    /// Returns true if a change was observed.
    pub fn wait_for_change(&self, seen: u64, timeout: Duration) -> bool {
        let guard = self
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (guard, _timeout) = self
            .changed
            .wait_timeout_while(guard, timeout, |generation| *generation == seen)
            .unwrap_or_else(PoisonError::into_inner);
        *guard != seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_notify_bumps_generation() {
        let signal = ChangeSignal::new();
        assert_eq!(signal.generation(), 0);
        signal.notify();
        assert_eq!(signal.generation(), 1);
    }

    #[test]
    fn test_stale_generation_returns_immediately() {
        let signal = ChangeSignal::new();
        let seen = signal.generation();
        signal.notify();
        assert!(signal.wait_for_change(seen, Duration::from_secs(10)));
    }

    #[test]
    fn test_wait_times_out_without_change() {
        let signal = ChangeSignal::new();
        let seen = signal.generation();
        let start = Instant::now();
        assert!(!signal.wait_for_change(seen, Duration::from_millis(5)));
        assert!(start.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn test_wakes_waiter_from_other_thread() {
        let signal = Arc::new(ChangeSignal::new());
        let seen = signal.generation();

        let notifier = Arc::clone(&signal);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.notify();
        });

        assert!(signal.wait_for_change(seen, Duration::from_secs(10)));
        handle.join().unwrap();
    }
}
