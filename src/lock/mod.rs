//! Locks.

mod api;
mod error;
mod rw_spinlock;
mod rwlock;
mod spinlock;

use std::time::{Duration, Instant};

pub use api::{Lock, LockGuard, RawLock, RawTryLock};
pub use error::LockError;
pub use rw_spinlock::RwSpinLock;
pub use rwlock::{RawRwLock, ReadGuard, RwLock, WriteGuard};
pub use spinlock::SpinLock;

cfg_if::cfg_if! {
    if #[cfg(feature = "check-loom")] {
        pub(crate) use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        /// Waiting strategy for spin loops. Under loom every wait is a yield point.
        #[derive(Debug, Default)]
        pub(crate) struct Spin;

        impl Spin {
            pub(crate) fn new() -> Self {
                Self
            }

            pub(crate) fn wait(&self) {
                loom::thread::yield_now();
            }
        }
    } else {
        pub(crate) use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        /// Waiting strategy for spin loops: exponential backoff, then yielding to the scheduler.
        #[derive(Debug, Default)]
        pub(crate) struct Spin(crossbeam_utils::Backoff);

        impl Spin {
            pub(crate) fn new() -> Self {
                Self(crossbeam_utils::Backoff::new())
            }

            pub(crate) fn wait(&self) {
                self.0.snooze();
            }
        }
    }
}

/// Retries `attempt` until it succeeds or `timeout` elapses. `attempt` is tried at least once.
pub(crate) fn acquire_within<R>(
    timeout: Duration,
    mut attempt: impl FnMut() -> Result<R, ()>,
) -> Result<R, LockError> {
    let deadline = Instant::now().checked_add(timeout);
    let spin = Spin::new();
    loop {
        if let Ok(acquired) = attempt() {
            return Ok(acquired);
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::debug!(?timeout, "lock acquisition timed out");
            return Err(LockError::Timeout { timeout });
        }
        spin.wait();
    }
}
