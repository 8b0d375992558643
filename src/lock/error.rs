use std::time::Duration;

/// Failure to acquire a lock.
///
/// Only the non-blocking and timed acquisition paths produce it. The protected data is never
/// touched when acquisition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The lock was still held by someone else when the timeout elapsed.
    #[error("lock not acquired within {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The lock was held and the caller asked not to wait.
    #[error("lock is held")]
    WouldBlock,
}
