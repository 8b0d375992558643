use std::time::Duration;

use super::{acquire_within, AtomicUsize, LockError, Ordering, RawRwLock, Spin};

const WRITER: usize = 1;
const WRITER_WAITING: usize = 1 << 1;
const READER: usize = 1 << 2;

/// A reader-writer spin lock.
///
/// The state word packs a writer bit, a writer-waiting bit and the reader count. A blocked writer
/// raises the waiting bit, which turns away new readers until it gets in.
#[derive(Debug)]
pub struct RwSpinLock {
    state: AtomicUsize,
}

impl RwSpinLock {
    /// Turns new readers away until some writer gets in.
    fn announce_writer(&self) {
        if self.state.load(Ordering::Relaxed) & WRITER_WAITING == 0 {
            self.state.fetch_or(WRITER_WAITING, Ordering::Relaxed);
        }
    }
}

impl Default for RwSpinLock {
    fn default() -> Self {
        Self {
            state: AtomicUsize::new(0),
        }
    }
}

unsafe impl RawRwLock for RwSpinLock {
    fn lock_shared(&self) {
        let spin = Spin::new();
        while self.try_lock_shared().is_err() {
            spin.wait();
        }
    }

    fn try_lock_shared(&self) -> Result<(), ()> {
        let mut state = self.state.load(Ordering::Relaxed);
        loop {
            if state & (WRITER | WRITER_WAITING) != 0 {
                return Err(());
            }
            match self.state.compare_exchange_weak(
                state,
                state + READER,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(current) => state = current,
            }
        }
    }

    unsafe fn unlock_shared(&self) {
        self.state.fetch_sub(READER, Ordering::Release);
    }

    fn lock_exclusive(&self) {
        let spin = Spin::new();
        loop {
            if self.try_lock_exclusive().is_ok() {
                return;
            }
            self.announce_writer();
            spin.wait();
        }
    }

    fn try_lock_exclusive(&self) -> Result<(), ()> {
        let mut state = self.state.load(Ordering::Relaxed);
        loop {
            // Free apart from possibly a waiting writer; whoever gets in clears the flag and the
            // writers still waiting raise it again.
            if state & !WRITER_WAITING != 0 {
                return Err(());
            }
            match self.state.compare_exchange_weak(
                state,
                WRITER,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Ok(()),
                Err(current) => state = current,
            }
        }
    }

    unsafe fn unlock_exclusive(&self) {
        self.state.fetch_and(!WRITER, Ordering::Release);
    }

    fn lock_exclusive_timeout(&self, timeout: Duration) -> Result<(), LockError> {
        let acquired = acquire_within(timeout, || {
            self.try_lock_exclusive().map_err(|()| self.announce_writer())
        });
        if acquired.is_err() {
            // Blocking writers still waiting raise the flag again on their next round.
            self.state.fetch_and(!WRITER_WAITING, Ordering::Relaxed);
        }
        acquired
    }
}
