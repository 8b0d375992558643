use super::{AtomicBool, Ordering, RawLock, RawTryLock, Spin};

/// A spin lock.
///
/// Waiters test the flag before retrying the swap and back off between attempts, yielding to the
/// scheduler once spinning stops paying off.
#[derive(Debug)]
pub struct SpinLock {
    inner: AtomicBool,
}

impl Default for SpinLock {
    fn default() -> Self {
        Self {
            inner: AtomicBool::new(false),
        }
    }
}

unsafe impl RawLock for SpinLock {
    type Token = ();

    fn lock(&self) {
        let spin = Spin::new();

        while self
            .inner
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.inner.load(Ordering::Relaxed) {
                spin.wait();
            }
        }
    }

    unsafe fn unlock(&self, _token: ()) {
        self.inner.store(false, Ordering::Release);
    }
}

unsafe impl RawTryLock for SpinLock {
    fn try_lock(&self) -> Result<(), ()> {
        self.inner
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map(|_| ())
            .map_err(|_| ())
    }
}
