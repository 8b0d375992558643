use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};
use std::time::Duration;

use super::{acquire_within, LockError};

/// Raw lock interface.
///
/// # Safety
///
/// Implementations of this trait must ensure that the lock is actually exclusive: a lock can't be
/// acquired while the lock is already locked.
pub unsafe trait RawLock: Default + Send + Sync {
    /// Raw lock's token type.
    type Token;

    /// Acquires the raw lock, blocking until it is available.
    fn lock(&self) -> Self::Token;

    /// Releases the raw lock.
    ///
    /// # Safety
    ///
    /// `unlock()` should be called with the token given by the corresponding `lock()`.
    unsafe fn unlock(&self, token: Self::Token);
}

/// Raw lock interface for the try_lock API.
///
/// # Safety
///
/// Implementations of this trait must ensure that the lock is actually exclusive: a lock can't be
/// acquired while the lock is already locked.
pub unsafe trait RawTryLock: RawLock {
    /// Tries to acquire the raw lock without waiting.
    fn try_lock(&self) -> Result<Self::Token, ()>;
}

/// A type-safe lock: the data it protects is only reachable through a [`LockGuard`].
#[derive(Default)]
pub struct Lock<L: RawLock, T> {
    lock: L,
    data: UnsafeCell<T>,
}

unsafe impl<L: RawLock, T: Send> Send for Lock<L, T> {}
unsafe impl<L: RawLock, T: Send> Sync for Lock<L, T> {}

impl<L: RawLock, T> Lock<L, T> {
    /// Creates a new lock protecting `data`.
    pub fn new(data: T) -> Self {
        Self {
            lock: L::default(),
            data: UnsafeCell::new(data),
        }
    }

    /// Destroys the lock and retrieves the lock-protected value.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }

    /// Borrows the lock-protected value mutably. No locking is needed: `&mut self` is exclusive.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Acquires the lock, blocking until it is available.
    pub fn lock(&self) -> LockGuard<'_, L, T> {
        let token = self.lock.lock();
        LockGuard::new(self, token)
    }
}

impl<L: RawTryLock, T> Lock<L, T> {
    /// Tries to acquire the lock without waiting.
    pub fn try_lock(&self) -> Result<LockGuard<'_, L, T>, LockError> {
        self.lock
            .try_lock()
            .map(|token| LockGuard::new(self, token))
            .map_err(|()| LockError::WouldBlock)
    }

    /// Acquires the lock, giving up once `timeout` has elapsed.
    pub fn lock_timeout(&self, timeout: Duration) -> Result<LockGuard<'_, L, T>, LockError> {
        let token = acquire_within(timeout, || self.lock.try_lock())?;
        Ok(LockGuard::new(self, token))
    }
}

impl<L: RawLock, T> fmt::Debug for Lock<L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock").finish_non_exhaustive()
    }
}

/// A guard that holds the lock and dereferences the inner value. Dropping it releases the lock.
pub struct LockGuard<'s, L: RawLock, T> {
    lock: &'s Lock<L, T>,
    token: ManuallyDrop<L::Token>,
    _marker: PhantomData<*const ()>, // !Send
}

unsafe impl<L: RawLock, T: Sync> Sync for LockGuard<'_, L, T> {}

impl<'s, L: RawLock, T> LockGuard<'s, L, T> {
    fn new(lock: &'s Lock<L, T>, token: L::Token) -> Self {
        Self {
            lock,
            token: ManuallyDrop::new(token),
            _marker: PhantomData,
        }
    }
}

impl<L: RawLock, T> Drop for LockGuard<'_, L, T> {
    fn drop(&mut self) {
        // SAFETY: `self.token` is not used anymore in this function, and as we are `drop`ing
        // `self`, it is not used anymore.
        let token = unsafe { ManuallyDrop::take(&mut self.token) };

        // SAFETY: since `self` was created with `lock` and it's `token`, the `token` given to
        // `unlock()` is correct.
        unsafe { self.lock.lock.unlock(token) };
    }
}

impl<L: RawLock, T> Deref for LockGuard<'_, L, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: Having a `LockGuard` means the underlying lock is held.
        unsafe { &*self.lock.data.get() }
    }
}

impl<L: RawLock, T> DerefMut for LockGuard<'_, L, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: Having a `LockGuard` means the underlying lock is held exclusively.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<L: RawLock, T: fmt::Debug> fmt::Debug for LockGuard<'_, L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").field("data", &**self).finish()
    }
}
