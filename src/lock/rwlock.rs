use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use std::time::Duration;

use super::{acquire_within, LockError};

/// Raw reader-writer lock interface.
///
/// # Safety
///
/// Implementations must ensure that an exclusive holder excludes every other holder, shared or
/// exclusive, while shared holders only exclude exclusive ones.
pub unsafe trait RawRwLock: Default + Send + Sync {
    /// Acquires the lock in shared mode, blocking until no writer holds it.
    fn lock_shared(&self);

    /// Tries to acquire the lock in shared mode without waiting.
    fn try_lock_shared(&self) -> Result<(), ()>;

    /// Releases a shared acquisition.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock in shared mode.
    unsafe fn unlock_shared(&self);

    /// Acquires the lock in exclusive mode, blocking until nobody else holds it.
    fn lock_exclusive(&self);

    /// Tries to acquire the lock in exclusive mode without waiting.
    fn try_lock_exclusive(&self) -> Result<(), ()>;

    /// Releases an exclusive acquisition.
    ///
    /// # Safety
    ///
    /// The caller must hold the lock in exclusive mode.
    unsafe fn unlock_exclusive(&self);

    /// Acquires the lock in exclusive mode, giving up once `timeout` has elapsed.
    ///
    /// Locks that turn readers away in favor of waiting writers should do so here as well, and
    /// withdraw on giving up.
    fn lock_exclusive_timeout(&self, timeout: Duration) -> Result<(), LockError> {
        acquire_within(timeout, || self.try_lock_exclusive())
    }
}

/// A type-safe reader-writer lock.
#[derive(Default)]
pub struct RwLock<L: RawRwLock, T> {
    lock: L,
    data: UnsafeCell<T>,
}

unsafe impl<L: RawRwLock, T: Send> Send for RwLock<L, T> {}
unsafe impl<L: RawRwLock, T: Send + Sync> Sync for RwLock<L, T> {}

impl<L: RawRwLock, T> RwLock<L, T> {
    /// Creates a new reader-writer lock protecting `data`.
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

    /// Acquires shared access, blocking while a writer holds or waits for the lock.
    pub fn read(&self) -> ReadGuard<'_, L, T> {
        self.lock.lock_shared();
        ReadGuard::new(self)
    }

    /// Acquires exclusive access, blocking until every other holder is gone.
    pub fn write(&self) -> WriteGuard<'_, L, T> {
        self.lock.lock_exclusive();
        WriteGuard::new(self)
    }

    /// Tries to acquire shared access without waiting.
    pub fn try_read(&self) -> Result<ReadGuard<'_, L, T>, LockError> {
        self.lock
            .try_lock_shared()
            .map(|()| ReadGuard::new(self))
            .map_err(|()| LockError::WouldBlock)
    }

    /// Tries to acquire exclusive access without waiting.
    pub fn try_write(&self) -> Result<WriteGuard<'_, L, T>, LockError> {
        self.lock
            .try_lock_exclusive()
            .map(|()| WriteGuard::new(self))
            .map_err(|()| LockError::WouldBlock)
    }

    /// Acquires shared access, giving up once `timeout` has elapsed.
    pub fn read_timeout(&self, timeout: Duration) -> Result<ReadGuard<'_, L, T>, LockError> {
        acquire_within(timeout, || self.lock.try_lock_shared())?;
        Ok(ReadGuard::new(self))
    }

    /// Acquires exclusive access, giving up once `timeout` has elapsed.
    pub fn write_timeout(&self, timeout: Duration) -> Result<WriteGuard<'_, L, T>, LockError> {
        self.lock.lock_exclusive_timeout(timeout)?;
        Ok(WriteGuard::new(self))
    }
}

impl<L: RawRwLock, T> fmt::Debug for RwLock<L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwLock").finish_non_exhaustive()
    }
}

/// Shared access to the data of an [`RwLock`]. Dropping it releases the shared acquisition.
pub struct ReadGuard<'s, L: RawRwLock, T> {
    lock: &'s RwLock<L, T>,
    _marker: PhantomData<*const ()>, // !Send
}

unsafe impl<L: RawRwLock, T: Sync> Sync for ReadGuard<'_, L, T> {}

impl<'s, L: RawRwLock, T> ReadGuard<'s, L, T> {
    fn new(lock: &'s RwLock<L, T>) -> Self {
        Self {
            lock,
            _marker: PhantomData,
        }
    }
}

impl<L: RawRwLock, T> Drop for ReadGuard<'_, L, T> {
    fn drop(&mut self) {
        // SAFETY: the guard was created right after a shared acquisition.
        unsafe { self.lock.lock.unlock_shared() };
    }
}

impl<L: RawRwLock, T> Deref for ReadGuard<'_, L, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: no writer can hold the lock while a shared acquisition is alive.
        unsafe { &*self.lock.data.get() }
    }
}

impl<L: RawRwLock, T: fmt::Debug> fmt::Debug for ReadGuard<'_, L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadGuard").field("data", &**self).finish()
    }
}

/// Exclusive access to the data of an [`RwLock`]. Dropping it releases the lock.
pub struct WriteGuard<'s, L: RawRwLock, T> {
    lock: &'s RwLock<L, T>,
    _marker: PhantomData<*const ()>, // !Send
}

unsafe impl<L: RawRwLock, T: Sync> Sync for WriteGuard<'_, L, T> {}

impl<'s, L: RawRwLock, T> WriteGuard<'s, L, T> {
    fn new(lock: &'s RwLock<L, T>) -> Self {
        Self {
            lock,
            _marker: PhantomData,
        }
    }
}

impl<L: RawRwLock, T> Drop for WriteGuard<'_, L, T> {
    fn drop(&mut self) {
        // SAFETY: the guard was created right after an exclusive acquisition.
        unsafe { self.lock.lock.unlock_exclusive() };
    }
}

impl<L: RawRwLock, T> Deref for WriteGuard<'_, L, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the lock is held exclusively.
        unsafe { &*self.lock.data.get() }
    }
}

impl<L: RawRwLock, T> DerefMut for WriteGuard<'_, L, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the lock is held exclusively.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<L: RawRwLock, T: fmt::Debug> fmt::Debug for WriteGuard<'_, L, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteGuard").field("data", &**self).finish()
    }
}
