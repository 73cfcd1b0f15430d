use core::fmt;

use parking_lot::{Condvar, Mutex};

/// A value whose reads and writes are serialized across threads.
///
/// Every write wakes threads blocked in [`AtomicCell::wait_until`], so the cell doubles as a
/// completion signal for state machines built on top of it.
pub struct AtomicCell<T> {
    value: Mutex<T>,
    changed: Condvar,
}

impl<T> AtomicCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Mutex::new(value),
            changed: Condvar::new(),
        }
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.lock().clone()
    }

    pub fn set(&self, value: T) {
        *self.value.lock() = value;
        self.changed.notify_all();
    }

    /// Stores `value` and returns the previous one.
    pub fn replace(&self, value: T) -> T {
        let prev = core::mem::replace(&mut *self.value.lock(), value);
        self.changed.notify_all();
        prev
    }

    /// Mutates the value in place while holding the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value.lock());
        self.changed.notify_all();
        out
    }

    /// Reads the value in place while holding the lock.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.lock())
    }

    /// Blocks the calling thread until `ready` holds for the current value.
    pub fn wait_until(&self, mut ready: impl FnMut(&T) -> bool) {
        let mut guard = self.value.lock();
        while !ready(&guard) {
            self.changed.wait(&mut guard);
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for AtomicCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with(|v| f.debug_tuple("AtomicCell").field(v).finish())
    }
}
