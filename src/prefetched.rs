use alloc::sync::Arc;
use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::{AtomicCell, Error, SerialLane, Status};

type Producer<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// A single value produced asynchronously, at most once.
///
/// The value moves through [`Status::Fresh`] → [`Status::Producing`] → [`Status::Ready`]. The
/// first [`PrefetchedValue::prefetch`] schedules the producer on the value's [`SerialLane`];
/// [`PrefetchedValue::value`] returns immediately once the value is ready and otherwise blocks
/// until it is.
///
/// Many values may share one lane (see [`PrefetchedValue::with_lane`]). Blocking readers wait for
/// their own value only, not for unrelated jobs queued on the same lane.
///
/// A producer that can fail should return a `Result`; it is stored as the ready value.
pub struct PrefetchedValue<T> {
    shared: Arc<Shared<T>>,
    lane: SerialLane,
}

struct Shared<T> {
    status: AtomicCell<Status>,
    producer: Mutex<Option<Producer<T>>>,
    value: OnceLock<T>,
}

impl<T: Send + Sync + 'static> PrefetchedValue<T> {
    /// Creates a value with its own private lane.
    pub fn new(producer: impl FnOnce() -> T + Send + 'static) -> Result<Self, Error> {
        let lane = SerialLane::new("prefetched-value")?;
        Ok(Self::with_lane(lane, producer))
    }

    /// Creates a value whose producer runs on `lane`.
    pub fn with_lane(lane: SerialLane, producer: impl FnOnce() -> T + Send + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                status: AtomicCell::new(Status::Fresh),
                producer: Mutex::new(Some(Box::new(producer))),
                value: OnceLock::new(),
            }),
            lane,
        }
    }

    pub fn status(&self) -> Status {
        self.shared.status.get()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == Status::Ready
    }

    pub fn lane(&self) -> &SerialLane {
        &self.lane
    }

    /// Schedules the producer if it has not been scheduled yet. Idempotent.
    pub fn prefetch(&self) {
        let started = self.shared.status.update(|status| {
            if *status != Status::Fresh {
                return false;
            }
            *status = Status::Producing;
            true
        });
        if !started {
            return;
        }
        let Some(producer) = self.shared.producer.lock().take() else {
            return;
        };
        ptrace!(lane = self.lane.name(), "PrefetchedValue::prefetch scheduled");

        let shared = Arc::downgrade(&self.shared);
        self.lane.spawn(move || {
            // Nobody can observe the value anymore.
            let Some(shared) = shared.upgrade() else {
                return;
            };
            match catch_unwind(AssertUnwindSafe(producer)) {
                Ok(value) => {
                    let _ = shared.value.set(value);
                    shared.status.set(Status::Ready);
                }
                Err(payload) => {
                    shared.status.set(Status::Poisoned);
                    resume_unwind(payload);
                }
            }
        });
    }

    /// Returns the value if production has completed, without blocking or scheduling.
    pub fn try_value(&self) -> Option<&T> {
        self.shared.value.get()
    }

    /// Returns the value, producing it first if needed and blocking until it is ready.
    ///
    /// # Panics
    ///
    /// Panics if the producer panicked, or if called from the value's own lane while the value
    /// is not ready yet (the wait could never finish).
    pub fn value(&self) -> &T {
        if let Some(value) = self.shared.value.get() {
            return value;
        }
        self.prefetch();

        assert!(
            !self.lane.is_current(),
            "PrefetchedValue::value called from its own lane before the value was ready"
        );
        ptrace!(lane = self.lane.name(), "PrefetchedValue::value waiting");
        self.shared
            .status
            .wait_until(|s| matches!(s, Status::Ready | Status::Poisoned));

        match self.shared.value.get() {
            Some(value) => value,
            None => panic!("PrefetchedValue producer panicked"),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PrefetchedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrefetchedValue")
            .field("status", &self.shared.status.get())
            .field("value", &self.shared.value.get())
            .field("lane", &self.lane)
            .finish()
    }
}
