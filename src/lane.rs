use alloc::sync::Arc;
use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, ThreadId};

use crossbeam_channel::Sender;

use crate::{AtomicCell, Error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A private, strictly ordered execution context backed by one worker thread.
///
/// Jobs run one at a time in submission order. Handles are cheap to clone; the worker exits
/// once every handle has been dropped and the queue is drained.
///
/// A lane is also a drain target: [`SerialLane::wait_idle`] blocks until every job submitted
/// so far has finished. Never call it from a job running on the same lane.
#[derive(Clone)]
pub struct SerialLane {
    inner: Arc<LaneInner>,
}

struct LaneInner {
    name: String,
    sender: Sender<Job>,
    pending: Arc<AtomicCell<usize>>,
    worker: ThreadId,
}

impl SerialLane {
    /// Spawns the worker thread. `name` becomes the thread name.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();
        let pending = Arc::new(AtomicCell::new(0usize));

        let worker = {
            let pending = Arc::clone(&pending);
            let lane = name.clone();
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || {
                    for job in receiver.iter() {
                        if catch_unwind(AssertUnwindSafe(job)).is_err() {
                            pwarn!(lane = %lane, "job panicked");
                        }
                        pending.update(|n| *n = n.saturating_sub(1));
                    }
                    ptrace!(lane = %lane, "lane worker exiting");
                })
                .map_err(|source| Error::LaneSpawn {
                    name: name.clone(),
                    source: Arc::new(source),
                })?
        };
        pdebug!(lane = %name, "SerialLane::new");

        Ok(Self {
            inner: Arc::new(LaneInner {
                name,
                sender,
                pending,
                worker: worker.thread().id(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Queues `job` behind every job already submitted to this lane.
    pub fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        self.inner.pending.update(|n| *n += 1);
        if self.inner.sender.send(Box::new(job)).is_err() {
            pwarn!(lane = %self.inner.name, "lane worker is gone; dropping job");
            self.inner.pending.update(|n| *n = n.saturating_sub(1));
        }
    }

    /// Number of submitted jobs that have not finished yet.
    pub fn pending(&self) -> usize {
        self.inner.pending.get()
    }

    /// Returns true when called from this lane's worker thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.worker
    }

    /// Blocks until every job submitted so far has finished.
    ///
    /// # Panics
    ///
    /// Panics when called from this lane's own worker thread, where it could never return.
    pub fn wait_idle(&self) {
        assert!(
            !self.is_current(),
            "SerialLane::wait_idle called from lane `{}` itself",
            self.inner.name
        );
        self.inner.pending.wait_until(|n| *n == 0);
    }
}

impl fmt::Debug for SerialLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialLane")
            .field("name", &self.inner.name)
            .field("pending", &self.pending())
            .finish()
    }
}
