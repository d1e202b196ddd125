//! Worker threads and their pool-facing handles.
//!
//! A [`Worker`] is the scheduler's handle to one long-lived thread. The
//! thread owns the receiving side of a single-slot inbox and loops over
//! it: a payload is dispatched through the pool, the sentinel (`None`) or
//! a disconnected inbox ends the loop. Between tasks the handle sits in
//! the pool's idle store.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::core::PoolCore;

/// Inbox capacity: one pending payload per worker.
const INBOX_CAPACITY: usize = 1;

/// Scheduler-side handle to a worker thread.
pub(crate) struct Worker<P> {
    inbox: Sender<Option<P>>,
    /// Written only while the worker is out of the idle store; the pool
    /// lock orders the write against the background sweep.
    last_used: Mutex<Instant>,
    recycled: AtomicBool,
}

impl<P> std::fmt::Debug for Worker<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").finish_non_exhaustive()
    }
}

impl<P> Worker<P> {
    fn new(inbox: Sender<Option<P>>) -> Self {
        Self {
            inbox,
            last_used: Mutex::new(Instant::now()),
            recycled: AtomicBool::new(false),
        }
    }

    /// Hand a payload to the worker thread. The inbox slot is free by
    /// invariant: a worker re-enters the idle store only after consuming
    /// its previous payload.
    pub(crate) fn send(&self, payload: P) {
        let _ = self.inbox.send(Some(payload));
    }

    /// Record the current time as the last-used timestamp.
    pub(crate) fn touch(&self) {
        *self.last_used.lock().unwrap() = Instant::now();
    }

    pub(crate) fn last_used(&self) -> Instant {
        *self.last_used.lock().unwrap()
    }

    #[cfg(test)]
    pub(crate) fn set_last_used(&self, at: Instant) {
        *self.last_used.lock().unwrap() = at;
    }

    pub(crate) fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::Acquire)
    }

    /// Terminate the worker: mark it recycled and place the sentinel in
    /// its inbox. Non-blocking, so it is safe under the pool lock; an
    /// idle worker's single slot is always free.
    pub(crate) fn finish(&self) {
        self.recycled.store(true, Ordering::Release);
        let _ = self.inbox.try_send(None);
    }

    /// Handle wired to no thread; used by store tests.
    #[cfg(test)]
    pub(crate) fn detached() -> Arc<Self> {
        let (tx, _rx) = bounded(INBOX_CAPACITY);
        Arc::new(Self::new(tx))
    }
}

/// Spawn a worker thread bound to `pool` and return its handle.
///
/// The thread holds only a weak back-reference, so dropping the last pool
/// handle lets every worker unwind on its own.
pub(crate) fn spawn<P: Send + 'static>(pool: &Arc<PoolCore<P>>, id: usize) -> Arc<Worker<P>> {
    let (tx, rx) = bounded(INBOX_CAPACITY);
    let worker = Arc::new(Worker::new(tx));
    let handle = Arc::clone(&worker);
    let weak = Arc::downgrade(pool);
    thread::Builder::new()
        .name(format!("{}-worker-{}", pool.name(), id))
        .spawn(move || worker_loop(weak, rx, handle, id))
        .expect("failed to spawn worker thread");
    worker
}

fn worker_loop<P: Send + 'static>(
    pool: Weak<PoolCore<P>>,
    inbox: Receiver<Option<P>>,
    me: Arc<Worker<P>>,
    id: usize,
) {
    tracing::debug!(worker = id, "worker started");

    loop {
        let payload = match inbox.recv() {
            Ok(Some(payload)) => payload,
            // Sentinel, or every sender is gone.
            Ok(None) | Err(_) => break,
        };

        let Some(pool) = pool.upgrade() else {
            return;
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pool.dispatch(payload)));
        if let Err(cause) = outcome {
            // The guard owns the whole panic path: accounting, reporting,
            // waking one blocked submitter. The thread ends here and the
            // worker is not returned to the idle store.
            pool.handle_worker_panic(cause);
            tracing::debug!(worker = id, "worker stopped");
            return;
        }

        if !pool.put_worker(&me) {
            break;
        }
    }

    // Recycled exits (sweep, shutdown drain) were already subtracted from
    // `running` by whoever finished the worker; other exits settle their
    // own account. Either way a blocked submitter gets one wake-up.
    if let Some(pool) = pool.upgrade() {
        if me.is_recycled() {
            pool.signal_one();
        } else {
            pool.on_worker_exit();
        }
    }

    tracing::debug!(worker = id, "worker stopped");
}
