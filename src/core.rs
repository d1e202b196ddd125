//! The pool scheduler.
//!
//! `PoolCore` owns every invariant the two public flavours share: how a
//! submission acquires a worker (idle-store hit, creation under capacity,
//! blocking on saturation, overload), how workers re-enter the idle store,
//! how the background sweep reclaims workers idle past the expiry horizon,
//! and how shutdown drains the system without losing in-flight work. The
//! flavours differ only in the payload type and in how a payload is
//! executed, which the [`Dispatch`] seam captures.

use std::any::Any;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::config::Options;
use crate::error::{PoolError, PoolResult};
use crate::store::IdleStore;
use crate::worker::{self, Worker};

const OPENED: i32 = 0;
const CLOSED: i32 = 1;

/// Capacity value meaning "never saturated".
pub(crate) const UNBOUNDED: i32 = -1;

/// Executes one payload. The generic pool's payload is the callable
/// itself; the function pool's payload is an argument for the callable
/// bound at construction.
pub(crate) trait Dispatch<P>: Send + Sync + 'static {
    fn dispatch(&self, payload: P);
}

struct Sweeper {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

pub(crate) struct PoolCore<P: Send + 'static> {
    // Scalars read without the pool lock.
    capacity: AtomicI32,
    running: AtomicI32,
    state: AtomicI32,
    waiting: AtomicI32,

    // The pool lock. Blocked submitters wait on `cond` with this lock.
    store: Mutex<IdleStore<P>>,
    cond: Condvar,

    dispatcher: Box<dyn Dispatch<P>>,
    options: Options,
    sweeper: Mutex<Option<Sweeper>>,
    worker_seq: AtomicUsize,
}

impl<P: Send + 'static> PoolCore<P> {
    pub(crate) fn new(
        size: i32,
        dispatcher: Box<dyn Dispatch<P>>,
        options: Options,
    ) -> PoolResult<Arc<Self>> {
        if size == 0 {
            return Err(PoolError::InvalidPoolSize);
        }
        if options.expiry_duration.is_zero() {
            return Err(PoolError::InvalidPoolExpiry);
        }

        let core = Arc::new(Self {
            capacity: AtomicI32::new(size),
            running: AtomicI32::new(0),
            state: AtomicI32::new(OPENED),
            waiting: AtomicI32::new(0),
            store: Mutex::new(IdleStore::select(size, options.pre_alloc)),
            cond: Condvar::new(),
            dispatcher,
            options,
            sweeper: Mutex::new(None),
            worker_seq: AtomicUsize::new(0),
        });

        *core.sweeper.lock().unwrap() = Some(Self::spawn_sweeper(&core));
        tracing::info!(pool = %core.options.name, capacity = size, "worker pool created");
        Ok(core)
    }

    /// Check closed state, acquire a worker, and hand it the payload.
    pub(crate) fn submit_payload(this: &Arc<Self>, payload: P) -> PoolResult<()> {
        if this.is_closed() {
            return Err(PoolError::Closed);
        }
        let worker = Self::get_worker(this)?;
        worker.send(payload);
        Ok(())
    }

    /// The acquire protocol.
    ///
    /// Runs as a guarded loop under the pool lock: pop an idle worker,
    /// else create one while below capacity, else fail fast (non-blocking
    /// mode) or wait on the condition variable and re-enter the loop. An
    /// awoken submitter that finds the store empty does not give up — a
    /// panicked worker frees capacity without releasing anything into the
    /// store, so the retry may legitimately create a replacement instead.
    fn get_worker(this: &Arc<Self>) -> PoolResult<Arc<Worker<P>>> {
        let mut store = this.store.lock().unwrap();
        loop {
            if this.is_closed() {
                return Err(PoolError::Closed);
            }

            if let Some(worker) = store.pop() {
                drop(store);
                return Ok(worker);
            }

            let capacity = this.capacity.load(Ordering::Acquire);
            let running = this.running.load(Ordering::Acquire);
            if capacity == UNBOUNDED || running < capacity {
                // Claim the slot before the lock drops so `running` never
                // overshoots `capacity`; the spawn itself runs unlocked.
                this.running.fetch_add(1, Ordering::AcqRel);
                drop(store);
                let id = this.worker_seq.fetch_add(1, Ordering::Relaxed);
                return Ok(worker::spawn(this, id));
            }

            if this.options.nonblocking {
                return Err(PoolError::Overload);
            }

            this.waiting.fetch_add(1, Ordering::AcqRel);
            store = this.cond.wait(store).unwrap();
            this.waiting.fetch_sub(1, Ordering::AcqRel);

            if this.is_closed() {
                // Pass the wake-up along: submitters that blocked after
                // the shutdown broadcast still have to drain.
                this.cond.notify_one();
                return Err(PoolError::Closed);
            }
        }
    }

    /// The release protocol. Refusal tells the worker's loop to exit.
    pub(crate) fn put_worker(&self, worker: &Arc<Worker<P>>) -> bool {
        if self.is_closed() {
            return false;
        }

        // Timestamp outside the lock; the push below publishes it to the
        // sweep.
        worker.touch();

        let mut store = self.store.lock().unwrap();
        // Re-check under the lock: shutdown drains the store after the
        // state flips, and a worker slipping in behind the drain would
        // idle forever.
        if self.is_closed() {
            return false;
        }
        if store.push(Arc::clone(worker)).is_err() {
            return false;
        }
        if self.waiting.load(Ordering::Acquire) > 0 {
            self.cond.notify_one();
        }
        true
    }

    pub(crate) fn dispatch(&self, payload: P) {
        self.dispatcher.dispatch(payload);
    }

    /// Panic path of the worker guard: settle the accounting, report the
    /// payload, and wake one blocked submitter so it can re-enter the
    /// acquire loop.
    pub(crate) fn handle_worker_panic(&self, cause: Box<dyn Any + Send>) {
        self.running.fetch_sub(1, Ordering::AcqRel);
        match &self.options.panic_handler {
            Some(handler) => handler(cause),
            None => self.options.logger.log(format_args!(
                "worker exits from panic: {}",
                panic_message(cause.as_ref())
            )),
        }
        self.signal_one();
    }

    /// Accounting for worker exits not already settled by the sweep or
    /// the shutdown drain.
    pub(crate) fn on_worker_exit(&self) {
        self.running.fetch_sub(1, Ordering::AcqRel);
        self.signal_one();
    }

    pub(crate) fn signal_one(&self) {
        let _store = self.store.lock().unwrap();
        self.cond.notify_one();
    }

    pub(crate) fn running(&self) -> i32 {
        self.running.load(Ordering::Acquire)
    }

    pub(crate) fn capacity(&self) -> i32 {
        self.capacity.load(Ordering::Acquire)
    }

    pub(crate) fn waiting(&self) -> i32 {
        self.waiting.load(Ordering::Acquire)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.load(Ordering::Acquire) == CLOSED
    }

    pub(crate) fn free(&self) -> usize {
        self.store.lock().unwrap().len()
    }

    pub(crate) fn name(&self) -> &str {
        &self.options.name
    }

    /// Orderly shutdown. Only the call that flips the state does any
    /// work; later calls are no-ops.
    pub(crate) fn release(&self) {
        if self
            .state
            .compare_exchange(OPENED, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.teardown();
    }

    /// Orderly shutdown bounded by `timeout`. The bound covers only the
    /// teardown itself — in-flight callables are never cancelled, and on
    /// timeout the teardown keeps running in the background.
    pub(crate) fn release_timeout(this: &Arc<Self>, timeout: Duration) -> PoolResult<()> {
        if this
            .state
            .compare_exchange(OPENED, CLOSED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PoolError::Closed);
        }

        let (done_tx, done_rx) = bounded(1);
        let core = Arc::clone(this);
        thread::Builder::new()
            .name(format!("{}-teardown", this.options.name))
            .spawn(move || {
                core.teardown();
                let _ = done_tx.send(());
            })
            .expect("failed to spawn teardown thread");

        done_rx.recv_timeout(timeout).map_err(|_| PoolError::Timeout)
    }

    /// Reopen a released pool: fresh stop channel, fresh sweeper, empty
    /// store. A pool that was never closed is unaffected.
    pub(crate) fn reboot(this: &Arc<Self>) {
        if this
            .state
            .compare_exchange(CLOSED, OPENED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            *this.sweeper.lock().unwrap() = Some(Self::spawn_sweeper(this));
            tracing::info!(pool = %this.options.name, "worker pool rebooted");
        }
    }

    /// Shared tail of `release` / `release_timeout`, entered exactly once
    /// per Open→Closed transition: stop and join the sweeper, finish every
    /// idle worker, wake all blocked submitters.
    fn teardown(&self) {
        if let Some(sweeper) = self.sweeper.lock().unwrap().take() {
            drop(sweeper.stop);
            let _ = sweeper.thread.join();
        }

        let drained = self.store.lock().unwrap().drain_and_finish_all();
        if drained > 0 {
            self.running.fetch_sub(drained as i32, Ordering::AcqRel);
        }

        {
            let _store = self.store.lock().unwrap();
            self.cond.notify_all();
        }

        tracing::info!(pool = %self.options.name, "worker pool released");
    }

    fn spawn_sweeper(this: &Arc<Self>) -> Sweeper {
        let (stop_tx, stop_rx) = bounded(1);
        let weak = Arc::downgrade(this);
        let interval = this.options.expiry_duration;
        let thread = thread::Builder::new()
            .name(format!("{}-sweeper", this.options.name))
            .spawn(move || run_sweeper(weak, stop_rx, interval))
            .expect("failed to spawn sweeper thread");
        Sweeper {
            stop: stop_tx,
            thread,
        }
    }
}

/// Background reclamation of workers idle past the expiry horizon.
///
/// `recv_timeout` on the stop channel doubles as the ticker: a timeout is
/// a tick, a message or a dropped sender is the stop signal. Shutdown
/// joins this thread, so exits must be prompt.
fn run_sweeper<P: Send + 'static>(pool: Weak<PoolCore<P>>, stop: Receiver<()>, interval: Duration) {
    loop {
        match stop.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {}
            _ => return,
        }

        let Some(core) = pool.upgrade() else {
            return;
        };
        if core.is_closed() {
            return;
        }

        let swept = core.store.lock().unwrap().sweep_expired(interval);
        if swept.is_empty() {
            continue;
        }

        // Log lines stay outside the lock.
        for index in &swept {
            core.options.logger.log(format_args!(
                "worker at index {} expired and will be recycled",
                index
            ));
        }
        core.running.fetch_sub(swept.len() as i32, Ordering::AcqRel);
        tracing::debug!(
            pool = %core.options.name,
            reclaimed = swept.len(),
            "expired workers reclaimed"
        );
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> &str {
    if let Some(message) = cause.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extracts_str_and_string() {
        let cause: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(cause.as_ref()), "boom");

        let cause: Box<dyn Any + Send> = Box::new(String::from("kaput"));
        assert_eq!(panic_message(cause.as_ref()), "kaput");

        let cause: Box<dyn Any + Send> = Box::new(17_i32);
        assert_eq!(panic_message(cause.as_ref()), "opaque panic payload");
    }
}
