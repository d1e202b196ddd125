//! Generic pool: runs ad-hoc callables.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Options;
use crate::core::{Dispatch, PoolCore};
use crate::error::PoolResult;
use crate::future::TaskFuture;

/// Boxed work item for the generic pool.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

struct TaskDispatch;

impl Dispatch<Task> for TaskDispatch {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// A pool of worker threads running arbitrary callables.
///
/// The pool caps the number of live workers at its capacity, parks idle
/// workers for reuse, and reclaims workers left idle past the configured
/// expiry horizon. Dropping the last handle releases the pool.
///
/// ```rust,ignore
/// use taskpool::Pool;
///
/// let pool = Pool::new(10)?;
/// pool.submit(|| println!("ran on a pooled worker"))?;
///
/// let future = pool.submit_with_result(|| 2 + 2)?;
/// assert_eq!(future.get(), 4);
/// ```
pub struct Pool {
    core: Arc<PoolCore<Task>>,
}

impl Pool {
    /// Create a pool with default options.
    ///
    /// `size` is the worker capacity; `-1` means unbounded, `0` is
    /// invalid.
    pub fn new(size: i32) -> PoolResult<Self> {
        Self::with_options(size, Options::default())
    }

    /// Create a pool with explicit [`Options`].
    pub fn with_options(size: i32, options: Options) -> PoolResult<Self> {
        Ok(Self {
            core: PoolCore::new(size, Box::new(TaskDispatch), options)?,
        })
    }

    /// Run `task` on a pooled worker.
    ///
    /// Returns [`Closed`](crate::PoolError::Closed) after the pool is
    /// released, and [`Overload`](crate::PoolError::Overload) when the
    /// pool is saturated in non-blocking mode; otherwise blocks until a
    /// worker frees up.
    pub fn submit<F>(&self, task: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        PoolCore::submit_payload(&self.core, Box::new(task))
    }

    /// Run `task` on a pooled worker and obtain its result through a
    /// [`TaskFuture`].
    ///
    /// If the task panics, the future never completes; observe it with
    /// [`TaskFuture::get_with_timeout`] when that matters.
    pub fn submit_with_result<R, F>(&self, task: F) -> PoolResult<TaskFuture<R>>
    where
        R: Clone + Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let future = TaskFuture::new();
        let resolver = future.clone();
        PoolCore::submit_payload(
            &self.core,
            Box::new(move || {
                resolver.set_result(task());
            }),
        )?;
        Ok(future)
    }

    /// Number of live workers.
    pub fn running(&self) -> i32 {
        self.core.running()
    }

    /// Number of idle workers parked in the store.
    pub fn free(&self) -> usize {
        self.core.free()
    }

    /// Worker capacity (`-1` = unbounded).
    pub fn capacity(&self) -> i32 {
        self.core.capacity()
    }

    /// Number of submitters currently blocked waiting for a worker.
    pub fn waiting(&self) -> i32 {
        self.core.waiting()
    }

    /// Whether the pool has been released.
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Shut the pool down: stop the sweeper, finish every idle worker,
    /// and wake blocked submitters. Idempotent. In-flight tasks run to
    /// completion.
    pub fn release(&self) {
        self.core.release();
    }

    /// [`release`](Pool::release) bounded by `timeout`; on expiry the
    /// teardown continues in the background and `Timeout` is returned.
    pub fn release_timeout(&self, timeout: Duration) -> PoolResult<()> {
        PoolCore::release_timeout(&self.core, timeout)
    }

    /// Reopen a released pool. The pool restarts with an empty store.
    pub fn reboot(&self) {
        PoolCore::reboot(&self.core);
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.core.release();
    }
}
