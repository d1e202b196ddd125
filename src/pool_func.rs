//! Function pool: runs typed arguments against a callable bound at
//! construction. Skips the per-task closure allocation the generic pool
//! pays.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Options;
use crate::core::{Dispatch, PoolCore};
use crate::error::PoolResult;

struct BoundFn<A> {
    func: Box<dyn Fn(A) + Send + Sync + 'static>,
}

impl<A: Send + 'static> Dispatch<A> for BoundFn<A> {
    fn dispatch(&self, arg: A) {
        (self.func)(arg);
    }
}

/// A pool whose workers all run the same callable over submitted
/// arguments.
///
/// Shares the generic pool's scheduler, capacity, reuse, and reclamation
/// behaviour; only the payload differs.
///
/// ```rust,ignore
/// use taskpool::PoolWithFunc;
///
/// let pool = PoolWithFunc::new(8, |job: u64| {
///     process(job);
/// })?;
/// pool.invoke(42)?;
/// ```
pub struct PoolWithFunc<A: Send + 'static> {
    core: Arc<PoolCore<A>>,
}

impl<A: Send + 'static> PoolWithFunc<A> {
    /// Create a function pool with default options.
    ///
    /// `size` is the worker capacity; `-1` means unbounded, `0` is
    /// invalid.
    pub fn new<F>(size: i32, func: F) -> PoolResult<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self::with_options(size, func, Options::default())
    }

    /// Create a function pool with explicit [`Options`].
    pub fn with_options<F>(size: i32, func: F, options: Options) -> PoolResult<Self>
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        let dispatcher = BoundFn {
            func: Box::new(func),
        };
        Ok(Self {
            core: PoolCore::new(size, Box::new(dispatcher), options)?,
        })
    }

    /// Run the bound callable with `arg` on a pooled worker.
    ///
    /// Error behaviour matches [`Pool::submit`](crate::Pool::submit).
    pub fn invoke(&self, arg: A) -> PoolResult<()> {
        PoolCore::submit_payload(&self.core, arg)
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

    /// Shut the pool down; see [`Pool::release`](crate::Pool::release).
    pub fn release(&self) {
        self.core.release();
    }

    /// [`release`](PoolWithFunc::release) bounded by `timeout`.
    pub fn release_timeout(&self, timeout: Duration) -> PoolResult<()> {
        PoolCore::release_timeout(&self.core, timeout)
    }

    /// Reopen a released pool. The pool restarts with an empty store.
    pub fn reboot(&self) {
        PoolCore::reboot(&self.core);
    }
}

impl<A: Send + 'static> Drop for PoolWithFunc<A> {
    fn drop(&mut self) {
        self.core.release();
    }
}
