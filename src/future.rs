//! One-shot result cell for submissions with a return value.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::{PoolError, PoolResult};

struct Shared<T> {
    cell: Mutex<Option<T>>,
    latch: Condvar,
    completed: AtomicBool,
}

/// Handle to the eventual result of a task submitted with
/// [`Pool::submit_with_result`](crate::Pool::submit_with_result).
///
/// The result is set exactly once; every observer sees the same outcome,
/// and observation after completion returns immediately. Tasks that can
/// fail should return a `Result` as their value.
///
/// # Caveat
///
/// If the producing task panics, the result is never set and [`get`]
/// blocks forever. Use [`get_with_timeout`] when the task is not trusted
/// to complete.
///
/// [`get`]: TaskFuture::get
/// [`get_with_timeout`]: TaskFuture::get_with_timeout
pub struct TaskFuture<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone> TaskFuture<T> {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                cell: Mutex::new(None),
                latch: Condvar::new(),
                completed: AtomicBool::new(false),
            }),
        }
    }

    /// Block until the task completes and return its value.
    ///
    /// Repeated calls return the same value. See the type-level caveat
    /// about panicking producers.
    pub fn get(&self) -> T {
        let mut cell = self.shared.cell.lock().unwrap();
        while cell.is_none() {
            cell = self.shared.latch.wait(cell).unwrap();
        }
        cell.as_ref().unwrap().clone()
    }

    /// Wait up to `timeout` for the task to complete.
    ///
    /// Returns [`PoolError::Timeout`] if the deadline passes first; later
    /// calls may still succeed once the task finishes.
    pub fn get_with_timeout(&self, timeout: Duration) -> PoolResult<T> {
        let deadline = Instant::now() + timeout;
        let mut cell = self.shared.cell.lock().unwrap();
        while cell.is_none() {
            let now = Instant::now();
            if now >= deadline {
                return Err(PoolError::Timeout);
            }
            let (guard, _) = self
                .shared
                .latch
                .wait_timeout(cell, deadline - now)
                .unwrap();
            cell = guard;
        }
        Ok(cell.as_ref().unwrap().clone())
    }

    /// Whether the task has completed. Never blocks.
    pub fn is_done(&self) -> bool {
        self.shared.completed.load(Ordering::Acquire)
    }

    /// Store the result and release every observer. Only the first call
    /// has any effect.
    pub(crate) fn set_result(&self, value: T) {
        let mut cell = self.shared.cell.lock().unwrap();
        if cell.is_some() {
            return;
        }
        *cell = Some(value);
        self.shared.completed.store(true, Ordering::Release);
        self.shared.latch.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_returns_stored_value() {
        let future = TaskFuture::new();
        future.set_result(42);
        assert_eq!(future.get(), 42);
        assert_eq!(future.get(), 42);
        assert!(future.is_done());
    }

    #[test]
    fn test_set_result_is_idempotent() {
        let future = TaskFuture::new();
        future.set_result("first");
        future.set_result("second");
        assert_eq!(future.get(), "first");
    }

    #[test]
    fn test_get_blocks_until_set() {
        let future = TaskFuture::new();
        let producer = future.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.set_result(7);
        });
        assert_eq!(future.get(), 7);
        handle.join().unwrap();
    }

    #[test]
    fn test_get_with_timeout_expires() {
        let future: TaskFuture<i32> = TaskFuture::new();
        let err = future
            .get_with_timeout(Duration::from_millis(20))
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(!future.is_done());
    }

    #[test]
    fn test_get_with_timeout_succeeds_after_set() {
        let future = TaskFuture::new();
        let producer = future.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            producer.set_result("done");
        });
        assert_eq!(
            future.get_with_timeout(Duration::from_millis(500)).unwrap(),
            "done"
        );
    }

    #[test]
    fn test_many_observers_see_same_outcome() {
        let future = TaskFuture::new();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let observer = future.clone();
            handles.push(thread::spawn(move || observer.get()));
        }
        future.set_result(11);
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 11);
        }
    }
}
