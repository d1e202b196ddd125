//! LIFO idle-worker store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::worker::Worker;

/// Growable stack of idle workers. Pushes append with the current time
/// and pops take the newest, so the live sequence is always oldest-first
/// from index zero; the expiry sweep leans on that order.
pub(crate) struct WorkerStack<P> {
    items: Vec<Arc<Worker<P>>>,
}

impl<P> WorkerStack<P> {
    pub(crate) fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn push(&mut self, worker: Arc<Worker<P>>) {
        self.items.push(worker);
    }

    pub(crate) fn pop(&mut self) -> Option<Arc<Worker<P>>> {
        self.items.pop()
    }

    /// Reclaim every worker whose `last_used` is older than `horizon` in
    /// one batch from the front of the stack.
    pub(crate) fn sweep_expired(&mut self, horizon: Duration) -> Vec<usize> {
        let Some(deadline) = Instant::now().checked_sub(horizon) else {
            return Vec::new();
        };

        // Oldest-first order: everything before the first fresh worker
        // has expired.
        let expired = self
            .items
            .iter()
            .position(|worker| worker.last_used() >= deadline)
            .unwrap_or(self.items.len());
        if expired == 0 {
            return Vec::new();
        }

        for worker in self.items.drain(..expired) {
            worker.finish();
        }
        (0..expired).collect()
    }

    pub(crate) fn drain_and_finish_all(&mut self) -> usize {
        let drained = self.items.len();
        for worker in self.items.drain(..) {
            worker.finish();
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backdated(age: Duration) -> Arc<Worker<()>> {
        let worker = Worker::detached();
        if let Some(at) = Instant::now().checked_sub(age) {
            worker.set_last_used(at);
        }
        worker
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        let first = Worker::detached();
        let second = Worker::detached();
        stack.push(Arc::clone(&first));
        stack.push(Arc::clone(&second));

        assert!(Arc::ptr_eq(&stack.pop().unwrap(), &second));
        assert!(Arc::ptr_eq(&stack.pop().unwrap(), &first));
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_pop_vacates_slot() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        stack.push(Worker::detached());
        stack.pop();
        assert_eq!(stack.len(), 0);
    }

    #[test]
    fn test_sweep_reclaims_only_expired_prefix() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        stack.push(backdated(Duration::from_millis(80)));
        stack.push(backdated(Duration::from_millis(60)));
        let fresh = Worker::detached();
        stack.push(Arc::clone(&fresh));

        let swept = stack.sweep_expired(Duration::from_millis(20));
        assert_eq!(swept, vec![0, 1]);
        assert_eq!(stack.len(), 1);
        assert!(Arc::ptr_eq(&stack.pop().unwrap(), &fresh));
    }

    #[test]
    fn test_swept_workers_are_finished() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        let old = backdated(Duration::from_millis(50));
        stack.push(Arc::clone(&old));

        stack.sweep_expired(Duration::from_millis(10));
        assert!(old.is_recycled());
    }

    #[test]
    fn test_sweep_with_nothing_expired() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        stack.push(Worker::detached());
        assert!(stack.sweep_expired(Duration::from_secs(60)).is_empty());
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_drain_finishes_everything() {
        let mut stack: WorkerStack<()> = WorkerStack::new();
        let first = Worker::detached();
        let second = Worker::detached();
        stack.push(Arc::clone(&first));
        stack.push(Arc::clone(&second));

        assert_eq!(stack.drain_and_finish_all(), 2);
        assert_eq!(stack.len(), 0);
        assert!(first.is_recycled());
        assert!(second.is_recycled());
    }
}
