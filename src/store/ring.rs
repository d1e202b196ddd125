//! FIFO idle-worker store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::worker::Worker;

/// Fixed-size ring buffer of idle workers, sized to the pool capacity.
/// `full` distinguishes a full ring from an empty one when `head == tail`.
/// Workers enter at `tail` in chronological order and leave at `head`, so
/// the expiry sweep can stop at the first fresh worker.
pub(crate) struct WorkerRing<P> {
    items: Vec<Option<Arc<Worker<P>>>>,
    head: usize,
    tail: usize,
    full: bool,
}

impl<P> WorkerRing<P> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            items: vec![None; capacity],
            head: 0,
            tail: 0,
            full: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        if self.full {
            self.items.len()
        } else if self.tail >= self.head {
            self.tail - self.head
        } else {
            self.items.len() - self.head + self.tail
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.head == self.tail && !self.full
    }

    /// Insert at `tail`; a full ring refuses and hands the worker back.
    pub(crate) fn push(&mut self, worker: Arc<Worker<P>>) -> Result<(), Arc<Worker<P>>> {
        if self.full {
            return Err(worker);
        }

        self.items[self.tail] = Some(worker);
        self.tail = (self.tail + 1) % self.items.len();
        if self.tail == self.head {
            self.full = true;
        }
        Ok(())
    }

    /// Remove at `head`, vacating the slot.
    pub(crate) fn pop(&mut self) -> Option<Arc<Worker<P>>> {
        if self.is_empty() {
            return None;
        }

        let worker = self.items[self.head].take();
        self.head = (self.head + 1) % self.items.len();
        self.full = false;
        worker
    }

    /// Walk from `head`, reclaiming expired workers until the first fresh
    /// one; returns the physical indices of the vacated slots.
    pub(crate) fn sweep_expired(&mut self, horizon: Duration) -> Vec<usize> {
        let Some(deadline) = Instant::now().checked_sub(horizon) else {
            return Vec::new();
        };

        let mut indices = Vec::new();
        while !self.is_empty() {
            match self.items[self.head].take() {
                Some(worker) if worker.last_used() < deadline => {
                    worker.finish();
                    indices.push(self.head);
                    self.head = (self.head + 1) % self.items.len();
                    self.full = false;
                }
                Some(worker) => {
                    self.items[self.head] = Some(worker);
                    break;
                }
                None => break,
            }
        }
        indices
    }

    pub(crate) fn drain_and_finish_all(&mut self) -> usize {
        let mut drained = 0;
        for slot in &mut self.items {
            if let Some(worker) = slot.take() {
                worker.finish();
                drained += 1;
            }
        }
        self.head = 0;
        self.tail = 0;
        self.full = false;
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
    fn test_pop_is_fifo() {
        let mut ring: WorkerRing<()> = WorkerRing::new(4);
        let first = Worker::detached();
        let second = Worker::detached();
        ring.push(Arc::clone(&first)).unwrap();
        ring.push(Arc::clone(&second)).unwrap();

        assert!(Arc::ptr_eq(&ring.pop().unwrap(), &first));
        assert!(Arc::ptr_eq(&ring.pop().unwrap(), &second));
        assert!(ring.pop().is_none());
    }

    #[test]
    fn test_full_ring_refuses_push() {
        let mut ring: WorkerRing<()> = WorkerRing::new(2);
        ring.push(Worker::detached()).unwrap();
        ring.push(Worker::detached()).unwrap();
        assert_eq!(ring.len(), 2);
        assert!(ring.push(Worker::detached()).is_err());
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let mut ring: WorkerRing<()> = WorkerRing::new(2);
        ring.push(Worker::detached()).unwrap();
        ring.push(Worker::detached()).unwrap();
        ring.pop();

        let third = Worker::detached();
        ring.push(Arc::clone(&third)).unwrap();
        assert_eq!(ring.len(), 2);

        ring.pop();
        assert!(Arc::ptr_eq(&ring.pop().unwrap(), &third));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_sweep_stops_at_first_fresh_worker() {
        let mut ring: WorkerRing<()> = WorkerRing::new(4);
        let old = backdated(Duration::from_millis(80));
        ring.push(Arc::clone(&old)).unwrap();
        let fresh = Worker::detached();
        ring.push(Arc::clone(&fresh)).unwrap();

        let swept = ring.sweep_expired(Duration::from_millis(20));
        assert_eq!(swept, vec![0]);
        assert!(old.is_recycled());
        assert!(!fresh.is_recycled());
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_sweep_wraps_past_array_end() {
        let mut ring: WorkerRing<()> = WorkerRing::new(2);
        ring.push(backdated(Duration::from_millis(90))).unwrap();
        ring.push(backdated(Duration::from_millis(80))).unwrap();
        ring.pop();
        ring.push(backdated(Duration::from_millis(70))).unwrap();

        // Occupied slots are now physical indices 1 then 0.
        let swept = ring.sweep_expired(Duration::from_millis(20));
        assert_eq!(swept, vec![1, 0]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_drain_finishes_everything() {
        let mut ring: WorkerRing<()> = WorkerRing::new(3);
        let first = Worker::detached();
        let second = Worker::detached();
        ring.push(Arc::clone(&first)).unwrap();
        ring.push(Arc::clone(&second)).unwrap();

        assert_eq!(ring.drain_and_finish_all(), 2);
        assert!(ring.is_empty());
        assert!(first.is_recycled());
        assert!(second.is_recycled());
        assert!(ring.push(Worker::detached()).is_ok());
    }
}
