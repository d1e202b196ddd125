//! Idle-worker stores.
//!
//! Two interchangeable containers hold workers between tasks. Small and
//! unbounded pools use a LIFO stack so the most-recently-used worker (the
//! one warmest in cache) goes back out first; large bounded pools use a
//! FIFO ring buffer sized to the pool, whose full condition doubles as
//! the overload signal. The scheduler never depends on which is in use.

mod ring;
mod stack;

pub(crate) use ring::WorkerRing;
pub(crate) use stack::WorkerStack;

use std::sync::Arc;
use std::time::Duration;

use crate::worker::Worker;

/// Bounded capacities at or above this use the ring store.
const STORE_SIZE_THRESHOLD: i32 = 1000;

pub(crate) enum IdleStore<P> {
    Stack(WorkerStack<P>),
    Ring(WorkerRing<P>),
}

impl<P> IdleStore<P> {
    /// Choose a store implementation for the given pool capacity.
    pub(crate) fn select(capacity: i32, pre_alloc: bool) -> Self {
        if capacity >= STORE_SIZE_THRESHOLD {
            IdleStore::Ring(WorkerRing::new(capacity as usize))
        } else if pre_alloc && capacity > 0 {
            IdleStore::Stack(WorkerStack::with_capacity(capacity as usize))
        } else {
            IdleStore::Stack(WorkerStack::new())
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            IdleStore::Stack(stack) => stack.len(),
            IdleStore::Ring(ring) => ring.len(),
        }
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert an idle worker. The ring refuses when every slot is taken;
    /// the handle is returned to the caller.
    pub(crate) fn push(&mut self, worker: Arc<Worker<P>>) -> Result<(), Arc<Worker<P>>> {
        match self {
            IdleStore::Stack(stack) => {
                stack.push(worker);
                Ok(())
            }
            IdleStore::Ring(ring) => ring.push(worker),
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Arc<Worker<P>>> {
        match self {
            IdleStore::Stack(stack) => stack.pop(),
            IdleStore::Ring(ring) => ring.pop(),
        }
    }

    /// Finish and remove every worker idle longer than `horizon`,
    /// returning the indices of the reclaimed slots.
    pub(crate) fn sweep_expired(&mut self, horizon: Duration) -> Vec<usize> {
        match self {
            IdleStore::Stack(stack) => stack.sweep_expired(horizon),
            IdleStore::Ring(ring) => ring.sweep_expired(horizon),
        }
    }

    /// Finish every worker and empty the store; returns how many were
    /// drained.
    pub(crate) fn drain_and_finish_all(&mut self) -> usize {
        match self {
            IdleStore::Stack(stack) => stack.drain_and_finish_all(),
            IdleStore::Ring(ring) => ring.drain_and_finish_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Store = IdleStore<()>;

    #[test]
    fn test_small_capacity_selects_stack() {
        assert!(matches!(Store::select(1, false), IdleStore::Stack(_)));
        assert!(matches!(Store::select(999, false), IdleStore::Stack(_)));
    }

    #[test]
    fn test_unbounded_selects_stack() {
        assert!(matches!(Store::select(-1, false), IdleStore::Stack(_)));
        assert!(matches!(Store::select(-1, true), IdleStore::Stack(_)));
    }

    #[test]
    fn test_threshold_selects_ring() {
        assert!(matches!(Store::select(1000, false), IdleStore::Ring(_)));
        assert!(matches!(Store::select(5000, true), IdleStore::Ring(_)));
    }
}
