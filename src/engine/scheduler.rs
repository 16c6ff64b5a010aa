use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use crate::foundation::core::Millis;

/// Handle of a scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct TimerId(u64);

/// A callback whose time has come.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fired<T> {
    /// Handle returned by [`TimerQueue::schedule`].
    pub id: TimerId,
    /// Instant the callback was due.
    pub due: Millis,
    /// Scheduled payload.
    pub task: T,
}

/// Deterministic delayed-callback queue on a virtual monotonic clock.
///
/// Ordering rule: callbacks fire by due instant; ties fire in registration order. Cancelled
/// entries are dropped lazily when they reach the front.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Millis,
    next_seq: u64,
    heap: BinaryHeap<Reverse<(Millis, u64)>>,
    tasks: BTreeMap<u64, T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Empty queue at instant zero.
    pub fn new() -> Self {
        Self {
            now: Millis::ZERO,
            next_seq: 0,
            heap: BinaryHeap::new(),
            tasks: BTreeMap::new(),
        }
    }

    /// Current virtual instant.
    pub fn now(&self) -> Millis {
        self.now
    }

    /// Schedule `task` to fire `delay` after now.
    pub fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse((self.now.saturating_add(delay), seq)));
        self.tasks.insert(seq, task);
        TimerId(seq)
    }

    /// Cancel a pending callback. Cancelling a fired or unknown handle is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.tasks.remove(&id.0).is_some()
    }

    /// Cancel everything still pending. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tasks.len();
        self.tasks.clear();
        self.heap.clear();
        n
    }

    /// Number of callbacks still pending.
    pub fn pending_len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.contains_key(&id.0)
    }

    /// Due instant of the earliest pending callback.
    pub fn next_due(&mut self) -> Option<Millis> {
        self.prune();
        self.heap.peek().map(|Reverse((due, _))| *due)
    }

    /// Pop the earliest callback due at or before `until`, moving the clock to its due instant.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        self.prune();
        let Reverse((due, seq)) = *self.heap.peek()?;
        if due > until {
            return None;
        }
        self.heap.pop();
        let task = self.tasks.remove(&seq)?;
        self.now = self.now.max(due);
        Some(Fired {
            id: TimerId(seq),
            due,
            task,
        })
    }

    /// Move the clock forward to `to` (never backwards) without firing anything.
    pub fn set_now(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }

    fn prune(&mut self) {
        while let Some(Reverse((_, seq))) = self.heap.peek() {
            if self.tasks.contains_key(seq) {
                break;
            }
            self.heap.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scheduler.rs"]
mod tests;
