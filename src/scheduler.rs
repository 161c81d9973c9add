//! Single-threaded deferred continuations on a virtual clock.
//!
//! The page has exactly two kinds of deferred work: the fade continuation
//! that swaps the viewer image, and the debounced gallery re-scan. Both are
//! queued here as plain values and run by the page when the host lets time
//! pass. Time only moves when the host says so, which makes every delay
//! deterministic under test.
//!
//! Tasks due at the same instant run in scheduling order.

use std::collections::BTreeMap;
use std::time::Duration;

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    due: Duration,
    seq: u64,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `task` to run `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let handle = TaskHandle {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert((handle.due, handle.seq), task);
        handle
    }

    /// Drop a pending task. Returns `false` if it already ran or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.queue.remove(&(handle.due, handle.seq)).is_some()
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.contains_key(&(handle.due, handle.seq))
    }

    /// Remove and return the earliest task due at or before `until`,
    /// moving the clock to its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        self.now = self.now.max(due);
        self.queue.remove(&(due, seq))
    }

    /// Move the clock forward to `time`. The clock never runs backwards.
    pub fn advance_clock(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
