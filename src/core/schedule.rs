//! Scheduled Tasks
//!
//! Virtual-millisecond clock plus a set of pending one-shot tasks. Rounds keep
//! every delayed callback (countdown, spawn cadence, settle delays, target
//! expiry) here, so a single [`Scheduler::teardown`] cancels all of them.
//!
//! Time only moves when the owner calls [`Scheduler::pop_due`] or
//! [`Scheduler::settle_at`]; nothing here reads the system clock.

use std::collections::BTreeMap;

/// Shortest delay a task can be scheduled with.
pub const MIN_DELAY_MS: u64 = 1;

/// Handle to a scheduled task.
///
/// Handles are monotonic for the lifetime of a scheduler, including across
/// teardowns, so a handle from a torn-down round never aliases a new task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

/// Pending one-shot tasks ordered by due time, then by scheduling order.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_handle: u64,
    /// (due_ms, handle) -> task
    queue: BTreeMap<(u64, TaskHandle), T>,
    /// handle -> due_ms, for cancellation by handle
    due: BTreeMap<TaskHandle, u64>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_handle: 0,
            queue: BTreeMap::new(),
            due: BTreeMap::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `task` to fire `delay_ms` after the current time.
    ///
    /// Delays below one millisecond are raised to one, so a task that
    /// reschedules itself always lands strictly in the future.
    pub fn schedule_after(&mut self, delay_ms: u64, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;

        let due_ms = self.now_ms.saturating_add(delay_ms.max(MIN_DELAY_MS));
        self.queue.insert((due_ms, handle), task);
        self.due.insert(handle, due_ms);
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        match self.due.remove(&handle) {
            Some(due_ms) => self.queue.remove(&(due_ms, handle)).is_some(),
            None => false,
        }
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Remove and return the earliest task due at or before `until_ms`.
    ///
    /// The clock moves to the task's due time, so tasks scheduled while
    /// handling it are relative to when it fired.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TaskHandle, T)> {
        let (&(due_ms, handle), _) = self.queue.iter().next()?;
        if due_ms > until_ms {
            return None;
        }

        let task = self.queue.remove(&(due_ms, handle))?;
        self.due.remove(&handle);
        self.now_ms = self.now_ms.max(due_ms);
        Some((handle, task))
    }

    /// Move the clock forward to `until_ms` once all due tasks are drained.
    pub fn settle_at(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Cancel every pending task. Returns how many were cancelled.
    pub fn teardown(&mut self) -> usize {
        let cancelled = self.queue.len();
        self.queue.clear();
        self.due.clear();
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut timers = Scheduler::new();
        timers.schedule_after(700, "revert");
        timers.schedule_after(400, "win");
        timers.schedule_after(400, "tick");

        assert_eq!(timers.pop_due(1000).map(|(_, t)| t), Some("win"));
        assert_eq!(timers.now_ms(), 400);
        // Same due time keeps scheduling order
        assert_eq!(timers.pop_due(1000).map(|(_, t)| t), Some("tick"));
        assert_eq!(timers.pop_due(1000).map(|(_, t)| t), Some("revert"));
        assert_eq!(timers.pop_due(1000), None);
    }

    #[test]
    fn test_pop_due_respects_horizon() {
        let mut timers = Scheduler::new();
        timers.schedule_after(1000, ());

        assert!(timers.pop_due(999).is_none());
        timers.settle_at(999);
        assert_eq!(timers.now_ms(), 999);
        assert!(timers.pop_due(1000).is_some());
    }

    #[test]
    fn test_schedule_is_relative_to_fire_time() {
        let mut timers = Scheduler::new();
        timers.schedule_after(1000, 1);

        let (_, task) = timers.pop_due(5000).unwrap();
        assert_eq!(task, 1);
        timers.schedule_after(1000, 2);

        assert!(timers.pop_due(1999).is_none());
        assert_eq!(timers.pop_due(2000).map(|(_, t)| t), Some(2));
    }

    #[test]
    fn test_zero_delay_lands_in_the_future() {
        let mut timers = Scheduler::new();
        timers.schedule_after(0, 0u32);

        // A task that keeps rescheduling itself with no delay must not
        // starve the drain loop.
        let mut fired = 0;
        while let Some((_, n)) = timers.pop_due(5) {
            fired += 1;
            timers.schedule_after(0, n + 1);
        }
        assert_eq!(fired, 5);
        assert_eq!(timers.now_ms(), 5);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut timers = Scheduler::new();
        let a = timers.schedule_after(10, 'a');
        let b = timers.schedule_after(20, 'b');

        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pop_due(100), Some((b, 'b')));
        assert!(!timers.cancel(b));
    }

    #[test]
    fn test_teardown_keeps_handles_monotonic() {
        let mut timers = Scheduler::new();
        let old = timers.schedule_after(10, ());
        timers.schedule_after(20, ());

        assert_eq!(timers.teardown(), 2);
        assert!(timers.is_empty());

        let fresh = timers.schedule_after(10, ());
        assert!(fresh > old);
        assert!(!timers.cancel(old));
        assert!(timers.cancel(fresh));
    }
}
