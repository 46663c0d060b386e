//! Virtual-time scheduler for deterministic tests
//!
//! Tasks are queued against a simulated clock that only moves when
//! [`VirtualScheduler::advance`] is called. This gives exact control over tick
//! boundaries:
//!
//! - Nothing runs inside `schedule`, not even zero-delay tasks
//! - Due tasks run in deadline order, ties broken by registration order
//! - Tasks scheduled while advancing run in the same call if they fall due in time
//!
//! # Example
//!
//! ```rust
//! use deferred::{Scheduler, VirtualScheduler};
//! use std::time::Duration;
//!
//! let clock = VirtualScheduler::new();
//! clock.schedule(Duration::from_millis(200), Box::new(|| println!("fired"))).unwrap();
//!
//! assert_eq!(clock.advance(Duration::from_millis(199)), 0);
//! assert_eq!(clock.advance(Duration::from_millis(1)), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tracing::trace;

use super::{Scheduler, Task};
use crate::Result;

/// A queued task in virtual time
struct PendingTask {
    deadline: Duration,
    id: u64,
    task: Task,
}

impl Eq for PendingTask {}

impl PartialEq for PendingTask {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Ord for PendingTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: earliest deadline first, then lowest id
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for PendingTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    queue: BinaryHeap<PendingTask>,
}

impl ClockState {
    fn pop_due(&mut self, target: Duration) -> Option<PendingTask> {
        if self.queue.peek()?.deadline > target {
            return None;
        }
        let entry = self.queue.pop()?;
        self.now = self.now.max(entry.deadline);
        Some(entry)
    }
}

/// Scheduler driven by a simulated clock
///
/// Cloning shares the same clock and queue.
#[derive(Clone, Default)]
pub struct VirtualScheduler {
    state: Arc<Mutex<ClockState>>,
}

impl fmt::Debug for VirtualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("VirtualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}

impl VirtualScheduler {
    /// Create a clock at time zero with nothing queued
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of tasks waiting to fire
    pub fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Deadline of the earliest queued task
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.lock().queue.peek().map(|entry| entry.deadline)
    }

    /// Move the clock forward by `by`, running every task that falls due
    ///
    /// Returns the number of tasks run. `advance(Duration::ZERO)` runs the tasks
    /// scheduled with no delay. A panicking task propagates out of this call.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.advance_to(target)
    }

    /// Move the clock forward to `target` (no-op for times already passed)
    pub fn advance_to(&self, target: Duration) -> usize {
        let mut fired = 0;
        loop {
            // The lock is released before the task runs so it can schedule more work.
            let Some(entry) = self.state.lock().pop_due(target) else {
                break;
            };
            trace!(deadline = ?entry.deadline, id = entry.id, "virtual task firing");
            (entry.task)();
            fired += 1;
        }

        let mut state = self.state.lock();
        state.now = state.now.max(target);
        fired
    }

    /// Run queued tasks until none remain, jumping the clock to each deadline
    ///
    /// Tasks that keep rescheduling themselves will keep this looping.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            fired += self.advance_to(deadline);
        }
        fired
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<()> {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now.saturating_add(delay);
        state.queue.push(PendingTask { deadline, id, task });
        Ok(())
    }
}
