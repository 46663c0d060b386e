//! Tokio-backed scheduler

use std::time::Duration;
use tokio::runtime::Handle;
use tracing::trace;

use super::{Scheduler, Task};
use crate::{DeferError, Result};

/// Schedules tasks as spawned Tokio tasks
///
/// A spawned task is never polled inside `spawn`, so even a zero delay crosses at least
/// one scheduling boundary. A panic inside the task stays inside that Tokio task.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Bind to the runtime of the calling context
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| DeferError::NoRuntime(e.to_string()))?;
        Ok(Self { handle })
    }

    /// Bind to an explicit runtime handle
    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Result<()> {
        self.handle.spawn(async move {
            if delay.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(delay).await;
            }
            trace!(?delay, "deferred task firing");
            task();
        });
        Ok(())
    }
}
