//! One-shot task scheduling
//!
//! A [`Scheduler`] runs a task once, after at least the requested delay has elapsed.
//! Implementations must never run the task synchronously inside
//! [`Scheduler::schedule`]: callers rely on control returning to them first.

use std::time::Duration;

use crate::Result;

pub mod runtime;
pub mod virtual_clock;

pub use runtime::*;
pub use virtual_clock::*;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Host-provided "run this after at least D" primitive
pub trait Scheduler: Send + Sync {
    /// Register `task` to run once after `delay`
    ///
    /// Each call registers an independent task. There is no cancellation.
    fn schedule(&self, delay: Duration, task: Task) -> Result<()>;
}

impl<S: Scheduler + ?Sized> Scheduler for std::sync::Arc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> Result<()> {
        (**self).schedule(delay, task)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for &S {
    fn schedule(&self, delay: Duration, task: Task) -> Result<()> {
        (**self).schedule(delay, task)
    }
}
