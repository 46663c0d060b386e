//! Deferred calls and batch mapping
//!
//! [`Deferrer`] pairs a [`Scheduler`](crate::Scheduler) with a delay resolver. Every
//! result reaches its callback from a scheduled task, never synchronously.

pub mod batch;
pub mod call;
pub mod types;

pub use batch::*;
pub use call::*;
pub use types::*;
