//! # Deferred Call
//!
//! A small deferred-execution layer for callback-style asynchronous code.
//!
//! ## Overview
//!
//! Two primitives are provided:
//!
//! - **Deferred invocation**: run a callback-style function after a delay that is either
//!   fixed or drawn from a bounded range. The function is never invoked before control
//!   returns to the caller, even when the delay is zero.
//! - **Batch mapping**: apply a function synchronously to every element of a collection,
//!   collect index-aligned `(error, result)` pairs, and deliver the aggregate through a
//!   deferred invocation.
//!
//! ## Quick Start
//!
//! ```rust
//! use deferred::{call_async, Continuation};
//! use std::convert::Infallible;
//!
//! # async fn example() -> deferred::Result<()> {
//! let (tx, rx) = tokio::sync::oneshot::channel();
//!
//! call_async(
//!     |(a, b): (i32, i32), done: Continuation<i32, Infallible>| done(Ok(a * b)),
//!     (100.0, 200.0),
//!     (2, 5),
//!     move |answer| {
//!         let _ = tx.send(answer);
//!     },
//! )?;
//!
//! assert_eq!(rx.await.ok(), Some(Ok(10)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`delay`]: delay specifications and their resolution into concrete durations
//! - [`scheduler`]: the one-shot scheduling primitive (Tokio and virtual clock)
//! - [`defer`]: deferred invocation and batch mapping
//! - [`telemetry`]: tracing subscriber setup

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for deferred-call operations
pub type Result<T> = std::result::Result<T, DeferError>;

/// Main error type for deferred-call operations
#[derive(Error, Debug)]
pub enum DeferError {
    /// The Tokio scheduler was requested outside of a Tokio runtime
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),

    /// A textual delay specification could not be parsed
    #[error("Invalid delay specification: {0}")]
    InvalidDelaySpec(#[from] delay::DelaySpecError),

    /// Configuration could not be deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Delay specifications and resolution
pub mod delay;

/// One-shot task scheduling
pub mod scheduler;

/// Deferred invocation and batch mapping
pub mod defer;

/// Tracing subscriber setup
pub mod telemetry;

pub use defer::{
    aggregate, call_async, call_async_for, BatchOutcome, Continuation, DeferConfig, Deferrer,
    ItemOutcome,
};
pub use delay::{resolve_delay, DelayResolver, DelaySpec};
pub use scheduler::{Scheduler, Task, TokioScheduler, VirtualScheduler};
