//! Batch mapping with deferred delivery
//!
//! The mapping function runs synchronously over every input element, in order. Only
//! delivery of the aggregated [`BatchOutcome`] is deferred, so the callback never runs
//! inside the initiating call, not even for an empty batch.

use std::convert::Infallible;
use rand::Rng;
use tracing::{debug, instrument};

use crate::defer::call::{thread_local_deferrer, Deferrer};
use crate::defer::types::{BatchOutcome, Continuation, ItemOutcome};
use crate::delay::DelaySpec;
use crate::scheduler::Scheduler;
use crate::Result;

/// Map `f` over `items` and collect index-aligned errors and results
///
/// `f` may return an [`ItemOutcome`] or an `(error, result)` pair. `errors` is `None`
/// unless at least one element reported an error. A panic in `f` propagates to the
/// caller.
pub fn aggregate<I, T, R, E, O, F>(items: I, mut f: F) -> BatchOutcome<R, E>
where
    I: IntoIterator<Item = T>,
    O: Into<ItemOutcome<R, E>>,
    F: FnMut(T) -> O,
{
    let items = items.into_iter();
    let (capacity, _) = items.size_hint();
    let mut errors = Vec::with_capacity(capacity);
    let mut results = Vec::with_capacity(capacity);
    let mut any_failed = false;

    for item in items {
        let ItemOutcome { error, result } = f(item).into();
        any_failed |= error.is_some();
        errors.push(error);
        results.push(result);
    }

    BatchOutcome {
        errors: any_failed.then_some(errors),
        results,
    }
}

impl<S: Scheduler, R: Rng> Deferrer<S, R> {
    /// Map `f` over `items` now and deliver the aggregate to `callback` after `delay`
    ///
    /// # Errors
    ///
    /// Only if the scheduler refuses the delivery task.
    #[instrument(skip_all)]
    pub fn call_async_for<I, T, V, E, O, F, C>(
        &self,
        items: I,
        f: F,
        delay: impl Into<DelaySpec>,
        callback: C,
    ) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        O: Into<ItemOutcome<V, E>>,
        F: FnMut(T) -> O,
        V: Send + 'static,
        E: Send + 'static,
        C: FnOnce(BatchOutcome<V, E>) + Send + 'static,
    {
        let outcome = aggregate(items, f);
        debug!(
            items = outcome.len(),
            failed = outcome.failed_count(),
            "batch mapped, deferring delivery"
        );

        self.call_async(
            |outcome: BatchOutcome<V, E>, done: Continuation<BatchOutcome<V, E>, Infallible>| {
                done(Ok(outcome))
            },
            delay,
            outcome,
            move |delivered| match delivered {
                Ok(outcome) => callback(outcome),
                Err(never) => match never {},
            },
        )
    }
}

/// Map `f` over `items` now and deliver the aggregate after `delay` on the current Tokio runtime
///
/// # Errors
///
/// [`DeferError::NoRuntime`](crate::DeferError::NoRuntime) when called outside a Tokio runtime.
/// In that case `f` has not been applied.
pub fn call_async_for<I, T, V, E, O, F, C>(
    items: I,
    f: F,
    delay: impl Into<DelaySpec>,
    callback: C,
) -> Result<()>
where
    I: IntoIterator<Item = T>,
    O: Into<ItemOutcome<V, E>>,
    F: FnMut(T) -> O,
    V: Send + 'static,
    E: Send + 'static,
    C: FnOnce(BatchOutcome<V, E>) + Send + 'static,
{
    thread_local_deferrer()?.call_async_for(items, f, delay, callback)
}
