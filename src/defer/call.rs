//! Deferred invocation of callback-style functions
//!
//! A deferred function receives its arguments and a [`Continuation`]. Whatever it
//! passes to the continuation reaches the caller's callback unchanged. The function
//! itself always runs from a scheduled task, never inside the initiating call.

use std::time::Duration;
use parking_lot::Mutex;
use rand::rngs::{StdRng, ThreadRng};
use rand::Rng;
use tracing::{debug, instrument};

use crate::defer::types::{Continuation, DeferConfig};
use crate::delay::{to_duration, DelayResolver, DelaySpec};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::Result;

/// Runs callback-style functions and batch mappings after a resolved delay
///
/// Holds no per-call state: every call resolves its own delay and registers its own
/// task with the scheduler.
#[derive(Debug)]
pub struct Deferrer<S = TokioScheduler, R = StdRng> {
    scheduler: S,
    resolver: Mutex<DelayResolver<R>>,
    config: DeferConfig,
}

impl Deferrer<TokioScheduler, StdRng> {
    /// Deferrer on the current Tokio runtime with default configuration
    pub fn tokio() -> Result<Self> {
        Ok(Self::new(TokioScheduler::current()?))
    }
}

impl<S: Scheduler> Deferrer<S, StdRng> {
    /// Create a deferrer with default configuration
    pub fn new(scheduler: S) -> Self {
        Self::with_config(scheduler, DeferConfig::default())
    }

    /// Create a deferrer; a configured seed makes range draws reproducible
    pub fn with_config(scheduler: S, config: DeferConfig) -> Self {
        let resolver = match config.seed {
            Some(seed) => DelayResolver::seeded(seed),
            None => DelayResolver::new(),
        };
        Self::with_resolver(scheduler, resolver, config)
    }
}

impl<S: Scheduler, R: Rng> Deferrer<S, R> {
    /// Create a deferrer around an explicit resolver
    pub fn with_resolver(scheduler: S, resolver: DelayResolver<R>, config: DeferConfig) -> Self {
        Self {
            scheduler,
            resolver: Mutex::new(resolver),
            config,
        }
    }

    /// The underlying scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The active configuration
    pub fn config(&self) -> &DeferConfig {
        &self.config
    }

    /// Resolve a delay specification into the duration a call would wait
    pub fn resolve(&self, delay: impl Into<DelaySpec>) -> Duration {
        let units = self.resolver.lock().resolve(delay);
        to_duration(units, self.config.time_unit)
    }

    /// Invoke `f(args, continuation)` after the resolved delay
    ///
    /// The value `f` passes to its continuation is handed to `callback` as-is.
    /// `f` never runs before this method returns, even for a zero delay. Panics in
    /// `f` are not caught and surface wherever the scheduler runs the task.
    ///
    /// # Errors
    ///
    /// Only if the scheduler refuses the task.
    #[instrument(skip_all)]
    pub fn call_async<A, T, E, F, C>(
        &self,
        f: F,
        delay: impl Into<DelaySpec>,
        args: A,
        callback: C,
    ) -> Result<()>
    where
        A: Send + 'static,
        T: 'static,
        E: 'static,
        F: FnOnce(A, Continuation<T, E>) + Send + 'static,
        C: FnOnce(std::result::Result<T, E>) + Send + 'static,
    {
        let spec = delay.into();
        let wait = self.resolve(spec);
        debug!(%spec, ?wait, "scheduling deferred call");

        self.scheduler.schedule(
            wait,
            Box::new(move || {
                let continuation: Continuation<T, E> = Box::new(callback);
                f(args, continuation)
            }),
        )
    }
}

/// Invoke `f(args, continuation)` after `delay` on the current Tokio runtime
///
/// Delays are in milliseconds; range draws use the thread-local random source.
///
/// # Errors
///
/// [`DeferError::NoRuntime`](crate::DeferError::NoRuntime) when called outside a Tokio runtime.
pub fn call_async<A, T, E, F, C>(
    f: F,
    delay: impl Into<DelaySpec>,
    args: A,
    callback: C,
) -> Result<()>
where
    A: Send + 'static,
    T: 'static,
    E: 'static,
    F: FnOnce(A, Continuation<T, E>) + Send + 'static,
    C: FnOnce(std::result::Result<T, E>) + Send + 'static,
{
    thread_local_deferrer()?.call_async(f, delay, args, callback)
}

pub(crate) fn thread_local_deferrer() -> Result<Deferrer<TokioScheduler, ThreadRng>> {
    Ok(Deferrer::with_resolver(
        TokioScheduler::current()?,
        DelayResolver::with_rng(rand::thread_rng()),
        DeferConfig::default(),
    ))
}
