//! Delay resolution
//!
//! Turns a [`DelaySpec`] into a concrete, finite, non-negative number of time units.
//! Invalid input never fails: it degrades to a usable delay.

use std::time::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use super::spec::DelaySpec;

/// Resolves delay specifications using an injected random source
///
/// The random source is only consulted for well-formed ranges, so tests can inject a
/// seeded `StdRng` or a `rand::rngs::mock::StepRng` for deterministic draws.
#[derive(Debug, Clone)]
pub struct DelayResolver<R = StdRng> {
    rng: R,
}

impl DelayResolver<StdRng> {
    /// Create a resolver seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a resolver with reproducible draws
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for DelayResolver<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> DelayResolver<R> {
    /// Create a resolver around an existing random source
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Resolve a delay specification into time units
    ///
    /// - A fixed value is returned as-is when finite and non-negative, otherwise 0.
    /// - A range `(lo, hi)` with `lo <= hi` yields a uniform draw from `[lo, hi]`.
    /// - An inverted range (`lo > hi`) yields `lo`, neither swapped nor randomized.
    pub fn resolve(&mut self, spec: impl Into<DelaySpec>) -> f64 {
        resolve_with(&mut self.rng, spec.into())
    }
}

/// Resolve a delay specification with the thread-local random source
pub fn resolve_delay(spec: impl Into<DelaySpec>) -> f64 {
    resolve_with(&mut rand::thread_rng(), spec.into())
}

/// Convert resolved time units into a `Duration`, saturating on overflow
pub fn to_duration(units: f64, unit: Duration) -> Duration {
    let nanos = (unit.as_nanos() as f64 * normalize(units)).round();
    if nanos >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_nanos(nanos as u64)
    }
}

fn resolve_with<R: Rng>(rng: &mut R, spec: DelaySpec) -> f64 {
    match spec {
        DelaySpec::Fixed(value) => {
            if !is_valid(value) {
                warn!(value, "invalid delay, treating as no delay");
            }
            normalize(value)
        }
        DelaySpec::Range(lo, hi) if lo <= hi => {
            if (hi - lo).is_finite() {
                normalize(rng.gen_range(lo..=hi))
            } else {
                warn!(lo, hi, "delay range is not finite, using lower bound");
                normalize(lo)
            }
        }
        DelaySpec::Range(lo, hi) => {
            // Inverted (or NaN) bounds fall back to the first bound.
            warn!(lo, hi, "invalid delay range, using lower bound");
            normalize(lo)
        }
    }
}

#[inline]
fn is_valid(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[inline]
fn normalize(value: f64) -> f64 {
    if is_valid(value) {
        value
    } else {
        0.0
    }
}
