//! Delay specifications
//!
//! A delay is either a single value or a `(min, max)` range, expressed in abstract
//! time units (milliseconds unless a [`DeferConfig`](crate::DeferConfig) says otherwise).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a textual delay specification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelaySpecError {
    /// Nothing but whitespace was given
    #[error("empty delay specification")]
    Empty,

    /// A bound or value is not a number
    #[error("not a number: {0:?}")]
    NotANumber(String),

    /// A range is missing one of its bounds
    #[error("malformed range: {0:?}")]
    MalformedRange(String),
}

/// A fixed delay or a bounded range to draw a delay from
///
/// Deserializes from a JSON number (`250`) or a two-element array (`[100, 200]`).
/// Bounds are kept exactly as given; an inverted range is not repaired here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelaySpec {
    /// A single delay value
    Fixed(f64),
    /// Ordered `(min, max)` bounds
    Range(f64, f64),
}

impl DelaySpec {
    /// No delay; the call still waits for the next scheduling tick
    pub const ZERO: DelaySpec = DelaySpec::Fixed(0.0);

    /// Create a fixed delay
    pub fn fixed(value: f64) -> Self {
        DelaySpec::Fixed(value)
    }

    /// Create a range delay
    pub fn range(min: f64, max: f64) -> Self {
        DelaySpec::Range(min, max)
    }

    /// Express `duration` as a fixed delay counted in `unit`s
    ///
    /// Pass the deferrer's configured time unit so the wait comes out as `duration`.
    /// A zero unit yields no delay.
    pub fn from_duration(duration: Duration, unit: Duration) -> Self {
        if unit.is_zero() {
            return DelaySpec::ZERO;
        }
        DelaySpec::Fixed(duration.as_nanos() as f64 / unit.as_nanos() as f64)
    }

    /// Whether this is a range with `min > max`
    pub fn is_inverted(&self) -> bool {
        matches!(self, DelaySpec::Range(lo, hi) if lo > hi)
    }
}

impl Default for DelaySpec {
    fn default() -> Self {
        DelaySpec::ZERO
    }
}

impl fmt::Display for DelaySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelaySpec::Fixed(value) => write!(f, "{}", value),
            DelaySpec::Range(lo, hi) => write!(f, "{}..={}", lo, hi),
        }
    }
}

impl From<f64> for DelaySpec {
    fn from(value: f64) -> Self {
        DelaySpec::Fixed(value)
    }
}

impl From<i32> for DelaySpec {
    fn from(value: i32) -> Self {
        DelaySpec::Fixed(value as f64)
    }
}

impl From<u64> for DelaySpec {
    fn from(value: u64) -> Self {
        DelaySpec::Fixed(value as f64)
    }
}

impl From<(f64, f64)> for DelaySpec {
    fn from((lo, hi): (f64, f64)) -> Self {
        DelaySpec::Range(lo, hi)
    }
}

impl From<(i32, i32)> for DelaySpec {
    fn from((lo, hi): (i32, i32)) -> Self {
        DelaySpec::Range(lo as f64, hi as f64)
    }
}

impl From<[f64; 2]> for DelaySpec {
    fn from([lo, hi]: [f64; 2]) -> Self {
        DelaySpec::Range(lo, hi)
    }
}

impl FromStr for DelaySpec {
    type Err = DelaySpecError;

    /// Accepts `"250"`, `"100..200"` and `"100..=200"`. Both range forms are inclusive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DelaySpecError::Empty);
        }

        if let Some((lo, hi)) = s.split_once("..") {
            let hi = hi.strip_prefix('=').unwrap_or(hi);
            if lo.trim().is_empty() || hi.trim().is_empty() {
                return Err(DelaySpecError::MalformedRange(s.to_string()));
            }
            return Ok(DelaySpec::Range(parse_number(lo)?, parse_number(hi)?));
        }

        Ok(DelaySpec::Fixed(parse_number(s)?))
    }
}

fn parse_number(s: &str) -> Result<f64, DelaySpecError> {
    let s = s.trim();
    s.parse::<f64>()
        .map_err(|_| DelaySpecError::NotANumber(s.to_string()))
}
