//! Configuration and outcome types shared by deferred calls and batch mapping

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Continuation handed to a deferred function; forwards its outcome to the caller's callback
pub type Continuation<T, E> = Box<dyn FnOnce(std::result::Result<T, E>) + Send + 'static>;

/// Deferrer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeferConfig {
    /// Length of one delay unit
    pub time_unit: Duration,
    /// Seed for range draws; entropy when `None`
    pub seed: Option<u64>,
}

impl Default for DeferConfig {
    fn default() -> Self {
        Self {
            time_unit: Duration::from_millis(1),
            seed: None,
        }
    }
}

impl DeferConfig {
    /// Set the length of one delay unit
    pub fn with_time_unit(mut self, time_unit: Duration) -> Self {
        self.time_unit = time_unit;
        self
    }

    /// Seed range draws for reproducible delays
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of mapping one input element: an optional error and the result value
///
/// `error: None` marks success. The result is kept exactly as produced, so failed
/// elements can carry a placeholder such as `None` when `R` is an `Option`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome<R, E> {
    /// Error reported for this element, if any
    pub error: Option<E>,
    /// Result value for this element
    pub result: R,
}

impl<R, E> ItemOutcome<R, E> {
    /// A successful outcome
    pub fn ok(result: R) -> Self {
        Self {
            error: None,
            result,
        }
    }

    /// A failed outcome, still carrying a result value
    pub fn failed(error: E, result: R) -> Self {
        Self {
            error: Some(error),
            result,
        }
    }
}

impl<R, E> From<(Option<E>, R)> for ItemOutcome<R, E> {
    fn from((error, result): (Option<E>, R)) -> Self {
        Self { error, result }
    }
}

impl<R, E> From<std::result::Result<R, E>> for ItemOutcome<Option<R>, E> {
    fn from(outcome: std::result::Result<R, E>) -> Self {
        match outcome {
            Ok(result) => Self::ok(Some(result)),
            Err(error) => Self::failed(error, None),
        }
    }
}

/// Index-aligned errors and results for a whole batch
///
/// `errors` is `None` when no element reported an error. Otherwise it has one slot per
/// input element, `None` where that element succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<R, E> {
    /// Per-element errors, present only if at least one element failed
    pub errors: Option<Vec<Option<E>>>,
    /// Per-element results, one per input element
    pub results: Vec<R>,
}

impl<R, E> BatchOutcome<R, E> {
    /// Whether every element succeeded
    pub fn is_ok(&self) -> bool {
        self.errors.is_none()
    }

    /// Number of elements that reported an error
    pub fn failed_count(&self) -> usize {
        self.errors
            .as_ref()
            .map_or(0, |errors| errors.iter().filter(|e| e.is_some()).count())
    }

    /// Number of input elements
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the batch had no input elements
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Split into `(errors, results)`
    pub fn into_parts(self) -> (Option<Vec<Option<E>>>, Vec<R>) {
        (self.errors, self.results)
    }
}
