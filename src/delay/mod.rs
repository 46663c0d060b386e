//! Delay specifications and their resolution into concrete waits
//!
//! A [`DelaySpec`] is either a fixed number of units or a `(min, max)` range drawn
//! uniformly. Resolution never fails: invalid values mean no delay.

pub mod resolver;
pub mod spec;

pub use resolver::*;
pub use spec::*;
