//! Error types for the body genotype engine.

use std::fmt;

/// A configuration option outside its recognized range.
///
/// Configuration errors are reported once, when a configuration is
/// constructed; the generation, mutation and crossover engines assume a
/// validated configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// `min_parts` is zero or exceeds `max_parts`.
    PartRange {
        /// Configured minimum part count.
        min: usize,
        /// Configured maximum part count.
        max: usize,
    },
    /// A mutation probability outside `[0, 1]`.
    Probability {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A child kind weight that is negative, non-finite, or sums to zero.
    Weight {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A Gaussian sigma that is negative or non-finite.
    Sigma {
        /// Name of the offending option.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A non-positive or non-finite oscillation bound.
    Oscillation {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PartRange { min, max } => {
                write!(f, "invalid part range: min_parts={min}, max_parts={max}")
            }
            Self::Probability { name, value } => {
                write!(f, "probability {name} out of range [0, 1]: {value}")
            }
            Self::Weight { name, value } => {
                write!(f, "invalid child kind weight {name}: {value}")
            }
            Self::Sigma { name, value } => {
                write!(f, "invalid sigma {name}: {value}")
            }
            Self::Oscillation { value } => {
                write!(f, "max_oscillation must be positive and finite: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
