//! Configuration for body generation, mutation and crossover.
//!
//! Configuration is validated once, when it is constructed by the
//! caller; the engines assume a validated config and never re-check
//! ranges inside their hot loops.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Relative weights for the child kind drawn at each frontier slot
/// during generation. Weights need not sum to one; they are sampled
/// proportionally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KindWeights {
    /// Weight of leaving the slot empty.
    pub none: f64,
    /// Weight of attaching a brick.
    pub brick: f64,
    /// Weight of attaching a joint.
    pub joint: f64,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            none: 0.4,
            brick: 0.4,
            joint: 0.2,
        }
    }
}

/// Probabilities and noise magnitudes for the four mutation stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Probability of the delete-subtree stage running.
    pub p_delete_subtree: f64,
    /// Probability of the duplicate-subtree stage running.
    pub p_duplicate_subtree: f64,
    /// Probability of the swap-subtree stage running.
    pub p_swap_subtree: f64,
    /// Per-joint probability of oscillator perturbation.
    pub p_mutate_oscillator: f64,
    /// Gaussian noise sigma for the oscillator period.
    pub period_sigma: f64,
    /// Gaussian noise sigma for the oscillator phase.
    pub phase_sigma: f64,
    /// Gaussian noise sigma for the oscillator amplitude.
    pub amplitude_sigma: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            p_delete_subtree: 0.2,
            p_duplicate_subtree: 0.2,
            p_swap_subtree: 0.2,
            p_mutate_oscillator: 0.2,
            period_sigma: 0.5,
            phase_sigma: 0.5,
            amplitude_sigma: 0.1,
        }
    }
}

/// Configuration for the body genotype engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BodyConfig {
    /// Smallest permitted body size, in parts.
    pub min_parts: usize,
    /// Largest permitted body size, in parts.
    pub max_parts: usize,
    /// Mean of the Normal target-size draw for fresh bodies.
    pub initial_size_mu: f64,
    /// Sigma of the Normal target-size draw for fresh bodies.
    pub initial_size_sigma: f64,
    /// Child kind weights used by the generator's frontier expansion.
    pub child_kinds: KindWeights,
    /// Upper bound (exclusive) for oscillator period and phase.
    pub max_oscillation: f64,
    /// Mutation stage probabilities and sigmas.
    pub mutation: MutationConfig,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            min_parts: 3,
            max_parts: 20,
            initial_size_mu: 10.0,
            initial_size_sigma: 4.0,
            child_kinds: KindWeights::default(),
            max_oscillation: 10.0,
            mutation: MutationConfig::default(),
        }
    }
}

impl BodyConfig {
    /// Check every recognized option for range errors.
    ///
    /// Call this once when the configuration is constructed, before any
    /// generation begins.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found: an empty or inverted
    /// part range, a probability outside `[0, 1]`, negative or
    /// non-finite kind weights, a negative or non-finite sigma, or a
    /// non-positive oscillation bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_parts == 0 || self.min_parts > self.max_parts {
            return Err(ConfigError::PartRange {
                min: self.min_parts,
                max: self.max_parts,
            });
        }
        check_probability("p_delete_subtree", self.mutation.p_delete_subtree)?;
        check_probability("p_duplicate_subtree", self.mutation.p_duplicate_subtree)?;
        check_probability("p_swap_subtree", self.mutation.p_swap_subtree)?;
        check_probability("p_mutate_oscillator", self.mutation.p_mutate_oscillator)?;
        check_weight("none", self.child_kinds.none)?;
        check_weight("brick", self.child_kinds.brick)?;
        check_weight("joint", self.child_kinds.joint)?;
        let weight_sum = self.child_kinds.none + self.child_kinds.brick + self.child_kinds.joint;
        if weight_sum <= 0.0 {
            return Err(ConfigError::Weight {
                name: "sum",
                value: weight_sum,
            });
        }
        check_sigma("initial_size_sigma", self.initial_size_sigma)?;
        check_sigma("period_sigma", self.mutation.period_sigma)?;
        check_sigma("phase_sigma", self.mutation.phase_sigma)?;
        check_sigma("amplitude_sigma", self.mutation.amplitude_sigma)?;
        if !self.max_oscillation.is_finite() || self.max_oscillation <= 0.0 {
            return Err(ConfigError::Oscillation {
                value: self.max_oscillation,
            });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Weight { name, value })
    }
}

fn check_sigma(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Sigma { name, value })
    }
}
