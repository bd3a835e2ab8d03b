// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Bodytree: a direct-tree body genotype engine for evolving modular
//! robots.
//!
//! A robot body is a tree of typed building blocks (Core, Brick,
//! Joint, Sensor) attached via oriented slots. This crate represents
//! those trees and provides the three evolutionary operators over
//! them:
//!
//! - random generation bounded by a part budget, with a discrete
//!   occupancy check rejecting self-intersecting candidates;
//! - a four-stage structural/parametric mutation pass;
//! - crossover via bounded randomized search for a size-compatible
//!   graft point.
//!
//! Converting a tree into a physics-engine body description, the
//! neural controller genotype, and the population-level evolutionary
//! loop are external collaborators; trees cross that boundary as
//! plain read-only values.
//!
//! # Example
//!
//! ```
//! use bodytree::{BodyConfig, IdAllocator, crossover, generate, mutate};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let config = BodyConfig::default();
//! config.validate()?;
//!
//! let mut ids = IdAllocator::new();
//! let mut rng = SmallRng::seed_from_u64(42);
//! let parent1 = generate(&config, &mut ids, &mut rng);
//! let parent2 = generate(&config, &mut ids, &mut rng);
//! let child = crossover(&parent1, &parent2, &config, &mut ids, &mut rng);
//! let child = mutate(&child, &config, &mut ids, &mut rng);
//! # let _ = child;
//! # Ok::<(), bodytree::ConfigError>(())
//! ```

pub mod body;
pub mod error;

pub use error::ConfigError;

// Re-export the engine surface at the crate root for convenience
pub use body::{
    BACK_SLOT, BodyConfig, BreadthFirst, DepthFirst, DepthFirstEntry, Facing, GridPos, IdAllocator,
    KindWeights, ModuleKind, ModuleNode, MutationConfig, NodeId, OccupancyConflict, Oscillator,
    Rgb, Rotation, breadth_first, crossover, depth_first, duplicate, generate, mutate,
    mutate_in_place, subtree_size, validate,
};
