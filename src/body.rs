//! Body genotype module: tree representation plus the generation,
//! mutation and crossover engines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  Generator │ Mutation │ Crossover   │
//! ├─────────────────────────────────────┤
//! │         Occupancy Tracker           │
//! ├─────────────────────────────────────┤
//! │      Module Tree & Tree Walker      │
//! └─────────────────────────────────────┘
//! ```
//!
//! All randomized operations take an explicit `R: Rng`; identical
//! seeds yield identical trees, and nothing in this module holds
//! global mutable state.

mod config;
mod crossover;
mod generate;
mod module;
mod mutation;
mod occupancy;
mod walker;

pub use config::{BodyConfig, KindWeights, MutationConfig};
pub use crossover::crossover;
pub use generate::generate;
pub use module::{
    BACK_SLOT, IdAllocator, ModuleKind, ModuleNode, NodeId, Oscillator, Rgb, Rotation,
};
pub use mutation::{mutate, mutate_in_place};
pub use occupancy::{Facing, GridPos, OccupancyConflict, validate};
pub use walker::{
    BreadthFirst, DepthFirst, DepthFirstEntry, breadth_first, depth_first, duplicate, subtree_size,
};
