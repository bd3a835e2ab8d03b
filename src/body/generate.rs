//! Random generation of fresh body trees.
//!
//! Generation runs a breadth-first frontier expansion from a lone Core
//! root. A FIFO queue holds (parent, free slot) pairs; each step draws
//! a child kind, tentatively attaches a candidate and asks the
//! occupancy tracker whether the body still fits. Conflicting slots are
//! skipped permanently, never requeued, so the queue only shrinks and
//! termination is guaranteed.

// Generation uses intentional casts for the target size draw
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]

use std::collections::VecDeque;

use log::trace;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::body::config::{BodyConfig, KindWeights};
use crate::body::module::{BACK_SLOT, IdAllocator, ModuleKind, ModuleNode, Rgb, Rotation};
use crate::body::occupancy::validate;
use crate::body::walker::{node_at, node_at_mut};

/// Build a fresh body tree.
///
/// The target size is a rounded `Normal(initial_size_mu,
/// initial_size_sigma)` draw clamped to `[1, max_parts]`. Expansion
/// stops when the accepted part count reaches the target or the
/// frontier queue empties. Every accepted part passed the occupancy
/// check, so the returned tree is never self-intersecting.
///
/// The caller is responsible for having validated `config`; see
/// [`BodyConfig::validate`].
#[must_use]
pub fn generate<R: Rng>(config: &BodyConfig, ids: &mut IdAllocator, rng: &mut R) -> ModuleNode {
    let target = target_size(config, rng);

    let mut root = ModuleNode::new(
        ids.fresh(),
        ModuleKind::Core,
        Rotation::Deg0,
        Rgb::random(rng),
        None,
    );
    let mut accepted = 1usize;

    let mut frontier: VecDeque<(Vec<usize>, usize)> = VecDeque::new();
    enqueue_free_slots(&mut frontier, &root, &[]);

    while accepted < target {
        let Some((path, slot)) = frontier.pop_front() else {
            break;
        };
        let Some(parent) = node_at(&root, &path) else {
            continue;
        };
        // Core back-fill rule: the back slot only opens once the side
        // slots are all occupied.
        if parent.kind == ModuleKind::Core && slot == BACK_SLOT && !parent.side_slots_full() {
            continue;
        }
        let Some(kind) = draw_child_kind(&config.child_kinds, rng) else {
            continue;
        };

        let candidate = ModuleNode::random(ids.fresh(), kind, config.max_oscillation, rng);
        if let Some(parent) = node_at_mut(&mut root, &path)
            && let Some(edge) = parent.children.get_mut(slot)
        {
            *edge = Some(Box::new(candidate));
        } else {
            continue;
        }

        if let Err(conflict) = validate(&root) {
            trace!("generation: rejected slot {slot} under {path:?}: {conflict}");
            if let Some(parent) = node_at_mut(&mut root, &path)
                && let Some(edge) = parent.children.get_mut(slot)
            {
                *edge = None;
            }
            continue;
        }

        accepted += 1;
        let mut child_path = path;
        child_path.push(slot);
        if let Some(child) = node_at(&root, &child_path) {
            enqueue_free_slots(&mut frontier, child, &child_path);
        }
    }

    root
}

fn target_size<R: Rng>(config: &BodyConfig, rng: &mut R) -> usize {
    let drawn = Normal::new(config.initial_size_mu, config.initial_size_sigma)
        .map_or(config.initial_size_mu, |normal| normal.sample(rng));
    drawn.round().clamp(1.0, config.max_parts as f64) as usize
}

/// Draw the kind of child to attach at a frontier slot, or `None` to
/// leave the slot empty.
fn draw_child_kind<R: Rng>(weights: &KindWeights, rng: &mut R) -> Option<ModuleKind> {
    let total = weights.none + weights.brick + weights.joint;
    if total <= 0.0 {
        return None;
    }
    let roll = rng.gen_range(0.0..total);
    if roll < weights.none {
        None
    } else if roll < weights.none + weights.brick {
        Some(ModuleKind::Brick)
    } else {
        Some(ModuleKind::Joint)
    }
}

/// Enqueue every free slot of `node`. A Core's back slot goes last so
/// the side slots it depends on are expanded first.
fn enqueue_free_slots(
    frontier: &mut VecDeque<(Vec<usize>, usize)>,
    node: &ModuleNode,
    path: &[usize],
) {
    let mut deferred = None;
    for slot in node.free_slots() {
        if node.kind == ModuleKind::Core && slot == BACK_SLOT {
            deferred = Some(slot);
        } else {
            frontier.push_back((path.to_vec(), slot));
        }
    }
    if let Some(slot) = deferred {
        frontier.push_back((path.to_vec(), slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::walker::{depth_first, subtree_size};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_generated_tree_respects_bounds_and_occupancy() {
        let config = BodyConfig::default();
        for seed in 0..50 {
            let mut ids = IdAllocator::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let tree = generate(&config, &mut ids, &mut rng);

            let size = subtree_size(&tree);
            assert!(
                (1..=config.max_parts).contains(&size),
                "size {size} out of bounds"
            );
            assert!(validate(&tree).is_ok());
            assert_eq!(tree.kind, ModuleKind::Core);
        }
    }

    #[test]
    fn test_generation_is_reproducible_from_seed() {
        let config = BodyConfig::default();
        let mut first_ids = IdAllocator::new();
        let mut second_ids = IdAllocator::new();
        let first = generate(&config, &mut first_ids, &mut SmallRng::seed_from_u64(99));
        let second = generate(&config, &mut second_ids, &mut SmallRng::seed_from_u64(99));
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_part_body() {
        // With max_parts = 1 no child can ever be accepted.
        let config = BodyConfig {
            min_parts: 1,
            max_parts: 1,
            ..Default::default()
        };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(0);
        let tree = generate(&config, &mut ids, &mut rng);
        assert_eq!(subtree_size(&tree), 1);
        assert_eq!(tree.kind, ModuleKind::Core);
    }

    #[test]
    fn test_core_back_slot_needs_full_sides() {
        let config = BodyConfig {
            max_parts: 40,
            initial_size_mu: 40.0,
            initial_size_sigma: 0.0,
            child_kinds: KindWeights {
                none: 0.0,
                brick: 1.0,
                joint: 0.0,
            },
            ..Default::default()
        };
        for seed in 0..20 {
            let mut ids = IdAllocator::new();
            let mut rng = SmallRng::seed_from_u64(seed);
            let tree = generate(&config, &mut ids, &mut rng);
            if tree.child(BACK_SLOT).is_some() {
                assert!(tree.side_slots_full());
            }
        }
    }

    #[test]
    fn test_all_none_weights_yield_lone_core() {
        let config = BodyConfig {
            child_kinds: KindWeights {
                none: 1.0,
                brick: 0.0,
                joint: 0.0,
            },
            ..Default::default()
        };
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(4);
        let tree = generate(&config, &mut ids, &mut rng);
        assert_eq!(subtree_size(&tree), 1);
    }

    #[test]
    fn test_node_ids_are_unique() {
        let config = BodyConfig::default();
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(21);
        let tree = generate(&config, &mut ids, &mut rng);

        let mut seen = std::collections::HashSet::new();
        for entry in depth_first(&tree) {
            assert!(seen.insert(entry.node.id));
        }
    }
}
