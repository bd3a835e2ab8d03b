//! Structural and parametric mutation of body trees.
//!
//! One mutation pass applies up to four edits in fixed order: delete a
//! subtree, duplicate a subtree into an empty slot, swap two unrelated
//! subtrees, and perturb joint oscillators. Each stage is gated by its
//! own probability, silently no-ops when it finds no legal target, and
//! never retries.

use log::trace;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use crate::body::config::{BodyConfig, MutationConfig};
use crate::body::module::{IdAllocator, ModuleNode};
use crate::body::walker::{
    duplicate, edge_paths, node_at, node_at_mut, node_paths, related, subtree_size,
};

/// Mutate a body tree, returning a new tree.
///
/// The input is cloned up front and never modified; use
/// [`mutate_in_place`] to edit a caller-owned tree directly. The caller
/// is responsible for having validated `config`.
#[must_use]
pub fn mutate<R: Rng>(
    root: &ModuleNode,
    config: &BodyConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> ModuleNode {
    let mut child = root.clone();
    mutate_in_place(&mut child, config, ids, rng);
    child
}

/// Mutate a body tree in place.
///
/// Stage order is fixed: delete, duplicate, swap, oscillator
/// perturbation. Delete never shrinks the tree below `min_parts`;
/// duplicate never grows it above `max_parts`; swap preserves size.
pub fn mutate_in_place<R: Rng>(
    root: &mut ModuleNode,
    config: &BodyConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) {
    if rng.gen_bool(config.mutation.p_delete_subtree) {
        delete_stage(root, config, rng);
    }
    if rng.gen_bool(config.mutation.p_duplicate_subtree) {
        duplicate_stage(root, config, ids, rng);
    }
    if rng.gen_bool(config.mutation.p_swap_subtree) {
        swap_stage(root, rng);
    }
    perturb_oscillators(root, &config.mutation, config.max_oscillation, rng);
}

/// Remove one subtree chosen uniformly among those small enough to keep
/// the tree at or above `min_parts`.
fn delete_stage<R: Rng>(root: &mut ModuleNode, config: &BodyConfig, rng: &mut R) {
    let size = subtree_size(root);
    let Some(budget) = size.checked_sub(config.min_parts) else {
        return;
    };
    let candidates: Vec<Vec<usize>> = edge_paths(root)
        .into_iter()
        .filter(|path| node_at(root, path).is_some_and(|node| subtree_size(node) <= budget))
        .collect();
    let Some(path) = candidates.choose(rng) else {
        trace!("mutation: delete stage found no legal target");
        return;
    };
    let Some((slot, parent_path)) = path.split_last() else {
        return;
    };
    if let Some(parent) = node_at_mut(root, parent_path)
        && let Some(edge) = parent.children.get_mut(*slot)
    {
        *edge = None;
    }
}

/// Deep-copy one subtree into one empty slot, both chosen uniformly,
/// keeping the tree at or below `max_parts`. The copied nodes receive
/// fresh ids. Occupancy is not re-checked after the attach.
fn duplicate_stage<R: Rng>(
    root: &mut ModuleNode,
    config: &BodyConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) {
    let size = subtree_size(root);
    let budget = config.max_parts.saturating_sub(size);
    if budget == 0 {
        return;
    }
    let donors: Vec<Vec<usize>> = edge_paths(root)
        .into_iter()
        .filter(|path| node_at(root, path).is_some_and(|node| subtree_size(node) <= budget))
        .collect();

    let mut targets: Vec<(Vec<usize>, usize)> = Vec::new();
    for path in node_paths(root) {
        if let Some(node) = node_at(root, &path) {
            targets.extend(node.free_slots().map(|slot| (path.clone(), slot)));
        }
    }

    let Some(donor_path) = donors.choose(rng) else {
        trace!("mutation: duplicate stage found no donor");
        return;
    };
    let Some((target_path, slot)) = targets.choose(rng) else {
        trace!("mutation: duplicate stage found no empty slot");
        return;
    };
    let Some(donor) = node_at(root, donor_path) else {
        return;
    };
    let copy = duplicate(donor, ids);
    if let Some(parent) = node_at_mut(root, target_path)
        && let Some(edge) = parent.children.get_mut(*slot)
    {
        *edge = Some(Box::new(copy));
    }
}

/// Exchange two subtrees that are neither ancestors nor descendants of
/// each other, atomically, in their respective parents' slots.
fn swap_stage<R: Rng>(root: &mut ModuleNode, rng: &mut R) {
    let paths = edge_paths(root);
    let Some(first) = paths.choose(rng).cloned() else {
        return;
    };
    let unrelated: Vec<Vec<usize>> = paths
        .iter()
        .filter(|path| !related(&first, path))
        .cloned()
        .collect();
    let Some(second) = unrelated.choose(rng) else {
        trace!("mutation: swap stage found no unrelated partner");
        return;
    };

    let Some((first_slot, first_parent)) = first.split_last() else {
        return;
    };
    let Some((second_slot, second_parent)) = second.split_last() else {
        return;
    };

    // The two paths are disjoint, so detaching one leaves the other
    // resolvable.
    let taken_first = node_at_mut(root, first_parent)
        .and_then(|parent| parent.children.get_mut(*first_slot))
        .and_then(|edge| edge.take());
    let taken_second = node_at_mut(root, second_parent)
        .and_then(|parent| parent.children.get_mut(*second_slot))
        .and_then(|edge| edge.take());

    if let Some(parent) = node_at_mut(root, first_parent)
        && let Some(edge) = parent.children.get_mut(*first_slot)
    {
        *edge = taken_second;
    }
    if let Some(parent) = node_at_mut(root, second_parent)
        && let Some(edge) = parent.children.get_mut(*second_slot)
    {
        *edge = taken_first;
    }
}

/// Add Gaussian noise to every joint's oscillator, each joint gated
/// independently. Amplitude is clamped to `[0, 1]`; period and phase
/// are periodic quantities and wrap into `[0, max_oscillation)`.
fn perturb_oscillators<R: Rng>(
    node: &mut ModuleNode,
    config: &MutationConfig,
    max_oscillation: f64,
    rng: &mut R,
) {
    if let Some(oscillator) = node.oscillator.as_mut()
        && rng.gen_bool(config.p_mutate_oscillator)
    {
        oscillator.period =
            (oscillator.period + gaussian(config.period_sigma, rng)).rem_euclid(max_oscillation);
        oscillator.phase =
            (oscillator.phase + gaussian(config.phase_sigma, rng)).rem_euclid(max_oscillation);
        oscillator.amplitude =
            (oscillator.amplitude + gaussian(config.amplitude_sigma, rng)).clamp(0.0, 1.0);
    }
    for child in node.children.iter_mut().filter_map(|c| c.as_deref_mut()) {
        perturb_oscillators(child, config, max_oscillation, rng);
    }
}

fn gaussian<R: Rng>(sigma: f64, rng: &mut R) -> f64 {
    Normal::new(0.0, sigma).map_or(0.0, |normal| normal.sample(rng))
}
