//! Crossover between two body trees.
//!
//! Crossover grafts a deep copy of a donor subtree from one parent into
//! a clone of the other, replacing a randomly chosen cut subtree. The
//! search for a size-compatible (cut, donor) pairing is randomized and
//! bounded; when the budget is exhausted crossover degrades to
//! returning an unmodified clone of the first parent rather than
//! failing.

use std::collections::HashSet;

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::body::config::BodyConfig;
use crate::body::module::{BACK_SLOT, IdAllocator, ModuleNode};
use crate::body::walker::{depth_first, duplicate, edge_paths, node_at, node_at_mut, subtree_size};

/// Maximum number of cut-point draws before crossover gives up.
const RETRY_BUDGET: usize = 100;

/// Cross two body trees, returning a new tree.
///
/// Clones `parent1`, then tries up to [`RETRY_BUDGET`] times: draw a
/// cut point among the clone's non-root subtrees (back-slot attachments
/// under non-root modules are excluded; back-side reattachment is
/// reserved for the root), keep the donor candidates from `parent2`
/// whose subtree size lands the result within `[min_parts, max_parts]`,
/// and graft a fresh-id deep copy of one of them in place of the cut
/// subtree. Neither parent is modified. On exhaustion the unmodified
/// clone is returned and a diagnostic is logged at debug level.
///
/// # Panics
///
/// Panics if the grafted result contains a duplicate module id or a
/// node whose children array does not match its arity. Either indicates
/// an id-allocation or construction defect in the calling code, not a
/// property of the inputs, and is not recoverable.
#[must_use]
pub fn crossover<R: Rng>(
    parent1: &ModuleNode,
    parent2: &ModuleNode,
    config: &BodyConfig,
    ids: &mut IdAllocator,
    rng: &mut R,
) -> ModuleNode {
    let mut child = parent1.clone();
    let total = subtree_size(&child);

    let cut_points: Vec<Vec<usize>> = edge_paths(&child)
        .into_iter()
        .filter(|path| !is_reserved_back_edge(&child, path))
        .collect();
    let candidates: Vec<(Vec<usize>, usize)> = edge_paths(parent2)
        .into_iter()
        .map(|path| {
            let size = node_at(parent2, &path).map_or(0, subtree_size);
            (path, size)
        })
        .collect();

    if cut_points.is_empty() || candidates.is_empty() {
        debug!("crossover: no cut points or no donor candidates, returning clone");
        return child;
    }

    let mut last_removed = 0;
    for _ in 0..RETRY_BUDGET {
        let Some(cut_path) = cut_points.choose(rng) else {
            break;
        };
        let removed = node_at(&child, cut_path).map_or(0, subtree_size);
        last_removed = removed;

        let feasible: Vec<&Vec<usize>> = candidates
            .iter()
            .filter(|(_, added)| {
                let new_size = total - removed + added;
                (config.min_parts..=config.max_parts).contains(&new_size)
            })
            .map(|(path, _)| path)
            .collect();
        let Some(&donor_path) = feasible.choose(rng) else {
            continue;
        };
        let Some(donor) = node_at(parent2, donor_path) else {
            continue;
        };

        let graft = duplicate(donor, ids);
        if let Some((slot, parent_path)) = cut_path.split_last()
            && let Some(parent) = node_at_mut(&mut child, parent_path)
            && let Some(edge) = parent.children.get_mut(*slot)
        {
            *edge = Some(Box::new(graft));
            assert_tree_invariants(&child);
            return child;
        }
    }

    debug!(
        "crossover: search exhausted after {RETRY_BUDGET} attempts \
         (last cut would have removed {last_removed} of {total} parts), \
         returning unmodified clone"
    );
    child
}

/// Whether `path` ends in a back-slot attachment under a non-root
/// module. Such edges are not valid cut points.
fn is_reserved_back_edge(root: &ModuleNode, path: &[usize]) -> bool {
    let Some((slot, parent_path)) = path.split_last() else {
        return false;
    };
    if parent_path.is_empty() {
        // The root's own back slot stays eligible.
        return false;
    }
    node_at(root, parent_path)
        .is_some_and(|parent| parent.kind.has_back_slot() && *slot == BACK_SLOT)
}

/// Post-graft invariant check: global id uniqueness and per-kind arity.
fn assert_tree_invariants(root: &ModuleNode) {
    let mut seen = HashSet::new();
    for entry in depth_first(root) {
        assert_eq!(
            entry.node.children.len(),
            entry.node.kind.arity(),
            "module {:?} has a malformed children array",
            entry.node.id,
        );
        assert!(
            seen.insert(entry.node.id),
            "duplicate module id {:?} after crossover graft",
            entry.node.id,
        );
    }
}
