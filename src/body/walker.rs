//! Pure traversal utilities over body trees.
//!
//! Every other component enumerates nodes through these walkers. Both
//! traversals visit child slots in ascending index order, so iteration
//! order is fully deterministic for a given tree.

use std::collections::VecDeque;

use crate::body::module::{IdAllocator, ModuleNode};

/// One step of a depth-first walk.
#[derive(Debug, Clone, Copy)]
pub struct DepthFirstEntry<'a> {
    /// Parent of `node`; `None` only for the root.
    pub parent: Option<&'a ModuleNode>,
    /// Slot of `node` in its parent; `None` only for the root.
    pub slot: Option<usize>,
    /// The visited node.
    pub node: &'a ModuleNode,
    /// Distance from the root (root is depth 0).
    pub depth: usize,
}

/// Lazy depth-first iterator, see [`depth_first`].
#[derive(Debug)]
pub struct DepthFirst<'a> {
    stack: Vec<DepthFirstEntry<'a>>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = DepthFirstEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.stack.pop()?;
        // Push in reverse slot order so the lowest slot pops first.
        for (slot, child) in entry.node.children.iter().enumerate().rev() {
            if let Some(child) = child {
                self.stack.push(DepthFirstEntry {
                    parent: Some(entry.node),
                    slot: Some(slot),
                    node: child,
                    depth: entry.depth + 1,
                });
            }
        }
        Some(entry)
    }
}

/// Walk the subtree under `root` depth-first, yielding each node with
/// its parent, parent slot and depth. The root is yielded first with no
/// parent.
#[must_use]
pub fn depth_first(root: &ModuleNode) -> DepthFirst<'_> {
    DepthFirst {
        stack: vec![DepthFirstEntry {
            parent: None,
            slot: None,
            node: root,
            depth: 0,
        }],
    }
}

/// Lazy breadth-first iterator, see [`breadth_first`].
#[derive(Debug)]
pub struct BreadthFirst<'a> {
    queue: VecDeque<(Option<&'a ModuleNode>, &'a ModuleNode)>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = (Option<&'a ModuleNode>, &'a ModuleNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (parent, node) = self.queue.pop_front()?;
        for child in node.children.iter().filter_map(|c| c.as_deref()) {
            self.queue.push_back((Some(node), child));
        }
        Some((parent, node))
    }
}

/// Walk the subtree under `root` breadth-first, yielding `(parent,
/// node)` pairs. The root is yielded first with no parent.
#[must_use]
pub fn breadth_first(root: &ModuleNode) -> BreadthFirst<'_> {
    let mut queue = VecDeque::new();
    queue.push_back((None, root));
    BreadthFirst { queue }
}

/// Number of nodes in the subtree under `node`, inclusive.
#[must_use]
pub fn subtree_size(node: &ModuleNode) -> usize {
    breadth_first(node).count()
}

/// Deep-copy the subtree under `node`.
///
/// Every copied node receives a fresh id from `ids`; all other fields
/// keep their values. The copy shares no structure with the source.
#[must_use]
pub fn duplicate(node: &ModuleNode, ids: &mut IdAllocator) -> ModuleNode {
    let mut copy = ModuleNode {
        id: ids.fresh(),
        kind: node.kind,
        orientation: node.orientation,
        color: node.color,
        oscillator: node.oscillator,
        children: Vec::with_capacity(node.children.len()),
    };
    for child in &node.children {
        copy.children
            .push(child.as_deref().map(|c| Box::new(duplicate(c, ids))));
    }
    copy
}

/// Slot paths of every node reachable from `root`, in depth-first
/// order. The root's path is empty; every other path ends with the
/// node's slot in its parent.
pub(crate) fn node_paths(root: &ModuleNode) -> Vec<Vec<usize>> {
    let mut paths = Vec::new();
    collect_paths(root, &mut Vec::new(), &mut paths);
    paths
}

/// Slot paths of every non-root node reachable from `root`.
pub(crate) fn edge_paths(root: &ModuleNode) -> Vec<Vec<usize>> {
    node_paths(root)
        .into_iter()
        .filter(|path| !path.is_empty())
        .collect()
}

fn collect_paths(node: &ModuleNode, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    out.push(prefix.clone());
    for (slot, child) in node.children.iter().enumerate() {
        if let Some(child) = child {
            prefix.push(slot);
            collect_paths(child, prefix, out);
            prefix.pop();
        }
    }
}

/// Resolve the node at `path` below `root`.
pub(crate) fn node_at<'a>(root: &'a ModuleNode, path: &[usize]) -> Option<&'a ModuleNode> {
    let mut node = root;
    for &slot in path {
        node = node.child(slot)?;
    }
    Some(node)
}

/// Resolve the node at `path` below `root`, mutably.
pub(crate) fn node_at_mut<'a>(
    root: &'a mut ModuleNode,
    path: &[usize],
) -> Option<&'a mut ModuleNode> {
    let mut node = root;
    for &slot in path {
        node = node.child_mut(slot)?;
    }
    Some(node)
}

/// Whether one slot path is a prefix of the other, i.e. whether the two
/// nodes are in an ancestor/descendant relation (or equal).
pub(crate) fn related(a: &[usize], b: &[usize]) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
