//! Module node representation for body genotypes.
//!
//! A body is a tree of typed building blocks (modules) attached via
//! numbered slots. The root is always a Core; every other module hangs
//! off exactly one parent slot. Joints additionally carry oscillator
//! parameters that downstream controllers read; this crate never
//! executes them.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Slot index of the back attachment point on Core and Brick modules.
pub const BACK_SLOT: usize = 0;

/// Opaque stable identifier for a module node.
///
/// Ids are handed out only by [`IdAllocator`]; they are never copied
/// along with the rest of a node's data when a subtree is duplicated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(u64);

/// Monotonic allocator for [`NodeId`]s.
///
/// One allocator serves an entire evolutionary run; id uniqueness
/// across a tree relies on every new node drawing from the same
/// allocator.
#[allow(missing_copy_implementations)] // copying would fork the id sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator starting at id zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next fresh id.
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }

    /// Advance the counter past every id reachable from `root`.
    ///
    /// Call this before grafting into a tree that was not produced by
    /// this allocator (for example one received from a collaborator),
    /// so freshly allocated ids cannot collide with existing ones.
    pub fn advance_past(&mut self, root: &ModuleNode) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            self.next = self.next.max(node.id.0 + 1);
            stack.extend(node.children.iter().filter_map(|c| c.as_deref()));
        }
    }
}

/// The closed set of module kinds a body can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    /// The single root module of every body.
    Core,
    /// Structural block with four child slots.
    Brick,
    /// Actuated hinge with one forward child slot.
    Joint,
    /// Terminal sensor leaf with no child slots.
    Sensor,
}

impl ModuleKind {
    /// Number of child slots this kind exposes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Core | Self::Brick => 4,
            Self::Joint => 1,
            Self::Sensor => 0,
        }
    }

    /// Whether slot 0 of this kind is a back-side attachment.
    ///
    /// Joint's single slot is its forward slot, not a back slot.
    #[must_use]
    pub fn has_back_slot(self) -> bool {
        matches!(self, Self::Core | Self::Brick)
    }
}

/// Discrete module orientation about its attachment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    Deg0,
    /// Quarter turn.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three-quarter turn.
    Deg270,
}

impl Rotation {
    /// Draw a uniformly random rotation.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        match rng.gen_range(0..4) {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// This rotation expressed as a number of quarter turns.
    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }
}

/// Oscillator parameters carried by Joint modules.
///
/// Period and phase are periodic quantities in `[0, max_oscillation)`;
/// amplitude lives in `[0, 1]`. The engine only stores and perturbs
/// these values, it never evaluates them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillator {
    /// Oscillation period.
    pub period: f64,
    /// Phase offset.
    pub phase: f64,
    /// Output amplitude in `[0, 1]`.
    pub amplitude: f64,
}

impl Oscillator {
    /// Draw random oscillator parameters.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R, max_oscillation: f64) -> Self {
        Self {
            period: rng.gen_range(0.0..max_oscillation),
            phase: rng.gen_range(0.0..max_oscillation),
            amplitude: rng.gen_range(0.0..=1.0),
        }
    }
}

/// Decorative module color.
///
/// Purely a rendering attribute; it has no effect on occupancy or any
/// structural operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Draw a uniformly random color.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            r: rng.gen_range(0..=u8::MAX),
            g: rng.gen_range(0..=u8::MAX),
            b: rng.gen_range(0..=u8::MAX),
        }
    }
}

/// One building block of a body tree.
///
/// The children vector always has exactly `kind.arity()` entries; empty
/// slots hold `None`. Ownership of children makes the tree acyclic and
/// connected by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleNode {
    /// Stable identifier, unique within a tree.
    pub id: NodeId,
    /// Which kind of block this is.
    pub kind: ModuleKind,
    /// Orientation about the attachment axis.
    pub orientation: Rotation,
    /// Decorative color.
    pub color: Rgb,
    /// Oscillator parameters, present only on Joint modules.
    pub oscillator: Option<Oscillator>,
    /// Child edges indexed by slot; length equals `kind.arity()`.
    pub children: Vec<Option<Box<ModuleNode>>>,
}

impl ModuleNode {
    /// Construct a node with all slots empty.
    #[must_use]
    pub fn new(
        id: NodeId,
        kind: ModuleKind,
        orientation: Rotation,
        color: Rgb,
        oscillator: Option<Oscillator>,
    ) -> Self {
        Self {
            id,
            kind,
            orientation,
            color,
            oscillator,
            children: (0..kind.arity()).map(|_| None).collect(),
        }
    }

    /// Construct a node of `kind` with random orientation, color and
    /// (for Joints) oscillator parameters.
    #[must_use]
    pub fn random<R: Rng>(id: NodeId, kind: ModuleKind, max_oscillation: f64, rng: &mut R) -> Self {
        let oscillator = matches!(kind, ModuleKind::Joint)
            .then(|| Oscillator::random(rng, max_oscillation));
        Self::new(id, kind, Rotation::random(rng), Rgb::random(rng), oscillator)
    }

    /// The child attached at `slot`, if any.
    #[must_use]
    pub fn child(&self, slot: usize) -> Option<&Self> {
        self.children.get(slot).and_then(|c| c.as_deref())
    }

    /// Mutable access to the child attached at `slot`, if any.
    pub fn child_mut(&mut self, slot: usize) -> Option<&mut Self> {
        self.children.get_mut(slot).and_then(|c| c.as_deref_mut())
    }

    /// Indices of slots with no child attached, in ascending order.
    #[must_use]
    pub fn free_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(slot, _)| slot)
    }

    /// Whether every non-back slot holds a child.
    ///
    /// Used for the core back-fill rule: the back slot only becomes
    /// expandable once the side slots are all occupied.
    #[must_use]
    pub fn side_slots_full(&self) -> bool {
        self.children
            .iter()
            .enumerate()
            .all(|(slot, c)| slot == BACK_SLOT || c.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_arity_per_kind() {
        assert_eq!(ModuleKind::Core.arity(), 4);
        assert_eq!(ModuleKind::Brick.arity(), 4);
        assert_eq!(ModuleKind::Joint.arity(), 1);
        assert_eq!(ModuleKind::Sensor.arity(), 0);
    }

    #[test]
    fn test_children_length_matches_arity() {
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(7);
        for kind in [
            ModuleKind::Core,
            ModuleKind::Brick,
            ModuleKind::Joint,
            ModuleKind::Sensor,
        ] {
            let node = ModuleNode::random(ids.fresh(), kind, 4.0, &mut rng);
            assert_eq!(node.children.len(), kind.arity());
        }
    }

    #[test]
    fn test_only_joints_carry_oscillators() {
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(11);
        let joint = ModuleNode::random(ids.fresh(), ModuleKind::Joint, 4.0, &mut rng);
        let brick = ModuleNode::random(ids.fresh(), ModuleKind::Brick, 4.0, &mut rng);
        assert!(joint.oscillator.is_some());
        assert!(brick.oscillator.is_none());
    }

    #[test]
    fn test_allocator_ids_are_distinct() {
        let mut ids = IdAllocator::new();
        let a = ids.fresh();
        let b = ids.fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_advance_past_skips_existing_ids() {
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut root = ModuleNode::random(ids.fresh(), ModuleKind::Core, 4.0, &mut rng);
        let child = ModuleNode::random(ids.fresh(), ModuleKind::Brick, 4.0, &mut rng);
        let child_id = child.id;
        root.children[2] = Some(Box::new(child));

        let mut other = IdAllocator::new();
        other.advance_past(&root);
        let fresh = other.fresh();
        assert_ne!(fresh, root.id);
        assert_ne!(fresh, child_id);
    }

    #[test]
    fn test_side_slots_full_ignores_back() {
        let mut ids = IdAllocator::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut core = ModuleNode::new(
            ids.fresh(),
            ModuleKind::Core,
            Rotation::Deg0,
            Rgb::random(&mut rng),
            None,
        );
        assert!(!core.side_slots_full());
        for slot in 1..4 {
            let brick = ModuleNode::random(ids.fresh(), ModuleKind::Brick, 4.0, &mut rng);
            core.children[slot] = Some(Box::new(brick));
        }
        assert!(core.side_slots_full());
        assert!(core.child(BACK_SLOT).is_none());
    }
}
