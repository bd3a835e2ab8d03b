//! Discrete occupancy tracking for body trees.
//!
//! Every reachable node resolves to one grid cell, derived purely from
//! the root-to-node path of slots and orientations. The root sits at
//! the origin facing north; each traversed slot turns the facing by a
//! table-driven number of quarter turns, adds the child's own rotation,
//! and steps one unit in the new facing. All rotation composition is
//! integer arithmetic mod 4, so the result is exact and reproducible.
//!
//! This is the single source of truth for "is this body
//! self-intersecting" and runs after every tentative edit during
//! generation.

use std::collections::HashMap;
use std::fmt;

use crate::body::module::{ModuleKind, ModuleNode, NodeId};

/// A discrete grid cell occupied by one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    /// East-west coordinate.
    pub x: i32,
    /// North-south coordinate.
    pub y: i32,
}

impl GridPos {
    /// The root module's cell.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four discrete facings a module can have on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Towards positive y.
    North,
    /// Towards positive x.
    East,
    /// Towards negative y.
    South,
    /// Towards negative x.
    West,
}

impl Facing {
    fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// This facing rotated clockwise by `quarter_turns`.
    #[must_use]
    pub fn turned(self, quarter_turns: u8) -> Self {
        Self::from_index((self.index() + quarter_turns) % 4)
    }

    /// The cell one unit ahead of `pos` in this facing.
    #[must_use]
    pub fn step(self, pos: GridPos) -> GridPos {
        match self {
            Self::North => GridPos { x: pos.x, y: pos.y + 1 },
            Self::East => GridPos { x: pos.x + 1, y: pos.y },
            Self::South => GridPos { x: pos.x, y: pos.y - 1 },
            Self::West => GridPos { x: pos.x - 1, y: pos.y },
        }
    }
}

/// Two modules resolved to the same grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyConflict {
    /// The contested cell.
    pub position: GridPos,
    /// Id of the module that claimed the cell first.
    pub owner: NodeId,
}

impl fmt::Display for OccupancyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell {} already occupied by module {:?}",
            self.position, self.owner
        )
    }
}

impl std::error::Error for OccupancyConflict {}

/// Quarter turns applied to the parent facing when descending through
/// `slot` of a node of `kind`. Back turns around, left and right turn
/// sideways, front and Joint's forward slot keep the facing.
fn slot_turns(kind: ModuleKind, slot: usize) -> u8 {
    const TURNS: [u8; 4] = [2, 1, 0, 3];
    match kind {
        ModuleKind::Core | ModuleKind::Brick => TURNS.get(slot).copied().unwrap_or(0),
        ModuleKind::Joint | ModuleKind::Sensor => 0,
    }
}

/// Check the whole tree for self-intersection.
///
/// Walks every node in ascending slot order, accumulating a cell→id
/// map, and reports the first collision encountered.
///
/// # Errors
///
/// Returns the first [`OccupancyConflict`] if two modules resolve to
/// the same cell.
pub fn validate(root: &ModuleNode) -> Result<(), OccupancyConflict> {
    let mut occupied = HashMap::new();
    occupied.insert(GridPos::ORIGIN, root.id);
    place_children(root, GridPos::ORIGIN, Facing::North, &mut occupied)
}

fn place_children(
    node: &ModuleNode,
    pos: GridPos,
    facing: Facing,
    occupied: &mut HashMap<GridPos, NodeId>,
) -> Result<(), OccupancyConflict> {
    for (slot, child) in node.children.iter().enumerate() {
        let Some(child) = child else { continue };
        let turns = slot_turns(node.kind, slot) + child.orientation.quarter_turns();
        let heading = facing.turned(turns);
        let cell = heading.step(pos);
        if let Some(&owner) = occupied.get(&cell) {
            return Err(OccupancyConflict {
                position: cell,
                owner,
            });
        }
        occupied.insert(cell, child.id);
        place_children(child, cell, heading, occupied)?;
    }
    Ok(())
}
