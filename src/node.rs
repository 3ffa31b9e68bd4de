
use std::ops::Not;

/// Node color used by the rebalancing rules.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// Side of a child link. `!side` is the opposite side.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Direction {
    Left,
    Right,
}

impl Not for Direction {
    type Output = Direction;

    fn not(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Stable handle into a tree's node arena.
///
/// Handles stay valid across rotations and unrelated mutations; erasing a
/// node retires its handle. Slot 0 of every arena holds the tree's sentinel,
/// which is never handed out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The sentinel slot. Terminates every leaf link and stands in for the
    /// root's parent.
    pub(crate) const NIL: NodeId = NodeId(0);

    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub key: i64,
    pub color: Color,
    pub left: NodeId,
    pub right: NodeId,
    pub parent: NodeId,
}

impl Node {
    pub(crate) fn new(key: i64, color: Color) -> Node {
        Node {
            key,
            color,
            left: NodeId::NIL,
            right: NodeId::NIL,
            parent: NodeId::NIL,
        }
    }

    pub(crate) fn child(&self, side: Direction) -> NodeId {
        match side {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub(crate) fn set_child_link(&mut self, side: Direction, child: NodeId) {
        match side {
            Direction::Left => self.left = child,
            Direction::Right => self.right = child,
        }
    }
}

/// Arena slot. Erased slots go on the tree's free list and are reused by
/// later insertions; a vacant slot lets `erase` reject a stale handle.
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Occupied(Node),
    Vacant,
}
