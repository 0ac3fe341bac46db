use thiserror::Error;

/// A red-black invariant that does not hold, as reported by
/// [`RbTree::validate`](crate::RbTree::validate).
///
/// Depths count edges from the root, so the root sits at depth 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("root is red")]
    RedRoot,

    #[error("root has a parent link")]
    RootHasParent,

    #[error("red node at depth {depth} has a red child")]
    RedRedEdge { depth: usize },

    #[error("black height {found} at depth {depth}, expected {expected}")]
    BlackHeightMismatch {
        expected: usize,
        found: usize,
        depth: usize,
    },

    #[error("child at depth {depth} does not point back at its parent")]
    BrokenParentLink { depth: usize },

    #[error("keys out of order at in-order position {position}")]
    OutOfOrder { position: usize },

    #[error("length is {recorded} but {reachable} nodes are reachable")]
    LengthMismatch { recorded: usize, reachable: usize },

    #[error("{live} nodes allocated but only {reachable} reachable")]
    LeakedNodes { live: usize, reachable: usize },
}
