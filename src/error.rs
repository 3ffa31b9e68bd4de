//! Error types for tree operations.

use thiserror::Error;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Errors reported by tree operations.
///
/// Lookup misses are not errors; [`crate::RbTree::find`] returns `None` for
/// an absent key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// `to_array` was called with a capacity that does not match the number
    /// of keys in the tree.
    #[error("capacity mismatch: caller supplied {capacity}, tree holds {len} keys")]
    CapacityMismatch { capacity: usize, len: usize },

    /// The node handle does not name a live member of this tree.
    #[error("node does not belong to this tree")]
    ForeignNode,
}
