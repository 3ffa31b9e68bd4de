//! A red-black ordered-key container.
//!
//! The tree keeps its nodes in an index-addressed arena with slot 0 reserved
//! for a per-tree sentinel, so parent/child links are plain index rewrites
//! and teardown never recurses. Mutation happens only through [`RbTree::insert`]
//! and [`RbTree::erase`]; everything else walks the finished structure
//! read-only.
//!
//! ```
//! use rbtree::RbTree;
//!
//! let mut tree = RbTree::new();
//! tree.insert(7);
//! tree.insert(3);
//! let node = tree.find(3).unwrap();
//! tree.erase(node).unwrap();
//! assert_eq!(tree.to_array(1).unwrap(), vec![7]);
//! ```

mod error;
mod node;
mod tree;

pub use error::{TreeError, TreeResult};
pub use node::{Color, NodeId};
pub use tree::{Iter, RbTree};
