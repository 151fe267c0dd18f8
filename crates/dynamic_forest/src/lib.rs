//! Dynamic forests on splay trees: link-cut trees with path aggregation, and a variant that
//! also aggregates whole subtrees through per-vertex light splay trees.
//!
//! Vertices are dense `usize` handles. The policy type parameter (see [`policy`]) fixes the
//! vertex payload, its aggregate and the lazy action.

pub mod policy;
pub mod traits;

mod lct;
mod lct_subtree;
mod splay;

pub use lct::LinkCutTree;
pub use lct_subtree::LinkCutTreeSubtree;

pub use traits::{ComponentOps, DynamicForest, PathOps, RootedOps, SubtreeOps, VertexOps};
