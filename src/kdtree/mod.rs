//! An implementation of an immutable K-D Tree with exact nearest-neighbor search.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
pub mod traversal;

pub use builder::KDTreeBuilder;
pub use index::{build_tree, KDTree, KDTreeMetadata, KDTreeRef, NodeRecord, DEFAULT_MAX_DEPTH};
pub use r#trait::{nearest, KDTreeIndex, Neighbor};
