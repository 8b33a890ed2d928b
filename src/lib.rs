#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;

pub use error::{KdIndexError, Result};
pub use kdtree::{build_tree, nearest, KDTree, KDTreeBuilder, KDTreeIndex, Neighbor};
pub use r#type::IndexableNum;

#[cfg(test)]
pub(crate) mod test;
