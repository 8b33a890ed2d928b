//! Utilities to traverse the KDTree structure.

use std::marker::PhantomData;

use tinyvec::TinyVec;

use crate::kdtree::r#trait::point_slice;
use crate::kdtree::{KDTreeIndex, NodeRecord};
use crate::r#type::IndexableNum;

/// A node in the KDTree.
#[derive(Debug, Clone)]
pub struct Node<'a, N: IndexableNum, T: KDTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    /// Position of this node in the tree's node arena
    index: u32,

    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> Node<'a, N, T> {
    fn new(tree: &'a T, index: u32) -> Self {
        Self {
            tree,
            index,
            phantom: PhantomData,
        }
    }

    pub(crate) fn from_root(tree: &'a T) -> Option<Self> {
        if tree.is_empty() {
            None
        } else {
            Some(Self::new(tree, 0))
        }
    }

    #[inline]
    fn record(&self) -> NodeRecord {
        self.tree.nodes()[self.index as usize]
    }

    /// Insertion index of the splitting point.
    pub fn id(&self) -> u32 {
        self.record().id()
    }

    /// Coordinates of the splitting point.
    pub fn point(&self) -> &'a [N] {
        point_slice(self.tree.coords(), self.tree.dims(), self.record().id())
    }

    /// Depth of this node. The root has depth `0`.
    pub fn depth(&self) -> u32 {
        self.record().depth()
    }

    /// The axis this node splits on.
    pub fn axis(&self) -> usize {
        self.record().axis(self.tree.dims())
    }

    /// The child holding points ranked before this node's point on its axis.
    ///
    /// Note that this **does not include** the point of the current node.
    pub fn left_child(&self) -> Option<Node<'a, N, T>> {
        self.record().left().map(|index| Node::new(self.tree, index))
    }

    /// The child holding points ranked after this node's point on its axis.
    ///
    /// Note that this **does not include** the point of the current node.
    pub fn right_child(&self) -> Option<Node<'a, N, T>> {
        self.record().right().map(|index| Node::new(self.tree, index))
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        let record = self.record();
        record.left().is_none() && record.right().is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }
}

/// Pre-order iterator over the nodes of a KDTree.
///
/// Created by [`KDTreeIndex::pre_order`].
#[derive(Debug, Clone)]
pub struct PreOrder<'a, N: IndexableNum, T: KDTreeIndex<N>> {
    tree: &'a T,
    stack: TinyVec<[u32; 64]>,
    phantom: PhantomData<N>,
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> PreOrder<'a, N, T> {
    pub(crate) fn new(tree: &'a T) -> Self {
        let mut stack = TinyVec::new();
        if !tree.is_empty() {
            stack.push(0);
        }
        Self {
            tree,
            stack,
            phantom: PhantomData,
        }
    }
}

impl<'a, N: IndexableNum, T: KDTreeIndex<N>> Iterator for PreOrder<'a, N, T> {
    type Item = Node<'a, N, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let record = self.tree.nodes()[index as usize];

        // Note: right is pushed first so that left is popped first
        if let Some(right) = record.right() {
            self.stack.push(right);
        }
        if let Some(left) = record.left() {
            self.stack.push(left);
        }

        Some(Node::new(self.tree, index))
    }
}
