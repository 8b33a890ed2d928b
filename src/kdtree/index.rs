use crate::error::Result;
use crate::kdtree::KDTreeBuilder;
use crate::r#type::IndexableNum;

/// The search depth ceiling used by [`KDTreeBuilder`] unless overridden.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Common metadata to describe a KDTree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KDTreeMetadata {
    pub(crate) dims: usize,
    pub(crate) num_items: u32,
    pub(crate) height: usize,
    pub(crate) max_depth: usize,
}

impl KDTreeMetadata {
    /// The number of coordinates in every point of the tree.
    ///
    /// This is `0` for an empty tree built without an explicit dimension.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// The number of points in the tree.
    pub fn num_items(&self) -> u32 {
        self.num_items
    }

    /// The number of levels of the tree. An empty tree has height `0`.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The deepest node search is allowed to visit before failing with
    /// [`RecursionLimitExceeded`][crate::KdIndexError::RecursionLimitExceeded].
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// One node of the tree, stored in a flat arena owned by the tree.
///
/// Children are indices into the same arena. The arena is laid out in pre-order, so the root is
/// always at index `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord {
    pub(crate) id: u32,
    pub(crate) depth: u32,
    pub(crate) left: Option<u32>,
    pub(crate) right: Option<u32>,
}

impl NodeRecord {
    /// Insertion index of the point this node splits on.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Depth at which this node was created. The root has depth `0`.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The splitting axis of this node in a tree with `dims` dimensions.
    ///
    /// # Panics
    ///
    /// Panics if `dims` is `0`. Pass [`KDTreeMetadata::dims`] of the tree that owns this node;
    /// it is never `0` for a tree holding any node.
    #[inline]
    pub fn axis(&self, dims: usize) -> usize {
        self.depth as usize % dims
    }

    /// Arena index of the subtree ranked before the median.
    #[inline]
    pub fn left(&self) -> Option<u32> {
        self.left
    }

    /// Arena index of the subtree ranked after the median.
    #[inline]
    pub fn right(&self) -> Option<u32> {
        self.right
    }
}

/// An owned, immutable KDTree.
///
/// Usually this will be created from scratch via [`KDTreeBuilder`] or [`KDTree::try_new`].
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<N: IndexableNum = f64> {
    /// Coordinates in insertion order, `dims` values per point.
    pub(crate) coords: Vec<N>,
    pub(crate) nodes: Vec<NodeRecord>,
    pub(crate) metadata: KDTreeMetadata,
}

impl<N: IndexableNum> KDTree<N> {
    /// Build a tree from a slice of points, inferring the dimension from the first point.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let tree = KDTree::<f64>::try_new(&[[2., 3.], [5., 4.], [9., 6.]]).unwrap();
    /// assert_eq!(tree.num_items(), 3);
    /// ```
    pub fn try_new<P: AsRef<[N]>>(points: &[P]) -> Result<Self> {
        Ok(KDTreeBuilder::from_points(points)?.finish())
    }

    /// Borrow this tree as a [`KDTreeRef`].
    pub fn as_ref(&self) -> KDTreeRef<'_, N> {
        KDTreeRef {
            coords: &self.coords,
            nodes: &self.nodes,
            metadata: self.metadata,
        }
    }
}

/// A cheap, copyable view onto a [`KDTree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KDTreeRef<'a, N: IndexableNum> {
    pub(crate) coords: &'a [N],
    pub(crate) nodes: &'a [NodeRecord],
    pub(crate) metadata: KDTreeMetadata,
}

/// Build a [`KDTree`] from `points`.
///
/// Every point must have the same number of coordinates as the first one.
pub fn build_tree<N: IndexableNum, P: AsRef<[N]>>(points: &[P]) -> Result<KDTree<N>> {
    KDTree::try_new(points)
}
