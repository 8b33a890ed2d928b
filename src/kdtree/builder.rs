use std::cmp::Ordering;

use log::debug;

use crate::error::{KdIndexError, Result};
use crate::kdtree::index::{KDTreeMetadata, NodeRecord, DEFAULT_MAX_DEPTH};
use crate::kdtree::KDTree;
use crate::r#type::IndexableNum;

/// A builder to create a [`KDTree`].
///
/// ```
/// use kd_index::kdtree::{KDTreeBuilder, KDTreeIndex};
///
/// let mut builder = KDTreeBuilder::<f64>::new();
/// builder.add(&[2., 3.]).unwrap();
/// builder.add(&[5., 4.]).unwrap();
/// builder.add(&[9., 6.]).unwrap();
/// let tree = builder.finish();
/// assert_eq!(tree.dims(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: IndexableNum = f64> {
    /// Coordinates in insertion order
    coords: Vec<N>,

    dims: Option<usize>,
    num_items: u32,
    max_depth: usize,
}

impl<N: IndexableNum> Default for KDTreeBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: IndexableNum> KDTreeBuilder<N> {
    /// Create a new builder. The dimension is taken from the first added point.
    pub fn new() -> Self {
        Self {
            coords: vec![],
            dims: None,
            num_items: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create a new builder whose points must all have `dims` coordinates.
    pub fn with_dims(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(KdIndexError::EmptyDimension);
        }
        Ok(Self {
            dims: Some(dims),
            ..Self::new()
        })
    }

    /// Create a builder holding all of `points`.
    pub fn from_points<P: AsRef<[N]>>(points: &[P]) -> Result<Self> {
        let mut builder = Self::new();
        if let Some(first) = points.first() {
            builder.reserve(points.len(), first.as_ref().len());
        }
        for point in points {
            builder.add(point.as_ref())?;
        }
        Ok(builder)
    }

    /// Reserve space for `num_items` more points of `dims` coordinates.
    pub fn reserve(&mut self, num_items: usize, dims: usize) {
        self.coords.reserve(num_items * dims);
    }

    /// Set the deepest node a search may visit before failing.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The dimension of the points added so far, if known.
    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    /// The number of points added so far.
    pub fn len(&self) -> u32 {
        self.num_items
    }

    /// Returns `true` if no point has been added.
    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    /// Add a point to the index.
    ///
    /// This returns the insertion index, which search results refer back to. A rejected point
    /// leaves the builder unchanged.
    pub fn add(&mut self, point: &[N]) -> Result<u32> {
        let dims = match self.dims {
            Some(dims) if dims != point.len() => {
                return Err(KdIndexError::DimensionMismatch {
                    expected: dims,
                    actual: point.len(),
                })
            }
            Some(dims) => dims,
            None if point.is_empty() => return Err(KdIndexError::EmptyDimension),
            None => point.len(),
        };

        let index = self.num_items;
        if let Some(axis) = point.iter().position(|c| !c.is_finite()) {
            return Err(KdIndexError::InvalidCoordinate {
                id: Some(index),
                axis,
            });
        }
        self.num_items = index.checked_add(1).ok_or_else(|| {
            KdIndexError::General("Cannot index more than u32::MAX points.".to_string())
        })?;

        self.dims = Some(dims);
        self.coords.extend_from_slice(point);
        Ok(index)
    }

    /// Consume this builder, performing the k-d sort and generating a KDTree ready for queries.
    pub fn finish(self) -> KDTree<N> {
        let dims = self.dims.unwrap_or(0);
        let mut ids: Vec<u32> = (0..self.num_items).collect();
        let mut nodes = Vec::with_capacity(ids.len());
        let mut height = 0;

        if dims > 0 {
            sort(&mut ids, &self.coords, dims, 0, &mut nodes, &mut height);
        }
        debug_assert_eq!(nodes.len(), self.num_items as usize);

        debug!(
            "Built kd-tree with {} items in {} dimensions, height {}",
            self.num_items, dims, height
        );

        KDTree {
            coords: self.coords,
            nodes,
            metadata: KDTreeMetadata {
                dims,
                num_items: self.num_items,
                height,
                max_depth: self.max_depth,
            },
        }
    }
}

/// Recursively kd-sort `ids`, appending one node per id to `nodes` in pre-order.
///
/// Returns the arena index of the subtree root, or `None` for an empty range.
fn sort<N: IndexableNum>(
    ids: &mut [u32],
    coords: &[N],
    dims: usize,
    depth: usize,
    nodes: &mut Vec<NodeRecord>,
    height: &mut usize,
) -> Option<u32> {
    if ids.is_empty() {
        return None;
    }
    *height = (*height).max(depth + 1);

    // stable sort on the splitting axis; non-finite values were rejected when the points were added
    let axis = depth % dims;
    ids.sort_by(|a, b| {
        let a = coords[*a as usize * dims + axis];
        let b = coords[*b as usize * dims + axis];
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    });

    // lower median
    let m = ids.len() >> 1;
    let node_index = nodes.len() as u32;
    nodes.push(NodeRecord {
        id: ids[m],
        depth: depth as u32,
        left: None,
        right: None,
    });

    let (left_ids, rest) = ids.split_at_mut(m);
    let right_ids = &mut rest[1..];
    let left = sort(left_ids, coords, dims, depth + 1, nodes, height);
    let right = sort(right_ids, coords, dims, depth + 1, nodes, height);

    let node = &mut nodes[node_index as usize];
    node.left = left;
    node.right = right;
    Some(node_index)
}
