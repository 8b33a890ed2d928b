use geo_traits::CoordTrait;
use log::trace;
use tinyvec::TinyVec;

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::{KdIndexError, Result};
use crate::kdtree::traversal::{Node, PreOrder};
use crate::kdtree::{KDTree, KDTreeMetadata, KDTreeRef, NodeRecord};
use crate::r#type::IndexableNum;

/// The nearest stored point to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a, N: IndexableNum> {
    /// Insertion index of the point
    pub id: u32,
    /// Coordinates of the point
    pub point: &'a [N],
    /// Euclidean distance from the query to the point
    pub distance: N,
}

/// A trait for searching and accessing data out of a KDTree.
pub trait KDTreeIndex<N: IndexableNum>: Sized {
    /// The underlying raw coordinate buffer of this tree, in insertion order.
    fn coords(&self) -> &[N];

    /// The node arena of this tree, in pre-order.
    fn nodes(&self) -> &[NodeRecord];

    /// Access the metadata describing this KDTree
    fn metadata(&self) -> &KDTreeMetadata;

    /// The number of items in this KDTree
    fn num_items(&self) -> u32 {
        self.metadata().num_items()
    }

    /// The number of coordinates of every point in this KDTree
    fn dims(&self) -> usize {
        self.metadata().dims()
    }

    /// The number of levels of this KDTree
    fn height(&self) -> usize {
        self.metadata().height()
    }

    /// Returns `true` if the tree holds no points.
    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// The coordinates of the point with insertion index `id`.
    fn point(&self, id: u32) -> Option<&[N]> {
        let dims = self.dims();
        let start = id as usize * dims;
        self.coords().get(start..start + dims).filter(|_| dims > 0)
    }

    /// Iterate over all points in insertion order.
    fn points(&self) -> std::slice::Chunks<'_, N> {
        self.coords().chunks(self.dims().max(1))
    }

    /// Find the stored point closest to `query` by Euclidean distance.
    ///
    /// ```
    /// use kd_index::kdtree::{KDTree, KDTreeIndex};
    ///
    /// let points = [[2., 3.], [5., 4.], [9., 6.], [4., 7.], [8., 1.], [7., 2.]];
    /// let tree = KDTree::<f64>::try_new(&points).unwrap();
    ///
    /// let nearest = tree.nearest(&[3., 4.5]).unwrap();
    /// assert_eq!(nearest.point, &[2., 3.]);
    /// assert!((nearest.distance - 3.25_f64.sqrt()).abs() < 1e-12);
    /// ```
    fn nearest(&self, query: &[N]) -> Result<Neighbor<'_, N>> {
        if self.is_empty() {
            return Err(KdIndexError::NotFound);
        }
        check_query(query, self.dims())?;

        let best = nearest_in(self, Some(0), query, None)?.ok_or(KdIndexError::NotFound)?;
        let point = self.point(best.id).ok_or(KdIndexError::NotFound)?;
        let distance = best.dist.distance();
        trace!("Nearest to {:?} is item {} at {:?}", query, best.id, distance);

        Ok(Neighbor {
            id: best.id,
            point,
            distance,
        })
    }

    /// Find the stored point closest to a 2D coordinate.
    fn nearest_coord(&self, coord: &impl CoordTrait<T = N>) -> Result<Neighbor<'_, N>> {
        self.nearest(&[coord.x(), coord.y()])
    }

    /// Find the nearest point for each of `queries`.
    ///
    /// With the `rayon` feature the queries are spread across the rayon thread pool.
    fn nearest_many<P: AsRef<[N]> + Sync>(&self, queries: &[P]) -> Vec<Result<Neighbor<'_, N>>>
    where
        Self: Sync,
    {
        #[cfg(feature = "rayon")]
        {
            queries
                .par_iter()
                .map(|query| self.nearest(query.as_ref()))
                .collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            queries
                .iter()
                .map(|query| self.nearest(query.as_ref()))
                .collect()
        }
    }

    /// Search the index for items within a given radius.
    ///
    /// - query: the query point
    /// - r: radius
    ///
    /// Returns indices of found items
    fn within(&self, query: &[N], r: N) -> Result<Vec<u32>> {
        let nodes = self.nodes();
        if nodes.is_empty() {
            return Ok(vec![]);
        }
        let dims = self.dims();
        check_query(query, dims)?;
        if r.is_nan() || r < N::zero() {
            return Ok(vec![]);
        }

        let coords = self.coords();
        let radius = Dist::from_axis_gap(r);

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[u32; 64]> = TinyVec::new();
        stack.push(0);

        let mut result: Vec<u32> = vec![];

        while let Some(node_index) = stack.pop() {
            let node = nodes[node_index as usize];
            let value = point_slice(coords, dims, node.id);
            if Dist::between(value, query) <= radius {
                result.push(node.id);
            }

            // queue halves whose side of the splitting plane intersects the ball
            let axis = node.axis(dims);
            if let Some(left) = node.left {
                if query[axis] - r <= value[axis] {
                    stack.push(left);
                }
            }
            if let Some(right) = node.right {
                if query[axis] + r >= value[axis] {
                    stack.push(right);
                }
            }
        }

        Ok(result)
    }

    /// Search the index for items within a given radius of a 2D coordinate.
    fn within_coord(&self, coord: &impl CoordTrait<T = N>, r: N) -> Result<Vec<u32>> {
        self.within(&[coord.x(), coord.y()], r)
    }

    /// Access the root node of the KDTree for manual traversal.
    fn root(&self) -> Option<Node<'_, N, Self>> {
        Node::from_root(self)
    }

    /// Iterate over all nodes root first, visiting left subtrees before right ones.
    fn pre_order(&self) -> PreOrder<'_, N, Self> {
        PreOrder::new(self)
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTree<N> {
    fn coords(&self) -> &[N] {
        &self.coords
    }

    fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    fn metadata(&self) -> &KDTreeMetadata {
        &self.metadata
    }
}

impl<N: IndexableNum> KDTreeIndex<N> for KDTreeRef<'_, N> {
    fn coords(&self) -> &[N] {
        self.coords
    }

    fn nodes(&self) -> &[NodeRecord] {
        self.nodes
    }

    fn metadata(&self) -> &KDTreeMetadata {
        &self.metadata
    }
}

/// Find the stored point of `tree` closest to `query`.
///
/// Equivalent to [`KDTreeIndex::nearest`].
pub fn nearest<'a, N: IndexableNum, T: KDTreeIndex<N>>(
    tree: &'a T,
    query: &[N],
) -> Result<Neighbor<'a, N>> {
    tree.nearest(query)
}

/// Best match found so far.
#[derive(Debug, Clone, Copy)]
struct Candidate<N: IndexableNum> {
    id: u32,
    dist: Dist<N>,
}

/// A Euclidean distance in a form that orders correctly even when its square overflows `N`.
///
/// `Squared` holds the squared distance while it is finite. `Scaled` holds the plain distance
/// for pairs whose squared distance overflows. Every `Squared` value is smaller than every
/// `Scaled` one, which the derived ordering (variant first, then value) encodes.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Dist<N: IndexableNum> {
    Squared(N),
    Scaled(N),
}

impl<N: IndexableNum> Dist<N> {
    /// Distance between two points of equal length.
    #[inline]
    fn between(a: &[N], b: &[N]) -> Self {
        let sq = sq_dist(a, b);
        if sq.is_finite() {
            Dist::Squared(sq)
        } else {
            Dist::Scaled(scaled_dist(a, b))
        }
    }

    /// Distance of a single non-negative gap, such as a radius or the gap to a splitting plane.
    #[inline]
    fn from_axis_gap(gap: N) -> Self {
        let sq = gap * gap;
        if sq.is_finite() {
            Dist::Squared(sq)
        } else {
            Dist::Scaled(gap)
        }
    }

    /// The Euclidean distance.
    #[inline]
    fn distance(self) -> N {
        match self {
            Dist::Squared(sq) => sq.sqrt(),
            Dist::Scaled(d) => d,
        }
    }
}

/// Depth-first descent into the half-space containing `query`, then backtracking into the
/// other half only when the current best ball crosses the splitting plane.
fn nearest_in<N: IndexableNum, T: KDTreeIndex<N>>(
    tree: &T,
    node_index: Option<u32>,
    query: &[N],
    mut best: Option<Candidate<N>>,
) -> Result<Option<Candidate<N>>> {
    let Some(node_index) = node_index else {
        return Ok(best);
    };
    let node = tree.nodes()[node_index as usize];

    let limit = tree.metadata().max_depth();
    if node.depth as usize >= limit {
        return Err(KdIndexError::RecursionLimitExceeded {
            depth: node.depth as usize,
            limit,
        });
    }

    let dims = tree.dims();
    let axis = node.axis(dims);
    let value = point_slice(tree.coords(), dims, node.id);

    let (near, far) = if query[axis] < value[axis] {
        (node.left, node.right)
    } else {
        (node.right, node.left)
    };

    best = nearest_in(tree, near, query, best)?;

    let axis_dist = Dist::from_axis_gap(half_gap(value[axis], query[axis]));
    if best.map_or(true, |b| b.dist > axis_dist) {
        let dist = Dist::between(value, query);
        if best.map_or(true, |b| dist < b.dist) {
            best = Some(Candidate { id: node.id, dist });
        }
        best = nearest_in(tree, far, query, best)?;
    }

    Ok(best)
}

fn check_query<N: IndexableNum>(query: &[N], dims: usize) -> Result<()> {
    if query.len() != dims {
        return Err(KdIndexError::DimensionMismatch {
            expected: dims,
            actual: query.len(),
        });
    }
    if let Some(axis) = query.iter().position(|c| !c.is_finite()) {
        return Err(KdIndexError::InvalidCoordinate { id: None, axis });
    }
    Ok(())
}

#[inline]
pub(crate) fn point_slice<N: IndexableNum>(coords: &[N], dims: usize, id: u32) -> &[N] {
    let start = id as usize * dims;
    &coords[start..start + dims]
}

/// Squared Euclidean distance between two points of equal length.
#[inline]
fn sq_dist<N: IndexableNum>(a: &[N], b: &[N]) -> N {
    a.iter().zip(b).fold(N::zero(), |acc, (a, b)| {
        let d = *a - *b;
        acc + d * d
    })
}

/// `|a - b|`, computed from halves so that the difference of two finite values cannot overflow
/// before it is doubled back.
#[inline]
fn half_gap<N: IndexableNum>(a: N, b: N) -> N {
    let d = a - b;
    if d.is_finite() {
        return d.abs();
    }
    let two = N::one() + N::one();
    (a / two - b / two).abs() * two
}

/// Euclidean distance for pairs whose squared sum overflows `N`.
///
/// Each axis gap is divided by the largest one before squaring, so the sum stays in `[1, k]`.
fn scaled_dist<N: IndexableNum>(a: &[N], b: &[N]) -> N {
    let two = N::one() + N::one();
    let scale = a
        .iter()
        .zip(b)
        .map(|(a, b)| (*a / two - *b / two).abs())
        .fold(N::zero(), |max, gap| max.max(gap));
    if scale == N::zero() {
        return N::zero();
    }
    let sum = a.iter().zip(b).fold(N::zero(), |acc, (a, b)| {
        let d = (*a / two - *b / two) / scale;
        acc + d * d
    });
    scale * sum.sqrt() * two
}
