use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdIndexError {
    /// A point or query does not have the tree's number of dimensions.
    #[error("Expected {expected} dimensions, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The first point of a build has zero coordinates.
    #[error("Points must have at least one dimension.")]
    EmptyDimension,

    /// A nearest-neighbor query was run against an empty tree.
    #[error("No points in the tree.")]
    NotFound,

    /// Search descended deeper than the configured ceiling.
    #[error("Search depth {depth} exceeds the limit of {limit}.")]
    RecursionLimitExceeded { depth: usize, limit: usize },

    /// A coordinate is NaN or infinite, so it cannot be ordered or measured. `id` is `None` for
    /// query points.
    #[error("Non-finite coordinate on axis {axis} (item {id:?}).")]
    InvalidCoordinate { id: Option<u32>, axis: usize },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, KdIndexError>;
