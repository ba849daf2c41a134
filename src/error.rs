//! Error types for the tilemap streaming core.

use thiserror::Error;

/// Result type alias using [`TilemapError`].
pub type Result<T> = std::result::Result<T, TilemapError>;

/// Errors raised by construction and generation.
///
/// Out-of-range queries and unloaded levels are not errors; they resolve to
/// documented fallback values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TilemapError {
    /// A collaborator required at construction time was not supplied.
    #[error("required argument missing: {0}")]
    MissingRequired(&'static str),

    /// A grid was requested with a zero dimension.
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// A tile buffer does not match the declared dimensions.
    #[error("tile buffer holds {actual} cells, expected {expected}")]
    TileCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Cells actually supplied.
        actual: usize,
    },

    /// Configuration text could not be parsed.
    #[error("invalid tilemap config: {0}")]
    InvalidConfig(String),
}
