//! Error types for toolpath collision checking.

use thiserror::Error;
use vcad_kernel_bvh::BvhError;

/// Errors from obstacle assembly and toolpath checking.
#[derive(Error, Debug)]
pub enum CollideError {
    /// Tool geometry is unusable (non-positive size, zero orientation).
    #[error("invalid tool: {0}")]
    InvalidTool(String),

    /// An obstacle descriptor has inverted or non-finite bounds.
    #[error("invalid obstacle '{name}': {reason}")]
    InvalidObstacle {
        /// Name of the offending descriptor.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Check options are out of range.
    #[error("invalid check options: {0}")]
    InvalidOptions(String),

    /// BVH configuration failed.
    #[error(transparent)]
    Bvh(#[from] BvhError),

    /// Scene description could not be decoded.
    #[error("failed to parse scene: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for collision operations.
pub type Result<T> = std::result::Result<T, CollideError>;
