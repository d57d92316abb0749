//! Error types for BVH configuration.

use thiserror::Error;

/// Errors that can occur while configuring a BVH build.
///
/// Building itself never fails: an empty primitive list yields no tree.
#[derive(Error, Debug)]
pub enum BvhError {
    /// Build options are out of range.
    #[error("invalid build options: {0}")]
    InvalidOptions(String),

    /// Options could not be decoded from JSON.
    #[error("failed to parse build options: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for BVH operations.
pub type Result<T> = std::result::Result<T, BvhError>;
