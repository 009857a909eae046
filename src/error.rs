//! Shared error types used across submodules.

use thiserror::Error;

use crate::quiz::QuizError;
use crate::store::StoreError;

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Raised when a frame cannot be encoded to PNG.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
