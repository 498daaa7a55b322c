//! Error types for document model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid document root type: expected \"doc\", got {0:?}")]
    InvalidRootType(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
