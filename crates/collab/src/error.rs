//! Error types for the collaboration crate.

use doc_model::MarkType;
use thiserror::Error;

/// Result type alias for collaboration operations.
pub type CollabResult<T> = Result<T, CollabError>;

/// Errors that can occur while converting collaborative documents.
#[derive(Error, Debug)]
pub enum CollabError {
    /// The binary update could not be decoded.
    #[error("Update decode error: {0}")]
    UpdateDecode(String),

    /// The decoded update could not be integrated into the document.
    #[error("Update apply error: {0}")]
    UpdateApply(String),

    /// The CRDT engine panicked while reading a document.
    #[error("CRDT engine panicked: {0}")]
    EnginePanic(String),

    /// A block element sits inside a mark wrapper and the policy rejects it.
    #[error("Block element <{block}> nested inside <{mark}> mark")]
    NestedBlockInMark { mark: MarkType, block: String },

    /// JSON document error.
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while reading or writing settings.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
