//! Conversion between collaborative document trees and JSON documents.
//!
//! Collaborative editing works on a CRDT tree (the Yjs data model, provided by
//! `yrs`), while rendering, REST transport and search indexing work on the
//! portable JSON schema from `doc_model`. This crate maps between the two.
//!
//! # Modules
//!
//! - `tree`: Read-only traversal of the CRDT tree and value conversion
//! - `decode`: Tree-to-JSON decoder
//! - `marks`: Folding of mark wrappers and text formatting into text marks
//! - `encode`: JSON-to-tree encoder, one transaction per call
//! - `snapshot`: Loading and writing binary snapshots
//! - `settings`: Conversion settings and their persistence
//! - `error`: Error types for the collaboration crate
//!
//! # Example
//!
//! ```
//! use collab::{decode_document, encode_document};
//! use doc_model::Document;
//! use yrs::Doc;
//!
//! let document = Document::from_json_str(
//!     r#"{"type":"doc","content":[{"type":"heading","attrs":{"level":2},
//!         "content":[{"type":"text","text":"Title"}]}]}"#,
//! )
//! .unwrap();
//!
//! let doc = Doc::new();
//! encode_document(&doc, &document);
//!
//! let decoded = decode_document(&doc).unwrap();
//! assert_eq!(decoded, document);
//! ```

pub mod decode;
pub mod encode;
pub mod error;
mod marks;
pub mod settings;
pub mod snapshot;
pub mod tree;

// Re-export commonly used types
pub use decode::{decode_document, TreeDecoder};
pub use encode::{encode_document, EncodeStats, TreeEncoder};
pub use error::{CollabError, CollabResult};
pub use settings::{ConversionSettings, NestedBlockPolicy, SettingsManager, UpdateEncoding};
pub use snapshot::{load_snapshot, write_snapshot, SnapshotLoader};
pub use tree::{ElementKind, TreeChild};
