//! Document Model - Portable JSON document schema
//!
//! This crate defines the tree format used for REST transport, static storage
//! and search indexing: a `doc` root holding text nodes (with inline marks)
//! and typed block nodes (with attributes and children).

mod block;
pub mod coercion;
mod document;
mod error;
mod mark;
mod node;

pub use block::*;
pub use document::*;
pub use error::*;
pub use mark::*;
pub use node::*;
