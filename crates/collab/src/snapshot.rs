//! Snapshot loading for read-only consumers
//!
//! Rendering and search indexing read stored binary document state without
//! ever editing it. These paths run inside request handlers, so a corrupt or
//! incompatible snapshot yields `None` ("render nothing") instead of an
//! error that would fail the whole request.

use crate::decode::TreeDecoder;
use crate::encode::TreeEncoder;
use crate::settings::{ConversionSettings, UpdateEncoding};
use crate::{CollabError, CollabResult};
use doc_model::Document;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use yrs::updates::decoder::Decode;
use yrs::{Doc, ReadTxn, StateVector, Transact, Update};

/// Loads JSON documents from binary snapshots
#[derive(Debug, Clone, Default)]
pub struct SnapshotLoader {
    settings: ConversionSettings,
}

impl SnapshotLoader {
    pub fn new(settings: ConversionSettings) -> Self {
        Self { settings }
    }

    /// Load a snapshot, logging and discarding any failure
    pub fn load(&self, update: &[u8]) -> Option<Document> {
        match self.try_load(update) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!(bytes = update.len(), "Failed to load document snapshot: {}", e);
                None
            }
        }
    }

    /// Load a snapshot and return its plain text for indexing
    pub fn load_text(&self, update: &[u8]) -> Option<String> {
        self.load(update).map(|document| document.plain_text())
    }

    /// Load a snapshot, reporting why it could not be read
    pub fn try_load(&self, update: &[u8]) -> CollabResult<Document> {
        panic::catch_unwind(AssertUnwindSafe(|| self.load_unguarded(update)))
            .unwrap_or_else(|payload| Err(CollabError::EnginePanic(panic_message(payload))))
    }

    fn load_unguarded(&self, update: &[u8]) -> CollabResult<Document> {
        let doc = Doc::new();
        apply_update(&doc, update, self.settings.update_encoding)?;
        TreeDecoder::new(&self.settings).decode_document(&doc)
    }

    /// Build a snapshot holding `document`
    pub fn write(&self, document: &Document) -> Vec<u8> {
        let doc = Doc::new();
        TreeEncoder::new(&self.settings).encode_document(&doc, document);
        encode_state(&doc, self.settings.update_encoding)
    }
}

/// Load a snapshot with default settings
pub fn load_snapshot(update: &[u8]) -> Option<Document> {
    SnapshotLoader::default().load(update)
}

/// Build a snapshot with default settings
pub fn write_snapshot(document: &Document) -> Vec<u8> {
    SnapshotLoader::default().write(document)
}

/// Decode a binary update and apply it to `doc`
pub fn apply_update(doc: &Doc, update: &[u8], encoding: UpdateEncoding) -> CollabResult<()> {
    let update = match encoding {
        UpdateEncoding::V1 => Update::decode_v1(update),
        UpdateEncoding::V2 => Update::decode_v2(update),
    }
    .map_err(|e| CollabError::UpdateDecode(e.to_string()))?;

    doc.transact_mut()
        .apply_update(update)
        .map_err(|e| CollabError::UpdateApply(e.to_string()))
}

/// Encode the full state of `doc` as a binary update
pub fn encode_state(doc: &Doc, encoding: UpdateEncoding) -> Vec<u8> {
    let txn = doc.transact();
    match encoding {
        UpdateEncoding::V1 => txn.encode_state_as_update_v1(&StateVector::default()),
        UpdateEncoding::V2 => txn.encode_state_as_update_v2(&StateVector::default()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
