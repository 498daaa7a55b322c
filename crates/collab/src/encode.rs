//! JSON-to-tree encoding
//!
//! Every encoder call runs inside a single write transaction: observers of
//! the document (local listeners, the sync broadcaster) see either the state
//! before the call or the fully built tree, never a partial one. Concurrent
//! encoder calls into the same container must be serialized by the caller.

use crate::settings::ConversionSettings;
use crate::tree;
use doc_model::{coercion, BlockNode, Document, JsonNode, Mark, TextNode, TEXT_NODE_TYPE};
use std::sync::Arc;
use yrs::types::Attrs as FormatAttrs;
use yrs::{Any, Doc, Text, Transact, TransactionMut, Xml, XmlElementPrelim, XmlFragment, XmlTextPrelim};

/// Counts of tree nodes written by one encoder call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeStats {
    pub elements: usize,
    pub text_runs: usize,
}

/// Writes JSON content into collaborative trees
#[derive(Debug, Clone, Copy)]
pub struct TreeEncoder<'s> {
    settings: &'s ConversionSettings,
}

impl<'s> TreeEncoder<'s> {
    pub fn new(settings: &'s ConversionSettings) -> Self {
        Self { settings }
    }

    /// Append a document's content to the body fragment
    pub fn encode_document(&self, doc: &Doc, document: &Document) -> EncodeStats {
        let fragment = doc.get_or_insert_xml_fragment(self.settings.fragment_name.as_str());
        self.encode_content(doc, &fragment, &document.content)
    }

    /// Replace the body fragment with a document's content
    pub fn replace_document(&self, doc: &Doc, document: &Document) -> EncodeStats {
        let fragment = doc.get_or_insert_xml_fragment(self.settings.fragment_name.as_str());
        self.replace_content(doc, &fragment, &document.content)
    }

    /// Append `nodes` to `container` in one transaction
    pub fn encode_content<C: XmlFragment>(
        &self,
        doc: &Doc,
        container: &C,
        nodes: &[JsonNode],
    ) -> EncodeStats {
        let mut txn = doc.transact_mut();
        let mut stats = EncodeStats::default();
        write_nodes(&mut txn, container, nodes, &mut stats);

        tracing::debug!(
            elements = stats.elements,
            text_runs = stats.text_runs,
            "Encoded content"
        );
        stats
    }

    /// Clear `container` and write `nodes` into it, in one transaction
    pub fn replace_content<C: XmlFragment>(
        &self,
        doc: &Doc,
        container: &C,
        nodes: &[JsonNode],
    ) -> EncodeStats {
        let mut txn = doc.transact_mut();
        let existing = container.len(&txn);
        if existing > 0 {
            container.remove_range(&mut txn, 0, existing);
        }

        let mut stats = EncodeStats::default();
        write_nodes(&mut txn, container, nodes, &mut stats);

        tracing::debug!(
            removed = existing,
            elements = stats.elements,
            text_runs = stats.text_runs,
            "Replaced content"
        );
        stats
    }
}

/// Append a document's content to the body fragment with default settings
pub fn encode_document(doc: &Doc, document: &Document) -> EncodeStats {
    let settings = ConversionSettings::default();
    TreeEncoder::new(&settings).encode_document(doc, document)
}

fn write_nodes<C: XmlFragment>(
    txn: &mut TransactionMut,
    parent: &C,
    nodes: &[JsonNode],
    stats: &mut EncodeStats,
) {
    for node in nodes {
        match node {
            JsonNode::Text(text) => write_text(txn, parent, text, stats),
            JsonNode::Block(block) => write_block(txn, parent, block, stats),
        }
    }
}

fn write_text<C: XmlFragment>(
    txn: &mut TransactionMut,
    parent: &C,
    node: &TextNode,
    stats: &mut EncodeStats,
) {
    // The engine only accepts content on nodes that are already part of the
    // document, so the empty run is attached before it is filled.
    let run = parent.push_back(txn, XmlTextPrelim::new(""));
    stats.text_runs += 1;

    if node.text.is_empty() {
        return;
    }
    run.insert(txn, 0, &node.text);
    if node.marks.is_empty() {
        return;
    }

    let len = run.len(&*txn);
    if len > 0 {
        run.format(txn, 0, len, format_attributes(&node.marks));
    }
}

fn write_block<C: XmlFragment>(
    txn: &mut TransactionMut,
    parent: &C,
    block: &BlockNode,
    stats: &mut EncodeStats,
) {
    // A block cannot take the text node name; its children go to the parent
    if block.node_type.as_str() == TEXT_NODE_TYPE {
        write_nodes(txn, parent, &block.content, stats);
        return;
    }

    // Attach before configuring, as for text runs.
    let element = parent.push_back(txn, XmlElementPrelim::empty(block.node_type.as_str()));
    stats.elements += 1;

    for (key, value) in &block.attrs {
        if let Some(stored) = coercion::to_tree(key, value) {
            element.insert_attribute(txn, key.as_str(), stored);
        }
    }

    write_nodes(txn, &element, &block.content, stats);
}

/// Formatting attributes for a mark list: `{type: attrs}`, or `{type: true}`
/// for marks without attributes. Duplicate types keep the last entry.
fn format_attributes(marks: &[Mark]) -> FormatAttrs {
    marks
        .iter()
        .map(|mark| {
            let value = match &mark.attrs {
                Some(attrs) => Any::Map(Arc::new(
                    attrs
                        .iter()
                        .map(|(key, value)| (key.clone(), tree::json_to_any(value)))
                        .collect(),
                )),
                None => Any::Bool(true),
            };
            (Arc::from(mark.mark_type.as_str()), value)
        })
        .collect()
}
