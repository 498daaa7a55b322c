//! Tree-to-JSON decoding
//!
//! Walks a fragment (or element) in document order and produces the JSON
//! node list for it. Mark wrappers are folded into the marks of the text they
//! wrap (see `marks.rs`); every other element becomes a block node.

use crate::settings::ConversionSettings;
use crate::tree::{self, ElementKind, TreeChild};
use crate::CollabResult;
use doc_model::{coercion, Attrs, BlockNode, BlockType, Document, JsonNode, MarkSet};
use yrs::{Doc, ReadTxn, Transact, XmlElementRef, XmlFragment};

/// Converts collaborative trees into JSON documents
#[derive(Debug, Clone, Copy)]
pub struct TreeDecoder<'s> {
    pub(crate) settings: &'s ConversionSettings,
}

impl<'s> TreeDecoder<'s> {
    pub fn new(settings: &'s ConversionSettings) -> Self {
        Self { settings }
    }

    /// Decode the body fragment of a document
    pub fn decode_document(&self, doc: &Doc) -> CollabResult<Document> {
        let fragment = doc.get_or_insert_xml_fragment(self.settings.fragment_name.as_str());
        let txn = doc.transact();
        let content = self.decode_children(&txn, &fragment)?;

        tracing::debug!(
            fragment = %self.settings.fragment_name,
            nodes = content.len(),
            "Decoded document"
        );
        Ok(Document::new(content))
    }

    /// Decode the children of a fragment or element, in order
    pub fn decode_children<C, T>(&self, txn: &T, container: &C) -> CollabResult<Vec<JsonNode>>
    where
        C: XmlFragment,
        T: ReadTxn,
    {
        let mut nodes = Vec::new();
        for child in tree::children(container, txn) {
            match child {
                // Bare text at this depth inherits no formatting
                TreeChild::Text(text) => {
                    nodes.extend(self.decode_text(txn, &text, &MarkSet::new()));
                }
                TreeChild::Element(element) => match ElementKind::classify(&tree::tag(&element)) {
                    ElementKind::Mark(mark_type) => {
                        nodes.extend(self.flatten_mark(txn, &element, mark_type, &MarkSet::new())?);
                    }
                    ElementKind::Block(block_type) => {
                        nodes.push(self.decode_block(txn, &element, block_type)?);
                    }
                    ElementKind::Unwrap => {
                        tracing::warn!("Element with reserved name \"text\", splicing its children");
                        nodes.extend(self.decode_children(txn, &element)?);
                    }
                },
            }
        }
        Ok(nodes)
    }

    /// Decode a block element with its attributes and children
    pub(crate) fn decode_block<T: ReadTxn>(
        &self,
        txn: &T,
        element: &XmlElementRef,
        block_type: BlockType,
    ) -> CollabResult<JsonNode> {
        let attrs: Attrs = tree::attributes(element, txn)
            .into_iter()
            .map(|(key, value)| {
                let value = coercion::to_json(&key, &value);
                (key, value)
            })
            .collect();
        let content = self.decode_children(txn, element)?;

        Ok(JsonNode::Block(BlockNode {
            node_type: block_type,
            attrs,
            content,
        }))
    }
}

/// Decode the body of a document with default settings
pub fn decode_document(doc: &Doc) -> CollabResult<Document> {
    let settings = ConversionSettings::default();
    TreeDecoder::new(&settings).decode_document(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::{Mark, MarkType, TextNode};
    use serde_json::json;
    use yrs::{Text, Xml, XmlElementPrelim, XmlTextPrelim};

    #[test]
    fn test_decode_empty_document() {
        let doc = Doc::new();
        let decoded = decode_document(&doc).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_heading_coerces_level() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let heading = fragment.push_back(&mut txn, XmlElementPrelim::empty("heading"));
            heading.insert_attribute(&mut txn, "level", "2".to_string());
            let text = heading.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "Title");
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "heading",
                    "attrs": {"level": 2},
                    "content": [{"type": "text", "text": "Title"}]
                }]
            })
        );
    }

    #[test]
    fn test_decode_omits_empty_attrs_and_content() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            fragment.push_back(&mut txn, XmlElementPrelim::empty("horizontalRule"));
            let paragraph = fragment.push_back(&mut txn, XmlElementPrelim::empty("paragraph"));
            // An empty text node produces no JSON node
            paragraph.push_back(&mut txn, XmlTextPrelim::new(""));
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{"type": "horizontalRule"}, {"type": "paragraph"}]
            })
        );
    }

    #[test]
    fn test_decode_formatting_runs() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let paragraph = fragment.push_back(&mut txn, XmlElementPrelim::empty("paragraph"));
            let text = paragraph.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "plain bold plain");
            let mut attrs = yrs::types::Attrs::new();
            attrs.insert("bold".into(), yrs::Any::Bool(true));
            text.format(&mut txn, 6, 4, attrs);
        }

        let decoded = decode_document(&doc).unwrap();
        let paragraph = decoded.content[0].as_block().unwrap();
        assert_eq!(
            paragraph.content,
            vec![
                JsonNode::text("plain "),
                JsonNode::Text(TextNode::new("bold").with_mark(Mark::new(MarkType::Bold))),
                JsonNode::text(" plain"),
            ]
        );
    }

    #[test]
    fn test_decode_text_named_element_is_spliced() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let paragraph = fragment.push_back(&mut txn, XmlElementPrelim::empty("paragraph"));
            let reserved = paragraph.push_back(&mut txn, XmlElementPrelim::empty("text"));
            reserved.insert_attribute(&mut txn, "k", "v".to_string());
            let inner = reserved.push_back(&mut txn, XmlTextPrelim::new(""));
            inner.insert(&mut txn, 0, "inner");
        }

        let decoded = decode_document(&doc).unwrap();
        let expected = json!({
            "type": "doc",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "inner"}]}]
        });
        assert_eq!(decoded.to_value().unwrap(), expected);

        // The output parses back to the same document
        let reparsed = Document::from_json_str(&decoded.to_json_string().unwrap()).unwrap();
        assert_eq!(reparsed, decoded);
    }

    #[test]
    fn test_decode_unknown_block_passes_through() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let callout = fragment.push_back(&mut txn, XmlElementPrelim::empty("callout"));
            callout.insert_attribute(&mut txn, "tone", "warning".to_string());
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{"type": "callout", "attrs": {"tone": "warning"}}]
            })
        );
    }
}
