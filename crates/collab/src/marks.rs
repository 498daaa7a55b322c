//! Mark flattening
//!
//! In the tree, inline formatting shows up two ways: as wrapper elements named
//! after the mark (`<bold><italic>text</italic></bold>`) and as formatting
//! attributes on ranges of a text node. Both end up as the `marks` of JSON
//! text nodes. Marks form a set keyed by type, carried down the walk as an
//! immutable accumulator.

use crate::decode::TreeDecoder;
use crate::settings::NestedBlockPolicy;
use crate::tree::{self, ElementKind, TreeChild};
use crate::{CollabError, CollabResult};
use doc_model::{Attrs, JsonNode, Mark, MarkSet, MarkType, TextNode, LINK_HREF, LINK_TARGET};
use serde_json::Value;
use std::collections::BTreeMap;
use yrs::{ReadTxn, XmlElementRef, XmlFragment, XmlTextRef};

impl TreeDecoder<'_> {
    /// Flatten a mark wrapper into text nodes.
    ///
    /// Every text span beneath `element` becomes one text node carrying
    /// `inherited`, this wrapper's mark, and the span's own formatting.
    pub fn flatten_mark<T: ReadTxn>(
        &self,
        txn: &T,
        element: &XmlElementRef,
        mark_type: MarkType,
        inherited: &MarkSet,
    ) -> CollabResult<Vec<JsonNode>> {
        let marks = inherited.with(self.wrapper_mark(txn, element, mark_type));
        self.flatten_children(txn, element, mark_type, &marks)
    }

    /// Decode the children of a mark wrapper, all carrying `marks`
    fn flatten_children<C, T>(
        &self,
        txn: &T,
        container: &C,
        mark_type: MarkType,
        marks: &MarkSet,
    ) -> CollabResult<Vec<JsonNode>>
    where
        C: XmlFragment,
        T: ReadTxn,
    {
        let mut nodes = Vec::new();

        for child in tree::children(container, txn) {
            match child {
                TreeChild::Text(text) => nodes.extend(self.decode_text(txn, &text, marks)),
                TreeChild::Element(nested) => {
                    let name = tree::tag(&nested);
                    match ElementKind::classify(&name) {
                        ElementKind::Mark(nested_type) => {
                            nodes.extend(self.flatten_mark(txn, &nested, nested_type, marks)?);
                        }
                        ElementKind::Unwrap => {
                            nodes.extend(self.flatten_children(txn, &nested, mark_type, marks)?);
                        }
                        ElementKind::Block(block_type) => match self.settings.nested_block_policy {
                            NestedBlockPolicy::Hoist => {
                                tracing::warn!(
                                    mark = %mark_type,
                                    block = %name,
                                    "Block element inside mark wrapper, decoding it as a block"
                                );
                                nodes.push(self.decode_block(txn, &nested, block_type)?);
                            }
                            NestedBlockPolicy::Drop => {
                                tracing::warn!(
                                    mark = %mark_type,
                                    block = %name,
                                    "Block element inside mark wrapper, dropping it"
                                );
                            }
                            NestedBlockPolicy::Reject => {
                                return Err(CollabError::NestedBlockInMark {
                                    mark: mark_type,
                                    block: name,
                                });
                            }
                        },
                    }
                }
            }
        }

        Ok(nodes)
    }

    /// Decode a text node into one text node per formatting run.
    ///
    /// Adjacent runs that resolve to the same marks are merged, empty runs
    /// are skipped.
    pub(crate) fn decode_text<T: ReadTxn>(
        &self,
        txn: &T,
        text: &XmlTextRef,
        inherited: &MarkSet,
    ) -> Vec<JsonNode> {
        let mut runs: Vec<TextNode> = Vec::new();
        for span in tree::text_spans(text, txn) {
            if span.text.is_empty() {
                continue;
            }
            let marks = inherited.with_all(self.format_marks(&span.format)).to_marks();
            if let Some(last) = runs.last_mut().filter(|last| last.marks == marks) {
                last.text.push_str(&span.text);
                continue;
            }
            runs.push(TextNode {
                text: span.text,
                marks,
            });
        }
        runs.into_iter().map(JsonNode::Text).collect()
    }

    /// The mark a wrapper element stands for.
    ///
    /// Only links carry attributes: `href` and `target` from the element.
    fn wrapper_mark<T: ReadTxn>(&self, txn: &T, element: &XmlElementRef, mark_type: MarkType) -> Mark {
        if mark_type != MarkType::Link {
            return Mark::new(mark_type);
        }

        let mut attrs = Attrs::new();
        for key in [LINK_HREF, LINK_TARGET] {
            if let Some(value) = tree::attribute(element, txn, key) {
                attrs.insert(key.to_string(), Value::String(value));
            }
        }
        self.link_mark(attrs)
    }

    /// Marks encoded as formatting attributes on a text range.
    ///
    /// Keys that are not mark types are ignored, as are `false`/`null`
    /// values, which the engine uses to clear formatting.
    fn format_marks(&self, format: &BTreeMap<String, Value>) -> Vec<Mark> {
        format
            .iter()
            .filter_map(|(key, value)| {
                let mark_type = MarkType::from_name(key)?;
                let attrs = match value {
                    Value::Null | Value::Bool(false) => return None,
                    Value::Object(attrs) => Some(attrs.clone()),
                    _ => None,
                };
                Some(match mark_type {
                    MarkType::Link => self.link_mark(attrs.unwrap_or_default()),
                    _ => Mark { mark_type, attrs },
                })
            })
            .collect()
    }

    fn link_mark(&self, mut attrs: Attrs) -> Mark {
        attrs
            .entry(LINK_TARGET)
            .or_insert_with(|| Value::String(self.settings.default_link_target.clone()));
        Mark::with_attrs(MarkType::Link, attrs)
    }
}

#[cfg(test)]
mod tests {
    use crate::decode::decode_document;
    use crate::settings::{ConversionSettings, NestedBlockPolicy};
    use crate::{CollabError, TreeDecoder};
    use serde_json::json;
    use yrs::{Doc, Text, Transact, Xml, XmlElementPrelim, XmlFragment, XmlTextPrelim};

    /// paragraph > bold > italic > "text"
    fn nested_marks_doc() -> Doc {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let paragraph = fragment.push_back(&mut txn, XmlElementPrelim::empty("paragraph"));
            let bold = paragraph.push_back(&mut txn, XmlElementPrelim::empty("bold"));
            let italic = bold.push_back(&mut txn, XmlElementPrelim::empty("italic"));
            let text = italic.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "text");
        }
        doc
    }

    /// paragraph > bold > [ "a", blockquote > "b" ]
    fn block_in_mark_doc() -> Doc {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let paragraph = fragment.push_back(&mut txn, XmlElementPrelim::empty("paragraph"));
            let bold = paragraph.push_back(&mut txn, XmlElementPrelim::empty("bold"));
            let text = bold.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "a");
            let quote = bold.push_back(&mut txn, XmlElementPrelim::empty("blockquote"));
            let inner = quote.push_back(&mut txn, XmlTextPrelim::new(""));
            inner.insert(&mut txn, 0, "b");
        }
        doc
    }

    #[test]
    fn test_nested_wrappers_flatten() {
        let decoded = decode_document(&nested_marks_doc()).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [{
                        "type": "text",
                        "text": "text",
                        "marks": [{"type": "bold"}, {"type": "italic"}]
                    }]
                }]
            })
        );
    }

    #[test]
    fn test_link_wrapper_defaults_target() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let link = fragment.push_back(&mut txn, XmlElementPrelim::empty("link"));
            link.insert_attribute(&mut txn, "href", "https://x".to_string());
            link.insert_attribute(&mut txn, "rel", "nofollow".to_string());
            let text = link.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "site");
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "text",
                    "text": "site",
                    "marks": [{"type": "link", "attrs": {"href": "https://x", "target": "_blank"}}]
                }]
            })
        );
    }

    #[test]
    fn test_wrapper_and_format_marks_combine() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let italic = fragment.push_back(&mut txn, XmlElementPrelim::empty("italic"));
            let text = italic.push_back(&mut txn, XmlTextPrelim::new(""));
            text.insert(&mut txn, 0, "ab");
            let mut attrs = yrs::types::Attrs::new();
            attrs.insert("bold".into(), yrs::Any::Bool(true));
            text.format(&mut txn, 1, 1, attrs);
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [
                    {"type": "text", "text": "a", "marks": [{"type": "italic"}]},
                    {"type": "text", "text": "b", "marks": [{"type": "bold"}, {"type": "italic"}]}
                ]
            })
        );
    }

    #[test]
    fn test_text_named_element_in_mark_keeps_marks() {
        let doc = Doc::new();
        let fragment = doc.get_or_insert_xml_fragment("default");
        {
            let mut txn = doc.transact_mut();
            let bold = fragment.push_back(&mut txn, XmlElementPrelim::empty("bold"));
            let reserved = bold.push_back(&mut txn, XmlElementPrelim::empty("text"));
            let inner = reserved.push_back(&mut txn, XmlTextPrelim::new(""));
            inner.insert(&mut txn, 0, "inner");
        }

        let decoded = decode_document(&doc).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{"type": "text", "text": "inner", "marks": [{"type": "bold"}]}]
            })
        );
    }

    #[test]
    fn test_block_in_mark_hoisted_by_default() {
        let decoded = decode_document(&block_in_mark_doc()).unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [
                        {"type": "text", "text": "a", "marks": [{"type": "bold"}]},
                        {"type": "blockquote", "content": [{"type": "text", "text": "b"}]}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_block_in_mark_dropped() {
        let settings = ConversionSettings {
            nested_block_policy: NestedBlockPolicy::Drop,
            ..Default::default()
        };
        let decoded = TreeDecoder::new(&settings)
            .decode_document(&block_in_mark_doc())
            .unwrap();
        assert_eq!(
            decoded.to_value().unwrap(),
            json!({
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [{"type": "text", "text": "a", "marks": [{"type": "bold"}]}]
                }]
            })
        );
    }

    #[test]
    fn test_block_in_mark_rejected() {
        let settings = ConversionSettings {
            nested_block_policy: NestedBlockPolicy::Reject,
            ..Default::default()
        };
        let result = TreeDecoder::new(&settings).decode_document(&block_in_mark_doc());
        assert!(matches!(
            result,
            Err(CollabError::NestedBlockInMark { ref block, .. }) if block == "blockquote"
        ));
    }
}
