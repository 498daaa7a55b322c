//! Document root

use crate::node::normalize_nodes;
use crate::{DocModelError, JsonNode, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Node type name of the document root
pub const DOC_NODE_TYPE: &str = "doc";

/// A JSON document: `{ type: "doc", content: [...] }`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawDocument")]
pub struct Document {
    pub content: Vec<JsonNode>,
}

impl Document {
    pub fn new(content: Vec<JsonNode>) -> Self {
        Self { content }
    }

    /// Parse a document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a document from a JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to pretty-printed JSON text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to a JSON value
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// The form this document takes after one trip through the collaborative tree
    pub fn normalized(&self) -> Self {
        Self {
            content: normalize_nodes(&self.content),
        }
    }

    /// Plain text of the document, one line per text-bearing block.
    ///
    /// Used for search indexing.
    pub fn plain_text(&self) -> String {
        let mut lines = Vec::new();
        collect_lines(&self.content, &mut lines);
        lines.join("\n")
    }
}

fn collect_lines(nodes: &[JsonNode], lines: &mut Vec<String>) {
    let mut inline = String::new();
    for node in nodes {
        match node {
            JsonNode::Text(text) => inline.push_str(&text.text),
            JsonNode::Block(block) if block.content.iter().any(JsonNode::is_text) => {
                flush_line(&mut inline, lines);
                let mut line = String::new();
                collect_inline(&block.content, &mut line);
                lines.push(line);
            }
            JsonNode::Block(block) => {
                flush_line(&mut inline, lines);
                collect_lines(&block.content, lines);
            }
        }
    }
    flush_line(&mut inline, lines);
}

fn collect_inline(nodes: &[JsonNode], line: &mut String) {
    for node in nodes {
        match node {
            JsonNode::Text(text) => line.push_str(&text.text),
            JsonNode::Block(block) => collect_inline(&block.content, line),
        }
    }
}

fn flush_line(inline: &mut String, lines: &mut Vec<String>) {
    if !inline.is_empty() {
        lines.push(std::mem::take(inline));
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", DOC_NODE_TYPE)?;
        map.serialize_entry("content", &self.content)?;
        map.end()
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "type", default)]
    node_type: Option<String>,
    #[serde(default)]
    content: Option<Vec<JsonNode>>,
}

impl TryFrom<RawDocument> for Document {
    type Error = DocModelError;

    fn try_from(raw: RawDocument) -> Result<Self> {
        match raw.node_type.as_deref() {
            None | Some(DOC_NODE_TYPE) => Ok(Document::new(raw.content.unwrap_or_default())),
            Some(other) => Err(DocModelError::InvalidRootType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockNode, BlockType, Mark, MarkType, TextNode};
    use serde_json::json;

    fn scenario_a() -> serde_json::Value {
        json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [
                    {"type": "text", "text": "Hello "},
                    {"type": "text", "text": "world", "marks": [{"type": "bold"}]}
                ]
            }]
        })
    }

    #[test]
    fn test_parse_and_serialize() {
        let doc = Document::from_value(scenario_a()).unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.to_value().unwrap(), scenario_a());
    }

    #[test]
    fn test_empty_document_keeps_content_key() {
        let doc = Document::default();
        assert_eq!(doc.to_value().unwrap(), json!({"type": "doc", "content": []}));
        assert_eq!(Document::from_json_str("{}").unwrap(), doc);
    }

    #[test]
    fn test_wrong_root_type_rejected() {
        let err = Document::from_value(json!({"type": "paragraph", "content": []}));
        assert!(err.is_err());
    }

    #[test]
    fn test_plain_text() {
        let doc = Document::new(vec![
            BlockNode::new(BlockType::Heading)
                .with_attr("level", 1)
                .with_child(JsonNode::text("Title"))
                .into(),
            BlockNode::new(BlockType::Paragraph)
                .with_child(JsonNode::text("Hello "))
                .with_child(TextNode::new("world").with_mark(Mark::new(MarkType::Bold)))
                .into(),
            BlockNode::new(BlockType::BulletList)
                .with_child(
                    BlockNode::new(BlockType::ListItem)
                        .with_child(BlockNode::new(BlockType::Paragraph).with_child(JsonNode::text("one"))),
                )
                .into(),
            BlockNode::new(BlockType::HorizontalRule).into(),
        ]);

        assert_eq!(doc.plain_text(), "Title\nHello world\none");
    }
}
