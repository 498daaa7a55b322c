//! JSON document nodes
//!
//! A node is either a run of text carrying marks, or a typed block with
//! attributes and children. Empty `marks`, `attrs` and `content` are never
//! serialized, so "present iff non-empty" holds by construction.

use crate::{coercion, Attrs, BlockType, Mark, MarkSet, MarkType};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Node type name of text nodes
pub const TEXT_NODE_TYPE: &str = "text";

/// A node in the JSON document tree
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub enum JsonNode {
    Text(TextNode),
    Block(BlockNode),
}

impl JsonNode {
    /// Create an unmarked text node
    pub fn text(text: impl Into<String>) -> Self {
        JsonNode::Text(TextNode::new(text))
    }

    /// Create an empty block node
    pub fn block(block_type: impl Into<BlockType>) -> Self {
        JsonNode::Block(BlockNode::new(block_type))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, JsonNode::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            JsonNode::Text(text) => Some(text),
            JsonNode::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&BlockNode> {
        match self {
            JsonNode::Block(block) => Some(block),
            JsonNode::Text(_) => None,
        }
    }

    /// Wire type name of this node
    pub fn type_name(&self) -> &str {
        match self {
            JsonNode::Text(_) => TEXT_NODE_TYPE,
            JsonNode::Block(block) => block.node_type.as_str(),
        }
    }

    /// The form this node takes after one trip through the collaborative tree.
    ///
    /// Marks become a canonically ordered set and links gain the default
    /// target. Attributes go through the coercion table, and empty text
    /// nodes disappear.
    pub fn normalized(&self) -> Option<JsonNode> {
        match self {
            JsonNode::Text(text) if text.text.is_empty() => None,
            JsonNode::Text(text) => Some(JsonNode::Text(TextNode {
                text: text.text.clone(),
                marks: text
                    .marks
                    .iter()
                    .cloned()
                    .collect::<MarkSet>()
                    .to_marks()
                    .into_iter()
                    .map(Mark::normalized)
                    .collect(),
            })),
            JsonNode::Block(block) => Some(JsonNode::Block(BlockNode {
                node_type: block.node_type.clone(),
                attrs: block
                    .attrs
                    .iter()
                    .filter_map(|(key, value)| {
                        coercion::normalize(key, value).map(|value| (key.clone(), value))
                    })
                    .collect(),
                content: normalize_nodes(&block.content),
            })),
        }
    }
}

/// Normalize a node list, dropping nodes that vanish in the tree.
///
/// A block named like a text node cannot exist in the tree, so its children
/// take its place.
pub fn normalize_nodes(nodes: &[JsonNode]) -> Vec<JsonNode> {
    let mut normalized = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            JsonNode::Block(block) if block.node_type.as_str() == TEXT_NODE_TYPE => {
                normalized.extend(normalize_nodes(&block.content));
            }
            _ => normalized.extend(node.normalized()),
        }
    }
    normalized
}

impl From<TextNode> for JsonNode {
    fn from(text: TextNode) -> Self {
        JsonNode::Text(text)
    }
}

impl From<BlockNode> for JsonNode {
    fn from(block: BlockNode) -> Self {
        JsonNode::Block(block)
    }
}

impl Serialize for JsonNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonNode::Text(text) => text.serialize(serializer),
            JsonNode::Block(block) => block.serialize(serializer),
        }
    }
}

/// A run of text with inline marks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Vec::new(),
        }
    }

    /// Add a mark to this text node
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Check if a mark of the given type applies
    pub fn has_mark(&self, mark_type: MarkType) -> bool {
        self.marks.iter().any(|mark| mark.mark_type == mark_type)
    }
}

impl Serialize for TextNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.marks.is_empty() { 2 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", TEXT_NODE_TYPE)?;
        map.serialize_entry("text", &self.text)?;
        if !self.marks.is_empty() {
            map.serialize_entry("marks", &self.marks)?;
        }
        map.end()
    }
}

/// A typed block with attributes and child nodes
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub node_type: BlockType,
    pub attrs: Attrs,
    pub content: Vec<JsonNode>,
}

impl BlockNode {
    pub fn new(node_type: impl Into<BlockType>) -> Self {
        Self {
            node_type: node_type.into(),
            attrs: Attrs::new(),
            content: Vec::new(),
        }
    }

    /// Set an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Append a child node
    pub fn with_child(mut self, child: impl Into<JsonNode>) -> Self {
        self.content.push(child.into());
        self
    }

    /// Replace the child list
    pub fn with_content(mut self, content: Vec<JsonNode>) -> Self {
        self.content = content;
        self
    }
}

impl Serialize for BlockNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + usize::from(!self.attrs.is_empty()) + usize::from(!self.content.is_empty());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", self.node_type.as_str())?;
        if !self.attrs.is_empty() {
            map.serialize_entry("attrs", &self.attrs)?;
        }
        if !self.content.is_empty() {
            map.serialize_entry("content", &self.content)?;
        }
        map.end()
    }
}

/// Lenient wire form of a node.
///
/// Every field is optional so that partially valid payloads (paste, import)
/// still produce a best-effort tree.
#[derive(Deserialize)]
struct RawNode {
    #[serde(rename = "type", default)]
    node_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    marks: Option<Vec<RawMark>>,
    #[serde(default)]
    attrs: Option<Value>,
    #[serde(default)]
    content: Option<Vec<JsonNode>>,
}

#[derive(Deserialize)]
struct RawMark {
    #[serde(rename = "type", default)]
    mark_type: Option<String>,
    #[serde(default)]
    attrs: Option<Value>,
}

impl RawMark {
    fn into_mark(self) -> Option<Mark> {
        let name = self.mark_type.unwrap_or_default();
        let Some(mark_type) = MarkType::from_name(&name) else {
            tracing::debug!("Dropping unknown mark type {:?}", name);
            return None;
        };
        Some(Mark {
            mark_type,
            attrs: into_attrs(self.attrs),
        })
    }
}

fn into_attrs(value: Option<Value>) -> Option<Attrs> {
    match value {
        Some(Value::Object(attrs)) => Some(attrs),
        _ => None,
    }
}

impl From<RawNode> for JsonNode {
    fn from(raw: RawNode) -> Self {
        let node_type = raw.node_type.unwrap_or_default();
        if node_type == TEXT_NODE_TYPE {
            JsonNode::Text(TextNode {
                text: raw.text.unwrap_or_default(),
                marks: raw
                    .marks
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(RawMark::into_mark)
                    .collect(),
            })
        } else {
            JsonNode::Block(BlockNode {
                node_type: BlockType::from(node_type),
                attrs: into_attrs(raw.attrs).unwrap_or_default(),
                content: raw.content.unwrap_or_default(),
            })
        }
    }
}
