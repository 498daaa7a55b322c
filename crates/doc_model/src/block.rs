//! Block node types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration of block node types.
///
/// Known editor blocks get their own variant; anything else is carried
/// through as [`BlockType::Other`] so unfamiliar content survives conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Paragraph,
    Heading,
    Blockquote,
    BulletList,
    OrderedList,
    ListItem,
    TaskList,
    TaskItem,
    CodeBlock,
    HorizontalRule,
    HardBreak,
    Image,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    /// Block type not known to this crate
    Other(String),
}

impl BlockType {
    /// Resolve a node name into a block type
    pub fn from_name(name: &str) -> Self {
        match name {
            "paragraph" => BlockType::Paragraph,
            "heading" => BlockType::Heading,
            "blockquote" => BlockType::Blockquote,
            "bulletList" => BlockType::BulletList,
            "orderedList" => BlockType::OrderedList,
            "listItem" => BlockType::ListItem,
            "taskList" => BlockType::TaskList,
            "taskItem" => BlockType::TaskItem,
            "codeBlock" => BlockType::CodeBlock,
            "horizontalRule" => BlockType::HorizontalRule,
            "hardBreak" => BlockType::HardBreak,
            "image" => BlockType::Image,
            "table" => BlockType::Table,
            "tableRow" => BlockType::TableRow,
            "tableCell" => BlockType::TableCell,
            "tableHeader" => BlockType::TableHeader,
            other => BlockType::Other(other.to_string()),
        }
    }

    /// Node name of this block type
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::Blockquote => "blockquote",
            BlockType::BulletList => "bulletList",
            BlockType::OrderedList => "orderedList",
            BlockType::ListItem => "listItem",
            BlockType::TaskList => "taskList",
            BlockType::TaskItem => "taskItem",
            BlockType::CodeBlock => "codeBlock",
            BlockType::HorizontalRule => "horizontalRule",
            BlockType::HardBreak => "hardBreak",
            BlockType::Image => "image",
            BlockType::Table => "table",
            BlockType::TableRow => "tableRow",
            BlockType::TableCell => "tableCell",
            BlockType::TableHeader => "tableHeader",
            BlockType::Other(name) => name,
        }
    }

    /// Check if this block is a known type
    pub fn is_known(&self) -> bool {
        !matches!(self, BlockType::Other(_))
    }
}

impl From<String> for BlockType {
    fn from(name: String) -> Self {
        BlockType::from_name(&name)
    }
}

impl From<&str> for BlockType {
    fn from(name: &str) -> Self {
        BlockType::from_name(name)
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_round_trip() {
        for name in ["paragraph", "heading", "bulletList", "tableHeader", "hardBreak"] {
            let block = BlockType::from_name(name);
            assert!(block.is_known(), "{name} should be known");
            assert_eq!(block.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_name_is_preserved() {
        let block = BlockType::from_name("callout");
        assert_eq!(block, BlockType::Other("callout".to_string()));
        assert_eq!(String::from(block), "callout");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&BlockType::OrderedList).unwrap();
        assert_eq!(json, "\"orderedList\"");
        let parsed: BlockType = serde_json::from_str("\"mention\"").unwrap();
        assert_eq!(parsed, BlockType::Other("mention".to_string()));
    }
}
