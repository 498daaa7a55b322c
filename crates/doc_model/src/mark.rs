//! Inline formatting marks
//!
//! A mark is an inline annotation (bold, link, ...) applied to a text span. The
//! set of mark types is closed: every tree element whose name matches one of
//! them is a mark wrapper, everything else is a block.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Attribute object carried by block nodes and marks.
pub type Attrs = serde_json::Map<String, Value>;

/// Attribute key holding a link's URL
pub const LINK_HREF: &str = "href";
/// Attribute key holding a link's browsing context
pub const LINK_TARGET: &str = "target";
/// Link target used when a link carries none
pub const DEFAULT_LINK_TARGET: &str = "_blank";

/// The closed set of inline mark types.
///
/// Declaration order is the canonical order in which marks are listed on a
/// text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    Bold,
    Italic,
    Strike,
    Underline,
    Code,
    Link,
}

impl MarkType {
    /// All mark types in canonical order
    pub const ALL: [MarkType; 6] = [
        MarkType::Bold,
        MarkType::Italic,
        MarkType::Strike,
        MarkType::Underline,
        MarkType::Code,
        MarkType::Link,
    ];

    /// Wire name of this mark type
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkType::Bold => "bold",
            MarkType::Italic => "italic",
            MarkType::Strike => "strike",
            MarkType::Underline => "underline",
            MarkType::Code => "code",
            MarkType::Link => "link",
        }
    }

    /// Look up a mark type by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mark| mark.as_str() == name)
    }
}

impl fmt::Display for MarkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mark entry in a text node's `marks` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Attrs>,
}

impl Mark {
    /// Create a mark without attributes
    pub fn new(mark_type: MarkType) -> Self {
        Self {
            mark_type,
            attrs: None,
        }
    }

    /// Create a mark with attributes
    pub fn with_attrs(mark_type: MarkType, attrs: Attrs) -> Self {
        Self {
            mark_type,
            attrs: Some(attrs),
        }
    }

    /// Create a link mark
    pub fn link(href: impl Into<String>, target: Option<String>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert(LINK_HREF.to_string(), Value::String(href.into()));
        if let Some(target) = target {
            attrs.insert(LINK_TARGET.to_string(), Value::String(target));
        }
        Self::with_attrs(MarkType::Link, attrs)
    }

    /// Get an attribute value of this mark
    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.as_ref().and_then(|attrs| attrs.get(key))
    }

    /// The form this mark takes after one trip through the collaborative
    /// tree with default settings: links always carry a target.
    pub fn normalized(self) -> Self {
        if self.mark_type != MarkType::Link {
            return self;
        }
        let mut attrs = self.attrs.unwrap_or_default();
        attrs
            .entry(LINK_TARGET)
            .or_insert_with(|| Value::String(DEFAULT_LINK_TARGET.to_string()));
        Self::with_attrs(MarkType::Link, attrs)
    }
}

/// Marks keyed by type.
///
/// Marks on a text span are a set: inserting a mark whose type is already
/// present replaces the earlier entry. Iteration follows canonical
/// [`MarkType`] order regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkSet {
    marks: BTreeMap<MarkType, Option<Attrs>>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Insert a mark, replacing any mark of the same type
    pub fn insert(&mut self, mark: Mark) {
        self.marks.insert(mark.mark_type, mark.attrs);
    }

    /// Return a copy of this set extended with `mark`
    pub fn with(&self, mark: Mark) -> Self {
        let mut extended = self.clone();
        extended.insert(mark);
        extended
    }

    /// Return a copy of this set extended with every mark in `marks`
    pub fn with_all(&self, marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut extended = self.clone();
        extended.extend(marks);
        extended
    }

    /// Marks in canonical order
    pub fn to_marks(&self) -> Vec<Mark> {
        self.marks
            .iter()
            .map(|(mark_type, attrs)| Mark {
                mark_type: *mark_type,
                attrs: attrs.clone(),
            })
            .collect()
    }
}

impl Extend<Mark> for MarkSet {
    fn extend<I: IntoIterator<Item = Mark>>(&mut self, iter: I) {
        for mark in iter {
            self.insert(mark);
        }
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut set = MarkSet::new();
        set.extend(iter);
        set
    }
}
