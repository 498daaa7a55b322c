//! Read-only access to the collaborative document tree
//!
//! The tree is a `yrs` XML structure: fragments and elements hold an ordered
//! list of children, elements carry string attributes, and text nodes carry
//! formatting ranges. Everything the converters need from the engine goes
//! through this module.

use doc_model::{BlockType, MarkType, TEXT_NODE_TYPE};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use yrs::types::text::YChange;
use yrs::{Any, Out, ReadTxn, Text, Xml, XmlElementRef, XmlFragment, XmlOut, XmlTextRef};

/// A child of a fragment or element
#[derive(Clone)]
pub enum TreeChild {
    Element(XmlElementRef),
    Text(XmlTextRef),
}

/// What an element stands for, decided by its node name alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Inline formatting wrapper around text
    Mark(MarkType),
    /// Structural block
    Block(BlockType),
    /// Element carrying the reserved text node name. JSON has no block of
    /// that type, so its children are spliced into the parent.
    Unwrap,
}

impl ElementKind {
    pub fn classify(name: &str) -> Self {
        if name == TEXT_NODE_TYPE {
            return ElementKind::Unwrap;
        }
        match MarkType::from_name(name) {
            Some(mark_type) => ElementKind::Mark(mark_type),
            None => ElementKind::Block(BlockType::from_name(name)),
        }
    }
}

/// A contiguous range of a text node sharing one set of formatting attributes
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub format: BTreeMap<String, Value>,
}

/// Children of a container in document order
pub fn children<C: XmlFragment, T: ReadTxn>(container: &C, txn: &T) -> Vec<TreeChild> {
    container
        .children(txn)
        .filter_map(|node| match node {
            XmlOut::Element(element) => Some(TreeChild::Element(element)),
            XmlOut::Text(text) => Some(TreeChild::Text(text)),
            // Fragments only appear as document roots
            XmlOut::Fragment(_) => None,
        })
        .collect()
}

/// Node name of an element
pub fn tag(element: &XmlElementRef) -> String {
    element.tag().to_string()
}

/// All attributes of an element that hold a scalar value
pub fn attributes<T: ReadTxn>(element: &XmlElementRef, txn: &T) -> BTreeMap<String, String> {
    element
        .attributes(txn)
        .filter_map(|(key, value)| out_to_string(value).map(|value| (key.to_string(), value)))
        .collect()
}

/// A single attribute of an element
pub fn attribute<T: ReadTxn>(element: &XmlElementRef, txn: &T, key: &str) -> Option<String> {
    element.get_attribute(txn, key).and_then(out_to_string)
}

/// Text of a text node split into formatting runs
pub fn text_spans<T: ReadTxn>(text: &XmlTextRef, txn: &T) -> Vec<TextSpan> {
    text.diff(txn, YChange::identity)
        .into_iter()
        .filter_map(|diff| {
            // Embedded objects carry no text
            let Out::Any(Any::String(chunk)) = diff.insert else {
                return None;
            };
            let format = diff
                .attributes
                .map(|attrs| {
                    attrs
                        .iter()
                        .map(|(key, value)| (key.to_string(), any_to_json(value)))
                        .collect()
                })
                .unwrap_or_default();
            Some(TextSpan {
                text: chunk.to_string(),
                format,
            })
        })
        .collect()
}

fn out_to_string(value: Out) -> Option<String> {
    match value {
        Out::Any(Any::String(s)) => Some(s.to_string()),
        Out::Any(Any::Null) | Out::Any(Any::Undefined) => None,
        Out::Any(other) => Some(any_to_json(&other).to_string()),
        _ => None,
    }
}

/// Convert an engine value into JSON.
///
/// Whole numbers come back as JSON integers.
pub fn any_to_json(any: &Any) -> Value {
    match any {
        Any::Null | Any::Undefined => Value::Null,
        Any::Bool(b) => Value::Bool(*b),
        Any::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => Value::from(*n as i64),
        Any::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Any::BigInt(i) => Value::from(*i),
        Any::String(s) => Value::String(s.to_string()),
        Any::Buffer(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        Any::Array(items) => Value::Array(items.iter().map(any_to_json).collect()),
        Any::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), any_to_json(value)))
                .collect(),
        ),
    }
}

/// Convert JSON into an engine value.
///
/// Numbers are stored as doubles so that JavaScript replicas read them as
/// plain numbers.
pub fn json_to_any(value: &Value) -> Any {
    match value {
        Value::Null => Any::Null,
        Value::Bool(b) => Any::Bool(*b),
        Value::Number(n) => Any::Number(n.as_f64().unwrap_or_default()),
        Value::String(s) => Any::String(Arc::from(s.as_str())),
        Value::Array(items) => Any::Array(items.iter().map(json_to_any).collect()),
        Value::Object(entries) => Any::Map(Arc::new(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), json_to_any(value)))
                .collect(),
        )),
    }
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
