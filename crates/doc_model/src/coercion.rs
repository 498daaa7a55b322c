//! Attribute coercion between tree strings and typed JSON values
//!
//! Element attributes in the collaborative tree are plain strings, while the
//! JSON schema carries typed values. The rules live in one table so new
//! coercions can be added without touching the decoder or encoder.

use serde_json::Value;

/// How an attribute value is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrRule {
    /// Decimal integer string in the tree, JSON number in the document
    Integer,
}

/// Attribute keys with a coercion rule; all other keys pass through.
pub const ATTRIBUTE_RULES: &[(&str, AttrRule)] = &[("level", AttrRule::Integer)];

/// Look up the coercion rule for an attribute key
pub fn rule_for(key: &str) -> Option<AttrRule> {
    ATTRIBUTE_RULES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, rule)| *rule)
}

/// Convert a tree attribute string into its JSON value.
///
/// A value that does not satisfy its rule is kept as a string.
pub fn to_json(key: &str, value: &str) -> Value {
    match rule_for(key) {
        Some(AttrRule::Integer) => value
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        None => Value::String(value.to_string()),
    }
}

/// Convert a JSON attribute value into its tree string.
///
/// Strings pass through unchanged, other scalars and containers are stored as
/// their JSON text. `null` means "no attribute" and yields `None`.
pub fn to_tree(key: &str, value: &Value) -> Option<String> {
    match (rule_for(key), value) {
        (_, Value::Null) => None,
        (_, Value::String(s)) => Some(s.clone()),
        (Some(AttrRule::Integer), Value::Number(n)) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => Some(n.to_string()),
        },
        (_, other) => Some(other.to_string()),
    }
}

/// The value an attribute takes after one trip through the tree.
pub fn normalize(key: &str, value: &Value) -> Option<Value> {
    to_tree(key, value).map(|stored| to_json(key, &stored))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_level_coercion() {
        assert_eq!(to_json("level", "2"), json!(2));
        assert_eq!(to_tree("level", &json!(2)), Some("2".to_string()));
        assert_eq!(to_tree("level", &json!("3")), Some("3".to_string()));
    }

    #[test]
    fn test_unparseable_level_stays_string() {
        assert_eq!(to_json("level", "two"), json!("two"));
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(to_json("language", "rust"), json!("rust"));
        assert_eq!(to_json("start", "3"), json!("3"));
        assert_eq!(to_tree("src", &json!("a.png")), Some("a.png".to_string()));
        assert_eq!(to_tree("checked", &json!(true)), Some("true".to_string()));
        assert_eq!(to_tree("src", &Value::Null), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("level", &json!("4")), Some(json!(4)));
        assert_eq!(normalize("checked", &json!(false)), Some(json!("false")));
        assert_eq!(normalize("title", &Value::Null), None);
    }

    proptest! {
        #[test]
        fn test_level_survives_tree(level in any::<i64>()) {
            let stored = to_tree("level", &json!(level));
            prop_assert_eq!(stored.as_deref().map(|s| to_json("level", s)), Some(json!(level)));
        }

        #[test]
        fn test_normalize_is_idempotent(key in "[a-z]{1,6}", text in ".{0,16}") {
            let value = Value::String(text);
            let once = normalize(&key, &value);
            let twice = once.as_ref().and_then(|v| normalize(&key, v));
            prop_assert_eq!(twice, once);
        }
    }
}
