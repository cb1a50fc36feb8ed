// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON merge strategies applied when a target config file already exists
//! (spec §4.9).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How to combine an incoming rendered JSON value with whatever is already
/// on disk at the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Shallow `{...existing, ...incoming}`: incoming wins on key collision.
    Overwrite,
    /// Add only keys absent from `existing`; recurse one level into nested
    /// objects.
    PreserveExisting,
    /// Recursive merge: scalars keep the existing value, arrays become a
    /// set-union preserving existing order then new entries.
    Merge,
}

/// Merge `incoming` into `existing` per `strategy` (spec §4.9). `existing`
/// is `None` when the target file didn't exist yet or was malformed JSON
/// (treated as empty).
#[must_use]
pub fn merge_json(existing: Option<&Value>, incoming: &Value, strategy: MergeStrategy) -> Value {
    let Some(existing) = existing else {
        return incoming.clone();
    };
    match strategy {
        MergeStrategy::Overwrite => shallow_overwrite(existing, incoming),
        MergeStrategy::PreserveExisting => preserve_existing(existing, incoming, 1),
        MergeStrategy::Merge => deep_merge(existing, incoming),
    }
}

fn shallow_overwrite(existing: &Value, incoming: &Value) -> Value {
    let (Some(existing), Some(incoming)) = (existing.as_object(), incoming.as_object()) else {
        return incoming.clone();
    };
    let mut out = existing.clone();
    for (k, v) in incoming {
        out.insert(k.clone(), v.clone());
    }
    Value::Object(out)
}

/// `depth` bounds the one-level-of-nested-object recursion the spec calls
/// for: depth 1 is the top level, depth 0 stops recursing.
fn preserve_existing(existing: &Value, incoming: &Value, depth: u8) -> Value {
    let (Some(existing_obj), Some(incoming_obj)) = (existing.as_object(), incoming.as_object()) else {
        return existing.clone();
    };
    let mut out = existing_obj.clone();
    for (k, v) in incoming_obj {
        match out.get(k) {
            None => {
                out.insert(k.clone(), v.clone());
            }
            Some(existing_v) if depth > 0 && existing_v.is_object() && v.is_object() => {
                out.insert(k.clone(), preserve_existing(existing_v, v, depth - 1));
            }
            Some(_) => {}
        }
    }
    Value::Object(out)
}

fn deep_merge(existing: &Value, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Value::Object(e), Value::Object(i)) => {
            let mut out = Map::new();
            for (k, v) in e {
                out.insert(k.clone(), v.clone());
            }
            for (k, v) in i {
                match out.get(k) {
                    Some(existing_v) => {
                        out.insert(k.clone(), deep_merge(existing_v, v));
                    }
                    None => {
                        out.insert(k.clone(), v.clone());
                    }
                }
            }
            Value::Object(out)
        }
        (Value::Array(e), Value::Array(i)) => {
            let mut out = e.clone();
            for item in i {
                if !out.contains(item) {
                    out.push(item.clone());
                }
            }
            Value::Array(out)
        }
        (existing, _incoming) => existing.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_existing_value_returns_incoming_unchanged() {
        let incoming = serde_json::json!({"a": 1});
        assert_eq!(merge_json(None, &incoming, MergeStrategy::Merge), incoming);
    }

    #[test]
    fn overwrite_is_shallow_incoming_wins() {
        let existing = serde_json::json!({"a": 1, "b": {"x": 1}});
        let incoming = serde_json::json!({"b": {"y": 2}, "c": 3});
        let merged = merge_json(Some(&existing), &incoming, MergeStrategy::Overwrite);
        assert_eq!(merged, serde_json::json!({"a": 1, "b": {"y": 2}, "c": 3}));
    }

    #[test]
    fn preserve_existing_keeps_existing_scalars_and_recurses_one_level() {
        let existing = serde_json::json!({"model": "opus", "permission": {"bash": "ask"}});
        let incoming = serde_json::json!({"model": "sonnet", "permission": {"bash": "allow", "edit": "allow"}, "small_model": "haiku"});
        let merged = merge_json(Some(&existing), &incoming, MergeStrategy::PreserveExisting);
        assert_eq!(
            merged,
            serde_json::json!({
                "model": "opus",
                "permission": {"bash": "ask", "edit": "allow"},
                "small_model": "haiku",
            })
        );
    }

    #[test]
    fn merge_keeps_existing_scalar_but_unions_arrays() {
        let existing = serde_json::json!({"model": "opus", "mcpServers": {"fs": true}, "tags": ["a", "b"]});
        let incoming = serde_json::json!({"model": "sonnet", "mcpServers": {"docs": true}, "tags": ["b", "c"]});
        let merged = merge_json(Some(&existing), &incoming, MergeStrategy::Merge);
        assert_eq!(
            merged,
            serde_json::json!({
                "model": "opus",
                "mcpServers": {"fs": true, "docs": true},
                "tags": ["a", "b", "c"],
            })
        );
    }

    #[test]
    fn preserve_existing_does_not_recurse_past_one_level() {
        let existing = serde_json::json!({"a": {"b": {"c": 1}}});
        let incoming = serde_json::json!({"a": {"b": {"d": 2}}});
        let merged = merge_json(Some(&existing), &incoming, MergeStrategy::PreserveExisting);
        // depth exhausted at the "b" object: its value is kept as-is.
        assert_eq!(merged, serde_json::json!({"a": {"b": {"c": 1}}}));
    }
}
