// SPDX-License-Identifier: MIT OR Apache-2.0
/// Parse a JSONL document: one JSON object per line, blank/garbage lines
/// skipped (spec §6.2).
#[must_use]
pub fn parse_jsonl(content: &str) -> Vec<serde_json::Value> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Serialize a sequence of values as JSONL, one compact JSON object per
/// line, each terminated with `\n`.
#[must_use]
pub fn serialize_jsonl<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a serde_json::Value>,
{
    let mut out = String::new();
    for v in values {
        if let Ok(line) = serde_json::to_string(v) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_value_per_line() {
        let content = "{\"a\":1}\n{\"a\":2}\n";
        let values = parse_jsonl(content);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["a"], 1);
    }

    #[test]
    fn skips_blank_and_garbage_lines() {
        let content = "{\"a\":1}\n\nnot json\n{\"a\":2}\n";
        let values = parse_jsonl(content);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn serialize_roundtrips() {
        let values = vec![serde_json::json!({"a": 1}), serde_json::json!({"b": 2})];
        let text = serialize_jsonl(values.iter());
        let back = parse_jsonl(&text);
        assert_eq!(back, values);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(parse_jsonl("").is_empty());
        assert_eq!(serialize_jsonl(std::iter::empty()), "");
    }
}
