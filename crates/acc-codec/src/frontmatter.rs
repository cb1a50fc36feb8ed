// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;

/// A markdown file split into its YAML frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterDoc {
    /// Parsed frontmatter fields (empty if the file had none).
    pub frontmatter: BTreeMap<String, serde_json::Value>,
    /// Everything after the closing `---` (or the whole file, if there
    /// was no frontmatter block).
    pub body: String,
}

/// Strip a leading `---\n<yaml>\n---\n` block, matching the spec's regex
/// `^---\r?\n[\s\S]*?\r?\n---\r?\n?([\s\S]*)$`, and return only the body.
/// Content with no frontmatter block is returned unchanged.
#[must_use]
pub fn extract_body(content: &str) -> String {
    match split_frontmatter_block(content) {
        Some((_, body)) => body,
        None => content.to_string(),
    }
}

/// Parse a markdown-with-frontmatter document.
///
/// Strict YAML parsing is attempted first; if that fails, a lenient
/// line-based fallback applies (spec §6.2): split each line on the first
/// `:`, with value parsing for `null`/`~`/empty string, `true`/`false`,
/// integers, floats, else a raw string.
#[must_use]
pub fn parse_frontmatter(content: &str) -> FrontmatterDoc {
    let Some((yaml_block, body)) = split_frontmatter_block(content) else {
        return FrontmatterDoc {
            frontmatter: BTreeMap::new(),
            body: content.to_string(),
        };
    };

    let frontmatter = match serde_yaml_ng::from_str::<serde_yaml_ng::Value>(&yaml_block) {
        Ok(serde_yaml_ng::Value::Mapping(map)) => yaml_mapping_to_json_map(&map),
        Ok(_) | Err(_) => parse_lenient(&yaml_block),
    };

    FrontmatterDoc { frontmatter, body }
}

/// Serialize frontmatter fields and a body back into
/// `---\n<yaml>\n---\n\n<body>\n` (spec §4.3 `serializeFrontmatter`).
#[must_use]
pub fn serialize_frontmatter(
    frontmatter: &BTreeMap<String, serde_json::Value>,
    body: &str,
) -> String {
    if frontmatter.is_empty() {
        return format!("{}\n", body.trim_end_matches('\n'));
    }
    let yaml_map: serde_yaml_ng::Mapping = frontmatter
        .iter()
        .map(|(k, v)| {
            (
                serde_yaml_ng::Value::String(k.clone()),
                json_to_yaml_value(v),
            )
        })
        .collect();
    let yaml = serde_yaml_ng::to_string(&serde_yaml_ng::Value::Mapping(yaml_map))
        .unwrap_or_default();
    format!(
        "---\n{}---\n\n{}\n",
        yaml,
        body.trim_end_matches('\n')
    )
}

/// Find and split off a leading frontmatter block. Returns
/// `(yaml_text, remaining_body)`, or `None` if `content` doesn't start
/// with a `---` delimiter line.
fn split_frontmatter_block(content: &str) -> Option<(String, String)> {
    let rest = content.strip_prefix("---\r\n").or_else(|| content.strip_prefix("---\n"))?;

    // Find the closing "---" on its own line.
    let mut search_from = 0usize;
    loop {
        let idx = rest[search_from..].find("---")?;
        let abs = search_from + idx;
        let preceded_by_newline = abs == 0 || rest.as_bytes().get(abs - 1) == Some(&b'\n');
        if !preceded_by_newline {
            search_from = abs + 3;
            continue;
        }
        let yaml_end = if abs > 0 && rest.as_bytes()[abs - 1] == b'\n' {
            abs
        } else {
            abs
        };
        let yaml_text = rest[..yaml_end].trim_end_matches("\r\n").trim_end_matches('\n');
        let after = &rest[abs + 3..];
        let after = after.strip_prefix("\r\n").or_else(|| after.strip_prefix('\n')).unwrap_or(after);
        return Some((format!("{yaml_text}\n"), after.to_string()));
    }
}

fn yaml_mapping_to_json_map(map: &serde_yaml_ng::Mapping) -> BTreeMap<String, serde_json::Value> {
    let mut out = BTreeMap::new();
    for (k, v) in map {
        if let Some(key) = k.as_str() {
            out.insert(key.to_string(), yaml_to_json_value(v));
        }
    }
    out
}

fn yaml_to_json_value(v: &serde_yaml_ng::Value) -> serde_json::Value {
    serde_json::to_value(v).unwrap_or(serde_json::Value::Null)
}

fn json_to_yaml_value(v: &serde_json::Value) -> serde_yaml_ng::Value {
    serde_yaml_ng::to_value(v).unwrap_or(serde_yaml_ng::Value::Null)
}

/// Lenient fallback parser: one `key: value` pair per line.
fn parse_lenient(yaml_text: &str) -> BTreeMap<String, serde_json::Value> {
    let mut out = BTreeMap::new();
    for line in yaml_text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        out.insert(key.to_string(), parse_lenient_scalar(value));
    }
    out
}

fn parse_lenient_scalar(raw: &str) -> serde_json::Value {
    let unquoted = strip_matching_quotes(raw);
    if raw.is_empty() || raw == "~" || raw.eq_ignore_ascii_case("null") {
        return serde_json::Value::Null;
    }
    if raw.eq_ignore_ascii_case("true") {
        return serde_json::Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return serde_json::Value::Bool(false);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return serde_json::Value::Number(n);
        }
    }
    serde_json::Value::String(unquoted.to_string())
}

fn strip_matching_quotes(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_body_strips_frontmatter() {
        let content = "---\nname: x\n---\nhello\n";
        assert_eq!(extract_body(content), "hello\n");
    }

    #[test]
    fn extract_body_passes_through_when_no_frontmatter() {
        let content = "just text";
        assert_eq!(extract_body(content), "just text");
    }

    #[test]
    fn parse_frontmatter_strict_yaml() {
        let content = "---\nname: reviewer\ntemperature: 0.1\n---\nBody text\n";
        let doc = parse_frontmatter(content);
        assert_eq!(doc.frontmatter.get("name").unwrap(), "reviewer");
        assert_eq!(doc.body, "Body text\n");
    }

    #[test]
    fn parse_frontmatter_lenient_fallback_on_bad_yaml() {
        // Unbalanced brackets break strict YAML mapping parse but the
        // lenient per-line fallback still extracts key: value pairs.
        let content = "---\nname: x\nbroken: [1, 2\n---\nbody\n";
        let doc = parse_frontmatter(content);
        assert_eq!(doc.frontmatter.get("name").unwrap(), "x");
    }

    #[test]
    fn lenient_scalar_parsing_covers_types() {
        assert_eq!(parse_lenient_scalar("true"), serde_json::json!(true));
        assert_eq!(parse_lenient_scalar("false"), serde_json::json!(false));
        assert_eq!(parse_lenient_scalar("null"), serde_json::Value::Null);
        assert_eq!(parse_lenient_scalar("~"), serde_json::Value::Null);
        assert_eq!(parse_lenient_scalar(""), serde_json::Value::Null);
        assert_eq!(parse_lenient_scalar("42"), serde_json::json!(42));
        assert_eq!(parse_lenient_scalar("1.5"), serde_json::json!(1.5));
        assert_eq!(parse_lenient_scalar("hello"), serde_json::json!("hello"));
        assert_eq!(parse_lenient_scalar("\"hello\""), serde_json::json!("hello"));
    }

    #[test]
    fn serialize_then_extract_roundtrips_body() {
        let mut fm = BTreeMap::new();
        fm.insert("name".to_string(), serde_json::json!("x"));
        let out = serialize_frontmatter(&fm, "hello");
        assert!(out.starts_with("---\n"));
        assert_eq!(extract_body(&out), "hello\n");
    }

    #[test]
    fn serialize_with_empty_frontmatter_has_no_delimiters() {
        let fm = BTreeMap::new();
        let out = serialize_frontmatter(&fm, "hello");
        assert!(!out.contains("---"));
    }

    #[test]
    fn crlf_frontmatter_block_is_handled() {
        let content = "---\r\nname: x\r\n---\r\nbody\r\n";
        let doc = parse_frontmatter(content);
        assert_eq!(doc.frontmatter.get("name").unwrap(), "x");
    }
}
