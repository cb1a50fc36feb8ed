// SPDX-License-Identifier: MIT OR Apache-2.0
use acc_error::{AccError, ErrorCode};
use jsonc_parser::parse_to_serde_value;
use jsonc_parser::ParseOptions;

/// Parse a JSONC document (JSON + `//`/`/* */` comments + trailing
/// commas), used for Claude Code's `settings.json` and OpenCode's
/// `opencode.json` (spec §6.2).
///
/// Returns a systemic [`AccError`] only for a genuinely malformed
/// document; per the "never throw for user config defects" policy, a
/// caller scanning settings files should treat this as "localized parse
/// error" and fold it into the scan's warnings rather than propagate it.
pub fn parse_jsonc(content: &str) -> Result<serde_json::Value, AccError> {
    parse_to_serde_value(content, &ParseOptions::default())
        .map_err(|e| {
            AccError::new(ErrorCode::SerializationFailed, format!("invalid JSONC: {e}"))
        })?
        .ok_or_else(|| AccError::new(ErrorCode::SerializationFailed, "empty JSONC document"))
}

/// Parse JSONC, returning `None` instead of erroring on any failure —
/// the common case for scanners, which treat malformed config files as
/// absent (spec §7: "Malformed JSON/YAML" -> "silently-empty for config
/// files").
#[must_use]
pub fn parse_jsonc_lenient(content: &str) -> Option<serde_json::Value> {
    parse_jsonc(content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_and_trailing_commas() {
        let src = r#"{
            // a comment
            "model": "opus", /* trailing */
            "autoUpdate": true,
        }"#;
        let v = parse_jsonc(src).unwrap();
        assert_eq!(v["model"], "opus");
        assert_eq!(v["autoUpdate"], true);
    }

    #[test]
    fn plain_json_parses_too() {
        let v = parse_jsonc(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn lenient_returns_none_on_garbage() {
        assert!(parse_jsonc_lenient("{not json at all !!!").is_none());
    }

    #[test]
    fn empty_document_errors() {
        assert!(parse_jsonc("").is_err());
    }
}
