// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validation of rendered agent/command markdown files (spec §4.11:
//! "Agent and command files must begin with `---`").

use std::path::Path;

use acc_ir::Format;
use serde_json::Value;

pub(crate) fn validate_agent_file(path: &Path, content: &str, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if !content.starts_with("---") {
        errors.push(format!("{}: agent file does not begin with frontmatter", path.display()));
        return;
    }
    let doc = acc_codec::parse_frontmatter(content);

    if let Some(mode) = doc.frontmatter.get("mode").and_then(Value::as_str) {
        if !matches!(mode, "primary" | "subagent" | "all") {
            errors.push(format!("{}: agent mode '{mode}' is not one of subagent/primary/all", path.display()));
        }
    }
    if let Some(temperature) = doc.frontmatter.get("temperature").and_then(Value::as_f64) {
        if !(0.0..=2.0).contains(&temperature) {
            errors.push(format!("{}: agent temperature {temperature} is outside [0, 2]", path.display()));
        }
    }
    if let Some(max_steps) = doc.frontmatter.get("maxSteps").and_then(Value::as_i64) {
        if max_steps <= 0 {
            errors.push(format!("{}: agent maxSteps {max_steps} must be a positive integer", path.display()));
        }
    }
    if let Some(model) = doc.frontmatter.get("model").and_then(Value::as_str) {
        if !model.contains('/') {
            errors.push(format!(
                "{}: agent model '{model}' is not fully qualified (expected provider/model)",
                path.display()
            ));
        }
    }

    for (key, value) in &doc.frontmatter {
        if let Value::String(s) = value {
            let lower = key.to_ascii_lowercase();
            let looks_secret = ["key", "token", "secret", "password", "credential"]
                .iter()
                .any(|pat| lower.contains(pat));
            if looks_secret && !s.starts_with("{env:") {
                warnings.push(format!(
                    "{}: frontmatter field '{key}' looks like a secret value but is not an {{env:...}} reference",
                    path.display()
                ));
            }
        }
    }
}

/// Cursor commands are deliberately plain markdown with no frontmatter
/// (acc-emit::cursor, spec §4.3); every other target's commands pass
/// their original frontmatter through unmodified and are expected to
/// keep it.
pub(crate) fn validate_command_file(path: &Path, content: &str, target: Option<Format>, errors: &mut Vec<String>) {
    if target == Some(Format::Cursor) {
        return;
    }
    if !content.starts_with("---") {
        errors.push(format!("{}: command file does not begin with frontmatter", path.display()));
    }
}
