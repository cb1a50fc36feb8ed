// SPDX-License-Identifier: MIT OR Apache-2.0
//! Validation of rendered JSON config files: `settings.json`,
//! `opencode.json`, `mcp.json`, `cli-config.json`.

use std::path::Path;

use acc_ir::Format;
use serde_json::Value;

/// Option key substrings (lowercased) that look like they carry a secret,
/// used by the "provider secret-like option values" rule (spec §4.11).
const SECRET_KEY_PATTERNS: &[&str] = &["key", "token", "secret", "password", "credential"];

/// Keys that mark a `permission`/`permissions` object as Claude Code's
/// `{allow[], deny[], ask[], defaultMode}` shape rather than the flat
/// `tool -> action` map OpenCode/Cursor use.
const CLAUDE_PERMISSION_KEYS: &[&str] = &["allow", "deny", "ask", "defaultMode"];

pub(crate) fn validate_config_json(
    path: &Path,
    content: &str,
    target: Option<Format>,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            errors.push(format!("{}: invalid JSON: {e}", path.display()));
            return;
        }
    };
    let Some(obj) = value.as_object() else {
        errors.push(format!("{}: top-level value is not an object", path.display()));
        return;
    };

    // Claude Code's settings.json deliberately strips the `provider/`
    // prefix (acc-emit::claude_code::settings_json); every other target
    // keeps the fully-qualified canonical id.
    if target != Some(Format::ClaudeCode) {
        if let Some(model) = obj.get("model").and_then(Value::as_str) {
            if !model.contains('/') {
                errors.push(format!(
                    "{}: model '{model}' is not fully qualified (expected provider/model)",
                    path.display()
                ));
            }
        }
    }
    if let Some(small_model) = obj.get("small_model").and_then(Value::as_str) {
        if !small_model.contains('/') {
            errors.push(format!(
                "{}: small_model '{small_model}' is not fully qualified (expected provider/model)",
                path.display()
            ));
        }
    }

    if let Some(mcp) = obj.get("mcpServers").or_else(|| obj.get("mcp")).and_then(Value::as_object) {
        for (name, entry) in mcp {
            validate_mcp_entry(path, name, entry, errors, warnings);
        }
    }

    if let Some(permissions) = obj.get("permission").or_else(|| obj.get("permissions")) {
        validate_permissions_value(path, permissions, errors);
    }

    scan_secrets(&value, path, warnings);
}

/// Duck-typed MCP entry check tolerant of both the string `command` shape
/// (Claude Code/Cursor) and OpenCode's `command: [exe, ...args]` array.
fn validate_mcp_entry(path: &Path, name: &str, entry: &Value, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let Some(obj) = entry.as_object() else {
        errors.push(format!("{}: mcp server '{name}' is not an object", path.display()));
        return;
    };

    let url = obj.get("url").and_then(Value::as_str);
    let has_command = match obj.get("command") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(args)) => args.first().and_then(Value::as_str).is_some_and(|s| !s.is_empty()),
        _ => false,
    };

    match url {
        Some(url) if url.is_empty() => {
            errors.push(format!("{}: mcp server '{name}' has an empty url", path.display()));
        }
        Some(url) => {
            if acc_mapping::mcp::has_embedded_credential(url) {
                warnings.push(format!(
                    "{}: mcp server '{name}' has an embedded credential in its url",
                    path.display()
                ));
            }
        }
        None if !has_command => {
            errors.push(format!(
                "{}: mcp server '{name}' has neither a url nor a non-empty command",
                path.display()
            ));
        }
        None => {}
    }
}

fn validate_permissions_value(path: &Path, value: &Value, errors: &mut Vec<String>) {
    let Some(obj) = value.as_object() else {
        errors.push(format!("{}: permissions value is not an object", path.display()));
        return;
    };
    // Claude Code's allow/deny/ask-arrays-plus-defaultMode shape carries no
    // per-tool action map to validate at this level.
    if obj.keys().any(|k| CLAUDE_PERMISSION_KEYS.contains(&k.as_str())) {
        return;
    }
    for (tool, action_value) in obj {
        validate_permission_leaf_or_map(path, tool, action_value, errors);
    }
}

fn validate_permission_leaf_or_map(path: &Path, tool: &str, value: &Value, errors: &mut Vec<String>) {
    match value {
        Value::String(action) => {
            if !matches!(action.as_str(), "allow" | "deny" | "ask") {
                errors.push(format!("{}: permission '{tool}' has invalid action '{action}'", path.display()));
            }
        }
        Value::Object(patterns) => {
            for (pattern, action_value) in patterns {
                match action_value.as_str() {
                    Some(action) if matches!(action, "allow" | "deny" | "ask") => {}
                    Some(action) => errors.push(format!(
                        "{}: permission '{tool}.{pattern}' has invalid action '{action}'",
                        path.display()
                    )),
                    None => errors.push(format!(
                        "{}: permission '{tool}.{pattern}' is not a string action",
                        path.display()
                    )),
                }
            }
        }
        _ => errors.push(format!(
            "{}: permission '{tool}' is neither a flat action nor a pattern map",
            path.display()
        )),
    }
}

fn looks_like_secret_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SECRET_KEY_PATTERNS.iter().any(|pat| lower.contains(pat))
}

/// Recursively scan a JSON value for secret-like keys whose value is a
/// plain string that doesn't reference an environment variable (spec
/// §4.11: "provider secret-like option values ⇒ warning unless they begin
/// with `{env:`").
fn scan_secrets(value: &Value, path: &Path, warnings: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if let Value::String(s) = child {
                    if looks_like_secret_key(key) && !s.starts_with("{env:") {
                        warnings.push(format!(
                            "{}: option '{key}' looks like a secret value but is not an {{env:...}} reference",
                            path.display()
                        ));
                    }
                }
                scan_secrets(child, path, warnings);
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_secrets(item, path, warnings);
            }
        }
        _ => {}
    }
}
