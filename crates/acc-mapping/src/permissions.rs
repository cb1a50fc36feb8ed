// SPDX-License-Identifier: MIT OR Apache-2.0
//! The permissions converter (spec §4.5): normalizes each source format's
//! allow/deny/ask vocabulary into the IR's `Permissions` map, and the
//! reverse lowering used by emitters.

use std::collections::BTreeMap;

use acc_ir::{Action, Permissions, PermissionsMap};

/// Claude Code's canonical tool-name table (spec §4.5). `None` for an
/// unrecognized name signals "unknown tool -> warning, skip".
#[must_use]
pub fn map_claude_tool_name(tool: &str) -> Option<&'static str> {
    Some(match tool {
        "Read" => "read",
        "Write" => "write",
        "Edit" | "MultiEdit" => "edit",
        "Bash" => "bash",
        "Glob" => "glob",
        "Grep" => "grep",
        "WebFetch" => "webfetch",
        "WebSearch" => "websearch",
        "Task" => "task",
        "TodoRead" => "todoread",
        "TodoWrite" => "todowrite",
        "Skill" => "skill",
        _ => return None,
    })
}

/// Cursor's tool-name table; unrecognized names are lowercased rather
/// than rejected (spec §4.2).
#[must_use]
pub fn map_cursor_tool_name(tool: &str) -> String {
    match tool {
        "Shell" => "bash".to_string(),
        "Read" => "read".to_string(),
        "Write" => "write".to_string(),
        "Edit" => "edit".to_string(),
        other => other.to_lowercase(),
    }
}

/// The inverse of [`map_claude_tool_name`], used by the Claude Code
/// emitter to lower a canonical tool key back to Claude Code's display
/// name. Falls back to capitalizing the first letter for an unrecognized
/// canonical key (there should be none, since canonical keys only ever
/// arrive via `map_claude_tool_name` or `map_cursor_tool_name`).
#[must_use]
pub fn claude_tool_display_name(tool: &str) -> String {
    match tool {
        "read" => "Read".to_string(),
        "write" => "Write".to_string(),
        "edit" => "Edit".to_string(),
        "bash" => "Bash".to_string(),
        "glob" => "Glob".to_string(),
        "grep" => "Grep".to_string(),
        "webfetch" => "WebFetch".to_string(),
        "websearch" => "WebSearch".to_string(),
        "task" => "Task".to_string(),
        "todoread" => "TodoRead".to_string(),
        "todowrite" => "TodoWrite".to_string(),
        "skill" => "Skill".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

/// A parsed `Tool(pattern)` / bare `Tool` permission-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPattern {
    /// The raw tool token (not yet mapped to a canonical name).
    pub tool: String,
    /// The glob pattern, or `"*"` for a bare tool reference.
    pub pattern: String,
}

/// Parse `Tool(pattern)` -> `{tool, pattern}`; bare `Tool` -> `{tool,
/// "*"}`; anything else is not a recognizable permission entry.
#[must_use]
pub fn parse_tool_pattern(raw: &str) -> Option<ParsedPattern> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(open) = raw.find('(') {
        if raw.ends_with(')') {
            let tool = raw[..open].trim().to_string();
            let pattern = raw[open + 1..raw.len() - 1].trim().to_string();
            if tool.is_empty() {
                return None;
            }
            return Some(ParsedPattern { tool, pattern });
        }
        return None;
    }
    if raw.contains(['(', ')']) {
        return None;
    }
    Some(ParsedPattern {
        tool: raw.to_string(),
        pattern: "*".to_string(),
    })
}

/// Reject the JS prototype-pollution key set (spec §4.2).
#[must_use]
pub fn is_polluted_key(key: &str) -> bool {
    matches!(key, "__proto__" | "constructor" | "prototype")
}

/// Apply one `(pattern, action)` entry to the in-progress permissions
/// map for a single (already name-mapped, lowercase) tool key, following
/// the algorithm in spec §4.5 step 2.
fn apply_entry(permissions: &mut Permissions, tool: &str, pattern: &str, action: Action) {
    if pattern == "*" {
        match permissions.get_mut(tool) {
            Some(PermissionsMap::Nested(map)) => {
                map.insert("*".to_string(), action);
            }
            _ => {
                permissions.insert(tool.to_string(), PermissionsMap::Flat(action));
            }
        }
        return;
    }

    match permissions.get_mut(tool) {
        Some(PermissionsMap::Nested(map)) => {
            map.insert(pattern.to_string(), action);
        }
        Some(PermissionsMap::Flat(existing)) => {
            let mut map = BTreeMap::new();
            map.insert("*".to_string(), *existing);
            map.insert(pattern.to_string(), action);
            permissions.insert(tool.to_string(), PermissionsMap::Nested(map));
        }
        None => {
            let mut map = BTreeMap::new();
            map.insert(pattern.to_string(), action);
            permissions.insert(tool.to_string(), PermissionsMap::Nested(map));
        }
    }
}

/// Build the canonical permissions map from Claude Code's
/// `allow`/`deny`/`ask`/`allowedTools` lists and `defaultMode` (spec
/// §4.5). Unknown tool names produce a warning and are skipped.
pub fn build_claude_permissions(
    allow: &[String],
    deny: &[String],
    ask: &[String],
    allowed_tools: &[String],
    default_mode: Option<&str>,
    warnings: &mut Vec<String>,
) -> Permissions {
    let mut permissions: Permissions = BTreeMap::new();
    let default_action = if default_mode == Some("bypassPermissions") {
        Action::Allow
    } else {
        Action::Ask
    };
    permissions.insert("*".to_string(), PermissionsMap::Flat(default_action));

    for (list, action) in [
        (allow, Action::Allow),
        (deny, Action::Deny),
        (ask, Action::Ask),
        (allowed_tools, Action::Allow),
    ] {
        for raw in list {
            let Some(parsed) = parse_tool_pattern(raw) else {
                warnings.push(format!("unrecognized permission pattern: {raw}"));
                continue;
            };
            let Some(tool) = map_claude_tool_name(&parsed.tool) else {
                warnings.push(format!("unknown tool name in permission rule: {}", parsed.tool));
                continue;
            };
            apply_entry(&mut permissions, tool, &parsed.pattern, action);
        }
    }

    acc_ir::simplify_all(permissions)
}

/// Derive canonical permissions from a `tools: "Read, Edit, Bash, Grep"`
/// agent frontmatter field (spec §4.5). `bash` defaults to `ask` rather
/// than `allow` — every other recognized tool defaults to `allow`.
#[must_use]
pub fn agent_tools_to_permissions(tools: &[String]) -> Permissions {
    let mut permissions: Permissions = BTreeMap::new();
    for raw in tools {
        let Some(tool) = map_claude_tool_name(raw.trim()) else {
            continue;
        };
        let action = if tool == "bash" { Action::Ask } else { Action::Allow };
        permissions.insert(tool.to_string(), PermissionsMap::Flat(action));
    }
    permissions
}
