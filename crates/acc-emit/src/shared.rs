// SPDX-License-Identifier: MIT OR Apache-2.0
//! Helpers shared by the three emitters: filename sanitization and the
//! generic frontmatter-document assembly used for agent/rule files.

use std::collections::BTreeMap;

use acc_ir::Agent;

/// Lower a free-form name to a filesystem-safe stem: lowercase,
/// non-alphanumeric runs collapse to a single `-`, leading/trailing `-`
/// trimmed. Used for `.claude/rules/<sanitized>.md` and
/// `.cursor/rules/<sanitized>.mdc` (spec §4.3).
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "rule".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Serialize an [`Agent`] back into a markdown-with-frontmatter document,
/// re-deriving the canonical fields but preserving any unrecognized
/// frontmatter keys the source carried (spec §9: `extra` catch-all).
#[must_use]
pub fn agent_to_markdown(agent: &Agent, mode_key: &str, tools_key: &str) -> String {
    let mut frontmatter: BTreeMap<String, serde_json::Value> = agent.frontmatter.clone();
    frontmatter.insert("name".to_string(), serde_json::json!(agent.name));
    if let Some(description) = &agent.description {
        frontmatter.insert("description".to_string(), serde_json::json!(description));
    }
    frontmatter.insert(mode_key.to_string(), serde_json::json!(mode_mnemonic(agent.mode)));
    frontmatter.insert("temperature".to_string(), serde_json::json!(agent.temperature));
    if let Some(max_steps) = agent.max_steps {
        frontmatter.insert("maxSteps".to_string(), serde_json::json!(max_steps));
    }
    if let Some(model) = &agent.model {
        frontmatter.insert("model".to_string(), serde_json::json!(model));
    }
    if let Some(color) = &agent.color {
        frontmatter.insert("color".to_string(), serde_json::json!(color));
    }
    if !agent.tools.is_empty() {
        frontmatter.insert(tools_key.to_string(), serde_json::json!(agent.tools.join(", ")));
    }
    acc_codec::serialize_frontmatter(&frontmatter, &agent.body)
}

fn mode_mnemonic(mode: acc_ir::AgentMode) -> &'static str {
    match mode {
        acc_ir::AgentMode::Primary => "primary",
        acc_ir::AgentMode::Subagent => "subagent",
        acc_ir::AgentMode::All => "all",
    }
}
