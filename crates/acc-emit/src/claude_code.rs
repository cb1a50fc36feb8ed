// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical IR to Claude Code (spec §4.3). Always-apply rules
//! concatenate into `CLAUDE.md`; file-scoped/intelligent rules become
//! standalone files under `.claude/rules/` plus a manual-action note,
//! since Claude Code has no native applicability metadata for them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use acc_ir::{
    Action, CanonicalConversionResult, CanonicalScanResult, Format, GlobalConfig, McpServer,
    Permissions, PermissionsMap, ReportCategory, ReportItem, RuleFile, RuleType,
};

use crate::shared::{agent_to_markdown, sanitize_filename};

fn permissions_to_claude(permissions: &Permissions) -> serde_json::Value {
    let mut allow = Vec::new();
    let mut deny = Vec::new();
    let mut ask = Vec::new();

    for (tool, map) in permissions {
        if tool == "*" {
            continue;
        }
        let display = acc_mapping::permissions::claude_tool_display_name(tool);
        match map {
            PermissionsMap::Flat(action) => push_rule(action, &display, None, &mut allow, &mut deny, &mut ask),
            PermissionsMap::Nested(entries) => {
                for (pattern, action) in entries {
                    if pattern == "*" {
                        push_rule(action, &display, None, &mut allow, &mut deny, &mut ask);
                    } else {
                        push_rule(action, &display, Some(pattern.as_str()), &mut allow, &mut deny, &mut ask);
                    }
                }
            }
        }
    }

    let mut out = serde_json::json!({});
    if !allow.is_empty() {
        out["allow"] = serde_json::json!(allow);
    }
    if !deny.is_empty() {
        out["deny"] = serde_json::json!(deny);
    }
    if !ask.is_empty() {
        out["ask"] = serde_json::json!(ask);
    }
    let default_is_allow = permissions
        .get("*")
        .and_then(PermissionsMap::default_action)
        .is_some_and(|a| matches!(a, Action::Allow));
    if default_is_allow {
        out["defaultMode"] = serde_json::json!("bypassPermissions");
    }
    out
}

fn push_rule(
    action: &Action,
    display: &str,
    pattern: Option<&str>,
    allow: &mut Vec<String>,
    deny: &mut Vec<String>,
    ask: &mut Vec<String>,
) {
    let rule = match pattern {
        Some(p) => format!("{display}({p})"),
        None => display.to_string(),
    };
    match action {
        Action::Allow => allow.push(rule),
        Action::Deny => deny.push(rule),
        Action::Ask => ask.push(rule),
    }
}

fn mcp_servers_to_claude(servers: &BTreeMap<String, McpServer>) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (name, server) in servers {
        let entry = match server {
            McpServer::Local { command, args, env } => {
                let mut v = serde_json::json!({"command": command, "args": args});
                if !env.is_empty() {
                    v["env"] = serde_json::json!(env);
                }
                v
            }
            McpServer::Remote { url, headers, oauth, enabled } => {
                let kind = if url.contains("/sse") { "sse" } else { "http" };
                let mut v = serde_json::json!({"type": kind, "url": url});
                if !headers.is_empty() {
                    v["headers"] = serde_json::json!(headers);
                }
                if let Some(oauth) = oauth {
                    v["oauth"] = oauth.clone();
                }
                if let Some(enabled) = enabled {
                    v["enabled"] = serde_json::json!(enabled);
                }
                v
            }
        };
        out.insert(name.clone(), entry);
    }
    serde_json::Value::Object(out)
}

fn settings_json(config: &GlobalConfig) -> serde_json::Value {
    let mut settings = serde_json::json!({});
    if let Some(model) = &config.model {
        let stripped = model.strip_prefix("anthropic/").unwrap_or(model);
        settings["model"] = serde_json::json!(stripped);
    }
    if let Some(permissions) = &config.permissions {
        settings["permissions"] = permissions_to_claude(permissions);
    }
    if !config.env.is_empty() {
        settings["env"] = serde_json::json!(config.env);
    }
    if config.auto_update {
        settings["autoUpdatesChannel"] = serde_json::json!("latest");
    }
    if !config.mcp_servers.is_empty() {
        settings["mcpServers"] = mcp_servers_to_claude(&config.mcp_servers);
    }
    for (key, value) in &config.extra_settings {
        settings[key] = value.clone();
    }
    settings
}

fn is_general_or_always(rule: &RuleFile) -> bool {
    matches!(rule.rule_type, Some(RuleType::Always) | Some(RuleType::General)) || rule.always_apply == Some(true)
}

/// Render a set of rules into a `CLAUDE.md` body at `claude_md_path`
/// (always-apply rules concatenated) plus standalone files under
/// `rules_dir` for file-scoped/intelligent rules, appending a
/// manual-action note for each (spec §4.3).
fn emit_rules(rules: &[RuleFile], claude_md_path: &Path, rules_dir: &Path, result: &mut CanonicalConversionResult) {
    let mut claude_md_sections = Vec::new();
    for rule in rules {
        if is_general_or_always(rule) {
            claude_md_sections.push(rule.content.trim_end_matches('\n').to_string());
        } else {
            let filename = format!("{}.md", sanitize_filename(&rule.name));
            let path = rules_dir.join(filename);
            let globs: Vec<&str> = rule.globs.as_deref().map(|g| g.split(',').collect()).unwrap_or_default();
            let mut frontmatter = BTreeMap::new();
            frontmatter.insert("paths".to_string(), serde_json::json!(globs));
            let content = acc_codec::serialize_frontmatter(&frontmatter, &rule.content);
            result.rules.insert(path, content);
            result.report.manual_actions.push(format!(
                "Claude Code has no native file-scoped/intelligent rule applicability: review {} manually",
                rule.name
            ));
        }
    }
    if !claude_md_sections.is_empty() {
        let body = claude_md_sections.join("\n\n");
        result.rules.insert(claude_md_path.to_path_buf(), format!("{body}\n"));
    }
}

/// Emit a Claude Code tree from a canonical scan result. `env` resolves
/// the absolute global paths (`~/.Claude/settings.json`,
/// `~/.claude/CLAUDE.md`, ...); a missing `HOME` falls back to paths
/// relative to the process's working directory.
#[must_use]
pub fn emit(scan: &CanonicalScanResult, env: &acc_paths::Env) -> CanonicalConversionResult {
    let mut result = CanonicalConversionResult::new(scan.source_format, Format::ClaudeCode);

    let settings_path = acc_paths::claude_code::global_settings(env).unwrap_or_else(|| PathBuf::from(".Claude/settings.json"));
    result
        .global_config
        .insert(settings_path, serde_json::to_string_pretty(&settings_json(&scan.global)).unwrap_or_default());

    let global_rules_path = acc_paths::claude_code::global_rules(env).unwrap_or_else(|| PathBuf::from(".claude/CLAUDE.md"));
    let global_rules_dir = global_rules_path.parent().map(|p| p.join("rules")).unwrap_or_else(|| PathBuf::from(".claude/rules"));
    emit_rules(&scan.global.rules, &global_rules_path, &global_rules_dir, &mut result);
    for agent in &scan.global.agents {
        result.agents.insert(agent.path.clone(), agent_to_markdown(agent, "mode", "tools"));
    }
    for command in &scan.global.commands {
        result.commands.insert(command.path.clone(), command.content.clone());
    }
    if !scan.global.mcp_servers.is_empty() {
        result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "global mcp_servers", "~/.Claude/settings.json#mcpServers"));
    }

    for project in &scan.projects {
        let mut files = BTreeMap::new();
        let settings = settings_json(&project.config);
        if settings.as_object().is_some_and(|o| !o.is_empty()) {
            files.insert(
                project.project_path.join(".claude/settings.local.json"),
                serde_json::to_string_pretty(&settings).unwrap_or_default(),
            );
        }
        if !project.config.mcp_servers.is_empty() {
            let mcp_json = serde_json::json!({"mcpServers": mcp_servers_to_claude(&project.config.mcp_servers)});
            files.insert(project.project_path.join(".mcp.json"), serde_json::to_string_pretty(&mcp_json).unwrap_or_default());
            result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "project mcp_servers", ".mcp.json"));
        }
        if !files.is_empty() {
            result.project_configs.insert(project.project_path.clone(), files);
        }

        emit_rules(
            &project.config.rules,
            &project.project_path.join("CLAUDE.md"),
            &project.project_path.join(".claude/rules"),
            &mut result,
        );
        for agent in &project.config.agents {
            result.agents.insert(agent.path.clone(), agent_to_markdown(agent, "mode", "tools"));
        }
        for command in &project.config.commands {
            result.commands.insert(command.path.clone(), command.content.clone());
        }
    }

    result
}
