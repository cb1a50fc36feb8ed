// SPDX-License-Identifier: MIT OR Apache-2.0
//! OpenCode scan results to canonical IR (spec §4.2). OpenCode's
//! permission structure *is* the canonical form, so it passes through
//! unchanged; the only real projection work is MCP `command[]`
//! splitting and markdown-file parsing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use acc_ir::{Action, ConversionReport, Format, GlobalConfig, McpServer, Permissions, PermissionsMap, ProjectConfig, ReportCategory, ReportItem, RuleFile, RuleType};
use opencode_scan::ScanResult;
use serde_json::Value;

use crate::mcp;
use crate::to_canonical::shared;

fn parse_permissions(value: &Value) -> Option<Permissions> {
    let obj = value.as_object()?;
    let mut permissions = Permissions::new();
    for (tool, entry) in obj {
        match entry {
            Value::String(s) => {
                if let Some(action) = Action::parse(s) {
                    permissions.insert(tool.clone(), PermissionsMap::Flat(action));
                }
            }
            Value::Object(nested) => {
                let mut map = BTreeMap::new();
                for (pattern, action) in nested {
                    if let Some(action) = action.as_str().and_then(Action::parse) {
                        map.insert(pattern.clone(), action);
                    }
                }
                permissions.insert(tool.clone(), PermissionsMap::Nested(map));
            }
            _ => {}
        }
    }
    Some(acc_ir::simplify_all(permissions))
}

fn parse_mcp_servers(value: &Value) -> BTreeMap<String, McpServer> {
    let Some(obj) = value.as_object() else {
        return BTreeMap::new();
    };
    let mut servers = BTreeMap::new();
    for (name, entry) in obj {
        let kind = entry.get("type").and_then(|v| v.as_str());
        match kind {
            Some("remote") => {
                let Some(url) = entry.get("url").and_then(|v| v.as_str()) else {
                    continue;
                };
                let headers = shared::string_map_field(entry.get("headers"));
                let oauth = entry.get("oauth").cloned();
                let enabled = entry.get("enabled").and_then(|v| v.as_bool());
                servers.insert(name.clone(), McpServer::Remote { url: url.to_string(), headers, oauth, enabled });
            }
            _ => {
                let command = entry.get("command").and_then(|v| v.as_array());
                let Some(command) = command else { continue };
                let mut parts = command.iter().filter_map(|v| v.as_str());
                let Some(head) = parts.next() else { continue };
                let args: Vec<String> = parts.map(str::to_string).collect();
                let env = shared::string_map_field(entry.get("environment"));
                servers.insert(name.clone(), McpServer::Local { command: head.to_string(), args, env });
            }
        }
    }
    servers
}

fn global_config_from(config: &Value, global: &mut GlobalConfig, extra: &mut BTreeMap<String, Value>, warnings: &mut Vec<String>) {
    global.model = config.get("model").and_then(|v| v.as_str()).map(str::to_string);
    global.small_model = config.get("small_model").and_then(|v| v.as_str()).map(str::to_string);
    global.provider = config.get("provider").and_then(|v| v.as_str()).map(str::to_string);
    if let Some(servers) = config.get("mcp") {
        global.mcp_servers = parse_mcp_servers(servers);
        warnings.extend(mcp::credential_warnings(&global.mcp_servers));
    }
    if let Some(perms) = config.get("permission") {
        global.permissions = parse_permissions(perms);
    }
    if let Some(obj) = config.as_object() {
        for (key, value) in obj {
            if !matches!(key.as_str(), "model" | "small_model" | "provider" | "mcp" | "permission" | "$schema") {
                extra.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Project an OpenCode [`ScanResult`] into a canonical scan result.
#[must_use]
pub fn map(scan: &ScanResult) -> (acc_ir::CanonicalScanResult, ConversionReport) {
    let mut report = ConversionReport::new();
    let mut warnings = Vec::new();
    let mut global = GlobalConfig::default();
    let mut extra = BTreeMap::new();

    if let Some(config) = &scan.global.config {
        global_config_from(config, &mut global, &mut extra, &mut warnings);
    }
    global.extra_settings = extra;

    for skill in &scan.global.skills {
        global.skills.push(acc_ir::Skill {
            path: skill.path.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            is_symlink: skill.is_symlink,
            symlink_target: skill.symlink_target.clone(),
        });
    }
    for agent in &scan.global.agents {
        global.agents.push(shared::agent_from_markdown_full(agent.path.clone(), &agent.content, "tools"));
    }
    for command in &scan.global.commands {
        global.commands.push(shared::command_from_markdown(command.path.clone(), &command.content));
    }
    if let Some(body) = &scan.global.agents_md {
        global.rules.push(RuleFile {
            path: PathBuf::from("AGENTS.md"),
            name: "AGENTS".to_string(),
            content: body.clone(),
            always_apply: Some(true),
            globs: None,
            description: None,
            rule_type: Some(RuleType::General),
        });
    }

    let mut projects = Vec::new();
    if let Some(project) = &scan.project {
        let mut config = GlobalConfig::default();
        let mut extra = BTreeMap::new();
        if let Some(value) = &project.config {
            global_config_from(value, &mut config, &mut extra, &mut warnings);
        }
        config.extra_settings = extra;
        if !config.mcp_servers.is_empty() {
            report.converted.push(ReportItem::new(ReportCategory::Mcp, "opencode.json#mcp", "mcpServers"));
        }

        for agent in &project.agents {
            config.agents.push(shared::agent_from_markdown_full(agent.path.clone(), &agent.content, "tools"));
        }
        for command in &project.commands {
            config.commands.push(shared::command_from_markdown(command.path.clone(), &command.content));
        }
        for skill in &project.skills {
            config.skills.push(acc_ir::Skill {
                path: skill.path.clone(),
                name: skill.name.clone(),
                description: skill.description.clone(),
                is_symlink: skill.is_symlink,
                symlink_target: skill.symlink_target.clone(),
            });
        }
        if let Some(body) = &project.agents_md {
            config.rules.push(RuleFile {
                path: project.project_path.join("AGENTS.md"),
                name: "AGENTS".to_string(),
                content: body.clone(),
                always_apply: Some(true),
                globs: None,
                description: None,
                rule_type: Some(RuleType::General),
            });
        }

        let mut project_config = ProjectConfig::new(project.project_path.clone());
        project_config.config = config;
        projects.push(project_config);
    }

    report.warnings.extend(warnings);

    (
        acc_ir::CanonicalScanResult {
            source_format: Format::OpenCode,
            global,
            projects,
        },
        report,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencode_scan::ProjectScan;

    #[test]
    fn maps_model_and_permissions_passthrough() {
        let mut scan = ScanResult::default();
        scan.global.config = Some(serde_json::json!({
            "model": "anthropic/claude-sonnet-4-5",
            "permission": {"bash": "ask", "edit": {"*": "allow", "src/**": "deny"}}
        }));
        let (canonical, _report) = map(&scan);
        assert_eq!(canonical.global.model.as_deref(), Some("anthropic/claude-sonnet-4-5"));
        let perms = canonical.global.permissions.unwrap();
        assert_eq!(perms.get("bash"), Some(&PermissionsMap::Flat(Action::Ask)));
    }

    #[test]
    fn splits_local_mcp_command_into_head_and_args() {
        let mut scan = ScanResult::default();
        scan.global.config = Some(serde_json::json!({
            "mcp": {"srv": {"type": "local", "command": ["npx", "-y", "pkg"]}}
        }));
        let (canonical, _report) = map(&scan);
        match &canonical.global.mcp_servers["srv"] {
            McpServer::Local { command, args, .. } => {
                assert_eq!(command, "npx");
                assert_eq!(args, &vec!["-y".to_string(), "pkg".to_string()]);
            }
            McpServer::Remote { .. } => panic!("expected local"),
        }
    }

    #[test]
    fn remote_mcp_parses_url_and_headers() {
        let mut scan = ScanResult::default();
        scan.global.config = Some(serde_json::json!({
            "mcp": {"srv": {"type": "remote", "url": "https://example.com", "headers": {"X-Key": "v"}}}
        }));
        let (canonical, _report) = map(&scan);
        match &canonical.global.mcp_servers["srv"] {
            McpServer::Remote { url, headers, .. } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(headers.get("X-Key"), Some(&"v".to_string()));
            }
            McpServer::Local { .. } => panic!("expected remote"),
        }
    }

    #[test]
    fn unknown_top_level_config_keys_preserved_as_extra() {
        let mut scan = ScanResult::default();
        scan.global.config = Some(serde_json::json!({"model": "x", "theme": "dark"}));
        let (canonical, _report) = map(&scan);
        assert!(canonical.global.extra_settings.contains_key("theme"));
    }

    #[test]
    fn remote_mcp_with_embedded_token_warns() {
        let mut scan = ScanResult::default();
        scan.global.config = Some(serde_json::json!({
            "mcp": {"srv": {"type": "remote", "url": "https://api.example.com?token=abc"}}
        }));
        let (_canonical, report) = map(&scan);
        assert!(report.warnings.iter().any(|w| w.contains("embedded credential") && w.contains("token")));
    }

    #[test]
    fn project_agents_are_mapped() {
        let mut scan = ScanResult::default();
        let mut project = ProjectScan::default();
        project.project_path = PathBuf::from("/repo");
        project.config = Some(serde_json::json!({"model": "anthropic/claude-opus-4-6"}));
        scan.project = Some(project);
        let (canonical, _report) = map(&scan);
        assert_eq!(canonical.projects[0].config.model.as_deref(), Some("anthropic/claude-opus-4-6"));
    }
}
