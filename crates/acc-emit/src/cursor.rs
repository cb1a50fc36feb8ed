// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical IR to Cursor (spec §4.3). Rules become MDC files with
//! `alwaysApply`/`globs`/`description` frontmatter; commands are plain
//! markdown with no frontmatter, matching Cursor's own convention.

use std::collections::BTreeMap;
use std::path::PathBuf;

use acc_ir::{
    CanonicalConversionResult, CanonicalScanResult, Format, McpServer, ProjectConfig,
    ReportCategory, ReportItem, RuleFile,
};

use crate::shared::sanitize_filename;

fn mcp_servers_to_cursor(servers: &BTreeMap<String, McpServer>, warnings: &mut Vec<String>) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (name, server) in servers {
        let entry = match server {
            McpServer::Local { command, args, env } => {
                let mut v = serde_json::json!({"command": command});
                if !args.is_empty() {
                    v["args"] = serde_json::json!(args);
                }
                if !env.is_empty() {
                    v["env"] = serde_json::json!(env);
                }
                v
            }
            McpServer::Remote { url, headers, oauth, .. } => {
                if acc_mapping::mcp::has_embedded_credential(url) {
                    warnings.push(format!("MCP server '{name}' has an embedded credential in its URL"));
                }
                let mut v = serde_json::json!({"url": url});
                if !headers.is_empty() {
                    v["headers"] = serde_json::json!(headers);
                }
                if let Some(oauth) = oauth {
                    v["auth"] = oauth.clone();
                }
                v
            }
        };
        out.insert(name.clone(), entry);
    }
    serde_json::Value::Object(out)
}

fn rule_to_mdc(rule: &RuleFile) -> String {
    let mut frontmatter = BTreeMap::new();
    if let Some(description) = &rule.description {
        frontmatter.insert("description".to_string(), serde_json::json!(description));
    }
    if let Some(globs) = &rule.globs {
        let list: Vec<&str> = globs.split(',').collect();
        frontmatter.insert("globs".to_string(), serde_json::json!(list));
    }
    frontmatter.insert("alwaysApply".to_string(), serde_json::json!(rule.always_apply.unwrap_or(false)));
    acc_codec::serialize_frontmatter(&frontmatter, &rule.content)
}

fn emit_project(project: &ProjectConfig, result: &mut CanonicalConversionResult) {
    let mut files = BTreeMap::new();
    if !project.config.mcp_servers.is_empty() {
        let mcp_json = serde_json::json!({"mcpServers": mcp_servers_to_cursor(&project.config.mcp_servers, &mut result.report.warnings)});
        files.insert(project.project_path.join(".cursor/mcp.json"), serde_json::to_string_pretty(&mcp_json).unwrap_or_default());
        result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "project mcp_servers", ".cursor/mcp.json"));
    }
    if !files.is_empty() {
        result.project_configs.insert(project.project_path.clone(), files);
    }

    for rule in &project.config.rules {
        let filename = format!("{}.mdc", sanitize_filename(&rule.name));
        let path = project.project_path.join(".cursor/rules").join(filename);
        result.rules.insert(path, rule_to_mdc(rule));
    }
    for agent in &project.config.agents {
        result.agents.insert(agent.path.clone(), crate::shared::agent_to_markdown(agent, "mode", "tools"));
    }
    for command in &project.config.commands {
        // Cursor commands carry no frontmatter (spec §4.3): body only.
        result.commands.insert(command.path.clone(), format!("{}\n", command.body.trim_end_matches('\n')));
    }
}

/// Emit a Cursor tree from a canonical scan result. `env` resolves the
/// absolute global `~/.cursor/` paths.
#[must_use]
pub fn emit(scan: &CanonicalScanResult, env: &acc_paths::Env) -> CanonicalConversionResult {
    let mut result = CanonicalConversionResult::new(scan.source_format, Format::Cursor);

    if let Some(global_paths) = acc_paths::cursor::global_paths(env) {
        if !scan.global.mcp_servers.is_empty() {
            let mcp_json = serde_json::json!({"mcpServers": mcp_servers_to_cursor(&scan.global.mcp_servers, &mut result.report.warnings)});
            result
                .global_config
                .insert(global_paths.mcp_json, serde_json::to_string_pretty(&mcp_json).unwrap_or_default());
            result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "global mcp_servers", "~/.cursor/mcp.json"));
        }
        if let Some(model) = &scan.global.model {
            let cli_config = serde_json::json!({"model": model});
            result
                .global_config
                .insert(global_paths.cli_config, serde_json::to_string_pretty(&cli_config).unwrap_or_default());
        }
    } else {
        let fallback_mcp = PathBuf::from(".cursor/mcp.json");
        if !scan.global.mcp_servers.is_empty() {
            let mcp_json = serde_json::json!({"mcpServers": mcp_servers_to_cursor(&scan.global.mcp_servers, &mut result.report.warnings)});
            result.global_config.insert(fallback_mcp, serde_json::to_string_pretty(&mcp_json).unwrap_or_default());
        }
    }

    for agent in &scan.global.agents {
        result.agents.insert(agent.path.clone(), crate::shared::agent_to_markdown(agent, "mode", "tools"));
    }
    for command in &scan.global.commands {
        result.commands.insert(command.path.clone(), format!("{}\n", command.body.trim_end_matches('\n')));
    }

    for project in &scan.projects {
        emit_project(project, &mut result);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_ir::RuleType;

    fn env() -> acc_paths::Env {
        acc_paths::Env::from_home("/home/u")
    }

    #[test]
    fn local_mcp_server_emits_command_args_env() {
        let mut scan = CanonicalScanResult::empty(Format::OpenCode);
        let mut project = acc_ir::ProjectConfig::new(PathBuf::from("/repo"));
        project.config.mcp_servers.insert(
            "fs".to_string(),
            McpServer::local("npx", vec!["-y".to_string()], BTreeMap::new()),
        );
        scan.projects.push(project);
        let result = emit(&scan, &env());
        let content = &result.project_configs[&PathBuf::from("/repo")][&PathBuf::from("/repo/.cursor/mcp.json")];
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(json["mcpServers"]["fs"]["command"], "npx");
        assert_eq!(json["mcpServers"]["fs"]["args"], serde_json::json!(["-y"]));
    }

    #[test]
    fn embedded_credential_url_produces_warning() {
        let mut scan = CanonicalScanResult::empty(Format::OpenCode);
        scan.global.mcp_servers.insert(
            "docs".to_string(),
            McpServer::Remote {
                url: "https://example.com/mcp?api_key=supersecret".to_string(),
                headers: BTreeMap::new(),
                oauth: None,
                enabled: None,
            },
        );
        let result = emit(&scan, &env());
        assert_eq!(result.report.warnings.len(), 1);
        assert!(result.report.warnings[0].contains("docs"));
    }

    #[test]
    fn always_apply_rule_becomes_mdc_with_always_apply_true() {
        let mut scan = CanonicalScanResult::empty(Format::OpenCode);
        let mut project = acc_ir::ProjectConfig::new(PathBuf::from("/repo"));
        project.config.rules.push(RuleFile {
            path: PathBuf::from("/x"),
            name: "style".to_string(),
            content: "Use TS".to_string(),
            always_apply: Some(true),
            globs: None,
            description: None,
            rule_type: Some(RuleType::Always),
        });
        scan.projects.push(project);
        let result = emit(&scan, &env());
        let content = &result.rules[&PathBuf::from("/repo/.cursor/rules/style.mdc")];
        assert!(content.contains("alwaysApply: true"));
        assert!(content.contains("Use TS"));
    }

    #[test]
    fn commands_emit_without_frontmatter() {
        let mut scan = CanonicalScanResult::empty(Format::OpenCode);
        scan.global.commands.push(acc_ir::Command {
            path: PathBuf::from("/p/commands/deploy.md"),
            name: "deploy".to_string(),
            content: "---\nname: deploy\n---\nDeploy it".to_string(),
            frontmatter: BTreeMap::new(),
            body: "Deploy it".to_string(),
            description: None,
        });
        let result = emit(&scan, &env());
        let content = &result.commands[&PathBuf::from("/p/commands/deploy.md")];
        assert!(!content.starts_with("---"));
        assert_eq!(content, "Deploy it\n");
    }
}
