// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical IR to OpenCode (spec §4.3). OpenCode's permission shape
//! passes straight through (it *is* the canonical shape); the
//! interesting work is model-id translation, MCP command-array
//! assembly, and projecting Claude Code's `hooks` block into a
//! generated plugin stub.

use std::collections::BTreeMap;
use std::path::PathBuf;

use acc_ir::{
    CanonicalConversionResult, CanonicalScanResult, Format, GlobalConfig, McpServer,
    ReportCategory, ReportItem, RuleFile, RuleType,
};

use crate::shared::agent_to_markdown;

fn mcp_servers_to_opencode(servers: &BTreeMap<String, McpServer>) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    for (name, server) in servers {
        let entry = match server {
            McpServer::Local { command, args, env } => {
                let mut parts = vec![command.clone()];
                parts.extend(args.iter().cloned());
                let mut v = serde_json::json!({"type": "local", "command": parts});
                if !env.is_empty() {
                    v["environment"] = serde_json::json!(env);
                }
                v
            }
            McpServer::Remote { url, headers, oauth, enabled } => {
                let mut v = serde_json::json!({"type": "remote", "url": url});
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

/// Resolve the provider name for `config`: an explicit `provider` hint
/// wins, otherwise it's derived from the Claude Code Bedrock/Vertex env
/// flags and the model id (spec §4.6 "Provider detection").
fn resolve_provider(config: &GlobalConfig) -> String {
    if let Some(provider) = &config.provider {
        return provider.clone();
    }
    let use_bedrock = config.env.get("CLAUDE_CODE_USE_BEDROCK").map(String::as_str);
    let use_vertex = config.env.get("CLAUDE_CODE_USE_VERTEX").map(String::as_str);
    let model_id = config.model.as_deref().unwrap_or_default();
    acc_mapping::model_id::detect_provider(use_bedrock, use_vertex, model_id).to_string()
}

fn config_json(config: &GlobalConfig, source_format: Format) -> serde_json::Value {
    let mut out = serde_json::json!({"$schema": "https://opencode.ai/config.json"});

    let provider = resolve_provider(config);
    if let Some(model) = &config.model {
        let translated = acc_mapping::model_id::translate(model, Some(provider.as_str()), &BTreeMap::new());
        out["model"] = serde_json::json!(translated);
        out["small_model"] = serde_json::json!(acc_mapping::model_id::suggest_small_model(&translated));
        out["provider"] = serde_json::json!({ provider: {} });
    } else if config.provider.is_some() {
        out["provider"] = serde_json::json!({ provider: {} });
    }
    if !config.mcp_servers.is_empty() {
        out["mcp"] = mcp_servers_to_opencode(&config.mcp_servers);
    }
    if let Some(permissions) = &config.permissions {
        out["permission"] = serde_json::to_value(permissions).unwrap_or_default();
    }
    for (key, value) in &config.extra_settings {
        out[key] = value.clone();
    }

    // Claude Code's hooks block has no canonical counterpart; it only
    // ever arrives via extra_settings when the source format is Claude
    // Code (spec §4.2, NON_CANONICAL_SETTINGS_KEYS).
    let _ = source_format;
    out
}

fn is_general_or_always(rule: &RuleFile) -> bool {
    matches!(rule.rule_type, Some(RuleType::Always) | Some(RuleType::General)) || rule.always_apply == Some(true)
}

fn emit_rules(rules: &[RuleFile], agents_md_path: &std::path::Path, result: &mut CanonicalConversionResult) {
    let mut sections = Vec::new();
    let mut unsupported = Vec::new();
    for rule in rules {
        if is_general_or_always(rule) {
            sections.push(rule.content.trim_end_matches('\n').to_string());
        } else {
            unsupported.push(rule.name.clone());
        }
    }
    if !sections.is_empty() {
        let body = sections.join("\n\n");
        result.rules.insert(agents_md_path.to_path_buf(), format!("{body}\n"));
    }
    if !unsupported.is_empty() {
        result.report.manual_actions.push(format!(
            "OpenCode does not support file-scoped rules natively: {} file-scoped/intelligent rules need manual review ({})",
            unsupported.len(),
            unsupported.join(", ")
        ));
    }
}

fn emit_hooks_stub(config: &GlobalConfig, dir: &std::path::Path, result: &mut CanonicalConversionResult) {
    if let Some(hooks) = config.extra_settings.get("hooks") {
        if let Some(stub) = acc_mapping::hooks::convert_hooks(hooks) {
            result.extra_files.insert(dir.join("cc-hooks.ts"), stub);
            result
                .report
                .manual_actions
                .push("Claude Code hooks were projected into a generated cc-hooks.ts plugin stub; review before use".to_string());
        }
    }
}

/// Emit an OpenCode tree from a canonical scan result. `env` resolves
/// the absolute global config/`AGENTS.md` paths.
#[must_use]
pub fn emit(scan: &CanonicalScanResult, env: &acc_paths::Env) -> CanonicalConversionResult {
    let mut result = CanonicalConversionResult::new(scan.source_format, Format::OpenCode);

    let config_path = acc_paths::opencode::global_config(env).unwrap_or_else(|| PathBuf::from("opencode/opencode.json"));
    result
        .global_config
        .insert(config_path.clone(), serde_json::to_string_pretty(&config_json(&scan.global, scan.source_format)).unwrap_or_default());
    if !scan.global.mcp_servers.is_empty() {
        result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "global mcp_servers", "opencode.json#mcp"));
    }

    let agents_md_path = acc_paths::opencode::global_agents_md(env).unwrap_or_else(|| PathBuf::from("opencode/AGENTS.md"));
    emit_rules(&scan.global.rules, &agents_md_path, &mut result);
    let config_dir = config_path.parent().map(std::path::Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    emit_hooks_stub(&scan.global, &config_dir, &mut result);

    for agent in &scan.global.agents {
        result.agents.insert(agent.path.clone(), agent_to_markdown(agent, "mode", "tools"));
    }
    for command in &scan.global.commands {
        result.commands.insert(command.path.clone(), command.content.clone());
    }

    for project in &scan.projects {
        let mut files = BTreeMap::new();
        let config = config_json(&project.config, scan.source_format);
        if config.as_object().is_some_and(|o| o.len() > 1) {
            files.insert(project.project_path.join("opencode.json"), serde_json::to_string_pretty(&config).unwrap_or_default());
        }
        if !project.config.mcp_servers.is_empty() {
            result.report.converted.push(ReportItem::new(ReportCategory::Mcp, "project mcp_servers", "opencode.json#mcp"));
        }
        if !files.is_empty() {
            result.project_configs.insert(project.project_path.clone(), files);
        }

        emit_rules(&project.config.rules, &project.project_path.join("AGENTS.md"), &mut result);
        emit_hooks_stub(&project.config, &project.project_path.join(".opencode/plugins"), &mut result);

        for agent in &project.config.agents {
            result.agents.insert(agent.path.clone(), agent_to_markdown(agent, "mode", "tools"));
        }
        for command in &project.config.commands {
            result.commands.insert(command.path.clone(), command.content.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_ir::{Action, Permissions, PermissionsMap, ProjectConfig};
    use std::collections::BTreeMap as Map;

    fn env() -> acc_paths::Env {
        acc_paths::Env::from_home("/home/u")
    }

    #[test]
    fn model_is_translated_and_small_model_suggested() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        scan.global.model = Some("opus".to_string());
        let result = emit(&scan, &env());
        let content = &result.global_config[&PathBuf::from("/home/u/.config/opencode/opencode.json")];
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(json["model"], "anthropic/claude-opus-4-6");
        assert_eq!(json["small_model"], "anthropic/claude-3-5-haiku-20241022");
    }

    #[test]
    fn scenario_3_bedrock_env_flag_derives_provider_block() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        scan.global.model = Some("claude-opus-4-6".to_string());
        scan.global.env.insert("CLAUDE_CODE_USE_BEDROCK".to_string(), "1".to_string());
        let result = emit(&scan, &env());
        let content = &result.global_config[&PathBuf::from("/home/u/.config/opencode/opencode.json")];
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        // Alias/prefix table wins over the Bedrock hint for this id (spec Scenario 3).
        assert_eq!(json["model"], "anthropic/claude-opus-4-6");
        assert!(json["provider"]["amazon-bedrock"].is_object());
    }

    #[test]
    fn local_mcp_server_becomes_command_array() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        scan.global.mcp_servers.insert(
            "fs".to_string(),
            McpServer::local("npx", vec!["-y".to_string(), "pkg".to_string()], Map::new()),
        );
        let result = emit(&scan, &env());
        let content = &result.global_config[&PathBuf::from("/home/u/.config/opencode/opencode.json")];
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(json["mcp"]["fs"]["command"], serde_json::json!(["npx", "-y", "pkg"]));
    }

    #[test]
    fn permissions_pass_through_unchanged() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        let mut perms: Permissions = Map::new();
        perms.insert("bash".to_string(), PermissionsMap::Flat(Action::Ask));
        scan.global.permissions = Some(perms);
        let result = emit(&scan, &env());
        let content = &result.global_config[&PathBuf::from("/home/u/.config/opencode/opencode.json")];
        let json: serde_json::Value = serde_json::from_str(content).unwrap();
        assert_eq!(json["permission"]["bash"], "ask");
    }

    #[test]
    fn always_apply_rule_merges_into_agents_md() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        let mut project = ProjectConfig::new(PathBuf::from("/repo"));
        project.config.rules.push(RuleFile {
            path: PathBuf::from("/repo/CLAUDE.md"),
            name: "CLAUDE".to_string(),
            content: "Always use TypeScript".to_string(),
            always_apply: Some(true),
            globs: None,
            description: None,
            rule_type: Some(RuleType::General),
        });
        scan.projects.push(project);
        let result = emit(&scan, &env());
        assert!(result.rules[&PathBuf::from("/repo/AGENTS.md")].contains("Always use TypeScript"));
    }

    #[test]
    fn file_scoped_rule_gets_manual_action_only() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        scan.global.rules.push(RuleFile {
            path: PathBuf::from("/x"),
            name: "ts".to_string(),
            content: "Body".to_string(),
            always_apply: None,
            globs: Some("*.ts".to_string()),
            description: None,
            rule_type: Some(RuleType::FileScoped),
        });
        let result = emit(&scan, &env());
        assert!(result.rules.is_empty());
        assert_eq!(result.report.manual_actions.len(), 1);
    }

    #[test]
    fn scenario_2_cursor_rules_aggregate_into_one_manual_action() {
        let mut scan = CanonicalScanResult::empty(Format::Cursor);
        let mut project = ProjectConfig::new(PathBuf::from("/repo"));
        project.config.rules.push(RuleFile {
            path: PathBuf::from("/repo/.cursor/rules/a.mdc"),
            name: "a".to_string(),
            content: "Use TypeScript".to_string(),
            always_apply: Some(true),
            globs: None,
            description: None,
            rule_type: Some(RuleType::Always),
        });
        project.config.rules.push(RuleFile {
            path: PathBuf::from("/repo/.cursor/rules/b.mdc"),
            name: "b".to_string(),
            content: "API rules".to_string(),
            always_apply: None,
            globs: Some("api/**".to_string()),
            description: None,
            rule_type: Some(RuleType::FileScoped),
        });
        scan.projects.push(project);
        let result = emit(&scan, &env());
        let agents_md = &result.rules[&PathBuf::from("/repo/AGENTS.md")];
        assert!(agents_md.contains("Use TypeScript"));
        assert!(!result.rules.keys().any(|p| p.extension().is_some_and(|e| e == "mdc")));
        assert_eq!(result.report.manual_actions.len(), 1);
        assert!(result.report.manual_actions[0].contains("1 file-scoped/intelligent rules"));
    }

    #[test]
    fn hooks_block_generates_plugin_stub() {
        let mut scan = CanonicalScanResult::empty(Format::ClaudeCode);
        scan.global.extra_settings.insert(
            "hooks".to_string(),
            serde_json::json!({"PreToolUse": [{"matcher": "Bash", "hooks": [{"type": "command", "command": "echo hi"}]}]}),
        );
        let result = emit(&scan, &env());
        assert!(result.extra_files.keys().any(|p| p.ends_with("cc-hooks.ts")));
        assert!(result.report.manual_actions.iter().any(|m| m.contains("cc-hooks.ts")));
    }
}
