// SPDX-License-Identifier: MIT OR Apache-2.0
//! Claude Code scan results to canonical IR (spec §4.2).

use std::collections::BTreeMap;

use acc_ir::{ConversionReport, Format, GlobalConfig, Permissions, ProjectConfig, ReportCategory, ReportItem, RuleFile, RuleType};
use claude_code_scan::ScanResult;
use serde_json::Value;

use crate::mcp;
use crate::permissions as perm;
use crate::to_canonical::shared;

const NON_CANONICAL_SETTINGS_KEYS: &[&str] =
    &["teammateMode", "hooks", "sandbox", "apiKeyHelper", "outputStyle"];

fn permission_lists(settings: &Value) -> (Vec<String>, Vec<String>, Vec<String>, Vec<String>, Option<String>) {
    let perms = settings.get("permissions").cloned().unwrap_or(Value::Null);
    let allow = shared::string_array_field(perms.get("allow"));
    let deny = shared::string_array_field(perms.get("deny"));
    let ask = shared::string_array_field(perms.get("ask"));
    let allowed_tools = shared::string_array_field(settings.get("allowedTools"));
    let default_mode = perms.get("defaultMode").and_then(|v| v.as_str()).map(str::to_string);
    (allow, deny, ask, allowed_tools, default_mode)
}

fn merge_permission_lists(global: &Value, local: &Value, warnings: &mut Vec<String>) -> Permissions {
    let (mut allow, mut deny, mut ask, mut allowed_tools, mut default_mode) = permission_lists(global);
    let (l_allow, l_deny, l_ask, l_allowed_tools, l_default_mode) = permission_lists(local);
    allow.extend(l_allow);
    deny.extend(l_deny);
    ask.extend(l_ask);
    allowed_tools.extend(l_allowed_tools);
    if l_default_mode.is_some() {
        default_mode = l_default_mode;
    }
    perm::build_claude_permissions(&allow, &deny, &ask, &allowed_tools, default_mode.as_deref(), warnings)
}

fn mcp_servers_from(value: &Value) -> BTreeMap<String, Value> {
    value
        .get("mcpServers")
        .and_then(|v| v.as_object())
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

fn extract_settings(global_settings: &Value, extra_settings: &mut BTreeMap<String, Value>) -> (Option<String>, Option<String>, bool, BTreeMap<String, String>) {
    let model = global_settings.get("model").and_then(|v| v.as_str()).map(str::to_string);
    let provider = global_settings.get("provider").and_then(|v| v.as_str()).map(str::to_string);
    let auto_update = global_settings.get("autoUpdatesChannel").is_some();
    let env = shared::string_map_field(global_settings.get("env"));
    for key in NON_CANONICAL_SETTINGS_KEYS {
        if let Some(v) = global_settings.get(*key) {
            extra_settings.insert((*key).to_string(), v.clone());
        }
    }
    (model, provider, auto_update, env)
}

/// Project a Claude Code [`ScanResult`] into a canonical scan result plus
/// the to-canonical phase of the conversion report. `env` is only used to
/// reconstruct the source path recorded on the global rules file.
#[must_use]
pub fn map(scan: &ScanResult, env: &acc_paths::Env) -> (acc_ir::CanonicalScanResult, ConversionReport) {
    let mut report = ConversionReport::new();
    let mut warnings = Vec::new();

    let global_settings = scan.global.settings.clone().unwrap_or(Value::Null);
    let mut extra_settings = BTreeMap::new();
    let (model, provider, auto_update, tool_env) = extract_settings(&global_settings, &mut extra_settings);

    let mut global = GlobalConfig {
        model,
        provider,
        env: tool_env,
        auto_update,
        extra_settings,
        ..GlobalConfig::default()
    };

    let global_mcp = mcp_servers_from(&global_settings);
    if !global_mcp.is_empty() {
        global.mcp_servers = mcp::merge_sources([&global_mcp], &mut report.errors);
        warnings.extend(mcp::credential_warnings(&global.mcp_servers));
    }

    for skill in &scan.global.skills {
        global.skills.push(acc_ir::Skill {
            path: skill.path.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            is_symlink: skill.is_symlink,
            symlink_target: skill.symlink_target.clone(),
        });
    }

    if let Some(rules_md) = &scan.global.global_rules {
        global.rules.push(RuleFile {
            path: acc_paths::claude_code::global_rules(env).unwrap_or_default(),
            name: "CLAUDE".to_string(),
            content: acc_codec::extract_body(rules_md),
            always_apply: Some(true),
            globs: None,
            description: None,
            rule_type: Some(RuleType::General),
        });
        report.converted.push(ReportItem::new(ReportCategory::Rules, "~/.claude/CLAUDE.md", "global rules"));
    }

    let mut projects = Vec::new();
    if let Some(project) = &scan.project {
        let project_path_str = project.project_path.to_string_lossy().to_string();
        let settings_local = project.settings_local.clone().unwrap_or(Value::Null);

        let project_entry = scan
            .global
            .user_state
            .as_ref()
            .and_then(|state| state.get("projects"))
            .and_then(|projects| projects.get(&project_path_str))
            .cloned()
            .unwrap_or(Value::Null);

        let mut project_settings = GlobalConfig::default();
        project_settings.permissions = Some(merge_permission_lists(&global_settings, &settings_local, &mut warnings));

        let mcp_json_servers = project.mcp_json.as_ref().map(mcp_servers_from).unwrap_or_default();
        let user_state_servers = mcp_servers_from(&project_entry);
        let settings_local_servers = mcp_servers_from(&settings_local);
        project_settings.mcp_servers = mcp::merge_sources(
            [&mcp_json_servers, &user_state_servers, &settings_local_servers],
            &mut report.errors,
        );
        if !project_settings.mcp_servers.is_empty() {
            report.converted.push(ReportItem::new(ReportCategory::Mcp, ".mcp.json + settings", "mcpServers"));
        }
        warnings.extend(mcp::credential_warnings(&project_settings.mcp_servers));

        for agent in &project.agents {
            project_settings.agents.push(shared::agent_from_markdown_full(agent.path.clone(), &agent.content, "tools"));
        }
        for command in &project.commands {
            project_settings.commands.push(shared::command_from_markdown(command.path.clone(), &command.content));
        }
        for skill in &project.skills {
            project_settings.skills.push(acc_ir::Skill {
                path: skill.path.clone(),
                name: skill.name.clone(),
                description: skill.description.clone(),
                is_symlink: skill.is_symlink,
                symlink_target: skill.symlink_target.clone(),
            });
        }

        for (label, body) in [("CLAUDE.md", &project.claude_md), ("AGENTS.md", &project.agents_md)] {
            if let Some(body) = body {
                project_settings.rules.push(RuleFile {
                    path: project.project_path.join(label),
                    name: label.trim_end_matches(".md").to_string(),
                    content: body.clone(),
                    always_apply: Some(true),
                    globs: None,
                    description: None,
                    rule_type: Some(RuleType::General),
                });
            }
        }

        let mut project_config = ProjectConfig::new(project.project_path.clone());
        project_config.config = project_settings;
        projects.push(project_config);
    }

    report.warnings.extend(warnings);

    (
        acc_ir::CanonicalScanResult {
            source_format: Format::ClaudeCode,
            global,
            projects,
        },
        report,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_code_scan::{ProjectScan, RawMarkdownFile};
    use std::path::PathBuf;

    #[test]
    fn maps_model_and_auto_update() {
        let mut scan = ScanResult::default();
        scan.global.settings = Some(serde_json::json!({
            "model": "opus",
            "autoUpdatesChannel": "latest"
        }));
        let env = acc_paths::Env::from_home("/home/u");
        let (canonical, _report) = map(&scan, &env);
        assert_eq!(canonical.global.model.as_deref(), Some("opus"));
        assert!(canonical.global.auto_update);
    }

    #[test]
    fn preserves_non_canonical_settings_in_extra() {
        let mut scan = ScanResult::default();
        scan.global.settings = Some(serde_json::json!({"hooks": {"PreToolUse": []}, "sandbox": true}));
        let env = acc_paths::Env::from_home("/home/u");
        let (canonical, _report) = map(&scan, &env);
        assert!(canonical.global.extra_settings.contains_key("hooks"));
        assert!(canonical.global.extra_settings.contains_key("sandbox"));
    }

    #[test]
    fn project_mcp_merges_three_sources_in_override_order() {
        let mut scan = ScanResult::default();
        scan.global.user_state = Some(serde_json::json!({
            "projects": {
                "/repo": {"mcpServers": {"srv": {"command": "from-user-state"}}}
            }
        }));
        let mut project = ProjectScan::default();
        project.project_path = PathBuf::from("/repo");
        project.mcp_json = Some(serde_json::json!({"mcpServers": {"srv": {"command": "from-mcp-json"}}}));
        project.settings_local = Some(serde_json::json!({"mcpServers": {"srv": {"command": "from-settings-local"}}}));
        scan.project = Some(project);

        let env = acc_paths::Env::from_home("/home/u");
        let (canonical, _report) = map(&scan, &env);
        let server = &canonical.projects[0].config.mcp_servers["srv"];
        match server {
            acc_ir::McpServer::Local { command, .. } => assert_eq!(command, "from-settings-local"),
            acc_ir::McpServer::Remote { .. } => panic!("expected local"),
        }
    }

    #[test]
    fn project_agents_and_commands_are_mapped() {
        let mut scan = ScanResult::default();
        let mut project = ProjectScan::default();
        project.project_path = PathBuf::from("/repo");
        project.agents.push(RawMarkdownFile {
            path: PathBuf::from("/repo/.claude/agents/reviewer.md"),
            content: "---\nname: reviewer\ndescription: reviews code\n---\nBody".to_string(),
        });
        scan.project = Some(project);

        let env = acc_paths::Env::from_home("/home/u");
        let (canonical, _report) = map(&scan, &env);
        assert_eq!(canonical.projects[0].config.agents.len(), 1);
        assert_eq!(canonical.projects[0].config.agents[0].name, "reviewer");
    }
}
