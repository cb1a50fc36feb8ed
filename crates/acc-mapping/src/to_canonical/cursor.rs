// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cursor scan results to canonical IR (spec §4.2): MDC frontmatter
//! drives `RuleType` derivation, and both `.cursorrules` and a
//! project-root `AGENTS.md` become always-applied rules.

use std::collections::BTreeMap;
use std::path::PathBuf;

use acc_ir::{Action, ConversionReport, Format, GlobalConfig, McpServer, Permissions, PermissionsMap, ProjectConfig, ReportCategory, ReportItem, RuleFile, RuleType};
use cursor_scan::{RawRuleFile, ScanResult};
use serde_json::Value;

use crate::mcp;
use crate::permissions::{is_polluted_key, map_cursor_tool_name};
use crate::to_canonical::shared;

fn mcp_servers_from(value: &Value) -> BTreeMap<String, Value> {
    value.as_object().map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect()).unwrap_or_default()
}

fn parse_permissions(value: Option<&Value>) -> Option<Permissions> {
    let obj = value?.as_object()?;
    let mut permissions = Permissions::new();
    for (tool, entry) in obj {
        if is_polluted_key(tool) {
            continue;
        }
        let tool = map_cursor_tool_name(tool);
        match entry {
            Value::String(s) => {
                if let Some(action) = Action::parse(s) {
                    permissions.insert(tool, PermissionsMap::Flat(action));
                }
            }
            Value::Object(nested) => {
                let mut map = BTreeMap::new();
                for (pattern, action) in nested {
                    if let Some(action) = action.as_str().and_then(Action::parse) {
                        map.insert(pattern.clone(), action);
                    }
                }
                permissions.insert(tool, PermissionsMap::Nested(map));
            }
            _ => {}
        }
    }
    Some(acc_ir::simplify_all(permissions))
}

fn rule_from_mdc(raw: &RawRuleFile) -> RuleFile {
    let name = raw.path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    if !raw.is_mdc {
        return RuleFile {
            path: raw.path.clone(),
            name,
            content: raw.content.clone(),
            always_apply: None,
            globs: None,
            description: None,
            rule_type: Some(RuleType::Manual),
        };
    }

    let doc = acc_codec::parse_frontmatter(&raw.content);
    let always_apply = doc.frontmatter.get("alwaysApply").and_then(Value::as_bool);
    let description = doc.frontmatter.get("description").and_then(|v| v.as_str()).map(str::to_string);
    let globs = match doc.frontmatter.get("globs") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Array(items)) => {
            let list: Vec<String> = items.iter().filter_map(|v| v.as_str()).map(str::to_string).collect();
            if list.is_empty() { None } else { Some(RuleFile::join_globs(&list)) }
        }
        _ => None,
    };
    let rule_type = RuleType::derive_mdc(always_apply, &globs, &description);

    RuleFile {
        path: raw.path.clone(),
        name,
        content: doc.body,
        always_apply,
        globs,
        description,
        rule_type: Some(rule_type),
    }
}

/// Project a Cursor [`ScanResult`] into a canonical scan result.
#[must_use]
pub fn map(scan: &ScanResult) -> (acc_ir::CanonicalScanResult, ConversionReport) {
    let mut report = ConversionReport::new();
    let mut warnings = Vec::new();

    let mut global = GlobalConfig::default();
    if let Some(mcp) = &scan.global.mcp_json {
        let servers = mcp_servers_from(mcp.get("mcpServers").unwrap_or(mcp));
        global.mcp_servers = mcp::merge_sources([&servers], &mut report.errors);
        warnings.extend(mcp::credential_warnings(&global.mcp_servers));
    }
    if let Some(cli_config) = &scan.global.cli_config {
        global.model = cli_config.get("model").and_then(|v| v.as_str()).map(str::to_string);
        global.permissions = parse_permissions(cli_config.get("permissions"));
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
    for agent in &scan.global.agents {
        global.agents.push(shared::agent_from_markdown_full(agent.path.clone(), &agent.content, "tools"));
    }
    for command in &scan.global.commands {
        global.commands.push(shared::command_from_markdown(command.path.clone(), &command.content));
    }

    let mut projects = Vec::new();
    if let Some(project) = &scan.project {
        let mut config = GlobalConfig::default();

        if let Some(mcp) = &project.mcp_json {
            let servers = mcp_servers_from(mcp.get("mcpServers").unwrap_or(mcp));
            config.mcp_servers = mcp::merge_sources([&servers], &mut report.errors);
            if !config.mcp_servers.is_empty() {
                report.converted.push(ReportItem::new(ReportCategory::Mcp, ".cursor/mcp.json", "mcpServers"));
            }
            warnings.extend(mcp::credential_warnings(&config.mcp_servers));
        }
        for rule in &project.rules {
            config.rules.push(rule_from_mdc(rule));
        }
        if let Some(legacy) = &project.legacy_cursorrules {
            config.rules.push(RuleFile {
                path: project.project_path.join(".cursorrules"),
                name: "cursorrules".to_string(),
                content: legacy.clone(),
                always_apply: Some(true),
                globs: None,
                description: None,
                rule_type: Some(RuleType::General),
            });
        }
        if let Some(agents_md) = &project.agents_md {
            config.rules.push(RuleFile {
                path: project.project_path.join("AGENTS.md"),
                name: "AGENTS".to_string(),
                content: agents_md.clone(),
                always_apply: Some(true),
                globs: None,
                description: None,
                rule_type: Some(RuleType::General),
            });
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

        let mut project_config = ProjectConfig::new(project.project_path.clone());
        project_config.config = config;
        projects.push(project_config);
    }

    report.warnings.extend(warnings);

    (
        acc_ir::CanonicalScanResult {
            source_format: Format::Cursor,
            global,
            projects,
        },
        report,
    )
}
