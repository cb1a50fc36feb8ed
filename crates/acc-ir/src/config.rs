// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::command::Command;
use crate::mcp::McpServer;
use crate::permissions::Permissions;
use crate::rules::RuleFile;
use crate::skill::Skill;

/// Global (user-level) configuration, format-agnostic (spec §3.2).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GlobalConfig {
    /// Primary model id, format-agnostic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Optional faster/cheaper "small model" id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_model: Option<String>,
    /// Provider hint (e.g. `"anthropic"`, `"amazon-bedrock"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// MCP servers, keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mcp_servers: BTreeMap<String, McpServer>,
    /// Tool permissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
    /// Ordered rule files (global `CLAUDE.md`/`AGENTS.md` and the like).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleFile>,
    /// Discovered skills.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<Skill>,
    /// Discovered slash commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
    /// Discovered agents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<Agent>,
    /// Environment variables to propagate to tool invocations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Whether the source format's auto-update mechanism is enabled.
    #[serde(default)]
    pub auto_update: bool,
    /// Free-form bag for source fields with no canonical counterpart
    /// (spec §4.2: `teammateMode`, `hooks`, `sandbox`, `apiKeyHelper`,
    /// `outputStyle`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_settings: BTreeMap<String, serde_json::Value>,
}

/// Per-project configuration: everything [`GlobalConfig`] carries, plus
/// project-scoped fields (spec §3.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectConfig {
    /// Absolute project root path.
    pub project_path: PathBuf,
    /// The shared config fields.
    #[serde(flatten)]
    pub config: GlobalConfig,
    /// MCP server names explicitly disabled for this project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled_mcp_servers: Vec<String>,
    /// MCP server names explicitly enabled for this project (overriding a
    /// global `enabled:false`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_mcp_servers: Vec<String>,
    /// Glob patterns of paths to ignore when scanning/emitting this
    /// project.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignore_patterns: Vec<String>,
}

impl ProjectConfig {
    /// Construct an otherwise-empty project config rooted at `project_path`.
    #[must_use]
    pub fn new(project_path: PathBuf) -> Self {
        Self {
            project_path,
            config: GlobalConfig::default(),
            disabled_mcp_servers: Vec::new(),
            enabled_mcp_servers: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_config_default_is_empty() {
        let g = GlobalConfig::default();
        assert!(g.model.is_none());
        assert!(g.mcp_servers.is_empty());
        assert!(!g.auto_update);
    }

    #[test]
    fn project_config_flattens_shared_fields() {
        let mut p = ProjectConfig::new(PathBuf::from("/repo"));
        p.config.model = Some("anthropic/claude-sonnet-4-5".into());
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["model"], "anthropic/claude-sonnet-4-5");
        assert_eq!(json["project_path"], "/repo");
    }
}
