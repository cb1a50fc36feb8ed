// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether an agent is the primary driver of a session or a delegated
/// helper invoked by one (spec §3.6, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Drives the session directly.
    Primary,
    /// Invoked by a primary agent for a delegated task.
    Subagent,
    /// Usable in either role (OpenCode's `"all"`, validator-accepted).
    All,
}

/// A custom agent/subagent definition (spec §3.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Agent {
    /// Absolute source path.
    pub path: PathBuf,
    /// Agent name (frontmatter `name`, falling back to file stem).
    pub name: String,
    /// Full original file content (frontmatter + body), kept for emitters
    /// that pass agents through with minimal rewriting.
    pub content: String,
    /// Raw parsed frontmatter fields, enumerated where canonical and
    /// caught in `extra` otherwise (spec §9).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub frontmatter: BTreeMap<String, serde_json::Value>,
    /// Markdown body below the frontmatter block.
    pub body: String,
    /// One-line description, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Primary vs. subagent.
    pub mode: AgentMode,
    /// Model id override, if the agent pins one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Allowed tool names (normalized from a comma-string or array).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f64,
    /// Maximum agent steps before forced termination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u32>,
    /// UI accent color, if the source format carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
