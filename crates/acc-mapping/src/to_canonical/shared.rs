// SPDX-License-Identifier: MIT OR Apache-2.0
//! Helpers shared by the three to-canonical mappers: turning a parsed
//! frontmatter map plus a body into an [`Agent`]/[`Command`], and the
//! small scalar-coercion helpers the source formats' loose JSON shapes
//! need.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use acc_ir::{Agent, AgentMode, Command};

use crate::agent_inference;

fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
}

/// Parse a `tools` frontmatter field that may arrive as a comma-separated
/// string or a JSON array of strings (spec §4.2), trimming each entry.
#[must_use]
pub fn parse_tools_field(value: Option<&serde_json::Value>) -> Vec<String> {
    match value {
        Some(serde_json::Value::String(s)) => s.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn str_field(frontmatter: &BTreeMap<String, serde_json::Value>, key: &str) -> Option<String> {
    frontmatter.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn f64_field(frontmatter: &BTreeMap<String, serde_json::Value>, key: &str) -> Option<f64> {
    frontmatter.get(key).and_then(serde_json::Value::as_f64)
}

fn u32_field(frontmatter: &BTreeMap<String, serde_json::Value>, key: &str) -> Option<u32> {
    frontmatter.get(key).and_then(serde_json::Value::as_u64).and_then(|v| u32::try_from(v).ok())
}

/// Build an [`Agent`] from a raw markdown file's path and content,
/// inferring `mode`/`temperature` when the frontmatter doesn't declare
/// them (spec §4.7).
#[must_use]
pub fn agent_from_markdown(path: PathBuf, content: &str, tools_key: &str) -> Agent {
    let doc = acc_codec::parse_frontmatter(content);
    let name = str_field(&doc.frontmatter, "name").unwrap_or_else(|| file_stem(&path));
    let description = str_field(&doc.frontmatter, "description");
    let tools = parse_tools_field(doc.frontmatter.get(tools_key));

    let mode = match doc.frontmatter.get("mode").and_then(|v| v.as_str()) {
        Some("primary") => AgentMode::Primary,
        Some("subagent") => AgentMode::Subagent,
        Some("all") => AgentMode::All,
        _ => agent_inference::infer_mode(&name, description.as_deref().unwrap_or("")),
    };

    let temperature = f64_field(&doc.frontmatter, "temperature")
        .unwrap_or_else(|| agent_inference::infer_temperature(&name, description.as_deref().unwrap_or("")));

    let max_steps = u32_field(&doc.frontmatter, "maxSteps")
        .or_else(|| u32_field(&doc.frontmatter, "max_steps"))
        .or_else(|| Some(agent_inference::default_steps(mode)));

    Agent {
        path,
        name,
        content: content.to_string(),
        frontmatter: doc.frontmatter,
        body: doc.body,
        description,
        mode,
        model: None,
        tools,
        temperature,
        max_steps,
        color: None,
    }
}

/// Build an [`Agent`], also resolving `model`/`color` frontmatter fields
/// (split out from [`agent_from_markdown`] because not every caller
/// cares to duplicate the lookups).
#[must_use]
pub fn agent_from_markdown_full(path: PathBuf, content: &str, tools_key: &str) -> Agent {
    let mut agent = agent_from_markdown(path, content, tools_key);
    agent.model = str_field(&agent.frontmatter, "model");
    agent.color = str_field(&agent.frontmatter, "color");
    agent
}

/// Build a [`Command`] from a raw markdown file's path and content.
#[must_use]
pub fn command_from_markdown(path: PathBuf, content: &str) -> Command {
    let doc = acc_codec::parse_frontmatter(content);
    let name = str_field(&doc.frontmatter, "name").unwrap_or_else(|| file_stem(&path));
    let description = str_field(&doc.frontmatter, "description");
    Command {
        path,
        name,
        content: content.to_string(),
        frontmatter: doc.frontmatter,
        body: doc.body,
        description,
    }
}

/// Extract a `BTreeMap<String, String>` from a JSON object field.
#[must_use]
pub fn string_map_field(value: Option<&serde_json::Value>) -> BTreeMap<String, String> {
    value
        .and_then(|v| v.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

/// Extract a `Vec<String>` from a JSON array-of-strings field.
#[must_use]
pub fn string_array_field(value: Option<&serde_json::Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|v| v.as_str()).map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_tools_string() {
        assert_eq!(
            parse_tools_field(Some(&serde_json::json!("Read, Edit, Bash"))),
            vec!["Read".to_string(), "Edit".to_string(), "Bash".to_string()]
        );
    }

    #[test]
    fn parses_tools_array() {
        assert_eq!(
            parse_tools_field(Some(&serde_json::json!(["Read", "Edit"]))),
            vec!["Read".to_string(), "Edit".to_string()]
        );
    }

    #[test]
    fn agent_from_markdown_infers_missing_fields() {
        let content = "---\nname: code-reviewer\ndescription: reviews pull requests\n---\nBody";
        let agent = agent_from_markdown_full(PathBuf::from("/p/agents/code-reviewer.md"), content, "tools");
        assert_eq!(agent.name, "code-reviewer");
        assert_eq!(agent.mode, AgentMode::Subagent);
        assert_eq!(agent.temperature, 0.1);
        assert_eq!(agent.max_steps, Some(25));
    }

    #[test]
    fn agent_from_markdown_honors_explicit_frontmatter() {
        let content = "---\nname: builder\nmode: primary\ntemperature: 0.7\nmaxSteps: 80\n---\nBody";
        let agent = agent_from_markdown_full(PathBuf::from("/p/agents/builder.md"), content, "tools");
        assert_eq!(agent.mode, AgentMode::Primary);
        assert_eq!(agent.temperature, 0.7);
        assert_eq!(agent.max_steps, Some(80));
    }

    #[test]
    fn command_from_markdown_falls_back_to_file_stem() {
        let cmd = command_from_markdown(PathBuf::from("/p/commands/deploy.md"), "Deploy the app");
        assert_eq!(cmd.name, "deploy");
        assert_eq!(cmd.body, "Deploy the app");
    }
}
