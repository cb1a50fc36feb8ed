// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A user-invokable slash command definition (spec §3.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Command {
    /// Absolute source path.
    pub path: PathBuf,
    /// Command name, usually the file stem.
    pub name: String,
    /// Full original content.
    pub content: String,
    /// Parsed frontmatter, if any (commands are not required to carry
    /// one; Cursor commands are plain markdown per spec §4.3).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub frontmatter: BTreeMap<String, serde_json::Value>,
    /// Markdown body below any frontmatter block.
    pub body: String,
    /// One-line description, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_serde_roundtrip() {
        let c = Command {
            path: PathBuf::from("/p/.claude/commands/deploy.md"),
            name: "deploy".into(),
            content: "Deploy the app".into(),
            frontmatter: BTreeMap::new(),
            body: "Deploy the app".into(),
            description: None,
        };
        let json = serde_json::to_string(&c).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
