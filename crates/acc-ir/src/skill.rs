// SPDX-License-Identifier: MIT OR Apache-2.0
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A discovered skill (`SKILL.md` bundle), spec §3.7.
///
/// Deduplication across global and project scans uses the real
/// (symlink-resolved) path as identity, never the literal scanned path —
/// the shared `~/.agents/skills/` directory may be symlinked from both
/// `~/.Claude/skills` and `~/.claude/skills` (spec §9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Skill {
    /// The real (symlink-resolved) path to the skill's directory.
    pub path: PathBuf,
    /// Skill name (directory name, or frontmatter `name`).
    pub name: String,
    /// One-line description from `SKILL.md` frontmatter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the scanned entry was a symlink.
    pub is_symlink: bool,
    /// The symlink target, if `is_symlink`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symlink_target: Option<PathBuf>,
}

impl Skill {
    /// The identity used for cross-scan deduplication: the real path.
    #[must_use]
    pub fn dedup_key(&self) -> &PathBuf {
        self.symlink_target.as_ref().unwrap_or(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_prefers_symlink_target() {
        let s = Skill {
            path: PathBuf::from("/home/u/.claude/skills/review"),
            name: "review".into(),
            description: None,
            is_symlink: true,
            symlink_target: Some(PathBuf::from("/home/u/.agents/skills/review")),
        };
        assert_eq!(s.dedup_key(), &PathBuf::from("/home/u/.agents/skills/review"));
    }

    #[test]
    fn dedup_key_falls_back_to_path() {
        let s = Skill {
            path: PathBuf::from("/home/u/.claude/skills/review"),
            name: "review".into(),
            description: None,
            is_symlink: false,
            symlink_target: None,
        };
        assert_eq!(s.dedup_key(), &PathBuf::from("/home/u/.claude/skills/review"));
    }
}
