// SPDX-License-Identifier: MIT OR Apache-2.0
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a rule is applied, derived from its source frontmatter (spec §3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    /// Always injected into context.
    Always,
    /// Injected only when editing files matching `globs`.
    FileScoped,
    /// Injected at the model's discretion, guided by `description`.
    Intelligent,
    /// Never auto-injected; referenced explicitly by the user.
    Manual,
    /// A general project-level rule file (e.g. `CLAUDE.md`, `AGENTS.md`)
    /// with no per-format applicability metadata.
    General,
}

impl RuleType {
    /// Derive a [`RuleType`] from Cursor MDC frontmatter fields, per the
    /// derivation rule in spec §3.5:
    /// `alwaysApply=true => always`; else `globs present => file-scoped`;
    /// else `description present => intelligent`; else `manual`.
    #[must_use]
    pub fn derive_mdc(always_apply: Option<bool>, globs: &Option<String>, description: &Option<String>) -> Self {
        if always_apply == Some(true) {
            Self::Always
        } else if globs.as_ref().is_some_and(|g| !g.is_empty()) {
            Self::FileScoped
        } else if description.as_ref().is_some_and(|d| !d.is_empty()) {
            Self::Intelligent
        } else {
            Self::Manual
        }
    }
}

/// A single rule/instructions file, from any source (`CLAUDE.md`,
/// `AGENTS.md`, a Cursor `.mdc` file, an OpenCode rule, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleFile {
    /// Absolute source path.
    pub path: PathBuf,
    /// A short identifying name (usually the filename stem).
    pub name: String,
    /// The rule body (frontmatter stripped, if any).
    pub content: String,
    /// Whether the rule should always be applied (Cursor MDC / general
    /// rule files default to `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_apply: Option<bool>,
    /// Comma-joined glob patterns this rule scopes to (spec §9: arrays
    /// are normalized to a single comma-joined string at parse time).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globs: Option<String>,
    /// Human-readable description, used to derive `Intelligent` rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Derived or explicit rule type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<RuleType>,
}

impl RuleFile {
    /// Join a `Vec<String>` of glob patterns into the canonical
    /// comma-separated representation (spec §9 normalization invariant).
    #[must_use]
    pub fn join_globs(globs: &[String]) -> String {
        globs.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_mdc_always_apply_wins() {
        assert_eq!(
            RuleType::derive_mdc(Some(true), &Some("x".into()), &Some("y".into())),
            RuleType::Always
        );
    }

    #[test]
    fn derive_mdc_globs_then_description_then_manual() {
        assert_eq!(
            RuleType::derive_mdc(None, &Some("*.ts".into()), &None),
            RuleType::FileScoped
        );
        assert_eq!(
            RuleType::derive_mdc(None, &None, &Some("desc".into())),
            RuleType::Intelligent
        );
        assert_eq!(RuleType::derive_mdc(None, &None, &None), RuleType::Manual);
    }

    #[test]
    fn derive_mdc_empty_strings_do_not_count() {
        assert_eq!(
            RuleType::derive_mdc(Some(false), &Some(String::new()), &Some(String::new())),
            RuleType::Manual
        );
    }

    #[test]
    fn join_globs_comma_separates() {
        assert_eq!(
            RuleFile::join_globs(&["*.ts".into(), "*.tsx".into()]),
            "*.ts,*.tsx"
        );
    }
}
