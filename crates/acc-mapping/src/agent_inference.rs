// SPDX-License-Identifier: MIT OR Apache-2.0
//! Agent mode/temperature inference (spec §4.7): when a source agent's
//! frontmatter doesn't say what kind of agent it is, infer it from its
//! name and description, the way an experienced reviewer would guess
//! from a glance.

use acc_ir::AgentMode;

const PRIMARY_KEYWORDS: &[&str] = &[
    "build", "implement", "create", "develop", "main", "primary", "default", "general", "full", "orchestrat",
];

const SUBAGENT_KEYWORDS: &[&str] = &[
    "review", "audit", "analyze", "check", "helper", "assist", "search", "find", "explore", "scan",
    "inspect", "verify", "validate", "lint", "format", "test", "debug", "document", "explain",
];

/// Infer an agent's `mode` from its name and description (spec §4.7).
/// Primary keywords are checked first; first match in source order
/// wins; defaults to [`AgentMode::Primary`] when nothing matches.
#[must_use]
pub fn infer_mode(name: &str, description: &str) -> AgentMode {
    let haystack = format!("{name} {description}").to_lowercase();
    if PRIMARY_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        return AgentMode::Primary;
    }
    if SUBAGENT_KEYWORDS.iter().any(|kw| haystack.contains(kw)) {
        return AgentMode::Subagent;
    }
    AgentMode::Primary
}

/// Infer an agent's sampling `temperature` from its name and
/// description (spec §4.7). Checked in the fixed order below; the last
/// arm is the default for anything that matches none of the keyword
/// groups.
#[must_use]
pub fn infer_temperature(name: &str, description: &str) -> f64 {
    let haystack = format!("{name} {description}").to_lowercase();
    const VERIFICATION: &[&str] = &["security", "audit", "review", "lint", "check", "verify", "validate", "test"];
    const ENGINEERING: &[&str] = &["code", "implement", "build", "develop", "engineer", "refactor", "fix", "debug"];
    const CREATIVE: &[&str] = &["document", "write", "explain", "create", "design", "architect", "plan"];

    if VERIFICATION.iter().any(|kw| haystack.contains(kw)) {
        0.1
    } else if ENGINEERING.iter().any(|kw| haystack.contains(kw)) {
        0.3
    } else if CREATIVE.iter().any(|kw| haystack.contains(kw)) {
        0.5
    } else {
        0.3
    }
}

/// Default step budget by inferred or declared mode (spec §4.2): `50`
/// for primary agents, `25` for subagents and the `all` mode.
#[must_use]
pub fn default_steps(mode: AgentMode) -> u32 {
    match mode {
        AgentMode::Primary => 50,
        AgentMode::Subagent | AgentMode::All => 25,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_keyword_wins_when_both_present() {
        assert_eq!(infer_mode("build-and-review", ""), AgentMode::Primary);
    }

    #[test]
    fn subagent_keyword_matches_when_no_primary_keyword() {
        assert_eq!(infer_mode("code-reviewer", "reviews diffs for bugs"), AgentMode::Subagent);
    }

    #[test]
    fn unmatched_name_defaults_to_primary() {
        assert_eq!(infer_mode("zorp", "does things"), AgentMode::Primary);
    }

    #[test]
    fn temperature_prioritizes_verification_keywords() {
        assert_eq!(infer_temperature("security-reviewer", "audits the codebase"), 0.1);
    }

    #[test]
    fn temperature_falls_back_to_engineering_then_creative_then_default() {
        assert_eq!(infer_temperature("bug-fixer", "fixes bugs"), 0.3);
        assert_eq!(infer_temperature("docs-writer", "writes documentation"), 0.5);
        assert_eq!(infer_temperature("mystery-agent", "does a thing"), 0.3);
    }

    #[test]
    fn default_steps_by_mode() {
        assert_eq!(default_steps(AgentMode::Primary), 50);
        assert_eq!(default_steps(AgentMode::Subagent), 25);
        assert_eq!(default_steps(AgentMode::All), 25);
    }
}
