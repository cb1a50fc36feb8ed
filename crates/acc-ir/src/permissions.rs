// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single permission decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// The tool call is allowed without prompting.
    Allow,
    /// The tool call is denied outright.
    Deny,
    /// The user is prompted before the tool call proceeds.
    Ask,
}

impl Action {
    /// Parse the three lowercase wire strings; anything else is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "allow" => Some(Self::Allow),
            "deny" => Some(Self::Deny),
            "ask" => Some(Self::Ask),
            _ => None,
        }
    }

    /// The lowercase wire string for this action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Ask => "ask",
        }
    }
}

/// A tool's permission value: either a single default action, or a nested
/// map from glob pattern to action (spec §3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PermissionsMap {
    /// A single action applying to every invocation of the tool.
    Flat(Action),
    /// A pattern -> action map; the `"*"` key, if present, is the default.
    Nested(BTreeMap<String, Action>),
}

impl PermissionsMap {
    /// Collapse a single-key `{"*": action}` nested map down to
    /// [`PermissionsMap::Flat`]. Idempotent: running it twice equals
    /// running it once (spec §8, property 2).
    #[must_use]
    pub fn simplify(self) -> Self {
        match self {
            Self::Nested(map) if map.len() == 1 && map.contains_key("*") => {
                Self::Flat(*map.get("*").unwrap())
            }
            other => other,
        }
    }

    /// The default (`"*"`) action for this tool, if derivable.
    #[must_use]
    pub fn default_action(&self) -> Option<Action> {
        match self {
            Self::Flat(a) => Some(*a),
            Self::Nested(map) => map.get("*").copied(),
        }
    }
}

/// Top-level permissions mapping: tool key (lowercase canonical name) to
/// its [`PermissionsMap`]. The wildcard key `"*"` at this top level encodes
/// the global default action.
pub type Permissions = BTreeMap<String, PermissionsMap>;

/// Run the simplify pass (spec §4.5 step 3) over every entry in a
/// [`Permissions`] map.
pub fn simplify_all(permissions: Permissions) -> Permissions {
    permissions
        .into_iter()
        .map(|(k, v)| (k, v.simplify()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parse_roundtrip() {
        for a in [Action::Allow, Action::Deny, Action::Ask] {
            assert_eq!(Action::parse(a.as_str()), Some(a));
        }
        assert_eq!(Action::parse("bogus"), None);
    }

    #[test]
    fn simplify_collapses_single_star_key() {
        let mut m = BTreeMap::new();
        m.insert("*".to_string(), Action::Allow);
        let nested = PermissionsMap::Nested(m);
        assert_eq!(nested.simplify(), PermissionsMap::Flat(Action::Allow));
    }

    #[test]
    fn simplify_leaves_multi_key_nested_alone() {
        let mut m = BTreeMap::new();
        m.insert("*".to_string(), Action::Allow);
        m.insert("git *".to_string(), Action::Deny);
        let nested = PermissionsMap::Nested(m.clone());
        assert_eq!(nested.simplify(), PermissionsMap::Nested(m));
    }

    #[test]
    fn simplify_is_idempotent() {
        let mut m = BTreeMap::new();
        m.insert("*".to_string(), Action::Ask);
        let once = PermissionsMap::Nested(m).simplify();
        let twice = once.clone().simplify();
        assert_eq!(once, twice);
    }

    #[test]
    fn default_action_flat_and_nested() {
        assert_eq!(
            PermissionsMap::Flat(Action::Deny).default_action(),
            Some(Action::Deny)
        );
        let mut m = BTreeMap::new();
        m.insert("pattern".to_string(), Action::Allow);
        assert_eq!(PermissionsMap::Nested(m).default_action(), None);
    }
}
