// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A Model Context Protocol server entry, as it appears inside the IR's
/// `name -> McpServer` maps on both global and project configs.
///
/// The source formats duck-type this distinction (presence of `url` vs.
/// `command`); the IR computes the discriminant once, at mapper time, and
/// carries it as an explicit tag from then on (see spec §9, "duck-typed MCP
/// servers").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum McpServer {
    /// A locally spawned (stdio) server.
    Local {
        /// The executable to spawn. Must be non-empty.
        command: String,
        /// Arguments passed to `command`.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<String>,
        /// Additional environment variables for the spawned process.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        env: BTreeMap<String, String>,
    },
    /// A remote (SSE/HTTP) server.
    Remote {
        /// The server's URL. Must be non-empty.
        url: String,
        /// Extra HTTP headers sent with every request.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        headers: BTreeMap<String, String>,
        /// Opaque OAuth configuration, passed through unvalidated.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        oauth: Option<serde_json::Value>,
        /// Explicit enabled flag. Absence means enabled; an explicit
        /// `false` must propagate through every mapper/emitter.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
    },
}

impl McpServer {
    /// Build a [`McpServer::Local`] variant, trimming nothing: callers are
    /// responsible for supplying a non-empty `command`.
    #[must_use]
    pub fn local(command: impl Into<String>, args: Vec<String>, env: BTreeMap<String, String>) -> Self {
        Self::Local {
            command: command.into(),
            args,
            env,
        }
    }

    /// Build a [`McpServer::Remote`] variant.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote {
            url: url.into(),
            headers: BTreeMap::new(),
            oauth: None,
            enabled: None,
        }
    }

    /// Validates the invariant from spec §3.3: a local server has a
    /// non-empty command; a remote server has a non-empty URL.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Local { command, .. } => !command.trim().is_empty(),
            Self::Remote { url, .. } => !url.trim().is_empty(),
        }
    }

    /// Whether this server is enabled. Absence of the explicit flag means
    /// enabled (spec §3.3).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Local { .. } => true,
            Self::Remote { enabled, .. } => enabled.unwrap_or(true),
        }
    }

    /// Duck-typed discriminant used by mappers translating a source
    /// format's `{url?, command?}` shape into the IR's tagged union.
    ///
    /// Per spec §9: `url && !command => Remote`, else `Local`.
    #[must_use]
    pub fn discriminate(has_url: bool, has_command: bool) -> McpKind {
        if has_url && !has_command {
            McpKind::Remote
        } else {
            McpKind::Local
        }
    }
}

/// The discriminant computed by [`McpServer::discriminate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McpKind {
    /// A locally spawned server.
    Local,
    /// A remote server.
    Remote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_is_valid_iff_command_nonempty() {
        assert!(McpServer::local("npx", vec![], BTreeMap::new()).is_valid());
        assert!(!McpServer::local("", vec![], BTreeMap::new()).is_valid());
    }

    #[test]
    fn remote_is_valid_iff_url_nonempty() {
        assert!(McpServer::remote("https://example.com").is_valid());
        assert!(!McpServer::remote("").is_valid());
    }

    #[test]
    fn remote_enabled_defaults_true() {
        let s = McpServer::remote("https://example.com");
        assert!(s.is_enabled());
    }

    #[test]
    fn remote_explicit_disabled_propagates() {
        let s = McpServer::Remote {
            url: "https://example.com".into(),
            headers: BTreeMap::new(),
            oauth: None,
            enabled: Some(false),
        };
        assert!(!s.is_enabled());
    }

    #[test]
    fn discriminate_url_without_command_is_remote() {
        assert_eq!(McpServer::discriminate(true, false), McpKind::Remote);
    }

    #[test]
    fn discriminate_command_present_is_local_even_with_url() {
        assert_eq!(McpServer::discriminate(true, true), McpKind::Local);
        assert_eq!(McpServer::discriminate(false, true), McpKind::Local);
        assert_eq!(McpServer::discriminate(false, false), McpKind::Local);
    }

    #[test]
    fn local_serde_roundtrip() {
        let s = McpServer::local("npx", vec!["-y".into(), "pkg".into()], BTreeMap::new());
        let json = serde_json::to_string(&s).unwrap();
        let back: McpServer = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
