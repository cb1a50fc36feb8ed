// SPDX-License-Identifier: MIT OR Apache-2.0
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Derive the stable `projectId` for a project path: the first 16 hex
/// characters of SHA-256(project path) (spec §3.10).
#[must_use]
pub fn project_id_for_path(project_path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(project_path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    let hex = digest.iter().map(|b| format!("{b:02x}")).collect::<String>();
    hex[..16].to_string()
}

/// Chat message author role (spec §3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    /// A user-authored turn.
    User,
    /// An assistant-authored turn.
    Assistant,
}

/// The kind of content carried by a [`HistoryPart`] (spec §3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryPartType {
    /// Plain message text.
    Text,
    /// Extended-thinking / chain-of-thought content.
    Reasoning,
    /// A tool invocation request.
    ToolInvocation,
    /// The result of a tool invocation.
    ToolResult,
}

/// A single content part inside a [`HistoryMessage`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryPart {
    /// Unique id for this part.
    pub id: String,
    /// Owning message id. Invariant: equals the owning [`HistoryMessage::id`].
    pub message_id: String,
    /// Part kind.
    #[serde(rename = "type")]
    pub part_type: HistoryPartType,
    /// JSON-encoded content payload (shape depends on `part_type`).
    pub content: serde_json::Value,
}

/// A single chat turn (spec §3.10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryMessage {
    /// Unique id for this message.
    pub id: String,
    /// Owning session id. Invariant: equals [`HistorySession::id`].
    pub session_id: String,
    /// Author role.
    pub role: HistoryRole,
    /// Creation timestamp, milliseconds since epoch, as carried by the
    /// source format.
    pub time: i64,
    /// Ordered content parts.
    pub parts: Vec<HistoryPart>,
}

/// Created/updated timestamp pair, milliseconds since epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryTimestamps {
    /// Creation time.
    pub created: i64,
    /// Last-update time.
    pub updated: i64,
}

/// Session metadata (spec §3.10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistorySession {
    /// Stable, deterministic session id derived from the source identifier.
    pub id: String,
    /// URL-safe slug derived from the title.
    pub slug: String,
    /// Always the literal string `"imported"`.
    pub version: String,
    /// Owning project id. Invariant: equals [`ConvertedSession::project_id`].
    pub project_id: String,
    /// Absolute project directory.
    pub directory: String,
    /// Session title.
    pub title: String,
    /// Created/updated timestamps.
    pub time: HistoryTimestamps,
    /// Optional one-line summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl HistorySession {
    /// `"imported"`, the fixed version tag for every converted session.
    pub const VERSION: &'static str = "imported";

    /// Derive the URL-safe slug from a title: lowercase, `[^a-z0-9]+` ->
    /// `-`, strip leading/trailing `-`, truncate to 50 chars (spec §4.4).
    #[must_use]
    pub fn slugify(title: &str) -> String {
        let lower = title.to_lowercase();
        let mut slug = String::with_capacity(lower.len());
        let mut last_was_dash = false;
        for ch in lower.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch);
                last_was_dash = false;
            } else if !last_was_dash {
                slug.push('-');
                last_was_dash = true;
            }
        }
        let trimmed = slug.trim_matches('-');
        let truncated: String = trimmed.chars().take(50).collect();
        truncated.trim_matches('-').to_string()
    }

    /// Derive the title fallback from the first user message (spec
    /// §4.4): trimmed, truncated to 80 chars with `"..."` suffix if
    /// longer, else `"Untitled chat"` if there is no user message.
    #[must_use]
    pub fn derive_title(first_user_text: Option<&str>) -> String {
        match first_user_text.map(str::trim).filter(|s| !s.is_empty()) {
            None => "Untitled chat".to_string(),
            Some(text) => {
                if text.chars().count() > 80 {
                    let truncated: String = text.chars().take(80).collect();
                    format!("{truncated}...")
                } else {
                    text.to_string()
                }
            }
        }
    }
}

/// A fully projected, format-agnostic chat session ready for the writer
/// (spec §3.10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConvertedSession {
    /// Owning project id. Invariant: equals `session.project_id`.
    pub project_id: String,
    /// Session metadata.
    pub session: HistorySession,
    /// Ordered chat messages.
    pub messages: Vec<HistoryMessage>,
}

impl ConvertedSession {
    /// Validate the invariants from spec §3.10/§8: `session.project_id ==
    /// project_id`; every message's `session_id` matches `session.id`;
    /// every part's `message_id` matches its owning message's `id`.
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        if self.session.project_id != self.project_id {
            return false;
        }
        self.messages.iter().all(|m| {
            m.session_id == self.session.id
                && m.parts.iter().all(|p| p.message_id == m.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_is_16_hex_chars() {
        let id = project_id_for_path(Path::new("/Users/x/project"));
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn project_id_is_deterministic() {
        let a = project_id_for_path(Path::new("/Users/x/project"));
        let b = project_id_for_path(Path::new("/Users/x/project"));
        assert_eq!(a, b);
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(HistorySession::slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn slugify_truncates_to_50() {
        let title = "a".repeat(100);
        assert_eq!(HistorySession::slugify(&title).len(), 50);
    }

    #[test]
    fn slugify_strips_leading_trailing_dashes() {
        assert_eq!(HistorySession::slugify("--hi--"), "hi");
    }

    #[test]
    fn derive_title_untitled_when_absent() {
        assert_eq!(HistorySession::derive_title(None), "Untitled chat");
        assert_eq!(HistorySession::derive_title(Some("   ")), "Untitled chat");
    }

    #[test]
    fn derive_title_truncates_long_text() {
        let long = "x".repeat(100);
        let title = HistorySession::derive_title(Some(&long));
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 83);
    }

    #[test]
    fn derive_title_passes_short_text_through() {
        assert_eq!(HistorySession::derive_title(Some("hello")), "hello");
    }

    #[test]
    fn invariants_hold_for_well_formed_session() {
        let session = ConvertedSession {
            project_id: "abc".into(),
            session: HistorySession {
                id: "ses_1".into(),
                slug: "hello".into(),
                version: HistorySession::VERSION.into(),
                project_id: "abc".into(),
                directory: "/p".into(),
                title: "hello".into(),
                time: HistoryTimestamps { created: 0, updated: 0 },
                summary: None,
            },
            messages: vec![HistoryMessage {
                id: "msg_1".into(),
                session_id: "ses_1".into(),
                role: HistoryRole::User,
                time: 0,
                parts: vec![HistoryPart {
                    id: "part_1".into(),
                    message_id: "msg_1".into(),
                    part_type: HistoryPartType::Text,
                    content: serde_json::json!({"text": "hi"}),
                }],
            }],
        };
        assert!(session.invariants_hold());
    }

    #[test]
    fn invariants_fail_on_mismatched_session_id() {
        let mut session = ConvertedSession {
            project_id: "abc".into(),
            session: HistorySession {
                id: "ses_1".into(),
                slug: "hello".into(),
                version: HistorySession::VERSION.into(),
                project_id: "abc".into(),
                directory: "/p".into(),
                title: "hello".into(),
                time: HistoryTimestamps { created: 0, updated: 0 },
                summary: None,
            },
            messages: vec![HistoryMessage {
                id: "msg_1".into(),
                session_id: "ses_WRONG".into(),
                role: HistoryRole::User,
                time: 0,
                parts: vec![],
            }],
        };
        assert!(!session.invariants_hold());
        session.messages.clear();
        assert!(session.invariants_hold());
    }
}
