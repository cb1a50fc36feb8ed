// SPDX-License-Identifier: MIT OR Apache-2.0
//! Claude Code chat history: `~/.Claude/projects/<mangled>/history.jsonl`,
//! indexed by `sessions-index.json` (spec §4.4, §4.1).

use std::path::{Path, PathBuf};

use acc_paths::{claude_code, Env};
use serde_json::Value;

/// One parsed JSONL line's Anthropic message body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeCodeMessageRecord {
    /// The line's top-level `type`: `user`, `assistant`, `summary`, or
    /// `file-history-snapshot`.
    pub record_type: String,
    /// Creation timestamp, milliseconds since epoch, if present.
    pub timestamp_ms: Option<i64>,
    /// The nested `message` object's `content`, already normalized to an
    /// array of content-block values (a bare string body is wrapped as a
    /// single `{"type":"text","text":...}` block).
    pub content_blocks: Vec<Value>,
}

/// A whole Claude Code session, assembled from one `history.jsonl` file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeCodeHistorySession {
    /// Session id, taken from `sessions-index.json` or the file stem.
    pub session_id: String,
    /// Project directory this session belongs to.
    pub project_path: PathBuf,
    /// Ordered parsed message records; unparseable lines are skipped.
    pub messages: Vec<ClaudeCodeMessageRecord>,
}

fn normalize_content(message: &Value) -> Vec<Value> {
    match message.get("content") {
        Some(Value::Array(blocks)) => blocks.clone(),
        Some(Value::String(text)) => vec![serde_json::json!({"type": "text", "text": text})],
        _ => Vec::new(),
    }
}

fn parse_line(line: &str) -> Option<ClaudeCodeMessageRecord> {
    if line.trim().is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(line).ok()?;
    let record_type = value.get("type").and_then(Value::as_str)?.to_string();
    let timestamp_ms = value
        .get("timestamp")
        .and_then(Value::as_i64)
        .or_else(|| value.get("timestamp").and_then(Value::as_str).and_then(|s| s.parse().ok()));
    let content_blocks = value.get("message").map(normalize_content).unwrap_or_default();
    Some(ClaudeCodeMessageRecord {
        record_type,
        timestamp_ms,
        content_blocks,
    })
}

fn parse_jsonl(path: &Path) -> Vec<ClaudeCodeMessageRecord> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content.lines().filter_map(parse_line).collect()
}

/// Read `sessions-index.json`'s session ids for `project_path`. Missing or
/// malformed index files yield an empty list rather than an error; history
/// scanning is always best-effort.
fn session_ids_for_project(env: &Env, project_path: &Path) -> Vec<String> {
    let Some(index_path) = claude_code::sessions_index(env, project_path) else {
        return Vec::new();
    };
    let Ok(raw) = std::fs::read_to_string(&index_path) else {
        return Vec::new();
    };
    let Ok(value) = serde_json::from_str::<Value>(&raw) else {
        return Vec::new();
    };
    value
        .get("sessions")
        .and_then(Value::as_array)
        .map(|sessions| {
            sessions
                .iter()
                .filter_map(|s| s.get("id").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Scan every project directory under `~/.Claude/projects` and return one
/// [`ClaudeCodeHistorySession`] per `history.jsonl` file found.
#[must_use]
pub fn scan_claude_code_history(env: &Env) -> Vec<ClaudeCodeHistorySession> {
    let Some(root) = claude_code::projects_root(env) else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(&root) else {
        return Vec::new();
    };

    let mut sessions = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let history_path = dir.join("history.jsonl");
        if !history_path.is_file() {
            continue;
        }
        let messages = parse_jsonl(&history_path);
        if messages.is_empty() {
            continue;
        }
        let project_path = claude_code::unmangle_project_path(&dir.file_name().unwrap_or_default().to_string_lossy());
        let ids = session_ids_for_project(env, &project_path);
        let session_id = ids.into_iter().next().unwrap_or_else(|| {
            dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
        });
        sessions.push(ClaudeCodeHistorySession { session_id, project_path, messages });
    }
    sessions
}
