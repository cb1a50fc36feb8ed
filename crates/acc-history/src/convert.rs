// SPDX-License-Identifier: MIT OR Apache-2.0
//! Format-agnostic conversion of scanned history sessions into
//! [`ConvertedSession`] values ready for the writer (spec §4.4).

use acc_ir::{
    project_id_for_path, ConvertedSession, HistoryMessage, HistoryPart, HistoryPartType, HistoryRole, HistorySession,
    HistoryTimestamps,
};
use serde_json::Value;

use crate::claude_code::ClaudeCodeHistorySession;
use crate::cursor::{CursorHistoryBubble, CursorHistorySession};

fn first_user_text(messages: &[HistoryMessage]) -> Option<String> {
    messages.iter().find(|m| m.role == HistoryRole::User).and_then(|m| {
        m.parts
            .iter()
            .find(|p| p.part_type == HistoryPartType::Text)
            .and_then(|p| p.content.get("text").and_then(Value::as_str).map(str::to_string))
    })
}

fn build_session_metadata(
    project_id: &str,
    session_id: &str,
    project_path: &std::path::Path,
    created: i64,
    updated: i64,
    messages: &[HistoryMessage],
) -> HistorySession {
    let title = HistorySession::derive_title(first_user_text(messages).as_deref());
    HistorySession {
        id: session_id.to_string(),
        slug: HistorySession::slugify(&title),
        version: HistorySession::VERSION.to_string(),
        project_id: project_id.to_string(),
        directory: project_path.to_string_lossy().to_string(),
        title,
        time: HistoryTimestamps { created, updated },
        summary: None,
    }
}

fn part(message_id: &str, index: usize, part_type: HistoryPartType, content: Value) -> HistoryPart {
    HistoryPart {
        id: format!("{message_id}_part{index}"),
        message_id: message_id.to_string(),
        part_type,
        content,
    }
}

/// Project one Cursor composer (with its fetched bubbles) into a
/// [`ConvertedSession`]. Parts within each bubble are appended in order:
/// reasoning, text, tool-result. Returns `None` if no part survives (spec
/// §4.4: "session with zero resulting parts is dropped").
#[must_use]
pub fn convert_cursor_session(session: &CursorHistorySession) -> Option<ConvertedSession> {
    let project_id = project_id_for_path(&session.project_path);
    let session_id = format!("ses_{}", session.composer_id);

    let mut messages = Vec::new();
    for (i, bubble) in session.bubbles.iter().enumerate() {
        let message_id = format!("{session_id}_msg{i}");
        let role = if bubble.bubble_type == 2 { HistoryRole::Assistant } else { HistoryRole::User };
        let parts = cursor_bubble_parts(&message_id, bubble);
        if parts.is_empty() {
            continue;
        }
        messages.push(HistoryMessage {
            id: message_id,
            session_id: session_id.clone(),
            role,
            time: session.created_at,
            parts,
        });
    }
    if messages.is_empty() {
        return None;
    }

    let session_meta = build_session_metadata(
        &project_id,
        &session_id,
        &session.project_path,
        session.created_at,
        session.updated_at,
        &messages,
    );
    Some(ConvertedSession { project_id, session: session_meta, messages })
}

fn cursor_bubble_parts(message_id: &str, bubble: &CursorHistoryBubble) -> Vec<HistoryPart> {
    let mut parts = Vec::new();
    let mut idx = 0;

    if let Some(thinking) = bubble.data.get("thinking").and_then(|t| t.get("text")).and_then(Value::as_str) {
        if !thinking.is_empty() {
            parts.push(part(message_id, idx, HistoryPartType::Reasoning, serde_json::json!({"text": thinking})));
            idx += 1;
        }
    }
    if let Some(text) = bubble.data.get("text").and_then(Value::as_str) {
        if !text.is_empty() {
            parts.push(part(message_id, idx, HistoryPartType::Text, serde_json::json!({"text": text})));
            idx += 1;
        }
    }
    if let Some(results) = bubble.data.get("toolFormerData").and_then(|t| t.get("result")) {
        if !results.is_null() {
            parts.push(part(message_id, idx, HistoryPartType::ToolResult, serde_json::json!({"result": results})));
        }
    }
    parts
}

/// Project one Claude Code JSONL session into a [`ConvertedSession`].
/// Content blocks map `text`→text, `thinking`→reasoning, `tool_use`→
/// tool-invocation, `tool_result`→tool-result (spec §4.4). Returns `None`
/// if no part survives.
#[must_use]
pub fn convert_claude_code_session(session: &ClaudeCodeHistorySession) -> Option<ConvertedSession> {
    let project_id = project_id_for_path(&session.project_path);
    let session_id = format!("ses_{}", session.session_id);

    let mut messages = Vec::new();
    let mut first_time = None;
    let mut last_time = None;
    for (i, record) in session.messages.iter().enumerate() {
        let role = match record.record_type.as_str() {
            "user" => HistoryRole::User,
            "assistant" => HistoryRole::Assistant,
            _ => continue,
        };
        let time = record.timestamp_ms.unwrap_or(0);
        first_time.get_or_insert(time);
        last_time = Some(time);

        let message_id = format!("{session_id}_msg{i}");
        let parts = claude_code_block_parts(&message_id, &record.content_blocks);
        if parts.is_empty() {
            continue;
        }
        messages.push(HistoryMessage { id: message_id, session_id: session_id.clone(), role, time, parts });
    }
    if messages.is_empty() {
        return None;
    }

    let session_meta = build_session_metadata(
        &project_id,
        &session_id,
        &session.project_path,
        first_time.unwrap_or(0),
        last_time.unwrap_or(0),
        &messages,
    );
    Some(ConvertedSession { project_id, session: session_meta, messages })
}

fn claude_code_block_parts(message_id: &str, blocks: &[Value]) -> Vec<HistoryPart> {
    let mut parts = Vec::new();
    for (idx, block) in blocks.iter().enumerate() {
        let Some(block_type) = block.get("type").and_then(Value::as_str) else {
            continue;
        };
        let (part_type, content) = match block_type {
            "text" => (HistoryPartType::Text, serde_json::json!({"text": block.get("text").cloned().unwrap_or(Value::Null)})),
            "thinking" => (
                HistoryPartType::Reasoning,
                serde_json::json!({"text": block.get("thinking").cloned().unwrap_or(Value::Null)}),
            ),
            "tool_use" => (
                HistoryPartType::ToolInvocation,
                serde_json::json!({
                    "name": block.get("name").cloned().unwrap_or(Value::Null),
                    "input": block.get("input").cloned().unwrap_or(Value::Null),
                    "toolCallId": block.get("id").cloned().unwrap_or(Value::Null),
                }),
            ),
            "tool_result" => (
                HistoryPartType::ToolResult,
                serde_json::json!({"content": block.get("content").cloned().unwrap_or(Value::Null)}),
            ),
            _ => continue,
        };
        parts.push(part(message_id, idx, part_type, content));
    }
    parts
}
