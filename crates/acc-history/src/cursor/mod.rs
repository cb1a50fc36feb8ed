// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cursor chat history: `workspaceStorage/<hash>/{workspace.json,state.vscdb}`
//! plus a single global `globalStorage/state.vscdb` holding full
//! conversation bodies (spec §4.4).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use acc_error::{AccError, ErrorCode};
use acc_paths::cursor::{self, StorageRoots};
use rusqlite::Connection;
use serde_json::Value;

/// Above this quick-count byte length we estimate composer count instead of
/// parsing the metadata JSON in full (spec §4.4 step 2).
const QUICK_COUNT_PARSE_THRESHOLD: usize = 50 * 1024 * 1024;
/// Average bytes per composer metadata record, used for the estimate above
/// the threshold.
const AVG_BYTES_PER_COMPOSER: usize = 400;
/// Composers are fetched and projected in batches of this size to bound
/// peak memory (spec §4.4 step 4).
const COMPOSER_BATCH_SIZE: usize = 100;

/// One content bubble inside a Cursor composer conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorHistoryBubble {
    /// `1` for a user turn, `2` for an assistant turn.
    pub bubble_type: u8,
    /// Raw bubble JSON as stored under `bubbleId:<composerId>:<bubbleId>`.
    pub data: Value,
}

/// One composer (chat) discovered in a workspace, with its bubbles already
/// fetched and ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorHistoryMessage {
    /// `composerId`.
    pub composer_id: String,
    /// Workspace-relative project path, decoded from `workspace.json`.
    pub project_path: PathBuf,
    /// Composer creation time, milliseconds since epoch.
    pub created_at: i64,
    /// Composer last-update time, milliseconds since epoch.
    pub updated_at: i64,
    /// Ordered bubbles for this composer.
    pub bubbles: Vec<CursorHistoryBubble>,
}

/// A full scanned session, ready for [`crate::convert::convert_cursor_session`].
pub type CursorHistorySession = CursorHistoryMessage;

/// Progress phases emitted during a scan (spec §4.4: "progress contract").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// A workspace is currently being scanned.
    Scanning,
    /// The scan has finished; always fires before the call returns.
    Complete,
}

/// One progress callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgress<'a> {
    /// Current phase.
    pub phase: ScanPhase,
    /// The workspace path currently (or, for `Complete`, last) processed.
    pub workspace: Option<&'a Path>,
    /// 0-based index of `workspace` among all discovered workspaces.
    pub workspace_index: usize,
    /// Total number of discovered workspaces.
    pub workspace_count: usize,
    /// Running total of sessions found so far.
    pub sessions_found: usize,
}

/// Decode a `workspace.json` manifest's `folder` field (a `file://` URI)
/// into a plain filesystem path.
fn decode_workspace_folder(manifest: &Value) -> Option<PathBuf> {
    let folder = manifest.get("folder").and_then(Value::as_str)?;
    let path = folder.strip_prefix("file://").unwrap_or(folder);
    let decoded = percent_decode(path);
    if decoded.is_empty() {
        None
    } else {
        Some(PathBuf::from(decoded))
    }
}

/// Minimal percent-decoder for the handful of characters Cursor's `file://`
/// URIs actually escape (spaces and unicode path segments); not a general
/// URL decoder.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Ok(hex) = std::str::from_utf8(&bytes[i + 1..i + 3]) {
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_non_fatal_sqlite_error(err: &rusqlite::Error) -> bool {
    let msg = err.to_string().to_ascii_lowercase();
    msg.contains("cannot open") || msg.contains("no such table") || msg.contains("unable to open database file")
}

fn open_db(path: &Path) -> Result<Option<Connection>, AccError> {
    match Connection::open(path) {
        Ok(conn) => Ok(Some(conn)),
        Err(e) if is_non_fatal_sqlite_error(&e) => Ok(None),
        Err(e) => Err(AccError::new(ErrorCode::SqliteQueryFailed, "failed to open cursor sqlite database")
            .with_context("path", path.to_string_lossy())
            .with_source(e)),
    }
}

/// Read a single `ItemTable` value by key, tolerating "no such table" by
/// treating it as "not found" rather than an error.
fn read_item_table_value(conn: &Connection, key: &str) -> Result<Option<String>, AccError> {
    let query = conn.query_row("SELECT value FROM ItemTable WHERE key = ?1", [key], |row| row.get::<_, String>(0));
    match query {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) if is_non_fatal_sqlite_error(&e) => Ok(None),
        Err(e) => Err(AccError::new(ErrorCode::SqliteQueryFailed, "ItemTable query failed")
            .with_context("key", key)
            .with_source(e)),
    }
}

fn read_disk_kv_value(conn: &Connection, key: &str) -> Result<Option<String>, AccError> {
    let query = conn.query_row("SELECT value FROM cursorDiskKV WHERE key = ?1", [key], |row| row.get::<_, String>(0));
    match query {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) if is_non_fatal_sqlite_error(&e) => Ok(None),
        Err(e) => Err(AccError::new(ErrorCode::SqliteQueryFailed, "cursorDiskKV query failed")
            .with_context("key", key)
            .with_source(e)),
    }
}

/// Quick-count the composers stored in a workspace's metadata blob without
/// always paying for a full JSON parse (spec §4.4 step 2).
fn quick_count_composers(raw: &str) -> usize {
    if raw.len() < QUICK_COUNT_PARSE_THRESHOLD {
        serde_json::from_str::<Value>(raw)
            .ok()
            .and_then(|v| v.get("allComposers").and_then(Value::as_array).map(Vec::len))
            .unwrap_or(0)
    } else {
        raw.len() / AVG_BYTES_PER_COMPOSER
    }
}

/// A single workspace directory, decoded and ready to scan.
struct DiscoveredWorkspace {
    dir: PathBuf,
    project_path: PathBuf,
}

fn discover_workspaces(roots: &StorageRoots) -> Vec<DiscoveredWorkspace> {
    let Ok(entries) = std::fs::read_dir(&roots.workspace_storage) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let manifest_path = cursor::workspace_manifest(&dir);
        let Ok(raw) = std::fs::read_to_string(&manifest_path) else {
            continue;
        };
        let Ok(manifest) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        let Some(project_path) = decode_workspace_folder(&manifest) else {
            continue;
        };
        if !cursor::workspace_state_db(&dir).exists() {
            continue;
        }
        out.push(DiscoveredWorkspace { dir, project_path });
    }
    out
}

/// Scan every Cursor workspace under `roots`, calling `on_progress` as each
/// workspace is processed and once more with `Complete` before returning
/// (spec §4.4).
pub fn scan_cursor_history(
    roots: &StorageRoots,
    since: Option<i64>,
    mut on_progress: impl FnMut(ScanProgress<'_>),
) -> Result<Vec<CursorHistorySession>, AccError> {
    let workspaces = discover_workspaces(roots);
    let mut sessions = Vec::new();

    let global_db = open_db(&cursor::global_state_db(roots))?;

    for (index, workspace) in workspaces.iter().enumerate() {
        on_progress(ScanProgress {
            phase: ScanPhase::Scanning,
            workspace: Some(&workspace.dir),
            workspace_index: index,
            workspace_count: workspaces.len(),
            sessions_found: sessions.len(),
        });

        let Some(ws_conn) = open_db(&cursor::workspace_state_db(&workspace.dir))? else {
            continue;
        };
        let Some(raw_metadata) = read_item_table_value(&ws_conn, "composer.composerData")? else {
            drop(ws_conn);
            continue;
        };
        drop(ws_conn);

        if quick_count_composers(&raw_metadata) == 0 {
            continue;
        }
        let Ok(metadata) = serde_json::from_str::<Value>(&raw_metadata) else {
            continue;
        };
        let Some(composers) = metadata.get("allComposers").and_then(Value::as_array) else {
            continue;
        };

        let Some(global) = global_db.as_ref() else {
            continue;
        };

        let candidate_ids: Vec<(String, bool, Option<i64>)> = composers
            .iter()
            .filter_map(|c| {
                let id = c.get("composerId").and_then(Value::as_str)?.to_string();
                let archived = c.get("isArchived").and_then(Value::as_bool).unwrap_or(false);
                let created = c.get("createdAt").and_then(Value::as_i64);
                Some((id, archived, created))
            })
            .filter(|(_, archived, created)| {
                if *archived {
                    return false;
                }
                match (since, created) {
                    (Some(since), Some(created)) => *created >= since,
                    _ => true,
                }
            })
            .collect();

        for batch in candidate_ids.chunks(COMPOSER_BATCH_SIZE) {
            for (composer_id, _, created) in batch {
                if let Some(session) = fetch_composer(global, composer_id, &workspace.project_path, *created)? {
                    sessions.push(session);
                }
            }
        }
    }

    on_progress(ScanProgress {
        phase: ScanPhase::Complete,
        workspace: workspaces.last().map(|w| w.dir.as_path()),
        workspace_index: workspaces.len().saturating_sub(1),
        workspace_count: workspaces.len(),
        sessions_found: sessions.len(),
    });

    Ok(sessions)
}

fn fetch_composer(
    global: &Connection,
    composer_id: &str,
    project_path: &Path,
    created: Option<i64>,
) -> Result<Option<CursorHistoryMessage>, AccError> {
    let Some(raw) = read_disk_kv_value(global, &format!("composerData:{composer_id}"))? else {
        return Ok(None);
    };
    let Ok(data) = serde_json::from_str::<Value>(&raw) else {
        return Ok(None);
    };
    let Some(headers) = data.get("fullConversationHeadersOnly").and_then(Value::as_array) else {
        return Ok(None);
    };

    let mut bubbles = Vec::new();
    for header in headers {
        let Some(bubble_id) = header.get("bubbleId").and_then(Value::as_str) else {
            continue;
        };
        let bubble_type = header.get("type").and_then(Value::as_u64).unwrap_or(0) as u8;
        let Some(raw_bubble) = read_disk_kv_value(global, &format!("bubbleId:{composer_id}:{bubble_id}"))? else {
            continue;
        };
        let Ok(bubble_data) = serde_json::from_str::<Value>(&raw_bubble) else {
            continue;
        };
        bubbles.push(CursorHistoryBubble { bubble_type, data: bubble_data });
    }

    let created_at = created.or_else(|| data.get("createdAt").and_then(Value::as_i64)).unwrap_or(0);
    let updated_at = data.get("lastUpdatedAt").and_then(Value::as_i64).unwrap_or(created_at);

    Ok(Some(CursorHistoryMessage {
        composer_id: composer_id.to_string(),
        project_path: project_path.to_path_buf(),
        created_at,
        updated_at,
        bubbles,
    }))
}

/// Group scanned sessions by their decoded project path, for callers that
/// want to batch conversion/writing per project.
#[must_use]
pub fn group_by_project(sessions: Vec<CursorHistoryMessage>) -> BTreeMap<PathBuf, Vec<CursorHistoryMessage>> {
    let mut out: BTreeMap<PathBuf, Vec<CursorHistoryMessage>> = BTreeMap::new();
    for session in sessions {
        out.entry(session.project_path.clone()).or_default().push(session);
    }
    out
}
