// SPDX-License-Identifier: MIT OR Apache-2.0
//! History writer (spec §4.9): two storage modes (SQLite, the default for
//! v1.2+ targets, and a flat-file legacy layout), both de-duplicating
//! against already-present session ids before writing anything.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use acc_error::{AccError, ErrorCode};
use acc_ir::ConvertedSession;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Where converted sessions are persisted.
#[derive(Debug, Clone)]
pub enum HistoryTarget {
    /// A single SQLite database file (v1.2+ default).
    Sqlite(PathBuf),
    /// `<root>/session/<projectId>/<sessionId>.json` (legacy layout).
    FlatFile(PathBuf),
}

/// Progress phases emitted while writing history (spec §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWritePhase {
    /// Collecting already-present session ids.
    DedupCheck,
    /// Persisting non-duplicate sessions.
    Writing,
    /// The write has finished.
    Complete,
}

/// The outcome of a [`write_history`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryWriteSummary {
    /// Session ids that were written.
    pub written: Vec<String>,
    /// Session ids skipped because they were already present (spec §4.9
    /// dedup invariant).
    pub skipped_duplicates: Vec<String>,
}

fn existing_session_ids(target: &HistoryTarget) -> Result<HashSet<String>, AccError> {
    match target {
        HistoryTarget::Sqlite(db_path) => {
            if !db_path.is_file() {
                return Ok(HashSet::new());
            }
            let conn = open_sqlite(db_path)?;
            ensure_schema(&conn)?;
            let mut stmt = conn
                .prepare("SELECT id FROM session")
                .map_err(|e| sqlite_error("failed to query existing session ids", e))?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| sqlite_error("failed to read session ids", e))?
                .filter_map(Result::ok)
                .collect();
            Ok(ids)
        }
        HistoryTarget::FlatFile(root) => {
            let session_root = root.join("session");
            let Ok(project_dirs) = fs::read_dir(&session_root) else {
                return Ok(HashSet::new());
            };
            let mut ids = HashSet::new();
            for project_dir in project_dirs.flatten() {
                let Ok(files) = fs::read_dir(project_dir.path()) else {
                    continue;
                };
                for file in files.flatten() {
                    if let Some(stem) = file.path().file_stem() {
                        ids.insert(stem.to_string_lossy().to_string());
                    }
                }
            }
            Ok(ids)
        }
    }
}

fn open_sqlite(path: &Path) -> Result<Connection, AccError> {
    Connection::open(path).map_err(|e| sqlite_error("failed to open history database", e))
}

fn sqlite_error(message: &str, source: rusqlite::Error) -> AccError {
    AccError::new(ErrorCode::SqliteQueryFailed, message).with_source(source)
}

fn ensure_schema(conn: &Connection) -> Result<(), AccError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS session (id TEXT PRIMARY KEY, project_id TEXT NOT NULL, data TEXT NOT NULL)",
        [],
    )
    .map_err(|e| sqlite_error("failed to create session table", e))?;
    Ok(())
}

fn write_one(target: &HistoryTarget, session: &ConvertedSession) -> Result<(), AccError> {
    let serialized = serde_json::to_string(session)
        .map_err(|e| AccError::new(ErrorCode::SerializationFailed, "failed to serialize session").with_source(e))?;
    match target {
        HistoryTarget::Sqlite(db_path) => {
            let conn = open_sqlite(db_path)?;
            ensure_schema(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO session (id, project_id, data) VALUES (?1, ?2, ?3)",
                rusqlite::params![session.session.id, session.project_id, serialized],
            )
            .map_err(|e| sqlite_error("failed to insert session", e))?;
        }
        HistoryTarget::FlatFile(root) => {
            let dir = root.join("session").join(&session.project_id);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join(format!("{}.json", session.session.id)), serialized)?;
        }
    }
    Ok(())
}

/// Write `sessions` to `target`, skipping any whose id is already present
/// (spec §4.9 dedup invariant). `on_progress` fires with `DedupCheck`,
/// `Writing`, then `Complete`.
pub fn write_history(
    sessions: &[ConvertedSession],
    target: &HistoryTarget,
    mut on_progress: impl FnMut(HistoryWritePhase),
) -> Result<HistoryWriteSummary, AccError> {
    on_progress(HistoryWritePhase::DedupCheck);
    let existing = existing_session_ids(target)?;

    on_progress(HistoryWritePhase::Writing);
    let mut summary = HistoryWriteSummary::default();
    for session in sessions {
        if existing.contains(&session.session.id) {
            summary.skipped_duplicates.push(session.session.id.clone());
            continue;
        }
        write_one(target, session)?;
        summary.written.push(session.session.id.clone());
    }

    on_progress(HistoryWritePhase::Complete);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_ir::{HistorySession, HistoryTimestamps};
    use tempfile::tempdir;

    fn sample(id: &str, project_id: &str) -> ConvertedSession {
        ConvertedSession {
            project_id: project_id.to_string(),
            session: HistorySession {
                id: id.to_string(),
                slug: "hello".into(),
                version: HistorySession::VERSION.into(),
                project_id: project_id.to_string(),
                directory: "/repo".into(),
                title: "hello".into(),
                time: HistoryTimestamps { created: 0, updated: 0 },
                summary: None,
            },
            messages: vec![],
        }
    }

    #[test]
    fn flat_file_writes_new_sessions_and_skips_duplicates() {
        let tmp = tempdir().unwrap();
        let target = HistoryTarget::FlatFile(tmp.path().to_path_buf());
        let sessions = vec![sample("ses_1", "proj_a")];

        let mut phases = Vec::new();
        let summary = write_history(&sessions, &target, |p| phases.push(p)).unwrap();
        assert_eq!(summary.written, vec!["ses_1"]);
        assert!(tmp.path().join("session/proj_a/ses_1.json").is_file());
        assert_eq!(phases, vec![HistoryWritePhase::DedupCheck, HistoryWritePhase::Writing, HistoryWritePhase::Complete]);

        let summary2 = write_history(&sessions, &target, |_| {}).unwrap();
        assert!(summary2.written.is_empty());
        assert_eq!(summary2.skipped_duplicates, vec!["ses_1"]);
    }

    #[test]
    fn sqlite_writes_new_sessions_and_skips_duplicates() {
        let tmp = tempdir().unwrap();
        let target = HistoryTarget::Sqlite(tmp.path().join("opencode.db"));
        let sessions = vec![sample("ses_1", "proj_a")];

        let summary = write_history(&sessions, &target, |_| {}).unwrap();
        assert_eq!(summary.written, vec!["ses_1"]);

        let summary2 = write_history(&sessions, &target, |_| {}).unwrap();
        assert!(summary2.written.is_empty());
        assert_eq!(summary2.skipped_duplicates, vec!["ses_1"]);
    }
}
