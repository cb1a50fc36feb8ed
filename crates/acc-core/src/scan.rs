// SPDX-License-Identifier: MIT OR Apache-2.0
//! Format-dispatching scan entry point (spec §6.4 `scanFormat`).

use std::path::PathBuf;

use acc_error::AccError;
use acc_history::{convert_claude_code_session, convert_cursor_session};
use acc_ir::{ConvertedSession, Format};
use acc_paths::{cursor::storage_roots, Env, Os};

/// Options controlling a single [`scan_format`] call.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Which ecosystem to scan.
    pub format: Format,
    /// Resolved environment variables driving path resolution.
    pub env: Env,
    /// Project root to additionally scan, if any.
    pub project_root: Option<PathBuf>,
    /// Whether to also scan and convert chat history (Claude Code JSONL,
    /// Cursor SQLite). Ignored for OpenCode, which has no source-side
    /// history concept.
    pub include_history: bool,
    /// Only include history sessions created at or after this Unix-epoch
    /// millisecond timestamp.
    pub since: Option<i64>,
    /// Host platform, used only to resolve Cursor's `workspaceStorage`/
    /// `globalStorage` roots.
    pub os: Os,
}

impl ScanOptions {
    /// A scan of `format` rooted at `project_root`, with history and
    /// `since` left at their default (off / unset).
    #[must_use]
    pub fn new(format: Format, env: Env, project_root: Option<PathBuf>) -> Self {
        Self {
            format,
            env,
            project_root,
            include_history: false,
            since: None,
            os: Os::host(),
        }
    }
}

/// One format's scan output, tagged by format, with chat history already
/// converted to the format-agnostic [`ConvertedSession`] shape when
/// `include_history` was requested.
#[derive(Debug, Clone)]
pub enum AnyScanResult {
    /// Claude Code scan output.
    ClaudeCode {
        /// Raw scan of settings, agents, commands, skills, rules.
        scan: claude_code_scan::ScanResult,
        /// Converted chat-history sessions, if requested.
        history: Vec<ConvertedSession>,
    },
    /// OpenCode scan output. OpenCode has no source-side chat-history
    /// concept in this pipeline (spec §3.10: history flows *into*
    /// OpenCode's storage, not out of it).
    OpenCode {
        /// Raw scan of config, agents, commands, skills, rules.
        scan: opencode_scan::ScanResult,
    },
    /// Cursor scan output.
    Cursor {
        /// Raw scan of MCP config, rules, agents, commands, skills.
        scan: cursor_scan::ScanResult,
        /// Converted chat-history sessions, if requested.
        history: Vec<ConvertedSession>,
    },
}

impl AnyScanResult {
    /// The format this scan result came from.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::ClaudeCode { .. } => Format::ClaudeCode,
            Self::OpenCode { .. } => Format::OpenCode,
            Self::Cursor { .. } => Format::Cursor,
        }
    }

    /// The converted chat-history sessions carried by this scan, if any
    /// were requested and found.
    #[must_use]
    pub fn history(&self) -> &[ConvertedSession] {
        match self {
            Self::ClaudeCode { history, .. } | Self::Cursor { history, .. } => history,
            Self::OpenCode { .. } => &[],
        }
    }
}

/// Scan a single format per `opts` (spec §6.4 `scanFormat`). Only the
/// Cursor history subsystem can fail with a systemic [`AccError`] (an
/// unreadable SQLite database beyond the two allow-listed recoverable
/// codes); everything else tolerates missing files by returning an
/// empty-but-well-formed result, per spec §7.
pub fn scan_format(opts: ScanOptions) -> Result<AnyScanResult, AccError> {
    match opts.format {
        Format::ClaudeCode => {
            let scan = claude_code_scan::scan(&opts.env, opts.project_root.as_deref());
            let history = if opts.include_history {
                acc_history::scan_claude_code_history(&opts.env)
                    .iter()
                    .filter_map(convert_claude_code_session)
                    .collect()
            } else {
                Vec::new()
            };
            Ok(AnyScanResult::ClaudeCode { scan, history })
        }
        Format::OpenCode => {
            let scan = opencode_scan::scan(&opts.env, opts.project_root.as_deref());
            Ok(AnyScanResult::OpenCode { scan })
        }
        Format::Cursor => {
            let scan = cursor_scan::scan(&opts.env, opts.project_root.as_deref());
            let history = if opts.include_history {
                match storage_roots(&opts.env, opts.os) {
                    Some(roots) => acc_history::scan_cursor_history(&roots, opts.since, |_progress| {})?
                        .iter()
                        .filter_map(convert_cursor_session)
                        .collect(),
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            };
            Ok(AnyScanResult::Cursor { scan, history })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_scan_of_any_format_is_well_formed() {
        let home = tempdir().unwrap();
        for format in Format::ALL {
            let env = Env::from_home(home.path());
            let opts = ScanOptions::new(format, env, None);
            let result = scan_format(opts).unwrap();
            assert_eq!(result.format(), format);
            assert!(result.history().is_empty());
        }
    }

    #[test]
    fn cursor_history_is_empty_when_no_workspaces_exist_on_disk() {
        let home = tempdir().unwrap();
        let env = Env::from_home(home.path());
        let mut opts = ScanOptions::new(Format::Cursor, env, None);
        opts.include_history = true;
        let result = scan_format(opts).unwrap();
        assert!(result.history().is_empty());
    }
}
