//! Chat-history scanning and conversion for Cursor (SQLite) and Claude Code
//! (JSONL), producing format-agnostic [`acc_ir::ConvertedSession`] values
//! (spec §4.4).
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod claude_code;
mod convert;
mod cursor;

pub use claude_code::{scan_claude_code_history, ClaudeCodeHistorySession, ClaudeCodeMessageRecord};
pub use convert::{convert_claude_code_session, convert_cursor_session};
pub use cursor::{scan_cursor_history, CursorHistoryBubble, CursorHistoryMessage, CursorHistorySession, ScanProgress};
