//! Filesystem writer, merge strategies, and timestamped backup manager for
//! the agent config converter (spec §4.9, §4.10).
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod history;
mod merge;
mod write;

pub use backup::{create_backup, delete_backup, list_backups, restore, BackupInfo, BackupManifest, BackupManifestEntry, RestoreResult};
pub use history::{write_history, HistoryTarget, HistoryWritePhase, HistoryWriteSummary};
pub use merge::{merge_json, MergeStrategy};
pub use write::{write, WriteOptions, WriteSummary};
