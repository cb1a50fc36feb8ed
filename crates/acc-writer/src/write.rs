// SPDX-License-Identifier: MIT OR Apache-2.0
//! Filesystem writer (spec §4.9): applies a [`CanonicalConversionResult`]
//! to disk with a fixed operation order, merge strategies, backups, and
//! dry-run support.

use std::fs;
use std::path::{Path, PathBuf};

use acc_error::AccError;
use acc_ir::CanonicalConversionResult;
use serde::{Deserialize, Serialize};

use crate::backup::create_backup;
use crate::merge::{merge_json, MergeStrategy};

/// Options controlling a single [`write`] call.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Record what would be written without touching disk.
    pub dry_run: bool,
    /// Snapshot every target path before writing (ignored when `dry_run`).
    pub backup: bool,
    /// Overwrite an existing text file, or an `overwrite`-merged JSON file,
    /// that would otherwise be skipped.
    pub force: bool,
    /// How to combine rendered JSON with whatever is already on disk.
    pub merge_strategy: MergeStrategy,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            force: false,
            merge_strategy: MergeStrategy::Merge,
        }
    }
}

/// The outcome of a [`write`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteSummary {
    /// Paths written (or, in dry-run mode, that would have been written).
    pub files_written: Vec<PathBuf>,
    /// Paths left untouched because they already existed and writing them
    /// was not forced.
    pub files_skipped: Vec<PathBuf>,
    /// The backup directory created before writing, if any.
    pub backup_dir: Option<PathBuf>,
}

fn is_json_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn write_one(path: &Path, content: &str, opts: &WriteOptions, summary: &mut WriteSummary) -> Result<(), AccError> {
    if is_json_path(path) {
        write_json(path, content, opts, summary)
    } else {
        write_text(path, content, opts, summary)
    }
}

fn write_json(path: &Path, content: &str, opts: &WriteOptions, summary: &mut WriteSummary) -> Result<(), AccError> {
    let incoming: serde_json::Value = serde_json::from_str(content)
        .map_err(|e| AccError::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())))?;

    let existing_raw = fs::read_to_string(path).ok();
    let existing = existing_raw.as_deref().and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok());

    if existing.is_some() && opts.merge_strategy == MergeStrategy::Overwrite && !opts.force {
        summary.files_skipped.push(path.to_path_buf());
        return Ok(());
    }

    let merged = merge_json(existing.as_ref(), &incoming, opts.merge_strategy);
    let rendered = serde_json::to_string_pretty(&merged)
        .map_err(|e| AccError::from(std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())))?;

    if opts.dry_run {
        summary.files_written.push(path.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, rendered)?;
    summary.files_written.push(path.to_path_buf());
    Ok(())
}

fn write_text(path: &Path, content: &str, opts: &WriteOptions, summary: &mut WriteSummary) -> Result<(), AccError> {
    if path.exists() && !opts.force {
        summary.files_skipped.push(path.to_path_buf());
        return Ok(());
    }
    if opts.dry_run {
        summary.files_written.push(path.to_path_buf());
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    summary.files_written.push(path.to_path_buf());
    Ok(())
}

/// Apply `conversion` to disk under `backup_root` per `opts` (spec §4.9).
/// Operation order is fixed: collect target paths, optionally snapshot
/// them, then write global config, project configs, agents, commands,
/// rules, and extra files in that order. History and prompt history are
/// written separately via [`crate::history`].
pub fn write(conversion: &CanonicalConversionResult, backup_root: &Path, opts: WriteOptions) -> Result<WriteSummary, AccError> {
    let mut summary = WriteSummary::default();

    if opts.backup && !opts.dry_run {
        let targets = conversion.all_target_paths();
        summary.backup_dir = create_backup(backup_root, &targets, "Pre-conversion backup")?;
    }

    for (path, content) in &conversion.global_config {
        write_one(path, content, &opts, &mut summary)?;
    }
    for files in conversion.project_configs.values() {
        for (path, content) in files {
            write_one(path, content, &opts, &mut summary)?;
        }
    }
    for (path, content) in &conversion.agents {
        write_one(path, content, &opts, &mut summary)?;
    }
    for (path, content) in &conversion.commands {
        write_one(path, content, &opts, &mut summary)?;
    }
    for (path, content) in &conversion.rules {
        write_one(path, content, &opts, &mut summary)?;
    }
    for (path, content) in &conversion.extra_files {
        write_one(path, content, &opts, &mut summary)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_ir::Format;
    use tempfile::tempdir;

    fn opts(merge: MergeStrategy) -> WriteOptions {
        WriteOptions { dry_run: false, backup: false, force: false, merge_strategy: merge }
    }

    #[test]
    fn writes_new_json_and_text_files() {
        let tmp = tempdir().unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        let json_path = tmp.path().join("opencode.json");
        let md_path = tmp.path().join("agents/a.md");
        conversion.global_config.insert(json_path.clone(), "{\"model\":\"x\"}".into());
        conversion.agents.insert(md_path.clone(), "---\nname: a\n---\nbody".into());

        let summary = write(&conversion, tmp.path(), opts(MergeStrategy::Merge)).unwrap();
        assert_eq!(summary.files_written.len(), 2);
        assert!(json_path.is_file());
        assert!(md_path.is_file());
    }

    #[test]
    fn text_file_is_skipped_when_it_exists_without_force() {
        let tmp = tempdir().unwrap();
        let md_path = tmp.path().join("a.md");
        fs::write(&md_path, "original").unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.agents.insert(md_path.clone(), "new content".into());

        let summary = write(&conversion, tmp.path(), opts(MergeStrategy::Merge)).unwrap();
        assert_eq!(summary.files_skipped, vec![md_path.clone()]);
        assert_eq!(fs::read_to_string(&md_path).unwrap(), "original");
    }

    #[test]
    fn text_file_is_written_when_forced() {
        let tmp = tempdir().unwrap();
        let md_path = tmp.path().join("a.md");
        fs::write(&md_path, "original").unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.agents.insert(md_path.clone(), "new content".into());

        let mut o = opts(MergeStrategy::Merge);
        o.force = true;
        let summary = write(&conversion, tmp.path(), o).unwrap();
        assert_eq!(summary.files_written, vec![md_path.clone()]);
        assert_eq!(fs::read_to_string(&md_path).unwrap(), "new content");
    }

    #[test]
    fn json_overwrite_without_force_is_skipped_when_existing() {
        let tmp = tempdir().unwrap();
        let json_path = tmp.path().join("c.json");
        fs::write(&json_path, "{\"a\":1}").unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.global_config.insert(json_path.clone(), "{\"b\":2}".into());

        let summary = write(&conversion, tmp.path(), opts(MergeStrategy::Overwrite)).unwrap();
        assert_eq!(summary.files_skipped, vec![json_path.clone()]);
    }

    #[test]
    fn malformed_existing_json_is_treated_as_empty() {
        let tmp = tempdir().unwrap();
        let json_path = tmp.path().join("c.json");
        fs::write(&json_path, "{not json").unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.global_config.insert(json_path.clone(), "{\"b\":2}".into());

        write(&conversion, tmp.path(), opts(MergeStrategy::Merge)).unwrap();
        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(written, serde_json::json!({"b": 2}));
    }

    #[test]
    fn dry_run_records_paths_without_touching_disk() {
        let tmp = tempdir().unwrap();
        let json_path = tmp.path().join("c.json");
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.global_config.insert(json_path.clone(), "{\"b\":2}".into());

        let mut o = opts(MergeStrategy::Merge);
        o.dry_run = true;
        let summary = write(&conversion, tmp.path(), o).unwrap();
        assert_eq!(summary.files_written, vec![json_path.clone()]);
        assert!(!json_path.exists());
    }

    #[test]
    fn backup_is_created_before_writing_when_requested() {
        let tmp = tempdir().unwrap();
        let json_path = tmp.path().join("c.json");
        fs::write(&json_path, "{\"a\":1}").unwrap();
        let mut conversion = CanonicalConversionResult::new(Format::ClaudeCode, Format::OpenCode);
        conversion.global_config.insert(json_path.clone(), "{\"b\":2}".into());

        let backup_root = tmp.path().join("backups");
        let mut o = opts(MergeStrategy::Merge);
        o.backup = true;
        let summary = write(&conversion, &backup_root, o).unwrap();
        assert!(summary.backup_dir.is_some());
        assert!(backup_root.read_dir().unwrap().next().is_some());
    }
}
