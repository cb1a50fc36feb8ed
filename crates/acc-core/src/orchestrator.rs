// SPDX-License-Identifier: MIT OR Apache-2.0
//! The universal orchestrator (spec §2 step 10, §6.4): a thin facade
//! composing scan -> to-canonical -> emit -> validate -> write, plus the
//! backup-manager operations and a handful of convenience wrappers a
//! caller (the CLI, a desktop shell) would otherwise have to re-derive at
//! every call site.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use acc_error::{AccError, ErrorCode};
use acc_ir::{CanonicalConversionResult, ConvertedSession, Format};
use acc_paths::Env;
use acc_validate::ValidationResult;
use acc_writer::{BackupInfo, HistoryTarget, HistoryWriteSummary, RestoreResult, WriteOptions, WriteSummary};

use crate::convert::{universal_convert, ConvertOptions};
use crate::scan::{scan_format, AnyScanResult, ScanOptions};

/// Human-facing display name for a format (spec §6.4 `formatName`).
#[must_use]
pub fn format_name(format: Format) -> &'static str {
    format.display_name()
}

/// All six `(from, to)` pairs with `from != to` (spec §6.4
/// `getSupportedConversions`).
#[must_use]
pub fn supported_conversions() -> [(Format, Format); 6] {
    let pairs = Format::supported_conversions();
    [pairs[0], pairs[1], pairs[2], pairs[3], pairs[4], pairs[5]]
}

fn reject_same_format(from: Format, to: Format) -> Result<(), AccError> {
    if from == to {
        return Err(AccError::new(
            ErrorCode::SameFormatConversion,
            format!("cannot convert {} to itself", from.display_name()),
        ));
    }
    Ok(())
}

/// The path lists a [`Orchestrator::dry_run_report`] call returns, without
/// threading `WriteOptions` through call sites by hand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DryRunSummary {
    /// Paths that would be written.
    pub files_would_write: Vec<PathBuf>,
    /// Paths that would be left untouched.
    pub files_would_skip: Vec<PathBuf>,
}

/// Bundles the environment and backup root every call in a session shares,
/// so a caller doesn't have to thread them through every function (spec
/// §4.12 `acc-core::Orchestrator`).
#[derive(Debug, Clone)]
pub struct Orchestrator {
    env: Env,
    backup_root: PathBuf,
}

impl Orchestrator {
    /// Build an orchestrator rooted at `env`, storing backups under
    /// `backup_root`.
    #[must_use]
    pub fn new(env: Env, backup_root: PathBuf) -> Self {
        Self { env, backup_root }
    }

    /// The environment this orchestrator resolves paths against.
    #[must_use]
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Scan one format (spec §6.4 `scanFormat`).
    pub fn scan(&self, mut opts: ScanOptions) -> Result<AnyScanResult, AccError> {
        opts.env = self.env.clone();
        scan_format(opts)
    }

    /// Scan every format rooted at `project_root`, tolerating per-format
    /// scan failures as an omitted entry rather than failing the whole
    /// sweep (spec §4.12 `scan_all`).
    #[must_use]
    pub fn scan_all(&self, project_root: Option<&Path>) -> BTreeMap<Format, AnyScanResult> {
        let mut out = BTreeMap::new();
        for format in Format::ALL {
            let opts = ScanOptions::new(format, self.env.clone(), project_root.map(Path::to_path_buf));
            if let Ok(result) = scan_format(opts) {
                out.insert(format, result);
            }
        }
        out
    }

    /// Project a scan onto a target format (spec §6.4 `universalConvert`).
    /// Rejects `scan.format() == opts.to` the way the CLI front-end does
    /// (spec §8 property 4: same-format conversion is API misuse, not a
    /// data defect, so it surfaces as an [`AccError`] here rather than a
    /// report entry).
    pub fn convert(&self, scan: &AnyScanResult, opts: ConvertOptions) -> Result<CanonicalConversionResult, AccError> {
        reject_same_format(scan.format(), opts.to)?;
        Ok(universal_convert(scan, opts, &self.env))
    }

    /// Structurally validate an emission against its target schema (spec
    /// §4.11).
    #[must_use]
    pub fn validate(&self, conversion: &CanonicalConversionResult) -> ValidationResult {
        acc_validate::validate(conversion)
    }

    /// Apply a conversion to disk (spec §6.4 `universalWrite`).
    pub fn write(&self, conversion: &CanonicalConversionResult, opts: WriteOptions) -> Result<WriteSummary, AccError> {
        acc_writer::write(conversion, &self.backup_root, opts)
    }

    /// Persist converted chat-history sessions, deduplicating against
    /// whatever is already present at `target` (spec §4.9 history writer).
    pub fn write_history(
        &self,
        sessions: &[ConvertedSession],
        target: &HistoryTarget,
    ) -> Result<HistoryWriteSummary, AccError> {
        acc_writer::write_history(sessions, target, |_phase| {})
    }

    /// Run [`Orchestrator::write`] with `dry_run: true, backup: false` and
    /// return just the path lists, for callers (CLI `--dry-run`) that want
    /// a preview without constructing `WriteOptions` by hand (spec §4.12
    /// `dry_run_report`).
    pub fn dry_run_report(&self, conversion: &CanonicalConversionResult) -> Result<DryRunSummary, AccError> {
        let opts = WriteOptions { dry_run: true, backup: false, force: false, ..WriteOptions::default() };
        let summary = self.write(conversion, opts)?;
        Ok(DryRunSummary {
            files_would_write: summary.files_written,
            files_would_skip: summary.files_skipped,
        })
    }

    /// List backups under the backup root, newest first (spec §4.10
    /// `listBackups`).
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>, AccError> {
        acc_writer::list_backups(&self.backup_root)
    }

    /// Restore a backup by id, or the most recent one if `id` is `None`
    /// (spec §4.10 `restore`).
    pub fn restore(&self, id: Option<&str>) -> Result<RestoreResult, AccError> {
        acc_writer::restore(&self.backup_root, id)
    }

    /// Delete a backup by id (spec §4.10 `deleteBackup`).
    pub fn delete_backup(&self, id: &str) -> Result<(), AccError> {
        acc_writer::delete_backup(&self.backup_root, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn supported_conversions_has_six_pairs() {
        let pairs = supported_conversions();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(from, to)| from != to));
    }

    #[test]
    fn format_name_matches_display_name() {
        assert_eq!(format_name(Format::ClaudeCode), "Claude Code");
    }

    #[test]
    fn convert_rejects_same_format_conversion() {
        let home = tempdir().unwrap();
        let orchestrator = Orchestrator::new(Env::from_home(home.path()), home.path().join("backups"));
        let scan = AnyScanResult::ClaudeCode {
            scan: claude_code_scan::ScanResult::default(),
            history: Vec::new(),
        };
        let err = orchestrator.convert(&scan, ConvertOptions::new(Format::ClaudeCode)).unwrap_err();
        assert_eq!(err.code, ErrorCode::SameFormatConversion);
    }

    #[test]
    fn scan_all_never_panics_on_an_empty_home() {
        let home = tempdir().unwrap();
        let orchestrator = Orchestrator::new(Env::from_home(home.path()), home.path().join("backups"));
        let results = orchestrator.scan_all(None);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn dry_run_report_touches_nothing_on_disk() {
        let home = tempdir().unwrap();
        let orchestrator = Orchestrator::new(Env::from_home(home.path()), home.path().join("backups"));
        let scan = AnyScanResult::ClaudeCode {
            scan: claude_code_scan::ScanResult::default(),
            history: Vec::new(),
        };
        let conversion = orchestrator.convert(&scan, ConvertOptions::new(Format::OpenCode)).unwrap();
        let report = orchestrator.dry_run_report(&conversion).unwrap();
        assert!(!home.path().join("backups").exists());
        let _ = report;
    }
}
