// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timestamped snapshot backup manager (spec §4.10, §6.3).

use std::fs;
use std::path::{Path, PathBuf};

use acc_error::{AccError, ErrorCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One file recorded in a backup's manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupManifestEntry {
    /// Absolute path the file was backed up from (and will be restored to).
    pub original_path: PathBuf,
    /// 4-digit-padded filename under `<backup>/files/`, e.g. `"0001.dat"`.
    pub backup_filename: String,
    /// Whether `original_path` existed at backup time.
    pub existed_before: bool,
}

/// A backup's full manifest (spec §6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Backup creation time.
    pub created_at: DateTime<Utc>,
    /// Crate version that produced the backup.
    pub version: String,
    /// Caller-supplied description.
    pub description: String,
    /// One entry per backed-up target path.
    pub files: Vec<BackupManifestEntry>,
}

/// Summary metadata for a backup, as returned by [`list_backups`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// The backup's directory name (an ISO-timestamp-to-seconds id).
    pub id: String,
    /// Backup creation time.
    pub created_at: DateTime<Utc>,
    /// Caller-supplied description.
    pub description: String,
    /// Number of files recorded in the manifest.
    pub file_count: usize,
}

/// The outcome of a [`restore`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoreResult {
    /// Paths whose original content was restored.
    pub restored: Vec<PathBuf>,
    /// Paths that didn't exist before the backup and were deleted.
    pub removed: Vec<PathBuf>,
    /// Per-path errors encountered while restoring.
    pub errors: Vec<String>,
}

fn manifest_path(backup_dir: &Path) -> PathBuf {
    backup_dir.join("manifest.json")
}

fn files_dir(backup_dir: &Path) -> PathBuf {
    backup_dir.join("files")
}

fn read_manifest(backup_dir: &Path) -> Result<BackupManifest, AccError> {
    let raw = fs::read_to_string(manifest_path(backup_dir)).map_err(|e| {
        AccError::new(ErrorCode::BackupManifestInvalid, "failed to read backup manifest")
            .with_context("path", backup_dir.to_string_lossy())
            .with_source(e)
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AccError::new(ErrorCode::BackupManifestInvalid, "failed to parse backup manifest")
            .with_context("path", backup_dir.to_string_lossy())
            .with_source(e)
    })
}

/// Snapshot every path in `target_paths` that currently exists into a new
/// timestamped directory under `backup_root`. Returns `None` without
/// touching disk when `target_paths` is empty (spec §4.10).
pub fn create_backup(
    backup_root: &Path,
    target_paths: &[PathBuf],
    description: &str,
) -> Result<Option<PathBuf>, AccError> {
    if target_paths.is_empty() {
        return Ok(None);
    }

    let created_at = Utc::now();
    let dir_name = created_at.format("%Y%m%dT%H%M%SZ").to_string();
    let backup_dir = backup_root.join(&dir_name);
    let files_dir = files_dir(&backup_dir);
    fs::create_dir_all(&files_dir).map_err(|e| {
        AccError::new(ErrorCode::IoDirCreateFailed, "failed to create backup directory")
            .with_context("path", files_dir.to_string_lossy())
            .with_source(e)
    })?;

    let mut entries = Vec::with_capacity(target_paths.len());
    for (index, path) in target_paths.iter().enumerate() {
        let backup_filename = format!("{:04}.dat", index + 1);
        let existed_before = path.exists();
        if existed_before {
            fs::copy(path, files_dir.join(&backup_filename)).map_err(|e| {
                AccError::new(ErrorCode::IoReadFailed, "failed to copy file into backup")
                    .with_context("path", path.to_string_lossy())
                    .with_source(e)
            })?;
        }
        entries.push(BackupManifestEntry {
            original_path: path.clone(),
            backup_filename,
            existed_before,
        });
    }

    let manifest = BackupManifest {
        created_at,
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: description.to_string(),
        files: entries,
    };
    let serialized = serde_json::to_string_pretty(&manifest).map_err(|e| {
        AccError::new(ErrorCode::SerializationFailed, "failed to serialize backup manifest").with_source(e)
    })?;
    fs::write(manifest_path(&backup_dir), serialized).map_err(|e| {
        AccError::new(ErrorCode::IoWriteFailed, "failed to write backup manifest")
            .with_context("path", backup_dir.to_string_lossy())
            .with_source(e)
    })?;

    Ok(Some(backup_dir))
}

/// List every backup under `backup_root`, newest first (spec §4.10).
pub fn list_backups(backup_root: &Path) -> Result<Vec<BackupInfo>, AccError> {
    let Ok(entries) = fs::read_dir(backup_root) else {
        return Ok(Vec::new());
    };
    let mut backups = Vec::new();
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let Ok(manifest) = read_manifest(&dir) else {
            continue;
        };
        backups.push(BackupInfo {
            id: dir.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default(),
            created_at: manifest.created_at,
            description: manifest.description,
            file_count: manifest.files.len(),
        });
    }
    backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(backups)
}

fn resolve_backup_dir(backup_root: &Path, id: Option<&str>) -> Result<PathBuf, AccError> {
    match id {
        Some(id) => {
            let dir = backup_root.join(id);
            if !manifest_path(&dir).is_file() {
                return Err(AccError::new(ErrorCode::BackupIdUnknown, "no backup with this id").with_context("id", id));
            }
            Ok(dir)
        }
        None => {
            let backups = list_backups(backup_root)?;
            let latest = backups
                .first()
                .ok_or_else(|| AccError::new(ErrorCode::NoBackupsAvailable, "no backups exist in this backup root"))?;
            Ok(backup_root.join(&latest.id))
        }
    }
}

/// Restore the backup identified by `id` (or the most recent one, if
/// `None`). For each manifest entry, restores the original content if it
/// existed before the backup, else deletes the current file (spec §4.10).
pub fn restore(backup_root: &Path, id: Option<&str>) -> Result<RestoreResult, AccError> {
    let backup_dir = resolve_backup_dir(backup_root, id)?;
    let manifest = read_manifest(&backup_dir)?;
    let files_dir = files_dir(&backup_dir);

    let mut result = RestoreResult::default();
    for entry in &manifest.files {
        if entry.existed_before {
            let payload = files_dir.join(&entry.backup_filename);
            if !payload.is_file() {
                result.errors.push(format!(
                    "{}: backup payload missing at {}",
                    entry.original_path.display(),
                    payload.display()
                ));
                continue;
            }
            if let Some(parent) = entry.original_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            match fs::copy(&payload, &entry.original_path) {
                Ok(_) => result.restored.push(entry.original_path.clone()),
                Err(e) => result.errors.push(format!("{}: {e}", entry.original_path.display())),
            }
        } else if entry.original_path.exists() {
            match fs::remove_file(&entry.original_path) {
                Ok(()) => result.removed.push(entry.original_path.clone()),
                Err(e) => result.errors.push(format!("{}: {e}", entry.original_path.display())),
            }
        }
    }
    Ok(result)
}

/// Recursively delete the backup identified by `id`.
pub fn delete_backup(backup_root: &Path, id: &str) -> Result<(), AccError> {
    let dir = backup_root.join(id);
    if !manifest_path(&dir).is_file() {
        return Err(AccError::new(ErrorCode::BackupIdUnknown, "no backup with this id").with_context("id", id));
    }
    fs::remove_dir_all(&dir).map_err(|e| {
        AccError::new(ErrorCode::IoWriteFailed, "failed to delete backup directory")
            .with_context("id", id)
            .with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_target_paths_yields_no_backup() {
        let root = tempdir().unwrap();
        assert!(create_backup(root.path(), &[], "x").unwrap().is_none());
    }

    #[test]
    fn creates_backup_with_manifest_and_payload() {
        let root = tempdir().unwrap();
        let target = root.path().join("settings.json");
        fs::write(&target, "{\"a\":1}").unwrap();

        let backup_dir = create_backup(root.path(), &[target.clone()], "pre-conversion").unwrap().unwrap();
        let manifest = read_manifest(&backup_dir).unwrap();
        assert_eq!(manifest.files.len(), 1);
        assert!(manifest.files[0].existed_before);
        assert_eq!(manifest.files[0].backup_filename, "0001.dat");
        assert!(files_dir(&backup_dir).join("0001.dat").is_file());
    }

    #[test]
    fn nonexistent_target_is_recorded_without_payload() {
        let root = tempdir().unwrap();
        let missing = root.path().join("missing.json");
        let backup_dir = create_backup(root.path(), &[missing], "x").unwrap().unwrap();
        let manifest = read_manifest(&backup_dir).unwrap();
        assert!(!manifest.files[0].existed_before);
        assert!(!files_dir(&backup_dir).join("0001.dat").exists());
    }

    #[test]
    fn list_backups_sorted_newest_first() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path().join("2026-01-01T00-00-00Z")).unwrap();
        fs::write(
            manifest_path(&root.path().join("2026-01-01T00-00-00Z")),
            serde_json::to_string(&BackupManifest {
                created_at: "2026-01-01T00:00:00Z".parse().unwrap(),
                version: "0.1.0".into(),
                description: "older".into(),
                files: vec![],
            })
            .unwrap(),
        )
        .unwrap();
        fs::create_dir_all(root.path().join("2026-02-01T00-00-00Z")).unwrap();
        fs::write(
            manifest_path(&root.path().join("2026-02-01T00-00-00Z")),
            serde_json::to_string(&BackupManifest {
                created_at: "2026-02-01T00:00:00Z".parse().unwrap(),
                version: "0.1.0".into(),
                description: "newer".into(),
                files: vec![],
            })
            .unwrap(),
        )
        .unwrap();

        let backups = list_backups(root.path()).unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].description, "newer");
        assert_eq!(backups[1].description, "older");
    }

    #[test]
    fn restore_latest_restores_existing_and_removes_new() {
        let root = tempdir().unwrap();
        let existing = root.path().join("existing.json");
        let newly_created = root.path().join("new.json");
        fs::write(&existing, "{\"old\":true}").unwrap();

        create_backup(root.path(), &[existing.clone(), newly_created.clone()], "x").unwrap();
        fs::write(&existing, "{\"new\":true}").unwrap();
        fs::write(&newly_created, "{\"fresh\":true}").unwrap();

        let result = restore(root.path(), None).unwrap();
        assert_eq!(result.restored, vec![existing.clone()]);
        assert_eq!(result.removed, vec![newly_created.clone()]);
        assert!(result.errors.is_empty());
        assert_eq!(fs::read_to_string(&existing).unwrap(), "{\"old\":true}");
        assert!(!newly_created.exists());
    }

    #[test]
    fn restore_with_no_backups_errors() {
        let root = tempdir().unwrap();
        let err = restore(root.path(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::NoBackupsAvailable);
    }

    #[test]
    fn restore_unknown_id_errors() {
        let root = tempdir().unwrap();
        fs::create_dir_all(root.path()).unwrap();
        let err = restore(root.path(), Some("nonexistent")).unwrap_err();
        assert_eq!(err.code, ErrorCode::BackupIdUnknown);
    }

    #[test]
    fn delete_backup_removes_directory() {
        let root = tempdir().unwrap();
        let a = root.path().join("a.json");
        fs::write(&a, "{}").unwrap();
        let dir = create_backup(root.path(), &[a], "x").unwrap().unwrap();
        let id = dir.file_name().unwrap().to_string_lossy().to_string();
        delete_backup(root.path(), &id).unwrap();
        assert!(!dir.exists());
    }
}
