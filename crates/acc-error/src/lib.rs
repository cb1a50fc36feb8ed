//! Unified error taxonomy with stable error codes for the agent config
//! converter.
//!
//! The conversion pipeline never throws for defects in *user* configuration
//! (missing files, malformed JSON, an unknown tool name) — those are
//! recorded in a [`ConversionReport`](https://docs.rs/acc-ir) and the
//! pipeline proceeds. [`AccError`] is reserved for the smaller set of
//! systemic faults that the spec says must surface as a thrown error: I/O
//! failures other than "missing", SQLite corruption beyond the two
//! allow-listed recoverable codes, and a missing backup payload during
//! restore. Every [`AccError`] carries a stable [`ErrorCode`] (a
//! machine-readable tag), a human-readable message, an optional cause
//! chain, and arbitrary key-value context.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// ErrorCategory
// ---------------------------------------------------------------------------

/// Broad family that an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Filesystem I/O failures (beyond "file missing", which is not an error).
    Io,
    /// SQLite errors not covered by the allow-listed recoverable codes.
    Sqlite,
    /// Backup-manager failures (restore, delete, manifest).
    Backup,
    /// Misuse of the public library API (bad arguments, unsupported pair).
    Api,
    /// Serialization/deserialization of a systemic (not user-config) value.
    Serialization,
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Io => "io",
            Self::Sqlite => "sqlite",
            Self::Backup => "backup",
            Self::Api => "api",
            Self::Serialization => "serialization",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Machine-readable, stable error code.
///
/// Each variant serialises to a `SCREAMING_SNAKE_CASE` string that is
/// guaranteed not to change across patch releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // -- Io --
    /// Reading a file failed for a reason other than "does not exist".
    IoReadFailed,
    /// Writing a file failed.
    IoWriteFailed,
    /// Creating a directory failed.
    IoDirCreateFailed,
    /// A byte sequence could not be decoded as valid UTF-8.
    Utf8DecodeFailed,

    // -- Sqlite --
    /// The SQLite database file is corrupt or unreadable beyond recovery.
    SqliteCorrupt,
    /// A SQLite query failed for a reason other than "cannot open" / "no such table".
    SqliteQueryFailed,

    // -- Backup --
    /// A manifest entry's backup payload file is missing on disk.
    BackupPayloadMissing,
    /// The requested backup id does not exist.
    BackupIdUnknown,
    /// No backups exist in the backup root.
    NoBackupsAvailable,
    /// The backup manifest could not be parsed.
    BackupManifestInvalid,

    // -- Api --
    /// `universal_convert` was called with `source == target`.
    SameFormatConversion,
    /// An unrecognized format identifier was supplied.
    UnknownFormat,
    /// An argument was otherwise invalid for the requested operation.
    InvalidArgument,

    // -- Serialization --
    /// Serializing a systemic value (e.g. a backup manifest) failed.
    SerializationFailed,

    // -- Internal --
    /// Catch-all for unexpected internal errors.
    Internal,
}

impl ErrorCode {
    /// Returns the broad [`ErrorCategory`] this code belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoReadFailed
            | Self::IoWriteFailed
            | Self::IoDirCreateFailed
            | Self::Utf8DecodeFailed => ErrorCategory::Io,

            Self::SqliteCorrupt | Self::SqliteQueryFailed => ErrorCategory::Sqlite,

            Self::BackupPayloadMissing
            | Self::BackupIdUnknown
            | Self::NoBackupsAvailable
            | Self::BackupManifestInvalid => ErrorCategory::Backup,

            Self::SameFormatConversion | Self::UnknownFormat | Self::InvalidArgument => {
                ErrorCategory::Api
            }

            Self::SerializationFailed => ErrorCategory::Serialization,

            Self::Internal => ErrorCategory::Internal,
        }
    }

    /// Stable `&'static str` representation of the code (e.g.
    /// `"BACKUP_ID_UNKNOWN"`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IoReadFailed => "IO_READ_FAILED",
            Self::IoWriteFailed => "IO_WRITE_FAILED",
            Self::IoDirCreateFailed => "IO_DIR_CREATE_FAILED",
            Self::Utf8DecodeFailed => "UTF8_DECODE_FAILED",
            Self::SqliteCorrupt => "SQLITE_CORRUPT",
            Self::SqliteQueryFailed => "SQLITE_QUERY_FAILED",
            Self::BackupPayloadMissing => "BACKUP_PAYLOAD_MISSING",
            Self::BackupIdUnknown => "BACKUP_ID_UNKNOWN",
            Self::NoBackupsAvailable => "NO_BACKUPS_AVAILABLE",
            Self::BackupManifestInvalid => "BACKUP_MANIFEST_INVALID",
            Self::SameFormatConversion => "SAME_FORMAT_CONVERSION",
            Self::UnknownFormat => "UNKNOWN_FORMAT",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::SerializationFailed => "SERIALIZATION_FAILED",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AccError
// ---------------------------------------------------------------------------

/// Unified error for systemic faults in the agent config converter.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// source error for cause-chaining, and arbitrary structured context.
///
/// # Builder usage
///
/// ```
/// use acc_error::{AccError, ErrorCode};
///
/// let err = AccError::new(ErrorCode::BackupIdUnknown, "no backup named 'latest'")
///     .with_context("backup_root", "/home/u/.acc/backups");
/// ```
pub struct AccError {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional underlying cause.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Arbitrary structured context for diagnostics.
    pub context: BTreeMap<String, serde_json::Value>,
}

impl AccError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
            context: BTreeMap::new(),
        }
    }

    /// Attach a key-value pair to the diagnostic context.
    ///
    /// The value is converted via [`serde_json::to_value`]; if serialisation
    /// fails, the entry is silently skipped.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Attach an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for `self.code.category()`.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

impl fmt::Debug for AccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("AccError");
        d.field("code", &self.code);
        d.field("message", &self.message);
        if let Some(ref src) = self.source {
            d.field("source", &src.to_string());
        }
        if !self.context.is_empty() {
            d.field("context", &self.context);
        }
        d.finish()
    }
}

impl fmt::Display for AccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)?;
        if !self.context.is_empty() {
            // Deterministic output thanks to BTreeMap.
            if let Ok(ctx) = serde_json::to_string(&self.context) {
                write!(f, " {ctx}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for AccError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for AccError {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorCode::IoReadFailed,
            _ => ErrorCode::IoReadFailed,
        };
        AccError::new(code, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

/// Serialisable snapshot of an [`AccError`] (without the opaque source).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccErrorDto {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub context: BTreeMap<String, serde_json::Value>,
    /// String representation of the source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_message: Option<String>,
}

impl From<&AccError> for AccErrorDto {
    fn from(err: &AccError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            context: err.context.clone(),
            source_message: err.source.as_ref().map(|s| s.to_string()),
        }
    }
}

impl From<AccErrorDto> for AccError {
    fn from(dto: AccErrorDto) -> Self {
        Self {
            code: dto.code,
            message: dto.message,
            source: None,
            context: dto.context,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io;

    /// All error codes for exhaustive iteration in tests.
    const ALL_CODES: &[ErrorCode] = &[
        ErrorCode::IoReadFailed,
        ErrorCode::IoWriteFailed,
        ErrorCode::IoDirCreateFailed,
        ErrorCode::Utf8DecodeFailed,
        ErrorCode::SqliteCorrupt,
        ErrorCode::SqliteQueryFailed,
        ErrorCode::BackupPayloadMissing,
        ErrorCode::BackupIdUnknown,
        ErrorCode::NoBackupsAvailable,
        ErrorCode::BackupManifestInvalid,
        ErrorCode::SameFormatConversion,
        ErrorCode::UnknownFormat,
        ErrorCode::InvalidArgument,
        ErrorCode::SerializationFailed,
        ErrorCode::Internal,
    ];

    #[test]
    fn basic_construction() {
        let err = AccError::new(ErrorCode::Internal, "boom");
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, "boom");
        assert!(err.source.is_none());
        assert!(err.context.is_empty());
    }

    #[test]
    fn display_without_context() {
        let err = AccError::new(ErrorCode::BackupIdUnknown, "no such backup");
        assert_eq!(err.to_string(), "[BACKUP_ID_UNKNOWN] no such backup");
    }

    #[test]
    fn display_with_context() {
        let err = AccError::new(ErrorCode::SqliteQueryFailed, "query failed")
            .with_context("table", "ItemTable");
        let s = err.to_string();
        assert!(s.starts_with("[SQLITE_QUERY_FAILED] query failed"));
        assert!(s.contains("ItemTable"));
    }

    #[test]
    fn debug_with_source() {
        let src = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let err = AccError::new(ErrorCode::IoReadFailed, "read failed").with_source(src);
        let dbg = format!("{err:?}");
        assert!(dbg.contains("source"));
        assert!(dbg.contains("file missing"));
    }

    #[test]
    fn all_codes_categorised_consistently() {
        assert_eq!(ErrorCode::IoReadFailed.category(), ErrorCategory::Io);
        assert_eq!(ErrorCode::SqliteCorrupt.category(), ErrorCategory::Sqlite);
        assert_eq!(ErrorCode::BackupIdUnknown.category(), ErrorCategory::Backup);
        assert_eq!(ErrorCode::UnknownFormat.category(), ErrorCategory::Api);
        assert_eq!(
            ErrorCode::SerializationFailed.category(),
            ErrorCategory::Serialization
        );
        assert_eq!(ErrorCode::Internal.category(), ErrorCategory::Internal);
    }

    #[test]
    fn all_codes_have_unique_as_str() {
        let mut seen = HashSet::new();
        for code in ALL_CODES {
            let s = code.as_str();
            assert!(seen.insert(s), "duplicate as_str value: {s}");
        }
        assert_eq!(seen.len(), ALL_CODES.len());
    }

    #[test]
    fn all_codes_display_matches_as_str() {
        for code in ALL_CODES {
            assert_eq!(code.to_string(), code.as_str());
        }
    }

    #[test]
    fn error_code_serde_roundtrip() {
        let code = ErrorCode::BackupPayloadMissing;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, r#""BACKUP_PAYLOAD_MISSING""#);
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }

    #[test]
    fn dto_roundtrip_without_source() {
        let err =
            AccError::new(ErrorCode::InvalidArgument, "bad arg").with_context("arg", "format");
        let dto: AccErrorDto = (&err).into();
        let json = serde_json::to_string(&dto).unwrap();
        let back: AccErrorDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto, back);
        assert!(back.source_message.is_none());
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: AccError = io_err.into();
        assert_eq!(err.code, ErrorCode::IoReadFailed);
        assert!(err.message.contains("denied"));
    }

    #[test]
    fn std_error_source_chain() {
        let inner = io::Error::new(io::ErrorKind::NotFound, "not found");
        let err = AccError::new(ErrorCode::IoReadFailed, "read").with_source(inner);
        let src = std::error::Error::source(&err).unwrap();
        assert_eq!(src.to_string(), "not found");
    }

    #[test]
    fn error_code_count() {
        assert_eq!(ALL_CODES.len(), 15);
    }
}
