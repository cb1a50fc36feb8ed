//! Universal orchestrator for the agent config converter (spec §2 step
//! 10, §6.4): composes the scanners, to-canonical mappers, from-canonical
//! emitters, validator, and writer into the library contract a CLI or
//! desktop shell embeds.
//!
//! This crate owns no filesystem state of its own beyond what it passes
//! through to [`acc_writer`]; it is a pure composition layer plus the
//! model-id pre-resolution step described in [`convert::resolve_model`].
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod convert;
mod orchestrator;
mod scan;

pub use convert::{universal_convert, ConvertOptions};
pub use orchestrator::{format_name, supported_conversions, DryRunSummary, Orchestrator};
pub use scan::{scan_format, AnyScanResult, ScanOptions};

// Re-exported so downstream crates (acc-cli) can build a full pipeline
// call against `acc-core` alone, without depending on every leaf crate
// directly.
pub use acc_error::{AccError, ErrorCode};
pub use acc_ir::Format;
pub use acc_writer::{BackupInfo, HistoryTarget, HistoryWriteSummary, MergeStrategy, RestoreResult, WriteOptions, WriteSummary};
