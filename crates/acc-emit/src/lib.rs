//! Canonical IR to target-format emitters (spec §4.3): one module per
//! target format, each walking a [`acc_ir::CanonicalScanResult`] into a
//! [`acc_ir::CanonicalConversionResult`] of absolute target paths ->
//! file contents.
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod claude_code;
pub mod cursor;
pub mod opencode;
mod shared;

use acc_ir::{CanonicalConversionResult, CanonicalScanResult, Format};

/// Dispatch to the emitter for `target`, the single entry point the
/// orchestrator calls for `universalConvert` (spec §6.4).
#[must_use]
pub fn emit(scan: &CanonicalScanResult, target: Format, env: &acc_paths::Env) -> CanonicalConversionResult {
    match target {
        Format::ClaudeCode => claude_code::emit(scan, env),
        Format::OpenCode => opencode::emit(scan, env),
        Format::Cursor => cursor::emit(scan, env),
    }
}
