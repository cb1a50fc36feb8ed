//! Structural validator for an emitted [`CanonicalConversionResult`] (spec
//! §4.11). Unlike the mappers and emitters, the validator re-parses the
//! rendered file contents: it is the last line of defense catching a
//! malformed emission before the writer touches disk.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod markdown;

use acc_ir::CanonicalConversionResult;
use serde::{Deserialize, Serialize};

/// The outcome of validating a conversion result: `errors` are schema
/// violations (the result should not be written), `warnings` are
/// suspicious-but-legal values worth surfacing to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    /// Structural violations of the target schema.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Non-fatal but noteworthy findings (embedded credentials, secret-like
    /// values not using an `{env:...}` reference, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Walk every file a [`CanonicalConversionResult`] would write and report
/// `{valid, errors[], warnings[]}` (spec §4.11). Never panics: a file this
/// function can't parse at all is recorded as an error, not propagated.
#[must_use]
pub fn validate(result: &CanonicalConversionResult) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let target = result.target_format;

    for (path, content) in &result.global_config {
        config::validate_config_json(path, content, target, &mut errors, &mut warnings);
    }
    for files in result.project_configs.values() {
        for (path, content) in files {
            config::validate_config_json(path, content, target, &mut errors, &mut warnings);
        }
    }
    for (path, content) in &result.agents {
        markdown::validate_agent_file(path, content, &mut errors, &mut warnings);
    }
    for (path, content) in &result.commands {
        markdown::validate_command_file(path, content, target, &mut errors);
    }

    ValidationResult::from_parts(errors, warnings)
}
