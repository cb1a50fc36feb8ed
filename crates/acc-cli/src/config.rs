// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading and validation of the optional `acc.toml` CLI configuration
//! file. Mirrors `abp-cli`'s `BackplaneConfig` pattern: a typed struct
//! deserialized with `toml`, validated by a free function that collects
//! problems instead of failing outright — a malformed `acc.toml` is a
//! warning, never a reason to refuse to run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use acc_writer::MergeStrategy;
use serde::Deserialize;

/// Parsed `acc.toml` contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Model id to assume when a source scan carries none at all.
    pub default_model: Option<String>,
    /// Small-model id to assume when a source scan carries none.
    pub default_small_model: Option<String>,
    /// Merge strategy applied when a target file already exists on write.
    pub merge_strategy: Option<MergeStrategy>,
    /// Exact-match model-id overrides, consulted before the alias table.
    #[serde(default)]
    pub model_overrides: BTreeMap<String, String>,
}

/// Read and parse `path`, returning `None` (with a caller-surfaced
/// warning) if the file is absent, unreadable, or not valid TOML for a
/// [`CliConfig`]. Never returns an `Err` — an `acc.toml` problem falls
/// back to built-in defaults rather than aborting the run.
pub fn load_config(path: &Path) -> (CliConfig, Vec<String>) {
    let mut warnings = Vec::new();
    if !path.exists() {
        return (CliConfig::default(), warnings);
    }
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warnings.push(format!("could not read {}: {err}", path.display()));
            return (CliConfig::default(), warnings);
        }
    };
    match toml::from_str::<CliConfig>(&content) {
        Ok(config) => {
            warnings.extend(validate_config(&config));
            (config, warnings)
        }
        Err(err) => {
            warnings.push(format!("malformed {}: {err}", path.display()));
            (CliConfig::default(), warnings)
        }
    }
}

/// Sanity-check a parsed config, returning human-readable warnings for
/// anything suspicious. Never fails the load — an empty `Vec` means
/// nothing to report.
#[must_use]
pub fn validate_config(config: &CliConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    for (from, to) in &config.model_overrides {
        if from.is_empty() || to.is_empty() {
            warnings.push(format!("model_overrides entry {from:?} -> {to:?} is empty and will be ignored"));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults_and_no_warnings() {
        let dir = tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("acc.toml"));
        assert!(config.default_model.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults_with_a_warning() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acc.toml");
        fs::write(&path, "default_model = [this is not valid").unwrap();
        let (config, warnings) = load_config(&path);
        assert!(config.default_model.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("malformed"));
    }

    #[test]
    fn parses_model_overrides_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("acc.toml");
        fs::write(
            &path,
            r#"
            default_model = "opus"
            merge_strategy = "overwrite"

            [model_overrides]
            "my-custom-model" = "anthropic/claude-opus-4-6"
            "#,
        )
        .unwrap();
        let (config, warnings) = load_config(&path);
        assert_eq!(config.default_model.as_deref(), Some("opus"));
        assert_eq!(config.merge_strategy, Some(MergeStrategy::Overwrite));
        assert_eq!(
            config.model_overrides.get("my-custom-model").map(String::as_str),
            Some("anthropic/claude-opus-4-6")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn empty_override_entry_produces_a_warning() {
        let config = CliConfig {
            model_overrides: BTreeMap::from([(String::new(), "x".to_string())]),
            ..CliConfig::default()
        };
        assert_eq!(validate_config(&config).len(), 1);
    }
}
