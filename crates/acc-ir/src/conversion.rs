// SPDX-License-Identifier: MIT OR Apache-2.0
use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{GlobalConfig, ProjectConfig};
use crate::format::Format;

/// The format-agnostic projection of a scan (spec §3.2): one global
/// config plus zero or more project configs, tagged with the format they
/// were scanned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalScanResult {
    /// The format this scan result was normalized from.
    pub source_format: Format,
    /// User-level configuration.
    pub global: GlobalConfig,
    /// Per-project configurations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<ProjectConfig>,
}

impl CanonicalScanResult {
    /// An empty, well-formed scan result for `source_format` (spec §8,
    /// testable property 1: empty scans round-trip to empty results).
    #[must_use]
    pub fn empty(source_format: Format) -> Self {
        Self {
            source_format,
            global: GlobalConfig::default(),
            projects: Vec::new(),
        }
    }
}

/// A category a [`ReportItem`] belongs to (spec §3.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    /// Top-level global/project settings.
    Config,
    /// MCP server entries.
    Mcp,
    /// Agent definitions.
    Agents,
    /// Slash command definitions.
    Commands,
    /// Skill bundles.
    Skills,
    /// Tool permission entries.
    Permissions,
    /// Rule/instructions files.
    Rules,
    /// Hook definitions.
    Hooks,
    /// Chat-history sessions.
    History,
}

/// One entry in a [`ConversionReport`]'s `converted`/`skipped` lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportItem {
    /// Which kind of artifact this entry describes.
    pub category: ReportCategory,
    /// A human-readable description of the source artifact.
    pub source: String,
    /// A human-readable description of the target artifact (or empty if
    /// skipped before a target was chosen).
    pub target: String,
    /// Optional free-form elaboration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ReportItem {
    /// Construct a report item with no `details`.
    #[must_use]
    pub fn new(category: ReportCategory, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            category,
            source: source.into(),
            target: target.into(),
            details: None,
        }
    }

    /// Attach a `details` string.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// The five parallel lists tracking what a conversion did (spec §3.9).
///
/// Reports compose by concatenation: see [`ConversionReport::extend`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConversionReport {
    /// Artifacts successfully converted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub converted: Vec<ReportItem>,
    /// Artifacts intentionally not converted (no canonical counterpart,
    /// empty input, etc).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ReportItem>,
    /// Non-fatal problems worth surfacing (unknown tool name, embedded
    /// credential, ...).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Things the user must do by hand because the target format has no
    /// automatic equivalent (e.g. "migrate this hook manually").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manual_actions: Vec<String>,
    /// Data-defect errors recorded rather than thrown (spec §7): the
    /// pipeline never panics on malformed user configuration.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ConversionReport {
    /// An empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate `other` onto `self` in place; the composition rule
    /// from spec §3.9.
    pub fn extend(&mut self, other: ConversionReport) {
        self.converted.extend(other.converted);
        self.skipped.extend(other.skipped);
        self.warnings.extend(other.warnings);
        self.manual_actions.extend(other.manual_actions);
        self.errors.extend(other.errors);
    }

    /// `true` if nothing was recorded in any of the five lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converted.is_empty()
            && self.skipped.is_empty()
            && self.warnings.is_empty()
            && self.manual_actions.is_empty()
            && self.errors.is_empty()
    }
}

/// The output of a from-canonical emitter (spec §3.8): a full set of
/// target-format file contents, keyed by absolute path, plus the report
/// describing how they got there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalConversionResult {
    /// The format the input scan was normalized from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_format: Option<Format>,
    /// The format being emitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_format: Option<Format>,
    /// Global config file contents, keyed by absolute path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub global_config: BTreeMap<PathBuf, String>,
    /// Per-project config file contents, keyed by project path then by
    /// absolute file path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub project_configs: BTreeMap<PathBuf, BTreeMap<PathBuf, String>>,
    /// Agent files, keyed by absolute path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agents: BTreeMap<PathBuf, String>,
    /// Command files, keyed by absolute path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<PathBuf, String>,
    /// Rule files, keyed by absolute path.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<PathBuf, String>,
    /// Anything else an emitter produces with no other dedicated slot
    /// (e.g. the OpenCode hooks plugin stub).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_files: BTreeMap<PathBuf, String>,
    /// What happened during emission.
    pub report: ConversionReport,
}

impl CanonicalConversionResult {
    /// An empty conversion result tagged with the given formats, used as
    /// the starting accumulator for an emitter.
    #[must_use]
    pub fn new(source_format: Format, target_format: Format) -> Self {
        Self {
            source_format: Some(source_format),
            target_format: Some(target_format),
            ..Default::default()
        }
    }

    /// All absolute target paths this result would write, across every
    /// bucket. Used by the writer to compute the backup target set.
    #[must_use]
    pub fn all_target_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.global_config.keys().cloned().collect();
        for per_project in self.project_configs.values() {
            paths.extend(per_project.keys().cloned());
        }
        paths.extend(self.agents.keys().cloned());
        paths.extend(self.commands.keys().cloned());
        paths.extend(self.rules.keys().cloned());
        paths.extend(self.extra_files.keys().cloned());
        paths
    }
}
