// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical-mapping dispatch plus model-id resolution that ties a
//! scan to an emission (spec §6.4 `universalConvert`).

use std::collections::BTreeMap;

use acc_ir::{CanonicalConversionResult, CanonicalScanResult, ConversionReport, Format, GlobalConfig};

use crate::scan::AnyScanResult;

/// Options controlling a single [`universal_convert`] call.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Target format to emit.
    pub to: Format,
    /// Exact-match model-id overrides, consulted before the alias table
    /// (spec §4.6 step 1).
    pub model_overrides: BTreeMap<String, String>,
    /// Model id to use when the source scan carries none at all.
    pub default_model: Option<String>,
    /// Small-model id to use when the source scan carries none and the
    /// translated main model doesn't suggest one either.
    pub default_small_model: Option<String>,
}

impl ConvertOptions {
    /// Convert to `to` with no overrides or defaults.
    #[must_use]
    pub fn new(to: Format) -> Self {
        Self {
            to,
            model_overrides: BTreeMap::new(),
            default_model: None,
            default_small_model: None,
        }
    }
}

fn to_canonical(scan: &AnyScanResult, env: &acc_paths::Env) -> (CanonicalScanResult, ConversionReport) {
    match scan {
        AnyScanResult::ClaudeCode { scan, .. } => acc_mapping::to_canonical::claude_code::map(scan, env),
        AnyScanResult::OpenCode { scan } => acc_mapping::to_canonical::opencode::map(scan),
        AnyScanResult::Cursor { scan, .. } => acc_mapping::to_canonical::cursor::map(scan),
    }
}

/// Resolve `config.model`/`config.small_model` to their fully-qualified
/// canonical `provider/model` form in place (spec §4.6). Pre-resolving
/// here rather than inside each emitter keeps the translation a single
/// code path: every emitter's own `model_id::translate` call (e.g.
/// `acc-emit::opencode`) becomes a no-op pass-through once the id already
/// contains `/`, per the idempotence property in spec §8.
fn resolve_model(config: &mut GlobalConfig, opts: &ConvertOptions) {
    let provider = config.provider.clone();
    let Some(model) = config.model.clone().or_else(|| opts.default_model.clone()) else {
        return;
    };
    let translated = acc_mapping::model_id::translate(&model, provider.as_deref(), &opts.model_overrides);

    let small = config
        .small_model
        .clone()
        .or_else(|| opts.default_small_model.clone())
        .map(|sm| acc_mapping::model_id::translate(&sm, provider.as_deref(), &opts.model_overrides))
        .unwrap_or_else(|| acc_mapping::model_id::suggest_small_model(&translated));

    config.model = Some(translated);
    config.small_model = Some(small);
}

/// Project a scan onto a target format's file contents (spec §6.4
/// `universalConvert`). Infallible by construction: data defects in the
/// source configuration become `report` entries rather than errors, per
/// spec §7.
#[must_use]
pub fn universal_convert(scan: &AnyScanResult, opts: ConvertOptions, env: &acc_paths::Env) -> CanonicalConversionResult {
    let (mut canonical, mapper_report) = to_canonical(scan, env);
    resolve_model(&mut canonical.global, &opts);
    for project in &mut canonical.projects {
        resolve_model(&mut project.config, &opts);
    }

    let mut result = acc_emit::emit(&canonical, opts.to, env);
    let mut report = mapper_report;
    report.extend(std::mem::take(&mut result.report));
    result.report = report;
    result
}
