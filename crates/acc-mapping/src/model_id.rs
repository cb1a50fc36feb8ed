// SPDX-License-Identifier: MIT OR Apache-2.0
//! The model-id translator (spec §4.6): maps a source format's
//! free-form model identifier to the canonical `provider/model` form.

use std::collections::BTreeMap;

/// The fixed alias table for step 3 of [`translate`]. Short aliases and
/// a handful of dated variants that Claude Code accepts directly.
fn alias_table() -> &'static [(&'static str, &'static str)] {
    &[
        ("opus", "anthropic/claude-opus-4-6"),
        ("sonnet", "anthropic/claude-sonnet-4-5"),
        ("haiku", "anthropic/claude-3-5-haiku-20241022"),
        ("claude-opus-4-6", "anthropic/claude-opus-4-6"),
        ("claude-sonnet-4-5", "anthropic/claude-sonnet-4-5"),
        ("claude-3-5-haiku-20241022", "anthropic/claude-3-5-haiku-20241022"),
    ]
}

fn has_bedrock_prefix(id: &str) -> bool {
    for prefix in ["us.anthropic.", "eu.anthropic.", "ap.anthropic.", "global.anthropic.", "anthropic."] {
        if id.starts_with(prefix) {
            return true;
        }
    }
    false
}

/// Translate a source model id into the canonical `provider/model` form
/// (spec §4.6 algorithm, steps 1-6).
///
/// `overrides` is consulted first (step 1); an id that already contains
/// `/` passes through unchanged (step 2, also making the function
/// idempotent per spec §8 property 3); then the alias table (step 3);
/// then Bedrock-style ARN-ish prefixes (step 4); then a bare `claude-`
/// prefix (step 5); falling back to `<provider>/<id>` (step 6).
#[must_use]
pub fn translate(id: &str, provider: Option<&str>, overrides: &BTreeMap<String, String>) -> String {
    if let Some(mapped) = overrides.get(id) {
        return mapped.clone();
    }
    if id.contains('/') {
        return id.to_string();
    }
    if let Some((_, mapped)) = alias_table().iter().find(|(alias, _)| *alias == id) {
        return (*mapped).to_string();
    }
    if has_bedrock_prefix(id) {
        return format!("amazon-bedrock/{id}");
    }
    if let Some(stripped) = id.strip_prefix("claude-") {
        return format!("anthropic/claude-{stripped}");
    }
    format!("{}/{id}", provider.unwrap_or("anthropic"))
}

/// Detect the provider hint from environment flags and the model id
/// itself (spec §4.6).
#[must_use]
pub fn detect_provider(
    use_bedrock: Option<&str>,
    use_vertex: Option<&str>,
    model_id: &str,
) -> &'static str {
    if use_bedrock == Some("1") {
        return "amazon-bedrock";
    }
    if use_vertex == Some("1") {
        return "google-vertex";
    }
    if has_bedrock_prefix(model_id) {
        return "amazon-bedrock";
    }
    "anthropic"
}

/// Suggest a "small model" companion for a translated main model id,
/// based on its provider prefix (spec §4.6).
#[must_use]
pub fn suggest_small_model(main_model: &str) -> String {
    if let Some(rest) = main_model.strip_prefix("amazon-bedrock/") {
        let _ = rest;
        return "amazon-bedrock/anthropic.claude-3-5-haiku-20241022-v1:0".to_string();
    }
    if main_model.starts_with("google-vertex/") {
        return "google-vertex/claude-3-5-haiku@20241022".to_string();
    }
    "anthropic/claude-3-5-haiku-20241022".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_everything() {
        let mut overrides = BTreeMap::new();
        overrides.insert("my-model".to_string(), "anthropic/claude-opus-4-6".to_string());
        assert_eq!(
            translate("my-model", None, &overrides),
            "anthropic/claude-opus-4-6"
        );
    }

    #[test]
    fn already_qualified_id_passes_through() {
        let overrides = BTreeMap::new();
        assert_eq!(
            translate("openai/gpt-5", Some("anthropic"), &overrides),
            "openai/gpt-5"
        );
    }

    #[test]
    fn alias_table_resolves_short_names() {
        let overrides = BTreeMap::new();
        assert_eq!(translate("opus", None, &overrides), "anthropic/claude-opus-4-6");
        assert_eq!(translate("sonnet", None, &overrides), "anthropic/claude-sonnet-4-5");
        assert_eq!(translate("haiku", None, &overrides), "anthropic/claude-3-5-haiku-20241022");
    }

    #[test]
    fn scenario_3_alias_wins_over_bedrock_hint() {
        let overrides = BTreeMap::new();
        let provider = detect_provider(Some("1"), None, "claude-opus-4-6");
        assert_eq!(provider, "amazon-bedrock");
        // Direct claude- prefix rule (step 5) wins regardless of the hint.
        assert_eq!(
            translate("claude-opus-4-6", Some(provider), &overrides),
            "anthropic/claude-opus-4-6"
        );
    }

    #[test]
    fn bedrock_style_id_maps_to_amazon_bedrock() {
        let overrides = BTreeMap::new();
        assert_eq!(
            translate("us.anthropic.claude-opus-4-6-v1:0", None, &overrides),
            "amazon-bedrock/us.anthropic.claude-opus-4-6-v1:0"
        );
    }

    #[test]
    fn fallback_uses_provider_or_anthropic_default() {
        let overrides = BTreeMap::new();
        assert_eq!(translate("custom-model", None, &overrides), "anthropic/custom-model");
        assert_eq!(
            translate("custom-model", Some("openai"), &overrides),
            "openai/custom-model"
        );
    }

    #[test]
    fn translate_is_idempotent_on_its_own_output() {
        let overrides = BTreeMap::new();
        let once = translate("opus", None, &overrides);
        let twice = translate(&once, None, &overrides);
        assert_eq!(once, twice);
    }

    #[test]
    fn detect_provider_defaults_to_anthropic() {
        assert_eq!(detect_provider(None, None, "claude-sonnet-4-5"), "anthropic");
    }

    #[test]
    fn small_model_suggestion_matches_provider() {
        assert_eq!(
            suggest_small_model("anthropic/claude-opus-4-6"),
            "anthropic/claude-3-5-haiku-20241022"
        );
        assert!(suggest_small_model("amazon-bedrock/anthropic.claude-opus-4-6-v1:0")
            .starts_with("amazon-bedrock/"));
    }
}
