// SPDX-License-Identifier: MIT OR Apache-2.0
//! MCP server conversion helpers (spec §3.3, §4.2, §4.3): the
//! duck-typed-to-tagged-union projection and multi-source merge used by
//! the Claude Code to-canonical mapper (`.mcp.json`, `~/.claude.json`
//! per-project entry, `.claude/settings.local.json`, later overriding
//! earlier).

use std::collections::BTreeMap;

use acc_ir::{McpKind, McpServer};

/// Project one source format's duck-typed `{url?, command?}` JSON object
/// into an [`McpServer`]. Returns `None` for a value this converter
/// doesn't recognize as an object at all; a recognized-but-invalid
/// object (e.g. local with empty command) is still returned so the
/// caller can record the spec §7 "missing command/url" error and skip it.
#[must_use]
pub fn parse_server(value: &serde_json::Value) -> Option<McpServer> {
    let obj = value.as_object()?;
    let url = obj.get("url").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let command = obj.get("command").and_then(|v| v.as_str()).unwrap_or("").to_string();
    let has_url = !url.is_empty();
    let has_command = !command.is_empty();

    match McpServer::discriminate(has_url, has_command) {
        McpKind::Remote => {
            let headers = obj
                .get("headers")
                .and_then(|v| v.as_object())
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();
            let oauth = obj.get("oauth").cloned();
            let enabled = obj.get("enabled").and_then(|v| v.as_bool());
            Some(McpServer::Remote { url, headers, oauth, enabled })
        }
        McpKind::Local => {
            let args = obj
                .get("args")
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            let env = obj
                .get("env")
                .and_then(|v| v.as_object())
                .map(|m| {
                    m.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect::<BTreeMap<_, _>>()
                })
                .unwrap_or_default();
            Some(McpServer::Local { command, args, env })
        }
    }
}

/// Merge multiple `name -> serde_json::Value` MCP-server sources in
/// override order: later sources' entries replace earlier ones with the
/// same name, entirely (no field-level merge). Entries that fail to
/// parse as a valid server are reported as an error string and dropped
/// (spec §7).
pub fn merge_sources<'a, I>(sources: I, errors: &mut Vec<String>) -> BTreeMap<String, McpServer>
where
    I: IntoIterator<Item = &'a BTreeMap<String, serde_json::Value>>,
{
    let mut merged: BTreeMap<String, McpServer> = BTreeMap::new();
    for source in sources {
        for (name, value) in source {
            match parse_server(value) {
                Some(server) if server.is_valid() => {
                    merged.insert(name.clone(), server);
                }
                Some(_) => {
                    errors.push(format!("mcp server '{name}' is missing command/url, skipped"));
                }
                None => {
                    errors.push(format!("mcp server '{name}' is not a recognizable object, skipped"));
                }
            }
        }
    }
    merged
}

/// Whether a URL looks like it embeds a credential in its query string
/// (spec §4.3, §7): `[?&](token|key|secret|api_key)=`.
#[must_use]
pub fn has_embedded_credential(url: &str) -> bool {
    let Some(query_start) = url.find('?') else {
        return false;
    };
    let query = &url[query_start + 1..];
    for param in query.split('&') {
        let name = param.split('=').next().unwrap_or("");
        if matches!(name, "token" | "key" | "secret" | "api_key") {
            return true;
        }
    }
    false
}

/// Scan a merged server map for remote servers whose `url` looks like it
/// embeds a credential, returning one warning per offending server (spec
/// §7, §8 scenario 4: "`report.warnings` contains a message mentioning
/// `embedded credentials` and `token`").
#[must_use]
pub fn credential_warnings(servers: &BTreeMap<String, McpServer>) -> Vec<String> {
    servers
        .iter()
        .filter_map(|(name, server)| match server {
            McpServer::Remote { url, .. } if has_embedded_credential(url) => Some(format!(
                "mcp server '{name}' has an embedded credential (e.g. a token) in its url"
            )),
            _ => None,
        })
        .collect()
}
