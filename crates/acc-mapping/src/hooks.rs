// SPDX-License-Identifier: MIT OR Apache-2.0
//! The hooks-to-plugin-stub converter (spec §4.8): Claude Code's
//! `hooks` settings block has no OpenCode or Cursor equivalent, so it is
//! projected into a single generated `cc-hooks.ts` plugin file instead
//! of a canonical type. Always emits a manual-action notice — the
//! generated plugin is a starting point, not a drop-in replacement.

/// One `hooks.<Event>[]` entry: an optional matcher and the shell
/// commands it gates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEntry {
    /// The event name as Claude Code names it, e.g. `"PreToolUse"`.
    pub event: String,
    /// The matcher pattern, if any (spec: compiled as a JS `RegExp`).
    pub matcher: Option<String>,
    /// Shell command strings run by this entry's hooks.
    pub commands: Vec<String>,
}

/// Events with a direct OpenCode plugin hook-point (spec §4.8). Anything
/// else becomes a commented-out TODO in the generated stub.
fn opencode_event_name(event: &str) -> Option<&'static str> {
    Some(match event {
        "PreToolUse" => "tool.execute.before",
        "PostToolUse" => "tool.execute.after",
        "UserPromptSubmit" => "chat.message",
        _ => return None,
    })
}

/// Escape a matcher string for safe embedding inside a JS regex literal
/// delimiter (`/<pattern>/`). Spec §9/REDESIGN FLAGS: the source
/// implementation embeds the matcher unescaped, which lets a matcher
/// containing `/` break out of the regex literal; this escapes every JS
/// regex metacharacter, not just `/`.
#[must_use]
pub fn escape_regex_literal(matcher: &str) -> String {
    let mut out = String::with_capacity(matcher.len());
    for ch in matcher.chars() {
        if matches!(
            ch,
            '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '/'
        ) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Escape a shell command string for safe embedding inside a JS
/// back-tick template literal (spec §4.8): `\` -> `\\`, `` ` `` ->
/// `` \` ``, `$` -> `\$`. Order matters: backslashes must be escaped
/// first so the escapes introduced for backtick/dollar are not
/// themselves re-escaped.
#[must_use]
pub fn escape_template_literal(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    for ch in command.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out
}

/// Parse a Claude Code `hooks` settings object into a flat list of
/// entries, in the JSON object's (insertion) order per event and array
/// order within each event.
#[must_use]
pub fn parse_hooks(hooks: &serde_json::Value) -> Vec<HookEntry> {
    let Some(events) = hooks.as_object() else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for (event, entries) in events {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for entry in entries {
            let matcher = entry
                .get("matcher")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let commands = entry
                .get("hooks")
                .and_then(|v| v.as_array())
                .map(|hooks| {
                    hooks
                        .iter()
                        .filter_map(|h| h.get("command").and_then(|c| c.as_str()))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            if commands.is_empty() {
                continue;
            }
            out.push(HookEntry {
                event: event.clone(),
                matcher,
                commands,
            });
        }
    }
    out
}

/// Render one hook entry's handler body: a sequence of `await
/// $\`...\`` shell invocations, optionally gated by a matcher test
/// against `ctx.tool`.
fn render_handler(entry: &HookEntry) -> String {
    let body: String = entry
        .commands
        .iter()
        .map(|c| format!("    await $`{}`;\n", escape_template_literal(c)))
        .collect();
    match &entry.matcher {
        Some(matcher) => format!(
            "  if (/{}/.test(ctx.tool)) {{\n{body}  }}\n",
            escape_regex_literal(matcher)
        ),
        None => body,
    }
}

/// Generate the full `cc-hooks.ts` OpenCode plugin stub for a set of
/// parsed hook entries (spec §4.8). Entries for events with no OpenCode
/// hook-point equivalent are rendered as a commented-out TODO block
/// rather than wired into the returned factory object.
#[must_use]
pub fn generate_plugin_stub(entries: &[HookEntry]) -> String {
    let mut wired: Vec<(&str, Vec<&HookEntry>)> = Vec::new();
    let mut unmapped: Vec<&HookEntry> = Vec::new();

    for entry in entries {
        match opencode_event_name(&entry.event) {
            Some(name) => {
                if let Some((_, group)) = wired.iter_mut().find(|(n, _)| *n == name) {
                    group.push(entry);
                } else {
                    wired.push((name, vec![entry]));
                }
            }
            None => unmapped.push(entry),
        }
    }

    let mut out = String::new();
    out.push_str("// Generated from Claude Code hook settings. Review before use:\n");
    out.push_str("// command strings are copied verbatim and matchers are compiled\n");
    out.push_str("// to JS RegExp without validating they mean the same thing in\n");
    out.push_str("// OpenCode's matcher semantics.\n");
    out.push_str("import { $ } from \"bun\";\n\n");
    out.push_str("export default function ccHooks() {\n");
    out.push_str("  return {\n");
    for (name, group) in &wired {
        out.push_str(&format!("    \"{name}\": async (ctx) => {{\n"));
        for entry in group {
            for line in render_handler(entry).lines() {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str("    },\n");
    }
    out.push_str("  };\n");
    out.push_str("}\n");

    if !unmapped.is_empty() {
        out.push_str("\n// The following Claude Code hook events have no direct OpenCode\n");
        out.push_str("// plugin hook-point and were not wired in above:\n");
        let mut seen_events = std::collections::BTreeSet::new();
        for entry in &unmapped {
            if seen_events.insert(entry.event.clone()) {
                out.push_str(&format!("// TODO: {} -> (no OpenCode equivalent)\n", entry.event));
            }
        }
    }

    out
}

/// Convert a Claude Code `hooks` settings value straight into the
/// generated plugin file content, or `None` if there are no actionable
/// entries.
#[must_use]
pub fn convert_hooks(hooks: &serde_json::Value) -> Option<String> {
    let entries = parse_hooks(hooks);
    if entries.is_empty() {
        return None;
    }
    Some(generate_plugin_stub(&entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_template_literal_specials() {
        assert_eq!(escape_template_literal("echo `hi` $HOME"), "echo \\`hi\\` \\$HOME");
        assert_eq!(escape_template_literal(r"a\b"), r"a\\b");
    }

    #[test]
    fn escapes_regex_metacharacters_including_slash() {
        assert_eq!(escape_regex_literal("a/b"), r"a\/b");
        assert_eq!(escape_regex_literal("Bash(.*)"), r"Bash\(\.\*\)");
    }

    #[test]
    fn matcher_with_slash_cannot_break_out_of_literal() {
        let escaped = escape_regex_literal("foo/bar");
        assert!(!escaped.contains("/\n"));
        assert_eq!(escaped.matches('/').count(), escaped.matches("\\/").count());
    }

    #[test]
    fn parses_pretooluse_entries_with_matcher() {
        let hooks = serde_json::json!({
            "PreToolUse": [
                {"matcher": "Bash", "hooks": [{"type": "command", "command": "echo go"}]}
            ]
        });
        let entries = parse_hooks(&hooks);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "PreToolUse");
        assert_eq!(entries[0].matcher.as_deref(), Some("Bash"));
        assert_eq!(entries[0].commands, vec!["echo go".to_string()]);
    }

    #[test]
    fn entries_without_commands_are_dropped() {
        let hooks = serde_json::json!({"PreToolUse": [{"matcher": "Bash", "hooks": []}]});
        assert!(parse_hooks(&hooks).is_empty());
    }

    #[test]
    fn generates_wired_handler_for_known_event() {
        let entries = vec![HookEntry {
            event: "PreToolUse".to_string(),
            matcher: Some("Bash".to_string()),
            commands: vec!["echo hi".to_string()],
        }];
        let stub = generate_plugin_stub(&entries);
        assert!(stub.contains("\"tool.execute.before\""));
        assert!(stub.contains("/Bash/.test(ctx.tool)"));
        assert!(stub.contains("await $`echo hi`;"));
    }

    #[test]
    fn unmapped_event_becomes_todo_comment_not_wired_call() {
        let entries = vec![HookEntry {
            event: "SessionStart".to_string(),
            matcher: None,
            commands: vec!["echo hi".to_string()],
        }];
        let stub = generate_plugin_stub(&entries);
        assert!(stub.contains("TODO: SessionStart"));
        assert!(!stub.contains("\"SessionStart\""));
    }

    #[test]
    fn convert_hooks_returns_none_for_empty_settings() {
        assert!(convert_hooks(&serde_json::json!({})).is_none());
        assert!(convert_hooks(&serde_json::json!(null)).is_none());
    }

    #[test]
    fn malicious_matcher_with_slash_does_not_escape_regex_literal() {
        let hooks = serde_json::json!({
            "PreToolUse": [
                {"matcher": "x/.test(1)//", "hooks": [{"type": "command", "command": "rm -rf /"}]}
            ]
        });
        let entries = parse_hooks(&hooks);
        let stub = generate_plugin_stub(&entries);
        assert!(stub.contains(r"x\/\.test\(1\)\/\/"));
    }
}
