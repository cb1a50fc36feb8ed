// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The three AI-coding-assistant configuration ecosystems the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    #[default]
    ClaudeCode,
    OpenCode,
    Cursor,
}

impl Format {
    /// All three formats, in a stable order used for generating the conversion matrix.
    pub const ALL: [Format; 3] = [Format::ClaudeCode, Format::OpenCode, Format::Cursor];

    /// Human-facing display name, as surfaced by a CLI or UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Format::ClaudeCode => "Claude Code",
            Format::OpenCode => "OpenCode",
            Format::Cursor => "Cursor",
        }
    }

    /// All ordered `(from, to)` pairs with `from != to` — the six supported conversions.
    pub fn supported_conversions() -> Vec<(Format, Format)> {
        let mut pairs = Vec::with_capacity(6);
        for &from in &Self::ALL {
            for &to in &Self::ALL {
                if from != to {
                    pairs.push((from, to));
                }
            }
        }
        pairs
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
