//! Canonical intermediate representation (IR) for the agent config
//! converter.
//!
//! Every scanner output is projected onto [`CanonicalScanResult`] before
//! being re-emitted for a target format. The IR is the hub of the
//! hub-and-spoke pipeline: it has no knowledge of any particular source or
//! target format's file layout, only of the format-agnostic concepts
//! (models, MCP servers, permissions, rules, agents, commands, skills,
//! chat history) that all three formats share a projection of.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod command;
mod config;
mod conversion;
pub mod format;
mod history;
mod mcp;
mod permissions;
mod rules;
mod skill;

pub use agent::{Agent, AgentMode};
pub use command::Command;
pub use config::{GlobalConfig, ProjectConfig};
pub use conversion::{
    CanonicalConversionResult, CanonicalScanResult, ConversionReport, ReportCategory, ReportItem,
};
pub use format::Format;
pub use history::{
    ConvertedSession, HistoryMessage, HistoryPart, HistoryPartType, HistoryRole, HistorySession,
    HistoryTimestamps, project_id_for_path,
};
pub use mcp::{McpKind, McpServer};
pub use permissions::{Action, Permissions, PermissionsMap};
pub use rules::{RuleFile, RuleType};
pub use skill::Skill;
