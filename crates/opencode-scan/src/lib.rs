//! Filesystem scanner for OpenCode configuration artifacts (spec §4.1).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use acc_codec::extract_body;
use acc_paths::{opencode, Env};
use walkdir::WalkDir;

/// A discovered `SKILL.md` bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSkill {
    /// Scanned path.
    pub path: PathBuf,
    /// Directory name.
    pub name: String,
    /// Frontmatter `description`, if present.
    pub description: Option<String>,
    /// Whether the entry is a symlink.
    pub is_symlink: bool,
    /// Resolved symlink target, if any.
    pub symlink_target: Option<PathBuf>,
}

/// A discovered agent or command markdown file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMarkdownFile {
    /// Absolute source path.
    pub path: PathBuf,
    /// Full file content.
    pub content: String,
}

/// Global (user-level) scan output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalScan {
    /// Parsed `opencode.json` (JSONC).
    pub config: Option<serde_json::Value>,
    /// Global `AGENTS.md` content.
    pub agents_md: Option<String>,
    /// Global `agents/**/*.md`.
    pub agents: Vec<RawMarkdownFile>,
    /// Global `commands/**/*.md`.
    pub commands: Vec<RawMarkdownFile>,
    /// Global `skills/*/SKILL.md`.
    pub skills: Vec<RawSkill>,
}

/// Project-scoped scan output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectScan {
    /// The scanned project root.
    pub project_path: PathBuf,
    /// Parsed `<cwd>/opencode.json`.
    pub config: Option<serde_json::Value>,
    /// `<cwd>/AGENTS.md` content.
    pub agents_md: Option<String>,
    /// `<cwd>/.opencode/agents/**/*.md`.
    pub agents: Vec<RawMarkdownFile>,
    /// `<cwd>/.opencode/commands/**/*.md`.
    pub commands: Vec<RawMarkdownFile>,
    /// `<cwd>/.opencode/skills/*/SKILL.md`.
    pub skills: Vec<RawSkill>,
}

/// Full scan result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    /// Global artifacts.
    pub global: GlobalScan,
    /// Project artifacts, if a project root was requested.
    pub project: Option<ProjectScan>,
}

fn read_to_string(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn read_jsonc(path: &Path) -> Option<serde_json::Value> {
    let content = read_to_string(path)?;
    acc_codec::parse_jsonc_lenient(&content)
}

fn scan_skills_dir(dir: &Path) -> Vec<RawSkill> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut skills = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = fs::symlink_metadata(&path) else {
            continue;
        };
        if !metadata.is_dir() && !metadata.is_symlink() {
            continue;
        }
        let skill_md = path.join("SKILL.md");
        let Some(content) = read_to_string(&skill_md) else {
            continue;
        };
        let is_symlink = metadata.is_symlink();
        let symlink_target = if is_symlink { fs::canonicalize(&path).ok() } else { None };
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let doc = acc_codec::parse_frontmatter(&content);
        let description = doc.frontmatter.get("description").and_then(|v| v.as_str()).map(str::to_string);
        skills.push(RawSkill { path, name, description, is_symlink, symlink_target });
    }
    skills
}

fn scan_markdown_tree(dir: &Path) -> Vec<RawMarkdownFile> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return out;
    }
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Some(content) = read_to_string(path) {
            out.push(RawMarkdownFile { path: path.to_path_buf(), content });
        }
    }
    out
}

/// Scan global OpenCode artifacts.
#[must_use]
pub fn scan_global(env: &Env) -> GlobalScan {
    GlobalScan {
        config: opencode::global_config(env).and_then(|p| read_jsonc(&p)),
        agents_md: opencode::global_agents_md(env)
            .and_then(|p| read_to_string(&p))
            .map(|c| extract_body(&c)),
        agents: opencode::global_agents_dir(env)
            .map(|d| scan_markdown_tree(&d))
            .unwrap_or_default(),
        commands: opencode::global_commands_dir(env)
            .map(|d| scan_markdown_tree(&d))
            .unwrap_or_default(),
        skills: opencode::global_skills_dir(env)
            .map(|d| scan_skills_dir(&d))
            .unwrap_or_default(),
    }
}

/// Scan project-scoped OpenCode artifacts rooted at `cwd`.
#[must_use]
pub fn scan_project(cwd: &Path) -> ProjectScan {
    let paths = opencode::project_paths(cwd);
    ProjectScan {
        project_path: cwd.to_path_buf(),
        config: read_jsonc(&paths.config),
        agents_md: read_to_string(&paths.agents_md).map(|c| extract_body(&c)),
        agents: scan_markdown_tree(&paths.agents_dir),
        commands: scan_markdown_tree(&paths.commands_dir),
        skills: scan_skills_dir(&paths.skills_dir),
    }
}

/// Scan both global and (optionally) project-scoped artifacts.
#[must_use]
pub fn scan(env: &Env, project_root: Option<&Path>) -> ScanResult {
    ScanResult {
        global: scan_global(env),
        project: project_root.map(scan_project),
    }
}
