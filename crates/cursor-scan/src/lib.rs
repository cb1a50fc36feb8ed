//! Filesystem scanner for Cursor configuration artifacts (spec §4.1).
//! Chat-history scanning (`workspaceStorage`/`globalStorage` SQLite) is
//! handled by `acc-history`, not here — this crate covers only the
//! plain-file configuration surface.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use acc_codec::extract_body;
use acc_paths::{cursor, Env};
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

/// A discovered rule file (`.mdc` or plain `.md`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRuleFile {
    /// Absolute source path.
    pub path: PathBuf,
    /// Full file content (frontmatter + body, for `.mdc`; plain text
    /// otherwise).
    pub content: String,
    /// Whether this came from an MDC file (has structured frontmatter)
    /// vs. a legacy `.cursorrules`/plain `AGENTS.md`-style file.
    pub is_mdc: bool,
}

/// Global (user-level) scan output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalScan {
    /// Parsed `~/.cursor/mcp.json`.
    pub mcp_json: Option<serde_json::Value>,
    /// Parsed `~/.cursor/cli-config.json`.
    pub cli_config: Option<serde_json::Value>,
    /// `~/.cursor/skills/*/SKILL.md` (excluding `skills-cursor`).
    pub skills: Vec<RawSkill>,
    /// `~/.cursor/commands/*.md`.
    pub commands: Vec<RawMarkdownFile>,
    /// `~/.cursor/agents/*.md`.
    pub agents: Vec<RawMarkdownFile>,
}

/// Project-scoped scan output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectScan {
    /// The scanned project root.
    pub project_path: PathBuf,
    /// Parsed `<cwd>/.cursor/mcp.json`.
    pub mcp_json: Option<serde_json::Value>,
    /// `<cwd>/.cursor/rules/**/*.{mdc,md}`.
    pub rules: Vec<RawRuleFile>,
    /// `<cwd>/.cursor/agents/*.md`.
    pub agents: Vec<RawMarkdownFile>,
    /// `<cwd>/.cursor/commands/*.md`.
    pub commands: Vec<RawMarkdownFile>,
    /// `<cwd>/.cursor/skills/*/SKILL.md` (excluding `skills-cursor`).
    pub skills: Vec<RawSkill>,
    /// `<cwd>/.cursorrules` legacy content, if present.
    pub legacy_cursorrules: Option<String>,
    /// `<cwd>/AGENTS.md` content, if present.
    pub agents_md: Option<String>,
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

fn read_json(path: &Path) -> Option<serde_json::Value> {
    read_to_string(path).and_then(|c| serde_json::from_str(&c).ok())
}

fn scan_skills_dir(dir: &Path) -> Vec<RawSkill> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut skills = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        if name == cursor::EXCLUDED_SKILL_DIR {
            continue;
        }
        let Ok(metadata) = fs::symlink_metadata(&path) else {
            continue;
        };
        if !metadata.is_dir() && !metadata.is_symlink() {
            continue;
        }
        let Some(content) = read_to_string(&path.join("SKILL.md")) else {
            continue;
        };
        let is_symlink = metadata.is_symlink();
        let symlink_target = if is_symlink { fs::canonicalize(&path).ok() } else { None };
        let doc = acc_codec::parse_frontmatter(&content);
        let description = doc.frontmatter.get("description").and_then(|v| v.as_str()).map(str::to_string);
        skills.push(RawSkill { path, name, description, is_symlink, symlink_target });
    }
    skills
}

fn scan_markdown_files(dir: &Path) -> Vec<RawMarkdownFile> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        if let Some(content) = read_to_string(&path) {
            out.push(RawMarkdownFile { path, content });
        }
    }
    out
}

fn scan_rules_dir(dir: &Path) -> Vec<RawRuleFile> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return out;
    }
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str());
        let is_mdc = match ext {
            Some("mdc") => true,
            Some("md") => false,
            _ => continue,
        };
        if let Some(content) = read_to_string(path) {
            out.push(RawRuleFile {
                path: path.to_path_buf(),
                content,
                is_mdc,
            });
        }
    }
    out
}

/// Scan global Cursor artifacts.
#[must_use]
pub fn scan_global(env: &Env) -> GlobalScan {
    let Some(paths) = cursor::global_paths(env) else {
        return GlobalScan::default();
    };
    GlobalScan {
        mcp_json: read_json(&paths.mcp_json),
        cli_config: read_json(&paths.cli_config),
        skills: scan_skills_dir(&paths.skills_dir),
        commands: scan_markdown_files(&paths.commands_dir),
        agents: scan_markdown_files(&paths.agents_dir),
    }
}

/// Scan project-scoped Cursor artifacts rooted at `cwd`.
#[must_use]
pub fn scan_project(cwd: &Path) -> ProjectScan {
    let paths = cursor::project_paths(cwd);
    ProjectScan {
        project_path: cwd.to_path_buf(),
        mcp_json: read_json(&paths.mcp_json),
        rules: scan_rules_dir(&paths.rules_dir),
        agents: scan_markdown_files(&paths.agents_dir),
        commands: scan_markdown_files(&paths.commands_dir),
        skills: scan_skills_dir(&paths.skills_dir),
        legacy_cursorrules: read_to_string(&paths.legacy_cursorrules),
        agents_md: read_to_string(&paths.agents_md).map(|c| extract_body(&c)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_scan_is_well_formed() {
        let home = tempdir().unwrap();
        let env = Env::from_home(home.path());
        let global = scan_global(&env);
        assert!(global.mcp_json.is_none());
        assert!(global.skills.is_empty());
    }

    #[test]
    fn excludes_skills_cursor_directory() {
        let proj = tempdir().unwrap();
        let skills_dir = proj.path().join(".cursor/skills");
        for name in ["skills-cursor", "my-skill"] {
            let p = skills_dir.join(name);
            fs::create_dir_all(&p).unwrap();
            fs::write(p.join("SKILL.md"), "---\ndescription: x\n---\nbody").unwrap();
        }
        let scan = scan_project(proj.path());
        assert_eq!(scan.skills.len(), 1);
        assert_eq!(scan.skills[0].name, "my-skill");
    }

    #[test]
    fn scans_mdc_and_md_rules() {
        let proj = tempdir().unwrap();
        let rules_dir = proj.path().join(".cursor/rules");
        fs::create_dir_all(&rules_dir).unwrap();
        fs::write(rules_dir.join("a.mdc"), "---\nalwaysApply: true\n---\nUse TypeScript").unwrap();
        fs::write(rules_dir.join("b.md"), "plain rule").unwrap();
        let scan = scan_project(proj.path());
        assert_eq!(scan.rules.len(), 2);
        assert!(scan.rules.iter().any(|r| r.is_mdc));
        assert!(scan.rules.iter().any(|r| !r.is_mdc));
    }

    #[test]
    fn reads_legacy_cursorrules_and_agents_md() {
        let proj = tempdir().unwrap();
        fs::write(proj.path().join(".cursorrules"), "legacy rules").unwrap();
        fs::write(proj.path().join("AGENTS.md"), "agents rules").unwrap();
        let scan = scan_project(proj.path());
        assert_eq!(scan.legacy_cursorrules.unwrap(), "legacy rules");
        assert_eq!(scan.agents_md.unwrap(), "agents rules");
    }
}
