//! Filesystem scanner for Claude Code configuration artifacts (spec
//! §4.1). Every public function tolerates missing files and unreadable
//! directories by omitting the corresponding field — scanners never
//! raise for a "file not there" condition.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use acc_codec::extract_body;
use acc_paths::{claude_code, Env};
use walkdir::WalkDir;

/// A discovered `SKILL.md` bundle, pre-canonical-projection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSkill {
    /// The scanned (possibly symlinked) path to the skill directory.
    pub path: PathBuf,
    /// Directory name, used as the skill's name.
    pub name: String,
    /// `description` parsed from `SKILL.md` frontmatter, if present.
    pub description: Option<String>,
    /// Whether the scanned directory entry is a symlink (via `lstat`,
    /// never `stat` — spec §4.1).
    pub is_symlink: bool,
    /// Resolved symlink target, if `is_symlink`.
    pub symlink_target: Option<PathBuf>,
}

/// A discovered agent or command markdown file, pre-canonical-projection.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMarkdownFile {
    /// Absolute source path.
    pub path: PathBuf,
    /// Full file content (frontmatter + body).
    pub content: String,
}

/// Global (user-level) scan output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalScan {
    /// Parsed `~/.Claude/settings.json` (JSONC).
    pub settings: Option<serde_json::Value>,
    /// Parsed `~/.claude.json` (user state + per-project overrides).
    pub user_state: Option<serde_json::Value>,
    /// Skills found under `~/.Claude/skills/*/SKILL.md` and
    /// `~/.agents/skills/*/SKILL.md`, deduplicated by skill name.
    pub skills: Vec<RawSkill>,
    /// `~/.claude/CLAUDE.md` contents, if present.
    pub global_rules: Option<String>,
}

/// Project-scoped scan output, rooted at one `cwd`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectScan {
    /// The project root this scan was rooted at.
    pub project_path: PathBuf,
    /// Parsed `<cwd>/.mcp.json`.
    pub mcp_json: Option<serde_json::Value>,
    /// Parsed `<cwd>/.claude/settings.local.json`.
    pub settings_local: Option<serde_json::Value>,
    /// `<cwd>/.claude/agents/**/*.md`.
    pub agents: Vec<RawMarkdownFile>,
    /// `<cwd>/.claude/commands/**/*.md`.
    pub commands: Vec<RawMarkdownFile>,
    /// `<cwd>/.claude/skills/*/SKILL.md`.
    pub skills: Vec<RawSkill>,
    /// `<cwd>/CLAUDE.md` contents, if present.
    pub claude_md: Option<String>,
    /// `<cwd>/AGENTS.md` contents, if present.
    pub agents_md: Option<String>,
}

/// The full scan result for one invocation (spec §4.1).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    /// Global (user-level) artifacts.
    pub global: GlobalScan,
    /// Project-scoped artifacts, present only when a project root was
    /// requested.
    pub project: Option<ProjectScan>,
}

fn read_to_string(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).ok()
}

fn read_jsonc(path: &Path) -> Option<serde_json::Value> {
    let content = read_to_string(path)?;
    acc_codec::parse_jsonc_lenient(&content)
}

/// Scan one skills directory, one `SKILL.md`-bearing subdirectory at a
/// time. Errors reading the directory itself yield an empty `Vec`.
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
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let doc = acc_codec::parse_frontmatter(&content);
        let description = doc
            .frontmatter
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        skills.push(RawSkill {
            path,
            name,
            description,
            is_symlink,
            symlink_target,
        });
    }
    skills
}

/// Scan a directory of `*.md` files recursively (agents/commands dirs).
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
            out.push(RawMarkdownFile {
                path: path.to_path_buf(),
                content,
            });
        }
    }
    out
}

/// Scan global (user-level) Claude Code artifacts.
#[must_use]
pub fn scan_global(env: &Env) -> GlobalScan {
    let settings = claude_code::global_settings(env).and_then(|p| read_jsonc(&p));
    let user_state = claude_code::user_state(env).and_then(|p| read_json(&p));
    let mut skills = Vec::new();
    let mut seen_real_paths = std::collections::BTreeSet::new();
    for dir in claude_code::global_skills_dirs(env) {
        for skill in scan_skills_dir(&dir) {
            // `~/.Claude/skills` and `~/.claude/skills` may both resolve
            // (via symlink) to the same shared `~/.agents/skills/<name>`
            // directory; dedup on the resolved real path, not the
            // literal scanned path or directory name, so two distinct
            // skills that happen to share a name aren't merged.
            let real_path = fs::canonicalize(&skill.path).unwrap_or_else(|_| skill.path.clone());
            if seen_real_paths.insert(real_path) {
                skills.push(skill);
            }
        }
    }
    let global_rules = claude_code::global_rules(env).and_then(|p| read_to_string(&p));

    GlobalScan {
        settings,
        user_state,
        skills,
        global_rules,
    }
}

/// Scan project-scoped Claude Code artifacts rooted at `cwd`.
#[must_use]
pub fn scan_project(cwd: &Path) -> ProjectScan {
    let paths = claude_code::project_paths(cwd);
    ProjectScan {
        project_path: cwd.to_path_buf(),
        mcp_json: read_json(&paths.mcp_json),
        settings_local: read_jsonc(&paths.settings_local),
        agents: scan_markdown_tree(&paths.agents_dir),
        commands: scan_markdown_tree(&paths.commands_dir),
        skills: scan_skills_dir(&paths.skills_dir),
        claude_md: read_to_string(&paths.claude_md).map(|c| extract_body(&c)),
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
    fn empty_home_yields_well_formed_empty_scan() {
        let home = tempdir().unwrap();
        let env = Env::from_home(home.path());
        let global = scan_global(&env);
        assert!(global.settings.is_none());
        assert!(global.skills.is_empty());
    }

    #[test]
    fn reads_jsonc_settings_with_comments() {
        let home = tempdir().unwrap();
        fs::create_dir_all(home.path().join(".Claude")).unwrap();
        fs::write(
            home.path().join(".Claude/settings.json"),
            "{\n  // comment\n  \"model\": \"opus\",\n}\n",
        )
        .unwrap();
        let env = Env::from_home(home.path());
        let global = scan_global(&env);
        assert_eq!(global.settings.unwrap()["model"], "opus");
    }

    #[test]
    fn dedups_skills_sharing_a_real_path_across_both_dirs() {
        let home = tempdir().unwrap();
        let shared = home.path().join(".agents/skills/review");
        fs::create_dir_all(&shared).unwrap();
        fs::write(shared.join("SKILL.md"), "---\ndescription: x\n---\nbody").unwrap();

        let claude_skills = home.path().join(".Claude/skills");
        fs::create_dir_all(&claude_skills).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(&shared, claude_skills.join("review")).unwrap();

        let env = Env::from_home(home.path());
        let global = scan_global(&env);
        assert_eq!(global.skills.len(), 1);
    }

    #[test]
    fn does_not_dedup_distinct_skills_sharing_only_a_name() {
        let home = tempdir().unwrap();
        for dir in [".Claude/skills/review", ".agents/skills/review"] {
            let path = home.path().join(dir);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join("SKILL.md"), "---\ndescription: x\n---\nbody").unwrap();
        }
        let env = Env::from_home(home.path());
        let global = scan_global(&env);
        assert_eq!(global.skills.len(), 2);
    }

    #[test]
    fn scans_project_agents_and_commands_recursively() {
        let proj = tempdir().unwrap();
        fs::create_dir_all(proj.path().join(".claude/agents/nested")).unwrap();
        fs::write(
            proj.path().join(".claude/agents/nested/reviewer.md"),
            "---\nname: reviewer\n---\nBody",
        )
        .unwrap();
        let scan = scan_project(proj.path());
        assert_eq!(scan.agents.len(), 1);
    }

    #[test]
    fn missing_project_files_are_none_not_errors() {
        let proj = tempdir().unwrap();
        let scan = scan_project(proj.path());
        assert!(scan.mcp_json.is_none());
        assert!(scan.claude_md.is_none());
        assert!(scan.agents.is_empty());
    }
}
