//! Pure, per-OS path resolution for the three configuration ecosystems'
//! well-known file locations (spec §6.1, §6.5).
//!
//! Every function here is a pure projection of its inputs: environment
//! variables are passed in explicitly as an [`Env`] value, never read
//! ambiently with `std::env::var`. This keeps the resolver synchronous,
//! host-OS-independent, and trivially testable.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

/// The subset of environment variables the resolver honors (spec §6.5):
/// `HOME`, `XDG_CONFIG_HOME`, `XDG_DATA_HOME`, `XDG_STATE_HOME`, and
/// (Windows-only) `APPDATA`.
#[derive(Debug, Clone, Default)]
pub struct Env {
    /// `$HOME` (or the platform's user home directory).
    pub home: Option<PathBuf>,
    /// `$XDG_CONFIG_HOME`, defaulting to `$HOME/.config`.
    pub xdg_config_home: Option<PathBuf>,
    /// `$XDG_DATA_HOME`, defaulting to `$HOME/.local/share`.
    pub xdg_data_home: Option<PathBuf>,
    /// `$XDG_STATE_HOME`, defaulting to `$HOME/.local/state`.
    pub xdg_state_home: Option<PathBuf>,
    /// `%APPDATA%`, used only for Windows Cursor storage roots.
    pub appdata: Option<PathBuf>,
}

impl Env {
    /// Build an `Env` from an explicit `HOME`, deriving the XDG defaults.
    #[must_use]
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            xdg_config_home: Some(home.join(".config")),
            xdg_data_home: Some(home.join(".local/share")),
            xdg_state_home: Some(home.join(".local/state")),
            home: Some(home),
            appdata: None,
        }
    }

    fn config_home(&self) -> Option<PathBuf> {
        self.xdg_config_home
            .clone()
            .or_else(|| self.home.as_ref().map(|h| h.join(".config")))
    }

    fn data_home(&self) -> Option<PathBuf> {
        self.xdg_data_home
            .clone()
            .or_else(|| self.home.as_ref().map(|h| h.join(".local/share")))
    }

    fn state_home(&self) -> Option<PathBuf> {
        self.xdg_state_home
            .clone()
            .or_else(|| self.home.as_ref().map(|h| h.join(".local/state")))
    }
}

/// The host platform, needed only to pick Cursor's storage roots (spec
/// §6.1). Passed explicitly rather than detected with `cfg!`, so the
/// resolver stays a pure function of its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// macOS.
    Macos,
    /// Linux and other XDG-compliant platforms.
    Linux,
    /// Windows.
    Windows,
}

impl Os {
    /// The `Os` matching the platform this binary was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Macos
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }
}

// ---------------------------------------------------------------------------
// Claude Code
// ---------------------------------------------------------------------------

/// Claude Code's well-known global (user-level) file locations.
pub mod claude_code {
    use super::*;

    /// `~/.Claude/settings.json`.
    #[must_use]
    pub fn global_settings(env: &Env) -> Option<PathBuf> {
        env.home.as_ref().map(|h| h.join(".Claude/settings.json"))
    }

    /// `~/.claude.json` — user state and per-project overrides.
    #[must_use]
    pub fn user_state(env: &Env) -> Option<PathBuf> {
        env.home.as_ref().map(|h| h.join(".claude.json"))
    }

    /// Both skill directories that are scanned and deduplicated by name:
    /// `~/.Claude/skills` and `~/.agents/skills`.
    #[must_use]
    pub fn global_skills_dirs(env: &Env) -> Vec<PathBuf> {
        let Some(home) = env.home.as_ref() else {
            return Vec::new();
        };
        vec![home.join(".Claude/skills"), home.join(".agents/skills")]
    }

    /// `~/.claude/CLAUDE.md` — global rules.
    #[must_use]
    pub fn global_rules(env: &Env) -> Option<PathBuf> {
        env.home.as_ref().map(|h| h.join(".claude/CLAUDE.md"))
    }

    /// `~/.Claude/history.jsonl`.
    #[must_use]
    pub fn global_history_jsonl(env: &Env) -> Option<PathBuf> {
        env.home.as_ref().map(|h| h.join(".Claude/history.jsonl"))
    }

    /// `~/.Claude/projects` — root of the per-project session storage.
    #[must_use]
    pub fn projects_root(env: &Env) -> Option<PathBuf> {
        env.home.as_ref().map(|h| h.join(".Claude/projects"))
    }

    /// Mangle a project path for use as a directory name under
    /// `projects/`: every `/` becomes `-` (spec §3.10, GLOSSARY).
    #[must_use]
    pub fn mangle_project_path(path: &Path) -> String {
        path.to_string_lossy().replace('/', "-")
    }

    /// Best-effort unmangle of a directory name back to a project path:
    /// every `-` becomes `/`. Callers should prefer an explicit
    /// `originalPath` field from the session index when one is present
    /// (spec §4.1) — this is only a fallback, since the mangling is lossy
    /// for paths that themselves contain `-`.
    #[must_use]
    pub fn unmangle_project_path(mangled: &str) -> PathBuf {
        PathBuf::from(mangled.replace('-', "/"))
    }

    /// `<projects_root>/<mangled>/sessions-index.json`.
    #[must_use]
    pub fn sessions_index(env: &Env, project_path: &Path) -> Option<PathBuf> {
        let root = projects_root(env)?;
        Some(
            root.join(mangle_project_path(project_path))
                .join("sessions-index.json"),
        )
    }

    /// Project-scoped file locations, rooted at `cwd`.
    pub struct ProjectPaths {
        /// `<cwd>/.mcp.json`.
        pub mcp_json: PathBuf,
        /// `<cwd>/.claude/settings.local.json`.
        pub settings_local: PathBuf,
        /// `<cwd>/.claude/agents/`.
        pub agents_dir: PathBuf,
        /// `<cwd>/.claude/commands/`.
        pub commands_dir: PathBuf,
        /// `<cwd>/.claude/skills/`.
        pub skills_dir: PathBuf,
        /// `<cwd>/CLAUDE.md`.
        pub claude_md: PathBuf,
        /// `<cwd>/AGENTS.md`.
        pub agents_md: PathBuf,
    }

    /// Resolve project-scoped locations for `cwd`.
    #[must_use]
    pub fn project_paths(cwd: &Path) -> ProjectPaths {
        ProjectPaths {
            mcp_json: cwd.join(".mcp.json"),
            settings_local: cwd.join(".claude/settings.local.json"),
            agents_dir: cwd.join(".claude/agents"),
            commands_dir: cwd.join(".claude/commands"),
            skills_dir: cwd.join(".claude/skills"),
            claude_md: cwd.join("CLAUDE.md"),
            agents_md: cwd.join("AGENTS.md"),
        }
    }
}

// ---------------------------------------------------------------------------
// OpenCode
// ---------------------------------------------------------------------------

/// OpenCode's well-known file locations.
pub mod opencode {
    use super::*;

    /// `$XDG_CONFIG_HOME/opencode/opencode.json`.
    #[must_use]
    pub fn global_config(env: &Env) -> Option<PathBuf> {
        env.config_home().map(|c| c.join("opencode/opencode.json"))
    }

    /// `$XDG_CONFIG_HOME/opencode/AGENTS.md`.
    #[must_use]
    pub fn global_agents_md(env: &Env) -> Option<PathBuf> {
        env.config_home().map(|c| c.join("opencode/AGENTS.md"))
    }

    /// `$XDG_CONFIG_HOME/opencode/agents/`.
    #[must_use]
    pub fn global_agents_dir(env: &Env) -> Option<PathBuf> {
        env.config_home().map(|c| c.join("opencode/agents"))
    }

    /// `$XDG_CONFIG_HOME/opencode/commands/`.
    #[must_use]
    pub fn global_commands_dir(env: &Env) -> Option<PathBuf> {
        env.config_home().map(|c| c.join("opencode/commands"))
    }

    /// `$XDG_CONFIG_HOME/opencode/skills/`.
    #[must_use]
    pub fn global_skills_dir(env: &Env) -> Option<PathBuf> {
        env.config_home().map(|c| c.join("opencode/skills"))
    }

    /// `$XDG_DATA_HOME/opencode/storage/`.
    #[must_use]
    pub fn data_storage_dir(env: &Env) -> Option<PathBuf> {
        env.data_home().map(|d| d.join("opencode/storage"))
    }

    /// `$XDG_DATA_HOME/opencode/opencode.db`.
    #[must_use]
    pub fn data_db(env: &Env) -> Option<PathBuf> {
        env.data_home().map(|d| d.join("opencode/opencode.db"))
    }

    /// `$XDG_STATE_HOME/opencode/prompt-history.jsonl`.
    #[must_use]
    pub fn prompt_history(env: &Env) -> Option<PathBuf> {
        env.state_home()
            .map(|s| s.join("opencode/prompt-history.jsonl"))
    }

    /// Project-scoped file locations, rooted at `cwd`.
    pub struct ProjectPaths {
        /// `<cwd>/opencode.json`.
        pub config: PathBuf,
        /// `<cwd>/AGENTS.md`.
        pub agents_md: PathBuf,
        /// `<cwd>/.opencode/agents/`.
        pub agents_dir: PathBuf,
        /// `<cwd>/.opencode/commands/`.
        pub commands_dir: PathBuf,
        /// `<cwd>/.opencode/skills/`.
        pub skills_dir: PathBuf,
    }

    /// Resolve project-scoped locations for `cwd`.
    #[must_use]
    pub fn project_paths(cwd: &Path) -> ProjectPaths {
        ProjectPaths {
            config: cwd.join("opencode.json"),
            agents_md: cwd.join("AGENTS.md"),
            agents_dir: cwd.join(".opencode/agents"),
            commands_dir: cwd.join(".opencode/commands"),
            skills_dir: cwd.join(".opencode/skills"),
        }
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Cursor's well-known file locations.
pub mod cursor {
    use super::*;

    /// Global (user-level) locations, rooted at `~/.cursor/`.
    pub struct GlobalPaths {
        /// `~/.cursor/mcp.json`.
        pub mcp_json: PathBuf,
        /// `~/.cursor/cli-config.json`.
        pub cli_config: PathBuf,
        /// `~/.cursor/skills/`.
        pub skills_dir: PathBuf,
        /// `~/.cursor/commands/`.
        pub commands_dir: PathBuf,
        /// `~/.cursor/agents/`.
        pub agents_dir: PathBuf,
    }

    /// Resolve global locations.
    #[must_use]
    pub fn global_paths(env: &Env) -> Option<GlobalPaths> {
        let home = env.home.as_ref()?;
        let root = home.join(".cursor");
        Some(GlobalPaths {
            mcp_json: root.join("mcp.json"),
            cli_config: root.join("cli-config.json"),
            skills_dir: root.join("skills"),
            commands_dir: root.join("commands"),
            agents_dir: root.join("agents"),
        })
    }

    /// Project-scoped locations, rooted at `cwd`.
    pub struct ProjectPaths {
        /// `<cwd>/.cursor/mcp.json`.
        pub mcp_json: PathBuf,
        /// `<cwd>/.cursor/rules/`.
        pub rules_dir: PathBuf,
        /// `<cwd>/.cursor/agents/`.
        pub agents_dir: PathBuf,
        /// `<cwd>/.cursor/commands/`.
        pub commands_dir: PathBuf,
        /// `<cwd>/.cursor/skills/`.
        pub skills_dir: PathBuf,
        /// `<cwd>/.cursorrules` (legacy, single-file rules).
        pub legacy_cursorrules: PathBuf,
        /// `<cwd>/AGENTS.md`.
        pub agents_md: PathBuf,
    }

    /// Resolve project-scoped locations for `cwd`.
    #[must_use]
    pub fn project_paths(cwd: &Path) -> ProjectPaths {
        let root = cwd.join(".cursor");
        ProjectPaths {
            mcp_json: root.join("mcp.json"),
            rules_dir: root.join("rules"),
            agents_dir: root.join("agents"),
            commands_dir: root.join("commands"),
            skills_dir: root.join("skills"),
            legacy_cursorrules: cwd.join(".cursorrules"),
            agents_md: cwd.join("AGENTS.md"),
        }
    }

    /// The top-level entry excluded from every scanned skills directory
    /// (spec §4.1): Cursor ships its own `skills-cursor` bundle there.
    pub const EXCLUDED_SKILL_DIR: &str = "skills-cursor";

    /// `workspaceStorage/` and `globalStorage/` roots, which vary by OS
    /// (spec §6.1).
    pub struct StorageRoots {
        /// `.../User/workspaceStorage/`.
        pub workspace_storage: PathBuf,
        /// `.../User/globalStorage/`.
        pub global_storage: PathBuf,
    }

    /// Resolve the platform-specific storage roots.
    #[must_use]
    pub fn storage_roots(env: &Env, os: Os) -> Option<StorageRoots> {
        let user_dir = match os {
            Os::Macos => env
                .home
                .as_ref()?
                .join("Library/Application Support/Cursor/User"),
            Os::Linux => env.config_home()?.join("Cursor/User"),
            Os::Windows => env.appdata.as_ref()?.join("Cursor/User"),
        };
        Some(StorageRoots {
            workspace_storage: user_dir.join("workspaceStorage"),
            global_storage: user_dir.join("globalStorage"),
        })
    }

    /// `<global_storage>/state.vscdb`.
    #[must_use]
    pub fn global_state_db(roots: &StorageRoots) -> PathBuf {
        roots.global_storage.join("state.vscdb")
    }

    /// `<workspace_dir>/workspace.json`.
    #[must_use]
    pub fn workspace_manifest(workspace_dir: &Path) -> PathBuf {
        workspace_dir.join("workspace.json")
    }

    /// `<workspace_dir>/state.vscdb`.
    #[must_use]
    pub fn workspace_state_db(workspace_dir: &Path) -> PathBuf {
        workspace_dir.join("state.vscdb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env::from_home("/home/u")
    }

    #[test]
    fn claude_code_global_paths() {
        let e = env();
        assert_eq!(
            claude_code::global_settings(&e).unwrap(),
            PathBuf::from("/home/u/.Claude/settings.json")
        );
        assert_eq!(
            claude_code::user_state(&e).unwrap(),
            PathBuf::from("/home/u/.claude.json")
        );
        let skills = claude_code::global_skills_dirs(&e);
        assert_eq!(skills.len(), 2);
    }

    #[test]
    fn claude_code_mangle_roundtrip_for_simple_paths() {
        let p = Path::new("/Users/x/p");
        let mangled = claude_code::mangle_project_path(p);
        assert_eq!(mangled, "-Users-x-p");
        assert_eq!(
            claude_code::unmangle_project_path(&mangled),
            PathBuf::from("/Users/x/p")
        );
    }

    #[test]
    fn opencode_global_paths_use_xdg_config_home() {
        let e = env();
        assert_eq!(
            opencode::global_config(&e).unwrap(),
            PathBuf::from("/home/u/.config/opencode/opencode.json")
        );
    }

    #[test]
    fn opencode_respects_explicit_xdg_override() {
        let mut e = env();
        e.xdg_config_home = Some(PathBuf::from("/custom/config"));
        assert_eq!(
            opencode::global_config(&e).unwrap(),
            PathBuf::from("/custom/config/opencode/opencode.json")
        );
    }

    #[test]
    fn cursor_project_paths_rooted_at_cwd() {
        let paths = cursor::project_paths(Path::new("/repo"));
        assert_eq!(paths.mcp_json, PathBuf::from("/repo/.cursor/mcp.json"));
        assert_eq!(
            paths.legacy_cursorrules,
            PathBuf::from("/repo/.cursorrules")
        );
    }

    #[test]
    fn cursor_storage_roots_differ_by_os() {
        let e = env();
        let macos = cursor::storage_roots(&e, Os::Macos).unwrap();
        assert!(macos
            .workspace_storage
            .to_string_lossy()
            .contains("Library/Application Support/Cursor"));
        let linux = cursor::storage_roots(&e, Os::Linux).unwrap();
        assert!(linux.workspace_storage.to_string_lossy().contains(".config/Cursor"));
    }

    #[test]
    fn cursor_windows_storage_root_requires_appdata() {
        let e = env();
        assert!(cursor::storage_roots(&e, Os::Windows).is_none());
        let mut e2 = env();
        e2.appdata = Some(PathBuf::from("C:/Users/u/AppData/Roaming"));
        assert!(cursor::storage_roots(&e2, Os::Windows).is_some());
    }

    #[test]
    fn no_home_yields_none_everywhere() {
        let e = Env::default();
        assert!(claude_code::global_settings(&e).is_none());
        assert!(cursor::global_paths(&e).is_none());
    }
}
