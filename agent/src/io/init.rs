//! Project layout under `.mom/` and `init` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use super::config::{AgentConfig, write_config};

/// All canonical paths within `.mom/` for a project root.
#[derive(Debug, Clone)]
pub struct AgentPaths {
    pub root: PathBuf,
    pub state_dir: PathBuf,
    pub gitignore_path: PathBuf,
    pub config_path: PathBuf,
    pub log_path: PathBuf,
}

impl AgentPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let state_dir = root.join(".mom");
        Self {
            root: root.clone(),
            state_dir: state_dir.clone(),
            gitignore_path: state_dir.join(".gitignore"),
            config_path: state_dir.join("config.toml"),
            log_path: state_dir.join("logs.jsonl"),
        }
    }
}

/// Options for `init_agent`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// If true, overwrite an existing config.
    pub force: bool,
}

/// Create `.mom/` scaffolding in `root`.
///
/// Fails if `.mom/` already exists unless `options.force` is set. The
/// interaction log is never touched, even with `force`.
pub fn init_agent(root: &Path, options: &InitOptions) -> Result<AgentPaths> {
    let paths = AgentPaths::new(root);
    if paths.state_dir.exists() && !paths.state_dir.is_dir() {
        return Err(anyhow!("init: .mom exists but is not a directory"));
    }
    if paths.state_dir.exists() && !options.force {
        return Err(anyhow!("init: .mom already exists (use --force to overwrite)"));
    }

    fs::create_dir_all(&paths.state_dir)
        .with_context(|| format!("create directory {}", paths.state_dir.display()))?;
    fs::write(&paths.gitignore_path, STATE_GITIGNORE)
        .with_context(|| format!("write file {}", paths.gitignore_path.display()))?;
    write_config(&paths.config_path, &AgentConfig::default())?;

    Ok(paths)
}

const STATE_GITIGNORE: &str = "logs.jsonl\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::config::load_config;

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_agent(temp.path(), &InitOptions { force: false }).expect("init");

        assert!(paths.state_dir.is_dir());
        assert!(paths.config_path.is_file());
        assert_eq!(
            fs::read_to_string(&paths.gitignore_path).expect("read"),
            STATE_GITIGNORE
        );
        assert!(!paths.log_path.exists());
        assert_eq!(
            load_config(&paths.config_path).expect("load"),
            AgentConfig::default()
        );
    }

    #[test]
    fn init_without_force_refuses_existing_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        init_agent(temp.path(), &InitOptions { force: false }).expect("init");
        let err = init_agent(temp.path(), &InitOptions { force: false }).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_force_keeps_log() {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = init_agent(temp.path(), &InitOptions { force: false }).expect("init");
        fs::write(&paths.log_path, "{\"role\":\"planner\"}\n").expect("write log");
        fs::write(&paths.config_path, "persona = \"Dad Agent\"\n").expect("write config");

        init_agent(temp.path(), &InitOptions { force: true }).expect("re-init");

        assert_eq!(
            fs::read_to_string(&paths.log_path).expect("read log"),
            "{\"role\":\"planner\"}\n"
        );
        assert_eq!(load_config(&paths.config_path).expect("load").persona, "Mom Agent");
    }
}
