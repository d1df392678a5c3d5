//! Layered configuration
//!
//! Global settings live in the platform config directory
//! (`~/.config/rbt/config.yaml` on Linux); project settings in
//! `.rbt/config.yaml`, found by walking up from the working directory.
//! Project values win over global ones, and command-line flags win over both.

use std::path::{Path, PathBuf};

use console::style;
use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::store::{Scope, DEFAULT_SYSTEM};
use crate::entities::Machine;
use crate::yaml::parse_yaml_file;

/// Project directory name
pub const PROJECT_DIR: &str = ".rbt";

/// Config file name, both globally and per project
pub const CONFIG_FILE: &str = "config.yaml";

/// State file name used when none is configured
pub const STATE_FILE: &str = "state.json";

/// Remote storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Directory holding `<team>/bom.json` files
    pub dir: PathBuf,
}

/// Errors from resolving configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Missing {0} context")]
    #[diagnostic(
        code(rbt::config::missing_context),
        help("pass --team/--robot, set RBT_TEAM/RBT_ROBOT, or run `rbt init`")
    )]
    MissingContext(&'static str),

    #[error("No remote configured")]
    #[diagnostic(
        code(rbt::config::no_remote),
        help("pass --remote <DIR>, set RBT_REMOTE, or add `remote: {{ dir: ... }}` to .rbt/config.yaml")
    )]
    NoRemote,
}

/// Merged configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Where cached BOMs are kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    /// Filter used by `list` when none was chosen yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_filter: Option<String>,

    /// The team's machines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub machines: Vec<Machine>,

    /// Project root (directory containing `.rbt/`), if one was found
    #[serde(skip)]
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Load global and project config for the current directory
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let global = Self::global_path().map(|p| Self::read_or_default(&p));
        Self::load_from(&cwd, global.unwrap_or_default())
    }

    /// Layer the project config found from `start` on top of `base`
    pub fn load_from(start: &Path, base: Config) -> Self {
        let mut config = base;
        if let Some(root) = find_project_root(start) {
            let project = Self::read_or_default(&root.join(PROJECT_DIR).join(CONFIG_FILE));
            config.merge(project);
            config.project_root = Some(root);
        }
        config
    }

    /// Path of the global config file
    pub fn global_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rbt").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn read_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match parse_yaml_file::<Config>(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "{} Ignoring config {}: {}",
                    style("!").yellow(),
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: Config) {
        if other.team.is_some() {
            self.team = other.team;
        }
        if other.robot.is_some() {
            self.robot = other.robot;
        }
        if other.system.is_some() {
            self.system = other.system;
        }
        if other.state_file.is_some() {
            self.state_file = other.state_file;
        }
        if other.remote.is_some() {
            self.remote = other.remote;
        }
        if other.default_filter.is_some() {
            self.default_filter = other.default_filter;
        }
        if !other.machines.is_empty() {
            self.machines = other.machines;
        }
    }

    /// Resolve a path from config relative to the project root
    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.project_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Location of the state file
    pub fn state_path(&self) -> PathBuf {
        if let Some(path) = &self.state_file {
            return self.resolve(path);
        }
        if let Some(root) = &self.project_root {
            return root.join(PROJECT_DIR).join(STATE_FILE);
        }
        ProjectDirs::from("", "", "rbt")
            .map(|dirs| dirs.data_dir().join(STATE_FILE))
            .unwrap_or_else(|| PathBuf::from(PROJECT_DIR).join(STATE_FILE))
    }

    /// Remote directory, if configured
    pub fn remote_dir(&self) -> Result<PathBuf, ConfigError> {
        self.remote
            .as_ref()
            .map(|r| self.resolve(&r.dir))
            .ok_or(ConfigError::NoRemote)
    }

    /// The active scope
    pub fn scope(&self) -> Result<Scope, ConfigError> {
        let team = self.team.clone().ok_or(ConfigError::MissingContext("team"))?;
        let robot = self
            .robot
            .clone()
            .ok_or(ConfigError::MissingContext("robot"))?;
        let system = self
            .system
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM.to_string());
        Ok(Scope::new(team, robot, system))
    }

    /// Look up a configured machine by name, case-insensitively
    pub fn machine(&self, name: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.is_named(name))
    }
}

/// Find the nearest ancestor of `start` containing a `.rbt` directory
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CadFormat;
    use std::fs;
    use tempfile::TempDir;

    fn write_project_config(root: &Path, yaml: &str) {
        fs::create_dir_all(root.join(PROJECT_DIR)).unwrap();
        fs::write(root.join(PROJECT_DIR).join(CONFIG_FILE), yaml).unwrap();
    }

    #[test]
    fn test_project_config_found_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        write_project_config(tmp.path(), "team: \"1234\"\nrobot: Ares\n");
        let sub = tmp.path().join("cad").join("exports");
        fs::create_dir_all(&sub).unwrap();

        let config = Config::load_from(&sub, Config::default());
        assert_eq!(config.project_root.as_deref(), Some(tmp.path()));
        let scope = config.scope().unwrap();
        assert_eq!(scope, Scope::new("1234", "Ares", "Main"));
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        write_project_config(tmp.path(), "robot: Ares\nsystem: Intake\n");
        let global = Config {
            team: Some("1234".to_string()),
            robot: Some("Zeus".to_string()),
            default_filter: Some("InHouse".to_string()),
            ..Config::default()
        };

        let config = Config::load_from(tmp.path(), global);
        assert_eq!(config.team.as_deref(), Some("1234"));
        assert_eq!(config.robot.as_deref(), Some("Ares"));
        assert_eq!(config.system.as_deref(), Some("Intake"));
        assert_eq!(config.default_filter.as_deref(), Some("InHouse"));
    }

    #[test]
    fn test_missing_context() {
        let config = Config {
            team: Some("1234".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.scope(),
            Err(ConfigError::MissingContext("robot"))
        ));
    }

    #[test]
    fn test_paths_resolve_against_project_root() {
        let tmp = TempDir::new().unwrap();
        write_project_config(
            tmp.path(),
            "team: \"1\"\nrobot: R\nremote:\n  dir: shared\nstate_file: cache/state.json\n",
        );

        let config = Config::load_from(tmp.path(), Config::default());
        assert_eq!(config.remote_dir().unwrap(), tmp.path().join("shared"));
        assert_eq!(config.state_path(), tmp.path().join("cache/state.json"));
    }

    #[test]
    fn test_default_state_path_in_project() {
        let tmp = TempDir::new().unwrap();
        write_project_config(tmp.path(), "team: \"1\"\n");
        let config = Config::load_from(tmp.path(), Config::default());
        assert_eq!(
            config.state_path(),
            tmp.path().join(PROJECT_DIR).join(STATE_FILE)
        );
        assert!(matches!(config.remote_dir(), Err(ConfigError::NoRemote)));
    }

    #[test]
    fn test_machines_lookup() {
        let tmp = TempDir::new().unwrap();
        write_project_config(
            tmp.path(),
            "machines:\n  - name: Laser\n    output_format: DXF\n  - name: CNC Router\n",
        );
        let config = Config::load_from(tmp.path(), Config::default());
        assert_eq!(config.machines.len(), 2);
        assert_eq!(
            config.machine("laser").map(|m| m.output_format),
            Some(CadFormat::Dxf)
        );
        assert_eq!(
            config.machine("cnc router").map(|m| m.output_format),
            Some(CadFormat::Step)
        );
    }

    #[test]
    fn test_invalid_project_config_is_ignored() {
        let tmp = TempDir::new().unwrap();
        write_project_config(tmp.path(), "team: [unclosed");
        let base = Config {
            team: Some("42".to_string()),
            ..Config::default()
        };
        let config = Config::load_from(tmp.path(), base);
        assert_eq!(config.team.as_deref(), Some("42"));
    }
}
