//! Shared utilities for CLI commands

use std::future::Future;
use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::config::{Config, RemoteConfig};
use crate::core::filter::BomFilter;
use crate::core::store::{BomStore, Scope};
use crate::core::sync::DirectoryGateway;

/// Make a command-line path absolute against the working directory
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Load config files and overlay command-line flags
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        team: global.team.clone(),
        robot: global.robot.clone(),
        system: global.system.clone(),
        state_file: global.state_file.as_deref().map(absolute),
        remote: global.remote.as_deref().map(|dir| RemoteConfig {
            dir: absolute(dir),
        }),
        ..Config::default()
    });
    config
}

/// Everything a command needs to work on one scope
pub struct Session {
    pub config: Config,
    pub store: BomStore,
    pub scope: Scope,
}

impl Session {
    /// Resolve config and scope, then open the local store
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = load_config(global);
        let scope = config.scope()?;
        let store = BomStore::open(config.state_path())?;
        tracing::debug!(scope = %scope, state = %config.state_path().display(), "session opened");
        Ok(Self {
            config,
            store,
            scope,
        })
    }

    /// Gateway for the configured remote, if there is one
    pub fn gateway(&self) -> Option<DirectoryGateway> {
        self.config.remote_dir().ok().map(DirectoryGateway::new)
    }

    /// Gateway for the configured remote, failing when none is set
    pub fn require_gateway(&self) -> Result<DirectoryGateway> {
        Ok(DirectoryGateway::new(self.config.remote_dir()?))
    }

    /// Filter from an explicit token, the remembered choice, or config
    pub fn filter(&self, token: Option<&str>) -> BomFilter {
        token
            .or(self.store.current_filter())
            .or(self.config.default_filter.as_deref())
            .map(BomFilter::parse)
            .unwrap_or_default()
    }
}

/// Run a future to completion on a single-threaded runtime
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;
    Ok(runtime.block_on(future))
}
