//! `rbt init` command - create a project config

use std::fs;
use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::config::{Config, RemoteConfig, CONFIG_FILE, PROJECT_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,

    /// Default filter for `rbt list`
    #[arg(long)]
    pub default_filter: Option<String>,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;
    let dir = cwd.join(PROJECT_DIR);
    let path = dir.join(CONFIG_FILE);

    if path.exists() && !args.force {
        return Err(miette::miette!(
            help = "pass --force to overwrite it",
            "{} already exists",
            path.display()
        ));
    }

    let config = Config {
        team: global.team.clone(),
        robot: global.robot.clone(),
        system: global.system.clone(),
        state_file: global.state_file.clone(),
        remote: global
            .remote
            .clone()
            .map(|dir: PathBuf| RemoteConfig { dir }),
        default_filter: args.default_filter,
        ..Config::default()
    };

    fs::create_dir_all(&dir).into_diagnostic()?;
    let mut yaml = serde_yml::to_string(&config).into_diagnostic()?;
    if !yaml.ends_with('\n') {
        yaml.push('\n');
    }
    fs::write(&path, yaml).into_diagnostic()?;

    println!(
        "{} Created {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    if config.team.is_none() || config.robot.is_none() {
        eprintln!(
            "{} No team or robot set; edit the file or pass --team and --robot",
            style("!").yellow()
        );
    }
    Ok(())
}
