//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    clear::ClearArgs, completions::CompletionsArgs, import::ImportArgs, init::InitArgs,
    list::ListArgs, machines::MachinesArgs, scopes::ScopesArgs, show::ShowArgs,
    update::UpdateArgs,
};

/// Robot BOM Tracker
///
/// Track the manufacturing progress of a robot's parts and slice the BOM by
/// stage or machine.
#[derive(Parser, Debug)]
#[command(name = "rbt", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Team number or name
    #[arg(long, global = true, env = "RBT_TEAM")]
    pub team: Option<String>,

    /// Robot name
    #[arg(long, global = true, env = "RBT_ROBOT")]
    pub robot: Option<String>,

    /// Robot system (defaults to "Main")
    #[arg(long, global = true, env = "RBT_SYSTEM")]
    pub system: Option<String>,

    /// State file holding cached BOMs
    #[arg(long = "state", global = true, env = "RBT_STATE", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Shared directory used as the remote BOM store
    #[arg(long, global = true, env = "RBT_REMOTE", value_name = "DIR")]
    pub remote: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "auto")]
    pub output: OutputFormat,

    /// Print debug logging to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Output formats for list and show commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, details for single items
    #[default]
    Auto,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// Markdown table
    Md,
    /// Boxed table
    Table,
    /// Part names only, one per line
    Name,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create `.rbt/config.yaml` in the current directory
    Init(InitArgs),

    /// List parts, filtered by type, stage, or machine
    List(ListArgs),

    /// Show one part with its derived state
    Show(ShowArgs),

    /// Record manufacturing progress for a part
    Update(UpdateArgs),

    /// Import a BOM export (Onshape JSON, part list JSON, or YAML)
    Import(ImportArgs),

    /// Replace the local BOM with the remote copy
    Pull,

    /// Send the local BOM to the remote
    Push,

    /// Show work queued for each machine
    Machines(MachinesArgs),

    /// Count parts by type and status
    Summary,

    /// List cached (or remote) team/robot/system scopes
    Scopes(ScopesArgs),

    /// Discard cached BOMs
    Clear(ClearArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
