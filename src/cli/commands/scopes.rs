//! `rbt scopes` command - list cached or remote team/robot/system scopes

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::load_config;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::{BomStore, Scope};
use crate::core::sync::DirectoryGateway;

#[derive(clap::Args, Debug)]
pub struct ScopesArgs {
    /// List what the remote holds instead of the local cache
    #[arg(long)]
    pub from_remote: bool,
}

pub fn run(args: ScopesArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let (scopes, store): (Vec<Scope>, Option<BomStore>) = if args.from_remote {
        let gateway = DirectoryGateway::new(config.remote_dir()?);
        (gateway.scopes(), None)
    } else {
        let store = BomStore::open(config.state_path())?;
        (store.scopes(), Some(store))
    };
    let active = config.scope().ok();

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&scopes).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&scopes).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if scopes.is_empty() {
                println!("No scopes found.");
                return Ok(());
            }
            for scope in &scopes {
                let marker = if active.as_ref() == Some(scope) {
                    style("*").green().to_string()
                } else {
                    " ".to_string()
                };
                match &store {
                    Some(store) => println!(
                        "{} {}  {}",
                        marker,
                        scope,
                        style(format!("{} parts", store.load(scope).len())).dim()
                    ),
                    None => println!("{} {}", marker, scope),
                }
            }
        }
    }
    Ok(())
}
