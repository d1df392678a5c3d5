//! `rbt import` command - load a BOM export into the local store

use std::path::PathBuf;

use console::style;
use miette::Result;

use crate::cli::commands::utils::{block_on, Session};
use crate::cli::GlobalOpts;
use crate::core::filter::is_cots;
use crate::core::onshape::import_file;
use crate::core::sync::push;

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// BOM file: Onshape export JSON, a JSON part list, or YAML
    pub file: PathBuf,

    /// Also send the imported BOM to the remote
    #[arg(long)]
    pub push: bool,

    /// Parse and report without saving
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let parts = import_file(&args.file)?;

    let cots = parts.iter().filter(|p| is_cots(p)).count();
    let summary = format!(
        "{} parts ({} in-house, {} COTS)",
        parts.len(),
        parts.len() - cots,
        cots
    );

    if args.dry_run {
        println!(
            "{} Would import {} into {}",
            style("→").blue(),
            summary,
            style(&session.scope).cyan()
        );
        return Ok(());
    }

    if session.store.contains(&session.scope) {
        eprintln!(
            "{} Replacing the cached BOM for {}",
            style("!").yellow(),
            session.scope
        );
    }
    session.store.replace(&session.scope, parts);
    session.store.save()?;
    println!(
        "{} Imported {} into {}",
        style("✓").green(),
        summary,
        style(&session.scope).cyan()
    );

    if args.push {
        let gateway = session.require_gateway()?;
        let ack = block_on(push(&session.store, &gateway, &session.scope))??;
        println!("   Synced {} part(s) to remote", ack.parts);
    }
    Ok(())
}
