//! `rbt clear` command - discard cached BOMs

use std::io::IsTerminal;

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{load_config, Session};
use crate::cli::GlobalOpts;
use crate::core::store::BomStore;

#[derive(clap::Args, Debug)]
pub struct ClearArgs {
    /// Discard every cached scope and the remembered filter
    #[arg(long)]
    pub all: bool,

    /// Don't ask for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn confirm(prompt: &str) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(miette::miette!(
            help = "pass --yes to confirm",
            "Refusing to clear without confirmation"
        ));
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

pub fn run(args: ClearArgs, global: &GlobalOpts) -> Result<()> {
    if args.all {
        let config = load_config(global);
        let mut store = BomStore::open(config.state_path())?;
        let count = store.scopes().len();
        if !args.yes && !confirm(&format!("Discard {} cached scope(s)?", count))? {
            return Ok(());
        }
        store.clear();
        store.save()?;
        println!("{} Cleared {} cached scope(s)", style("✓").green(), count);
        return Ok(());
    }

    let mut session = Session::open(global)?;
    let Some(removed) = session.store.remove_scope(&session.scope) else {
        println!("Nothing cached for {}.", style(&session.scope).cyan());
        return Ok(());
    };
    let prompt = format!("Discard {} parts for {}?", removed.len(), session.scope);
    if !args.yes && !confirm(&prompt)? {
        return Ok(());
    }
    session.store.save()?;
    println!(
        "{} Cleared {} part(s) for {}",
        style("✓").green(),
        removed.len(),
        style(&session.scope).cyan()
    );
    Ok(())
}
