//! `rbt pull` and `rbt push` commands

use console::style;
use miette::Result;

use crate::cli::commands::utils::{block_on, Session};
use crate::cli::GlobalOpts;
use crate::core::sync;

pub fn run_pull(global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let gateway = session.require_gateway()?;
    let scope = session.scope.clone();

    let count = block_on(sync::pull(&mut session.store, &gateway, &scope))??;
    println!(
        "{} Pulled {} part(s) for {}",
        style("✓").green(),
        count,
        style(&scope).cyan()
    );
    Ok(())
}

pub fn run_push(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    if !session.store.contains(&session.scope) {
        return Err(miette::miette!(
            help = "run `rbt import <FILE>` or `rbt pull` first",
            "Nothing cached for {}",
            session.scope
        ));
    }
    let gateway = session.require_gateway()?;

    let ack = block_on(sync::push(&session.store, &gateway, &session.scope))??;
    println!(
        "{} Pushed {} part(s) for {} to {}",
        style("✓").green(),
        ack.parts,
        style(&ack.scope).cyan(),
        gateway.root().display()
    );
    Ok(())
}
