//! `rbt update` command - record manufacturing progress

use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{block_on, Session};
use crate::cli::helpers::apply_delta;
use crate::cli::GlobalOpts;
use crate::core::store::StoreError;
use crate::core::sync::{update_and_persist, SyncError};
use crate::entities::{Part, StageKind};

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Part name (exact)
    pub name: String,

    /// Set units done at pre-process
    #[arg(long, conflicts_with = "add_pre")]
    pub pre: Option<u32>,

    /// Set units done at process 1
    #[arg(long, conflicts_with = "add_p1")]
    pub p1: Option<u32>,

    /// Set units done at process 2
    #[arg(long, conflicts_with = "add_p2")]
    pub p2: Option<u32>,

    /// Add (or, if negative, remove) units at pre-process
    #[arg(long, allow_negative_numbers = true, value_name = "DELTA")]
    pub add_pre: Option<i64>,

    /// Add (or, if negative, remove) units at process 1
    #[arg(long, allow_negative_numbers = true, value_name = "DELTA")]
    pub add_p1: Option<i64>,

    /// Add (or, if negative, remove) units at process 2
    #[arg(long, allow_negative_numbers = true, value_name = "DELTA")]
    pub add_p2: Option<i64>,

    /// Prompt for each defined stage
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Only save locally, even if a remote is configured
    #[arg(long)]
    pub no_sync: bool,
}

impl UpdateArgs {
    /// Requested edit per stage: absolute value or increment
    fn edits(&self) -> [(StageKind, Option<u32>, Option<i64>); 3] {
        [
            (StageKind::PreProcess, self.pre, self.add_pre),
            (StageKind::Process1, self.p1, self.add_p1),
            (StageKind::Process2, self.p2, self.add_p2),
        ]
    }

    fn has_edits(&self) -> bool {
        self.edits()
            .iter()
            .any(|(_, set, add)| set.is_some() || add.is_some())
    }
}

/// Apply command-line edits to a part's progress counts
pub fn apply_edits(part: &mut Part, args: &UpdateArgs) {
    for (kind, set, add) in args.edits() {
        let current = part.stage_qty(kind);
        let next = match (set, add) {
            (Some(value), _) => value,
            (None, Some(delta)) => apply_delta(current, delta),
            (None, None) => continue,
        };
        if part.stage(kind).is_undefined() {
            eprintln!(
                "{} {} has no {} stage; recording the count anyway",
                style("!").yellow(),
                part.name,
                kind
            );
        }
        part.set_stage_qty(kind, next);
    }
}

fn prompt_progress(part: &mut Part) -> Result<()> {
    let theme = ColorfulTheme::default();
    let total = part
        .quantity
        .units()
        .map(|q| q.to_string())
        .unwrap_or_else(|| part.quantity.to_string());

    let stages: Vec<(StageKind, String)> = part
        .defined_stages()
        .map(|(kind, label)| (kind, label.to_string()))
        .collect();
    if stages.is_empty() {
        return Err(miette::miette!(
            "{} has no manufacturing stages to update",
            part.name
        ));
    }

    for (kind, label) in stages {
        let done: u32 = Input::with_theme(&theme)
            .with_prompt(format!("{} ({}) done, of {}", kind.title(), label, total))
            .default(part.stage_qty(kind))
            .interact_text()
            .into_diagnostic()?;
        part.set_stage_qty(kind, done);
    }
    Ok(())
}

pub fn run(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let mut part = session
        .store
        .find_part(&session.scope, &args.name)
        .cloned()
        .ok_or_else(|| {
            tracing::warn!(scope = %session.scope, part = %args.name, "part not found");
            StoreError::PartNotFound {
                name: args.name.clone(),
                scope: session.scope.clone(),
            }
        })?;

    if args.interactive {
        prompt_progress(&mut part)?;
    } else if args.has_edits() {
        apply_edits(&mut part, &args);
    } else {
        return Err(miette::miette!(
            help = "pass --pre/--p1/--p2, --add-pre/--add-p1/--add-p2, or --interactive",
            "Nothing to update"
        ));
    }

    let gateway = if args.no_sync { None } else { session.gateway() };
    let synced = match gateway {
        Some(gateway) => {
            let scope = session.scope.clone();
            Some(block_on(update_and_persist(
                &mut session.store,
                &gateway,
                &scope,
                part,
            ))?)
        }
        None => {
            session.store.update_part(&session.scope, part)?;
            session.store.save()?;
            None
        }
    };

    let synced = match synced {
        Some(Err(SyncError::Store(err))) => return Err(err.into()),
        other => other,
    };

    // A failed remote write leaves the local edit in place
    if let Some(updated) = session.store.find_part(&session.scope, &args.name) {
        let current = updated
            .state
            .current_process
            .as_deref()
            .map(|p| format!("next: {} ({} remaining)", p, updated.state.remaining))
            .unwrap_or_else(|| "all stages done".to_string());
        println!(
            "{} Updated {} ({})",
            style("✓").green(),
            style(&updated.name).cyan(),
            current
        );
    }

    match synced {
        Some(Ok(ack)) => {
            println!(
                "   Synced {} part(s) to remote at {}",
                ack.parts,
                ack.persisted_at.format("%H:%M:%S")
            );
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: UpdateArgs,
    }

    fn parse(argv: &[&str]) -> UpdateArgs {
        let mut full = vec!["rbt"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    fn shaft() -> Part {
        Part::new("Shaft", 5)
            .with_stage(StageKind::Process1, "Lathe")
            .with_progress(StageKind::Process1, 2)
    }

    #[test]
    fn test_absolute_edit() {
        let mut part = shaft();
        apply_edits(&mut part, &parse(&["Shaft", "--p1", "4"]));
        assert_eq!(part.process1_qty, 4);
    }

    #[test]
    fn test_increment_saturates_at_zero() {
        let mut part = shaft();
        apply_edits(&mut part, &parse(&["Shaft", "--add-p1", "-5"]));
        assert_eq!(part.process1_qty, 0);

        apply_edits(&mut part, &parse(&["Shaft", "--add-p1", "3"]));
        assert_eq!(part.process1_qty, 3);
    }

    #[test]
    fn test_set_and_add_conflict() {
        let result = TestCli::try_parse_from(["rbt", "Shaft", "--p1", "1", "--add-p1", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_edits() {
        assert!(!parse(&["Shaft"]).has_edits());
        assert!(parse(&["Shaft", "--add-pre", "1"]).has_edits());
    }
}
