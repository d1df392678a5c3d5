//! `rbt show` command - part details

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::{is_cots, is_stage_active};
use crate::core::process::{active_stage, part_status};
use crate::core::store::StoreError;
use crate::entities::{Part, PartStatus, StageKind};

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part name (exact)
    pub name: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let part = session
        .store
        .find_part(&session.scope, &args.name)
        .ok_or_else(|| StoreError::PartNotFound {
            name: args.name.clone(),
            scope: session.scope.clone(),
        })?;

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(part).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(part).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Name => println!("{}", part.name),
        _ => print_details(part),
    }
    Ok(())
}

fn print_details(part: &Part) {
    let status = part_status(part);
    let status_styled = match status {
        PartStatus::NotStarted => style(status.to_string()).red(),
        PartStatus::InProgress => style(status.to_string()).yellow(),
        PartStatus::Completed => style(status.to_string()).green(),
    };

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Part").bold(), style(&part.name).yellow());
    println!("{}: {}", style("Quantity").bold(), part.quantity);
    println!("{}: {}", style("Status").bold(), status_styled);
    if let Some(id) = &part.part_id {
        println!("{}: {}", style("Part ID").bold(), style(id).cyan());
    }
    println!("{}", style("─".repeat(60)).dim());

    if is_cots(part) {
        println!();
        println!("{}", style("COTS part (no manufacturing stages)").dim());
    } else {
        println!();
        println!("{}:", style("Stages").bold());
        for kind in StageKind::ALL {
            let Some(label) = part.stage(kind).label() else {
                continue;
            };
            let marker = if part.state.completed(kind) {
                style("✓").green()
            } else if is_stage_active(part, kind) {
                style("▶").yellow()
            } else {
                style("·").dim()
            };
            let total = part
                .quantity
                .units()
                .map(|q| q.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  {} {:<12} {:<20} {}/{}",
                marker,
                kind.title(),
                label,
                part.stage_qty(kind),
                total
            );
        }
    }

    println!();
    match (&part.state.current_process, active_stage(part)) {
        (Some(process), Some(kind)) => println!(
            "{}: {} at {} ({} remaining)",
            style("Current").bold(),
            style(process).cyan(),
            kind.title(),
            part.state.remaining
        ),
        _ => println!("{}: {}", style("Current").bold(), style("done").green()),
    }
    if !part.state.quantity_valid {
        println!(
            "{} Quantity '{}' is not a number; no stage can complete",
            style("!").yellow(),
            part.quantity
        );
    }

    if let Some(material) = &part.material {
        println!("{}: {}", style("Material").bold(), material);
    }
    let material_bom = part
        .material_bom
        .as_ref()
        .filter(|m| part.material.as_ref() != Some(*m));
    if let Some(material_bom) = material_bom {
        println!("{}: {}", style("BOM Material").bold(), material_bom);
    }
    if let Some(description) = &part.description {
        println!();
        println!("{}", description);
    }
}
