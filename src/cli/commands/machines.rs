//! `rbt machines` command - work queued per machine

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::Session;
use crate::cli::output::effective_format;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::BomFilter;
use crate::entities::{CadFormat, Machine, Part};

#[derive(clap::Args, Debug)]
pub struct MachinesArgs {
    /// Only show machines with queued parts
    #[arg(long)]
    pub busy: bool,
}

/// Parts waiting on one machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineQueue {
    pub machine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<CadFormat>,
    pub parts: Vec<String>,
    /// Units left across queued parts with a numeric quantity
    pub units: i64,
}

const MACHINE_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("machine", "MACHINE", 18),
    ColumnDef::new("format", "FORMAT", 9),
    ColumnDef::new("queued", "QUEUED", 6),
    ColumnDef::new("units", "UNITS", 6),
    ColumnDef::new("parts", "PARTS", 40),
];

/// Queues for the configured machines plus any machine named in the BOM
///
/// Configured machines come first in roster order, then BOM-only labels in
/// order of first appearance. Labels are deduplicated case-insensitively.
pub fn machine_queues(parts: &[Part], roster: &[Machine]) -> Vec<MachineQueue> {
    let mut names: Vec<(String, Option<CadFormat>)> = roster
        .iter()
        .map(|m| (m.name.clone(), Some(m.output_format)))
        .collect();
    for part in parts {
        for (_, label) in part.defined_stages() {
            if !names.iter().any(|(n, _)| n.eq_ignore_ascii_case(label)) {
                names.push((label.to_string(), None));
            }
        }
    }

    names
        .into_iter()
        .map(|(machine, output_format)| {
            let queued = BomFilter::Machine(machine.clone()).apply(parts);
            MachineQueue {
                units: queued
                    .iter()
                    .filter_map(|p| p.state.remaining.units())
                    .sum(),
                parts: queued.iter().map(|p| p.name.clone()).collect(),
                machine,
                output_format,
            }
        })
        .collect()
}

pub fn run(args: MachinesArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let mut queues = machine_queues(
        session.store.load(&session.scope),
        &session.config.machines,
    );
    if args.busy {
        queues.retain(|q| !q.parts.is_empty());
    }

    if queues.is_empty() {
        println!(
            "No machines configured or referenced in {}.",
            style(&session.scope).cyan()
        );
        return Ok(());
    }

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&queues).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&queues).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            let rows: Vec<TableRow> = queues
                .iter()
                .map(|q| {
                    TableRow::new(q.machine.clone())
                        .cell("machine", CellValue::Text(q.machine.clone()))
                        .cell(
                            "format",
                            CellValue::Optional(q.output_format.map(|f| f.to_string())),
                        )
                        .cell("queued", CellValue::Number(q.parts.len() as i64))
                        .cell("units", CellValue::Number(q.units))
                        .cell("parts", CellValue::Text(q.parts.join(", ")))
                })
                .collect();
            TableFormatter::new(MACHINE_COLUMNS, "machine").output(&rows, format, &[])?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::evaluate;
    use crate::entities::StageKind;

    fn parts() -> Vec<Part> {
        vec![
            evaluate(
                Part::new("Shaft", 5)
                    .with_stage(StageKind::Process1, "Lathe")
                    .with_progress(StageKind::Process1, 2),
            ),
            evaluate(
                Part::new("Plate", 4)
                    .with_stage(StageKind::PreProcess, "laser")
                    .with_stage(StageKind::Process1, "CNC"),
            ),
            evaluate(
                Part::new("Spacer", 10)
                    .with_stage(StageKind::Process1, "Lathe")
                    .with_progress(StageKind::Process1, 9),
            ),
        ]
    }

    #[test]
    fn test_roster_first_then_bom_labels() {
        let roster = vec![
            Machine::new("Laser", CadFormat::Dxf),
            Machine::new("Mill", CadFormat::Step),
        ];
        let queues = machine_queues(&parts(), &roster);
        let names: Vec<_> = queues.iter().map(|q| q.machine.as_str()).collect();
        assert_eq!(names, vec!["Laser", "Mill", "Lathe", "CNC"]);

        let laser = &queues[0];
        assert_eq!(laser.output_format, Some(CadFormat::Dxf));
        assert_eq!(laser.parts, vec!["Plate"]);
        assert_eq!(laser.units, 4);

        let lathe = &queues[2];
        assert_eq!(lathe.output_format, None);
        assert_eq!(lathe.parts, vec!["Shaft", "Spacer"]);
        assert_eq!(lathe.units, 4);

        // Gated behind the laser
        assert!(queues[3].parts.is_empty());
        assert!(queues[1].parts.is_empty());
    }
}
