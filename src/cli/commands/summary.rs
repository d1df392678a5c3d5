//! `rbt summary` command - BOM counts by type and status

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::{is_cots, is_stage_active};
use crate::core::process::part_status;
use crate::core::store::Scope;
use crate::entities::{Part, PartStatus, StageKind};

/// Counts for one scope
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BomSummary {
    pub scope: Option<Scope>,
    pub parts: usize,
    pub cots: usize,
    pub in_house: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub invalid_quantity: usize,
    pub pre_process_active: usize,
    pub process1_active: usize,
    pub process2_active: usize,
}

impl BomSummary {
    pub fn of(parts: &[Part]) -> Self {
        let mut summary = Self {
            parts: parts.len(),
            ..Self::default()
        };
        for part in parts {
            if is_cots(part) {
                summary.cots += 1;
            } else {
                summary.in_house += 1;
            }
            match part_status(part) {
                PartStatus::NotStarted => summary.not_started += 1,
                PartStatus::InProgress => summary.in_progress += 1,
                PartStatus::Completed => summary.completed += 1,
            }
            if !part.state.quantity_valid {
                summary.invalid_quantity += 1;
            }
            for kind in StageKind::ALL {
                if is_stage_active(part, kind) {
                    *summary.active_mut(kind) += 1;
                }
            }
        }
        summary
    }

    fn active_mut(&mut self, kind: StageKind) -> &mut usize {
        match kind {
            StageKind::PreProcess => &mut self.pre_process_active,
            StageKind::Process1 => &mut self.process1_active,
            StageKind::Process2 => &mut self.process2_active,
        }
    }
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let summary = BomSummary {
        scope: Some(session.scope.clone()),
        ..BomSummary::of(session.store.load(&session.scope))
    };

    match global.output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&summary).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&summary).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            println!("{}", style(format!("BOM Summary: {}", session.scope)).bold());
            println!("{}", style("═".repeat(50)).dim());
            println!("  Parts:        {}", summary.parts);
            println!("  In-house:     {}", summary.in_house);
            println!("  COTS:         {}", summary.cots);
            println!();
            println!("  Not started:  {}", style(summary.not_started).red());
            println!("  In progress:  {}", style(summary.in_progress).yellow());
            println!("  Completed:    {}", style(summary.completed).green());
            println!();
            println!("  Waiting on pre-process: {}", summary.pre_process_active);
            println!("  Waiting on process 1:   {}", summary.process1_active);
            println!("  Waiting on process 2:   {}", summary.process2_active);
            if summary.invalid_quantity > 0 {
                println!();
                println!(
                    "{} {} part(s) have a non-numeric quantity",
                    style("!").yellow(),
                    summary.invalid_quantity
                );
            }
        }
    }
    Ok(())
}
