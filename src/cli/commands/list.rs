//! `rbt list` command - filtered part listing

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::Session;
use crate::cli::filters::{SortField, StatusFilter};
use crate::cli::output::effective_format;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::filter::BomFilter;
use crate::core::process::part_status;
use crate::entities::{Part, StageKind};

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Name,
    Qty,
    Pre,
    P1,
    P2,
    Process,
    Remaining,
    Status,
    Material,
    Description,
    PartId,
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match self {
            ListColumn::Name => "name",
            ListColumn::Qty => "qty",
            ListColumn::Pre => "pre",
            ListColumn::P1 => "p1",
            ListColumn::P2 => "p2",
            ListColumn::Process => "process",
            ListColumn::Remaining => "remaining",
            ListColumn::Status => "status",
            ListColumn::Material => "material",
            ListColumn::Description => "description",
            ListColumn::PartId => "part-id",
        };
        write!(f, "{}", key)
    }
}

/// Column definitions for part list output
pub const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("name", "NAME", 28),
    ColumnDef::new("qty", "QTY", 6),
    ColumnDef::new("pre", "PRE-PROCESS", 18),
    ColumnDef::new("p1", "PROCESS 1", 18),
    ColumnDef::new("p2", "PROCESS 2", 18),
    ColumnDef::new("process", "CURRENT", 14),
    ColumnDef::new("remaining", "REMAINING", 9),
    ColumnDef::new("status", "STATUS", 11),
    ColumnDef::new("material", "MATERIAL", 20),
    ColumnDef::new("description", "DESCRIPTION", 30),
    ColumnDef::new("part-id", "PART ID", 12),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Criterion: All, COTS, InHouse, pre-process, process1, process2, or a
    /// machine name (remembered for next time)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Filter by progress status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Search part names (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Name,
        ListColumn::Qty,
        ListColumn::Pre,
        ListColumn::P1,
        ListColumn::P2,
        ListColumn::Process,
        ListColumn::Remaining,
    ])]
    pub columns: Vec<ListColumn>,

    /// Sort by field
    #[arg(long, default_value = "name")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Don't clip long cells
    #[arg(long)]
    pub full: bool,
}

/// Build the table row for an evaluated part
pub fn part_row(part: &Part) -> TableRow {
    let stage = |kind: StageKind| CellValue::Stage {
        stage: part.stage(kind).clone(),
        done: part.stage_qty(kind),
        of: part.quantity.units(),
    };

    TableRow::new(part.name.clone())
        .cell("name", CellValue::Text(part.name.clone()))
        .cell("qty", CellValue::Quantity(part.quantity.clone()))
        .cell("pre", stage(StageKind::PreProcess))
        .cell("p1", stage(StageKind::Process1))
        .cell("p2", stage(StageKind::Process2))
        .cell(
            "process",
            CellValue::Optional(part.state.current_process.clone()),
        )
        .cell("remaining", CellValue::Quantity(part.state.remaining.clone()))
        .cell("status", CellValue::Status(part_status(part)))
        .cell("material", CellValue::Optional(part.material.clone()))
        .cell("description", CellValue::Optional(part.description.clone()))
        .cell("part-id", CellValue::Optional(part.part_id.clone()))
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let criterion = session.filter(args.filter.as_deref());
    if let Some(token) = &args.filter {
        let token = BomFilter::parse(token).to_string();
        if session.store.current_filter() != Some(token.as_str()) {
            session.store.set_current_filter(token);
            session.store.save()?;
        }
    }

    if !session.store.contains(&session.scope) {
        eprintln!(
            "{} No BOM cached for {}. Run {} or {} first.",
            style("!").yellow(),
            session.scope,
            style("rbt pull").cyan(),
            style("rbt import <FILE>").cyan()
        );
    }

    let search = args.search.as_deref().map(str::to_lowercase);
    let mut parts: Vec<&Part> = criterion
        .apply(session.store.load(&session.scope))
        .into_iter()
        .filter(|p| args.status.matches_part(p))
        .filter(|p| {
            search
                .as_deref()
                .is_none_or(|s| p.name.to_lowercase().contains(s))
        })
        .collect();
    tracing::debug!(filter = %criterion, parts = parts.len(), "list");

    parts.sort_by(|a, b| args.sort.compare(a, b));
    if args.reverse {
        parts.reverse();
    }
    if let Some(limit) = args.limit {
        parts.truncate(limit);
    }

    if args.count {
        println!("{}", parts.len());
        return Ok(());
    }

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&parts).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&parts).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if parts.is_empty() && format == OutputFormat::Table {
                println!("No parts match {}.", style(&criterion).cyan());
                return Ok(());
            }
            let visible: Vec<String> = args.columns.iter().map(|c| c.to_string()).collect();
            let visible: Vec<&str> = visible.iter().map(String::as_str).collect();
            let rows: Vec<TableRow> = parts.iter().map(|p| part_row(p)).collect();
            TableFormatter::new(PART_COLUMNS, "part")
                .full_width(args.full)
                .output(&rows, format, &visible)?;
        }
    }

    Ok(())
}
