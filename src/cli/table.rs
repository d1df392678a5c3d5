//! Tabular output for list commands
//!
//! Commands describe their columns once with [`ColumnDef`], build one
//! [`TableRow`] per item, and hand them to a [`TableFormatter`] which renders
//! the rows as TSV, CSV, Markdown, a boxed table, or bare keys.

use std::io::{self, Write};

use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{escape_md, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::{PartStatus, Quantity, Stage};

/// A column that can appear in list output
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A typed cell value
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Optional(Option<String>),
    Number(i64),
    Quantity(Quantity),
    /// A stage label with its progress, e.g. `Lathe 2/5`
    Stage {
        stage: Stage,
        done: u32,
        of: Option<i64>,
    },
    Status(PartStatus),
}

impl CellValue {
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Optional(s) => s.clone().unwrap_or_else(|| "-".to_string()),
            CellValue::Number(n) => n.to_string(),
            CellValue::Quantity(q) => q.to_string(),
            CellValue::Stage { stage, done, of } => match (stage.label(), of) {
                (None, _) => "-".to_string(),
                (Some(label), Some(of)) => format!("{} {}/{}", label, done, of),
                (Some(label), None) => format!("{} {}", label, done),
            },
            CellValue::Status(s) => s.to_string(),
        }
    }
}

/// One output row; `key` is what the `name` format prints
#[derive(Debug, Clone)]
pub struct TableRow {
    pub key: String,
    cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, column: &'static str, value: CellValue) -> Self {
        self.cells.push((column, value));
        self
    }

    fn get(&self, column: &str) -> String {
        self.cells
            .iter()
            .find(|(key, _)| *key == column)
            .map(|(_, value)| value.render())
            .unwrap_or_default()
    }
}

/// Renders rows for a fixed set of columns
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    noun: &'a str,
    truncate: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], noun: &'a str) -> Self {
        Self {
            columns,
            noun,
            truncate: true,
        }
    }

    /// Print cells in full instead of clipping to column width
    pub fn full_width(mut self, full: bool) -> Self {
        self.truncate = !full;
        self
    }

    fn visible_columns(&self, visible: &[&str]) -> Vec<&ColumnDef> {
        if visible.is_empty() {
            return self.columns.iter().collect();
        }
        visible
            .iter()
            .filter_map(|key| self.columns.iter().find(|c| c.key == *key))
            .collect()
    }

    /// Write rows to stdout in the given format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write(&mut out, rows, format, visible)
    }

    pub fn write<W: Write>(
        &self,
        out: &mut W,
        rows: &[TableRow],
        format: OutputFormat,
        visible: &[&str],
    ) -> Result<()> {
        let columns = self.visible_columns(visible);
        let clip = |value: String, col: &ColumnDef| {
            if self.truncate {
                truncate_str(&value, col.width)
            } else {
                value
            }
        };

        match format {
            OutputFormat::Name => {
                for row in rows {
                    writeln!(out, "{}", row.key).into_diagnostic()?;
                }
            }
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(&mut *out);
                writer
                    .write_record(columns.iter().map(|c| c.key))
                    .into_diagnostic()?;
                for row in rows {
                    writer
                        .write_record(columns.iter().map(|c| row.get(c.key)))
                        .into_diagnostic()?;
                }
                writer.flush().into_diagnostic()?;
            }
            OutputFormat::Tsv => {
                let header: Vec<_> = columns.iter().map(|c| c.header).collect();
                writeln!(out, "{}", header.join("\t")).into_diagnostic()?;
                for row in rows {
                    let cells: Vec<_> = columns
                        .iter()
                        .map(|c| row.get(c.key).replace(['\t', '\n'], " "))
                        .collect();
                    writeln!(out, "{}", cells.join("\t")).into_diagnostic()?;
                }
            }
            _ => {
                let mut builder = Builder::default();
                builder.push_record(columns.iter().map(|c| c.header.to_string()));
                for row in rows {
                    builder.push_record(columns.iter().map(|c| {
                        let value = clip(row.get(c.key), c);
                        if format == OutputFormat::Md {
                            escape_md(&value)
                        } else {
                            value
                        }
                    }));
                }
                let mut table = builder.build();
                if format == OutputFormat::Md {
                    table.with(Style::markdown());
                } else {
                    table.with(Style::rounded());
                }
                writeln!(out, "{}", table).into_diagnostic()?;
                if format != OutputFormat::Md {
                    let plural = if rows.len() == 1 { "" } else { "s" };
                    writeln!(out, "{} {}{} found", rows.len(), self.noun, plural)
                        .into_diagnostic()?;
                }
            }
        }
        Ok(())
    }
}
