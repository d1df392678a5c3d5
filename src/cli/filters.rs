//! Filter and sort enums for CLI commands

use std::cmp::Ordering;

use clap::ValueEnum;

use crate::core::process::part_status;
use crate::entities::{Part, PartStatus};

/// Status filter for list commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// No progress recorded yet
    NotStarted,
    /// Some progress, not finished
    InProgress,
    /// Every stage complete
    Completed,
    /// Anything not completed
    Open,
    /// All statuses - default
    #[default]
    All,
}

impl StatusFilter {
    /// Check if a PartStatus matches this filter
    pub fn matches(&self, status: PartStatus) -> bool {
        match self {
            StatusFilter::NotStarted => status == PartStatus::NotStarted,
            StatusFilter::InProgress => status == PartStatus::InProgress,
            StatusFilter::Completed => status == PartStatus::Completed,
            StatusFilter::Open => status != PartStatus::Completed,
            StatusFilter::All => true,
        }
    }

    /// Check an evaluated part
    pub fn matches_part(&self, part: &Part) -> bool {
        self.matches(part_status(part))
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::NotStarted => write!(f, "not-started"),
            StatusFilter::InProgress => write!(f, "in-progress"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Open => write!(f, "open"),
            StatusFilter::All => write!(f, "all"),
        }
    }
}

/// Sort keys for part lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SortField {
    /// Part name
    #[default]
    Name,
    /// Units remaining at the current stage (most first)
    Remaining,
    /// Current process label
    Process,
    /// Keep BOM order
    None,
}

impl SortField {
    /// Compare two evaluated parts by this key
    pub fn compare(&self, a: &Part, b: &Part) -> Ordering {
        match self {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Remaining => {
                let units = |p: &Part| p.state.remaining.units().unwrap_or(i64::MIN);
                units(b).cmp(&units(a)).then_with(|| a.name.cmp(&b.name))
            }
            SortField::Process => {
                // Parts with nothing left to do go last
                let key = |p: &Part| {
                    let process = p.state.current_process.as_deref();
                    (process.is_none(), process.map(str::to_lowercase))
                };
                key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
            }
            SortField::None => Ordering::Equal,
        }
    }
}
