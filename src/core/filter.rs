//! BOM filtering by part type, manufacturing stage, or machine
//!
//! Filters operate on evaluated parts (see `core::process`) and never
//! re-derive state themselves. Ordering of the input is preserved; sorting is
//! left to the caller.

use std::convert::Infallible;

use crate::entities::part::{Part, StageKind};

/// Criterion used to slice a BOM
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BomFilter {
    /// Every part
    #[default]
    All,
    /// Commercial off-the-shelf parts (no manufacturing stages)
    Cots,
    /// Parts made in-house (at least one stage)
    InHouse,
    /// Parts waiting on a specific stage
    Stage(StageKind),
    /// Parts currently queued for a machine, matched case-insensitively
    /// against stage labels
    Machine(String),
}

impl BomFilter {
    /// Parse a criterion token
    ///
    /// Tokens are trimmed and case-insensitive; anything that is not a
    /// reserved token is treated as a machine name.
    pub fn parse(token: &str) -> Self {
        let normalized = token.trim().to_lowercase();
        match normalized.as_str() {
            "all" => BomFilter::All,
            "cots" => BomFilter::Cots,
            "inhouse" => BomFilter::InHouse,
            "pre-process" => BomFilter::Stage(StageKind::PreProcess),
            "process1" => BomFilter::Stage(StageKind::Process1),
            "process2" => BomFilter::Stage(StageKind::Process2),
            _ => BomFilter::Machine(token.trim().to_string()),
        }
    }

    /// Check if an evaluated part matches this criterion
    pub fn matches(&self, part: &Part) -> bool {
        match self {
            BomFilter::All => true,
            BomFilter::Cots => is_cots(part),
            BomFilter::InHouse => is_in_house(part),
            BomFilter::Stage(kind) => is_stage_active(part, *kind),
            BomFilter::Machine(name) => is_queued_for_machine(part, name),
        }
    }

    /// Select the matching parts, preserving input order
    pub fn apply<'a>(&self, parts: &'a [Part]) -> Vec<&'a Part> {
        parts.iter().filter(|p| self.matches(p)).collect()
    }
}

impl std::str::FromStr for BomFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(BomFilter::parse(s))
    }
}

impl std::fmt::Display for BomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFilter::All => write!(f, "All"),
            BomFilter::Cots => write!(f, "COTS"),
            BomFilter::InHouse => write!(f, "InHouse"),
            BomFilter::Stage(kind) => write!(f, "{}", kind),
            BomFilter::Machine(name) => write!(f, "{}", name),
        }
    }
}

/// Filter a BOM by criterion
pub fn filter<'a>(parts: &'a [Part], criterion: &BomFilter) -> Vec<&'a Part> {
    criterion.apply(parts)
}

/// A part with no manufacturing stages at all
pub fn is_cots(part: &Part) -> bool {
    StageKind::ALL.iter().all(|k| part.stage(*k).is_undefined())
}

/// A part with at least one manufacturing stage
pub fn is_in_house(part: &Part) -> bool {
    !is_cots(part)
}

/// Whether a stage is finished or not needed, as far as later stages care
fn stage_satisfied(part: &Part, kind: StageKind) -> bool {
    part.stage(kind).is_undefined() || part.state.completed(kind)
}

/// Whether every stage ahead of `kind` lets it start
pub fn stage_gate_open(part: &Part, kind: StageKind) -> bool {
    match kind {
        StageKind::PreProcess => true,
        StageKind::Process1 => stage_satisfied(part, StageKind::PreProcess),
        StageKind::Process2 if part.process1.is_defined() => part.state.process1_completed,
        StageKind::Process2 => stage_satisfied(part, StageKind::PreProcess),
    }
}

/// Whether a part is waiting on `kind`: the stage is defined, unlocked by
/// its predecessors, and not yet complete
pub fn is_stage_active(part: &Part, kind: StageKind) -> bool {
    part.stage(kind).is_defined()
        && stage_gate_open(part, kind)
        && !part.state.completed(kind)
}

/// Whether a part is waiting on the named machine
///
/// Only the first stage whose label names the machine is considered.
pub fn is_queued_for_machine(part: &Part, machine: &str) -> bool {
    StageKind::ALL
        .into_iter()
        .find(|k| part.stage(*k).matches_machine(machine))
        .is_some_and(|k| is_stage_active(part, k))
}
