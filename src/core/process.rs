//! Process state evaluation
//!
//! Computes a part's derived manufacturing state from its required quantity,
//! stage labels and per-stage progress counts. Evaluation is total: a quantity
//! that does not parse is a normal input and leaves every completion flag
//! false, including those of undefined stages. Undefined stages are still
//! skipped when picking the active stage.

use crate::entities::part::{Part, PartStatus, ProcessState, Quantity, StageKind};

/// Evaluate a part, returning it with its derived state recomputed
pub fn evaluate(mut part: Part) -> Part {
    refresh(&mut part);
    part
}

/// Recompute a part's derived state in place
///
/// Only `part.state` is written; identity, quantity, labels and progress
/// counts are left untouched.
pub fn refresh(part: &mut Part) {
    part.state = compute_state(part);
}

/// Recompute derived state for every part in a collection
pub fn evaluate_all(parts: &mut [Part]) {
    parts.iter_mut().for_each(refresh);
}

/// Derived state for a part, without modifying it
pub fn compute_state(part: &Part) -> ProcessState {
    let required = part.quantity.units();
    let mut state = ProcessState {
        quantity_valid: required.is_some(),
        ..ProcessState::default()
    };

    for kind in StageKind::ALL {
        // An undefined stage never blocks progress, but nothing counts as
        // complete against a quantity that does not parse
        let completed = match required {
            Some(req) => {
                part.stage(kind).is_undefined() || i64::from(part.stage_qty(kind)) >= req
            }
            None => false,
        };
        state.set_completed(kind, completed);
    }

    let active = StageKind::ALL
        .into_iter()
        .find_map(|k| match part.stage(k).label() {
            Some(label) if !state.completed(k) => Some((k, label)),
            _ => None,
        });

    match active {
        Some((kind, label)) => {
            state.current_process = Some(label.to_string());
            state.remaining = match required {
                Some(req) => Quantity::Count(req - i64::from(part.stage_qty(kind))),
                None => part.quantity.clone(),
            };
        }
        None => {
            state.current_process = None;
            state.remaining = Quantity::Count(0);
        }
    }

    state
}

/// The active stage of an evaluated part, if any
pub fn active_stage(part: &Part) -> Option<StageKind> {
    StageKind::ALL
        .into_iter()
        .find(|k| part.stage(*k).is_defined() && !part.state.completed(*k))
}

/// Overall progress of an evaluated part
///
/// A part with no recorded progress at all is not started, even when it
/// has nothing to manufacture.
pub fn part_status(part: &Part) -> PartStatus {
    let not_started = StageKind::ALL.iter().all(|k| part.stage_qty(*k) == 0);
    if not_started {
        PartStatus::NotStarted
    } else if part.state.all_completed() {
        PartStatus::Completed
    } else {
        PartStatus::InProgress
    }
}
