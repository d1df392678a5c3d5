//! Entity type definitions

pub mod machine;
pub mod part;

pub use machine::{CadFormat, Machine};
pub use part::{Part, PartStatus, ProcessState, Quantity, Stage, StageKind};
