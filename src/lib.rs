//! RBT: Robot BOM Tracker
//!
//! Tracks the manufacturing progress of a robot's parts through up to three
//! ordered stages and slices the BOM by part type, stage, or machine.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
