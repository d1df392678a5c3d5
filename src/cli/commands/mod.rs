//! CLI command implementations

pub mod clear;
pub mod completions;
pub mod import;
pub mod init;
pub mod list;
pub mod machines;
pub mod scopes;
pub mod show;
pub mod summary;
pub mod sync;
pub mod update;
pub mod utils;
