//! Core module - evaluation, filtering, storage and sync

pub mod config;
pub mod filter;
pub mod onshape;
pub mod process;
pub mod store;
pub mod sync;

pub use config::{Config, ConfigError};
pub use filter::{filter, is_cots, is_in_house, BomFilter};
pub use onshape::{import_file, parse_onshape_bom, ImportError};
pub use process::{evaluate, evaluate_all, part_status, refresh};
pub use store::{BomStore, Scope, StoreError};
pub use sync::{pull, push, update_and_persist, Ack, DirectoryGateway, SyncError, SyncGateway};
