//! shelve - sort files into folders without overwriting anything
//!
//! This library resolves file extensions to categories, sanitizes file names,
//! relocates files with collision-safe naming (move, copy or dry-run), walks
//! one or more roots and summarizes what happened per root.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod naming;
pub mod organizer;
pub mod output;
pub mod sanitize;
pub mod summary;
pub mod walker;

pub use config::{CompiledFilters, ConfigError, ShelveConfig};
pub use file_category::CategoryMap;
pub use file_organizer::{FileRecord, Mode, Mover, Outcome, TransferError};
pub use naming::Naming;
pub use organizer::{Layout, Organizer, RunOptions, ShelveError};
pub use sanitize::sanitize;
pub use summary::RunStats;
pub use walker::{RootWalker, WalkItem};

pub use cli::{Args, run_cli};
