//! Per-root driver that ties the walker, resolver and mover together.
//!
//! An [`Organizer`] is built once per invocation from the configuration and
//! the command-line options. Construction performs every fatal precondition
//! check; after that, [`Organizer::organize_root`] never fails as a whole and
//! reports per-file problems through [`RunStats`].

use crate::config::{ConfigError, ShelveConfig};
use crate::file_category::CategoryMap;
use crate::file_organizer::{FileRecord, Mode, Mover, Outcome, SkipReason};
use crate::naming::Naming;
use crate::summary::RunStats;
use crate::walker::{RootWalker, WalkItem};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How destination folders are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// `<base>/<category>/`, base being the destination or the root itself.
    #[default]
    Category,
    /// `<destination>/<year>/<extension>/`, media extensions only.
    Dated,
}

/// Errors that abort a run before any file is touched.
#[derive(Debug, Error)]
pub enum ShelveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Destination {} is not available: its parent directory does not exist", .0.display())]
    DestinationUnready(PathBuf),

    #[error("Cannot create destination {}: {source}", path.display())]
    DestinationCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The dated layout needs a destination directory")]
    MissingDestination,
}

/// Options that come from the command line rather than the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub layout: Layout,
    pub destination: Option<PathBuf>,
    pub mode: Mode,
    pub naming: Naming,
    pub excluded: Vec<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub create_skeleton: bool,
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Checks that the destination can be used and creates it.
///
/// A destination whose parent is missing usually means an unmounted volume,
/// which must stop the run instead of silently creating a directory tree.
fn prepare_destination(destination: &Path, mode: Mode) -> Result<PathBuf, ShelveError> {
    if !destination.is_dir() {
        let parent_ready = destination
            .parent()
            .is_some_and(|parent| parent.as_os_str().is_empty() || parent.is_dir());
        if !parent_ready {
            return Err(ShelveError::DestinationUnready(destination.to_path_buf()));
        }
        if !mode.is_dry_run() {
            fs::create_dir(destination).map_err(|source| {
                ShelveError::DestinationCreateFailed {
                    path: destination.to_path_buf(),
                    source,
                }
            })?;
        }
    }
    Ok(absolute(destination))
}

pub struct Organizer {
    categories: CategoryMap,
    skeleton: Vec<String>,
    dated_extensions: HashSet<String>,
    layout: Layout,
    destination: Option<PathBuf>,
    create_skeleton: bool,
    walker: RootWalker,
    mover: Mover,
    progress: ProgressBar,
}

impl Organizer {
    /// Validates the configuration and options and prepares the destination.
    pub fn new(config: &ShelveConfig, options: RunOptions) -> Result<Self, ShelveError> {
        let categories = config.category_map()?;
        let skeleton = config.skeleton_folders()?;
        let filters = config.compile_filters()?;

        let destination = match &options.destination {
            Some(dest) => Some(prepare_destination(dest, options.mode)?),
            None if options.layout == Layout::Dated => {
                return Err(ShelveError::MissingDestination);
            }
            None => None,
        };

        let mut excluded: Vec<PathBuf> = config
            .filters
            .exclude
            .paths
            .iter()
            .chain(&options.excluded)
            .map(|p| absolute(p))
            .collect();
        if let Some(log_file) = &options.log_file {
            excluded.push(absolute(log_file));
        }

        let managed_dirs = match options.layout {
            Layout::Category => categories
                .names()
                .map(str::to_string)
                .chain(skeleton.iter().cloned())
                .collect(),
            Layout::Dated => HashSet::new(),
        };

        Ok(Self {
            dated_extensions: config.dated_extensions(),
            layout: options.layout,
            create_skeleton: options.create_skeleton && config.create_skeleton,
            walker: RootWalker::new(excluded, managed_dirs, filters),
            mover: Mover::new(options.mode).with_naming(options.naming),
            progress: ProgressBar::hidden(),
            categories,
            skeleton,
            destination,
        })
    }

    /// Reports progress on `progress` instead of the default hidden bar.
    pub fn set_progress(&mut self, progress: ProgressBar) {
        self.progress = progress;
    }

    pub fn mode(&self) -> Mode {
        self.mover.mode()
    }

    /// Organizes one root and returns its counts, or `None` when the root
    /// does not exist.
    pub fn organize_root(&mut self, root: &Path) -> Option<RunStats> {
        let root = absolute(root);
        if !root.is_dir() {
            warn!("Source root not found, skipping: {}", root.display());
            return None;
        }
        info!("Processing root: {}", root.display());

        let base = self.destination.clone().unwrap_or_else(|| root.clone());
        let walker = self.walker_for(&root);

        if self.layout == Layout::Category && self.create_skeleton && !self.mode().is_dry_run()
        {
            self.ensure_directories(&base);
        }

        let mut stats = RunStats::new(self.mode());
        for item in walker.walk_root(&root)? {
            self.progress.inc(1);
            let outcome = match item {
                // Placed earlier in this run.
                WalkItem::File(record) if self.mover.is_claimed(&record.path) => continue,
                WalkItem::AlreadyOrganized(path) if self.mover.is_claimed(&path) => continue,
                WalkItem::File(record) => self.place(&record, &base),
                WalkItem::AlreadyOrganized(path) => {
                    debug!("Skipped (already organized): {}", path.display());
                    Outcome::Skipped {
                        source: path,
                        reason: SkipReason::AlreadyOrganized,
                    }
                }
                WalkItem::Skipped { path, reason } => {
                    debug!("Skipped ({}): {}", reason, path.display());
                    Outcome::Skipped {
                        source: path,
                        reason,
                    }
                }
                WalkItem::Unreadable { path, reason } => {
                    warn!("Failed: {} - Error: {}", path.display(), reason);
                    Outcome::Failed {
                        source: path,
                        reason,
                    }
                }
            };
            stats.record(&outcome);
        }

        if stats.placed() == 0 {
            info!("No files required changes under {}", root.display());
        }
        info!("Summary for {}: {}", root.display(), stats);
        Some(stats)
    }

    /// Organizes every root in turn. Missing roots are skipped.
    pub fn run(&mut self, roots: &[PathBuf]) -> Vec<(PathBuf, RunStats)> {
        roots
            .iter()
            .filter_map(|root| {
                self.organize_root(root)
                    .map(|stats| (root.clone(), stats))
            })
            .collect()
    }

    /// The destination is pruned from the walk when it lives inside the
    /// root, so a run never re-reads its own output.
    fn walker_for(&self, root: &Path) -> RootWalker {
        let mut walker = self.walker.clone();
        if let Some(dest) = &self.destination
            && dest != root
            && dest.starts_with(root)
        {
            walker.exclude(dest.clone());
        }
        walker
    }

    fn ensure_directories(&self, base: &Path) {
        for folder in self.categories.names().chain(self.skeleton.iter().map(String::as_str)) {
            let dir = base.join(folder);
            if let Err(e) = fs::create_dir_all(&dir) {
                warn!("Could not create {}: {}", dir.display(), e);
            }
        }
    }

    fn place(&mut self, record: &FileRecord, base: &Path) -> Outcome {
        let (bucket, directory) = match self.layout {
            Layout::Category => {
                let category = self.categories.resolve(&record.extension).to_string();
                let directory = base.join(&category);
                (category, directory)
            }
            Layout::Dated => {
                if !self.dated_extensions.contains(&record.extension) {
                    debug!("Skipped (unknown type): {}", record.path.display());
                    return Outcome::Skipped {
                        source: record.path.clone(),
                        reason: SkipReason::UnknownType,
                    };
                }
                let Some(year) = record.year() else {
                    warn!(
                        "Failed: {} - Error: Unable to read timestamp",
                        record.path.display()
                    );
                    return Outcome::Failed {
                        source: record.path.clone(),
                        reason: "Unable to read timestamp".to_string(),
                    };
                };
                let ext_folder = if record.extension.is_empty() {
                    "other"
                } else {
                    record.extension.as_str()
                };
                (
                    format!("{}/{}", year, ext_folder),
                    base.join(year.to_string()).join(ext_folder),
                )
            }
        };

        match self.mover.transfer(record, &directory) {
            Ok(destination) => Outcome::Placed {
                source: record.path.clone(),
                destination,
                bucket,
            },
            Err(e) => {
                warn!("Failed: {} - Error: {}", record.path.display(), e);
                Outcome::Failed {
                    source: record.path.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}
