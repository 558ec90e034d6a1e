//! Recursive enumeration of the files to organize.

use crate::config::CompiledFilters;
use crate::file_organizer::{FileRecord, SkipReason};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One item produced by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkItem {
    /// A regular file to hand to the mover.
    File(FileRecord),
    /// A file whose parent folder is one of the managed folders.
    AlreadyOrganized(PathBuf),
    /// A file left alone by the filters, or a symbolic link.
    Skipped { path: PathBuf, reason: SkipReason },
    /// An entry that could not be read.
    Unreadable { path: PathBuf, reason: String },
}

/// Walks roots, pruning excluded paths and flagging already organized files.
#[derive(Debug, Clone, Default)]
pub struct RootWalker {
    excluded: Vec<PathBuf>,
    managed_dirs: HashSet<String>,
    filters: CompiledFilters,
}

impl RootWalker {
    /// Creates a walker.
    ///
    /// * `excluded` - paths pruned from the walk, together with everything
    ///   below them
    /// * `managed_dirs` - folder names whose direct children count as
    ///   already organized
    /// * `filters` - per-file include/exclude rules, matched against the
    ///   path relative to the root
    pub fn new(
        excluded: Vec<PathBuf>,
        managed_dirs: HashSet<String>,
        filters: CompiledFilters,
    ) -> Self {
        Self {
            excluded,
            managed_dirs,
            filters,
        }
    }

    /// Adds a path to prune.
    pub fn exclude(&mut self, path: PathBuf) {
        self.excluded.push(path);
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excluded.iter().any(|ex| path.starts_with(ex))
    }

    fn in_managed_dir(&self, path: &Path) -> bool {
        path.parent()
            .and_then(Path::file_name)
            .is_some_and(|name| self.managed_dirs.contains(name.to_string_lossy().as_ref()))
    }

    /// Enumerates files under a single root.
    ///
    /// Returns `None` (after logging a warning) when the root does not exist.
    /// The iterator is lazy: entries are read as it is advanced.
    pub fn walk_root<'a>(&'a self, root: &'a Path) -> Option<impl Iterator<Item = WalkItem> + 'a> {
        if !root.is_dir() {
            warn!("Source root not found, skipping: {}", root.display());
            return None;
        }

        let entries = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| {
                let keep = !self.is_excluded(entry.path());
                if !keep {
                    debug!("Excluded: {}", entry.path().display());
                }
                keep
            });

        Some(entries.filter_map(move |entry| match entry {
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                warn!("Cannot read {}: {}", path.display(), e);
                Some(WalkItem::Unreadable {
                    path,
                    reason: e.to_string(),
                })
            }
            Ok(entry) if entry.file_type().is_dir() => None,
            Ok(entry) => {
                let is_symlink = entry.path_is_symlink();
                let is_file = entry.file_type().is_file();
                let path = entry.into_path();
                let relative = path.strip_prefix(root).unwrap_or(&path);
                if !self.filters.should_include(relative) {
                    return Some(WalkItem::Skipped {
                        path,
                        reason: SkipReason::Filtered,
                    });
                }
                if is_symlink {
                    return Some(WalkItem::Skipped {
                        path,
                        reason: SkipReason::Symlink,
                    });
                }
                // Sockets, fifos and device nodes.
                if !is_file {
                    return None;
                }
                if self.in_managed_dir(&path) {
                    return Some(WalkItem::AlreadyOrganized(path));
                }
                Some(match FileRecord::from_path(&path) {
                    Ok(record) => WalkItem::File(record),
                    Err(e) => WalkItem::Unreadable {
                        path,
                        reason: e.to_string(),
                    },
                })
            }
        }))
    }

    /// Enumerates files under every root in turn, skipping missing ones.
    pub fn walk<'a>(&'a self, roots: &'a [PathBuf]) -> impl Iterator<Item = WalkItem> + 'a {
        roots
            .iter()
            .filter_map(move |root| self.walk_root(root))
            .flatten()
    }
}
