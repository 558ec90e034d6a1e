//! Collision-safe relocation of files into destination folders.
//!
//! The [`Mover`] turns a [`FileRecord`] and a destination directory into a
//! [`DestinationPlan`] (sanitized name, lowercase extension, numeric suffix on
//! collision) and then moves, copies or merely previews the file. Every
//! per-file problem comes back as a [`TransferError`] so the caller can count
//! it and carry on with the next file.

use crate::file_category::extension_of;
use crate::naming::Naming;
use chrono::{DateTime, Datelike, Local};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// What the mover does with each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Relocate the file.
    #[default]
    Move,
    /// Duplicate the file, leaving the source in place.
    Copy,
    /// Log the intended move without touching the filesystem.
    DryRun,
    /// Log the intended copy without touching the filesystem.
    DryRunCopy,
}

impl Mode {
    /// Past-tense verb used in logs and reports.
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Move => "Moved",
            Mode::Copy => "Copied",
            Mode::DryRun => "Would move",
            Mode::DryRunCopy => "Would copy",
        }
    }

    /// Whether this mode only previews.
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mode::DryRun | Mode::DryRunCopy)
    }
}

/// A regular file found during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path of the file as found by the walker.
    pub path: PathBuf,
    /// Lowercase extension without the dot, empty when there is none.
    pub extension: String,
    /// Modification time, or creation time when the platform has no mtime.
    pub timestamp: Option<DateTime<Local>>,
    pub size: u64,
}

impl FileRecord {
    /// Reads metadata for `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let metadata = fs::metadata(&path)?;
        let timestamp = metadata
            .modified()
            .or_else(|_| metadata.created())
            .ok()
            .map(DateTime::<Local>::from);

        Ok(Self {
            extension: extension_of(&path),
            timestamp,
            size: metadata.len(),
            path,
        })
    }

    /// File name without the final extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Calendar year of the timestamp, in local time.
    pub fn year(&self) -> Option<i32> {
        self.timestamp.map(|ts| ts.year())
    }
}

/// Where a file is going to end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPlan {
    pub directory: PathBuf,
    /// Sanitized stem, before any collision suffix.
    pub stem: String,
    /// Lowercase extension, empty when the source has none.
    pub extension: String,
    /// Final, non-colliding path.
    pub path: PathBuf,
    /// Numeric suffix that was needed, 0 when the first candidate was free.
    pub collisions: u32,
}

impl DestinationPlan {
    fn file_name(stem: &str, suffix: u32, extension: &str) -> String {
        let mut name = if suffix == 0 {
            stem.to_string()
        } else {
            format!("{}_{}", stem, suffix)
        };
        if !extension.is_empty() {
            name.push('.');
            name.push_str(extension);
        }
        name
    }
}

/// Errors that can occur while relocating a single file.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move to {}: {source}", destination.display())]
    MoveFailed {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy to {}: {source}", destination.display())]
    CopyFailed {
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to read timestamp")]
    MissingTimestamp,
}

/// Why a file was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The extension is not handled by the active layout.
    UnknownType,
    /// The file already sits in a managed folder.
    AlreadyOrganized,
    /// Rejected by the hidden, filename, extension or pattern filters.
    Filtered,
    /// A symbolic link; links are never followed or moved.
    Symlink,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownType => write!(f, "unknown type"),
            SkipReason::AlreadyOrganized => write!(f, "already organized"),
            SkipReason::Filtered => write!(f, "filtered"),
            SkipReason::Symlink => write!(f, "symlink"),
        }
    }
}

/// Result of handling one file, as counted by the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Placed {
        source: PathBuf,
        destination: PathBuf,
        bucket: String,
    },
    Skipped {
        source: PathBuf,
        reason: SkipReason,
    },
    Failed {
        source: PathBuf,
        reason: String,
    },
}

/// Returns true when `a` and `b` name the same file on disk.
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Moves, copies or previews files without ever overwriting.
///
/// Destinations handed out during the run are remembered, so two sources
/// that sanitize to the same name get distinct suffixes even in dry-run mode
/// where nothing exists on disk yet.
#[derive(Debug, Default)]
pub struct Mover {
    mode: Mode,
    naming: Naming,
    claimed: HashSet<PathBuf>,
}

impl Mover {
    /// Creates a mover that keeps sanitized source names.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            naming: Naming::default(),
            claimed: HashSet::new(),
        }
    }

    /// Uses `naming` to derive destination stems.
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether `path` was produced by this mover earlier in the run.
    pub fn is_claimed(&self, path: &Path) -> bool {
        self.claimed.contains(path)
    }

    /// Computes the non-colliding destination for `record` in `directory`.
    ///
    /// A candidate is taken when something other than the source exists
    /// there, or when an earlier file in this run was assigned to it.
    pub fn plan(&self, record: &FileRecord, directory: &Path) -> DestinationPlan {
        let stem = self.naming.stem_for(record);
        let extension = record.extension.clone();

        let mut collisions = 0;
        let mut path = directory.join(DestinationPlan::file_name(&stem, 0, &extension));
        while self.is_taken(&path, &record.path) {
            collisions += 1;
            path = directory.join(DestinationPlan::file_name(&stem, collisions, &extension));
        }

        DestinationPlan {
            directory: directory.to_path_buf(),
            stem,
            extension,
            path,
            collisions,
        }
    }

    fn is_taken(&self, candidate: &Path, source: &Path) -> bool {
        if self.claimed.contains(candidate) {
            return true;
        }
        // symlink_metadata so a dangling link still counts as an occupant.
        fs::symlink_metadata(candidate).is_ok() && !is_same_file(candidate, source)
    }

    /// Places `record` into `directory` according to the mode and returns
    /// the final path.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shelve::file_organizer::{FileRecord, Mode, Mover};
    /// use std::path::Path;
    ///
    /// let mut mover = Mover::new(Mode::Move);
    /// let record = FileRecord::from_path("/data/inbox/Holiday Photo.JPG").unwrap();
    /// match mover.transfer(&record, Path::new("/data/04_Images")) {
    ///     Ok(dest) => println!("now at {}", dest.display()),
    ///     Err(e) => eprintln!("failed: {}", e),
    /// }
    /// ```
    pub fn transfer(
        &mut self,
        record: &FileRecord,
        directory: &Path,
    ) -> Result<PathBuf, TransferError> {
        if !self.mode.is_dry_run() {
            fs::create_dir_all(directory).map_err(|source| {
                TransferError::DirectoryCreationFailed {
                    path: directory.to_path_buf(),
                    source,
                }
            })?;
        }

        let plan = self.plan(record, directory);
        if plan.collisions > 0 {
            debug!(
                "Name collision for {}, using suffix _{}",
                record.path.display(),
                plan.collisions
            );
        }

        match self.mode {
            Mode::DryRun | Mode::DryRunCopy => {
                info!(
                    "[dry-run] {} {} -> {}",
                    self.mode.verb(),
                    record.path.display(),
                    plan.path.display()
                );
            }
            Mode::Move => {
                move_file(&record.path, &plan.path)?;
                debug!("Moved: {} -> {}", record.path.display(), plan.path.display());
            }
            Mode::Copy => {
                copy_file(&record.path, &plan.path)?;
                debug!("Copied: {} -> {}", record.path.display(), plan.path.display());
            }
        }

        self.claimed.insert(plan.path.clone());
        Ok(plan.path)
    }
}

fn move_file(source: &Path, destination: &Path) -> Result<(), TransferError> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Cross-device move for {}, copying instead",
                source.display()
            );
            copy_file(source, destination)?;
            fs::remove_file(source).map_err(|source| TransferError::MoveFailed {
                destination: destination.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(TransferError::MoveFailed {
            destination: destination.to_path_buf(),
            source,
        }),
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), TransferError> {
    if is_same_file(source, destination) {
        return Ok(());
    }

    let copy_failed = |e: io::Error| TransferError::CopyFailed {
        destination: destination.to_path_buf(),
        source: e,
    };

    fs::copy(source, destination).map_err(copy_failed)?;

    // Keep the original mtime so dated layouts stay stable on re-runs.
    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(copy_failed)?;
    File::options()
        .write(true)
        .open(destination)
        .and_then(|file| file.set_modified(modified))
        .map_err(copy_failed)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> FileRecord {
        let path = dir.join(name);
        fs::write(&path, content).expect("Failed to write test file");
        FileRecord::from_path(path).expect("Failed to read metadata")
    }

    #[test]
    fn test_file_record_reads_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "Photo.JPG", "12345");

        assert_eq!(record.extension, "jpg");
        assert_eq!(record.stem(), "Photo");
        assert_eq!(record.size, 5);
        assert!(record.year().is_some());
    }

    #[test]
    fn test_move_sanitizes_name_and_lowercases_extension() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "My Report (Final).PDF", "pdf");
        let target = temp_dir.path().join("docs");

        let mut mover = Mover::new(Mode::Move);
        let dest = mover.transfer(&record, &target).unwrap();

        assert_eq!(dest, target.join("my_report_final.pdf"));
        assert!(dest.exists());
        assert!(!record.path.exists());
    }

    #[test]
    fn test_collisions_get_incrementing_suffixes() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("a.txt"), "existing").unwrap();

        let src_one = temp_dir.path().join("one");
        let src_two = temp_dir.path().join("two");
        fs::create_dir(&src_one).unwrap();
        fs::create_dir(&src_two).unwrap();
        let first = write(&src_one, "A.txt", "first");
        let second = write(&src_two, "a.TXT", "second");

        let mut mover = Mover::new(Mode::Move);
        assert_eq!(mover.transfer(&first, &target).unwrap(), target.join("a_1.txt"));
        assert_eq!(mover.transfer(&second, &target).unwrap(), target.join("a_2.txt"));

        assert_eq!(fs::read_to_string(target.join("a.txt")).unwrap(), "existing");
        assert_eq!(fs::read_to_string(target.join("a_1.txt")).unwrap(), "first");
        assert_eq!(fs::read_to_string(target.join("a_2.txt")).unwrap(), "second");
    }

    #[test]
    fn test_file_already_in_place_is_not_a_collision() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "notes.txt", "same");

        let mover = Mover::new(Mode::Move);
        let plan = mover.plan(&record, temp_dir.path());
        assert_eq!(plan.collisions, 0);
        assert_eq!(plan.path, record.path);
    }

    #[test]
    fn test_file_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "Makefile", "all:");

        let mover = Mover::new(Mode::DryRun);
        let plan = mover.plan(&record, &temp_dir.path().join("misc"));
        assert_eq!(plan.extension, "");
        assert_eq!(plan.path.file_name().unwrap(), "makefile");
    }

    #[test]
    fn test_copy_keeps_source_and_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "keep.jpeg", "data");
        let target = temp_dir.path().join("copies");

        let mut mover = Mover::new(Mode::Copy);
        let dest = mover.transfer(&record, &target).unwrap();

        assert!(record.path.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "data");
        assert_eq!(
            fs::metadata(&dest).unwrap().modified().unwrap(),
            fs::metadata(&record.path).unwrap().modified().unwrap()
        );
    }

    #[test]
    fn test_dry_run_touches_nothing_but_claims_paths() {
        let temp_dir = TempDir::new().unwrap();
        let src_one = temp_dir.path().join("x");
        let src_two = temp_dir.path().join("y");
        fs::create_dir(&src_one).unwrap();
        fs::create_dir(&src_two).unwrap();
        let first = write(&src_one, "dup.txt", "1");
        let second = write(&src_two, "dup.txt", "2");
        let target = temp_dir.path().join("never_created");

        let mut mover = Mover::new(Mode::DryRun);
        let a = mover.transfer(&first, &target).unwrap();
        let b = mover.transfer(&second, &target).unwrap();

        assert_eq!(a, target.join("dup.txt"));
        assert_eq!(b, target.join("dup_1.txt"));
        assert!(mover.is_claimed(&a));
        assert!(!target.exists());
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[test]
    fn test_dry_run_copy_is_labelled_as_copy() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "keep.txt", "data");
        let target = temp_dir.path().join("never_created");

        let mut mover = Mover::new(Mode::DryRunCopy);
        let dest = mover.transfer(&record, &target).unwrap();

        assert_eq!(dest, target.join("keep.txt"));
        assert_eq!(Mode::DryRunCopy.verb(), "Would copy");
        assert!(Mode::DryRunCopy.is_dry_run());
        assert!(!target.exists());
        assert!(record.path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_occupant() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("docs");
        fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(temp_dir.path().join("nowhere"), target.join("a.txt")).unwrap();
        let record = write(temp_dir.path(), "a.txt", "payload");

        let mut mover = Mover::new(Mode::Move);
        let dest = mover.transfer(&record, &target).unwrap();

        assert_eq!(dest, target.join("a_1.txt"));
        assert!(fs::symlink_metadata(target.join("a.txt")).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(target.join("a_1.txt")).unwrap(), "payload");
    }

    #[test]
    fn test_dated_naming_renames_with_year_month() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "Party 20230115.JPG", "img");
        let target = temp_dir.path().join("out");

        let mut mover = Mover::new(Mode::Move).with_naming(Naming::Dated);
        let dest = mover.transfer(&record, &target).unwrap();
        assert_eq!(dest, target.join("2023-01-party.jpg"));
    }

    #[test]
    fn test_unwritable_destination_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "report.txt", "x");
        // A regular file where the directory should go.
        let blocked = temp_dir.path().join("blocked");
        fs::write(&blocked, "not a directory").unwrap();

        let mut mover = Mover::new(Mode::Move);
        let err = mover.transfer(&record, &blocked).unwrap_err();
        assert!(matches!(err, TransferError::DirectoryCreationFailed { .. }));
        assert!(record.path.exists());
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let record = write(temp_dir.path(), "gone.txt", "x");
        fs::remove_file(&record.path).unwrap();

        let mut mover = Mover::new(Mode::Move);
        let err = mover
            .transfer(&record, &temp_dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, TransferError::MoveFailed { .. }));
    }
}
