//! Command-line interface module for shelve.
//!
//! Parses arguments, loads configuration, runs the [`Organizer`] over every
//! root and prints the per-root and combined summaries.

use crate::config::ShelveConfig;
use crate::file_organizer::Mode;
use crate::naming::Naming;
use crate::organizer::{Layout, Organizer, RunOptions, ShelveError};
use crate::output::OutputFormatter;
use crate::summary::RunStats;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Destination layout selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    /// Sort into extension-based category folders
    Category,
    /// Sort media into <destination>/<year>/<extension> folders
    Dated,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Category => Layout::Category,
            LayoutArg::Dated => Layout::Dated,
        }
    }
}

/// File-name scheme selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    /// Keep the source name, sanitized
    Sanitized,
    /// Rename to YYYY-MM-description
    Dated,
}

impl From<NamingArg> for Naming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Sanitized => Naming::Sanitized,
            NamingArg::Dated => Naming::Dated,
        }
    }
}

/// Command-line arguments for shelve.
///
/// # Example
///
/// ```
/// use clap::Parser;
/// use shelve::cli::Args;
/// use shelve::file_organizer::Mode;
///
/// let args = Args::parse_from(["shelve", "--copy", "-x", "/data/keep", "/data"]);
/// assert_eq!(args.mode(), Mode::Copy);
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "shelve",
    version,
    about = "Sort files into category or dated folders without overwriting anything"
)]
pub struct Args {
    /// One or more root directories to organize
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Put organized folders here instead of inside each root
    #[arg(short, long, value_name = "DIR")]
    pub destination: Option<PathBuf>,

    /// Folder layout
    #[arg(short, long, value_enum, default_value_t = LayoutArg::Category)]
    pub layout: LayoutArg,

    /// File-name scheme for placed files
    #[arg(long, value_enum, default_value_t = NamingArg::Sanitized)]
    pub naming: NamingArg,

    /// Copy files instead of moving them
    #[arg(short, long)]
    pub copy: bool,

    /// Preview changes without moving, copying or creating anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Log every file on the console
    #[arg(short, long)]
    pub verbose: bool,

    /// Leave this path and everything below it alone (repeatable)
    #[arg(short = 'x', long, value_name = "PATH", action = clap::ArgAction::Append)]
    pub exclude: Vec<PathBuf>,

    /// Configuration file (defaults to .shelverc.toml or ~/.config/shelve/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append one line per event to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Do not create category and skeleton folders upfront
    #[arg(long)]
    pub no_skeleton: bool,
}

impl Args {
    /// Resolves the transfer mode from `--dry-run` and `--copy`.
    ///
    /// A dry run previews whichever transfer `--copy` selects.
    pub fn mode(&self) -> Mode {
        if self.dry_run && self.copy {
            Mode::DryRunCopy
        } else if self.dry_run {
            Mode::DryRun
        } else if self.copy {
            Mode::Copy
        } else {
            Mode::Move
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            layout: self.layout.into(),
            destination: self.destination.clone(),
            mode: self.mode(),
            naming: self.naming.into(),
            excluded: self.exclude.clone(),
            log_file: self.log_file.clone(),
            create_skeleton: !self.no_skeleton,
        }
    }
}

/// Per-root results of one invocation.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Stats for every root that existed, in command-line order.
    pub roots: Vec<(PathBuf, RunStats)>,
    /// All roots merged.
    pub total: RunStats,
}

/// Runs the CLI application with parsed arguments.
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
///
/// # Errors
///
/// Only precondition failures (configuration, destination) are errors;
/// missing roots and per-file failures are reported in the summary.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use shelve::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["shelve", "--dry-run", "/home/user/Downloads"]);
/// match run_cli(&args) {
///     Ok(report) => println!("{} files placed", report.total.placed()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<RunReport, ShelveError> {
    let config = ShelveConfig::load(args.config.as_deref())?;
    let mut organizer = Organizer::new(&config, args.run_options())?;

    if args.dry_run {
        OutputFormatter::dry_run_notice("No files will be moved, copied or created.");
    }

    let mut report = RunReport {
        roots: Vec::new(),
        total: RunStats::new(organizer.mode()),
    };

    for root in &args.roots {
        OutputFormatter::info(&format!("Organizing contents of: {}", root.display()));
        if !args.verbose {
            organizer.set_progress(OutputFormatter::spinner(root));
        }

        let result = organizer.organize_root(root);
        if !args.verbose {
            organizer.set_progress(indicatif::ProgressBar::hidden());
        }

        match result {
            Some(stats) => {
                OutputFormatter::summary(&format!("SUMMARY: {}", root.display()), &stats);
                report.total.merge(&stats);
                report.roots.push((root.clone(), stats));
            }
            None => OutputFormatter::warning(&format!(
                "Skipped {}: directory not found",
                root.display()
            )),
        }
    }

    if args.roots.len() > 1 {
        OutputFormatter::summary("TOTAL", &report.total);
    }

    if report.total.failed() > 0 {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    } else if args.dry_run {
        OutputFormatter::success("Dry run complete. No files were modified.");
    } else {
        OutputFormatter::success("Organization complete!");
    }

    Ok(report)
}
