//! Output formatting and styling module.
//!
//! Everything printed for the user (as opposed to logged) goes through
//! [`OutputFormatter`], so styling stays consistent across the CLI.

use crate::summary::RunStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Manages CLI output with consistent styling.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info and dry-run notices
/// - A per-root spinner and the run summary
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shelve::output::OutputFormatter;
    /// OutputFormatter::success("Organization complete!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shelve::output::OutputFormatter;
    /// OutputFormatter::error("Destination volume is not mounted");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shelve::output::OutputFormatter;
    /// OutputFormatter::warning("Skipped /mnt/card: directory not found");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shelve::output::OutputFormatter;
    /// OutputFormatter::info("Organizing contents of: /home/user/Downloads");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a bold section header preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a yellow notice prefixed with `[DRY RUN]`.
    ///
    /// # Arguments
    ///
    /// * `message` - What the dry run will not do
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner that counts processed files for one root.
    ///
    /// indicatif hides it automatically when stderr is not a terminal.
    pub fn spinner(root: &Path) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {pos} files {msg}")
                .expect("Invalid spinner template"),
        );
        pb.set_message(root.display().to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }

    /// Prints the report for one root (or the combined total).
    ///
    /// Failure and skip lines are highlighted when non-zero.
    ///
    /// # Arguments
    ///
    /// * `title` - Header printed above the report
    /// * `stats` - Counts to render
    pub fn summary(title: &str, stats: &RunStats) {
        Self::header(title);
        for line in stats.report().lines() {
            let styled = if line.starts_with("Failed:") && stats.failed() > 0 {
                line.red().bold()
            } else if line.starts_with("Skipped:") && stats.skipped() > 0 {
                line.yellow()
            } else if line.starts_with("By category:") {
                line.bold()
            } else if line.starts_with("  ") {
                line.normal()
            } else {
                line.green()
            };
            println!("{}", styled);
        }
    }
}
