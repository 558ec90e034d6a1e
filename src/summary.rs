//! Per-root counters and the end-of-run report.

use crate::file_organizer::{Mode, Outcome};
use std::collections::BTreeMap;
use std::fmt;

/// Counts of what happened while organizing one root.
///
/// Counters only ever go up while a run is in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    mode: Mode,
    placed: BTreeMap<String, usize>,
    skipped: usize,
    failed: usize,
}

impl RunStats {
    /// Empty counters labelled for `mode`.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Counts one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Placed { bucket, .. } => {
                *self.placed.entry(bucket.clone()).or_insert(0) += 1;
            }
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Adds another root's counts into this one.
    pub fn merge(&mut self, other: &RunStats) {
        for (bucket, count) in &other.placed {
            *self.placed.entry(bucket.clone()).or_insert(0) += count;
        }
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Files moved, copied or previewed, depending on the mode.
    pub fn placed(&self) -> usize {
        self.placed.values().sum()
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Placed counts keyed by category or `year/extension`, sorted by name.
    pub fn by_bucket(&self) -> &BTreeMap<String, usize> {
        &self.placed
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Renders the multi-line report.
    ///
    /// ```
    /// use shelve::file_organizer::{Mode, Outcome};
    /// use shelve::summary::RunStats;
    /// use std::path::PathBuf;
    ///
    /// let mut stats = RunStats::new(Mode::Move);
    /// stats.record(&Outcome::Placed {
    ///     source: PathBuf::from("a.txt"),
    ///     destination: PathBuf::from("Documents/a.txt"),
    ///     bucket: "Documents".to_string(),
    /// });
    /// assert!(stats.report().contains("Moved: 1"));
    /// ```
    pub fn report(&self) -> String {
        let mut lines = vec![
            format!("{}: {}", self.mode.verb(), self.placed()),
            format!("Skipped: {}", self.skipped),
            format!("Failed: {}", self.failed),
        ];

        if !self.placed.is_empty() {
            let width = self.placed.keys().map(String::len).max().unwrap_or(0);
            lines.push("By category:".to_string());
            for (bucket, count) in &self.placed {
                lines.push(format!(
                    "  {:<width$}  {} {}",
                    bucket,
                    count,
                    if *count == 1 { "file" } else { "files" },
                    width = width
                ));
            }
        }

        lines.join("\n")
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} skipped={} failed={}",
            self.mode.verb().to_lowercase().replace(' ', "_"),
            self.placed(),
            self.skipped,
            self.failed
        )
    }
}
