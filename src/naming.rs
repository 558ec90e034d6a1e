//! Destination file-name schemes.

use crate::file_organizer::FileRecord;
use crate::sanitize::sanitize;
use regex::Regex;
use std::sync::LazyLock;

static NAME_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:19|20)\d{2})[-_]?([01]\d)").expect("valid regex")
});
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"));

/// Used when nothing but digits and punctuation is left of a name.
const DEFAULT_DESCRIPTION: &str = "file";

/// How the stem of a placed file is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Naming {
    /// The source stem, sanitized.
    #[default]
    Sanitized,
    /// `YYYY-MM-description`, the date taken from the name when it carries
    /// one and from the file's timestamp otherwise.
    Dated,
}

impl Naming {
    /// Returns the destination stem for `record`, without extension or
    /// collision suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelve::file_organizer::FileRecord;
    /// use shelve::naming::Naming;
    /// use std::path::PathBuf;
    ///
    /// let record = FileRecord {
    ///     path: PathBuf::from("20230101-party-night.png"),
    ///     extension: "png".to_string(),
    ///     timestamp: None,
    ///     size: 0,
    /// };
    /// assert_eq!(Naming::Dated.stem_for(&record), "2023-01-party-night");
    /// assert_eq!(Naming::Sanitized.stem_for(&record), "20230101-party-night");
    /// ```
    pub fn stem_for(&self, record: &FileRecord) -> String {
        let stem = record.stem();
        match self {
            Naming::Sanitized => sanitize(&stem),
            Naming::Dated => match year_month(&stem, record) {
                Some(prefix) => sanitize(&format!("{}-{}", prefix, description(&stem))),
                None => sanitize(&stem),
            },
        }
    }
}

fn year_month(stem: &str, record: &FileRecord) -> Option<String> {
    if let Some(caps) = NAME_DATE.captures(stem)
        && matches!(caps[2].parse::<u32>(), Ok(1..=12))
    {
        return Some(format!("{}-{}", &caps[1], &caps[2]));
    }
    record.timestamp.map(|ts| ts.format("%Y-%m").to_string())
}

/// Letters of the stem as a lowercase, dash-separated description.
fn description(stem: &str) -> String {
    let without_digits = DIGITS.replace_all(stem, "");
    let dashed = NON_ALNUM.replace_all(&without_digits, "-");
    let trimmed = dashed.trim_matches('-').to_lowercase();
    if trimmed.is_empty() {
        DEFAULT_DESCRIPTION.to_string()
    } else {
        trimmed
    }
}
