//! Filename stem normalization.
//!
//! Turns arbitrary stems like `"My Report (Final)"` into portable tokens like
//! `"my_report_final"`.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Longest stem [`sanitize`] will return.
pub const MAX_STEM_LEN: usize = 80;

/// Substituted when nothing usable is left of a stem.
pub const PLACEHOLDER: &str = "unnamed";

static INVALID_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9._-]+").expect("valid regex"));
static REPEATED_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("valid regex"));

fn is_separator(c: char) -> bool {
    c == '.' || c == '_'
}

/// Normalizes a filename stem.
///
/// Accented letters are decomposed (NFKD) and folded to their ASCII base
/// letter; characters with no ASCII form are dropped. The result only contains `a-z`, `0-9`, `.`, `_` and `-`, never starts or
/// ends with `.` or `_`, is at most [`MAX_STEM_LEN`] characters long and is
/// never empty. Applying it twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use shelve::sanitize::sanitize;
///
/// assert_eq!(sanitize("My Report FINAL"), "my_report_final");
/// assert_eq!(sanitize("   Spaces   and---Chars  "), "spaces_and---chars");
/// assert_eq!(sanitize("Café Menü"), "cafe_menu");
/// assert_eq!(sanitize("__"), "unnamed");
/// ```
pub fn sanitize(stem: &str) -> String {
    let folded: String = stem.nfkd().filter(char::is_ascii).collect();
    let lowered = folded.trim().to_lowercase();
    let replaced = INVALID_CHARACTERS.replace_all(&lowered, "_");
    let collapsed = REPEATED_UNDERSCORES.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches(is_separator);

    if trimmed.is_empty() {
        return PLACEHOLDER.to_string();
    }

    // Only ASCII survives the replacement, so byte slicing is safe.
    if trimmed.len() > MAX_STEM_LEN {
        return trimmed[..MAX_STEM_LEN]
            .trim_end_matches(is_separator)
            .to_string();
    }

    trimmed.to_string()
}
