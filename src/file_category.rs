//! Extension-based categorization for organizing files into folders.
//!
//! A [`CategoryMap`] is an ordered list of named categories, each owning a set
//! of lowercase extensions. Lookups scan the list in order and the first
//! category declaring the extension wins; anything unmatched lands in the
//! fallback bucket.
//!
//! # Examples
//!
//! ```
//! use shelve::file_category::CategoryMap;
//!
//! let map = CategoryMap::default();
//! assert_eq!(map.resolve("jpg"), "04_Images");
//! assert_eq!(map.resolve("PDF"), "01_Documents");
//! assert_eq!(map.resolve("xyz"), "99_Misc");
//! ```

use std::collections::HashSet;
use std::path::Path;

/// Name of the bucket for files no category claims.
pub const FALLBACK_CATEGORY: &str = "99_Misc";

/// Folders created upfront in every organized root regardless of content.
pub const SKELETON_FOLDERS: [&str; 5] = [
    "00_Inbox",
    "10_Projects",
    "20_Archive",
    "30_Reference",
    "40_Exports",
];

/// Returns the lowercase extension of `path` without the leading dot.
///
/// Files without an extension yield an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// A single named category and the extensions it claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: HashSet<String>,
}

impl Category {
    /// Folder name files of this category are placed in.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the category claims `ext` (lowercase, without the dot).
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }
}

/// Ordered mapping from category name to extension set, first match wins.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryMap {
    /// Creates an empty map that resolves everything to `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            categories: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// Appends a category at the lowest priority.
    ///
    /// Extensions are lowercased and stripped of a leading dot, so
    /// `".JPG"` and `"jpg"` are the same entry.
    pub fn add_category<I, S>(&mut self, name: &str, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories.push(Category {
            name: name.to_string(),
            extensions: extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        });
    }

    /// Builder form of [`CategoryMap::add_category`].
    pub fn with_category<I, S>(mut self, name: &str, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_category(name, extensions);
        self
    }

    /// Maps an extension to its category name.
    ///
    /// Resolution is total: an empty or unknown extension returns the
    /// fallback bucket.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelve::file_category::CategoryMap;
    ///
    /// let map = CategoryMap::new("Other")
    ///     .with_category("Images", ["jpg", "png"])
    ///     .with_category("Documents", ["txt"]);
    /// assert_eq!(map.resolve(".JPG"), "Images");
    /// assert_eq!(map.resolve(""), "Other");
    /// ```
    pub fn resolve(&self, ext: &str) -> &str {
        let ext = normalize_extension(ext);
        self.categories
            .iter()
            .find(|category| category.contains(&ext))
            .map(Category::name)
            .unwrap_or(&self.fallback)
    }

    /// Bucket for extensions no category claims.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Category names in priority order, followed by the fallback.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .map(Category::name)
            .chain(std::iter::once(self.fallback.as_str()))
    }

    /// Extensions declared by more than one category, with the category
    /// names that declare them. Later declarations are shadowed.
    pub fn duplicate_extensions(&self) -> Vec<(String, Vec<String>)> {
        let mut seen: Vec<(String, Vec<String>)> = Vec::new();
        for category in &self.categories {
            for ext in &category.extensions {
                match seen.iter_mut().find(|(known, _)| known == ext) {
                    Some((_, owners)) => owners.push(category.name.clone()),
                    None => seen.push((ext.clone(), vec![category.name.clone()])),
                }
            }
        }
        let mut duplicates: Vec<_> = seen
            .into_iter()
            .filter(|(_, owners)| owners.len() > 1)
            .collect();
        duplicates.sort();
        duplicates
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Built-in category table, in priority order.
pub const DEFAULT_CATEGORIES: [(&str, &[&str]); 8] = [
    (
        "01_Documents",
        &["pdf", "doc", "docx", "txt", "md", "rtf", "odt", "ppt", "pptx"],
    ),
    ("02_Data", &["csv", "xlsx", "xls", "json", "xml", "parquet"]),
    (
        "03_Code",
        &[
            "py", "js", "ts", "html", "css", "yaml", "yml", "json5", "sh", "ps1", "bat",
        ],
    ),
    (
        "04_Images",
        &[
            "jpg", "jpeg", "png", "gif", "svg", "heic", "bmp", "tif", "tiff", "webp",
        ],
    ),
    ("05_Audio", &["mp3", "wav", "flac", "aac", "ogg", "m4a"]),
    ("06_Video", &["mp4", "mov", "avi", "mkv", "webm"]),
    ("07_Archives", &["zip", "tar", "gz", "rar", "7z"]),
    ("08_Backups", &["bak", "tmp"]),
];

impl Default for CategoryMap {
    fn default() -> Self {
        DEFAULT_CATEGORIES
            .iter()
            .fold(Self::new(FALLBACK_CATEGORY), |map, (name, exts)| {
                map.with_category(name, exts.iter())
            })
    }
}
