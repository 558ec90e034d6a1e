//! Category tables, layout settings and file filtering rules.
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file at all) yields the built-in category table.
//!
//! # Configuration File Format
//!
//! ```toml
//! fallback = "99_Misc"
//! skeleton = ["00_Inbox", "10_Projects"]
//! create_skeleton = true
//!
//! [[categories]]
//! name = "Images"
//! extensions = ["jpg", "png"]
//!
//! [[categories]]
//! name = "Documents"
//! extensions = ["pdf", "txt"]
//!
//! [dated]
//! extensions = ["jpg", "jpeg", "png", "heic"]
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["**/node_modules/**"]
//! extensions = ["part"]
//! paths = ["/data/keep"]
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! The `[[categories]]` array is ordered; an extension listed in two
//! categories goes to the first one.

use crate::file_category::{CategoryMap, DEFAULT_CATEGORIES, FALLBACK_CATEGORY, SKELETON_FOLDERS};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration in {}: {reason}", path.display())]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },

    #[error("Invalid category name '{0}': must be a non-empty single path component")]
    InvalidCategoryName(String),

    #[error("IO error reading configuration {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelveConfig {
    /// Bucket for extensions no category claims.
    pub fallback: String,
    /// Folders created in every organized root.
    pub skeleton: Vec<String>,
    /// Whether category and skeleton folders are created before moving.
    pub create_skeleton: bool,
    /// Ordered category table.
    pub categories: Vec<CategoryRule>,
    /// Settings for the year/extension layout.
    pub dated: DatedRules,
    pub filters: FilterRules,
}

/// One entry of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Media extensions handled by the dated layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatedRules {
    pub extensions: Vec<String>,
}

impl Default for DatedRules {
    fn default() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "heic", "gif", "bmp", "tiff"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Root-level filter rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Whitelist rules, checked before any exclude rule.
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g., ".DS_Store", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions (e.g., "part", "crdownload").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Directories or files pruned from the walk entirely.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Default for ShelveConfig {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_CATEGORY.to_string(),
            skeleton: SKELETON_FOLDERS.iter().map(|s| s.to_string()).collect(),
            create_skeleton: true,
            categories: DEFAULT_CATEGORIES
                .iter()
                .map(|(name, exts)| CategoryRule {
                    name: name.to_string(),
                    extensions: exts.iter().map(|ext| ext.to_string()).collect(),
                })
                .collect(),
            dated: DatedRules::default(),
            filters: FilterRules::default(),
        }
    }
}

impl ShelveConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided (must exist)
    /// 2. `.shelverc.toml` in the current directory
    /// 3. `~/.config/shelve/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".shelverc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("shelve")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&content).map_err(|reason| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Builds the ordered category map.
    ///
    /// Extensions claimed by more than one category are logged; the first
    /// declaration wins.
    pub fn category_map(&self) -> Result<CategoryMap, ConfigError> {
        validate_folder_name(&self.fallback)?;
        let mut map = CategoryMap::new(self.fallback.clone());
        for rule in &self.categories {
            validate_folder_name(&rule.name)?;
            map.add_category(&rule.name, &rule.extensions);
        }

        for (ext, owners) in map.duplicate_extensions() {
            warn!(
                "Extension '{}' is declared by several categories ({}); '{}' wins",
                ext,
                owners.join(", "),
                owners[0]
            );
        }
        Ok(map)
    }

    /// Skeleton folder names, validated.
    pub fn skeleton_folders(&self) -> Result<Vec<String>, ConfigError> {
        self.skeleton
            .iter()
            .map(|name| validate_folder_name(name).map(|_| name.clone()))
            .collect()
    }

    /// Lowercase media extensions for the dated layout.
    pub fn dated_extensions(&self) -> HashSet<String> {
        self.dated
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect()
    }

    /// Compile the filter rules for matching.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

fn validate_folder_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.trim().is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCategoryName(name.to_string()))
    }
}

fn is_hidden(relative_path: &Path) -> bool {
    relative_path.components().any(|component| {
        matches!(component, Component::Normal(name) if name.to_string_lossy().starts_with('.'))
    })
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                pattern: pattern.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_patterns(&rules.exclude.patterns)?,
            include_patterns: compile_patterns(&rules.include.patterns)?,
        })
    }

    /// Check whether a file, given by its path relative to the walked root,
    /// should be organized.
    ///
    /// Checks run in this order:
    /// 1. Include patterns - if matched, always include
    /// 2. Hidden filter, applied to every component so files inside hidden
    ///    directories such as `.git/` are left alone too
    /// 3. Exact filename match
    /// 4. Extension match
    /// 5. Exclude glob patterns
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
        {
            return true;
        }

        if !self.enable_hidden_files && is_hidden(relative_path) {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(relative_path))
    }
}
