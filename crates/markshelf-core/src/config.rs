//! Configuration for checking, categorizing and reorganizing bookmarks.
//!
//! Every component takes its own config struct. [`Settings`] bundles them
//! for the TOML settings file:
//!
//! ```toml
//! [check]
//! concurrency = 20
//! timeout_secs = 8
//!
//! [organize]
//! max_per_folder = 40
//! preserve_existing = false
//!
//! [[categorize.domain_rules]]
//! pattern = "crates.io"
//! category = "Rust"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::BookmarkError;

/// User agent sent with every link probe.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; BookmarkOrganizer/0.1)";

/// Configuration for link checking.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CheckConfig {
    /// Number of probes in flight at once.
    #[builder(default = "10")]
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds.
    #[builder(default = "5")]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent for all requests.
    #[builder(default = "DEFAULT_USER_AGENT.to_string()")]
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Redirects followed before giving up.
    #[builder(default = "30")]
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Glob patterns; matching URLs are never probed.
    #[builder(default)]
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Overall deadline for a whole run in seconds (None = no deadline).
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

fn default_concurrency() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_max_redirects() -> usize {
    30
}

impl CheckConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }
        if self.timeout_secs == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }
        Ok(())
    }
}

impl CheckConfig {
    /// Create a new config builder.
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Overall deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            exclude_patterns: Vec::new(),
            deadline_secs: None,
        }
    }
}

/// Configuration for duplicate detection.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct DuplicateConfig {
    /// Compare normalized URLs instead of raw ones.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub normalize: bool,
}

impl DuplicateConfig {
    /// Create a new config builder.
    pub fn builder() -> DuplicateConfigBuilder {
        DuplicateConfigBuilder::default()
    }
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self { normalize: true }
    }
}

/// A user-supplied categorization rule: `pattern` maps to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Domain, TLD, path fragment or title keyword, depending on the table.
    pub pattern: String,
    /// Category assigned on a match.
    pub category: String,
}

impl RuleEntry {
    /// Create a rule.
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
        }
    }
}

/// Configuration for categorization.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct CategorizeConfig {
    /// Run the clustering refinement on unclaimed bookmarks.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub use_clustering: bool,

    /// Categories with fewer items are dropped.
    #[builder(default = "2")]
    #[serde(default = "default_min_category_size")]
    pub min_category_size: usize,

    /// Clustering only runs when the collection is larger than this.
    #[builder(default = "10")]
    #[serde(default = "default_min_bookmarks_for_clustering")]
    pub min_bookmarks_for_clustering: usize,

    /// Clustering is skipped when fewer bookmarks are unclaimed.
    #[builder(default = "5")]
    #[serde(default = "default_min_unclaimed")]
    pub min_unclaimed_for_clustering: usize,

    /// Extra domain rules, tried before the built-in table.
    #[builder(default)]
    #[serde(default)]
    pub domain_rules: Vec<RuleEntry>,

    /// Extra TLD rules.
    #[builder(default)]
    #[serde(default)]
    pub tld_rules: Vec<RuleEntry>,

    /// Extra path rules.
    #[builder(default)]
    #[serde(default)]
    pub path_rules: Vec<RuleEntry>,

    /// Extra title keywords.
    #[builder(default)]
    #[serde(default)]
    pub title_keywords: Vec<RuleEntry>,
}

fn default_min_category_size() -> usize {
    2
}

fn default_min_bookmarks_for_clustering() -> usize {
    10
}

fn default_min_unclaimed() -> usize {
    5
}

impl CategorizeConfig {
    /// Create a new config builder.
    pub fn builder() -> CategorizeConfigBuilder {
        CategorizeConfigBuilder::default()
    }
}

impl Default for CategorizeConfig {
    fn default() -> Self {
        Self {
            use_clustering: true,
            min_category_size: default_min_category_size(),
            min_bookmarks_for_clustering: default_min_bookmarks_for_clustering(),
            min_unclaimed_for_clustering: default_min_unclaimed(),
            domain_rules: Vec::new(),
            tld_rules: Vec::new(),
            path_rules: Vec::new(),
            title_keywords: Vec::new(),
        }
    }
}

/// Configuration for rebuilding the folder structure.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct OrganizeConfig {
    /// Categories larger than this are split into subfolders.
    #[builder(default = "50")]
    #[serde(default = "default_max_per_folder")]
    pub max_per_folder: usize,

    /// Keep the original folders next to the new category folders.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub preserve_existing: bool,
}

fn default_max_per_folder() -> usize {
    50
}

impl OrganizeConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_per_folder == Some(0) {
            return Err("max_per_folder must be at least 1".to_string());
        }
        Ok(())
    }
}

impl OrganizeConfig {
    /// Create a new config builder.
    pub fn builder() -> OrganizeConfigBuilder {
        OrganizeConfigBuilder::default()
    }
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            max_per_folder: default_max_per_folder(),
            preserve_existing: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// All settings, as stored in the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Link checking.
    pub check: CheckConfig,
    /// Duplicate detection.
    pub duplicates: DuplicateConfig,
    /// Categorization.
    pub categorize: CategorizeConfig,
    /// Reorganization.
    pub organize: OrganizeConfig,
}

impl Settings {
    /// Default settings file location (`<config dir>/markshelf/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("markshelf").join("config.toml"))
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, BookmarkError> {
        let settings: Settings =
            toml::from_str(text).map_err(|e| BookmarkError::invalid_config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> Result<Self, BookmarkError> {
        let text = std::fs::read_to_string(path).map_err(|e| BookmarkError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Load the default settings file if present, else defaults.
    pub fn discover() -> Result<Self, BookmarkError> {
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading settings");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), BookmarkError> {
        if self.check.concurrency == 0 {
            return Err(BookmarkError::invalid_config("check.concurrency must be at least 1"));
        }
        if self.check.timeout_secs == 0 {
            return Err(BookmarkError::invalid_config("check.timeout_secs must be at least 1"));
        }
        if self.organize.max_per_folder == 0 {
            return Err(BookmarkError::invalid_config(
                "organize.max_per_folder must be at least 1",
            ));
        }
        Ok(())
    }
}
