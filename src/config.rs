//! Site configuration module.
//!
//! Handles loading, validating, and merging the optional `config.toml` at the
//! project root. Stock defaults reproduce the conventional layout, so a
//! project that follows it needs no config file at all.
//!
//! ## Project Layout (defaults)
//!
//! ```text
//! site/
//! ├── config.toml          # Optional, overrides stock defaults
//! ├── entries/             # Markdown blog entries
//! ├── photos/              # Originals with EXIF metadata
//! ├── templates/           # *.html templates (index, blog, photos, article)
//! └── assets/              # Copied to build/assets/
//!     ├── favicon.svg      # Also copied to the build root
//!     └── robots.txt       # Optional, also copied to the build root
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! host = "https://nifi.blog"   # Absolute origin used in the sitemap
//!
//! [paths]
//! entries = "entries"
//! photos = "photos"
//! templates = "templates"
//! template_glob = "*.html"
//! assets = "assets"
//! favicon = "assets/favicon.svg"
//! robots = "assets/robots.txt"
//! output = "build"
//!
//! [photos]
//! max_file_size = 26214400     # 25 MiB
//! sort_priority = ["actually good", "ok"]
//!
//! [thumbnails]
//! width = 200
//! quality = 80
//!
//! [markdown]
//! figures = true
//! emoji = true
//!
//! [sitemap]
//! image_entries = true
//!
//! [processing]
//! max_processes = 4            # Omit for auto = CPU cores
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute origin (scheme + host) prepended to every sitemap location.
    pub host: String,
    /// Input and output locations, relative to the project root.
    pub paths: PathsConfig,
    /// Photo reader settings (size limit, sort priority).
    pub photos: PhotosConfig,
    /// Thumbnail generation settings.
    pub thumbnails: ThumbnailsConfig,
    /// Markdown extensions.
    pub markdown: MarkdownConfig,
    /// Sitemap settings.
    pub sitemap: SitemapConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            host: "https://nifi.blog".to_string(),
            paths: PathsConfig::default(),
            photos: PhotosConfig::default(),
            thumbnails: ThumbnailsConfig::default(),
            markdown: MarkdownConfig::default(),
            sitemap: SitemapConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "host must be an absolute http(s) origin".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        if self.photos.max_file_size == 0 {
            return Err(ConfigError::Validation(
                "photos.max_file_size must be non-zero".into(),
            ));
        }
        if self.paths.template_glob.trim().is_empty() {
            return Err(ConfigError::Validation(
                "paths.template_glob must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Input and output locations. Relative paths are resolved against the
/// project root with [`PathsConfig::resolve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Markdown blog entries.
    pub entries: String,
    /// Photo originals.
    pub photos: String,
    /// Template directory.
    pub templates: String,
    /// Glob (relative to `templates`) selecting the template files.
    pub template_glob: String,
    /// Static asset directory, copied to `<output>/assets`.
    pub assets: String,
    /// Favicon, copied to the output root. Required.
    pub favicon: String,
    /// robots.txt, copied to the output root when present.
    pub robots: String,
    /// Build output directory. Cleared on every run.
    pub output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            entries: "entries".to_string(),
            photos: "photos".to_string(),
            templates: "templates".to_string(),
            template_glob: "*.html".to_string(),
            assets: "assets".to_string(),
            favicon: "assets/favicon.svg".to_string(),
            robots: "assets/robots.txt".to_string(),
            output: "build".to_string(),
        }
    }
}

/// Absolute locations derived from [`PathsConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub root: PathBuf,
    pub entries: PathBuf,
    pub photos: PathBuf,
    pub templates: PathBuf,
    pub template_glob: String,
    pub assets: PathBuf,
    pub favicon: PathBuf,
    pub robots: PathBuf,
    pub output: PathBuf,
}

impl PathsConfig {
    pub fn resolve(&self, root: &Path) -> ResolvedPaths {
        ResolvedPaths {
            root: root.to_path_buf(),
            entries: root.join(&self.entries),
            photos: root.join(&self.photos),
            templates: root.join(&self.templates),
            template_glob: self.template_glob.clone(),
            assets: root.join(&self.assets),
            favicon: root.join(&self.favicon),
            robots: root.join(&self.robots),
            output: root.join(&self.output),
        }
    }
}

/// Photo reader settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    /// Largest accepted source file in bytes. The CDN in front of the site
    /// refuses to serve anything bigger.
    pub max_file_size: u64,
    /// Tags that pull photos to the front, highest priority first.
    pub sort_priority: Vec<String>,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            max_file_size: 25 * 1024 * 1024,
            sort_priority: vec!["actually good".to_string(), "ok".to_string()],
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Output width in pixels; height follows the source aspect ratio.
    pub width: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 200,
            quality: 80,
        }
    }
}

/// Markdown extensions applied to blog entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// Turn image paragraphs into `<figure>` with an optional caption.
    pub figures: bool,
    /// Replace `:shortcode:` with the emoji character.
    pub emoji: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            figures: true,
            emoji: true,
        }
    }
}

/// Sitemap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    /// Attach an `image:image` entry per photo to the `/photos` page.
    pub image_entries: bool,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            image_entries: true,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel thumbnail workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from the project root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    log::debug!("loaded config: {config:?}");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photoblog configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Absolute origin used for every sitemap <loc>.
host = "https://nifi.blog"

# ---------------------------------------------------------------------------
# Locations (relative to the project root)
# ---------------------------------------------------------------------------
[paths]
entries = "entries"            # Markdown blog entries
photos = "photos"              # Photo originals (EXIF required)
templates = "templates"        # Template directory
template_glob = "*.html"       # Which files in `templates` are loaded
assets = "assets"              # Copied to <output>/assets
favicon = "assets/favicon.svg" # Copied to the output root (required)
robots = "assets/robots.txt"   # Copied to the output root when present
output = "build"               # Cleared and regenerated on every run

# ---------------------------------------------------------------------------
# Photos
# ---------------------------------------------------------------------------
[photos]
# Largest accepted original, in bytes (25 MiB).
max_file_size = 26214400

# Photos tagged with one of these sort first, in this order.
sort_priority = ["actually good", "ok"]

# ---------------------------------------------------------------------------
# Thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
width = 200                    # Height follows the aspect ratio
quality = 80                   # JPEG quality (1-100)

# ---------------------------------------------------------------------------
# Markdown extensions
# ---------------------------------------------------------------------------
[markdown]
figures = true                 # Image paragraphs become <figure>
emoji = true                   # :rocket: becomes the emoji

# ---------------------------------------------------------------------------
# Sitemap
# ---------------------------------------------------------------------------
[sitemap]
image_entries = true           # List every photo under /photos

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel thumbnail workers.
# Omit to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
