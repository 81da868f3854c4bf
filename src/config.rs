//! Run configuration.
//!
//! Handles loading, validating, and merging the optional `siteicons.toml`
//! in the working directory. Stock defaults reproduce the site layout the
//! tool has always used, so a bare checkout needs no config file at all.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! catalog = "data/websites.yml"
//! content_dir = "content"
//! icon_dir = "img"                # Relative to content_dir
//! inline_css = "static/assets/siteimg.css"
//! sprite_css = "static/assets/siteimgsprite.css"
//! sprite_image = "static/assets/sitesprites.png"
//!
//! [fetch]
//! delay_us = 500                  # Pause before each provider request
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [paths]
//! catalog = "data/bookmarks.yml"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILENAME: &str = "siteicons.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration loaded from `siteicons.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsConfig {
    /// Where the catalog, icons and generated assets live.
    pub paths: PathsConfig,
    /// Provider request pacing.
    pub fetch: FetchConfig,
}

impl IconsConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.paths;
        for (key, value) in [
            ("paths.catalog", &p.catalog),
            ("paths.content_dir", &p.content_dir),
            ("paths.icon_dir", &p.icon_dir),
            ("paths.inline_css", &p.inline_css),
            ("paths.sprite_css", &p.sprite_css),
            ("paths.sprite_image", &p.sprite_image),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if p.icon_dir.contains('/') || p.icon_dir.contains('\\') {
            return Err(ConfigError::Validation(
                "paths.icon_dir must be a single directory name".into(),
            ));
        }
        if !p.sprite_image.to_ascii_lowercase().ends_with(".png") {
            return Err(ConfigError::Validation(
                "paths.sprite_image must be a .png file".into(),
            ));
        }
        Ok(())
    }
}

/// Filesystem layout, relative to the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Site catalog (YAML).
    pub catalog: String,
    /// Directory the favicon references in the catalog are relative to.
    pub content_dir: String,
    /// Icon directory name inside `content_dir`. Doubles as the prefix of
    /// every favicon reference (`img/example.com.png`).
    pub icon_dir: String,
    /// Stylesheet with one data-URI rule per icon.
    pub inline_css: String,
    /// Stylesheet with one `background-position` rule per icon.
    pub sprite_css: String,
    /// Packed sprite sheet.
    pub sprite_image: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog: "data/websites.yml".to_string(),
            content_dir: "content".to_string(),
            icon_dir: "img".to_string(),
            inline_css: "static/assets/siteimg.css".to_string(),
            sprite_css: "static/assets/siteimgsprite.css".to_string(),
            sprite_image: "static/assets/sitesprites.png".to_string(),
        }
    }
}

/// Provider request pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Microseconds to sleep before every provider request.
    pub delay_us: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { delay_us: 500 }
    }
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_micros(self.delay_us)
    }
}

// =============================================================================
// Loading
// =============================================================================
//
// There is one layer: the optional `siteicons.toml` in the site root, laid
// over the built-in defaults. Both are handled as `toml::Value` tables so a
// file naming one key leaves its siblings at their defaults.

/// Built-in defaults as a TOML table.
fn defaults_table() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(IconsConfig::default())
        .map_err(|e| ConfigError::Validation(format!("built-in defaults: {e}")))
}

/// Lay the keys of `file` over `defaults`, descending into `[paths]` and
/// `[fetch]` so sections can be partial.
pub fn merge_toml(defaults: toml::Value, file: toml::Value) -> toml::Value {
    match (defaults, file) {
        (toml::Value::Table(mut table), toml::Value::Table(overrides)) => {
            for (key, value) in overrides {
                let merged = match table.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                table.insert(key, merged);
            }
            toml::Value::Table(table)
        }
        (_, value) => value,
    }
}

/// Parsed `siteicons.toml` in `root`, or `None` when the site has none.
fn read_config_file(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Ok(None);
    }
    Ok(Some(toml::from_str(&fs::read_to_string(&path)?)?))
}

/// The run configuration for the site in `root`: `siteicons.toml` over the
/// built-in defaults, validated. A site without the file gets the defaults.
pub fn load_config(root: &Path) -> Result<IconsConfig, ConfigError> {
    let defaults = defaults_table()?;
    let merged = match read_config_file(root)? {
        Some(file) => merge_toml(defaults, file),
        None => defaults,
    };
    let config: IconsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `siteicons.toml`.
///
/// Printed by `--print-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# siteicons configuration
# =======================
# Every key is optional. Values below are the built-in defaults.

[paths]
# Site catalog: a YAML `index:` list of categories with their links.
catalog = "data/websites.yml"
# Favicon references in the catalog are relative to this directory.
content_dir = "content"
# Icon directory inside content_dir. The previous run's icons are kept
# under an "-old" name (img -> img-old) while a refresh is running.
icon_dir = "img"
# Stylesheet with one data-URI background-image rule per icon.
inline_css = "static/assets/siteimg.css"
# Stylesheet with one background-position rule per icon.
sprite_css = "static/assets/siteimgsprite.css"
# Packed sprite sheet (PNG, 50 icons per row).
sprite_image = "static/assets/sitesprites.png"

[fetch]
# Pause before each favicon provider request, in microseconds.
delay_us = 500
"##
}

// =============================================================================
// Resolved layout
// =============================================================================

/// Name an artifact is kept under while a refresh runs: `-old` goes between
/// stem and extension.
///
/// `img` → `img-old`, `siteimg.css` → `siteimg-old.css`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-old.{}", ext.to_string_lossy()),
        None => format!("{stem}-old"),
    };
    path.with_file_name(name)
}

/// Config paths resolved against a root directory.
///
/// Favicon references stored in the catalog look like `img/example.com.png`:
/// relative to [`content_dir`](Self::content_dir), prefixed with the icon
/// directory name.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    paths: PathsConfig,
}

impl Layout {
    pub fn new(root: &Path, paths: &PathsConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            paths: paths.clone(),
        }
    }

    pub fn catalog(&self) -> PathBuf {
        self.root.join(&self.paths.catalog)
    }

    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.paths.content_dir)
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.content_dir().join(&self.paths.icon_dir)
    }

    /// Where the previous run's icons sit during a refresh.
    pub fn backup_icon_dir(&self) -> PathBuf {
        backup_path(&self.icon_dir())
    }

    pub fn inline_css(&self) -> PathBuf {
        self.root.join(&self.paths.inline_css)
    }

    pub fn sprite_css(&self) -> PathBuf {
        self.root.join(&self.paths.sprite_css)
    }

    pub fn sprite_image(&self) -> PathBuf {
        self.root.join(&self.paths.sprite_image)
    }

    /// Prefix of every favicon reference, e.g. `"img/"`.
    pub fn favicon_prefix(&self) -> String {
        format!("{}/", self.paths.icon_dir)
    }

    /// Catalog reference for an icon file written to the icon directory.
    pub fn favicon_ref(&self, filename: &str) -> String {
        format!("{}{}", self.favicon_prefix(), filename)
    }

    /// On-disk location of a favicon reference in the current run.
    pub fn resolve_favicon(&self, favicon: &str) -> PathBuf {
        self.content_dir().join(favicon)
    }

    /// On-disk location of a favicon reference in the previous run's icons.
    ///
    /// `None` when the reference does not live under the icon directory.
    pub fn backed_up_favicon(&self, favicon: &str) -> Option<PathBuf> {
        let name = favicon.strip_prefix(&self.favicon_prefix())?;
        if name.is_empty() {
            return None;
        }
        Some(self.backup_icon_dir().join(name))
    }
}
