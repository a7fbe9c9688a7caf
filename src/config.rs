//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the user's `config.toml` in the content root:
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (overrides stock defaults)
//! ├── assets/
//! │   └── img/                 # Post header images (`img:` front-matter key)
//! └── _posts/
//!     ├── 2020-03-28-property-wrappers.md
//!     └── 2020-04-02-combine-basics.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "My Blog"
//! description = ""
//! author = ""
//! base_url = ""                         # e.g. "https://example.com" (feed + share links)
//! posts_dir = "_posts"
//! assets_dir = "assets"                 # copied to the output root
//! image_dir = "assets/img"              # where `img:` paths resolve
//! permalink = "/:year/:month/:day/:slug/"
//! posts_per_page = 10
//! include_unpublished = false
//! discussion_url = ""                   # linked from posts with `comments: true`
//!
//! [feed]
//! enabled = true
//! limit = 20
//!
//! [lint]
//! required = ["layout", "title", "date", "description", "tags"]
//! layouts = ["post"]
//!
//! [colors.light]
//! background = "#ffffff"
//! text = "#1d1d1f"
//! text_muted = "#6e6e73"                # Dates, tags, read time
//! border = "#e5e5ea"
//! link = "#0066cc"
//! link_hover = "#004999"
//! code_background = "#f5f5f7"
//!
//! [colors.dark]
//! background = "#111113"
//! text = "#f5f5f7"
//! text_muted = "#a1a1a6"
//! border = "#2c2c2e"
//! link = "#4da3ff"
//! link_hover = "#80bdff"
//! code_background = "#1c1c1e"
//!
//! [processing]
//! max_processes = 4                     # Max parallel render workers (omit for auto)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! title = "Notes on SwiftUI"
//! [feed]
//! limit = 50
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::frontmatter::SCHEMA_KEYS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, shown in the header and the feed.
    pub title: String,
    /// Site tagline, shown on the index page and in the feed.
    pub description: String,
    /// Default author name for the feed.
    pub author: String,
    /// Absolute origin (`https://example.com`) used for feed and share links.
    pub base_url: String,
    /// Directory under the content root holding post files.
    pub posts_dir: String,
    /// Directory under the content root copied verbatim to the output root.
    pub assets_dir: String,
    /// Directory under the content root where `img:` paths resolve.
    pub image_dir: String,
    /// URL template for post pages.
    pub permalink: String,
    /// Number of posts per index page.
    pub posts_per_page: usize,
    /// Build posts with `published: false` too.
    pub include_unpublished: bool,
    /// Discussion link shown on posts with `comments: true`.
    pub discussion_url: String,
    pub feed: FeedConfig,
    pub lint: LintConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),
            base_url: String::new(),
            posts_dir: "_posts".to_string(),
            assets_dir: "assets".to_string(),
            image_dir: "assets/img".to_string(),
            permalink: "/:year/:month/:day/:slug/".to_string(),
            posts_per_page: 10,
            include_unpublished: false,
            discussion_url: String::new(),
            feed: FeedConfig::default(),
            lint: LintConfig::default(),
            colors: ColorConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "posts_per_page must be at least 1".into(),
            ));
        }
        if self.feed.limit == 0 {
            return Err(ConfigError::Validation(
                "feed.limit must be at least 1".into(),
            ));
        }
        if !self.permalink.contains(":slug") && !self.permalink.contains(":title") {
            return Err(ConfigError::Validation(
                "permalink must contain :slug or :title".into(),
            ));
        }
        if let Some(key) = self
            .lint
            .required
            .iter()
            .find(|k| !SCHEMA_KEYS.contains(&k.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "lint.required contains unknown front-matter key `{key}`"
            )));
        }
        if !self.base_url.is_empty() {
            let scheme_ok =
                self.base_url.starts_with("http://") || self.base_url.starts_with("https://");
            if !scheme_ok || self.base_url.ends_with('/') {
                return Err(ConfigError::Validation(
                    "base_url must start with http(s):// and have no trailing slash".into(),
                ));
            }
        }
        Ok(())
    }

    /// Absolute URL for a site path, or the path itself without `base_url`.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Where `image_dir` lands in the output: relative to `assets_dir` when
    /// nested inside it, otherwise copied under its own name.
    pub fn public_image_dir(&self) -> &str {
        let dir = self.image_dir.trim_matches('/');
        let assets = self.assets_dir.trim_matches('/');
        match dir.strip_prefix(assets) {
            Some("") => "",
            Some(rest) if rest.starts_with('/') => &rest[1..],
            _ => dir,
        }
    }

    /// Whether `image_dir` is copied along with `assets_dir`.
    pub fn image_dir_in_assets(&self) -> bool {
        self.public_image_dir() != self.image_dir.trim_matches('/')
    }

    /// Site URL of a front-matter `img` value. Absolute URLs pass through.
    pub fn image_url(&self, img: &str) -> String {
        if img.starts_with("http://") || img.starts_with("https://") {
            return img.to_string();
        }
        let img = img.trim_start_matches('/');
        match self.public_image_dir() {
            "" => format!("/{img}"),
            dir => format!("/{dir}/{img}"),
        }
    }
}

/// RSS feed settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Write `feed.xml`.
    pub enabled: bool,
    /// Number of newest posts in the feed.
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 20,
        }
    }
}

/// Content lint settings used by `check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Front-matter keys every post must declare.
    pub required: Vec<String>,
    /// Layout names the site knows how to render.
    pub layouts: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            required: ["layout", "title", "date", "description", "tags"]
                .into_iter()
                .map(String::from)
                .collect(),
            layouts: vec!["post".to_string()],
        }
    }
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Muted/secondary text color (dates, tags, read time).
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Background of code blocks and inline code.
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1d1d1f".to_string(),
            text_muted: "#6e6e73".to_string(),
            border: "#e5e5ea".to_string(),
            link: "#0066cc".to_string(),
            link_hover: "#004999".to_string(),
            code_background: "#f5f5f7".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#111113".to_string(),
            text: "#f5f5f7".to_string(),
            text_muted: "#a1a1a6".to_string(),
            border: "#2c2c2e".to_string(),
            link: "#4da3ff".to_string(),
            link_hover: "#80bdff".to_string(),
            code_background: "#1c1c1e".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
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
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(root = %root.display(), title = %config.title, "loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# posthouse configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Site title, shown in the header and the RSS feed.
title = "My Blog"

# Tagline shown on the index page and in the feed.
description = ""

# Default author for the feed.
author = ""

# Absolute origin used for feed and share links, without a trailing slash.
# Example: "https://example.com"
base_url = ""

# Directory (under the content root) holding post files named
# YYYY-MM-DD-slug.md.
posts_dir = "_posts"

# Directory copied verbatim to the output root (images, favicon, fonts).
assets_dir = "assets"

# Directory where the `img:` front-matter key resolves.
image_dir = "assets/img"

# URL template for post pages. Placeholders: :year :month :day :slug :title
# A trailing slash writes <dir>/index.html.
permalink = "/:year/:month/:day/:slug/"

# Number of posts per index page.
posts_per_page = 10

# Build posts marked `published: false` as well (handy for previews).
include_unpublished = false

# Discussion link shown on posts with `comments: true`.
discussion_url = ""

# ---------------------------------------------------------------------------
# RSS feed
# ---------------------------------------------------------------------------
[feed]
enabled = true
# Number of newest posts in feed.xml.
limit = 20

# ---------------------------------------------------------------------------
# Content lint (`posthouse check`)
# ---------------------------------------------------------------------------
[lint]
# Front-matter keys every post must declare.
required = ["layout", "title", "date", "description", "tags"]
# Layout names this site renders.
layouts = ["post"]

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1d1d1f"
text_muted = "#6e6e73"    # Dates, tags, read time
border = "#e5e5ea"
link = "#0066cc"
link_hover = "#004999"
code_background = "#f5f5f7"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#111113"
text = "#f5f5f7"
text_muted = "#a1a1a6"
border = "#2c2c2e"
link = "#4da3ff"
link_hover = "#80bdff"
code_background = "#1c1c1e"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
    --color-code-bg: {light_code_bg};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
        --color-code-bg: {dark_code_bg};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        light_code_bg = colors.light.code_background,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
        dark_code_bg = colors.dark.code_background,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn image_url_under_assets() {
        let config = SiteConfig::default();
        assert_eq!(config.image_url("cover.png"), "/img/cover.png");
        assert_eq!(config.image_url("/cover.png"), "/img/cover.png");
        assert!(config.image_dir_in_assets());
    }

    #[test]
    fn image_url_outside_assets_and_absolute() {
        let config = SiteConfig {
            image_dir: "images".into(),
            ..SiteConfig::default()
        };
        assert_eq!(config.image_url("cover.png"), "/images/cover.png");
        assert!(!config.image_dir_in_assets());
        assert_eq!(
            config.image_url("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn image_dir_equal_to_assets_is_root() {
        let config = SiteConfig {
            image_dir: "assets".into(),
            ..SiteConfig::default()
        };
        assert_eq!(config.image_url("a.png"), "/a.png");
    }

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.posts_dir, "_posts");
        assert_eq!(config.permalink, "/:year/:month/:day/:slug/");
        assert_eq!(config.posts_per_page, 10);
        assert!(!config.include_unpublished);
        assert!(config.feed.enabled);
        assert_eq!(config.lint.layouts, vec!["post"]);
        assert_eq!(config.colors.light.background, "#ffffff");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
title = "Notes on SwiftUI"

[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title, "Notes on SwiftUI");
        assert_eq!(config.colors.light.background, "#fafafa");
        // Defaults preserved
        assert_eq!(config.colors.light.text, "#1d1d1f");
        assert_eq!(config.feed.limit, 20);
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("--color-code-bg:"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "My Blog");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
title = "Combine Notes"
base_url = "https://example.com"
posts_per_page = 5

[feed]
limit = 3
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.title, "Combine Notes");
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.posts_per_page, 5);
        assert_eq!(config.feed.limit, 3);
        assert!(config.feed.enabled);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("titel = \"x\"");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[feed]\nlimt = 4\n");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_posts_per_page_zero() {
        let mut config = SiteConfig::default();
        config.posts_per_page = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("posts_per_page"));
    }

    #[test]
    fn validate_feed_limit_zero() {
        let mut config = SiteConfig::default();
        config.feed.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_permalink_needs_slug() {
        let mut config = SiteConfig::default();
        config.permalink = "/:year/:month/".to_string();
        assert!(config.validate().is_err());

        config.permalink = "/posts/:title.html".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_required_keys_in_schema() {
        let mut config = SiteConfig::default();
        config.lint.required.push("author".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("author"));
    }

    #[test]
    fn validate_base_url_shape() {
        let mut config = SiteConfig::default();
        config.base_url = "https://example.com/".to_string();
        assert!(config.validate().is_err());

        config.base_url = "example.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "posts_per_page = 0\n").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn absolute_url_joins_base() {
        let mut config = SiteConfig::default();
        assert_eq!(config.absolute_url("/a/"), "/a/");
        config.base_url = "https://example.com".to_string();
        assert_eq!(config.absolute_url("/a/"), "https://example.com/a/");
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let threads = effective_threads(&ProcessingConfig {
            max_processes: None,
        });
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(threads, cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[feed]\nenabled = true\nlimit = 20\n").unwrap();
        let overlay: toml::Value = toml::from_str("[feed]\nlimit = 5\n").unwrap();
        let merged = merge_toml(base, overlay);
        let feed = merged.get("feed").unwrap();
        assert_eq!(feed.get("limit").unwrap().as_integer(), Some(5));
        assert_eq!(feed.get("enabled").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn merge_toml_array_replaced_not_appended() {
        let base: toml::Value = toml::from_str("[lint]\nlayouts = [\"post\"]\n").unwrap();
        let overlay: toml::Value =
            toml::from_str("[lint]\nlayouts = [\"post\", \"page\"]\n").unwrap();
        let merged = merge_toml(base, overlay);
        let layouts = merged.get("lint").unwrap().get("layouts").unwrap();
        assert_eq!(layouts.as_array().unwrap().len(), 2);
    }

    #[test]
    fn resolve_config_with_no_overlay() {
        let config = resolve_config(stock_defaults_value().unwrap(), None).unwrap();
        assert_eq!(config.posts_per_page, 10);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.title, defaults.title);
        assert_eq!(config.permalink, defaults.permalink);
        assert_eq!(config.lint.required, defaults.lint.required);
        assert_eq!(config.colors.dark.link, defaults.colors.dark.link);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in [
            "[feed]",
            "[lint]",
            "[colors.light]",
            "[colors.dark]",
            "[processing]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
    }
}
