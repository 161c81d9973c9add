//! Page configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the content directory overrides just
//! the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [page]
//! title = "Gallery"
//! upload_enabled = true       # Render the upload button
//!
//! [timing]
//! fade_ms = 120               # Viewer image fade before the source swap
//! debounce_ms = 120           # Quiet period before the gallery re-scans
//!
//! [gestures]
//! swipe_threshold = 40.0      # Horizontal drag distance that navigates
//!
//! [selectors]
//! gallery = "#gallery"
//! item = ".item"
//! lightbox = "#lightbox"
//! # ... see `gen-config` for the full list
//!
//! [collections]
//! Landscapes = ["001-dawn.jpg", "010-mountains.jpg"]
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [timing]
//! fade_ms = 200
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::dom::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
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

/// Upper bound for any configured delay.
const MAX_DELAY_MS: u64 = 10_000;

/// Gallery page configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page-level settings (title, optional controls).
    pub page: PageConfig,
    /// Fade and debounce delays.
    pub timing: TimingConfig,
    /// Pointer gesture settings.
    pub gestures: GestureConfig,
    /// Where the engine finds each part of the page.
    pub selectors: SelectorConfig,
    /// Collection name → image filenames that belong to it.
    pub collections: BTreeMap<String, Vec<String>>,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.gestures.swipe_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigError::Validation(
                "gestures.swipe_threshold must be positive".into(),
            ));
        }
        if self.timing.fade_ms > MAX_DELAY_MS || self.timing.debounce_ms > MAX_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "timing values must be at most {MAX_DELAY_MS} ms"
            )));
        }
        if self.collections.keys().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "collection names must not be blank".into(),
            ));
        }
        if self.collections.keys().any(|name| name.contains(',')) {
            return Err(ConfigError::Validation(
                "collection names must not contain commas".into(),
            ));
        }
        self.selectors.resolve()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Document title and navbar brand.
    pub title: String,
    /// Whether the rendered page carries an upload button.
    pub upload_enabled: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Gallery".to_string(),
            upload_enabled: true,
        }
    }
}

/// Fixed UI transition delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Time the viewer image stays hidden before its source is swapped.
    pub fade_ms: u64,
    /// Quiet period after the last gallery mutation before re-scanning.
    pub debounce_ms: u64,
}

impl TimingConfig {
    pub fn fade(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fade_ms: 120,
            debounce_ms: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// A drag must move further than this horizontally to navigate.
    pub swipe_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 40.0,
        }
    }
}

/// Selector strings for every part of the page the engine touches.
///
/// Each value is `#id`, `.class` or a tag name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub gallery: String,
    pub item: String,
    pub lightbox: String,
    pub stage: String,
    pub image: String,
    pub caption: String,
    pub prev: String,
    pub next: String,
    pub close: String,
    pub nav_toggle: String,
    pub nav_menu: String,
    pub search_input: String,
    pub upload_button: String,
    pub collections_button: String,
    pub collections_modal: String,
    pub collections_grid: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            gallery: "#gallery".to_string(),
            item: ".item".to_string(),
            lightbox: "#lightbox".to_string(),
            stage: ".lightbox-stage".to_string(),
            image: ".lightbox-image".to_string(),
            caption: ".lightbox-caption".to_string(),
            prev: ".lightbox-prev".to_string(),
            next: ".lightbox-next".to_string(),
            close: ".lightbox-close".to_string(),
            nav_toggle: ".nav-toggle".to_string(),
            nav_menu: ".nav-menu".to_string(),
            search_input: ".search-input".to_string(),
            upload_button: ".upload-btn".to_string(),
            collections_button: ".collections-btn".to_string(),
            collections_modal: "#collections-modal".to_string(),
            collections_grid: ".collections-grid".to_string(),
        }
    }
}

/// Parsed form of [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct Selectors {
    pub gallery: Selector,
    pub item: Selector,
    pub lightbox: Selector,
    pub stage: Selector,
    pub image: Selector,
    pub caption: Selector,
    pub prev: Selector,
    pub next: Selector,
    pub close: Selector,
    pub nav_toggle: Selector,
    pub nav_menu: Selector,
    pub search_input: Selector,
    pub upload_button: Selector,
    pub collections_button: Selector,
    pub collections_modal: Selector,
    pub collections_grid: Selector,
}

impl Default for Selectors {
    fn default() -> Self {
        SelectorConfig::default()
            .resolve()
            .expect("stock selectors must parse")
    }
}

impl Selectors {
    /// Every selector with its config key, in declaration order.
    pub fn named(&self) -> [(&'static str, &Selector); 16] {
        [
            ("gallery", &self.gallery),
            ("item", &self.item),
            ("lightbox", &self.lightbox),
            ("stage", &self.stage),
            ("image", &self.image),
            ("caption", &self.caption),
            ("prev", &self.prev),
            ("next", &self.next),
            ("close", &self.close),
            ("nav_toggle", &self.nav_toggle),
            ("nav_menu", &self.nav_menu),
            ("search_input", &self.search_input),
            ("upload_button", &self.upload_button),
            ("collections_button", &self.collections_button),
            ("collections_modal", &self.collections_modal),
            ("collections_grid", &self.collections_grid),
        ]
    }
}

impl SelectorConfig {
    /// Parse every selector, rejecting malformed and duplicate entries.
    pub fn resolve(&self) -> Result<Selectors, ConfigError> {
        let mut seen: Vec<(&str, Selector)> = Vec::new();
        let mut parse = |key: &'static str, raw: &str| -> Result<Selector, ConfigError> {
            let selector = Selector::parse(raw).ok_or_else(|| {
                ConfigError::Validation(format!(
                    "selectors.{key}: '{raw}' is not an #id, .class or tag selector"
                ))
            })?;
            if let Some((other, _)) = seen.iter().find(|(_, s)| *s == selector) {
                return Err(ConfigError::Validation(format!(
                    "selectors.{key} duplicates selectors.{other}"
                )));
            }
            seen.push((key, selector.clone()));
            Ok(selector)
        };

        Ok(Selectors {
            gallery: parse("gallery", &self.gallery)?,
            item: parse("item", &self.item)?,
            lightbox: parse("lightbox", &self.lightbox)?,
            stage: parse("stage", &self.stage)?,
            image: parse("image", &self.image)?,
            caption: parse("caption", &self.caption)?,
            prev: parse("prev", &self.prev)?,
            next: parse("next", &self.next)?,
            close: parse("close", &self.close)?,
            nav_toggle: parse("nav_toggle", &self.nav_toggle)?,
            nav_menu: parse("nav_menu", &self.nav_menu)?,
            search_input: parse("search_input", &self.search_input)?,
            upload_button: parse("upload_button", &self.upload_button)?,
            collections_button: parse("collections_button", &self.collections_button)?,
            collections_modal: parse("collections_modal", &self.collections_modal)?,
            collections_grid: parse("collections_grid", &self.collections_grid)?,
        })
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
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
/// Returns `Ok(None)` if the directory has no `config.toml`.
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
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, on top of the
/// stock defaults.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(root = %root.display(), "loaded gallery config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Lightbox Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page
# ---------------------------------------------------------------------------
[page]
# Document title, also shown as the navbar brand.
title = "Gallery"

# Render the upload button in the navbar.
upload_enabled = true

# ---------------------------------------------------------------------------
# Timing
# ---------------------------------------------------------------------------
[timing]
# How long the viewer image stays faded out before its source is swapped.
fade_ms = 120

# Bursts of gallery changes closer together than this are coalesced into a
# single re-scan.
debounce_ms = 120

# ---------------------------------------------------------------------------
# Gestures
# ---------------------------------------------------------------------------
[gestures]
# Horizontal drag distance on the image stage that counts as a swipe.
swipe_threshold = 40.0

# ---------------------------------------------------------------------------
# Selectors
# ---------------------------------------------------------------------------
# Each value is "#id", ".class" or a tag name.
[selectors]
gallery = "#gallery"
item = ".item"
lightbox = "#lightbox"
stage = ".lightbox-stage"
image = ".lightbox-image"
caption = ".lightbox-caption"
prev = ".lightbox-prev"
next = ".lightbox-next"
close = ".lightbox-close"
nav_toggle = ".nav-toggle"
nav_menu = ".nav-menu"
search_input = ".search-input"
upload_button = ".upload-btn"
collections_button = ".collections-btn"
collections_modal = "#collections-modal"
collections_grid = ".collections-grid"

# ---------------------------------------------------------------------------
# Collections
# ---------------------------------------------------------------------------
# Map a collection name to the image files that belong to it. An image may
# belong to several collections.
[collections]
# Landscapes = ["001-dawn.jpg", "010-mountains.jpg"]
"##
}
