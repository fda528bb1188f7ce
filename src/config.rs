//! Sheet configuration module.
//!
//! Handles loading, validating, and merging `print-sheet.toml`. Every value
//! has a stock default; a config file only needs the keys it wants to
//! change, and is merged on top of the defaults before validation.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! default_page = "4x6_L"       # Used when a requested page key is unknown
//! default_standard = "35x45"   # Used when a requested standard key is unknown
//! background = "#ffffff"       # Sheet background
//!
//! [layout]
//! margin = 25                  # Empty border used when fitting (px)
//! gap = 20                     # Space between cells (px)
//! minimum_acceptable = 8       # Below this upright count, a denser rotated grid wins
//!
//! [guides]
//! color = "#cccccc"            # Cut-guide colour
//! width = 1                    # Stroke width (px), 0 disables guides
//! dash = 10                    # Dash length (px), 0 = solid
//! dash_gap = 10                # Space between dashes (px), 0 = solid
//!
//! [output]
//! format = "jpeg"              # "jpeg" or "png"
//! quality = 100                # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4            # Max parallel batch workers (omit for auto = CPU cores)
//!
//! [pages.photo_strip]          # Extra page sizes (300 DPI pixels)
//! width = 600
//! height = 1800
//! label = "2x6 Strip"
//!
//! [standards.schengen]         # Extra photo standards
//! width = 413
//! height = 531
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::Catalog;
use crate::imaging::{GuideStyle, LayoutParams, OutputFormat, RenderStyle, parse_hex_color};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILENAME: &str = "print-sheet.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Sheet configuration loaded from `print-sheet.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetConfig {
    /// Page used when a requested page key is unknown.
    pub default_page: String,
    /// Standard used when a requested standard key is unknown.
    pub default_standard: String,
    /// Sheet background colour (`#rrggbb`).
    pub background: String,
    /// Fitting parameters shared by every sheet.
    pub layout: LayoutParams,
    /// Cut-guide appearance.
    pub guides: GuideConfig,
    /// Encoding of the finished sheet.
    pub output: OutputConfig,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
    /// Extra (or overriding) page sizes by key.
    pub pages: BTreeMap<String, SizeEntry>,
    /// Extra (or overriding) photo standards by key.
    pub standards: BTreeMap<String, SizeEntry>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            default_page: "4x6_L".to_string(),
            default_standard: "35x45".to_string(),
            background: "#ffffff".to_string(),
            layout: LayoutParams::default(),
            guides: GuideConfig::default(),
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
            pages: BTreeMap::new(),
            standards: BTreeMap::new(),
        }
    }
}

impl SheetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(format!(
                "output.quality must be 1-100, got {}",
                self.output.quality
            )));
        }
        if parse_hex_color(&self.background).is_none() {
            return Err(ConfigError::Validation(format!(
                "background: invalid colour {:?}",
                self.background
            )));
        }
        if parse_hex_color(&self.guides.color).is_none() {
            return Err(ConfigError::Validation(format!(
                "guides.color: invalid colour {:?}",
                self.guides.color
            )));
        }
        for (table, entries) in [("pages", &self.pages), ("standards", &self.standards)] {
            for (key, entry) in entries {
                if entry.width == 0 || entry.height == 0 {
                    return Err(ConfigError::Validation(format!(
                        "{table}.{key}: width and height must be non-zero"
                    )));
                }
            }
        }

        let catalog = Catalog::from_config(self);
        if catalog.page(&self.default_page).is_none() {
            return Err(ConfigError::Validation(format!(
                "default_page {:?} is not a known page",
                self.default_page
            )));
        }
        if catalog.standard(&self.default_standard).is_none() {
            return Err(ConfigError::Validation(format!(
                "default_standard {:?} is not a known photo standard",
                self.default_standard
            )));
        }
        Ok(())
    }

    /// Background and guide colours resolved for rendering.
    ///
    /// Colours are checked by [`validate`](Self::validate); anything that
    /// slipped through falls back to the stock colour.
    pub fn render_style(&self) -> RenderStyle {
        let stock = RenderStyle::default();
        RenderStyle {
            background: parse_hex_color(&self.background).unwrap_or(stock.background),
            guides: GuideStyle {
                color: parse_hex_color(&self.guides.color).unwrap_or(stock.guides.color),
                width: self.guides.width,
                dash: self.guides.dash,
                gap: self.guides.dash_gap,
            },
        }
    }
}

/// A page or photo size in 300 DPI pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeEntry {
    pub width: u32,
    pub height: u32,
    /// Display name; defaults to the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Cut-guide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuideConfig {
    pub color: String,
    pub width: u32,
    pub dash: u32,
    pub dash_gap: u32,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            color: "#cccccc".to_string(),
            width: 1,
            dash: 10,
            dash_gap: 10,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG quality (1 = worst, 100 = best). Ignored for PNG.
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 100,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
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
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SheetConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock config does not serialize: {e}")))
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SheetConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SheetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SheetConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock `print-sheet.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# print-sheet configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.
#
# All sizes are pixels at 300 DPI.

# Page used when a requested page key is unknown.
default_page = "4x6_L"

# Photo standard used when a requested standard key is unknown.
default_standard = "35x45"

# Sheet background colour.
background = "#ffffff"

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Empty border kept around the grid when counting how many photos fit.
# The finished grid is always centered on the page.
margin = 25

# Space between neighbouring photos (room for a scissor cut).
gap = 20

# Photos are placed upright unless turning them 90 degrees fits strictly
# more AND upright fits fewer than this many. 8 keeps the classic
# 8-up 4x6 sheet.
minimum_acceptable = 8

# ---------------------------------------------------------------------------
# Cut guides
# ---------------------------------------------------------------------------
[guides]
color = "#cccccc"
# Stroke width; 0 disables guides.
width = 1
# Dash pattern; set either to 0 for a solid line.
dash = 10
dash_gap = 10

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# "jpeg" or "png".
format = "jpeg"
# JPEG quality (1-100).
quality = 100

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for `batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Extra page sizes and photo standards
# ---------------------------------------------------------------------------
# Entries with a built-in key replace the built-in size.
#
# [pages.strip_P]
# width = 600
# height = 1800
# label = "2x6 Strip (Portrait)"
#
# [standards.5x5cm]
# width = 591
# height = 591
# label = "50x50mm"
"##
}
