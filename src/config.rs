//! Deck configuration module.
//!
//! Handles loading, validating, and merging `photodeck.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//! Command-line flags are applied last, on the resolved config.
//!
//! ## Config File Location
//!
//! `photodeck.toml` is read from the input directory, or from the path given
//! with `--config`:
//!
//! ```text
//! photos/
//! ├── photodeck.toml           # Optional, overrides stock defaults
//! ├── 2023-summer/
//! │   └── ...
//! └── 2024-winter/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [slides]
//! width = 9144000           # Slide width in EMU (10in)
//! height = 6858000          # Slide height in EMU (7.5in)
//! placement = "letterbox"   # letterbox | fit-width | raw
//! fill = "#000000"          # Letterbox canvas and slide background
//! quality = 90              # JPEG quality of embedded pictures (1-100)
//!
//! [collect]
//! traversal = "flatten"     # flatten | per-folder
//!
//! [transitions]
//! enabled = false           # Also write a copy with transitions
//! kind = "fade"             # fade | push | wipe | cut | dissolve | random
//! duration = 4.0            # Seconds per slide before auto-advance
//! speed = "slow"            # slow | med | fast
//!
//! [output]
//! deck = "Photos_Presentation.pptx"
//! transition_deck = "Photos_Presentation_with_transitions.pptx"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::collect::TraversalPolicy;
use crate::compose::PlacementPolicy;
use crate::imaging::Quality;
use crate::patch::{TransitionKind, TransitionSpec, TransitionSpeed};
use crate::types::{Rgb, SlideGeometry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the input directory.
pub const CONFIG_FILE: &str = "photodeck.toml";

/// OOXML slide size bounds (1in to 56in), in EMU.
const MIN_SLIDE_EMU: i64 = 914_400;
const MAX_SLIDE_EMU: i64 = 51_206_400;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Deck configuration loaded from `photodeck.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeckConfig {
    pub slides: SlidesConfig,
    pub collect: CollectConfig,
    pub transitions: TransitionsConfig,
    pub output: OutputConfig,
    pub processing: ProcessingConfig,
}

impl DeckConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("width", self.slides.width), ("height", self.slides.height)] {
            if !(MIN_SLIDE_EMU..=MAX_SLIDE_EMU).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "slides.{key} must be between {MIN_SLIDE_EMU} and {MAX_SLIDE_EMU} EMU"
                )));
            }
        }
        if !(1..=100).contains(&self.slides.quality) {
            return Err(ConfigError::Validation(
                "slides.quality must be 1-100".into(),
            ));
        }
        if self.slides.fill_color().is_none() {
            return Err(ConfigError::Validation(format!(
                "slides.fill must be a #rrggbb color, got {:?}",
                self.slides.fill
            )));
        }
        if !self.transitions.duration.is_finite() || self.transitions.duration < 0.0 {
            return Err(ConfigError::Validation(
                "transitions.duration must be a non-negative number of seconds".into(),
            ));
        }
        if self.output.deck.trim().is_empty() || self.output.transition_deck.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output file names must not be empty".into(),
            ));
        }
        if self.output.deck == self.output.transition_deck {
            return Err(ConfigError::Validation(
                "output.deck and output.transition_deck must differ".into(),
            ));
        }
        Ok(())
    }
}

/// Slide geometry and picture placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlidesConfig {
    /// Slide width in EMU.
    pub width: i64,
    /// Slide height in EMU.
    pub height: i64,
    pub placement: PlacementPolicy,
    /// `#rrggbb` canvas color for letterboxing.
    pub fill: String,
    /// JPEG quality for embedded pictures.
    pub quality: u32,
}

impl Default for SlidesConfig {
    fn default() -> Self {
        Self {
            width: SlideGeometry::STANDARD.width,
            height: SlideGeometry::STANDARD.height,
            placement: PlacementPolicy::default(),
            fill: "#000000".to_string(),
            quality: Quality::default().value(),
        }
    }
}

impl SlidesConfig {
    pub fn geometry(&self) -> SlideGeometry {
        SlideGeometry {
            width: self.width,
            height: self.height,
        }
    }

    pub fn fill_color(&self) -> Option<Rgb> {
        Rgb::parse_hex(&self.fill)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectConfig {
    pub traversal: TraversalPolicy,
}

/// Optional transition pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionsConfig {
    pub enabled: bool,
    pub kind: TransitionKind,
    /// Seconds each slide stays up.
    pub duration: f64,
    pub speed: TransitionSpeed,
}

impl Default for TransitionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: TransitionKind::default(),
            duration: TransitionSpec::DEFAULT_DURATION_SECS,
            speed: TransitionSpeed::default(),
        }
    }
}

impl TransitionsConfig {
    pub fn spec(&self) -> TransitionSpec {
        TransitionSpec {
            kind: self.kind,
            duration_secs: self.duration,
            speed: self.speed,
        }
    }
}

/// Output file names, relative to the input directory unless `--output`
/// is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub deck: String,
    pub transition_deck: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            deck: "Photos_Presentation.pptx".to_string(),
            transition_deck: "Photos_Presentation_with_transitions.pptx".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
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

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(DeckConfig::default())?)
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

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DeckConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeckConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `photodeck.toml` from `dir`, falling back to defaults.
pub fn load_config(dir: &Path) -> Result<DeckConfig, ConfigError> {
    resolve_config(load_raw_config(&dir.join(CONFIG_FILE))?)
}

/// Load an explicitly named config file. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_file(path: &Path) -> Result<DeckConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    resolve_config(Some(toml::from_str(&content)?))
}

/// Returns a fully-commented stock `photodeck.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photodeck Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file in the photo directory as photodeck.toml, or pass it
# with --config. Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Slides
# ---------------------------------------------------------------------------
[slides]
# Slide size in EMU (914400 per inch). 9144000 x 6858000 is 10in x 7.5in (4:3).
# For 16:9 use width = 12192000.
width = 9144000
height = 6858000

# How each picture sits on its slide:
#   "letterbox" - fit inside the slide, centered on a solid canvas
#   "fit-width" - scale to slide width, center vertically (may overflow)
#   "raw"       - native size at 96 DPI, top-left corner
placement = "letterbox"

# Canvas color behind letterboxed pictures, also used as slide background.
fill = "#000000"

# JPEG quality for embedded pictures (1-100).
quality = 90

# ---------------------------------------------------------------------------
# Collection
# ---------------------------------------------------------------------------
[collect]
# How nested folders are ordered (names always sort naturally: 2 before 10):
#   "flatten"    - one sort over (folder path, file name)
#   "per-folder" - root files first, then each top-level folder in turn
traversal = "flatten"

# ---------------------------------------------------------------------------
# Transitions
# ---------------------------------------------------------------------------
[transitions]
# Also write a copy of the deck with a transition on every slide.
enabled = false

# Effect: "fade", "push", "wipe", "cut", "dissolve" or "random".
kind = "fade"

# Seconds each slide stays up before advancing automatically.
duration = 4.0

# Speed of the effect itself: "slow", "med" or "fast".
speed = "slow"

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# File names, written into the photo directory unless --output is given.
deck = "Photos_Presentation.pptx"
transition_deck = "Photos_Presentation_with_transitions.pptx"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers. Omit for auto (= number of CPU cores).
# Values above the core count are clamped down.
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = DeckConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slides.geometry(), SlideGeometry::STANDARD);
        assert_eq!(config.slides.fill_color(), Some(Rgb::BLACK));
        assert_eq!(config.collect.traversal, TraversalPolicy::Flatten);
        assert!(!config.transitions.enabled);
    }

    #[test]
    fn stock_toml_matches_defaults() {
        let parsed: DeckConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, DeckConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[slides]
placement = "fit-width"

[transitions]
enabled = true
duration = 2.5
"#;
        let config = resolve_config(Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.slides.placement, PlacementPolicy::FitWidth);
        assert_eq!(config.slides.width, 9_144_000);
        assert!(config.transitions.enabled);
        assert_eq!(config.transitions.spec().advance_after_ms(), 2500);
        assert_eq!(config.transitions.kind, TransitionKind::Fade);
    }

    #[test]
    fn parse_enum_spellings() {
        let toml = r#"
[collect]
traversal = "per-folder"

[transitions]
kind = "dissolve"
speed = "med"
"#;
        let config: DeckConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.collect.traversal, TraversalPolicy::PerFolder);
        assert_eq!(config.transitions.kind, TransitionKind::Dissolve);
        assert_eq!(config.transitions.speed, TransitionSpeed::Med);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), DeckConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r##"
[slides]
width = 12192000
fill = "#202020"
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.slides.geometry(), SlideGeometry::WIDESCREEN);
        assert_eq!(config.slides.fill_color(), Some(Rgb([0x20, 0x20, 0x20])));
    }

    #[test]
    fn load_config_file_requires_the_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[slides\nwidth = ").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[slides]
width = 1
height = 2
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str("[slides]\nheight = 3").unwrap();
        let merged = merge_toml(base, overlay);
        let slides = merged.get("slides").unwrap();
        assert_eq!(slides.get("width").unwrap().as_integer(), Some(1));
        assert_eq!(slides.get("height").unwrap().as_integer(), Some(3));
    }

    // =========================================================================
    // Unknown keys
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<DeckConfig, _> = toml::from_str("[slides]\nqualty = 90");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<DeckConfig, _> = toml::from_str("[slidez]\nquality = 90");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_placement_rejected() {
        let result: Result<DeckConfig, _> = toml::from_str("[slides]\nplacement = \"crop\"");
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_quality_bounds() {
        let mut config = DeckConfig::default();
        config.slides.quality = 100;
        assert!(config.validate().is_ok());
        config.slides.quality = 0;
        assert!(config.validate().unwrap_err().to_string().contains("quality"));
        config.slides.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_slide_size_bounds() {
        let mut config = DeckConfig::default();
        config.slides.width = 100;
        assert!(config.validate().unwrap_err().to_string().contains("width"));
        config.slides.width = MAX_SLIDE_EMU + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fill_color() {
        let mut config = DeckConfig::default();
        config.slides.fill = "black".into();
        assert!(config.validate().unwrap_err().to_string().contains("fill"));
    }

    #[test]
    fn validate_duration() {
        let mut config = DeckConfig::default();
        config.transitions.duration = -1.0;
        assert!(config.validate().is_err());
        config.transitions.duration = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_output_names_differ() {
        let mut config = DeckConfig::default();
        config.output.transition_deck = config.output.deck.clone();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_never_zero() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }
}
