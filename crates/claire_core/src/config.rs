//! Demo configuration loaded from JSON.
//!
//! Every field has a default matching the stock Claire demo, so an empty
//! object (or a missing file) yields the stock setup. Validation runs on load
//! and rejects regions that do not fit their atlas, ambiguous key bindings and
//! a zero debounce interval.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::atlas_cycle::{AtlasCycler, AtlasRegion, FaceFeature, GateMode, DEFAULT_DEBOUNCE_MS};
use crate::character::CharacterRig;
use crate::input::Key;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub debounce_ms: u64,
    pub gate: GateMode,
    pub regions: RegionSet,
    pub bindings: KeyBindings,
    pub character: CharacterRig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            gate: GateMode::default(),
            regions: RegionSet::default(),
            bindings: KeyBindings::default(),
            character: CharacterRig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Claire Face Demo".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum RegionSpec {
    Grid {
        index_max: u32,
        rows: u32,
        cell_width: f32,
        cell_height: f32,
    },
    Strip {
        index_max: u32,
        cell_height: f32,
    },
}

impl RegionSpec {
    pub fn build(&self) -> Result<AtlasRegion, String> {
        match *self {
            Self::Grid {
                index_max,
                rows,
                cell_width,
                cell_height,
            } => AtlasRegion::grid(index_max, rows, cell_width, cell_height),
            Self::Strip {
                index_max,
                cell_height,
            } => AtlasRegion::strip(index_max, cell_height),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RegionSet {
    pub eyes: RegionSpec,
    pub eyebrows: RegionSpec,
    pub mouth: RegionSpec,
}

impl RegionSet {
    pub fn get(&self, feature: FaceFeature) -> &RegionSpec {
        match feature {
            FaceFeature::Eyes => &self.eyes,
            FaceFeature::Eyebrows => &self.eyebrows,
            FaceFeature::Mouth => &self.mouth,
        }
    }
}

impl Default for RegionSet {
    fn default() -> Self {
        Self {
            eyes: RegionSpec::Grid {
                index_max: 30,
                rows: 10,
                cell_width: 0.2,
                cell_height: 0.1,
            },
            eyebrows: RegionSpec::Strip {
                index_max: 10,
                cell_height: 0.1,
            },
            mouth: RegionSpec::Grid {
                index_max: 30,
                rows: 10,
                cell_width: 0.1,
                cell_height: 0.1,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct KeyBindings {
    pub eyes: Key,
    pub eyebrows: Key,
    pub mouth: Key,
}

impl KeyBindings {
    pub fn key_for(&self, feature: FaceFeature) -> Key {
        match feature {
            FaceFeature::Eyes => self.eyes,
            FaceFeature::Eyebrows => self.eyebrows,
            FaceFeature::Mouth => self.mouth,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            eyes: Key::W,
            eyebrows: Key::E,
            mouth: Key::R,
        }
    }
}

/// Quits the demo; never bindable to a feature.
pub const QUIT_KEY: Key = Key::Escape;

impl DemoConfig {
    pub fn build_cycler(&self, now_ms: u64) -> Result<AtlasCycler, String> {
        let eyes = build_region(&self.regions, FaceFeature::Eyes)?;
        let eyebrows = build_region(&self.regions, FaceFeature::Eyebrows)?;
        let mouth = build_region(&self.regions, FaceFeature::Mouth)?;
        Ok(AtlasCycler::new(
            eyes,
            eyebrows,
            mouth,
            self.gate,
            self.debounce_ms,
            now_ms,
        ))
    }
}

fn build_region(regions: &RegionSet, feature: FaceFeature) -> Result<AtlasRegion, String> {
    regions
        .get(feature)
        .build()
        .map_err(|e| format!("{e} (region '{feature}')"))
}

pub fn load_config_from_path(path: &Path) -> Result<DemoConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Missing file falls back to defaults; a present but broken file is an error.
pub fn load_config_or_default(path: &Path) -> Result<DemoConfig, String> {
    if !path.exists() {
        log::warn!(
            "Config '{}' was not found, using built-in defaults.",
            path.display()
        );
        return Ok(DemoConfig::default());
    }
    load_config_from_path(path)
}

fn validate_config(config: &DemoConfig) -> Result<(), String> {
    if config.debounce_ms == 0 {
        return Err("Config validation failed: debounce_ms must be > 0".to_string());
    }
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window width/height must be > 0".to_string());
    }

    for feature in FaceFeature::ALL {
        build_region(&config.regions, feature)
            .map_err(|e| format!("Config validation failed: {e}"))?;
    }

    let mut seen: Vec<(Key, FaceFeature)> = Vec::new();
    for feature in FaceFeature::ALL {
        let key = config.bindings.key_for(feature);
        if key == QUIT_KEY {
            return Err(format!(
                "Config validation failed: '{feature}' is bound to the quit key {key}"
            ));
        }
        if let Some((_, other)) = seen.iter().find(|(k, _)| *k == key) {
            return Err(format!(
                "Config validation failed: key {key} is bound to both '{other}' and '{feature}'"
            ));
        }
        seen.push((key, feature));
    }

    config.character.validate()?;
    Ok(())
}
