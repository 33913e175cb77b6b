//! Configuration for the narration pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Detector output filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections below this confidence are dropped before tracking
    pub confidence_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
        }
    }
}

/// Frame-to-frame tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// IoU a detection must exceed to continue an existing track
    pub iou_threshold: f64,
    /// Frames a track may go unmatched before it is dropped
    pub allowed_absence: u64,
    /// Matched frames required before a track is reported
    pub min_frames_for_track: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.9,
            allowed_absence: 5,
            min_frames_for_track: 1,
        }
    }
}

/// Absorption of nested or duplicate detections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubsumptionConfig {
    pub enabled: bool,
    /// Fraction of a box's own area that must be covered for it to be absorbed
    pub overlap_threshold: f64,
    /// Label groups; the first label of each group absorbs the others
    pub groups: Vec<Vec<String>>,
}

impl Default for SubsumptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overlap_threshold: 0.9,
            groups: Vec::new(),
        }
    }
}

/// Facts about the environment used to answer spatial queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Normalized x position separating "left" from "ahead"
    pub left_boundary: f64,
    /// Normalized x position separating "ahead" from "right"
    pub right_boundary: f64,
    /// Vertical gap tolerated between an item and the item it rests on
    pub max_on_top_gap: f64,
    pub furniture: Vec<String>,
    pub wall_and_ceiling: Vec<String>,
    pub not_normally_on_floor: Vec<String>,
    /// Labels reported as "unknown item" because they cannot plausibly be present
    pub impossible_items: Vec<String>,
    pub custom_categories: BTreeMap<String, Vec<String>>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            left_boundary: 0.33,
            right_boundary: 0.66,
            max_on_top_gap: 0.0,
            furniture: Vec::new(),
            wall_and_ceiling: Vec::new(),
            not_normally_on_floor: Vec::new(),
            impossible_items: Vec::new(),
            custom_categories: BTreeMap::new(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    pub detection: DetectionConfig,
    pub tracker: TrackerConfig,
    pub subsumption: SubsumptionConfig,
    pub scene: SceneConfig,
}

fn check_fraction(name: &str, value: f64) -> std::result::Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} must be between 0.0 and 1.0, got {}", name, value));
    }
    Ok(())
}

impl NarrationConfig {
    /// Load configuration from a file, choosing the format by extension.
    ///
    /// `.toml`, `.yaml`/`.yml` and `.json` are recognised. Anything else is
    /// tried as TOML, then YAML, then JSON. The result is validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let config = match extension.as_deref() {
            Some("toml") => toml::from_str::<NarrationConfig>(&content)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str::<NarrationConfig>(&content)?,
            Some("json") => serde_json::from_str::<NarrationConfig>(&content)?,
            _ => Self::parse_any(&content)?,
        };

        config.validate().map_err(Error::Configuration)?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NarrationConfig = toml::from_str(content)?;
        config.validate().map_err(Error::Configuration)?;
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: NarrationConfig = serde_yaml::from_str(content)?;
        config.validate().map_err(Error::Configuration)?;
        Ok(config)
    }

    fn parse_any(content: &str) -> Result<Self> {
        if let Ok(config) = toml::from_str::<NarrationConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_yaml::from_str::<NarrationConfig>(content) {
            return Ok(config);
        }

        if let Ok(config) = serde_json::from_str::<NarrationConfig>(content) {
            return Ok(config);
        }

        Err(Error::Deserialization(
            "configuration is not valid TOML, YAML or JSON".to_string(),
        ))
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        check_fraction(
            "detection.confidence_threshold",
            self.detection.confidence_threshold,
        )?;
        check_fraction("tracker.iou_threshold", self.tracker.iou_threshold)?;
        check_fraction(
            "subsumption.overlap_threshold",
            self.subsumption.overlap_threshold,
        )?;
        check_fraction("scene.left_boundary", self.scene.left_boundary)?;
        check_fraction("scene.right_boundary", self.scene.right_boundary)?;

        if self.scene.left_boundary >= self.scene.right_boundary {
            return Err(format!(
                "scene.left_boundary ({}) must be below scene.right_boundary ({})",
                self.scene.left_boundary, self.scene.right_boundary
            ));
        }

        if !(self.scene.max_on_top_gap >= 0.0) {
            return Err("scene.max_on_top_gap must not be negative".to_string());
        }

        if let Some(index) = self.subsumption.groups.iter().position(|g| g.is_empty()) {
            return Err(format!("subsumption.groups[{}] is empty", index));
        }

        Ok(())
    }
}
