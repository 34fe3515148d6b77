//! Layout and view configuration
//!
//! Every option has a default, so an empty config file (or none at all) is
//! valid. Files are JSON or YAML, picked by extension.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The config extension is not json/yaml/yml
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// An option is outside its valid range
    #[error("invalid value for {option}: {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },
}

/// Configuration for the force simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Target spring length per link
    pub link_rest_length: f64,
    /// Spring stiffness, scaled per link by its weight
    pub link_stiffness: f64,
    /// Repulsion magnitude (negative = repulsion), inverse-square
    pub charge_strength: f64,
    /// Floor for the repulsion distance
    pub distance_min: f64,
    /// Pull of the node centroid toward the canvas center
    pub center_strength: f64,
    /// Extra gap enforced beyond the radius sum
    pub collision_padding: f64,
    /// Collision relaxation passes per tick
    pub collision_iterations: usize,
    /// Total simulation iterations
    pub tick_count: usize,
    /// Per-tick velocity multiplier (friction)
    pub velocity_decay: f64,
    /// Per-tick speed cap
    pub max_velocity: f64,
    /// Seed for initial placement
    pub seed: u64,
    /// Optional wall-clock budget for the tick loop
    pub time_budget_ms: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            link_rest_length: 120.0,
            link_stiffness: 0.1,
            charge_strength: -30_000.0,
            distance_min: 1.0,
            center_strength: 0.05,
            collision_padding: 4.0,
            collision_iterations: 4,
            tick_count: 300,
            velocity_decay: 0.6,
            max_velocity: 40.0,
            seed: 0x5EED,
            time_budget_ms: None,
        }
    }
}

impl LayoutConfig {
    /// Check every option against its valid range
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("linkRestLength", self.link_rest_length)?;
        positive("distanceMin", self.distance_min)?;
        positive("maxVelocity", self.max_velocity)?;
        non_negative("linkStiffness", self.link_stiffness)?;
        non_negative("centerStrength", self.center_strength)?;
        non_negative("collisionPadding", self.collision_padding)?;

        if !self.charge_strength.is_finite() || self.charge_strength > 0.0 {
            return Err(invalid(
                "chargeStrength",
                format!("must be zero or negative, got {}", self.charge_strength),
            ));
        }
        if !(self.velocity_decay > 0.0 && self.velocity_decay <= 1.0) {
            return Err(invalid(
                "velocityDecay",
                format!("must be in (0, 1], got {}", self.velocity_decay),
            ));
        }
        if self.tick_count == 0 {
            return Err(invalid("tickCount", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Configuration for the pan/zoom view transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Lower zoom clamp
    pub min_scale: f64,
    /// Upper zoom clamp
    pub max_scale: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.3,
            max_scale: 3.0,
        }
    }
}

impl ViewConfig {
    /// Check that the scale range is positive and non-empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("minScale", self.min_scale)?;
        positive("maxScale", self.max_scale)?;
        if self.min_scale > self.max_scale {
            return Err(invalid(
                "minScale",
                format!(
                    "must not exceed maxScale ({} > {})",
                    self.min_scale, self.max_scale
                ),
            ));
        }
        Ok(())
    }
}

/// Complete configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketMapConfig {
    pub layout: LayoutConfig,
    pub view: ViewConfig,
}

impl MarketMapConfig {
    /// Load and validate a config file (.json, .yaml or .yml)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;

        let config: Self = match ext.as_str() {
            "json" => serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate both sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate()?;
        self.view.validate()
    }
}

fn invalid(option: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { option, reason }
}

fn positive(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(option, format!("must be positive, got {value}")))
    }
}

fn non_negative(option: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(option, format!("must not be negative, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = MarketMapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout.tick_count, 300);
        assert_eq!(config.layout.link_rest_length, 120.0);
        assert_eq!(config.view.min_scale, 0.3);
        assert_eq!(config.view.max_scale, 3.0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "layout:\n  tickCount: 50\n  chargeStrength: -500\nview:\n  maxScale: 8\n";
        let config: MarketMapConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.layout.tick_count, 50);
        assert_eq!(config.layout.charge_strength, -500.0);
        assert_eq!(config.layout.link_rest_length, 120.0);
        assert_eq!(config.view.max_scale, 8.0);
        assert_eq!(config.view.min_scale, 0.3);
    }

    #[test]
    fn rejects_repulsive_sign_error() {
        let layout = LayoutConfig {
            charge_strength: 300.0,
            ..Default::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("chargeStrength"));
    }

    #[test]
    fn rejects_decay_out_of_range() {
        for decay in [0.0, 1.5, f64::NAN] {
            let layout = LayoutConfig {
                velocity_decay: decay,
                ..Default::default()
            };
            assert!(layout.validate().is_err(), "decay {decay} accepted");
        }
    }

    #[test]
    fn rejects_inverted_scale_range() {
        let view = ViewConfig {
            min_scale: 4.0,
            max_scale: 2.0,
        };
        assert!(matches!(
            view.validate(),
            Err(ConfigError::Invalid {
                option: "minScale",
                ..
            })
        ));
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"layout": {{"seed": 7, "tickCount": 10}}}}"#).unwrap();

        let config = MarketMapConfig::load(file.path()).unwrap();
        assert_eq!(config.layout.seed, 7);
        assert_eq!(config.layout.tick_count, 10);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        assert!(matches!(
            MarketMapConfig::load(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn load_validates_values() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "layout:\n  tickCount: 0").unwrap();
        assert!(matches!(
            MarketMapConfig::load(file.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
