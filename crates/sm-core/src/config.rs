//! Generator, engine and session configuration
//!
//! Every struct here has defaults matching the shipped game, and can be
//! partially overridden from a JSON file: missing fields keep their default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Could not parse config: {0}")]
    Parse(String),

    #[error("Could not serialize config: {0}")]
    Serialize(String),

    #[error("Grid size {size} is below the minimum of {min}")]
    GridTooSmall { size: usize, min: usize },

    #[error("Minimum room size must be at least 1")]
    ZeroRoomSize,

    #[error("Minimum room size {min} exceeds maximum room size {max}")]
    RoomSizeInverted { min: usize, max: usize },

    #[error("{name} must be within 0..=1, got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("Removal fraction range is inverted: {min} > {max}")]
    RemovalRangeInverted { min: f64, max: f64 },

    #[error("Tick interval must be greater than zero")]
    ZeroTickInterval,

    #[error("Cell size must be greater than zero")]
    ZeroCellSize,

    #[error("A run needs at least one level")]
    NoLevels,
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { name, value })
    }
}

/// Dungeon generator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    pub min_room_size: usize,
    pub max_room_size: usize,
    /// Maximum BSP depth
    pub max_splits: u32,
    /// Cells left empty between a room and its leaf bounds
    pub room_padding: usize,
    /// 0 = exact midpoint splits and rooms filling their leaf, 1 = fully random
    pub split_randomness: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            min_room_size: MIN_ROOM_SIZE,
            max_room_size: MAX_ROOM_SIZE,
            max_splits: MAX_SPLITS,
            room_padding: ROOM_PADDING,
            split_randomness: SPLIT_RANDOMNESS,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
            });
        }
        if self.min_room_size == 0 {
            return Err(ConfigError::ZeroRoomSize);
        }
        if self.min_room_size > self.max_room_size {
            return Err(ConfigError::RoomSizeInverted {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }
        check_fraction("split_randomness", self.split_randomness)
    }
}

/// Corridor mutation engine settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum game time between two mutation ticks
    pub tick_interval_ms: u64,
    pub removal_fraction_min: f64,
    pub removal_fraction_max: f64,
    /// Door cap used when the session has no per-level entry
    pub max_locked_doors: usize,
    /// Minimum Manhattan distance between two locked doors
    pub min_door_spacing: usize,
    /// Start a removal batch when fewer openings than this are queued
    pub removal_backlog: usize,
    pub astar_max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: WALL_UPDATE_INTERVAL_MS,
            removal_fraction_min: REMOVAL_FRACTION_MIN,
            removal_fraction_max: REMOVAL_FRACTION_MAX,
            max_locked_doors: MAX_LOCKED_DOORS,
            min_door_spacing: MIN_DOOR_SPACING,
            removal_backlog: REMOVAL_BACKLOG,
            astar_max_iterations: ASTAR_MAX_ITERATIONS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        check_fraction("removal_fraction_min", self.removal_fraction_min)?;
        check_fraction("removal_fraction_max", self.removal_fraction_max)?;
        if self.removal_fraction_min > self.removal_fraction_max {
            return Err(ConfigError::RemovalRangeInverted {
                min: self.removal_fraction_min,
                max: self.removal_fraction_max,
            });
        }
        Ok(())
    }
}

/// Whole-session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed seed, or `None` to seed from entropy
    pub seed: Option<u64>,
    pub generator: GeneratorConfig,
    pub engine: EngineConfig,
    pub cell_size: u32,
    pub total_levels: u32,
    pub transition_duration_ms: u64,
    /// Door cap for each level; levels past the end use `engine.max_locked_doors`
    pub locked_doors_per_level: Vec<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            generator: GeneratorConfig::default(),
            engine: EngineConfig::default(),
            cell_size: CELL_SIZE,
            total_levels: TOTAL_LEVELS,
            transition_duration_ms: TRANSITION_DURATION_MS,
            locked_doors_per_level: LOCKED_DOORS_PER_LEVEL.to_vec(),
        }
    }
}

impl SessionConfig {
    /// Load a config from a JSON file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Parse a config from a JSON string and validate it
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.engine.validate()?;
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.total_levels == 0 {
            return Err(ConfigError::NoLevels);
        }
        Ok(())
    }

    /// Door cap for a 1-based level number
    pub fn door_cap(&self, level: u32) -> usize {
        level
            .checked_sub(1)
            .and_then(|idx| self.locked_doors_per_level.get(idx as usize))
            .copied()
            .unwrap_or(self.engine.max_locked_doors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{ "seed": 7, "generator": { "grid_size": 50 } }"#)
            .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.generator.grid_size, 50);
        assert_eq!(config.generator.min_room_size, MIN_ROOM_SIZE);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let mut config = SessionConfig::default();
        config.seed = Some(99);
        config.engine.tick_interval_ms = 100;
        let parsed = SessionConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_values() {
        let err = SessionConfig::from_json(r#"{ "generator": { "grid_size": 3 } }"#).unwrap_err();
        assert_eq!(err, ConfigError::GridTooSmall { size: 3, min: MIN_GRID_SIZE });

        let gen_config = GeneratorConfig {
            min_room_size: 8,
            max_room_size: 4,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            gen_config.validate(),
            Err(ConfigError::RoomSizeInverted { min: 8, max: 4 })
        ));

        let gen_config = GeneratorConfig {
            split_randomness: 1.5,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            gen_config.validate(),
            Err(ConfigError::FractionOutOfRange { name: "split_randomness", .. })
        ));

        let engine = EngineConfig {
            removal_fraction_min: 0.7,
            removal_fraction_max: 0.2,
            ..EngineConfig::default()
        };
        assert!(matches!(
            engine.validate(),
            Err(ConfigError::RemovalRangeInverted { .. })
        ));

        let engine = EngineConfig {
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(engine.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SessionConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = SessionConfig::load_from_file(Path::new("/nonexistent/sm-config.json"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_door_cap() {
        let config = SessionConfig::default();
        assert_eq!(config.door_cap(1), 0);
        assert_eq!(config.door_cap(3), 2);
        assert_eq!(config.door_cap(9), 5);
        assert_eq!(config.door_cap(20), MAX_LOCKED_DOORS);
        assert_eq!(config.door_cap(0), MAX_LOCKED_DOORS);
    }
}
