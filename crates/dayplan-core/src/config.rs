//! TOML-based planner configuration.
//!
//! Aggregates the knobs of every core stage (grid step, packer thresholds,
//! rest caps, travel/buffer heuristics, fallback session defaults) into one
//! struct that callers pass into each planning run -- there is no
//! process-wide mutable state. Stored at `~/.config/dayplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clock::GRID_MINUTES;
use crate::error::ConfigError;
use crate::packer::PackerConfig;
use crate::planner::PlacementStrategy;
use crate::refine::RefineConfig;

/// Planner configuration.
///
/// Serialized to/from TOML at `~/.config/dayplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Quantization step for all placements, in minutes.
    #[serde(default = "default_grid_minutes")]
    pub grid_minutes: i64,
    /// Placement strategy for work items.
    #[serde(default)]
    pub strategy: PlacementStrategy,
    #[serde(default)]
    pub packer: PackerConfig,
    #[serde(default)]
    pub refine: RefineConfig,
    /// Fixed travel heuristic inserted before activities, in minutes.
    #[serde(default = "default_travel_minutes")]
    pub travel_minutes: i64,
    /// Buffer left after each packed activity, in minutes.
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    /// Session length for the sequential fallback strategy, in minutes.
    #[serde(default = "default_session_minutes")]
    pub session_minutes: i64,
}

fn default_grid_minutes() -> i64 {
    GRID_MINUTES
}

fn default_travel_minutes() -> i64 {
    20
}

fn default_buffer_minutes() -> i64 {
    10
}

fn default_session_minutes() -> i64 {
    60
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            grid_minutes: default_grid_minutes(),
            strategy: PlacementStrategy::default(),
            packer: PackerConfig::default(),
            refine: RefineConfig::default(),
            travel_minutes: default_travel_minutes(),
            buffer_minutes: default_buffer_minutes(),
            session_minutes: default_session_minutes(),
        }
    }
}

impl PlannerConfig {
    /// Path to the configuration file.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dayplan").join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Load from an explicit path.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save to the default configuration path, creating parent directories.
    ///
    /// # Errors
    /// Returns an error when the path cannot be resolved or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or_else(|| ConfigError::ParseFailed(
            "could not resolve configuration directory".to_string(),
        ))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        let contents = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns the first out-of-range value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_minutes < 1 {
            return Err(ConfigError::InvalidValue {
                key: "grid_minutes".into(),
                message: format!("must be at least 1, got {}", self.grid_minutes),
            });
        }
        if !(0.0..=1.0).contains(&self.refine.rest_max_ratio) {
            return Err(ConfigError::InvalidValue {
                key: "refine.rest_max_ratio".into(),
                message: format!("must be within 0..=1, got {}", self.refine.rest_max_ratio),
            });
        }
        if self.packer.min_block < 0 {
            return Err(ConfigError::InvalidValue {
                key: "packer.min_block".into(),
                message: format!("must not be negative, got {}", self.packer.min_block),
            });
        }
        if self.session_minutes < 1 {
            return Err(ConfigError::InvalidValue {
                key: "session_minutes".into(),
                message: format!("must be at least 1, got {}", self.session_minutes),
            });
        }
        Ok(())
    }
}
