//! Engine configuration.
//!
//! [`EngineConfig`] is read once at startup, usually from a JSON file. Every
//! field has a default, so a config file only needs to name what it changes:
//!
//! ```
//! use ledge_engine::config::{EngineConfig, FramerateMode};
//!
//! let config = EngineConfig::from_json_str(r#"{ "framerate_mode": "snes_30hz", "frame_skip": true }"#)
//!     .unwrap();
//! assert_eq!(config.framerate_mode, FramerateMode::Snes30Hz);
//! assert_eq!(config.max_entities, 4096);
//! assert!((config.fixed_dt() - 1.0 / 30.0).abs() < f32::EPSILON);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ledge_ecs::entity::DEFAULT_MAX_ENTITIES;
use ledge_ecs::event::DEFAULT_EVENT_CAPACITY;

/// Seed used when a config does not provide one.
pub const DEFAULT_SEED: u64 = 12345;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// FramerateMode
// ---------------------------------------------------------------------------

/// Simulation cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FramerateMode {
    /// 120 ticks per second.
    #[default]
    #[serde(rename = "modern_120hz")]
    Modern120Hz,
    /// 30 ticks per second, optionally rendering every 4th frame.
    #[serde(rename = "snes_30hz")]
    Snes30Hz,
    /// Adaptive presentation with a 60 Hz simulation step.
    #[serde(rename = "adaptive")]
    Adaptive,
}

impl FramerateMode {
    /// Simulation ticks per second.
    pub fn tick_rate(self) -> u32 {
        match self {
            Self::Modern120Hz => 120,
            Self::Snes30Hz => 30,
            Self::Adaptive => 60,
        }
    }

    /// Seconds per simulation tick.
    pub fn fixed_dt(self) -> f32 {
        1.0 / self.tick_rate() as f32
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub framerate_mode: FramerateMode,
    /// Skip presentation frames in SNES mode.
    pub frame_skip: bool,
    /// Maximum number of simultaneously live entities.
    pub max_entities: u32,
    /// Slots per event queue (one is always kept free).
    pub event_capacity: usize,
    /// Base seed for the world's RNG streams.
    pub seed: u64,
}

impl Default for EngineConfig {
    /// 120 Hz, no frame skip, 4096 entities, 256-slot event queues.
    fn default() -> Self {
        Self {
            framerate_mode: FramerateMode::default(),
            frame_skip: false,
            max_entities: DEFAULT_MAX_ENTITIES,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            seed: DEFAULT_SEED,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entities == 0 || self.max_entities == u32::MAX {
            return Err(ConfigError::Invalid {
                field: "max_entities",
                reason: format!("must be in 1..{}, got {}", u32::MAX, self.max_entities),
            });
        }
        if self.event_capacity < 2 {
            return Err(ConfigError::Invalid {
                field: "event_capacity",
                reason: format!("must be at least 2, got {}", self.event_capacity),
            });
        }
        Ok(())
    }

    /// Seconds per simulation tick.
    pub fn fixed_dt(&self) -> f32 {
        self.framerate_mode.fixed_dt()
    }

    /// Whether the host should present frame number `frame`.
    ///
    /// With frame skip on, SNES mode presents every 4th frame; every other
    /// combination presents every frame.
    pub fn should_render(&self, frame: u64) -> bool {
        if !self.frame_skip {
            return true;
        }
        match self.framerate_mode {
            FramerateMode::Snes30Hz => frame % 4 == 0,
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.framerate_mode, FramerateMode::Modern120Hz);
        assert_eq!(config.max_entities, 4096);
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert!((config.fixed_dt() - 1.0 / 120.0).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(
            EngineConfig::from_json_str("{}").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn tick_rates() {
        assert_eq!(FramerateMode::Modern120Hz.tick_rate(), 120);
        assert_eq!(FramerateMode::Snes30Hz.tick_rate(), 30);
        assert_eq!(FramerateMode::Adaptive.tick_rate(), 60);
    }

    #[test]
    fn frame_skip_only_applies_to_snes_mode() {
        let mut config = EngineConfig {
            framerate_mode: FramerateMode::Snes30Hz,
            frame_skip: true,
            ..Default::default()
        };
        let rendered: Vec<u64> = (0..9).filter(|&f| config.should_render(f)).collect();
        assert_eq!(rendered, vec![0, 4, 8]);

        config.framerate_mode = FramerateMode::Adaptive;
        assert!((0..9).all(|f| config.should_render(f)));

        config.framerate_mode = FramerateMode::Snes30Hz;
        config.frame_skip = false;
        assert!((0..9).all(|f| config.should_render(f)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "event_capacity": 1 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "event_capacity",
                ..
            }
        ));

        let err = EngineConfig::from_json_str(r#"{ "max_entities": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "max_entities",
                ..
            }
        ));
    }

    #[test]
    fn unknown_fields_and_bad_json_are_parse_errors() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "fps": 60 }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));
    }
}
