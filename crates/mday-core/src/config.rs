//! Engine configuration.
//!
//! [`EngineConfig`] collects every tunable of the engine: scheduler rate,
//! viewport defaults, zoom and pan animation, and movement physics constants.
//! Missing fields fall back to their defaults, so a config file only needs to
//! name what it overrides.
//!
//! # Example
//!
//! ```
//! use mday_core::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "target_tps": 30 }"#).unwrap();
//! assert_eq!(config.target_tps, 30);
//! assert_eq!(config.scale_frames, 12);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for the scheduler, view transform and mover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheduler activations per second.
    pub target_tps: u32,
    /// Initial viewport width in pixels.
    pub viewport_width: u32,
    /// Initial viewport height in pixels.
    pub viewport_height: u32,
    /// Lowest allowed scale (pixels per world unit).
    pub min_scale: f64,
    /// Highest allowed scale (pixels per world unit).
    pub max_scale: f64,
    /// Scale at startup.
    pub initial_scale: f64,
    /// Scale multiplier applied per zoom-in step (zoom-out divides by it).
    pub zoom_factor: f64,
    /// Ticks over which a zoom step is animated.
    pub scale_frames: u32,
    /// Ticks over which a keyboard pan is animated.
    pub pan_frames: u32,
    /// Fraction of the visible extent covered by one keyboard pan.
    pub pan_percent: f64,
    /// Seconds of movement integrated per mover tick.
    pub movement_time_step: f64,
    /// Heading error, in degrees, above which a unit turns at full rate
    /// without being considered aligned.
    pub heading_lock_degrees: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            viewport_width: 1280,
            viewport_height: 720,
            min_scale: 0.02,
            max_scale: 5.0,
            initial_scale: 1.0,
            zoom_factor: 1.5,
            scale_frames: 12,
            pan_frames: 12,
            pan_percent: 0.10,
            movement_time_step: 1.0 / 30.0,
            heading_lock_degrees: 20.0,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.target_tps == 0 {
            return Err(invalid("target_tps", "must be at least 1"));
        }
        if !(self.min_scale > 0.0 && self.min_scale.is_finite()) {
            return Err(invalid("min_scale", "must be positive and finite"));
        }
        if !(self.max_scale >= self.min_scale && self.max_scale.is_finite()) {
            return Err(invalid("max_scale", "must be finite and >= min_scale"));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.initial_scale) {
            return Err(invalid(
                "initial_scale",
                format!("must lie in [{}, {}]", self.min_scale, self.max_scale),
            ));
        }
        if !(self.zoom_factor > 1.0 && self.zoom_factor.is_finite()) {
            return Err(invalid("zoom_factor", "must be finite and > 1"));
        }
        if self.scale_frames == 0 {
            return Err(invalid("scale_frames", "must be at least 1"));
        }
        if self.pan_frames == 0 {
            return Err(invalid("pan_frames", "must be at least 1"));
        }
        if !(self.pan_percent > 0.0 && self.pan_percent.is_finite()) {
            return Err(invalid("pan_percent", "must be positive and finite"));
        }
        if !(self.movement_time_step > 0.0 && self.movement_time_step.is_finite()) {
            return Err(invalid("movement_time_step", "must be positive and finite"));
        }
        if !(self.heading_lock_degrees > 0.0 && self.heading_lock_degrees < 180.0) {
            return Err(invalid("heading_lock_degrees", "must lie in (0, 180)"));
        }
        Ok(())
    }

    /// Period between two scheduler activations.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.target_tps.max(1)))
    }

    /// Heading lock threshold in radians.
    #[must_use]
    pub fn heading_lock(&self) -> f64 {
        self.heading_lock_degrees.to_radians()
    }
}

// =============================================================================
// Tests
// =============================================================================
