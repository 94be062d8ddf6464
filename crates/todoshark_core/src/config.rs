//! Interaction tuning loaded from the UI shell.
//!
//! # Responsibility
//! - Hold presentation tuning (gesture distances, take-out duration).
//! - Parse JSON overrides; every field falls back to its default.
//!
//! # Invariants
//! - A validated config has finite, positive distances and
//!   `haptic_threshold <= swipe_threshold`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_SWIPE_THRESHOLD: f64 = 100.0;
const DEFAULT_HAPTIC_THRESHOLD: f64 = 80.0;
const DEFAULT_ACTIVATION_DISTANCE: f64 = 10.0;
const DEFAULT_DELETE_THRESHOLD: f64 = 100.0;
const DEFAULT_TAKE_OUT_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Gesture distances in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Release distance that turns a hunt-card drag into an action.
    pub swipe_threshold: f64,
    /// Drag distance that fires the one-shot haptic pulse per direction.
    pub haptic_threshold: f64,
    /// Minimum movement before a drag is captured at all.
    pub activation_distance: f64,
    /// Leftward release distance that requests deletion of a list item.
    pub delete_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            haptic_threshold: DEFAULT_HAPTIC_THRESHOLD,
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            delete_threshold: DEFAULT_DELETE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntConfig {
    /// How long a taken-out task stays out of the hunt queue.
    pub take_out_duration_ms: i64,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            take_out_duration_ms: DEFAULT_TAKE_OUT_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub gesture: GestureConfig,
    pub hunt: HuntConfig,
}

impl CoreConfig {
    /// Parses a JSON override document and validates the result.
    ///
    /// Blank input yields the defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let gesture = &self.gesture;
        for (name, value) in [
            ("swipe_threshold", gesture.swipe_threshold),
            ("haptic_threshold", gesture.haptic_threshold),
            ("activation_distance", gesture.activation_distance),
            ("delete_threshold", gesture.delete_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidDistance { name, value });
            }
        }
        if gesture.haptic_threshold > gesture.swipe_threshold {
            return Err(ConfigError::HapticBeyondSwipe {
                haptic: gesture.haptic_threshold,
                swipe: gesture.swipe_threshold,
            });
        }
        if self.hunt.take_out_duration_ms <= 0 {
            return Err(ConfigError::InvalidTakeOutDuration(
                self.hunt.take_out_duration_ms,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    InvalidDistance { name: &'static str, value: f64 },
    HapticBeyondSwipe { haptic: f64, swipe: f64 },
    InvalidTakeOutDuration(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid config json: {message}"),
            Self::InvalidDistance { name, value } => {
                write!(f, "{name} must be a finite positive distance, got {value}")
            }
            Self::HapticBeyondSwipe { haptic, swipe } => write!(
                f,
                "haptic_threshold ({haptic}) must not exceed swipe_threshold ({swipe})"
            ),
            Self::InvalidTakeOutDuration(value) => {
                write!(f, "take_out_duration_ms must be positive, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn blank_input_yields_defaults() {
        let config = CoreConfig::from_json_str("  ").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.gesture.swipe_threshold, 100.0);
        assert_eq!(config.gesture.haptic_threshold, 80.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = CoreConfig::from_json_str(r#"{"gesture":{"swipe_threshold":140}}"#).unwrap();
        assert_eq!(config.gesture.swipe_threshold, 140.0);
        assert_eq!(config.gesture.delete_threshold, 100.0);
        assert_eq!(config.hunt, Default::default());
    }

    #[test]
    fn haptic_threshold_beyond_swipe_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{"gesture":{"haptic_threshold":150}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::HapticBeyondSwipe { .. }));
    }

    #[test]
    fn non_positive_take_out_duration_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{"hunt":{"take_out_duration_ms":0}}"#).unwrap_err();
        assert_eq!(err, ConfigError::InvalidTakeOutDuration(0));
    }
}
