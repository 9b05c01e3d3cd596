//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup. Example:
//!
//! ```toml
//! [display]
//! width = 1920
//! height = 1080
//!
//! [pointer]
//! deadzone = 0.12
//! analog_speed = 18.0
//!
//! [flight]
//! base_speed = 14.0
//! toggle_key = "KeyF"
//!
//! [frame]
//! rate_hz = 60
//!
//! [logging]
//! level = "info"
//! ```

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{InputError, Result};
use crate::gamepad::deadzone::{DEFAULT_DEADZONE, MAX_DEADZONE};
use crate::keyboard::{normalize_key, FlightKey};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub flight: FlightConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Headless viewport size in pixels
#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,
}

/// Gamepad virtual pointer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PointerConfig {
    #[serde(default = "default_pointer_enabled")]
    pub enabled: bool,

    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    /// Pixels per frame at full stick deflection
    #[serde(default = "default_analog_speed")]
    pub analog_speed: f32,

    /// Pixels per frame while steering with the d-pad
    #[serde(default = "default_dpad_speed")]
    pub dpad_speed: f32,

    /// Minimum distance from the viewport edge in pixels
    #[serde(default = "default_margin")]
    pub margin: f32,
}

/// Free-flight camera configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FlightConfig {
    /// World units per second
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,

    #[serde(default = "default_boost_multiplier")]
    pub boost_multiplier: f32,

    #[serde(default = "default_slow_multiplier")]
    pub slow_multiplier: f32,

    /// Velocity smoothing rate, per second
    #[serde(default = "default_responsiveness")]
    pub responsiveness: f32,

    /// Coast-down rate after flight is disabled, per second
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,

    #[serde(default = "default_toggle_key")]
    pub toggle_key: String,
}

/// Frame loop configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FrameConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; console only when empty
    #[serde(default)]
    pub directory: String,
}

// Default value functions
fn default_width() -> u32 { 1280 }
fn default_height() -> u32 { 720 }

fn default_pointer_enabled() -> bool { true }
fn default_deadzone() -> f32 { DEFAULT_DEADZONE }
fn default_analog_speed() -> f32 { 18.0 }
fn default_dpad_speed() -> f32 { 10.0 }
fn default_margin() -> f32 { 6.0 }

fn default_base_speed() -> f32 { 14.0 }
fn default_boost_multiplier() -> f32 { 3.0 }
fn default_slow_multiplier() -> f32 { 0.3 }
fn default_responsiveness() -> f32 { 10.0 }
fn default_decay_rate() -> f32 { 6.0 }
fn default_toggle_key() -> String { "KeyF".to_string() }

fn default_rate_hz() -> u32 { 60 }

fn default_log_level() -> String { "info".to_string() }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            enabled: default_pointer_enabled(),
            deadzone: default_deadzone(),
            analog_speed: default_analog_speed(),
            dpad_speed: default_dpad_speed(),
            margin: default_margin(),
        }
    }
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            base_speed: default_base_speed(),
            boost_multiplier: default_boost_multiplier(),
            slow_multiplier: default_slow_multiplier(),
            responsiveness: default_responsiveness(),
            decay_rate: default_decay_rate(),
            toggle_key: default_toggle_key(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            rate_hz: default_rate_hz(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> InputError {
    InputError::Config(toml::de::Error::custom(message))
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(invalid(format!("{} must be between {} and {}", name, min, max)));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use skyline_input::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns `Config` if any value is out of its valid range
    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(invalid("display width and height must be greater than 0"));
        }

        check_range("deadzone", self.pointer.deadzone, 0.0, MAX_DEADZONE)?;
        check_range("analog_speed", self.pointer.analog_speed, 0.0, 500.0)?;
        check_range("dpad_speed", self.pointer.dpad_speed, 0.0, 500.0)?;
        check_range("margin", self.pointer.margin, 0.0, 100.0)?;

        let min_extent = self.display.width.min(self.display.height) as f32;
        if self.pointer.margin * 2.0 > min_extent {
            return Err(invalid("margin must leave room for the pointer inside the display"));
        }

        check_range("base_speed", self.flight.base_speed, 0.0, 10000.0)?;
        check_range("boost_multiplier", self.flight.boost_multiplier, 1.0, 100.0)?;
        check_range("slow_multiplier", self.flight.slow_multiplier, 0.0, 1.0)?;
        check_range("responsiveness", self.flight.responsiveness, 0.1, 1000.0)?;
        check_range("decay_rate", self.flight.decay_rate, 0.1, 1000.0)?;

        let toggle = normalize_key(self.flight.toggle_key.trim());
        if toggle.is_empty() {
            return Err(invalid("toggle_key cannot be empty"));
        }
        if FlightKey::from_token(&toggle).is_some() {
            return Err(invalid(format!(
                "toggle_key '{}' is already a flight control",
                self.flight.toggle_key
            )));
        }

        if self.frame.rate_hz == 0 || self.frame.rate_hz > 1000 {
            return Err(invalid("rate_hz must be between 1 and 1000"));
        }

        if self.logging.level.trim().is_empty() {
            return Err(invalid("logging level cannot be empty"));
        }

        Ok(())
    }
}
