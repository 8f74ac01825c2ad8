//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `sixthsense.toml` in the working directory, or the file named
//! by `SIXTHSENSE_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use sixthsense_adapter_virtual::VirtualOvenConfig;
use sixthsense_app::oven::{OvenOptions, SettlePolicy};
use sixthsense_domain::appliance::ApplianceInfo;
use sixthsense_domain::error::SixthSenseError;

const DEFAULT_PATH: &str = "sixthsense.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity of the driven appliance.
    pub appliance: ApplianceConfig,
    /// Debounce and transition timing.
    pub oven: OvenConfig,
    /// Simulated appliance settings.
    pub simulation: VirtualOvenConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Appliance identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApplianceConfig {
    /// Vendor appliance identifier.
    pub said: String,
    /// Display name; defaults to the said.
    pub name: Option<String>,
    pub model: Option<String>,
}

/// How a transition waits after its cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleKind {
    Fixed,
    AwaitRefresh,
}

/// Timing of debounced edits and mode transitions, in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OvenConfig {
    pub debounce_quiet_ms: u64,
    pub settle: SettleKind,
    /// Used with `settle = "fixed"`.
    pub settle_delay_ms: u64,
    /// Used with `settle = "await_refresh"`.
    pub settle_timeout_ms: u64,
    pub timer_restore_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SIXTHSENSE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides looked up by variable name. Unparseable numbers are
    /// ignored.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SIXTHSENSE_SAID") {
            self.appliance.said = val;
        }
        if let Some(val) = var("SIXTHSENSE_NAME") {
            self.appliance.name = Some(val);
        }
        if let Some(ms) = var("SIXTHSENSE_DEBOUNCE_QUIET_MS").and_then(|v| v.parse().ok()) {
            self.oven.debounce_quiet_ms = ms;
        }
        match var("SIXTHSENSE_SETTLE").as_deref() {
            Some("fixed") => self.oven.settle = SettleKind::Fixed,
            Some("await_refresh") => self.oven.settle = SettleKind::AwaitRefresh,
            _ => {}
        }
        if let Some(speedup) = var("SIXTHSENSE_SPEEDUP").and_then(|v| v.parse().ok()) {
            self.simulation.speedup = speedup;
        }
        if let Some(val) = var("SIXTHSENSE_SNAPSHOT") {
            self.simulation.snapshot = Some(PathBuf::from(val));
        }
        if let Some(val) = var("SIXTHSENSE_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.appliance.said.trim().is_empty() {
            return Err(ConfigError::Validation("appliance said must not be empty".to_string()));
        }
        if self.oven.debounce_quiet_ms == 0 {
            return Err(ConfigError::Validation(
                "debounce_quiet_ms must be non-zero".to_string(),
            ));
        }
        if self.oven.settle == SettleKind::AwaitRefresh && self.oven.settle_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "settle_timeout_ms must be non-zero when awaiting a refresh".to_string(),
            ));
        }
        if self.simulation.report_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "report_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.simulation.speedup == 0 {
            return Err(ConfigError::Validation("speedup must be non-zero".to_string()));
        }
        if self.simulation.heat_rate_c_per_min <= 0.0 {
            return Err(ConfigError::Validation(
                "heat_rate_c_per_min must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Appliance identity built from `[appliance]`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the identity is incomplete.
    pub fn appliance_info(&self) -> Result<ApplianceInfo, SixthSenseError> {
        let mut builder = ApplianceInfo::builder().said(self.appliance.said.clone());
        if let Some(name) = &self.appliance.name {
            builder = builder.name(name.clone());
        }
        if let Some(model) = &self.appliance.model {
            builder = builder.model(model.clone());
        }
        builder.build()
    }

    /// Facade options built from `[oven]`.
    #[must_use]
    pub fn oven_options(&self) -> OvenOptions {
        let settle = match self.oven.settle {
            SettleKind::Fixed => SettlePolicy::FixedDelay(Duration::from_millis(self.oven.settle_delay_ms)),
            SettleKind::AwaitRefresh => SettlePolicy::AwaitRefresh {
                timeout: Duration::from_millis(self.oven.settle_timeout_ms),
            },
        };
        OvenOptions {
            debounce_quiet: Duration::from_millis(self.oven.debounce_quiet_ms),
            settle,
            timer_restore_delay: Duration::from_millis(self.oven.timer_restore_delay_ms),
        }
    }
}

impl Default for ApplianceConfig {
    fn default() -> Self {
        Self {
            said: "VIRTUAL0001".to_string(),
            name: Some("Virtual Oven".to_string()),
            model: None,
        }
    }
}

impl Default for OvenConfig {
    fn default() -> Self {
        Self {
            debounce_quiet_ms: 4_000,
            settle: SettleKind::Fixed,
            settle_delay_ms: 500,
            settle_timeout_ms: 2_000,
            timer_restore_delay_ms: 2_500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "sixthsensed=info,sixthsense_app=info,sixthsense_adapter_virtual=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
