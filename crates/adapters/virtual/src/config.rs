//! Virtual oven configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Configuration for the simulated appliance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualOvenConfig {
    /// Whether the lower cavity exists. When `false` it reports `NotPresent`.
    pub lower_cavity: bool,
    /// Temperature idle cavities settle at, in °C.
    pub ambient_temp_c: f64,
    /// Heating (and cooling) speed, in °C per simulated minute.
    pub heat_rate_c_per_min: f64,
    /// How often remaining times are published, in simulated seconds.
    ///
    /// The real appliance reports cook time coarsely; clients predict in between.
    pub report_interval_secs: u32,
    /// Simulated seconds per real second when driven by the ticker.
    pub speedup: u32,
    /// Optional flat JSON attribute snapshot applied over the seeded state.
    pub snapshot: Option<PathBuf>,
}

impl Default for VirtualOvenConfig {
    fn default() -> Self {
        Self {
            lower_cavity: true,
            ambient_temp_c: 21.0,
            heat_rate_c_per_min: 15.0,
            report_interval_secs: 60,
            speedup: 1,
            snapshot: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = VirtualOvenConfig::default();
        assert!(config.lower_cavity);
        assert!((config.ambient_temp_c - 21.0).abs() < f64::EPSILON);
        assert_eq!(config.report_interval_secs, 60);
        assert_eq!(config.speedup, 1);
        assert!(config.snapshot.is_none());
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            lower_cavity = false
            ambient_temp_c = 18.5
            heat_rate_c_per_min = 30.0
            report_interval_secs = 10
            speedup = 20
            snapshot = "/var/lib/sixthsense/oven.json"
        "#;
        let config: VirtualOvenConfig = toml::from_str(toml).unwrap();
        assert!(!config.lower_cavity);
        assert!((config.heat_rate_c_per_min - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.report_interval_secs, 10);
        assert_eq!(config.speedup, 20);
        assert_eq!(
            config.snapshot.as_deref(),
            Some(std::path::Path::new("/var/lib/sixthsense/oven.json"))
        );
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: VirtualOvenConfig = toml::from_str("speedup = 5").unwrap();
        assert_eq!(config.speedup, 5);
        assert!(config.lower_cavity);
        assert_eq!(config.report_interval_secs, 60);
    }
}
