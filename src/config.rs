// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Configuration

//! Static simulation configuration.
//!
//! Fixed at engine construction. Every field has a default so a partial
//! JSON file (or none at all) yields a runnable simulation.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// SimulationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the engine's ChaCha8 random source.
    pub seed: u64,
    /// Nodes created when the engine is constructed.
    pub initial_nodes: usize,
    /// Logical length of one tick in milliseconds.
    pub tick_interval_ms: u64,
    /// Per-tick chance that a Healthy node wears into Compromised.
    pub passive_decay_probability: f64,
    /// Per-tick chance that a Rogue node taints each Healthy neighbour.
    pub contagion_probability: f64,
    /// Chance of an edge between a new node and each existing node.
    pub edge_probability: f64,
    /// Events retained by the log before the oldest are evicted.
    pub event_retention: usize,
    /// Events included in each snapshot.
    pub snapshot_events: usize,
    /// Heal stale Compromised nodes without waiting for the operator.
    pub auto_mitigation: bool,
    pub detection: DetectionPolicy,
    pub sensors: SensorBounds,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            initial_nodes: 12,
            tick_interval_ms: 1000,
            passive_decay_probability: 0.002,
            contagion_probability: 0.05,
            edge_probability: 0.3,
            event_retention: 50,
            snapshot_events: 20,
            auto_mitigation: false,
            detection: DetectionPolicy::default(),
            sensors: SensorBounds::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("passive_decay_probability", self.passive_decay_probability)?;
        check_probability("contagion_probability", self.contagion_probability)?;
        check_probability("edge_probability", self.edge_probability)?;
        if self.event_retention == 0 {
            return Err(ConfigError::Zero { field: "event_retention" });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Zero { field: "tick_interval_ms" });
        }
        self.detection.validate()?;
        self.sensors.validate()
    }
}

// ---------------------------------------------------------------------------
// DetectionPolicy
// ---------------------------------------------------------------------------

/// Thresholds the threat detector applies to Healthy nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectionPolicy {
    /// 0 disables detection, 1 uses the limits as written. Lower values
    /// widen the limits proportionally.
    pub sensitivity: f64,
    /// Battery percent lost in one tick above which a node is suspicious.
    pub battery_drain_limit: f64,
    /// Temperature gained in one tick above which a node is suspicious.
    pub temperature_rise_limit: f64,
    /// Absolute temperature above which a node is suspicious.
    pub temperature_ceiling: f64,
    /// Ticks a node may sit Compromised before a mitigation is proposed.
    pub mitigation_grace_ticks: u64,
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            battery_drain_limit: 0.6,
            temperature_rise_limit: 0.6,
            temperature_ceiling: 90.0,
            mitigation_grace_ticks: 10,
        }
    }
}

impl DetectionPolicy {
    pub fn enabled(&self) -> bool {
        self.sensitivity > 0.0
    }

    pub fn effective_battery_drain_limit(&self) -> f64 {
        self.battery_drain_limit / self.sensitivity
    }

    pub fn effective_temperature_rise_limit(&self) -> f64 {
        self.temperature_rise_limit / self.sensitivity
    }

    /// Rate limits must be positive and the ceiling finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("detection.sensitivity", self.sensitivity)?;
        check_positive("detection.battery_drain_limit", self.battery_drain_limit)?;
        check_positive("detection.temperature_rise_limit", self.temperature_rise_limit)?;
        check_finite("detection.temperature_ceiling", self.temperature_ceiling)
    }
}

// ---------------------------------------------------------------------------
// SensorBounds
// ---------------------------------------------------------------------------

/// Clamp range for the sensor random walk. Battery is always [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorBounds {
    pub temperature_min: f64,
    pub temperature_max: f64,
    pub metric_min: f64,
    pub metric_max: f64,
    /// Crossing this temperature raises an Overheat sensor anomaly.
    pub critical_temperature: f64,
}

pub const BATTERY_MIN: f64 = 0.0;
pub const BATTERY_MAX: f64 = 100.0;

impl Default for SensorBounds {
    fn default() -> Self {
        Self {
            temperature_min: 0.0,
            temperature_max: 100.0,
            metric_min: 0.0,
            metric_max: 100.0,
            critical_temperature: 85.0,
        }
    }
}

impl SensorBounds {
    /// Bounds are checked for finiteness before ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_finite("sensors.temperature_min", self.temperature_min)?;
        check_finite("sensors.temperature_max", self.temperature_max)?;
        check_finite("sensors.metric_min", self.metric_min)?;
        check_finite("sensors.metric_max", self.metric_max)?;
        check_finite("sensors.critical_temperature", self.critical_temperature)?;
        if self.temperature_min >= self.temperature_max {
            return Err(ConfigError::InvertedBounds {
                field: "sensors.temperature",
                min: self.temperature_min,
                max: self.temperature_max,
            });
        }
        if self.metric_min >= self.metric_max {
            return Err(ConfigError::InvertedBounds {
                field: "sensors.metric",
                min: self.metric_min,
                max: self.metric_max,
            });
        }
        if !(self.temperature_min..=self.temperature_max).contains(&self.critical_temperature) {
            return Err(ConfigError::CriticalOutOfBounds {
                value: self.critical_temperature,
                min: self.temperature_min,
                max: self.temperature_max,
            });
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { field, value })
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    check_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"seed": 7, "detection": {"sensitivity": 0.5}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.initial_nodes, 12);
        assert_eq!(config.detection.sensitivity, 0.5);
        assert_eq!(config.detection.battery_drain_limit, 0.6);
        assert!(!config.auto_mitigation);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let config = SimulationConfig { passive_decay_probability: 1.5, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ProbabilityOutOfRange { field: "passive_decay_probability", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_retention() {
        let config = SimulationConfig { event_retention: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Zero { .. })));
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = SimulationConfig::default();
        config.sensors.metric_min = 100.0;
        config.sensors.metric_max = 10.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvertedBounds { .. })));
    }

    #[test]
    fn test_rejects_nan_bounds() {
        let mut config = SimulationConfig::default();
        config.sensors.temperature_max = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "sensors.temperature_max", .. })
        ));

        let mut config = SimulationConfig::default();
        config.sensors.metric_min = f64::NEG_INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite { .. })));

        let config = SimulationConfig { contagion_probability: f64::NAN, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ProbabilityOutOfRange { .. })));
    }

    #[test]
    fn test_rejects_critical_outside_bounds() {
        let mut config = SimulationConfig::default();
        config.sensors.critical_temperature = 120.0;
        assert!(matches!(config.validate(), Err(ConfigError::CriticalOutOfBounds { .. })));
    }

    #[test]
    fn test_rejects_non_positive_detection_limits() {
        let mut config = SimulationConfig::default();
        config.detection.battery_drain_limit = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "detection.battery_drain_limit", .. })
        ));

        let mut config = SimulationConfig::default();
        config.detection.temperature_rise_limit = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "detection.temperature_rise_limit", .. })
        ));

        let mut config = SimulationConfig::default();
        config.detection.temperature_ceiling = f64::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "detection.temperature_ceiling", .. })
        ));

        let mut config = SimulationConfig::default();
        config.detection.sensitivity = 2.0;
        assert!(matches!(config.validate(), Err(ConfigError::ProbabilityOutOfRange { .. })));
    }

    #[test]
    fn test_effective_limits_scale_with_sensitivity() {
        let policy = DetectionPolicy { sensitivity: 0.5, ..Default::default() };
        assert!((policy.effective_battery_drain_limit() - 1.2).abs() < 1e-12);
        assert!(policy.enabled());
        let off = DetectionPolicy { sensitivity: 0.0, ..Default::default() };
        assert!(!off.enabled());
    }
}
