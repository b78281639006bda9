// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Sensor Model

//! Per-tick sensor random walk.
//!
//! `new = clamp(old + noise, min, max)` for each channel. The noise profile
//! depends on the node's health: degraded and adversarial nodes run hotter,
//! drain faster and lose link quality, which is the signature the threat
//! detector keys on.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{SensorBounds, BATTERY_MAX, BATTERY_MIN};
use crate::types::{HealthState, Node, SensorReadings};

// ---------------------------------------------------------------------------
// Noise profiles
// ---------------------------------------------------------------------------

/// Half-open delta ranges applied each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    pub temperature: (f64, f64),
    /// Applied as a drain: the sampled value is subtracted from battery.
    pub battery_drain: (f64, f64),
    pub metric: (f64, f64),
}

pub const NOMINAL: NoiseProfile = NoiseProfile {
    temperature: (-0.5, 0.5),
    battery_drain: (0.0, 0.5),
    metric: (-1.0, 1.0),
};

pub const DEGRADED: NoiseProfile = NoiseProfile {
    temperature: (0.0, 1.0),
    battery_drain: (0.5, 1.0),
    metric: (-2.0, 0.5),
};

pub const ADVERSARIAL: NoiseProfile = NoiseProfile {
    temperature: (1.0, 2.0),
    battery_drain: (1.0, 2.0),
    metric: (-4.0, -1.0),
};

/// Profile for a node. A tainted node looks Healthy but already emits the
/// degraded signature.
pub fn profile_for(node: &Node) -> NoiseProfile {
    match node.state {
        HealthState::Healthy if node.tainted => DEGRADED,
        HealthState::Healthy => NOMINAL,
        HealthState::Compromised => DEGRADED,
        HealthState::Rogue => ADVERSARIAL,
    }
}

// ---------------------------------------------------------------------------
// Sensor anomalies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SensorAnomaly {
    BatteryDepleted,
    Overheat,
}

// ---------------------------------------------------------------------------
// SensorModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SensorModel {
    bounds: SensorBounds,
}

impl SensorModel {
    pub fn new(bounds: SensorBounds) -> Self {
        Self { bounds }
    }

    /// Fresh readings for a newly created or reset node.
    pub fn initial<R: Rng + ?Sized>(&self, rng: &mut R) -> SensorReadings {
        SensorReadings {
            temperature: rng
                .gen_range(20.0_f64..=40.0)
                .clamp(self.bounds.temperature_min, self.bounds.temperature_max),
            battery: rng.gen_range(50.0..=100.0),
            metric: rng
                .gen_range(80.0_f64..=100.0)
                .clamp(self.bounds.metric_min, self.bounds.metric_max),
        }
    }

    /// Next readings for `node`. Pure apart from advancing `rng`; the caller
    /// writes the result back into the registry.
    pub fn tick<R: Rng + ?Sized>(&self, node: &Node, rng: &mut R) -> SensorReadings {
        let profile = profile_for(node);
        let old = node.readings;
        let temperature = old.temperature + sample(rng, profile.temperature);
        let battery = old.battery - sample(rng, profile.battery_drain);
        let metric = old.metric + sample(rng, profile.metric);
        SensorReadings {
            temperature: temperature.clamp(self.bounds.temperature_min, self.bounds.temperature_max),
            battery: battery.clamp(BATTERY_MIN, BATTERY_MAX),
            metric: metric.clamp(self.bounds.metric_min, self.bounds.metric_max),
        }
    }

    /// Critical bounds crossed between `old` and `new`. Edge-triggered: a
    /// node sitting at an empty battery reports it once.
    pub fn anomalies(&self, old: &SensorReadings, new: &SensorReadings) -> Vec<SensorAnomaly> {
        let mut found = Vec::new();
        if old.battery > BATTERY_MIN && new.battery <= BATTERY_MIN {
            found.push(SensorAnomaly::BatteryDepleted);
        }
        let critical = self.bounds.critical_temperature;
        if old.temperature < critical && new.temperature >= critical {
            found.push(SensorAnomaly::Overheat);
        }
        found
    }
}

fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    rng.gen_range(lo..hi)
}
