// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

// ─── NodeId ──────────────────────────────────────────────────────────────────

/// Stable identifier of a simulated device.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self { NodeId(s) }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self { NodeId(s.to_string()) }
}

// ─── Health State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HealthState {
    Healthy = 0,
    Compromised = 1,
    Rogue = 2,
}

impl Default for HealthState {
    fn default() -> Self { HealthState::Healthy }
}

impl HealthState {
    /// Compromised and Rogue both render as degraded; Rogue stays a
    /// separate category everywhere else.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, Self::Healthy)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Compromised => "Compromised",
            Self::Rogue => "Rogue",
        }
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─── Sensor Readings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensorReadings {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent, always within [0, 100].
    pub battery: f64,
    /// Operational metric (link quality), within the configured metric bounds.
    pub metric: f64,
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub state: HealthState,
    pub readings: SensorReadings,
    /// Readings from the previous tick; `None` until the first sensor update.
    #[serde(default)]
    pub previous: Option<SensorReadings>,
    /// Tick of the last accepted transition (or creation).
    pub state_since: u64,
    pub updated_at: u64,
    #[serde(default)]
    pub mitigated_at: Option<u64>,
    /// Latent compromise spread by a rogue neighbour. Only visible through
    /// the sensor signature until the detector catches it.
    #[serde(default)]
    pub tainted: bool,
}

impl Node {
    pub fn new(id: NodeId, readings: SensorReadings, tick: u64) -> Self {
        Self {
            id,
            state: HealthState::Healthy,
            readings,
            previous: None,
            state_since: tick,
            updated_at: tick,
            mitigated_at: None,
            tainted: false,
        }
    }

    /// Number of ticks spent in the current state.
    pub fn ticks_in_state(&self, now: u64) -> u64 {
        now.saturating_sub(self.state_since)
    }
}

// ─── Health Counts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthCounts {
    pub healthy: u32,
    pub compromised: u32,
    pub rogue: u32,
}

impl HealthCounts {
    pub fn tally<'a>(nodes: impl IntoIterator<Item = &'a Node>) -> Self {
        let mut counts = Self::default();
        for node in nodes {
            match node.state {
                HealthState::Healthy => counts.healthy += 1,
                HealthState::Compromised => counts.compromised += 1,
                HealthState::Rogue => counts.rogue += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.healthy + self.compromised + self.rogue
    }

    /// Compromised plus rogue, the "red" share of the fleet.
    pub fn degraded(&self) -> u32 {
        self.compromised + self.rogue
    }
}
