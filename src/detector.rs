// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Threat Detector

//! Per-tick threat scan.
//!
//! Stateless: every verdict is derived from a node's current and previous
//! readings plus its time in state. The detector only proposes; the engine
//! applies transitions through the state machine.

use serde::{Deserialize, Serialize};

use crate::config::DetectionPolicy;
use crate::registry::NodeRegistry;
use crate::types::{HealthState, Node, NodeId};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AnomalyReason {
    BatteryDrain,
    TemperatureRise,
    TemperatureCeiling,
}

/// What the detector saw on a flagged node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalySignature {
    /// Battery percent lost since the previous tick.
    pub battery_drain: f64,
    /// Degrees gained since the previous tick.
    pub temperature_rise: f64,
    pub temperature: f64,
    pub reasons: Vec<AnomalyReason>,
}

/// Suggested heal for a node left Compromised past the grace period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigationProposal {
    pub node: NodeId,
    pub compromised_since: u64,
    pub ticks_compromised: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetectionResult {
    Threat {
        node: NodeId,
        signature: AnomalySignature,
    },
    Mitigation(MitigationProposal),
}

// ---------------------------------------------------------------------------
// ThreatDetector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ThreatDetector {
    policy: DetectionPolicy,
}

impl ThreatDetector {
    pub fn new(policy: DetectionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DetectionPolicy {
        &self.policy
    }

    /// Scan every node in creation order. Threats come from Healthy nodes,
    /// mitigation proposals from stale Compromised nodes. Rogue nodes are
    /// already known to the operator and are skipped.
    pub fn scan(&self, registry: &NodeRegistry, tick: u64) -> Vec<DetectionResult> {
        let mut results = Vec::new();
        for node in registry.all() {
            match node.state {
                HealthState::Healthy => {
                    if let Some(signature) = self.inspect(node) {
                        results.push(DetectionResult::Threat {
                            node: node.id.clone(),
                            signature,
                        });
                    }
                }
                HealthState::Compromised => {
                    if let Some(proposal) = self.propose(node, tick) {
                        results.push(DetectionResult::Mitigation(proposal));
                    }
                }
                HealthState::Rogue => {}
            }
        }
        results
    }

    /// Anomaly signature for a node, or `None` when it looks nominal.
    pub fn inspect(&self, node: &Node) -> Option<AnomalySignature> {
        if !self.policy.enabled() {
            return None;
        }
        let prev = node.previous?;
        let cur = node.readings;
        let battery_drain = prev.battery - cur.battery;
        let temperature_rise = cur.temperature - prev.temperature;

        let mut reasons = Vec::new();
        if battery_drain > self.policy.effective_battery_drain_limit() {
            reasons.push(AnomalyReason::BatteryDrain);
        }
        if temperature_rise > self.policy.effective_temperature_rise_limit() {
            reasons.push(AnomalyReason::TemperatureRise);
        }
        if cur.temperature > self.policy.temperature_ceiling {
            reasons.push(AnomalyReason::TemperatureCeiling);
        }
        if reasons.is_empty() {
            return None;
        }
        Some(AnomalySignature {
            battery_drain,
            temperature_rise,
            temperature: cur.temperature,
            reasons,
        })
    }

    fn propose(&self, node: &Node, tick: u64) -> Option<MitigationProposal> {
        let ticks = node.ticks_in_state(tick);
        (ticks >= self.policy.mitigation_grace_ticks).then(|| MitigationProposal {
            node: node.id.clone(),
            compromised_since: node.state_since,
            ticks_compromised: ticks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorReadings;

    fn readings(temperature: f64, battery: f64) -> SensorReadings {
        SensorReadings { temperature, battery, metric: 90.0 }
    }

    fn registry_with(node: Node) -> NodeRegistry {
        let mut reg = NodeRegistry::new();
        let id = node.id.clone();
        reg.add_node(Some(id.clone()), node.readings, node.state_since).unwrap();
        *reg.get_mut(&id).unwrap() = node;
        reg
    }

    fn moved(prev: SensorReadings, cur: SensorReadings) -> Node {
        let mut node = Node::new(NodeId::from("n1"), cur, 0);
        node.previous = Some(prev);
        node
    }

    #[test]
    fn test_nominal_node_not_flagged() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let node = moved(readings(30.0, 80.0), readings(30.4, 79.6));
        assert!(detector.inspect(&node).is_none());
    }

    #[test]
    fn test_fast_drain_flagged() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let node = moved(readings(30.0, 80.0), readings(30.2, 79.1));
        let sig = detector.inspect(&node).unwrap();
        assert_eq!(sig.reasons, vec![AnomalyReason::BatteryDrain]);
        assert!((sig.battery_drain - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_ceiling_flagged() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let node = moved(readings(90.2, 50.0), readings(90.3, 50.0));
        let sig = detector.inspect(&node).unwrap();
        assert_eq!(sig.reasons, vec![AnomalyReason::TemperatureCeiling]);
    }

    #[test]
    fn test_lower_sensitivity_widens_limits() {
        let policy = DetectionPolicy { sensitivity: 0.5, ..Default::default() };
        let detector = ThreatDetector::new(policy);
        let node = moved(readings(30.0, 80.0), readings(30.9, 79.1));
        assert!(detector.inspect(&node).is_none());
    }

    #[test]
    fn test_zero_sensitivity_disables() {
        let policy = DetectionPolicy { sensitivity: 0.0, ..Default::default() };
        let detector = ThreatDetector::new(policy);
        let node = moved(readings(30.0, 80.0), readings(95.0, 10.0));
        assert!(detector.inspect(&node).is_none());
    }

    #[test]
    fn test_first_tick_has_no_signature() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let node = Node::new(NodeId::from("n1"), readings(95.0, 80.0), 0);
        assert!(detector.inspect(&node).is_none());
    }

    #[test]
    fn test_scan_skips_non_healthy_signatures() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let mut node = moved(readings(30.0, 80.0), readings(32.0, 78.0));
        node.state = HealthState::Rogue;
        assert!(detector.scan(&registry_with(node), 1).is_empty());
    }

    #[test]
    fn test_mitigation_after_grace_period() {
        let detector = ThreatDetector::new(DetectionPolicy::default());
        let mut node = Node::new(NodeId::from("n1"), readings(30.0, 80.0), 0);
        node.state = HealthState::Compromised;
        node.state_since = 5;
        let reg = registry_with(node);
        assert!(detector.scan(&reg, 14).is_empty());
        let results = detector.scan(&reg, 15);
        assert_eq!(
            results,
            vec![DetectionResult::Mitigation(MitigationProposal {
                node: NodeId::from("n1"),
                compromised_since: 5,
                ticks_compromised: 10,
            })]
        );
    }
}
