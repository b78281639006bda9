// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Health State Machine

//! Legal health transitions.
//!
//! ```text
//! Healthy               ── ThreatDetected | PassiveDecay  ──▶ Compromised
//! Healthy | Compromised ── OperatorInjectRogue            ──▶ Rogue
//! Compromised | Rogue   ── OperatorHeal | NetworkReset    ──▶ Healthy
//! Compromised           ── AutoMitigation                 ──▶ Healthy
//! ```
//!
//! Any (state, cause) pair not in the table is rejected and the node is left
//! untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SentinelError, SentinelResult};
use crate::types::{HealthState, Node};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransitionCause {
    ThreatDetected,
    PassiveDecay,
    OperatorInjectRogue,
    OperatorHeal,
    AutoMitigation,
    NetworkReset,
}

impl TransitionCause {
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::OperatorInjectRogue | Self::OperatorHeal | Self::NetworkReset)
    }
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Healing a rogue node and injecting one are larger operations than
/// routine wear and recovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Severity {
    Routine,
    Major,
}

/// An accepted transition, ready to be logged as one StateChanged event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transition {
    pub from: HealthState,
    pub to: HealthState,
    pub cause: TransitionCause,
    pub severity: Severity,
}

/// Target state for `cause` applied to a node in `from`, or `None` when the
/// pair is illegal.
pub fn target_state(from: HealthState, cause: TransitionCause) -> Option<HealthState> {
    use HealthState::*;
    use TransitionCause::*;
    match (from, cause) {
        (Healthy, ThreatDetected | PassiveDecay) => Some(Compromised),
        (Healthy | Compromised, OperatorInjectRogue) => Some(Rogue),
        (Compromised | Rogue, OperatorHeal | NetworkReset) => Some(Healthy),
        (Compromised, AutoMitigation) => Some(Healthy),
        _ => None,
    }
}

pub fn is_legal(from: HealthState, cause: TransitionCause) -> bool {
    target_state(from, cause).is_some()
}

/// Apply `cause` to `node` at `tick`.
///
/// State, `state_since` and `updated_at` change together or not at all.
/// Heals also stamp `mitigated_at` and clear contagion taint.
pub fn apply(node: &mut Node, cause: TransitionCause, tick: u64) -> SentinelResult<Transition> {
    let from = node.state;
    let to = target_state(from, cause).ok_or_else(|| SentinelError::InvalidTransition {
        node: node.id.clone(),
        from,
        cause,
    })?;

    let severity = match (from, to) {
        (HealthState::Rogue, HealthState::Healthy) | (_, HealthState::Rogue) => Severity::Major,
        _ => Severity::Routine,
    };

    node.state = to;
    node.state_since = tick;
    node.updated_at = tick;
    if to == HealthState::Healthy {
        node.mitigated_at = Some(tick);
        node.tainted = false;
    }

    Ok(Transition { from, to, cause, severity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NodeId, SensorReadings};

    const ALL_CAUSES: [TransitionCause; 6] = [
        TransitionCause::ThreatDetected,
        TransitionCause::PassiveDecay,
        TransitionCause::OperatorInjectRogue,
        TransitionCause::OperatorHeal,
        TransitionCause::AutoMitigation,
        TransitionCause::NetworkReset,
    ];

    fn node_in(state: HealthState) -> Node {
        let mut node = Node::new(
            NodeId::from("n1"),
            SensorReadings { temperature: 25.0, battery: 90.0, metric: 95.0 },
            0,
        );
        node.state = state;
        node
    }

    #[test]
    fn test_legal_table() {
        use HealthState::*;
        let legal: Vec<(HealthState, TransitionCause)> = [Healthy, Compromised, Rogue]
            .into_iter()
            .flat_map(|s| ALL_CAUSES.into_iter().map(move |c| (s, c)))
            .filter(|(s, c)| is_legal(*s, *c))
            .collect();
        assert_eq!(legal.len(), 9);
        assert!(!is_legal(Rogue, TransitionCause::OperatorInjectRogue));
        assert!(!is_legal(Healthy, TransitionCause::OperatorHeal));
        assert!(!is_legal(Rogue, TransitionCause::AutoMitigation));
        assert!(!is_legal(Compromised, TransitionCause::ThreatDetected));
        assert!(!is_legal(Healthy, TransitionCause::AutoMitigation));
    }

    #[test]
    fn test_rogue_is_never_spontaneous() {
        for from in [HealthState::Healthy, HealthState::Compromised, HealthState::Rogue] {
            for cause in ALL_CAUSES {
                if target_state(from, cause) == Some(HealthState::Rogue) {
                    assert_eq!(cause, TransitionCause::OperatorInjectRogue);
                }
            }
        }
    }

    #[test]
    fn test_operator_causes() {
        let operator: Vec<_> = ALL_CAUSES.into_iter().filter(|c| c.is_operator()).collect();
        assert_eq!(
            operator,
            vec![
                TransitionCause::OperatorInjectRogue,
                TransitionCause::OperatorHeal,
                TransitionCause::NetworkReset,
            ]
        );
    }

    #[test]
    fn test_apply_updates_state_and_timestamp_together() {
        let mut node = node_in(HealthState::Healthy);
        let t = apply(&mut node, TransitionCause::PassiveDecay, 12).unwrap();
        assert_eq!(t.from, HealthState::Healthy);
        assert_eq!(t.to, HealthState::Compromised);
        assert_eq!(t.severity, Severity::Routine);
        assert_eq!(node.state, HealthState::Compromised);
        assert_eq!(node.state_since, 12);
        assert_eq!(node.updated_at, 12);
        assert!(node.mitigated_at.is_none());
    }

    #[test]
    fn test_rejected_transition_leaves_node_untouched() {
        let mut node = node_in(HealthState::Rogue);
        let before = node.clone();
        let err = apply(&mut node, TransitionCause::OperatorInjectRogue, 3).unwrap_err();
        assert!(matches!(err, SentinelError::InvalidTransition { from: HealthState::Rogue, .. }));
        assert_eq!(node, before);
    }

    #[test]
    fn test_healing_rogue_is_major_and_clears_taint() {
        let mut node = node_in(HealthState::Rogue);
        node.tainted = true;
        let t = apply(&mut node, TransitionCause::OperatorHeal, 40).unwrap();
        assert_eq!(t.severity, Severity::Major);
        assert_eq!(node.state, HealthState::Healthy);
        assert_eq!(node.mitigated_at, Some(40));
        assert!(!node.tainted);

        let mut compromised = node_in(HealthState::Compromised);
        let t = apply(&mut compromised, TransitionCause::OperatorHeal, 41).unwrap();
        assert_eq!(t.severity, Severity::Routine);
    }
}
