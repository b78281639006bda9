// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Errors

//! Command and configuration errors.
//!
//! Every variant is recoverable: a rejected command leaves the engine
//! exactly as it was and the next tick proceeds normally.

use serde::{Deserialize, Serialize};

use crate::state_machine::TransitionCause;
use crate::types::{HealthState, NodeId};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by the command surface and the tick routine. Serializable
/// so queued command results can cross the WASM boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SentinelError {
    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("node {0} already exists")]
    DuplicateId(NodeId),

    #[error("node {node} cannot leave {from} via {cause}")]
    InvalidTransition {
        node: NodeId,
        from: HealthState,
        cause: TransitionCause,
    },

    #[error("no healthy node available")]
    NoEligibleNode,

    #[error("simulation clock is stopped")]
    ClockStopped,
}

/// Errors raised while loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: &'static str, value: f64 },

    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field}: minimum {min} is not below maximum {max}")]
    InvertedBounds { field: &'static str, min: f64, max: f64 },

    #[error("critical temperature {value} lies outside [{min}, {max}]")]
    CriticalOutOfBounds { value: f64, min: f64, max: f64 },

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, SentinelError>`.
pub type SentinelResult<T> = Result<T, SentinelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_not_found() {
        let e = SentinelError::NotFound(NodeId::from("n9"));
        assert_eq!(e.to_string(), "node n9 not found");
    }

    #[test]
    fn test_display_invalid_transition() {
        let e = SentinelError::InvalidTransition {
            node: NodeId::from("n1"),
            from: HealthState::Rogue,
            cause: TransitionCause::OperatorInjectRogue,
        };
        let s = e.to_string();
        assert!(s.contains("n1"));
        assert!(s.contains("Rogue"));
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let e: ConfigError = parse.unwrap_err().into();
        assert!(e.to_string().starts_with("failed to parse config"));
    }
}
