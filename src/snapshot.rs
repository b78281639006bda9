// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Snapshot & Tick Report

use serde::{Deserialize, Serialize};

use crate::commands::CommandResult;
use crate::detector::{DetectionResult, MitigationProposal};
use crate::event_log::Event;
use crate::types::{HealthCounts, HealthState, Node, NodeId};

// ─── SimulationSnapshot ──────────────────────────────────────────────────────

/// Read-only view handed to the rendering layer. Built on demand from a
/// tick boundary; the engine never stores one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub elapsed_ms: u64,
    pub running: bool,
    /// Creation order.
    pub nodes: Vec<Node>,
    pub edges: Vec<(NodeId, NodeId)>,
    /// Newest last.
    pub recent_events: Vec<Event>,
    pub last_event_seq: u64,
    pub counts: HealthCounts,
    pub mitigation_proposals: Vec<MitigationProposal>,
}

impl SimulationSnapshot {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn ids_in(&self, state: HealthState) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.state == state)
            .map(|n| n.id.clone())
            .collect()
    }
}

// ─── TickReport ──────────────────────────────────────────────────────────────

/// What one tick did, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub commands: Vec<CommandResult>,
    pub sensor_anomalies: usize,
    pub decayed: Vec<NodeId>,
    /// Healthy neighbours newly tainted by rogue contagion.
    pub tainted: Vec<NodeId>,
    pub detections: Vec<DetectionResult>,
    pub auto_mitigated: Vec<NodeId>,
    pub counts: HealthCounts,
}

impl TickReport {
    pub fn threats(&self) -> impl Iterator<Item = &NodeId> {
        self.detections.iter().filter_map(|d| match d {
            DetectionResult::Threat { node, .. } => Some(node),
            DetectionResult::Mitigation(_) => None,
        })
    }
}
