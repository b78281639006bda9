// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Operator Commands

use serde::{Deserialize, Serialize};

use crate::error::SentinelError;
use crate::state_machine::Transition;
use crate::types::NodeId;

/// Operator command as queued by a UI or CLI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "node")]
pub enum Command {
    AddNode(Option<NodeId>),
    RemoveNode(NodeId),
    InjectRogue(NodeId),
    Heal(NodeId),
    /// Turn a randomly chosen Healthy node rogue.
    InjectRandomRogue,
    /// Heal every Compromised node. Rogue nodes need an explicit heal.
    HealCompromised,
    /// Heal everything, redraw all readings, clear taint and proposals.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutcome {
    Added(NodeId),
    Removed(NodeId),
    Transitioned { node: NodeId, transition: Transition },
    Healed(Vec<NodeId>),
    Reset { restored: u32 },
}

/// A queued command together with what happened when it was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub command: Command,
    pub outcome: Result<CommandOutcome, SentinelError>,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}
