// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Node Registry

use std::collections::HashMap;

use crate::error::{SentinelError, SentinelResult};
use crate::types::{HealthState, Node, NodeId, SensorReadings};

/// Sole owner of the node records, kept in creation order.
///
/// The registry does not log; the engine appends the matching NodeAdded /
/// NodeRemoved event after each successful insert or remove.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    auto_id_counter: u64,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused `node-<n>` identifier.
    pub fn next_auto_id(&mut self) -> NodeId {
        loop {
            let candidate = NodeId(format!("node-{}", self.auto_id_counter));
            self.auto_id_counter += 1;
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    /// Create a Healthy node. Fails without side effects when `id` is taken.
    pub fn add_node(
        &mut self,
        id: Option<NodeId>,
        readings: SensorReadings,
        tick: u64,
    ) -> SentinelResult<&Node> {
        let id = match id {
            Some(id) if self.index.contains_key(&id) => {
                return Err(SentinelError::DuplicateId(id));
            }
            Some(id) => id,
            None => self.next_auto_id(),
        };
        let slot = self.nodes.len();
        self.index.insert(id.clone(), slot);
        self.nodes.push(Node::new(id, readings, tick));
        Ok(&self.nodes[slot])
    }

    pub fn remove_node(&mut self, id: &NodeId) -> SentinelResult<Node> {
        let slot = self
            .index
            .remove(id)
            .ok_or_else(|| SentinelError::NotFound(id.clone()))?;
        let node = self.nodes.remove(slot);
        for later in &self.nodes[slot..] {
            if let Some(i) = self.index.get_mut(&later.id) {
                *i -= 1;
            }
        }
        Ok(node)
    }

    pub fn get(&self, id: &NodeId) -> SentinelResult<&Node> {
        self.index
            .get(id)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| SentinelError::NotFound(id.clone()))
    }

    pub fn get_mut(&mut self, id: &NodeId) -> SentinelResult<&mut Node> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.nodes[i]),
            None => Err(SentinelError::NotFound(id.clone())),
        }
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// All nodes in creation order.
    pub fn all(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn all_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn ids_in(&self, state: HealthState) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.state == state)
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
