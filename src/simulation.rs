// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Simulation Core

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use crate::clock::SimulationClock;
use crate::commands::{Command, CommandOutcome, CommandResult};
use crate::config::SimulationConfig;
use crate::detector::{DetectionResult, MitigationProposal, ThreatDetector};
use crate::error::{ConfigError, SentinelError, SentinelResult};
use crate::event_log::{Event, EventKind, EventLog};
use crate::registry::NodeRegistry;
use crate::sensor::SensorModel;
use crate::snapshot::{SimulationSnapshot, TickReport};
use crate::state_machine::{self, Transition, TransitionCause};
use crate::topology::Topology;
use crate::types::{HealthCounts, HealthState, Node, NodeId};

// ─── SentinelSimulation struct ───────────────────────────────────────────────

/// One independent digital twin. Owns every piece of mutable state; all
/// mutation goes through `&mut self`, so ticks and commands are serialized
/// and a snapshot always reflects a tick boundary.
#[wasm_bindgen]
pub struct SentinelSimulation {
    pub(crate) config: SimulationConfig,
    pub(crate) clock: SimulationClock,
    pub(crate) registry: NodeRegistry,
    pub(crate) topology: Topology,
    pub(crate) log: EventLog,
    pub(crate) sensors: SensorModel,
    pub(crate) detector: ThreatDetector,
    pub(crate) rng: Box<dyn RngCore>,

    // Commands waiting for the next tick boundary
    pub(crate) pending: VecDeque<Command>,
    // Outcomes of the commands applied by the last tick
    pub(crate) last_commands: Vec<CommandResult>,

    // Recomputed by every detection pass
    pub(crate) proposals: Vec<MitigationProposal>,
}

// ─── Construction ────────────────────────────────────────────────────────────

impl SentinelSimulation {
    /// Build an engine whose random source is a ChaCha8 stream seeded from
    /// `config.seed`.
    pub fn from_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(config, Box::new(rng))
    }

    /// Build an engine around a caller-supplied random source.
    pub fn with_rng(config: SimulationConfig, rng: Box<dyn RngCore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sim = Self {
            clock: SimulationClock::new(config.tick_interval_ms),
            registry: NodeRegistry::new(),
            topology: Topology::new(),
            log: EventLog::new(config.event_retention),
            sensors: SensorModel::new(config.sensors.clone()),
            detector: ThreatDetector::new(config.detection.clone()),
            rng,
            pending: VecDeque::new(),
            last_commands: Vec::new(),
            proposals: Vec::new(),
            config,
        };
        for _ in 0..sim.config.initial_nodes {
            if let Err(e) = sim.add_node(None) {
                warn!(error = %e, "initial node rejected");
            }
        }
        info!(
            nodes = sim.registry.len(),
            seed = sim.config.seed,
            auto_mitigation = sim.config.auto_mitigation,
            sensitivity = sim.detector.policy().sensitivity,
            "simulation initialised"
        );
        Ok(sim)
    }
}

// ─── Tick Routine ────────────────────────────────────────────────────────────

impl SentinelSimulation {
    /// Run one atomic round: queued commands, sensors, passive decay,
    /// contagion, detection.
    pub fn tick_core(&mut self) -> SentinelResult<TickReport> {
        let tick = self.clock.advance()?;

        let queued = std::mem::take(&mut self.pending);
        let commands: Vec<CommandResult> = queued
            .into_iter()
            .map(|command| {
                let outcome = self.apply(command.clone());
                CommandResult { command, outcome }
            })
            .collect();

        let sensor_anomalies = self.update_sensors(tick);
        let decayed = self.apply_passive_decay(tick);
        let tainted = self.spread_contagion();
        let (detections, auto_mitigated) = self.run_detection(tick);
        self.last_commands = commands.clone();

        let counts = self.counts();
        debug!(
            tick,
            healthy = counts.healthy,
            compromised = counts.compromised,
            rogue = counts.rogue,
            threats = detections.len(),
            "tick complete"
        );

        Ok(TickReport {
            tick,
            commands,
            sensor_anomalies,
            decayed,
            tainted,
            detections,
            auto_mitigated,
            counts,
        })
    }

    /// Run `ticks` rounds, discarding the reports.
    pub fn run_batch(&mut self, ticks: u32) -> SentinelResult<()> {
        for _ in 0..ticks {
            self.tick_core()?;
        }
        Ok(())
    }

    fn update_sensors(&mut self, tick: u64) -> usize {
        let mut anomalies = Vec::new();
        for node in self.registry.all_mut() {
            let next = self.sensors.tick(node, &mut *self.rng);
            for anomaly in self.sensors.anomalies(&node.readings, &next) {
                anomalies.push((node.id.clone(), anomaly, next));
            }
            node.previous = Some(node.readings);
            node.readings = next;
            node.updated_at = tick;
        }
        let found = anomalies.len();
        for (id, anomaly, readings) in anomalies {
            debug!(node = %id, ?anomaly, "sensor anomaly");
            self.log.append(tick, Some(id), EventKind::SensorAnomaly { anomaly, readings });
        }
        found
    }

    fn apply_passive_decay(&mut self, tick: u64) -> Vec<NodeId> {
        let p = self.config.passive_decay_probability;
        let mut decayed = Vec::new();
        if p <= 0.0 {
            return decayed;
        }
        for node in self.registry.all_mut() {
            if node.state != HealthState::Healthy || self.rng.gen::<f64>() >= p {
                continue;
            }
            if let Ok(transition) = state_machine::apply(node, TransitionCause::PassiveDecay, tick) {
                log_transition(&mut self.log, tick, &node.id, transition);
                decayed.push(node.id.clone());
            }
        }
        decayed
    }

    fn spread_contagion(&mut self) -> Vec<NodeId> {
        let p = self.config.contagion_probability;
        let mut tainted = Vec::new();
        if p <= 0.0 {
            return tainted;
        }
        for rogue in self.registry.ids_in(HealthState::Rogue) {
            for neighbour in self.topology.neighbours(&rogue) {
                let Ok(node) = self.registry.get_mut(&neighbour) else {
                    continue;
                };
                if node.state != HealthState::Healthy || node.tainted {
                    continue;
                }
                if self.rng.gen::<f64>() < p {
                    node.tainted = true;
                    debug!(node = %neighbour, source = %rogue, "tainted by rogue neighbour");
                    tainted.push(neighbour);
                }
            }
        }
        tainted
    }

    fn run_detection(&mut self, tick: u64) -> (Vec<DetectionResult>, Vec<NodeId>) {
        let detections = self.detector.scan(&self.registry, tick);
        let mut proposals = Vec::new();
        let mut auto_mitigated = Vec::new();

        for detection in &detections {
            match detection {
                DetectionResult::Threat { node, signature } => {
                    debug!(node = %node, reasons = ?signature.reasons, "threat detected");
                    self.log.append(
                        tick,
                        Some(node.clone()),
                        EventKind::ThreatDetected { signature: signature.clone() },
                    );
                    if let Err(e) = self.transition(node, TransitionCause::ThreatDetected) {
                        warn!(node = %node, error = %e, "detected node could not be flagged");
                    }
                }
                DetectionResult::Mitigation(proposal) if self.config.auto_mitigation => {
                    match self.transition(&proposal.node, TransitionCause::AutoMitigation) {
                        Ok(transition) => {
                            info!(node = %proposal.node, "auto-mitigated");
                            self.log.append(
                                tick,
                                Some(proposal.node.clone()),
                                EventKind::Mitigated { from: transition.from },
                            );
                            auto_mitigated.push(proposal.node.clone());
                        }
                        Err(e) => warn!(node = %proposal.node, error = %e, "auto-mitigation rejected"),
                    }
                }
                DetectionResult::Mitigation(proposal) => proposals.push(proposal.clone()),
            }
        }

        self.proposals = proposals;
        (detections, auto_mitigated)
    }

    /// Apply `cause` to one node at the current tick and log the transition.
    fn transition(&mut self, id: &NodeId, cause: TransitionCause) -> SentinelResult<Transition> {
        let tick = self.clock.current();
        let node = self.registry.get_mut(id)?;
        let transition = state_machine::apply(node, cause, tick)?;
        log_transition(&mut self.log, tick, id, transition);
        Ok(transition)
    }
}

/// Operator-driven changes are logged at info, automatic ones at debug.
fn log_transition(log: &mut EventLog, tick: u64, id: &NodeId, t: Transition) -> u64 {
    if t.cause.is_operator() {
        info!(node = %id, from = %t.from, to = %t.to, cause = %t.cause, severity = ?t.severity, "state changed");
    } else {
        debug!(node = %id, from = %t.from, to = %t.to, cause = %t.cause, "state changed");
    }
    log.append(
        tick,
        Some(id.clone()),
        EventKind::StateChanged {
            from: t.from,
            to: t.to,
            cause: t.cause,
            severity: t.severity,
        },
    )
}

// ─── Operator Commands ───────────────────────────────────────────────────────
//
// `enqueue` is the renderer-facing path: the command runs at the start of the
// next tick and its events carry that tick. The direct methods below mutate
// immediately and stamp events with the last completed tick, so a snapshot
// taken before and after one of them reports the same tick with a different
// fleet. They are for in-process embedders, scripted setup and tests.

impl SentinelSimulation {
    /// Queue a command for the start of the next tick.
    pub fn enqueue(&mut self, command: Command) {
        debug!(?command, "command queued");
        self.pending.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Results of the commands the last tick applied, in submission order.
    pub fn last_command_results(&self) -> &[CommandResult] {
        &self.last_commands
    }

    /// Apply a command immediately.
    pub fn apply(&mut self, command: Command) -> SentinelResult<CommandOutcome> {
        match command {
            Command::AddNode(id) => self.add_node(id).map(|n| CommandOutcome::Added(n.id)),
            Command::RemoveNode(id) => self.remove_node(&id).map(|n| CommandOutcome::Removed(n.id)),
            Command::InjectRogue(id) => self
                .inject_rogue(&id)
                .map(|transition| CommandOutcome::Transitioned { node: id, transition }),
            Command::Heal(id) => self
                .heal(&id)
                .map(|transition| CommandOutcome::Transitioned { node: id, transition }),
            Command::InjectRandomRogue => self
                .inject_random_rogue()
                .map(|(node, transition)| CommandOutcome::Transitioned { node, transition }),
            Command::HealCompromised => Ok(CommandOutcome::Healed(self.heal_compromised())),
            Command::Reset => Ok(CommandOutcome::Reset { restored: self.reset() }),
        }
    }

    /// Create a node, auto-naming it when `id` is `None`.
    pub fn add_node(&mut self, id: Option<NodeId>) -> SentinelResult<Node> {
        if let Some(id) = &id {
            if self.registry.contains(id) {
                warn!(node = %id, "add rejected: duplicate id");
                return Err(SentinelError::DuplicateId(id.clone()));
            }
        }
        let tick = self.clock.current();
        let readings = self.sensors.initial(&mut *self.rng);
        let node = self.registry.add_node(id, readings, tick)?.clone();
        self.topology.attach(&node.id, self.config.edge_probability, &mut *self.rng);
        self.log.append(tick, Some(node.id.clone()), EventKind::NodeAdded { readings });
        info!(node = %node.id, degree = self.topology.degree(&node.id), "node added");
        Ok(node)
    }

    /// Remove a node; the NodeRemoved event is the last one it gets.
    pub fn remove_node(&mut self, id: &NodeId) -> SentinelResult<Node> {
        let node = self
            .registry
            .remove_node(id)
            .inspect_err(|e| warn!(node = %id, error = %e, "remove rejected"))?;
        self.topology.detach(id);
        self.proposals.retain(|p| &p.node != id);
        self.log.append(
            self.clock.current(),
            Some(id.clone()),
            EventKind::NodeRemoved { last_state: node.state },
        );
        info!(node = %id, last_state = %node.state, "node removed");
        Ok(node)
    }

    pub fn inject_rogue(&mut self, id: &NodeId) -> SentinelResult<Transition> {
        let transition = self
            .transition(id, TransitionCause::OperatorInjectRogue)
            .inspect_err(|e| warn!(node = %id, error = %e, "inject rejected"))?;
        self.proposals.retain(|p| &p.node != id);
        Ok(transition)
    }

    /// Heal a Compromised or Rogue node. Healing a rogue is logged with
    /// Major severity.
    pub fn heal(&mut self, id: &NodeId) -> SentinelResult<Transition> {
        let transition = self
            .transition(id, TransitionCause::OperatorHeal)
            .inspect_err(|e| warn!(node = %id, error = %e, "heal rejected"))?;
        self.proposals.retain(|p| &p.node != id);
        Ok(transition)
    }

    pub fn inject_random_rogue(&mut self) -> SentinelResult<(NodeId, Transition)> {
        let healthy = self.registry.ids_in(HealthState::Healthy);
        if healthy.is_empty() {
            warn!("inject rejected: no healthy node available");
            return Err(SentinelError::NoEligibleNode);
        }
        let pick = healthy[self.rng.gen_range(0..healthy.len())].clone();
        let transition = self.inject_rogue(&pick)?;
        Ok((pick, transition))
    }

    /// Heal every Compromised node, in creation order.
    pub fn heal_compromised(&mut self) -> Vec<NodeId> {
        let targets = self.registry.ids_in(HealthState::Compromised);
        targets
            .into_iter()
            .filter(|id| self.heal(id).is_ok())
            .collect()
    }

    /// Return the whole fleet to a fresh Healthy state. Topology and the
    /// event log are kept; sequence numbers keep counting.
    pub fn reset(&mut self) -> u32 {
        let tick = self.clock.current();
        let degraded: Vec<NodeId> = self
            .registry
            .all()
            .iter()
            .filter(|n| n.state.is_degraded())
            .map(|n| n.id.clone())
            .collect();
        let mut restored = 0;
        for id in degraded {
            if self.transition(&id, TransitionCause::NetworkReset).is_ok() {
                restored += 1;
            }
        }
        for node in self.registry.all_mut() {
            node.readings = self.sensors.initial(&mut *self.rng);
            node.previous = None;
            node.tainted = false;
            node.updated_at = tick;
        }
        self.proposals.clear();
        self.log.append(tick, None, EventKind::NetworkReset { restored });
        info!(restored, "network reset");
        restored
    }
}

// ─── Queries & Lifecycle ─────────────────────────────────────────────────────

impl SentinelSimulation {
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.clock.current(),
            elapsed_ms: self.clock.elapsed().as_millis() as u64,
            running: self.clock.is_running(),
            nodes: self.registry.all().to_vec(),
            edges: self.topology.edges(),
            recent_events: self.log.recent(self.config.snapshot_events),
            last_event_seq: self.log.last_seq(),
            counts: self.counts(),
            mitigation_proposals: self.proposals.clone(),
        }
    }

    pub fn counts(&self) -> HealthCounts {
        HealthCounts::tally(self.registry.all())
    }

    pub fn node(&self, id: &NodeId) -> SentinelResult<&Node> {
        self.registry.get(id)
    }

    pub fn nodes(&self) -> &[Node] {
        self.registry.all()
    }

    /// Node ids currently in `state`, e.g. the rogue roster.
    pub fn ids_in(&self, state: HealthState) -> Vec<NodeId> {
        self.registry.ids_in(state)
    }

    pub fn events_since(&self, seq: u64) -> Vec<Event> {
        self.log.since(seq)
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn mitigation_proposals(&self) -> &[MitigationProposal] {
        &self.proposals
    }

    pub fn current_tick(&self) -> u64 {
        self.clock.current()
    }

    /// Stop ticking. The last completed tick stays final until `resume`.
    pub fn stop(&mut self) {
        self.clock.stop();
        info!(tick = self.clock.current(), "simulation stopped");
    }

    pub fn resume(&mut self) {
        self.clock.resume();
        info!(tick = self.clock.current(), "simulation resumed");
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }
}
