// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin

pub mod types;
pub mod error;
pub mod config;
pub mod sensor;
pub mod registry;
pub mod topology;
pub mod state_machine;
pub mod detector;
pub mod event_log;
pub mod clock;
pub mod commands;
pub mod snapshot;
pub mod simulation;

pub use types::*;
pub use error::{ConfigError, SentinelError, SentinelResult};
pub use config::{DetectionPolicy, SensorBounds, SimulationConfig};
pub use commands::{Command, CommandOutcome, CommandResult};
pub use detector::{AnomalyReason, AnomalySignature, DetectionResult, MitigationProposal};
pub use event_log::{Event, EventKind, EventLog};
pub use sensor::SensorAnomaly;
pub use snapshot::{SimulationSnapshot, TickReport};
pub use state_machine::{Severity, Transition, TransitionCause};
pub use simulation::SentinelSimulation;

use wasm_bindgen::prelude::*;

fn to_js_error(e: SentinelError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl SentinelSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(node_count: u32, seed: u64) -> Result<SentinelSimulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = SimulationConfig {
            initial_nodes: node_count as usize,
            seed,
            ..SimulationConfig::default()
        };
        SentinelSimulation::from_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Advance one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        self.tick_core().map_err(to_js_error)?;
        Ok(self.get_snapshot())
    }

    pub fn get_snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshot()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = eventsSince)]
    pub fn js_events_since(&self, seq: u64) -> JsValue {
        serde_wasm_bindgen::to_value(&self.events_since(seq)).unwrap_or(JsValue::NULL)
    }

    // Commands are queued and applied at the start of the next `tick()`, so
    // every snapshot reflects a tick boundary. Outcomes are read back with
    // `commandResults()` after that tick.

    /// Queue a serialized `Command`, e.g. `{ command: "Heal", node: "node-3" }`.
    #[wasm_bindgen(js_name = enqueue)]
    pub fn js_enqueue(&mut self, command: JsValue) -> Result<(), JsValue> {
        let command: Command = serde_wasm_bindgen::from_value(command)?;
        self.enqueue(command);
        Ok(())
    }

    #[wasm_bindgen(js_name = pendingCommands)]
    pub fn js_pending_commands(&self) -> usize {
        self.pending_commands()
    }

    #[wasm_bindgen(js_name = commandResults)]
    pub fn js_command_results(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.last_command_results()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = injectRogue)]
    pub fn js_inject_rogue(&mut self, node_id: &str) {
        self.enqueue(Command::InjectRogue(NodeId::from(node_id)));
    }

    #[wasm_bindgen(js_name = injectRandomRogue)]
    pub fn js_inject_random_rogue(&mut self) {
        self.enqueue(Command::InjectRandomRogue);
    }

    #[wasm_bindgen(js_name = heal)]
    pub fn js_heal(&mut self, node_id: &str) {
        self.enqueue(Command::Heal(NodeId::from(node_id)));
    }

    #[wasm_bindgen(js_name = healCompromised)]
    pub fn js_heal_compromised(&mut self) {
        self.enqueue(Command::HealCompromised);
    }

    /// Without an id the node is auto-named; the name appears in
    /// `commandResults()` after the next tick.
    #[wasm_bindgen(js_name = addNode)]
    pub fn js_add_node(&mut self, node_id: Option<String>) {
        self.enqueue(Command::AddNode(node_id.map(NodeId)));
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn js_remove_node(&mut self, node_id: &str) {
        self.enqueue(Command::RemoveNode(NodeId::from(node_id)));
    }

    #[wasm_bindgen(js_name = reset)]
    pub fn js_reset(&mut self) {
        self.enqueue(Command::Reset);
    }

    /// Run N ticks without building snapshots.
    #[wasm_bindgen(js_name = runBatch)]
    pub fn js_run_batch(&mut self, ticks: u32) -> Result<(), JsValue> {
        self.run_batch(ticks).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = stop)]
    pub fn js_stop(&mut self) {
        self.stop();
    }

    #[wasm_bindgen(js_name = resume)]
    pub fn js_resume(&mut self) {
        self.resume();
    }
}
