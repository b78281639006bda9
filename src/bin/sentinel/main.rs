// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - CLI Runner
//
// Usage:
//   cargo run --release --bin sentinel                          # 100 ticks, default fleet
//   cargo run --release --bin sentinel -- --ticks 500 --seed 7
//   cargo run --release --bin sentinel -- --inject 3:node-2 --heal 40:node-2
//   cargo run --release --bin sentinel -- --config sentinel.json --auto-mitigate
//   cargo run --release --bin sentinel -- --time-series out/counts.jsonl
//   RUST_LOG=sentinel_engine=debug cargo run --bin sentinel    # per-tick tracing

mod time_series;

use anyhow::Context;
use clap::Parser;
use sentinel_engine::{
    Command, HealthCounts, HealthState, NodeId, SentinelSimulation, SimulationConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use time_series::TimeSeriesRecorder;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

/// Quantum Sentinel - digital twin of a fleet of networked devices
#[derive(Parser, Debug)]
#[command(name = "sentinel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Override the configured seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the initial fleet size
    #[arg(long)]
    nodes: Option<usize>,

    /// Sleep one tick interval between ticks
    #[arg(long)]
    realtime: bool,

    /// Heal Compromised nodes automatically once their grace period ends
    #[arg(long)]
    auto_mitigate: bool,

    /// Inject a rogue at a tick, e.g. `5:node-3` (repeatable)
    #[arg(long, value_parser = parse_scheduled)]
    inject: Vec<(u64, NodeId)>,

    /// Heal a node at a tick, e.g. `40:node-3` (repeatable)
    #[arg(long, value_parser = parse_scheduled)]
    heal: Vec<(u64, NodeId)>,

    /// Write per-tick health counts as JSONL
    #[arg(long)]
    time_series: Option<PathBuf>,
}

/// Parse `<tick>:<node-id>`.
fn parse_scheduled(s: &str) -> Result<(u64, NodeId), String> {
    let (tick, id) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <tick>:<node-id>, got '{}'", s))?;
    let tick = tick
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid tick '{}' in '{}'", tick, s))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing node id in '{}'", s));
    }
    Ok((tick, NodeId::from(id)))
}

// ─── Summary ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    elapsed_ms: u64,
    counts: HealthCounts,
    rogue: Vec<NodeId>,
    compromised: Vec<NodeId>,
    threats_detected: usize,
    auto_mitigated: usize,
    pending_proposals: usize,
    commands_applied: usize,
    commands_failed: usize,
    events_logged: u64,
    events_evicted: u64,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(nodes) = cli.nodes {
        config.initial_nodes = nodes;
    }
    if cli.auto_mitigate {
        config.auto_mitigation = true;
    }

    let mut sim = SentinelSimulation::from_config(config).context("invalid configuration")?;

    let mut schedule: Vec<(u64, Command)> = cli
        .inject
        .into_iter()
        .map(|(tick, id)| (tick, Command::InjectRogue(id)))
        .chain(cli.heal.into_iter().map(|(tick, id)| (tick, Command::Heal(id))))
        .collect();
    // Stable sort keeps command-line order within a tick
    schedule.sort_by_key(|(tick, _)| *tick);
    let mut schedule = schedule.into_iter().peekable();

    let mut recorder = cli.time_series.as_ref().map(|_| TimeSeriesRecorder::new());
    let mut threats_detected = 0;
    let mut auto_mitigated = 0;
    let mut commands_applied = 0;
    let mut commands_failed = 0;

    for _ in 0..cli.ticks {
        let next_tick = sim.current_tick() + 1;
        while let Some((_, command)) = schedule.next_if(|(tick, _)| *tick <= next_tick) {
            sim.enqueue(command);
        }

        let report = sim.tick_core()?;

        for result in &report.commands {
            match &result.outcome {
                Ok(_) => commands_applied += 1,
                Err(e) => {
                    commands_failed += 1;
                    warn!(tick = report.tick, command = ?result.command, error = %e, "scripted command failed");
                }
            }
        }
        threats_detected += report.threats().count();
        auto_mitigated += report.auto_mitigated.len();
        if let Some(recorder) = recorder.as_mut() {
            recorder.record(&report, sim.event_log().last_seq());
        }

        if cli.realtime {
            std::thread::sleep(sim.clock().interval());
        }
    }

    let unapplied = schedule.count();
    if unapplied > 0 {
        warn!(unapplied, "scripted commands scheduled past the last tick were skipped");
    }

    if let (Some(path), Some(recorder)) = (&cli.time_series, &recorder) {
        recorder
            .write_jsonl(path)
            .with_context(|| format!("writing time series {}", path.display()))?;
        info!(samples = recorder.len(), path = %path.display(), "time series written");
    }

    let summary = RunSummary {
        seed: sim.config().seed,
        ticks: sim.current_tick(),
        elapsed_ms: sim.clock().elapsed().as_millis() as u64,
        counts: sim.counts(),
        rogue: sim.ids_in(HealthState::Rogue),
        compromised: sim.ids_in(HealthState::Compromised),
        threats_detected,
        auto_mitigated,
        pending_proposals: sim.mitigation_proposals().len(),
        commands_applied,
        commands_failed,
        events_logged: sim.event_log().last_seq(),
        events_evicted: sim.event_log().evicted(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
