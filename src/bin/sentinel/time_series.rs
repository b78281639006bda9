// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Per-Tick JSONL Recorder

use serde::Serialize;
use sentinel_engine::TickReport;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct TickSample {
    pub tick: u64,
    pub healthy: u32,
    pub compromised: u32,
    pub rogue: u32,
    pub threats: usize,
    pub tainted: usize,
    pub decayed: usize,
    pub auto_mitigated: usize,
    pub sensor_anomalies: usize,
    pub failed_commands: usize,
    pub last_event_seq: u64,
}

impl TickSample {
    pub fn from_report(report: &TickReport, last_event_seq: u64) -> Self {
        Self {
            tick: report.tick,
            healthy: report.counts.healthy,
            compromised: report.counts.compromised,
            rogue: report.counts.rogue,
            threats: report.threats().count(),
            tainted: report.tainted.len(),
            decayed: report.decayed.len(),
            auto_mitigated: report.auto_mitigated.len(),
            sensor_anomalies: report.sensor_anomalies,
            failed_commands: report.commands.iter().filter(|c| !c.is_ok()).count(),
            last_event_seq,
        }
    }
}

/// Accumulates one sample per tick and writes them out as JSONL.
#[derive(Default)]
pub struct TimeSeriesRecorder {
    samples: Vec<TickSample>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &TickReport, last_event_seq: u64) {
        self.samples.push(TickSample::from_report(report, last_event_seq));
    }

    pub fn write_jsonl(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for sample in &self.samples {
            let line = serde_json::to_string(sample).map_err(std::io::Error::other)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}
