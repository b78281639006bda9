// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Event Log

//! Append-only, bounded record of everything that changed shared state.
//!
//! Sequence numbers are minted by the log itself so they are strictly
//! increasing for the lifetime of the engine, including across evictions.
//! Eviction of the oldest event once capacity is reached is the retention
//! policy, not an error.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::trace;

use crate::detector::AnomalySignature;
use crate::sensor::SensorAnomaly;
use crate::state_machine::{Severity, TransitionCause};
use crate::types::{HealthState, NodeId, SensorReadings};

// ─── Event ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EventKind {
    NodeAdded {
        readings: SensorReadings,
    },
    NodeRemoved {
        last_state: HealthState,
    },
    StateChanged {
        from: HealthState,
        to: HealthState,
        cause: TransitionCause,
        severity: Severity,
    },
    ThreatDetected {
        signature: AnomalySignature,
    },
    Mitigated {
        from: HealthState,
    },
    SensorAnomaly {
        anomaly: SensorAnomaly,
        readings: SensorReadings,
    },
    NetworkReset {
        restored: u32,
    },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeAdded { .. } => "NodeAdded",
            Self::NodeRemoved { .. } => "NodeRemoved",
            Self::StateChanged { .. } => "StateChanged",
            Self::ThreatDetected { .. } => "ThreatDetected",
            Self::Mitigated { .. } => "Mitigated",
            Self::SensorAnomaly { .. } => "SensorAnomaly",
            Self::NetworkReset { .. } => "NetworkReset",
        }
    }
}

/// Immutable log record. Only the log constructs these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub tick: u64,
    /// `None` for fleet-wide events.
    pub node: Option<NodeId>,
    #[serde(flatten)]
    pub kind: EventKind,
}

// ─── EventLog ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EventLog {
    events: VecDeque<Event>,
    capacity: usize,
    next_seq: u64,
    evicted: u64,
}

impl EventLog {
    /// A zero capacity is raised to one; config validation rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 1,
            evicted: 0,
        }
    }

    /// Record an event and return its sequence number.
    pub fn append(&mut self, tick: u64, node: Option<NodeId>, kind: EventKind) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(seq, tick, kind = kind.name(), "event appended");
        self.events.push_back(Event { seq, tick, node, kind });
        while self.events.len() > self.capacity {
            self.events.pop_front();
            self.evicted += 1;
        }
        seq
    }

    /// The last `n` retained events, newest last.
    pub fn recent(&self, n: usize) -> Vec<Event> {
        let skip = self.events.len().saturating_sub(n);
        self.events.iter().skip(skip).cloned().collect()
    }

    /// Retained events with a sequence number greater than `seq`.
    pub fn since(&self, seq: u64) -> Vec<Event> {
        self.events.iter().filter(|e| e.seq > seq).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Sequence number of the newest event, or 0 when nothing was ever logged.
    pub fn last_seq(&self) -> u64 {
        self.next_seq - 1
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events dropped by the retention policy so far.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn removed() -> EventKind {
        EventKind::NodeRemoved { last_state: HealthState::Healthy }
    }

    #[test]
    fn test_sequence_strictly_increasing() {
        let mut log = EventLog::new(3);
        let mut last = 0;
        for tick in 0..10 {
            let seq = log.append(tick, None, removed());
            assert!(seq > last);
            last = seq;
        }
        assert_eq!(log.last_seq(), 10);
        let seqs: Vec<u64> = log.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![8, 9, 10]);
    }

    #[test]
    fn test_retention_drops_oldest() {
        let n = 4;
        let mut log = EventLog::new(n);
        let first = log.append(0, Some(NodeId::from("first")), removed());
        for tick in 1..=n as u64 {
            log.append(tick, None, removed());
        }
        let recent = log.recent(n);
        assert_eq!(recent.len(), n);
        assert!(recent.iter().all(|e| e.seq != first));
        assert_eq!(log.evicted(), 1);
    }

    #[test]
    fn test_recent_is_newest_last() {
        let mut log = EventLog::new(10);
        for tick in 0..5 {
            log.append(tick, None, removed());
        }
        let recent = log.recent(2);
        assert_eq!(recent.iter().map(|e| e.tick).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(log.recent(100).len(), 5);
    }

    #[test]
    fn test_since_returns_newer_events() {
        let mut log = EventLog::new(10);
        let a = log.append(1, None, removed());
        log.append(2, None, removed());
        log.append(3, None, removed());
        let newer = log.since(a);
        assert_eq!(newer.len(), 2);
        assert!(newer.iter().all(|e| e.seq > a));
    }

    #[test]
    fn test_event_json_carries_kind_tag() {
        let mut log = EventLog::new(2);
        log.append(5, Some(NodeId::from("n1")), EventKind::NetworkReset { restored: 3 });
        let json = serde_json::to_value(&log.recent(1)[0]).unwrap();
        assert_eq!(json["kind"], "NetworkReset");
        assert_eq!(json["restored"], 3);
        assert_eq!(json["node"], "n1");
    }

    #[test]
    fn test_name_matches_json_tag() {
        let kind = removed();
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], kind.name());
    }
}
