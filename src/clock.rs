// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Quantum Sentinel Digital Twin - Simulation Clock

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{SentinelError, SentinelResult};

/// Logical clock driving the tick loop.
///
/// Holds no wall-clock state; `elapsed` is `tick * interval`. Embedders that
/// want real-time pacing sleep `interval()` between ticks themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationClock {
    tick: u64,
    interval_ms: u64,
    running: bool,
}

impl SimulationClock {
    pub fn new(interval_ms: u64) -> Self {
        Self { tick: 0, interval_ms, running: true }
    }

    /// Move to the next tick and return it. A stopped clock refuses and
    /// stays on the last completed tick.
    pub fn advance(&mut self) -> SentinelResult<u64> {
        if !self.running {
            return Err(SentinelError::ClockStopped);
        }
        self.tick += 1;
        Ok(self.tick)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Last completed tick. Zero before the first tick.
    pub fn current(&self) -> u64 {
        self.tick
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.tick.saturating_mul(self.interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_ticks() {
        let mut clock = SimulationClock::new(250);
        assert_eq!(clock.current(), 0);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.elapsed(), Duration::from_millis(500));
        assert_eq!(clock.interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_stopped_clock_refuses() {
        let mut clock = SimulationClock::new(1000);
        clock.advance().unwrap();
        clock.stop();
        assert_eq!(clock.advance(), Err(SentinelError::ClockStopped));
        assert_eq!(clock.current(), 1);
        clock.resume();
        assert_eq!(clock.advance().unwrap(), 2);
    }
}
