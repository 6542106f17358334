/*
 * Debug Information Module
 *
 * Per-tick metrics recorded by the simulation driver and shown by hosts:
 * - Tick counter and wall time spent inside the tick
 * - Which execution mode and pipeline actually ran
 * - Parallel processing chunk size
 */

use std::time::Duration;

use crate::params::{ExecutionMode, Pipeline};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub agent_count: usize,
    pub elapsed: Duration,
    /// Always `Parallel` or `Sequential`, never `Auto`.
    pub mode: ExecutionMode,
    pub pipeline: Pipeline,
    /// `None` when the tick ran sequentially.
    pub chunk_size: Option<usize>,
}

impl TickStats {
    // Interactions evaluated per second of tick time
    pub fn interactions_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        let n = self.agent_count as f64;
        n * (n - 1.0).max(0.0) / secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throughput_handles_zero_elapsed() {
        let stats = TickStats {
            tick: 1,
            agent_count: 100,
            elapsed: Duration::ZERO,
            mode: ExecutionMode::Sequential,
            pipeline: Pipeline::Fused,
            chunk_size: None,
        };
        assert_eq!(stats.interactions_per_second(), 0.0);

        let stats = TickStats {
            elapsed: Duration::from_millis(10),
            ..stats
        };
        assert!((stats.interactions_per_second() - 990_000.0).abs() < 1.0);
    }
}
