//! Per-command latency metrics.
//!
//! Lightweight, thread-safe collection shared by all connection threads.
//! Counters are lock-free atomics; the latency window behind a mutex is a
//! bounded ring so memory stays fixed no matter how long the server runs.
//! Enabled with the `--metrics` flag; when disabled nothing is recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Instant;

/// Rolling window of command latencies kept for percentile calculation.
const LATENCY_WINDOW_SIZE: usize = 1000;

/// Commands at or above this take long enough to be worth logging.
pub const SLOW_COMMAND_THRESHOLD_MS: u64 = 100;

/// Thread-safe metrics collector. One per server, shared via `Arc`.
#[derive(Debug, Default)]
pub struct Metrics {
    command_count: AtomicU64,
    slow_command_count: AtomicU64,
    latencies_ms: Mutex<VecDeque<u64>>,
    per_command: Mutex<HashMap<&'static str, u64>>,
    started: Option<Instant>,
}

/// Point-in-time view of collected metrics.
#[derive(Debug, Default, Clone)]
pub struct MetricsSnapshot {
    pub command_count: u64,
    pub slow_command_count: u64,
    pub latency_p50_ms: u64,
    pub latency_p95_ms: u64,
    pub latency_p99_ms: u64,
    pub per_command: HashMap<&'static str, u64>,
    pub uptime_secs: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            started: Some(Instant::now()),
            ..Self::default()
        }
    }

    /// Record one processed command. O(1) amortized; `kind` is the stable
    /// command name from [`crate::command::Command::kind`] (or "unsupported").
    pub fn record_command(&self, kind: &'static str, duration_ms: u64) {
        self.command_count.fetch_add(1, Ordering::Relaxed);
        if duration_ms >= SLOW_COMMAND_THRESHOLD_MS {
            self.slow_command_count.fetch_add(1, Ordering::Relaxed);
        }

        let mut window = self.latencies_ms.lock().unwrap();
        if window.len() == LATENCY_WINDOW_SIZE {
            window.pop_front();
        }
        window.push_back(duration_ms);
        drop(window);

        *self.per_command.lock().unwrap().entry(kind).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut sorted: Vec<u64> = self.latencies_ms.lock().unwrap().iter().copied().collect();
        sorted.sort_unstable();

        MetricsSnapshot {
            command_count: self.command_count.load(Ordering::Relaxed),
            slow_command_count: self.slow_command_count.load(Ordering::Relaxed),
            latency_p50_ms: percentile(&sorted, 50),
            latency_p95_ms: percentile(&sorted, 95),
            latency_p99_ms: percentile(&sorted, 99),
            per_command: self.per_command.lock().unwrap().clone(),
            uptime_secs: self.started.map(|s| s.elapsed().as_secs()).unwrap_or(0),
        }
    }
}

/// Nearest-rank percentile over an already sorted slice. 0 when empty.
fn percentile(sorted: &[u64], pct: usize) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = (pct * sorted.len()).div_ceil(100);
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_commands_and_slow_commands() {
        let metrics = Metrics::new();
        metrics.record_command("AddNode", 1);
        metrics.record_command("ShortestPath", 250);
        metrics.record_command("AddNode", 3);

        let snap = metrics.snapshot();
        assert_eq!(snap.command_count, 3);
        assert_eq!(snap.slow_command_count, 1);
        assert_eq!(snap.per_command.get("AddNode"), Some(&2));
        assert_eq!(snap.per_command.get("ShortestPath"), Some(&1));
    }

    #[test]
    fn percentiles_over_known_distribution() {
        let metrics = Metrics::new();
        for ms in 1..=100 {
            metrics.record_command("AddNode", ms);
        }

        let snap = metrics.snapshot();
        assert_eq!(snap.latency_p50_ms, 50);
        assert_eq!(snap.latency_p95_ms, 95);
        assert_eq!(snap.latency_p99_ms, 99);
    }

    #[test]
    fn empty_window_reports_zeros() {
        let snap = Metrics::new().snapshot();
        assert_eq!(snap.command_count, 0);
        assert_eq!(snap.latency_p50_ms, 0);
    }

    #[test]
    fn window_is_bounded() {
        let metrics = Metrics::new();
        for i in 0..(LATENCY_WINDOW_SIZE as u64 + 500) {
            metrics.record_command("AddNode", i);
        }
        assert_eq!(
            metrics.latencies_ms.lock().unwrap().len(),
            LATENCY_WINDOW_SIZE
        );
    }
}
