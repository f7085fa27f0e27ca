//! Thread-safe triage metrics
//!
//! Atomic counters for high-frequency events, mutex-protected collections for
//! per-label breakdowns and durations.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const MAX_DURATION_SAMPLES: usize = 1000;

/// Global metrics collector instance
pub static METRICS: Lazy<TriageMetrics> = Lazy::new(TriageMetrics::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static TriageMetrics {
    &METRICS
}

pub struct TriageMetrics {
    analyses_started: AtomicU64,
    analyses_completed: AtomicU64,
    priorities_clamped: AtomicU64,
    analyses_applied: AtomicU64,
    apply_failures: AtomicU64,
    increment_failures: AtomicU64,

    resolutions: Mutex<BTreeMap<String, u64>>,
    fallbacks: Mutex<BTreeMap<String, u64>>,
    failure_kinds: Mutex<BTreeMap<String, u64>>,
    analysis_times: Mutex<Vec<u64>>, // milliseconds

    started_at: AtomicU64,
}

impl TriageMetrics {
    pub fn new() -> Self {
        Self {
            analyses_started: AtomicU64::new(0),
            analyses_completed: AtomicU64::new(0),
            priorities_clamped: AtomicU64::new(0),
            analyses_applied: AtomicU64::new(0),
            apply_failures: AtomicU64::new(0),
            increment_failures: AtomicU64::new(0),
            resolutions: Mutex::new(BTreeMap::new()),
            fallbacks: Mutex::new(BTreeMap::new()),
            failure_kinds: Mutex::new(BTreeMap::new()),
            analysis_times: Mutex::new(Vec::new()),
            started_at: AtomicU64::new(current_timestamp()),
        }
    }

    pub fn analysis_started(&self) {
        self.analyses_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn analysis_completed(&self, duration: Duration) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut times) = self.analysis_times.lock() {
            times.push(duration.as_millis() as u64);
            if times.len() > MAX_DURATION_SAMPLES {
                times.remove(0);
            }
        }
    }

    /// Record how the returned agent identifier was resolved
    pub fn agent_resolved(&self, resolution: &str) {
        bump(&self.resolutions, resolution);
    }

    pub fn fallback_taken(&self, cause: &str) {
        bump(&self.fallbacks, cause);
    }

    pub fn analysis_failed(&self, kind: &str) {
        bump(&self.failure_kinds, kind);
    }

    pub fn priority_clamped(&self) {
        self.priorities_clamped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn analysis_applied(&self) {
        self.analyses_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn apply_failed(&self) {
        self.apply_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.increment_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Reset all metrics (useful for testing)
    pub fn reset(&self) {
        for counter in [
            &self.analyses_started,
            &self.analyses_completed,
            &self.priorities_clamped,
            &self.analyses_applied,
            &self.apply_failures,
            &self.increment_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
        for map in [&self.resolutions, &self.fallbacks, &self.failure_kinds] {
            if let Ok(mut map) = map.lock() {
                map.clear();
            }
        }
        if let Ok(mut times) = self.analysis_times.lock() {
            times.clear();
        }
        self.started_at.store(current_timestamp(), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let (avg_analysis_time_ms, p50, p95) = self.analysis_time_statistics();

        MetricsSnapshot {
            analyses_started: self.analyses_started.load(Ordering::Relaxed),
            analyses_completed: self.analyses_completed.load(Ordering::Relaxed),
            resolutions: read_map(&self.resolutions),
            fallbacks: read_map(&self.fallbacks),
            failure_kinds: read_map(&self.failure_kinds),
            priorities_clamped: self.priorities_clamped.load(Ordering::Relaxed),
            analyses_applied: self.analyses_applied.load(Ordering::Relaxed),
            apply_failures: self.apply_failures.load(Ordering::Relaxed),
            increment_failures: self.increment_failures.load(Ordering::Relaxed),
            avg_analysis_time_ms,
            analysis_time_p50_ms: p50,
            analysis_time_p95_ms: p95,
            uptime_seconds: now.saturating_sub(self.started_at.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }

    fn analysis_time_statistics(&self) -> (f64, f64, f64) {
        let Ok(times) = self.analysis_times.lock() else {
            return (0.0, 0.0, 0.0);
        };
        if times.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = times.clone();
        sorted.sort_unstable();
        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        (avg, percentile(&sorted, 50.0), percentile(&sorted, 95.0))
    }
}

impl Default for TriageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub analyses_started: u64,
    pub analyses_completed: u64,
    /// Keyed by `exact`, `fuzzy_name`, `default`
    pub resolutions: BTreeMap<String, u64>,
    /// Keyed by `no_agents`, `analysis_error`
    pub fallbacks: BTreeMap<String, u64>,
    pub failure_kinds: BTreeMap<String, u64>,
    pub priorities_clamped: u64,
    pub analyses_applied: u64,
    pub apply_failures: u64,
    pub increment_failures: u64,
    pub avg_analysis_time_ms: f64,
    pub analysis_time_p50_ms: f64,
    pub analysis_time_p95_ms: f64,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

impl MetricsSnapshot {
    pub fn fallback_count(&self, cause: &str) -> u64 {
        self.fallbacks.get(cause).copied().unwrap_or(0)
    }

    pub fn resolution_count(&self, resolution: &str) -> u64 {
        self.resolutions.get(resolution).copied().unwrap_or(0)
    }
}

fn bump(map: &Mutex<BTreeMap<String, u64>>, key: &str) {
    if let Ok(mut map) = map.lock() {
        *map.entry(key.to_string()).or_insert(0) += 1;
    }
}

fn read_map(map: &Mutex<BTreeMap<String, u64>>) -> BTreeMap<String, u64> {
    map.lock().map(|m| m.clone()).unwrap_or_default()
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn percentile(sorted_data: &[u64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = sorted_data[index.floor() as usize] as f64;
    let upper = sorted_data[index.ceil() as usize] as f64;
    lower + (upper - lower) * index.fract()
}
