// =============================================================================
// Central Application State — snapshot service
// =============================================================================
//
// Shared across all request handlers via `Arc<AppState>`.
//
// Thread safety:
//   - Atomic counters for lock-free request accounting.
//   - parking_lot::RwLock around the runtime config.
//   - The snapshot service is immutable after construction; its HTTP clients
//     are internally reference counted.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;

use crate::runtime_config::RuntimeConfig;
use crate::snapshot::SnapshotService;

pub struct AppState {
    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Services ────────────────────────────────────────────────────────
    pub snapshots: SnapshotService,

    // ── Request accounting ──────────────────────────────────────────────
    /// Analyses that produced a report (including validation failures).
    pub requests_served: AtomicU64,
    /// Requests that failed before analysis (bad symbol, upstream outage).
    pub requests_failed: AtomicU64,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

/// Counters exposed by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub uptime_secs: u64,
    pub requests_served: u64,
    pub requests_failed: u64,
}

impl AppState {
    /// Construct the state from `config`.  Fails only if an HTTP client
    /// cannot be built.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let snapshots = SnapshotService::new(&config)?;
        Ok(Self {
            runtime_config: Arc::new(RwLock::new(config)),
            snapshots,
            requests_served: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn record_served(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_failed(&self) -> u64 {
        self.requests_failed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            uptime_secs: self.start_time.elapsed().as_secs(),
            requests_served: self.requests_served.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let state = AppState::new(RuntimeConfig::default()).unwrap();
        assert_eq!(state.stats().requests_served, 0);
        assert_eq!(state.record_served(), 1);
        assert_eq!(state.record_served(), 2);
        assert_eq!(state.record_failed(), 1);

        let stats = state.stats();
        assert_eq!(stats.requests_served, 2);
        assert_eq!(stats.requests_failed, 1);
    }

    #[test]
    fn config_is_shared() {
        let state = AppState::new(RuntimeConfig::default()).unwrap();
        state.runtime_config.write().history_range = "5y".to_string();
        assert_eq!(state.runtime_config.read().history_range, "5y");
    }
}
