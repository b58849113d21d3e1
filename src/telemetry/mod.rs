//! Telemetry for placement decisions.
//!
//! Provides distribution metrics, JSON export, and a replayable decision
//! trace. With the `telemetry` feature off, metrics compile to no-ops and
//! traces can still be recorded in memory but not saved.

pub mod trace;

pub use trace::{DecisionTrace, TraceEvent};

#[cfg(feature = "telemetry")]
pub mod metrics;

#[cfg(feature = "telemetry")]
pub mod export;

#[cfg(feature = "telemetry")]
pub use metrics::{DecisionMetrics, MetricsSnapshot};

#[cfg(feature = "telemetry")]
pub use export::{JsonExporter, MetricsExporter};

// Stub implementations when telemetry is disabled
#[cfg(not(feature = "telemetry"))]
pub mod metrics {
    use crate::scheduler::Counters;
    use std::time::Instant;

    #[derive(Debug, Default)]
    pub struct DecisionMetrics;

    impl DecisionMetrics {
        pub fn new() -> Self { Self }
        pub fn record_budget(&self, _: f64) {}
        pub fn record_probability(&self, _: f64) {}
        pub fn reset(&self) {}
        pub fn snapshot(&self, counters: Counters) -> MetricsSnapshot {
            MetricsSnapshot { counters, ..MetricsSnapshot::default() }
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct MetricsSnapshot {
        pub timestamp: Option<Instant>,
        pub counters: Counters,
        pub decisions: u64,
        pub avg_budget_us: u64,
        pub p50_budget_us: u64,
        pub p95_budget_us: u64,
        pub p99_budget_us: u64,
        pub max_budget_us: u64,
        pub avg_probability: f64,
        pub p05_probability: f64,
    }
}

#[cfg(not(feature = "telemetry"))]
pub use metrics::{DecisionMetrics, MetricsSnapshot};
