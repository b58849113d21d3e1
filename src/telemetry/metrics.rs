//! Distribution metrics for placement decisions.

use crate::scheduler::Counters;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

// One hour in microseconds.
const MAX_BUDGET_US: u64 = 3_600_000_000;
const MAX_PROBABILITY_BP: u64 = 10_000;

/// Histograms of committed deadline budgets and placement probabilities.
#[derive(Debug)]
pub struct DecisionMetrics {
    decisions: AtomicU64,
    budget_histogram: RwLock<Histogram<u64>>,
    // Basis points, 10_000 == certainty.
    probability_histogram: RwLock<Histogram<u64>>,
    start_time: Instant,
}

impl DecisionMetrics {
    pub fn new() -> Self {
        Self {
            decisions: AtomicU64::new(0),
            budget_histogram: RwLock::new(new_histogram(MAX_BUDGET_US)),
            probability_histogram: RwLock::new(new_histogram(MAX_PROBABILITY_BP)),
            start_time: Instant::now(),
        }
    }

    /// Record the deadline budget (deadline - submission) of a placed task.
    pub fn record_budget(&self, budget_secs: f64) {
        self.decisions.fetch_add(1, Ordering::Relaxed);

        let micros = (budget_secs.max(0.0) * 1_000_000.0) as u64;
        let _ = self.budget_histogram.write().record(micros.min(MAX_BUDGET_US));
    }

    /// Record the probability of meeting the deadline at the chosen site.
    pub fn record_probability(&self, probability: f64) {
        let bp = (probability.clamp(0.0, 1.0) * MAX_PROBABILITY_BP as f64).round() as u64;
        let _ = self.probability_histogram.write().record(bp);
    }

    pub fn snapshot(&self, counters: Counters) -> MetricsSnapshot {
        let budget = self.budget_histogram.read();
        let probability = self.probability_histogram.read();

        MetricsSnapshot {
            timestamp: Instant::now(),
            uptime: self.start_time.elapsed(),
            counters,
            decisions: self.decisions.load(Ordering::Relaxed),
            avg_budget_us: if budget.len() > 0 { budget.mean() as u64 } else { 0 },
            p50_budget_us: budget.value_at_quantile(0.50),
            p95_budget_us: budget.value_at_quantile(0.95),
            p99_budget_us: budget.value_at_quantile(0.99),
            max_budget_us: budget.max(),
            avg_probability: if probability.len() > 0 {
                probability.mean() / MAX_PROBABILITY_BP as f64
            } else {
                0.0
            },
            p05_probability: probability.value_at_quantile(0.05) as f64 / MAX_PROBABILITY_BP as f64,
        }
    }

    pub fn reset(&self) {
        self.decisions.store(0, Ordering::Relaxed);
        self.budget_histogram.write().reset();
        self.probability_histogram.write().reset();
    }
}

impl Default for DecisionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn new_histogram(max: u64) -> Histogram<u64> {
    Histogram::new_with_max(max, 3).expect("Failed to create histogram")
}

/// Snapshot of decision metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: Instant,
    pub uptime: std::time::Duration,
    pub counters: Counters,
    pub decisions: u64,
    pub avg_budget_us: u64,
    pub p50_budget_us: u64,
    pub p95_budget_us: u64,
    pub p99_budget_us: u64,
    pub max_budget_us: u64,
    pub avg_probability: f64,
    /// Probability met or exceeded by 95% of placements.
    pub p05_probability: f64,
}

impl MetricsSnapshot {
    /// Share of urgent tasks that ended up away from their nearest site.
    pub fn redirect_ratio(&self) -> f64 {
        if self.counters.urgent == 0 {
            return 0.0;
        }
        self.counters.redirected as f64 / self.counters.urgent as f64
    }

    /// Share of admission attempts rejected for capacity.
    pub fn rejection_ratio(&self) -> f64 {
        let counters = &self.counters;
        let attempts = counters.admitted + counters.deferred + counters.rejected_capacity;
        if attempts == 0 {
            return 0.0;
        }
        self.counters.rejected_capacity as f64 / attempts as f64
    }
}
