//! Metrics export functionality for various formats.

use super::metrics::MetricsSnapshot;
use crate::error::{Error, Result};
use crate::scheduler::Counters;
use serde::Serialize;

/// Trait for exporting metrics to different formats
pub trait MetricsExporter {
    /// Export a metrics snapshot
    fn export(&self, snapshot: &MetricsSnapshot) -> Result<()>;
}

/// Export metrics to JSON format
#[derive(Debug)]
pub struct JsonExporter {
    output_path: std::path::PathBuf,
}

impl JsonExporter {
    pub fn new(output_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl MetricsExporter for JsonExporter {
    fn export(&self, snapshot: &MetricsSnapshot) -> Result<()> {
        let serializable = SerializableSnapshot::from(snapshot);
        let json = serde_json::to_string_pretty(&serializable)
            .map_err(|e| Error::telemetry(format!("JSON serialization failed: {}", e)))?;

        std::fs::write(&self.output_path, json)?;

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct SerializableSnapshot {
    uptime_secs: f64,
    counters: Counters,
    decisions: u64,
    avg_budget_ms: f64,
    p50_budget_ms: f64,
    p95_budget_ms: f64,
    p99_budget_ms: f64,
    max_budget_ms: f64,
    avg_probability: f64,
    p05_probability: f64,
    redirect_ratio: f64,
    rejection_ratio: f64,
}

impl From<&MetricsSnapshot> for SerializableSnapshot {
    fn from(snapshot: &MetricsSnapshot) -> Self {
        let ms = |us: u64| us as f64 / 1_000.0;
        Self {
            uptime_secs: snapshot.uptime.as_secs_f64(),
            counters: snapshot.counters,
            decisions: snapshot.decisions,
            avg_budget_ms: ms(snapshot.avg_budget_us),
            p50_budget_ms: ms(snapshot.p50_budget_us),
            p95_budget_ms: ms(snapshot.p95_budget_us),
            p99_budget_ms: ms(snapshot.p99_budget_us),
            max_budget_ms: ms(snapshot.max_budget_us),
            avg_probability: snapshot.avg_probability,
            p05_probability: snapshot.p05_probability,
            redirect_ratio: snapshot.redirect_ratio(),
            rejection_ratio: snapshot.rejection_ratio(),
        }
    }
}
