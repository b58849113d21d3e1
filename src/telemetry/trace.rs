//! Decision trace for replaying and diffing scheduler runs.

use crate::error::Rejection;
use crate::scheduler::Tier;
use crate::task::TaskId;
use crate::topology::{SiteId, WorkerId};
use serde::{Deserialize, Serialize};

/// Ordered log of scheduler decisions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    events: Vec<TraceEvent>,
}

impl DecisionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Save trace to JSON file
    #[cfg(feature = "telemetry")]
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Load trace from JSON file
    #[cfg(feature = "telemetry")]
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// Events that can be recorded in a decision trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    Routed {
        task_id: TaskId,
        tier: Tier,
        nearest: Option<SiteId>,
        deadline: f64,
    },
    SiteSelected {
        task_id: TaskId,
        site: SiteId,
        redirected: bool,
        probability: Option<f64>,
    },
    Admitted {
        task_id: TaskId,
        site: SiteId,
        worker: WorkerId,
    },
    Deferred {
        task_id: TaskId,
        site: SiteId,
        pending: usize,
    },
    Rejected {
        task_id: TaskId,
        site: Option<SiteId>,
        reason: Rejection,
    },
}

impl TraceEvent {
    pub fn task_id(&self) -> TaskId {
        match self {
            TraceEvent::Routed { task_id, .. }
            | TraceEvent::SiteSelected { task_id, .. }
            | TraceEvent::Admitted { task_id, .. }
            | TraceEvent::Deferred { task_id, .. }
            | TraceEvent::Rejected { task_id, .. } => *task_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "telemetry")]
    #[test]
    fn test_trace_save_load() {
        let mut trace = DecisionTrace::new();
        trace.record(TraceEvent::Routed {
            task_id: TaskId(1),
            tier: Tier::Edge,
            nearest: Some(SiteId(0)),
            deadline: 12.5,
        });
        trace.record(TraceEvent::Rejected {
            task_id: TaskId(1),
            site: Some(SiteId(0)),
            reason: Rejection::CapacityExhausted,
        });

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.json");
        trace.save(&path).unwrap();

        let loaded = DecisionTrace::load(&path).unwrap();
        assert_eq!(loaded, trace);
        assert_eq!(loaded.events()[1].task_id(), TaskId(1));
    }

    #[test]
    fn test_trace_clear() {
        let mut trace = DecisionTrace::new();
        trace.record(TraceEvent::Deferred {
            task_id: TaskId(4),
            site: SiteId(2),
            pending: 1,
        });
        assert_eq!(trace.len(), 1);

        trace.clear();
        assert!(trace.is_empty());
    }
}
