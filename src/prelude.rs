pub use crate::config::{Adjacency, Config, ConfigBuilder, PolicyKind, WorkerSelection};
pub use crate::deadline::DeadlineCalculator;
pub use crate::env::{
    Endpoint, Environment, MobilityModel, NetworkModel, UtilizationMonitor, UtilizationPredictor,
};
pub use crate::error::{Error, Rejection, Result};
pub use crate::locator::SiteLocator;
pub use crate::model::{CompletionSample, DistributionModel, Gaussian};
pub use crate::scheduler::{Admission, Counters, Route, Scheduler, SiteDecision, SiteSelector, Tier};
pub use crate::task::{DeviceId, TaskFactory, TaskId, TaskRequest, TaskType};
pub use crate::topology::{Location, Site, SiteId, Topology, Worker, WorkerCategory, WorkerId};

pub use crate::telemetry::{DecisionMetrics, DecisionTrace, MetricsSnapshot};

#[cfg(feature = "telemetry")]
pub use crate::telemetry::{JsonExporter, MetricsExporter};
