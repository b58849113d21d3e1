//! Table-driven collaborators for tests, benches and offline replays.

use super::{Endpoint, MobilityModel, NetworkModel, UtilizationMonitor, UtilizationPredictor};
use crate::task::{DeviceId, TaskType};
use crate::topology::{Location, SiteId, WorkerCategory, WorkerId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Same delay for every transfer, regardless of size or endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantDelay {
    pub upload: f64,
    pub download: f64,
}

impl ConstantDelay {
    pub fn new(upload: f64, download: f64) -> Self {
        Self { upload, download }
    }
}

impl NetworkModel for ConstantDelay {
    fn upload_delay(&self, _from: Endpoint, _to: Endpoint, _bytes: u64) -> f64 {
        self.upload
    }

    fn download_delay(&self, _from: Endpoint, _to: Endpoint, _bytes: u64) -> f64 {
        self.download
    }
}

/// Per-site delays for device transfers; everything else uses the fallback.
#[derive(Debug, Clone, Default)]
pub struct SiteDelays {
    per_site: HashMap<SiteId, (f64, f64)>,
    fallback: (f64, f64),
}

impl SiteDelays {
    pub fn new(upload: f64, download: f64) -> Self {
        Self {
            per_site: HashMap::new(),
            fallback: (upload, download),
        }
    }

    pub fn with_site(mut self, site: SiteId, upload: f64, download: f64) -> Self {
        self.per_site.insert(site, (upload, download));
        self
    }

    fn lookup(&self, from: Endpoint, to: Endpoint) -> (f64, f64) {
        let site = match (from, to) {
            (Endpoint::Site(s), _) | (_, Endpoint::Site(s)) => Some(s),
            _ => None,
        };
        site.and_then(|s| self.per_site.get(&s).copied())
            .unwrap_or(self.fallback)
    }
}

impl NetworkModel for SiteDelays {
    fn upload_delay(&self, from: Endpoint, to: Endpoint, _bytes: u64) -> f64 {
        self.lookup(from, to).0
    }

    fn download_delay(&self, from: Endpoint, to: Endpoint, _bytes: u64) -> f64 {
        self.lookup(from, to).1
    }
}

/// Devices that never move.
#[derive(Debug, Clone, Default)]
pub struct StaticMobility {
    locations: HashMap<DeviceId, Location>,
}

impl StaticMobility {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: DeviceId, location: Location) -> Self {
        self.locations.insert(device, location);
        self
    }
}

impl MobilityModel for StaticMobility {
    fn location(&self, device: DeviceId, _time: f64) -> Location {
        self.locations.get(&device).copied().unwrap_or_default()
    }
}

/// Looks predictions up by (task type, worker category).
#[derive(Debug, Clone, Default)]
pub struct TablePredictor {
    table: HashMap<(TaskType, WorkerCategory), f64>,
    fallback: f64,
}

impl TablePredictor {
    pub fn uniform(percent: f64) -> Self {
        Self {
            table: HashMap::new(),
            fallback: percent,
        }
    }

    pub fn with_entry(
        mut self,
        task_type: TaskType,
        category: WorkerCategory,
        percent: f64,
    ) -> Self {
        self.table.insert((task_type, category), percent);
        self
    }
}

impl UtilizationPredictor for TablePredictor {
    fn predict_utilization(&self, task_type: TaskType, category: WorkerCategory) -> f64 {
        self.table
            .get(&(task_type, category))
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Utilization figures set by hand. Interior mutability lets a driver
/// update the load between decisions while the environment is borrowed.
#[derive(Debug, Default)]
pub struct StaticUtilization {
    load: RwLock<HashMap<(SiteId, WorkerId), f64>>,
}

impl StaticUtilization {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load(self, site: SiteId, worker: WorkerId, percent: f64) -> Self {
        self.set(site, worker, percent);
        self
    }

    pub fn set(&self, site: SiteId, worker: WorkerId, percent: f64) {
        self.load.write().insert((site, worker), percent);
    }

    pub fn add(&self, site: SiteId, worker: WorkerId, percent: f64) {
        *self.load.write().entry((site, worker)).or_insert(0.0) += percent;
    }
}

impl UtilizationMonitor for StaticUtilization {
    fn current_utilization(&self, site: SiteId, worker: WorkerId, _time: f64) -> f64 {
        self.load.read().get(&(site, worker)).copied().unwrap_or(0.0)
    }
}
