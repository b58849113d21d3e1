//! Collaborators the scheduler consults but does not own.
//!
//! The event kernel, radio model, mobility model and utilization bookkeeping
//! live outside this crate. The scheduler only sees them through the traits
//! below, bundled per decision into an [`Environment`].

pub mod fixed;

use crate::task::{DeviceId, TaskType};
use crate::topology::{Location, SiteId, Topology, WorkerCategory, WorkerId};

/// One end of a network transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Device(DeviceId),
    Site(SiteId),
    Cloud,
}

/// Upload/download latency in seconds. A value `<= 0` means no bandwidth.
pub trait NetworkModel {
    fn upload_delay(&self, from: Endpoint, to: Endpoint, bytes: u64) -> f64;
    fn download_delay(&self, from: Endpoint, to: Endpoint, bytes: u64) -> f64;
}

pub trait MobilityModel {
    fn location(&self, device: DeviceId, time: f64) -> Location;
}

/// CPU percentage a task of the given type is expected to need on a worker.
pub trait UtilizationPredictor {
    fn predict_utilization(&self, task_type: TaskType, category: WorkerCategory) -> f64;
}

/// Live CPU utilization of a worker, in percent.
pub trait UtilizationMonitor {
    fn current_utilization(&self, site: SiteId, worker: WorkerId, time: f64) -> f64;
}

/// Everything a single decision needs from the outside world.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub topology: &'a Topology,
    pub network: &'a dyn NetworkModel,
    pub mobility: &'a dyn MobilityModel,
    pub predictor: &'a dyn UtilizationPredictor,
    pub monitor: &'a dyn UtilizationMonitor,
    /// Current virtual time.
    pub now: f64,
}

impl<'a> Environment<'a> {
    pub fn new(
        topology: &'a Topology,
        network: &'a dyn NetworkModel,
        mobility: &'a dyn MobilityModel,
        predictor: &'a dyn UtilizationPredictor,
        monitor: &'a dyn UtilizationMonitor,
        now: f64,
    ) -> Self {
        Self {
            topology,
            network,
            mobility,
            predictor,
            monitor,
            now,
        }
    }

    pub fn at(mut self, now: f64) -> Self {
        self.now = now;
        self
    }
}

impl std::fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("sites", &self.topology.num_sites())
            .field("now", &self.now)
            .finish()
    }
}
