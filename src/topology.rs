//! Static description of the edge sites and their workers.
//!
//! The topology is fixed for a simulation run and is only ever read by the
//! scheduler. Live quantities (utilization, queue depth) live elsewhere.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a site in [`Topology::sites`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SiteId(pub usize);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a worker (VM), unique within its site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Location) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Affinity class of a worker, also used as a task's declared preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkerCategory {
    CpuIntensive,
    MemoryIntensive,
    #[default]
    Generic,
}

impl WorkerCategory {
    pub const ALL: [WorkerCategory; 3] = [
        WorkerCategory::CpuIntensive,
        WorkerCategory::MemoryIntensive,
        WorkerCategory::Generic,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub category: WorkerCategory,
}

impl Worker {
    pub fn new(id: usize, category: WorkerCategory) -> Self {
        Self {
            id: WorkerId(id),
            category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    /// Location of the site's first host.
    pub location: Location,
    pub workers: Vec<Worker>,
}

impl Site {
    pub fn new(id: usize, location: Location, workers: Vec<Worker>) -> Self {
        Self {
            id: SiteId(id),
            location,
            workers,
        }
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.iter().find(|w| w.id == id)
    }
}

/// Ordered edge sites plus the cloud datacenter(s).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    sites: Vec<Site>,
    cloud: Vec<Site>,
}

impl Topology {
    /// Builds a topology, checking that every site's id matches its index.
    pub fn new(sites: Vec<Site>) -> Result<Self> {
        for (index, site) in sites.iter().enumerate() {
            if site.id.0 != index {
                return Err(Error::config(format!(
                    "site at index {} carries id {}",
                    index, site.id
                )));
            }
        }
        Ok(Self {
            sites,
            cloud: Vec::new(),
        })
    }

    /// Attaches the cloud datacenter(s). Cloud ids continue the edge
    /// numbering, so cloud site `i` must carry id `num_sites() + i`.
    pub fn with_cloud(mut self, cloud: Vec<Site>) -> Result<Self> {
        let first = self.sites.len();
        for (index, site) in cloud.iter().enumerate() {
            if site.id.0 != first + index {
                return Err(Error::config(format!(
                    "cloud site at index {} carries id {}, expected {}",
                    index,
                    site.id,
                    first + index
                )));
            }
        }
        self.cloud = cloud;
        Ok(self)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn cloud(&self) -> &[Site] {
        &self.cloud
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.0)
    }

    pub fn require_site(&self, id: SiteId) -> Result<&Site> {
        self.site(id).ok_or(Error::UnknownSite(id))
    }

    pub fn require_worker(&self, site: SiteId, worker: WorkerId) -> Result<&Worker> {
        self.require_site(site)?
            .worker(worker)
            .ok_or(Error::UnknownWorker { site, worker })
    }

    pub fn cloud_site(&self, id: SiteId) -> Option<&Site> {
        id.0.checked_sub(self.sites.len()).and_then(|index| self.cloud.get(index))
    }

    pub fn is_cloud(&self, id: SiteId) -> bool {
        self.cloud_site(id).is_some()
    }
}
