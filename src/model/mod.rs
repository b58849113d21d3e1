//! Statistical models of observed completion, transfer and processing times.
//!
//! Three tables are kept, each built wholesale from the samples of the
//! previous generation:
//!
//! - **ETC** `(site, task type)`: end-to-end completion time at a site.
//! - **ETT** `(source site, destination site)`: transfer time between sites.
//! - **PTC** `(site, worker, task type)`: processing-only time on a worker.
//!
//! Keys with no samples read as mean 0 / stdev 0, and a probability query on
//! them answers 1.0.

pub mod gaussian;
pub mod table;

pub use gaussian::{normal_cdf, ConfidenceInterval, Gaussian};
pub use table::ModelTable;

use crate::task::TaskType;
use crate::topology::{SiteId, WorkerId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One completed task, as reported by the execution layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionSample {
    /// Nearest site when the task was submitted.
    pub origin_site: SiteId,
    /// Site that executed the task.
    pub site: SiteId,
    pub worker: WorkerId,
    pub task_type: TaskType,
    pub completion_time: f64,
    pub processing_time: f64,
    pub transfer_time: f64,
}

pub type EtcKey = (SiteId, TaskType);
pub type EttKey = (SiteId, SiteId);
pub type PtcKey = (SiteId, WorkerId, TaskType);

#[derive(Debug, Clone, Default)]
pub struct DistributionModel {
    etc: ModelTable<EtcKey>,
    ett: ModelTable<EttKey>,
    ptc: ModelTable<PtcKey>,
    sample_count: usize,
}

impl DistributionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(samples: &[CompletionSample]) -> Self {
        let mut etc: HashMap<EtcKey, Vec<f64>> = HashMap::new();
        let mut ett: HashMap<EttKey, Vec<f64>> = HashMap::new();
        let mut ptc: HashMap<PtcKey, Vec<f64>> = HashMap::new();

        for s in samples {
            etc.entry((s.site, s.task_type))
                .or_default()
                .push(s.completion_time);
            ett.entry((s.origin_site, s.site))
                .or_default()
                .push(s.transfer_time);
            ptc.entry((s.site, s.worker, s.task_type))
                .or_default()
                .push(s.processing_time);
        }

        Self {
            etc: ModelTable::from_groups(etc),
            ett: ModelTable::from_groups(ett),
            ptc: ModelTable::from_groups(ptc),
            sample_count: samples.len(),
        }
    }

    /// Assembles a model from precomputed tables.
    pub fn from_tables(
        etc: ModelTable<EtcKey>,
        ett: ModelTable<EttKey>,
        ptc: ModelTable<PtcKey>,
        sample_count: usize,
    ) -> Self {
        Self {
            etc,
            ett,
            ptc,
            sample_count,
        }
    }

    pub fn etc(&self) -> &ModelTable<EtcKey> {
        &self.etc
    }

    pub fn ett(&self) -> &ModelTable<EttKey> {
        &self.ett
    }

    pub fn ptc(&self) -> &ModelTable<PtcKey> {
        &self.ptc
    }

    /// Number of samples the model was built from.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn completion(&self, site: SiteId, task_type: TaskType) -> Gaussian {
        self.etc.get((site, task_type))
    }

    pub fn transfer(&self, from: SiteId, to: SiteId) -> Gaussian {
        self.ett.get((from, to))
    }

    pub fn processing(&self, site: SiteId, worker: WorkerId, task_type: TaskType) -> Gaussian {
        self.ptc.get((site, worker, task_type))
    }

    /// Completion at `remote` plus the transfer from `local` to it.
    pub fn offloaded_completion(
        &self,
        local: SiteId,
        remote: SiteId,
        task_type: TaskType,
    ) -> Gaussian {
        self.completion(remote, task_type).convolve(&self.transfer(local, remote))
    }

    /// Mean ETC over `num_sites` sites, counting unobserved sites as 0.
    pub fn average_completion(&self, task_type: TaskType, num_sites: usize) -> f64 {
        if num_sites == 0 {
            return 0.0;
        }
        let total: f64 = (0..num_sites)
            .map(|i| self.etc.mean((SiteId(i), task_type)))
            .sum();
        total / num_sites as f64
    }
}
