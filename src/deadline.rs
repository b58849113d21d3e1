//! Deadline derivation from the completion model and communication delay.
//!
//! `deadline = β·avg(ETC[*][type]) + slack + submission + α·(up + down)`
//!
//! Every function here is pure: the caller decides whether to commit the
//! value onto the task.

use crate::config::Config;
use crate::env::{Endpoint, NetworkModel};
use crate::model::DistributionModel;
use crate::task::TaskRequest;
use crate::topology::SiteId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadlineCalculator {
    pub completion_weight: f64,
    pub transfer_completion_weight: f64,
    pub delay_weight: f64,
    pub slack: f64,
}

impl From<&Config> for DeadlineCalculator {
    fn from(config: &Config) -> Self {
        Self {
            completion_weight: config.completion_weight,
            transfer_completion_weight: config.transfer_completion_weight,
            delay_weight: config.delay_weight,
            slack: config.deadline_slack,
        }
    }
}

impl Default for DeadlineCalculator {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl DeadlineCalculator {
    /// Round trip between the task's device and `site`.
    pub fn communication_delay(
        &self,
        task: &TaskRequest,
        site: SiteId,
        network: &dyn NetworkModel,
    ) -> f64 {
        let device = Endpoint::Device(task.device);
        let target = Endpoint::Site(site);
        network.upload_delay(device, target, task.input_size)
            + network.download_delay(target, device, task.output_size)
    }

    /// Round trip between two sites.
    pub fn site_delay(
        &self,
        task: &TaskRequest,
        from: SiteId,
        to: SiteId,
        network: &dyn NetworkModel,
    ) -> f64 {
        let source = Endpoint::Site(from);
        let target = Endpoint::Site(to);
        network.upload_delay(source, target, task.input_size)
            + network.download_delay(target, source, task.output_size)
    }

    /// Deadline for running `task` at `site`.
    pub fn deadline(
        &self,
        task: &TaskRequest,
        site: SiteId,
        model: &DistributionModel,
        num_sites: usize,
        network: &dyn NetworkModel,
    ) -> f64 {
        let average = model.average_completion(task.task_type, num_sites);
        let delay = self.communication_delay(task, site, network);
        self.combine(self.completion_weight, average, task.submission_time, delay)
    }

    /// Deadline for moving `task` from `source` to `target`, with the
    /// transfer weight in place of the primary completion weight.
    pub fn transfer_deadline(
        &self,
        task: &TaskRequest,
        source: SiteId,
        target: SiteId,
        model: &DistributionModel,
        num_sites: usize,
        network: &dyn NetworkModel,
    ) -> f64 {
        let average = model.average_completion(task.task_type, num_sites);
        let delay = self.site_delay(task, source, target, network);
        self.combine(self.transfer_completion_weight, average, task.submission_time, delay)
    }

    fn combine(&self, beta: f64, average: f64, submission: f64, delay: f64) -> f64 {
        beta * average + self.slack + submission + self.delay_weight * delay
    }
}
