//! Worker admission control.
//!
//! A worker admits a task when the predicted utilization of the task fits in
//! what is left of the worker's CPU budget. The controller also owns the
//! bounded per-worker queues and the pending pool used by the MECT policy.

use crate::config::{Config, WorkerSelection};
use crate::env::Environment;
use crate::error::Rejection;
use crate::model::DistributionModel;
use crate::task::{TaskId, TaskRequest};
use crate::topology::{Site, SiteId, Worker, WorkerId};
use std::collections::{HashMap, VecDeque};

/// Outcome of asking a site to take a task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Admitted { site: SiteId, worker: WorkerId },
    /// Parked on the pending pool; `pending` is the pool size after the push.
    Deferred { site: SiteId, pending: usize },
    Rejected(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }

    pub fn worker(&self) -> Option<WorkerId> {
        match self {
            Admission::Admitted { worker, .. } => Some(*worker),
            _ => None,
        }
    }
}

/// Whether the probability policy kept a task at its nearest site or
/// offloaded it to a neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteRole {
    Local,
    Remote,
}

#[derive(Debug)]
pub struct AdmissionController {
    selection: WorkerSelection,
    max_utilization: f64,
    queue_capacity: usize,
    pending_capacity: usize,
    // Last worker index chosen per site by the round-robin scan.
    cursors: HashMap<SiteId, usize>,
    queues: HashMap<(SiteId, WorkerId), VecDeque<TaskId>>,
    pending: VecDeque<TaskRequest>,
}

impl AdmissionController {
    pub fn new(config: &Config) -> Self {
        Self {
            selection: config.worker_selection,
            max_utilization: config.max_utilization,
            queue_capacity: config.worker_queue_capacity,
            pending_capacity: config.pending_pool_capacity,
            cursors: HashMap::new(),
            queues: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Capacity predicate: `required <= max_utilization - current`.
    pub fn fits(
        &self,
        task: &TaskRequest,
        site: SiteId,
        worker: &Worker,
        env: &Environment<'_>,
    ) -> bool {
        let required = env.predictor.predict_utilization(task.task_type, worker.category);
        let current = env.monitor.current_utilization(site, worker.id, env.now);
        let available = self.max_utilization - current;
        required <= available
    }

    /// Number of workers at `site` that could take `task` right now.
    pub fn available_workers(
        &self,
        task: &TaskRequest,
        site: &Site,
        env: &Environment<'_>,
    ) -> usize {
        site.workers
            .iter()
            .filter(|w| self.fits(task, site.id, w, env))
            .count()
    }

    pub fn first_fit(
        &self,
        task: &TaskRequest,
        site: &Site,
        env: &Environment<'_>,
    ) -> Option<WorkerId> {
        site.workers
            .iter()
            .find(|w| self.fits(task, site.id, w, env))
            .map(|w| w.id)
    }

    /// Starts one past the previous pick and tries every worker once.
    pub fn round_robin(
        &mut self,
        task: &TaskRequest,
        site: &Site,
        env: &Environment<'_>,
    ) -> Option<WorkerId> {
        let n = site.workers.len();
        if n == 0 {
            return None;
        }

        // usize::MAX wraps to 0 on the first advance.
        let mut cursor = self.cursors.get(&site.id).copied().unwrap_or(usize::MAX);
        let mut chosen = None;

        for _ in 0..n {
            cursor = cursor.wrapping_add(1) % n;
            let worker = &site.workers[cursor];
            if self.fits(task, site.id, worker, env) {
                chosen = Some(worker.id);
                break;
            }
        }

        self.cursors.insert(site.id, cursor);
        chosen
    }

    /// Plain capacity scan in the configured order.
    pub fn select(&mut self, task: &TaskRequest, site: &Site, env: &Environment<'_>) -> Admission {
        let worker = match self.selection {
            WorkerSelection::FirstFit => self.first_fit(task, site, env),
            WorkerSelection::RoundRobin => self.round_robin(task, site, env),
        };
        admitted_or_rejected(site.id, worker)
    }

    /// Worker choice after a probability decision.
    ///
    /// At the local site the configured round-robin scan replaces the
    /// preference pass; otherwise a worker qualifies when its processing-time
    /// probability reaches `reference` or its category matches the task's
    /// preference. At a remote site only the probability counts. Either way
    /// the plain scan is the fallback.
    pub fn select_probable(
        &mut self,
        task: &TaskRequest,
        site: &Site,
        role: SiteRole,
        reference: f64,
        model: &DistributionModel,
        env: &Environment<'_>,
    ) -> Admission {
        if role == SiteRole::Local && self.selection == WorkerSelection::RoundRobin {
            let worker = self.round_robin(task, site, env);
            return admitted_or_rejected(site.id, worker);
        }

        let preferred = site.workers.iter().find(|w| {
            let probability = model
                .processing(site.id, w.id, task.task_type)
                .probability(task.deadline);
            let matches_preference = role == SiteRole::Local && task.preference == w.category;
            (probability >= reference || matches_preference) && self.fits(task, site.id, w, env)
        });

        match preferred {
            Some(worker) => Admission::Admitted {
                site: site.id,
                worker: worker.id,
            },
            None => self.select(task, site, env),
        }
    }

    /// First fit among workers whose queue still has room. The task id is
    /// pushed onto the chosen worker's queue; with no such worker the task
    /// goes to the pending pool.
    pub fn select_queued(
        &mut self,
        task: &TaskRequest,
        site: &Site,
        env: &Environment<'_>,
    ) -> Admission {
        let chosen = site
            .workers
            .iter()
            .find(|w| {
                self.queue_depth(site.id, w.id) < self.queue_capacity
                    && self.fits(task, site.id, w, env)
            })
            .map(|w| w.id);

        if let Some(worker) = chosen {
            self.queues
                .entry((site.id, worker))
                .or_default()
                .push_back(task.id);
            return Admission::Admitted { site: site.id, worker };
        }

        if self.pending.len() >= self.pending_capacity {
            return Admission::Rejected(Rejection::PendingPoolFull);
        }

        self.pending.push_back(task.clone());
        Admission::Deferred {
            site: site.id,
            pending: self.pending.len(),
        }
    }

    pub fn queue_depth(&self, site: SiteId, worker: WorkerId) -> usize {
        self.queues.get(&(site, worker)).map_or(0, VecDeque::len)
    }

    /// Pops the oldest task id queued on a worker.
    pub fn release_queued(&mut self, site: SiteId, worker: WorkerId) -> Option<TaskId> {
        self.queues.get_mut(&(site, worker))?.pop_front()
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskRequest> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn drain_pending(&mut self) -> Vec<TaskRequest> {
        self.pending.drain(..).collect()
    }
}

fn admitted_or_rejected(site: SiteId, worker: Option<WorkerId>) -> Admission {
    match worker {
        Some(worker) => Admission::Admitted { site, worker },
        None => Admission::Rejected(Rejection::CapacityExhausted),
    }
}
