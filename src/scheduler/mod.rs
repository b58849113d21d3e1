//! Placement decision engine.
//!
//! A [`Scheduler`] is created once per simulation run and driven
//! synchronously by the event layer:
//!
//! 1. [`Scheduler::select_tier`] splits urgent tasks (edge) from the rest
//!    (cloud), resolving the nearest site and its deadline on the way.
//! 2. [`Scheduler::select_site`] runs the configured [`Policy`].
//! 3. [`Scheduler::select_worker`] runs admission control at that site.
//!
//! [`Scheduler::route_task`] chains the first two steps. Between generations
//! the caller hands the completed-task samples to
//! [`Scheduler::next_generation`].

pub mod admission;
pub mod baseline;
pub mod certainty;
pub mod edge_cloud;
pub mod mect;
pub mod probability;

pub use admission::{Admission, AdmissionController, SiteRole};
pub use baseline::Baseline;
pub use certainty::Certainty;
pub use edge_cloud::EdgeCloud;
pub use mect::Mect;
pub use probability::ProbabilityPolicy;

use crate::config::{Config, PolicyKind};
use crate::deadline::DeadlineCalculator;
use crate::env::Environment;
use crate::error::{Rejection, Result};
use crate::locator::SiteLocator;
use crate::model::{CompletionSample, DistributionModel};
use crate::task::{TaskId, TaskRequest};
use crate::telemetry::{DecisionMetrics, DecisionTrace, MetricsSnapshot, TraceEvent};
use crate::topology::{SiteId, WorkerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Execution tier for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Cloud,
    Edge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub tier: Tier,
    /// Chosen edge site; always `None` for the cloud tier.
    pub site: Option<SiteId>,
}

impl Route {
    pub fn cloud() -> Self {
        Self {
            tier: Tier::Cloud,
            site: None,
        }
    }

    pub fn edge(site: SiteId) -> Self {
        Self {
            tier: Tier::Edge,
            site: Some(site),
        }
    }
}

/// Reporting counters. Reset at every generation boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub urgent: u64,
    pub non_urgent: u64,
    /// Urgent tasks placed away from their nearest site.
    pub redirected: u64,
    pub admitted: u64,
    pub deferred: u64,
    pub rejected_capacity: u64,
    pub bandwidth_failures: u64,
    pub deadline_misses: u64,
}

/// Site chosen by a policy, plus what the scheduler should commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteDecision {
    pub site: SiteId,
    /// Deadline to commit onto the task; `None` keeps the routing deadline.
    pub deadline: Option<f64>,
    /// Probability the chosen site was judged by, if the policy computes one.
    pub probability: Option<f64>,
    pub redirected: bool,
}

impl SiteDecision {
    pub fn new(site: SiteId) -> Self {
        Self {
            site,
            deadline: None,
            probability: None,
            redirected: false,
        }
    }

    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = Some(probability);
        self
    }

    /// Marks the decision as a redirect when it moves away from `nearest`.
    pub fn redirected_from(mut self, nearest: SiteId) -> Self {
        self.redirected = self.site != nearest;
        self
    }
}

/// Read-only view handed to a policy for one decision.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub env: Environment<'a>,
    pub model: &'a DistributionModel,
    pub calculator: &'a DeadlineCalculator,
    pub locator: &'a SiteLocator,
    pub admission: &'a AdmissionController,
    pub confidence_z: f64,
    /// Nearest site of the task being placed.
    pub nearest: SiteId,
}

impl PlacementContext<'_> {
    /// Primary deadline for running `task` at `site`.
    pub fn deadline(&self, task: &TaskRequest, site: SiteId) -> f64 {
        self.calculator.deadline(
            task,
            site,
            self.model,
            self.env.topology.num_sites(),
            self.env.network,
        )
    }
}

/// Common capability of the edge site-selection policies.
pub trait SiteSelector {
    fn name(&self) -> &'static str;

    /// `None` means no site could be chosen.
    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision>;
}

/// Site-selection policy, fixed when the scheduler is built.
#[derive(Debug, Clone)]
pub enum Policy {
    Baseline(Baseline),
    Mect(Mect),
    Certainty(Certainty),
    EdgeCloud(EdgeCloud),
    Probability(ProbabilityPolicy),
}

impl Policy {
    pub fn new(kind: PolicyKind) -> Self {
        match kind {
            PolicyKind::Baseline => Policy::Baseline(Baseline),
            PolicyKind::Mect => Policy::Mect(Mect),
            PolicyKind::Certainty => Policy::Certainty(Certainty),
            PolicyKind::EdgeCloud => Policy::EdgeCloud(EdgeCloud::new()),
            PolicyKind::Probability => Policy::Probability(ProbabilityPolicy),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Baseline(_) => PolicyKind::Baseline,
            Policy::Mect(_) => PolicyKind::Mect,
            Policy::Certainty(_) => PolicyKind::Certainty,
            Policy::EdgeCloud(_) => PolicyKind::EdgeCloud,
            Policy::Probability(_) => PolicyKind::Probability,
        }
    }
}

impl SiteSelector for Policy {
    fn name(&self) -> &'static str {
        match self {
            Policy::Baseline(p) => p.name(),
            Policy::Mect(p) => p.name(),
            Policy::Certainty(p) => p.name(),
            Policy::EdgeCloud(p) => p.name(),
            Policy::Probability(p) => p.name(),
        }
    }

    fn select_site(
        &mut self,
        task: &TaskRequest,
        ctx: &PlacementContext<'_>,
    ) -> Option<SiteDecision> {
        match self {
            Policy::Baseline(p) => p.select_site(task, ctx),
            Policy::Mect(p) => p.select_site(task, ctx),
            Policy::Certainty(p) => p.select_site(task, ctx),
            Policy::EdgeCloud(p) => p.select_site(task, ctx),
            Policy::Probability(p) => p.select_site(task, ctx),
        }
    }
}

#[derive(Debug)]
pub struct Scheduler {
    config: Config,
    calculator: DeadlineCalculator,
    locator: SiteLocator,
    model: DistributionModel,
    policy: Policy,
    admission: AdmissionController,
    counters: Counters,
    metrics: DecisionMetrics,
    trace: Option<DecisionTrace>,
    // Reference probability of the last site decision, for worker selection.
    last_probability: Option<(TaskId, f64, SiteRole)>,
}

impl Scheduler {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        info!(
            policy = config.policy.name(),
            adjacency = ?config.adjacency,
            selection = ?config.worker_selection,
            "scheduler created"
        );

        Ok(Self {
            calculator: DeadlineCalculator::from(&config),
            locator: SiteLocator::new(config.adjacency),
            model: DistributionModel::new(),
            policy: Policy::new(config.policy),
            admission: AdmissionController::new(&config),
            counters: Counters::default(),
            metrics: DecisionMetrics::new(),
            trace: config.record_trace.then(DecisionTrace::new),
            last_probability: None,
            config,
        })
    }

    /// Scheduler seeded with an existing model.
    pub fn with_model(config: Config, model: DistributionModel) -> Result<Self> {
        let mut scheduler = Self::new(config)?;
        scheduler.model = model;
        Ok(scheduler)
    }

    /// Decides the tier. Urgent tasks also get their nearest site recorded
    /// as `received_site` and the deadline at that site committed.
    pub fn select_tier(&mut self, task: &mut TaskRequest, env: &Environment<'_>) -> Tier {
        if !task.is_urgent(self.config.urgency_threshold) {
            self.counters.non_urgent += 1;
            trace!(task = task.id.0, length = task.length, "routed to cloud");
            self.record(TraceEvent::Routed {
                task_id: task.id,
                tier: Tier::Cloud,
                nearest: None,
                deadline: task.deadline,
            });
            return Tier::Cloud;
        }

        self.counters.urgent += 1;

        let nearest = self
            .locator
            .nearest(task.device, env.now, env.topology, env.mobility);
        task.received_site = nearest;

        if let Some(site) = nearest {
            task.deadline = self.calculator.deadline(
                task,
                site,
                &self.model,
                env.topology.num_sites(),
                env.network,
            );
        }

        trace!(task = task.id.0, nearest = ?nearest, deadline = task.deadline, "routed to edge");
        self.record(TraceEvent::Routed {
            task_id: task.id,
            tier: Tier::Edge,
            nearest,
            deadline: task.deadline,
        });
        Tier::Edge
    }

    /// Runs the configured policy for an edge-tier task and commits its
    /// deadline and site onto the task. `None` when the task has no nearest
    /// site or the policy found nothing.
    pub fn select_site(
        &mut self,
        task: &mut TaskRequest,
        env: &Environment<'_>,
    ) -> Option<SiteDecision> {
        let nearest = task.received_site?;

        let ctx = PlacementContext {
            env: *env,
            model: &self.model,
            calculator: &self.calculator,
            locator: &self.locator,
            admission: &self.admission,
            confidence_z: self.config.confidence_z,
            nearest,
        };
        let decision = self.policy.select_site(task, &ctx)?;

        if let Some(deadline) = decision.deadline {
            task.deadline = deadline;
        }
        task.assigned_site = Some(decision.site);

        if decision.redirected {
            self.counters.redirected += 1;
        }

        self.metrics.record_budget(task.budget());
        if let Some(p) = decision.probability {
            self.metrics.record_probability(p);
            let role = if decision.redirected {
                SiteRole::Remote
            } else {
                SiteRole::Local
            };
            self.last_probability = Some((task.id, p, role));
        }

        debug!(
            task = task.id.0,
            policy = self.policy.name(),
            site = decision.site.0,
            redirected = decision.redirected,
            deadline = task.deadline,
            "site selected"
        );
        self.record(TraceEvent::SiteSelected {
            task_id: task.id,
            site: decision.site,
            redirected: decision.redirected,
            probability: decision.probability,
        });

        Some(decision)
    }

    /// Tier routing followed by site selection. A task with no usable edge
    /// site falls back to the cloud tier.
    pub fn route_task(&mut self, task: &mut TaskRequest, env: &Environment<'_>) -> Route {
        match self.select_tier(task, env) {
            Tier::Cloud => Route::cloud(),
            Tier::Edge => match self.select_site(task, env) {
                Some(decision) => Route::edge(decision.site),
                None => {
                    debug!(task = task.id.0, "no edge site, falling back to cloud");
                    Route::cloud()
                }
            },
        }
    }

    /// Admission control at `site`.
    ///
    /// An unknown site id is an error; running out of capacity is an
    /// [`Admission::Rejected`] outcome.
    pub fn select_worker(
        &mut self,
        task: &mut TaskRequest,
        site: SiteId,
        env: &Environment<'_>,
    ) -> Result<Admission> {
        let target = env.topology.require_site(site)?;

        let admission = match self.policy.kind() {
            PolicyKind::Mect => self.admission.select_queued(task, target, env),
            PolicyKind::Probability => {
                let (reference, role) = match self.last_probability {
                    Some((id, p, role)) if id == task.id => (p, role),
                    _ => {
                        let local = self.model.completion(site, task.task_type);
                        (local.probability(task.deadline), SiteRole::Local)
                    }
                };
                self.admission
                    .select_probable(task, target, role, reference, &self.model, env)
            }
            _ => self.admission.select(task, target, env),
        };

        self.note_admission(task, Some(site), admission);
        Ok(admission)
    }

    /// First fit across the cloud sites. Admitted cloud sites carry ids
    /// past the edge range, see [`crate::topology::Topology::with_cloud`].
    pub fn select_cloud_worker(
        &mut self,
        task: &mut TaskRequest,
        env: &Environment<'_>,
    ) -> Admission {
        let admission = env
            .topology
            .cloud()
            .iter()
            .find_map(|site| {
                self.admission
                    .first_fit(task, site, env)
                    .map(|worker| Admission::Admitted { site: site.id, worker })
            })
            .unwrap_or(Admission::Rejected(Rejection::CapacityExhausted));

        self.note_admission(task, None, admission);
        admission
    }

    fn note_admission(
        &mut self,
        task: &mut TaskRequest,
        site: Option<SiteId>,
        admission: Admission,
    ) {
        match admission {
            Admission::Admitted { site, worker } => {
                self.counters.admitted += 1;
                task.assigned_site = Some(site);
                task.assigned_worker = Some(worker);
                trace!(task = task.id.0, site = site.0, worker = worker.0, "admitted");
                self.record(TraceEvent::Admitted {
                    task_id: task.id,
                    site,
                    worker,
                });
            }
            Admission::Deferred { site, pending } => {
                self.counters.deferred += 1;
                debug!(
                    task = task.id.0,
                    site = site.0,
                    pending,
                    "worker queues full, task deferred"
                );
                self.record(TraceEvent::Deferred {
                    task_id: task.id,
                    site,
                    pending,
                });
            }
            Admission::Rejected(reason) => {
                if reason == Rejection::CapacityExhausted {
                    self.counters.rejected_capacity += 1;
                }
                debug!(task = task.id.0, site = ?site, %reason, "task rejected");
                self.record(TraceEvent::Rejected {
                    task_id: task.id,
                    site,
                    reason,
                });
            }
        }
    }

    /// Records a bandwidth failure reported by the network layer.
    pub fn record_bandwidth_failure(&mut self, task: &TaskRequest) {
        self.counters.bandwidth_failures += 1;
        debug!(task = task.id.0, "bandwidth unavailable");
        self.record(TraceEvent::Rejected {
            task_id: task.id,
            site: task.assigned_site,
            reason: Rejection::BandwidthUnavailable,
        });
    }

    /// Records a finished task. Returns `true` when it missed its deadline.
    pub fn record_outcome(&mut self, task: &TaskRequest, finish_time: f64) -> bool {
        let missed = finish_time > task.deadline;
        if missed {
            self.counters.deadline_misses += 1;
            trace!(task = task.id.0, finish_time, deadline = task.deadline, "deadline missed");
        }
        missed
    }

    /// Replaces every distribution table with one built from `samples`.
    ///
    /// Must not run while decisions for the current generation are still
    /// being made.
    pub fn rebuild_models(&mut self, samples: &[CompletionSample]) {
        self.model = DistributionModel::build(samples);
        self.last_probability = None;
        info!(
            samples = samples.len(),
            etc = self.model.etc().len(),
            ett = self.model.ett().len(),
            ptc = self.model.ptc().len(),
            "distribution models rebuilt"
        );
    }

    /// Generation boundary: rebuild the models and reset the counters.
    pub fn next_generation(&mut self, samples: &[CompletionSample]) {
        self.rebuild_models(samples);
        self.reset_counters();
    }

    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
        self.metrics.reset();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn model(&self) -> &DistributionModel {
        &self.model
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn calculator(&self) -> &DeadlineCalculator {
        &self.calculator
    }

    pub fn locator(&self) -> &SiteLocator {
        &self.locator
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &TaskRequest> {
        self.admission.pending_tasks()
    }

    pub fn drain_pending(&mut self) -> Vec<TaskRequest> {
        self.admission.drain_pending()
    }

    /// Pops the oldest task queued on a worker once it finishes one.
    pub fn release_queued(
        &mut self,
        site: SiteId,
        worker: WorkerId,
        env: &Environment<'_>,
    ) -> Result<Option<TaskId>> {
        env.topology.require_worker(site, worker)?;
        Ok(self.admission.release_queued(site, worker))
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.counters)
    }

    pub fn trace(&self) -> Option<&DecisionTrace> {
        self.trace.as_ref()
    }

    fn record(&mut self, event: TraceEvent) {
        if let Some(trace) = self.trace.as_mut() {
            trace.record(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Adjacency, WorkerSelection};
    use crate::error::Error;
    use crate::env::fixed::{
        ConstantDelay, SiteDelays, StaticMobility, StaticUtilization, TablePredictor,
    };
    use crate::model::{EtcKey, Gaussian, ModelTable};
    use crate::task::{DeviceId, TaskType};
    use crate::topology::{Location, Site, Topology, Worker, WorkerCategory};

    struct Fixture {
        topology: Topology,
        network: SiteDelays,
        mobility: StaticMobility,
        predictor: TablePredictor,
        monitor: StaticUtilization,
    }

    impl Fixture {
        fn new(points: &[(i32, i32)]) -> Self {
            let sites = points
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    Site::new(
                        i,
                        Location::new(x, y),
                        vec![
                            Worker::new(0, WorkerCategory::CpuIntensive),
                            Worker::new(1, WorkerCategory::Generic),
                        ],
                    )
                })
                .collect();
            let cloud = vec![Site::new(
                points.len(),
                Location::new(100, 100),
                vec![Worker::new(0, WorkerCategory::Generic)],
            )];

            Self {
                topology: Topology::new(sites).unwrap().with_cloud(cloud).unwrap(),
                network: SiteDelays::new(0.1, 0.1),
                mobility: StaticMobility::new().with_device(DeviceId(0), Location::new(0, 0)),
                predictor: TablePredictor::uniform(20.0),
                monitor: StaticUtilization::new(),
            }
        }

        fn env(&self) -> Environment<'_> {
            Environment::new(
                &self.topology,
                &self.network,
                &self.mobility,
                &self.predictor,
                &self.monitor,
                0.0,
            )
        }
    }

    fn etc_model(entries: &[(usize, f64, f64)]) -> DistributionModel {
        let etc: ModelTable<EtcKey> = entries
            .iter()
            .map(|&(site, mean, stdev)| {
                ((SiteId(site), TaskType(0)), Gaussian::new(mean, stdev, 10))
            })
            .collect();
        DistributionModel::from_tables(etc, ModelTable::new(), ModelTable::new(), 30)
    }

    fn scheduler(policy: PolicyKind, model: DistributionModel) -> Scheduler {
        let config = Config::builder()
            .policy(policy)
            .record_trace(true)
            .build()
            .unwrap();
        Scheduler::with_model(config, model).unwrap()
    }

    fn urgent(id: u64) -> TaskRequest {
        TaskRequest::new(TaskId(id), DeviceId(0), TaskType(0), 5000, 0.0).with_payload(10, 10)
    }

    #[test]
    fn test_non_urgent_goes_to_cloud_for_every_policy() {
        let fx = Fixture::new(&[(0, 0), (1, 0)]);
        for kind in [
            PolicyKind::Baseline,
            PolicyKind::Mect,
            PolicyKind::Certainty,
            PolicyKind::EdgeCloud,
            PolicyKind::Probability,
        ] {
            let mut s = scheduler(kind, etc_model(&[(0, 10.0, 2.0)]));
            let mut task = TaskRequest::new(TaskId(1), DeviceId(0), TaskType(0), 3999, 0.0);

            assert_eq!(s.route_task(&mut task, &fx.env()), Route::cloud());
            assert_eq!(task.received_site, None);
            assert_eq!(s.counters().non_urgent, 1);
            assert_eq!(s.counters().urgent, 0);
        }
    }

    #[test]
    fn test_select_tier_commits_nearest_deadline() {
        let fx = Fixture::new(&[(0, 0), (1, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 10.0, 2.0), (1, 8.0, 2.0)]));
        let mut task = urgent(1);

        assert_eq!(s.select_tier(&mut task, &fx.env()), Tier::Edge);
        assert_eq!(task.received_site, Some(SiteId(0)));
        // avg 9 + slack + comm 0.2
        assert!((task.deadline - (9.0 + 0.0001 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_keeps_nearest() {
        let fx = Fixture::new(&[(0, 0), (1, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 100.0, 2.0), (1, 1.0, 2.0)]));
        let mut task = urgent(1);

        assert_eq!(s.route_task(&mut task, &fx.env()), Route::edge(SiteId(0)));
        assert_eq!(s.counters().redirected, 0);
    }

    #[test]
    fn test_mect_picks_fastest_site_and_shortens_deadline() {
        let fx = Fixture::new(&[(0, 0), (1, 0), (5, 5)]);
        let model = etc_model(&[(0, 10.0, 2.0), (1, 8.0, 2.0), (2, 50.0, 10.0)]);
        let mut s = scheduler(PolicyKind::Mect, model);
        let mut task = urgent(1);

        s.select_tier(&mut task, &fx.env());
        let routed = task.deadline;
        let decision = s.select_site(&mut task, &fx.env()).unwrap();

        assert_eq!(decision.site, SiteId(1));
        assert!(decision.redirected);
        assert!((task.deadline - (routed - 0.2)).abs() < 1e-9);
        assert_eq!(s.counters().redirected, 1);
    }

    #[test]
    fn test_certainty_prefers_widest_margin() {
        let fx = Fixture::new(&[(0, 0), (1, 0), (5, 5)]);
        let model = etc_model(&[(0, 10.0, 2.0), (1, 8.0, 2.0), (2, 50.0, 10.0)]);
        let mut s = scheduler(PolicyKind::Certainty, model);
        let mut task = urgent(1);

        assert_eq!(s.route_task(&mut task, &fx.env()), Route::edge(SiteId(1)));
    }

    #[test]
    fn test_certainty_tie_keeps_first() {
        let fx = Fixture::new(&[(0, 0), (1, 0)]);
        let mut s = scheduler(PolicyKind::Certainty, etc_model(&[(0, 8.0, 2.0), (1, 8.0, 2.0)]));
        let mut task = urgent(1);

        assert_eq!(s.route_task(&mut task, &fx.env()), Route::edge(SiteId(0)));
    }

    #[test]
    fn test_edge_cloud_pins_first_site() {
        let mut fx = Fixture::new(&[(0, 0), (5, 5)]);
        let mut s = scheduler(PolicyKind::EdgeCloud, etc_model(&[(0, 10.0, 2.0)]));

        let mut first = urgent(1);
        assert_eq!(s.route_task(&mut first, &fx.env()), Route::edge(SiteId(0)));

        fx.mobility = StaticMobility::new().with_device(DeviceId(0), Location::new(5, 5));
        let mut second = urgent(2);
        assert_eq!(s.route_task(&mut second, &fx.env()), Route::edge(SiteId(0)));
        assert_eq!(second.received_site, Some(SiteId(1)));

        // The pin survives a generation boundary.
        s.next_generation(&[]);
        let mut third = urgent(3);
        assert_eq!(s.route_task(&mut third, &fx.env()), Route::edge(SiteId(0)));
    }

    #[test]
    fn test_probability_local_when_neighbours_worse() {
        let fx = Fixture::new(&[(0, 0), (1, 0), (5, 5)]);
        let model = etc_model(&[(0, 5.0, 1.0), (1, 8.0, 2.0), (2, 50.0, 10.0)]);
        let mut s = scheduler(PolicyKind::Probability, model);
        let mut task = urgent(1);

        let route = s.route_task(&mut task, &fx.env());
        assert_eq!(route, Route::edge(SiteId(0)));
        assert_eq!(s.counters().redirected, 0);
    }

    #[test]
    fn test_probability_offloads_to_better_neighbour() {
        let fx = Fixture::new(&[(0, 0), (1, 0), (5, 5)]);
        let model = etc_model(&[(0, 30.0, 2.0), (1, 8.0, 2.0), (2, 50.0, 10.0)]);
        let mut s = scheduler(PolicyKind::Probability, model);
        let mut task = urgent(1);

        let route = s.route_task(&mut task, &fx.env());
        assert_eq!(route, Route::edge(SiteId(1)));
        assert_eq!(task.received_site, Some(SiteId(0)));
        assert_eq!(task.assigned_site, Some(SiteId(1)));
        assert_eq!(s.counters().redirected, 1);
    }

    #[test]
    fn test_probability_respects_adjacency_rule() {
        // (1,3) is an axis neighbour of (0,0) but not a Moore neighbour.
        let fx = Fixture::new(&[(0, 0), (1, 3)]);
        let model = etc_model(&[(0, 30.0, 2.0), (1, 1.0, 0.5)]);

        for (adjacency, expected) in [(Adjacency::Axis, SiteId(1)), (Adjacency::Moore, SiteId(0))] {
            let config = Config::builder().adjacency(adjacency).build().unwrap();
            let mut s = Scheduler::with_model(config, model.clone()).unwrap();

            let mut task = urgent(1);
            assert_eq!(s.route_task(&mut task, &fx.env()), Route::edge(expected));
        }
    }

    #[test]
    fn test_select_worker_capacity_rejection() {
        let fx = Fixture::new(&[(0, 0)]);
        fx.monitor.set(SiteId(0), WorkerId(0), 90.0);
        fx.monitor.set(SiteId(0), WorkerId(1), 85.0);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 10.0, 2.0)]));
        let mut task = urgent(1);

        let route = s.route_task(&mut task, &fx.env());
        let admission = s.select_worker(&mut task, route.site.unwrap(), &fx.env()).unwrap();

        assert_eq!(admission, Admission::Rejected(Rejection::CapacityExhausted));
        assert_eq!(s.counters().rejected_capacity, 1);
        assert_eq!(task.assigned_worker, None);
    }

    #[test]
    fn test_select_worker_unknown_site_is_error() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, DistributionModel::new());
        let mut task = urgent(1);

        assert!(s.select_worker(&mut task, SiteId(9), &fx.env()).is_err());
    }

    #[test]
    fn test_select_cloud_worker() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, DistributionModel::new());
        let mut task = TaskRequest::new(TaskId(1), DeviceId(0), TaskType(0), 100, 0.0);

        let admission = s.select_cloud_worker(&mut task, &fx.env());
        assert_eq!(admission, Admission::Admitted { site: SiteId(1), worker: WorkerId(0) });

        fx.monitor.set(SiteId(1), WorkerId(0), 99.0);
        let admission = s.select_cloud_worker(&mut task, &fx.env());
        assert_eq!(admission, Admission::Rejected(Rejection::CapacityExhausted));
    }

    #[test]
    fn test_cloud_and_edge_admissions_are_distinct() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 10.0, 2.0)]));

        let mut edge_task = urgent(1);
        let site = s.route_task(&mut edge_task, &fx.env()).site.unwrap();
        s.select_worker(&mut edge_task, site, &fx.env()).unwrap();

        let mut cloud_task = TaskRequest::new(TaskId(2), DeviceId(0), TaskType(0), 100, 0.0);
        s.route_task(&mut cloud_task, &fx.env());
        s.select_cloud_worker(&mut cloud_task, &fx.env());

        assert_eq!(edge_task.assigned_site, Some(SiteId(0)));
        assert_eq!(cloud_task.assigned_site, Some(SiteId(1)));
        assert!(!fx.topology.is_cloud(SiteId(0)));
        assert!(fx.topology.is_cloud(SiteId(1)));

        // A cloud id is not an edge site.
        assert!(matches!(
            s.select_worker(&mut cloud_task, SiteId(1), &fx.env()),
            Err(Error::UnknownSite(SiteId(1)))
        ));
    }

    #[test]
    fn test_release_queued_checks_worker() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Mect, etc_model(&[(0, 10.0, 2.0)]));
        let mut task = urgent(1);

        let site = s.route_task(&mut task, &fx.env()).site.unwrap();
        s.select_worker(&mut task, site, &fx.env()).unwrap();

        assert_eq!(s.release_queued(SiteId(0), WorkerId(0), &fx.env()).unwrap(), Some(TaskId(1)));
        assert_eq!(s.release_queued(SiteId(0), WorkerId(1), &fx.env()).unwrap(), None);
        assert!(matches!(
            s.release_queued(SiteId(0), WorkerId(5), &fx.env()),
            Err(Error::UnknownWorker { site: SiteId(0), worker: WorkerId(5) })
        ));
    }

    #[test]
    fn test_probability_local_site_rotates_workers() {
        let mut fx = Fixture::new(&[(0, 0)]);
        fx.topology = Topology::new(vec![Site::new(
            0,
            Location::new(0, 0),
            vec![
                Worker::new(0, WorkerCategory::CpuIntensive),
                Worker::new(1, WorkerCategory::MemoryIntensive),
                Worker::new(2, WorkerCategory::Generic),
            ],
        )])
        .unwrap();
        let config = Config::builder()
            .policy(PolicyKind::Probability)
            .worker_selection(WorkerSelection::RoundRobin)
            .build()
            .unwrap();
        let mut s = Scheduler::with_model(config, etc_model(&[(0, 10.0, 2.0)])).unwrap();

        let picks: Vec<_> = (0..3)
            .map(|id| {
                let mut task = urgent(id);
                let site = s.route_task(&mut task, &fx.env()).site.unwrap();
                s.select_worker(&mut task, site, &fx.env()).unwrap().worker()
            })
            .collect();

        assert_eq!(picks, vec![Some(WorkerId(0)), Some(WorkerId(1)), Some(WorkerId(2))]);
        assert_eq!(s.counters().redirected, 0);
    }

    #[test]
    fn test_empty_topology_falls_back_to_cloud() {
        let topology = Topology::default();
        let network = ConstantDelay::new(0.1, 0.1);
        let mobility = StaticMobility::new();
        let predictor = TablePredictor::uniform(10.0);
        let monitor = StaticUtilization::new();
        let env = Environment::new(&topology, &network, &mobility, &predictor, &monitor, 0.0);

        let mut s = scheduler(PolicyKind::Probability, DistributionModel::new());
        let mut task = urgent(1);
        assert_eq!(s.route_task(&mut task, &env), Route::cloud());
        assert_eq!(s.counters().urgent, 1);
    }

    #[test]
    fn test_record_outcome_and_generation_reset() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 10.0, 2.0)]));
        let mut task = urgent(1);
        s.route_task(&mut task, &fx.env());

        assert!(!s.record_outcome(&task, task.deadline));
        assert!(s.record_outcome(&task, task.deadline + 1.0));
        s.record_bandwidth_failure(&task);
        assert_eq!(s.counters().deadline_misses, 1);
        assert_eq!(s.counters().bandwidth_failures, 1);

        s.next_generation(&[]);
        assert_eq!(s.counters(), Counters::default());
        assert_eq!(s.model().sample_count(), 0);
    }

    #[test]
    fn test_trace_records_decisions() {
        let fx = Fixture::new(&[(0, 0)]);
        let mut s = scheduler(PolicyKind::Baseline, etc_model(&[(0, 10.0, 2.0)]));
        let mut task = urgent(7);

        let route = s.route_task(&mut task, &fx.env());
        s.select_worker(&mut task, route.site.unwrap(), &fx.env()).unwrap();

        let events = s.trace().unwrap().events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TraceEvent::Routed { tier: Tier::Edge, .. }));
        assert!(matches!(events[2], TraceEvent::Admitted { worker: WorkerId(0), .. }));
        assert!(events.iter().all(|e| e.task_id() == TaskId(7)));
    }
}
