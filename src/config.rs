use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Site-selection policy used inside the edge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolicyKind {
    /// Always the nearest site.
    Baseline,
    /// Minimum expected completion time across all sites.
    Mect,
    /// Largest slack margin between deadline and expected completion.
    Certainty,
    /// The first urgent task pins a site for the rest of the run.
    EdgeCloud,
    /// Probability of meeting the deadline, with neighbour offloading.
    #[default]
    Probability,
}

impl PolicyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::Baseline => "baseline",
            PolicyKind::Mect => "mect",
            PolicyKind::Certainty => "certainty",
            PolicyKind::EdgeCloud => "edge-cloud",
            PolicyKind::Probability => "probability",
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(PolicyKind::Baseline),
            "mect" => Ok(PolicyKind::Mect),
            "certainty" => Ok(PolicyKind::Certainty),
            "edgecloud" | "edge-cloud" => Ok(PolicyKind::EdgeCloud),
            "probability" => Ok(PolicyKind::Probability),
            other => Err(Error::config(format!("unknown policy: {}", other))),
        }
    }
}

/// Grid adjacency rule used to enumerate neighbouring sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Adjacency {
    /// `|dx| == 1 || |dy| == 1`.
    #[default]
    Axis,
    /// Every cell at Chebyshev distance 1, diagonals included.
    Moore,
}

impl Adjacency {
    pub fn is_adjacent(&self, dx: i32, dy: i32) -> bool {
        let (dx, dy) = (dx.abs(), dy.abs());
        match self {
            Adjacency::Axis => dx == 1 || dy == 1,
            Adjacency::Moore => dx.max(dy) == 1,
        }
    }
}

/// Order in which the plain capacity scan visits a site's workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkerSelection {
    #[default]
    FirstFit,
    RoundRobin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: PolicyKind,
    pub adjacency: Adjacency,
    pub worker_selection: WorkerSelection,

    /// Tasks shorter than this go straight to the cloud.
    pub urgency_threshold: u64,
    pub deadline_slack: f64,
    /// β in the primary deadline formula.
    pub completion_weight: f64,
    /// β in the site-to-site transfer deadline.
    pub transfer_completion_weight: f64,
    /// α, weight of the round-trip communication delay.
    pub delay_weight: f64,
    pub confidence_z: f64,

    pub worker_queue_capacity: usize,
    pub pending_pool_capacity: usize,
    pub max_utilization: f64,

    pub record_trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: PolicyKind::default(),
            adjacency: Adjacency::default(),
            worker_selection: WorkerSelection::default(),
            urgency_threshold: 4000,
            deadline_slack: 0.0001,
            completion_weight: 1.0,
            transfer_completion_weight: 0.8,
            delay_weight: 1.0,
            confidence_z: 1.96,
            worker_queue_capacity: 8,
            pending_pool_capacity: 1024,
            max_utilization: 100.0,
            record_trace: false,
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.deadline_slack >= 0.0) {
            return Err(Error::config("deadline_slack must be >= 0"));
        }

        for (name, weight) in [
            ("completion_weight", self.completion_weight),
            ("transfer_completion_weight", self.transfer_completion_weight),
            ("delay_weight", self.delay_weight),
        ] {
            if !(weight >= 0.0) || !weight.is_finite() {
                return Err(Error::config(format!("{} must be a finite value >= 0", name)));
            }
        }

        if !(self.confidence_z > 0.0) {
            return Err(Error::config("confidence_z must be > 0"));
        }

        if self.worker_queue_capacity == 0 {
            return Err(Error::config("worker_queue_capacity must be > 0"));
        }

        if self.pending_pool_capacity == 0 {
            return Err(Error::config("pending_pool_capacity must be > 0"));
        }

        if !(self.max_utilization > 0.0 && self.max_utilization <= 100.0) {
            return Err(Error::config("max_utilization must be in (0, 100]"));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn policy(mut self, policy: PolicyKind) -> Self {
        self.config.policy = policy;
        self
    }

    pub fn adjacency(mut self, adjacency: Adjacency) -> Self {
        self.config.adjacency = adjacency;
        self
    }

    pub fn worker_selection(mut self, selection: WorkerSelection) -> Self {
        self.config.worker_selection = selection;
        self
    }

    pub fn urgency_threshold(mut self, length: u64) -> Self {
        self.config.urgency_threshold = length;
        self
    }

    pub fn deadline_slack(mut self, slack: f64) -> Self {
        self.config.deadline_slack = slack;
        self
    }

    pub fn completion_weight(mut self, beta: f64) -> Self {
        self.config.completion_weight = beta;
        self
    }

    pub fn transfer_completion_weight(mut self, beta: f64) -> Self {
        self.config.transfer_completion_weight = beta;
        self
    }

    pub fn delay_weight(mut self, alpha: f64) -> Self {
        self.config.delay_weight = alpha;
        self
    }

    pub fn confidence_z(mut self, z: f64) -> Self {
        self.config.confidence_z = z;
        self
    }

    pub fn worker_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.worker_queue_capacity = capacity;
        self
    }

    pub fn pending_pool_capacity(mut self, capacity: usize) -> Self {
        self.config.pending_pool_capacity = capacity;
        self
    }

    pub fn max_utilization(mut self, percent: f64) -> Self {
        self.config.max_utilization = percent;
        self
    }

    pub fn record_trace(mut self, enable: bool) -> Self {
        self.config.record_trace = enable;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
