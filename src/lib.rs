//! edge-offload - deadline-aware task placement for mobile-edge-cloud
//! simulation.
//!
//! For every task a mobile device submits, the scheduler decides whether it
//! runs in the cloud or at the edge, which edge site takes it, and which
//! worker (VM) at that site admits it. Edge decisions are driven by Gaussian
//! models of completion, transfer and processing times fitted to the
//! previous generation's observations.
//!
//! # Quick Start
//!
//! ```no_run
//! use edge_offload::prelude::*;
//! use edge_offload::env::fixed::{
//!     ConstantDelay, StaticMobility, StaticUtilization, TablePredictor,
//! };
//!
//! let topology = Topology::new(vec![
//!     Site::new(0, Location::new(0, 0), vec![Worker::new(0, WorkerCategory::Generic)]),
//!     Site::new(1, Location::new(1, 0), vec![Worker::new(0, WorkerCategory::Generic)]),
//! ]).unwrap();
//! let network = ConstantDelay::new(0.05, 0.05);
//! let mobility = StaticMobility::new();
//! let predictor = TablePredictor::uniform(20.0);
//! let monitor = StaticUtilization::new();
//! let env = Environment::new(&topology, &network, &mobility, &predictor, &monitor, 0.0);
//!
//! let mut scheduler = Scheduler::new(Config::default()).unwrap();
//! let mut factory = TaskFactory::new(42);
//! let mut task = factory.create(DeviceId(0), TaskType(0), 5000, 1024, 512, 0.0);
//!
//! let route = scheduler.route_task(&mut task, &env);
//! if let Some(site) = route.site {
//!     let admission = scheduler.select_worker(&mut task, site, &env).unwrap();
//!     println!("{:?}", admission);
//! }
//! ```
//!
//! # Features
//!
//! - **Five placement policies**: Baseline, MECT, Certainty, EdgeCloud and
//!   Probability
//! - **Neighbour offloading**: convolved completion/transfer distributions
//!   with confidence-interval tie breaking
//! - **Admission control**: first-fit or round-robin capacity scans, bounded
//!   worker queues and a pending pool
//! - **Telemetry**: decision histograms, JSON export and replayable traces
//!   (optional)

#![warn(missing_debug_implementations)]

pub mod config;
pub mod deadline;
pub mod env;
pub mod error;
pub mod locator;
pub mod model;
pub mod prelude;
pub mod scheduler;
pub mod task;
pub mod telemetry;
pub mod topology;

// Re-export key types at crate root
pub use config::{Adjacency, Config, ConfigBuilder, PolicyKind, WorkerSelection};
pub use error::{Error, Rejection, Result};
pub use scheduler::{Admission, Route, Scheduler, Tier};
