use crate::topology::{SiteId, WorkerId};
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown site: {0}")]
    UnknownSite(SiteId),

    #[error("unknown worker {worker} at site {site}")]
    UnknownWorker { site: SiteId, worker: WorkerId },

    #[cfg(feature = "telemetry")]
    #[error("telemetry error: {0}")]
    Telemetry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    #[cfg(feature = "telemetry")]
    pub fn telemetry<S: Into<String>>(msg: S) -> Self {
        Error::Telemetry(msg.into())
    }
}

/// Task-level outcome that keeps a task from being admitted.
///
/// These are not failures of the scheduler: the caller records them against
/// the task and moves on without retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rejection {
    /// No worker at the chosen site has room for the task.
    CapacityExhausted,
    /// The network collaborator reported no usable bandwidth.
    BandwidthUnavailable,
    /// The soft-landing pending pool is already full.
    PendingPoolFull,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::CapacityExhausted => "capacity exhausted",
            Rejection::BandwidthUnavailable => "bandwidth unavailable",
            Rejection::PendingPoolFull => "pending pool full",
        };
        f.write_str(reason)
    }
}

impl Rejection {
    /// Turns a delay reported by the network model into a rejection when it
    /// signals unavailable bandwidth (`<= 0`).
    pub fn check_bandwidth(delay: f64) -> std::result::Result<f64, Rejection> {
        if delay > 0.0 {
            Ok(delay)
        } else {
            Err(Rejection::BandwidthUnavailable)
        }
    }
}
