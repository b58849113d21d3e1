//! Task requests flowing through the scheduler.

use crate::topology::{SiteId, WorkerCategory, WorkerId};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

/// Default computation length below which a task is sent to the cloud.
pub const DEFAULT_URGENCY_THRESHOLD: u64 = 4000;

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

/// Identifier of the mobile device that generated a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub usize);

/// Application class of a task; indexes the distribution tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskType(pub u16);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    pub id: TaskId,
    pub device: DeviceId,
    pub task_type: TaskType,
    /// Computation length in instructions.
    pub length: u64,
    pub input_size: u64,
    pub output_size: u64,
    pub submission_time: f64,
    pub preference: WorkerCategory,

    /// Absolute deadline committed by the last placement decision.
    pub deadline: f64,
    /// Nearest site when the task was routed.
    pub received_site: Option<SiteId>,
    pub assigned_site: Option<SiteId>,
    pub assigned_worker: Option<WorkerId>,
}

impl TaskRequest {
    pub fn new(
        id: TaskId,
        device: DeviceId,
        task_type: TaskType,
        length: u64,
        submission_time: f64,
    ) -> Self {
        Self {
            id,
            device,
            task_type,
            length,
            input_size: 0,
            output_size: 0,
            submission_time,
            preference: WorkerCategory::default(),
            deadline: 0.0,
            received_site: None,
            assigned_site: None,
            assigned_worker: None,
        }
    }

    pub fn with_payload(mut self, input_size: u64, output_size: u64) -> Self {
        self.input_size = input_size;
        self.output_size = output_size;
        self
    }

    pub fn with_preference(mut self, preference: WorkerCategory) -> Self {
        self.preference = preference;
        self
    }

    /// Urgent tasks are eligible for edge placement; the rest go to the cloud.
    pub fn is_urgent(&self, threshold: u64) -> bool {
        self.length >= threshold
    }

    /// Deadline budget left after submission.
    pub fn budget(&self) -> f64 {
        self.deadline - self.submission_time
    }
}

/// Creates tasks with sequential ids and a random category preference.
#[derive(Debug)]
pub struct TaskFactory {
    rng: Pcg64,
    next_id: u64,
}

impl TaskFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn create(
        &mut self,
        device: DeviceId,
        task_type: TaskType,
        length: u64,
        input_size: u64,
        output_size: u64,
        submission_time: f64,
    ) -> TaskRequest {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let preference = WorkerCategory::ALL[self.rng.gen_range(0..WorkerCategory::ALL.len())];

        TaskRequest::new(id, device, task_type, length, submission_time)
            .with_payload(input_size, output_size)
            .with_preference(preference)
    }
}
