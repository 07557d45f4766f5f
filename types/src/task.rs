//! Task instances: the per-job, deep-copied version of a [`crate::app::TaskTemplate`]
//! that actually flows through the five-queue state machine.

use crate::ids::{JobId, PeId, TaskId};

/// A task instance created by the Job Generator, deep-copying a template and
/// offsetting its `base_id` into a globally unique [`TaskId`].
///
/// Field-for-field grounded on `original_source/common.py`'s `Tasks` class.
#[derive(Debug, Clone)]
pub struct TaskInstance {
    /// Functionality name (copied from the template).
    pub name: String,
    /// Globally unique id: `base_id + offset_of_job`.
    pub id: TaskId,
    /// Dense index within the owning job's DAG.
    pub base_id: u32,
    /// Job this instance belongs to.
    pub job_id: JobId,
    /// Name of the application the owning job was instantiated from.
    pub job_name: String,
    /// Remaining unresolved predecessor task ids. Drained by the dependency
    /// resolver as each predecessor completes.
    pub predecessors: Vec<TaskId>,
    /// True if this is the DAG's source task.
    pub head: bool,
    /// True if this is the DAG's sink task.
    pub tail: bool,
    /// PE this task is assigned to, or [`PeId::UNASSIGNED`] until a scheduler runs.
    pub pe_id: PeId,
    /// Virtual time at which execution started, or -1 until set.
    pub start_time: i64,
    /// Virtual time at which execution finished, or -1 until set.
    pub finish_time: i64,
    /// Per-PE execution ordinal assigned by a list/table scheduler, or -1.
    pub order: i64,
    /// Virtual time at which this instance becomes eligible to leave its
    /// current queue (meaning depends on the queue: WaitReady/Executable).
    pub time_stamp: i64,
    /// Per-predecessor readiness deadlines accumulated in shared-memory mode.
    pub ready_wait_times: Vec<i64>,
    /// Per-predecessor execution-readiness deadlines (memory-to-PE read latency).
    pub execution_wait_times: Vec<i64>,
    /// Per-predecessor PE-to-PE readiness deadlines (direct mode).
    pub pe_to_pe_wait_time: Vec<i64>,
    /// Extra ordering constraints injected by a table-driven scheduler:
    /// task ids that must be in Completed before this task may run.
    pub dynamic_dependencies: Vec<TaskId>,
    /// Progress counter normalized to max-frequency equivalent runtime (µs).
    pub task_elapsed_time_max_freq: f64,
    /// Virtual time at which the owning job's head task started (job start time).
    pub job_start: i64,
    /// Input packet size in bits (copied from the template).
    pub input_packet_size: i64,
    /// Output packet size in bits (copied from the template).
    pub output_packet_size: i64,
}

impl TaskInstance {
    /// Deep-copy a template into an instance belonging to `job_id`, offsetting
    /// its id and its predecessors' ids by `task_id_offset`.
    #[must_use]
    pub fn from_template(
        template: &crate::app::TaskTemplate,
        job_id: JobId,
        job_name: &str,
        task_id_offset: u32,
    ) -> Self {
        let predecessors = template
            .predecessors
            .iter()
            .map(|&base| TaskId(base + task_id_offset))
            .collect();
        Self {
            name: template.name.clone(),
            id: TaskId(template.base_id + task_id_offset),
            base_id: template.base_id,
            job_id,
            job_name: job_name.to_string(),
            predecessors,
            head: template.head,
            tail: template.tail,
            pe_id: PeId::UNASSIGNED,
            start_time: -1,
            finish_time: -1,
            order: -1,
            time_stamp: -1,
            ready_wait_times: Vec::new(),
            execution_wait_times: Vec::new(),
            pe_to_pe_wait_time: Vec::new(),
            dynamic_dependencies: Vec::new(),
            task_elapsed_time_max_freq: 0.0,
            job_start: -1,
            input_packet_size: template.input_packet_size,
            output_packet_size: template.output_packet_size,
        }
    }

    /// Whether this task has been assigned a PE by a scheduler.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.pe_id.is_assigned()
    }

    /// Whether every `dynamic_dependencies` entry is present in `completed`.
    #[must_use]
    pub fn dynamic_dependencies_satisfied(&self, completed: &[TaskId]) -> bool {
        self.dynamic_dependencies.iter().all(|d| completed.contains(d))
    }
}
