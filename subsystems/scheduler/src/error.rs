//! Error type for the scheduler crate.

use thiserror::Error;

/// Errors raised while assigning ready tasks to PEs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// Configuration named a scheduler kind this workspace does not implement.
    #[error("unknown scheduler `{name}`")]
    UnknownScheduler {
        /// The offending name, as given in configuration.
        name: String,
    },

    /// A ready task has no eligible PE (no PE in the SoC supports its functionality).
    #[error("task `{task_name}` (job {job_id}) has no PE supporting functionality `{task_name}`")]
    NoEligiblePe {
        /// Task functionality name.
        task_name: String,
        /// Owning job id, for diagnostics.
        job_id: u32,
    },

    /// A table-driven scheduler's table has no entry for the computed `task_sched_ID`.
    #[error("scheduling table has no entry for task_sched_ID {task_sched_id}")]
    TableEntryMissing {
        /// The dense index the scheduler looked up.
        task_sched_id: u32,
    },

    /// A table-driven scheduler's table named a PE that does not exist in the arena.
    #[error("scheduling table entry for task_sched_ID {task_sched_id} names unknown PE {pe_id}")]
    TablePeUnknown {
        /// The dense index the scheduler looked up.
        task_sched_id: u32,
        /// The offending PE index.
        pe_id: u32,
    },

    /// The CP oracle was invoked but this build carries no solver, and the
    /// request named a job with no pre-baked table entry (spec.md §9).
    #[error("CP oracle has no solver and no pre-baked table entry for job {job_id}")]
    CpOracleUnavailable {
        /// The job id the oracle was asked to schedule.
        job_id: u32,
    },
}
