//! Error type for the engine crate.

use thiserror::Error;

/// Errors raised while stepping or configuring a [`crate::simulation::Simulation`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A scheduler invocation failed (unknown scheduler, no eligible PE, ...).
    #[error(transparent)]
    Scheduler(#[from] soc_scheduler::SchedulerError),

    /// A DTPM evaluation failed (missing OPP, conflicting throttling modes, ...).
    #[error(transparent)]
    Dtpm(#[from] soc_dtpm::DtpmError),

    /// A trace sink write failed.
    #[error(transparent)]
    Trace(#[from] soc_trace::TraceError),

    /// `job_list` and the SoC descriptor's per-snippet counts disagree in
    /// length (spec.md §4.2's `run()` startup check).
    #[error("job_list has {job_list_len} entries but the current snippet expects {snippet_len}")]
    JobListLengthMismatch {
        /// Length of the configured `job_list`.
        job_list_len: usize,
        /// Length the current snippet's counter list expects.
        snippet_len: usize,
    },

    /// Neither `job_list` nor `job_probabilities` was configured, so the
    /// job generator has no selection rule to draw from.
    #[error("job generator has neither job_list nor job_probabilities configured")]
    NoSelectionRule,
}
