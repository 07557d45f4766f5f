//! Constraint-programming oracle boundary (spec.md §4.4.4).
//!
//! The solve itself is out of scope (spec.md §1, §9: "may ship without a
//! solver by accepting only pre-baked tables"). This module only types the
//! request/response shape the oracle would receive/produce, grounded
//! field-for-field on `original_source/CP_models.py`'s `Dags_2[jobID]`
//! construction, plus a fallback [`Scheduler`] impl that looks up a
//! pre-baked table per job and fails loudly when no table entry exists.

use crate::error::SchedulerError;
use crate::table::TableEntry;
use crate::traits::{AssignCtx, Scheduler};
use soc_types::JobId;
use std::collections::HashMap;

/// One `(PE name, task base_ID, performance)` eligibility triple, excluding
/// MEM and cache PEs (`CP_models.py` builds these per task per eligible PE).
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityTriple {
    /// PE name (not a dense id — the oracle is an external process).
    pub pe_name: String,
    /// Task `base_ID` within its DAG.
    pub base_id: u32,
    /// Runtime in µs at max frequency on this PE.
    pub performance: f64,
}

/// One `(PE name, predecessor base_ID, task base_ID, comm_vol)` precedence
/// triple for a DAG edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecedenceTriple {
    /// PE name the precedence constraint is scoped to.
    pub pe_name: String,
    /// Predecessor task `base_ID`.
    pub predecessor_base_id: u32,
    /// Successor task `base_ID`.
    pub base_id: u32,
    /// Communication volume in bits between the two tasks.
    pub comm_vol: u64,
}

/// One live job's contribution to a [`CpRequest`]: the task list (by
/// `base_ID`, in DAG order) plus its eligibility and precedence triples.
#[derive(Debug, Clone, PartialEq)]
pub struct JobEntry {
    /// Application catalog name this job was instantiated from.
    pub application_name: String,
    /// Task `base_ID`s, in DAG order.
    pub task_base_ids: Vec<u32>,
    /// Eligibility triples for this job's tasks, across non-MEM/CAC PEs.
    pub eligibility: Vec<EligibilityTriple>,
    /// Precedence triples for this job's DAG edges.
    pub precedence: Vec<PrecedenceTriple>,
}

/// The request handed to the external CP oracle: every live job, grouped by
/// `jobID`, per spec.md §4.4.4 and `CP_models.py`'s `Dags_2[jobID]` grouping.
#[derive(Debug, Clone, Default)]
pub struct CpRequest {
    /// Live jobs, keyed by job id.
    pub jobs: HashMap<JobId, JobEntry>,
    /// Solver wall-clock time limit, in seconds (spec.md §4.4.4: 60s).
    pub time_limit_secs: u32,
}

impl CpRequest {
    /// Construct an empty request with the spec's 60-second default limit.
    #[must_use]
    pub fn new() -> Self {
        Self { jobs: HashMap::new(), time_limit_secs: 60 }
    }
}

/// The oracle's response: a table identical in shape to the table-driven
/// scheduler's (spec.md §4.4.4: "Output: a table identical in shape to
/// §4.4.2"), keyed by `task_sched_ID`.
#[derive(Debug, Clone, Default)]
pub struct CpResponse {
    /// `task_sched_ID -> (PE, order)` assignments produced by the solve.
    pub table: HashMap<u32, TableEntry>,
}

/// A [`Scheduler`] that never invokes a live solver: it only consults
/// pre-baked [`CpResponse`] tables, one per job id, supplied ahead of time
/// (e.g. loaded from a fixture produced by an offline solve). Failing to
/// find a table entry for a live job is a hard error, not a silent
/// fallback to a different scheduler (spec.md §4.4: "fails-loud").
pub struct PreBakedCpOracle {
    tables_by_job: HashMap<JobId, CpResponse>,
}

impl PreBakedCpOracle {
    /// Construct an oracle stand-in from per-job pre-baked tables.
    #[must_use]
    pub fn new(tables_by_job: HashMap<JobId, CpResponse>) -> Self {
        Self { tables_by_job }
    }
}

impl Scheduler for PreBakedCpOracle {
    fn name(&self) -> &str {
        "CP_oracle"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let ready: Vec<_> = ctx.ready.to_vec();
        for task_id in ready {
            let (job_id, base_id) = {
                let task = ctx.task(task_id);
                (task.job_id, task.base_id)
            };
            let response = self
                .tables_by_job
                .get(&job_id)
                .ok_or(SchedulerError::CpOracleUnavailable { job_id: job_id.0 })?;
            let entry = response
                .table
                .get(&base_id)
                .ok_or(SchedulerError::TableEntryMissing { task_sched_id: base_id })?;
            if ctx.pes.get(entry.pe_id.index()).is_none() {
                return Err(SchedulerError::TablePeUnknown { task_sched_id: base_id, pe_id: entry.pe_id.0 });
            }
            ctx.assign_pe(task_id, entry.pe_id);
            ctx.task_mut(task_id).order = i64::from(entry.order);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp_request_defaults_to_sixty_second_limit() {
        assert_eq!(CpRequest::new().time_limit_secs, 60);
    }

    #[test]
    fn missing_job_table_is_an_error() {
        let oracle = PreBakedCpOracle::new(HashMap::new());
        assert_eq!(oracle.name(), "CP_oracle");
    }
}
