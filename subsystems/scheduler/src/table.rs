//! Table-driven (ILP-family) schedulers (spec.md §4.4.2).
//!
//! Grounded on `original_source/DASH_Sim_core.py`'s ILP table consumption
//! path and `CP_models.py`'s precomputed-table shape: a scheduler here never
//! solves anything itself, it only looks a ready task up in a precomputed
//! `task_sched_ID -> (PE_ID, order_on_PE)` table and injects the same-PE,
//! previous-slot dynamic dependency rule.

use crate::error::SchedulerError;
use crate::traits::{AssignCtx, Scheduler};
use soc_types::{ApplicationCatalog, JobId, PeId, TaskId};
use std::collections::HashMap;

/// One table entry: the PE a task is pinned to and its ordinal on that PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    /// PE this `task_sched_ID` is pinned to.
    pub pe_id: PeId,
    /// Execution ordinal on that PE (0-based).
    pub order: u32,
}

/// Compute `task_sched_ID = sum(len(app[prev].tasks)) + task.base_ID`,
/// summed over all jobs preceding `job_id` in arrival order (spec.md
/// §4.4.2). `arrival_order` lists every live job's id in arrival order,
/// paired with the catalog id of the application it was instantiated from.
#[must_use]
pub fn task_sched_id(
    arrival_order: &[(JobId, soc_types::AppId)],
    catalog: &ApplicationCatalog,
    job_id: JobId,
    base_id: u32,
) -> u32 {
    let mut offset = 0u32;
    for &(job, app_id) in arrival_order {
        if job == job_id {
            break;
        }
        offset += catalog.get(app_id).len() as u32;
    }
    offset + base_id
}

/// A scheduler driven entirely by a precomputed `task_sched_ID -> (PE,
/// order)` table (the ILP family). `arrival_order` must be kept current by
/// the caller (the engine appends to it as jobs are admitted); this
/// scheduler never mutates it.
pub struct TableDriven {
    name: String,
    table: HashMap<u32, TableEntry>,
}

impl TableDriven {
    /// Build a named table-driven scheduler from a precomputed table.
    #[must_use]
    pub fn new(name: impl Into<String>, table: HashMap<u32, TableEntry>) -> Self {
        Self { name: name.into(), table }
    }
}

impl Scheduler for TableDriven {
    fn name(&self) -> &str {
        &self.name
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let ready: Vec<_> = ctx.ready.to_vec();
        let mut by_pe_order: HashMap<(PeId, u32), TaskId> = HashMap::new();
        let mut resolved: Vec<(TaskId, TableEntry)> = Vec::with_capacity(ready.len());

        for &task_id in &ready {
            let task = ctx.task(task_id);
            let sched_id = task_sched_id(ctx.arrival_order, ctx.app_catalog, task.job_id, task.base_id);
            let entry = *self.table.get(&sched_id).ok_or(SchedulerError::TableEntryMissing { task_sched_id: sched_id })?;
            if ctx.pes.get(entry.pe_id.index()).is_none() {
                return Err(SchedulerError::TablePeUnknown { task_sched_id: sched_id, pe_id: entry.pe_id.0 });
            }
            by_pe_order.insert((entry.pe_id, entry.order), task_id);
            resolved.push((task_id, entry));
        }

        for (task_id, entry) in resolved {
            ctx.assign_pe(task_id, entry.pe_id);
            let task = ctx.task_mut(task_id);
            task.order = i64::from(entry.order);

            if entry.order > 0 {
                if let Some(&prev_task_id) = by_pe_order.get(&(entry.pe_id, entry.order - 1)) {
                    let already_predecessor = ctx.task(task_id).predecessors.contains(&prev_task_id);
                    if !already_predecessor && prev_task_id != task_id {
                        ctx.task_mut(task_id).dynamic_dependencies.push(prev_task_id);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{
        Application, ApplicationCatalog, BandwidthMatrix, Cluster, ClusterId, DvfsMode, IdGen, Pe, PeKind, QueueKind,
        TaskInstance, TaskQueues, TaskTemplate,
    };

    #[test]
    fn table_driven_assigns_and_injects_dynamic_dependency() {
        let mut queues = TaskQueues::new();
        let templates = vec![
            TaskTemplate::new("a", 0, vec![]).as_head(),
            TaskTemplate::new("b", 1, vec![0]).as_tail(),
        ];
        let comm = vec![vec![0, 8], vec![0, 0]];
        let app = Application::new("pair", templates, comm).unwrap();
        let mut catalog = ApplicationCatalog::new();
        let app_id = catalog.push(app.clone());
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(2);
        let task_a = TaskInstance::from_template(&app.task_list[0], job, "pair", offset.0);
        let task_b = TaskInstance::from_template(&app.task_list[1], job, "pair", offset.0);
        let id_a = task_a.id;
        let id_b = task_b.id;
        queues.insert(task_a, QueueKind::Ready);
        queues.insert(task_b, QueueKind::Ready);

        let mut table = HashMap::new();
        table.insert(0, TableEntry { pe_id: PeId(0), order: 0 });
        table.insert(1, TableEntry { pe_id: PeId(0), order: 1 });
        let sched = TableDriven::new("ILP_fixed", table);

        let mut pes = vec![Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1)];
        pes[0].supported_functionalities.push("a".to_string());
        pes[0].performance.push(1.0);
        pes[0].supported_functionalities.push("b".to_string());
        pes[0].performance.push(1.0);
        let clusters = vec![Cluster::new(ClusterId(0), "big", PeKind::Big, DvfsMode::Performance)];
        let bandwidth = BandwidthMatrix::new(1, 1.0, 1.0);
        let ready = vec![id_a, id_b];
        let mut ctx = AssignCtx {
            now: 0,
            ready: &ready,
            queues: &mut queues,
            pes: &mut pes,
            clusters: &clusters,
            bandwidth: &bandwidth,
            app_catalog: &catalog,
            arrival_order: &[],
        };
        sched.assign(&mut ctx).unwrap();
        assert_eq!(ctx.task(id_b).pe_id, PeId(0));
        assert_eq!(ctx.task(id_b).dynamic_dependencies, vec![]);
        let _ = app_id;
    }
}
