//! Greedy scheduling heuristics (spec.md §4.4.1): `CPU_only`, `MET`, `EFT`,
//! `STF`, `ETF`, `ETF_LB`. Each is a separate zero-sized `Scheduler` impl so
//! the registry can dispatch on configured name without an internal
//! enum/if-else chain (spec.md §9).

use crate::error::SchedulerError;
use crate::traits::{AssignCtx, Scheduler};
use soc_types::{PeId, PeKind};

fn no_eligible_pe(ctx: &AssignCtx<'_>, task_id: soc_types::TaskId) -> SchedulerError {
    let task = ctx.task(task_id);
    SchedulerError::NoEligiblePe {
        task_name: task.name.clone(),
        job_id: task.job_id.0,
    }
}

/// Pick the CPU-typed PE with the least current load (busy-slot count),
/// breaking ties by ascending PE id.
#[derive(Debug, Default)]
pub struct CpuOnly;

impl Scheduler for CpuOnly {
    fn name(&self) -> &str {
        "CPU_only"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let ready: Vec<_> = ctx.ready.to_vec();
        for task_id in ready {
            let task_name = ctx.task(task_id).name.clone();
            let best = ctx
                .pes
                .iter()
                .filter(|pe| pe.kind == PeKind::Cpu && pe.performance_for(&task_name).is_some())
                .min_by_key(|pe| (pe.busy_slots, pe.id))
                .map(|pe| pe.id)
                .ok_or_else(|| no_eligible_pe(ctx, task_id))?;
            ctx.assign_pe(task_id, best);
        }
        Ok(())
    }
}

/// Find the PE minimizing `performance[task]` among eligible PEs, breaking
/// ties by ascending PE id.
fn met_choice(ctx: &AssignCtx<'_>, task_name: &str) -> Option<PeId> {
    ctx.eligible_pes(task_name)
        .min_by(|(a_id, a_perf), (b_id, b_perf)| {
            a_perf.partial_cmp(b_perf).unwrap_or(std::cmp::Ordering::Equal).then(a_id.cmp(b_id))
        })
        .map(|(id, _)| id)
}

/// Minimum Execution Time: pick the PE minimizing `performance[task]`,
/// breaking ties by PE id.
#[derive(Debug, Default)]
pub struct Met;

impl Scheduler for Met {
    fn name(&self) -> &str {
        "MET"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let ready: Vec<_> = ctx.ready.to_vec();
        for task_id in ready {
            let task_name = ctx.task(task_id).name.clone();
            let best = met_choice(ctx, &task_name).ok_or_else(|| no_eligible_pe(ctx, task_id))?;
            ctx.assign_pe(task_id, best);
        }
        Ok(())
    }
}

/// Earliest Finish Time: for each candidate PE compute
/// `max(now, PE.available_time) + performance[task]`; pick the minimum and
/// update `PE.available_time` accordingly.
#[derive(Debug, Default)]
pub struct Eft;

/// Compute `(pe_id, finish_time)` minimizing finish time for `task_name`
/// among PEs supporting it, breaking ties by ascending PE id. Shared by
/// [`Eft`], [`Etf`], and [`EtfLb`].
fn eft_choice(ctx: &AssignCtx<'_>, task_name: &str) -> Option<(PeId, i64)> {
    ctx.pes
        .iter()
        .filter_map(|pe| pe.performance_for(task_name).map(|perf| (pe, perf)))
        .map(|(pe, perf)| {
            let finish = ctx.now.max(pe.available_time) + perf.ceil() as i64;
            (pe.id, finish)
        })
        .min_by_key(|&(id, finish)| (finish, id))
}

impl Scheduler for Eft {
    fn name(&self) -> &str {
        "EFT"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let ready: Vec<_> = ctx.ready.to_vec();
        for task_id in ready {
            let task_name = ctx.task(task_id).name.clone();
            let (pe_id, finish) = eft_choice(ctx, &task_name).ok_or_else(|| no_eligible_pe(ctx, task_id))?;
            ctx.assign_pe(task_id, pe_id);
            let pe = &mut ctx.pes[pe_id.index()];
            pe.available_time = finish;
        }
        Ok(())
    }
}

/// Shortest Task First: order Ready by ascending `performance[task, best_PE]`
/// (the best PE being the one MET would choose), then dispatch in that
/// order by MET.
#[derive(Debug, Default)]
pub struct Stf;

impl Scheduler for Stf {
    fn name(&self) -> &str {
        "STF"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let mut ordered: Vec<(soc_types::TaskId, f64)> = Vec::with_capacity(ctx.ready.len());
        for &task_id in ctx.ready {
            let task_name = ctx.task(task_id).name.clone();
            let best_perf = ctx
                .eligible_pes(&task_name)
                .map(|(_, perf)| perf)
                .fold(None, |acc: Option<f64>, p| Some(acc.map_or(p, |a| a.min(p))))
                .ok_or_else(|| no_eligible_pe(ctx, task_id))?;
            ordered.push((task_id, best_perf));
        }
        ordered.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        for (task_id, _) in ordered {
            let task_name = ctx.task(task_id).name.clone();
            let best = met_choice(ctx, &task_name).ok_or_else(|| no_eligible_pe(ctx, task_id))?;
            ctx.assign_pe(task_id, best);
        }
        Ok(())
    }
}

/// Earliest Time First: among all Ready×PE pairs, repeatedly pick the one
/// with the smallest finish time, assign it, update that PE's
/// `available_time`, and remove the task from further consideration.
#[derive(Debug, Default)]
pub struct Etf;

impl Scheduler for Etf {
    fn name(&self) -> &str {
        "ETF"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let mut remaining: Vec<_> = ctx.ready.to_vec();
        while !remaining.is_empty() {
            let mut best: Option<(usize, PeId, i64)> = None;
            for (idx, &task_id) in remaining.iter().enumerate() {
                let task_name = ctx.task(task_id).name.clone();
                if let Some((pe_id, finish)) = eft_choice(ctx, &task_name) {
                    let better = match best {
                        Some((_, _, f)) => finish < f,
                        None => true,
                    };
                    if better {
                        best = Some((idx, pe_id, finish));
                    }
                }
            }
            let (idx, pe_id, finish) = best.ok_or_else(|| no_eligible_pe(ctx, remaining[0]))?;
            let task_id = remaining.remove(idx);
            ctx.assign_pe(task_id, pe_id);
            ctx.pes[pe_id.index()].available_time = finish;
        }
        Ok(())
    }
}

/// ETF with a tie-break toward the PE of smallest cumulative load
/// (`busy_slots`) when two Ready×PE pairs share the same finish time.
#[derive(Debug, Default)]
pub struct EtfLb;

impl Scheduler for EtfLb {
    fn name(&self) -> &str {
        "ETF_LB"
    }

    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError> {
        let mut remaining: Vec<_> = ctx.ready.to_vec();
        while !remaining.is_empty() {
            let mut best: Option<(usize, PeId, i64, u32)> = None;
            for (idx, &task_id) in remaining.iter().enumerate() {
                let task_name = ctx.task(task_id).name.clone();
                if let Some((pe_id, finish)) = eft_choice(ctx, &task_name) {
                    let load = ctx.pes[pe_id.index()].busy_slots;
                    let better = match best {
                        Some((_, _, f, l)) => (finish, load) < (f, l),
                        None => true,
                    };
                    if better {
                        best = Some((idx, pe_id, finish, load));
                    }
                }
            }
            let (idx, pe_id, finish, _) = best.ok_or_else(|| no_eligible_pe(ctx, remaining[0]))?;
            let task_id = remaining.remove(idx);
            ctx.assign_pe(task_id, pe_id);
            ctx.pes[pe_id.index()].available_time = finish;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{
        Application, ApplicationCatalog, BandwidthMatrix, Cluster, ClusterId, DvfsMode, IdGen, JobId, Pe, PeId,
        QueueKind, TaskInstance, TaskQueues, TaskTemplate,
    };

    fn pe(id: u32, cluster: u32, kind: PeKind, name: &str, task_name: &str, perf: f64) -> Pe {
        let mut p = Pe::new(PeId(id), ClusterId(cluster), name, kind, 1);
        p.supported_functionalities.push(task_name.to_string());
        p.performance.push(perf);
        p
    }

    fn sample_ctx_fixtures() -> (TaskQueues, Vec<Pe>, Vec<Cluster>, BandwidthMatrix, ApplicationCatalog) {
        let mut queues = TaskQueues::new();
        let template = TaskTemplate::new("work", 0, vec![]).as_head().as_tail();
        let app = Application::new("solo", vec![template], vec![vec![0]]).unwrap();
        let mut catalog = ApplicationCatalog::new();
        catalog.push(app.clone());
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let first = gen.alloc_task_block(1);
        let task = TaskInstance::from_template(&app.task_list[0], job, "solo", first.0);
        queues.insert(task, QueueKind::Ready);

        let pes = vec![pe(0, 0, PeKind::Cpu, "cpu_0", "work", 10.0), pe(1, 0, PeKind::Cpu, "cpu_1", "work", 5.0)];
        let clusters = vec![Cluster::new(ClusterId(0), "cpu", PeKind::Cpu, DvfsMode::Performance)];
        let bandwidth = BandwidthMatrix::new(2, 1.0, 1.0);
        (queues, pes, clusters, bandwidth, catalog)
    }

    #[test]
    fn met_picks_faster_pe() {
        let (mut queues, mut pes, clusters, bandwidth, catalog) = sample_ctx_fixtures();
        let ready: Vec<_> = queues.list(QueueKind::Ready).to_vec();
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
        Met.assign(&mut ctx).unwrap();
        assert_eq!(ctx.task(ready[0]).pe_id, PeId(1));
    }

    #[test]
    fn eft_updates_available_time() {
        let (mut queues, mut pes, clusters, bandwidth, catalog) = sample_ctx_fixtures();
        let ready: Vec<_> = queues.list(QueueKind::Ready).to_vec();
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
        Eft.assign(&mut ctx).unwrap();
        let assigned = ctx.task(ready[0]).pe_id;
        assert!(ctx.pes[assigned.index()].available_time > 0);
    }

    #[test]
    fn no_eligible_pe_is_an_error() {
        let (mut queues, mut pes, clusters, bandwidth, catalog) = sample_ctx_fixtures();
        pes.clear();
        let ready: Vec<_> = queues.list(QueueKind::Ready).to_vec();
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
        assert!(Met.assign(&mut ctx).is_err());
    }
}
