//! Dependency resolution (spec.md §4.3): once a task completes, drain it
//! from `predecessors` on every Outstanding task and promote any task whose
//! predecessors are now empty into `WaitReady` (shared-memory mode) or
//! directly into `Ready` (PE-to-PE mode).
//!
//! Grounded on `original_source/DASH_Sim_core.py`'s `update_ready_queue`.

use crate::config::CommunicationMode;
use soc_types::{ApplicationCatalog, BandwidthMatrix, PeId, QueueKind, TaskId, TaskQueues};

/// Handle one task's completion: move it into `Completed`, clear it from
/// every Outstanding task's `predecessors`, and promote newly-unblocked
/// tasks per `mode`. `completed_id` must currently be in `Running`.
pub fn resolve_completion(
    queues: &mut TaskQueues,
    catalog: &ApplicationCatalog,
    bandwidth: &BandwidthMatrix,
    mode: CommunicationMode,
    memory_pe: PeId,
    completed_id: TaskId,
    now: i64,
) {
    queues.transfer(completed_id, QueueKind::Running, QueueKind::Completed);

    let (completed_pe, completed_base_id, job_name) = {
        let task = queues.task(completed_id);
        (task.pe_id, task.base_id, task.job_name.clone())
    };

    let mut promote = Vec::new();
    for outstanding_id in queues.list(QueueKind::Outstanding).to_vec() {
        let had_predecessor = queues.task(outstanding_id).predecessors.contains(&completed_id);
        if !had_predecessor {
            continue;
        }
        queues.task_mut(outstanding_id).predecessors.retain(|&p| p != completed_id);

        if mode == CommunicationMode::SharedMemory {
            let outstanding_base_id = queues.task(outstanding_id).base_id;
            let comm_vol = catalog
                .iter()
                .find(|app| app.name == job_name)
                .map_or(0, |app| app.comm_vol(completed_base_id, outstanding_base_id));
            let comm_band = bandwidth.get(completed_pe.index(), memory_pe.index());
            let comm_time = if comm_band > 0.0 { (comm_vol as f64 / comm_band) as i64 } else { 0 };
            queues.task_mut(outstanding_id).ready_wait_times.push(comm_time + now);
        }

        if queues.task(outstanding_id).predecessors.is_empty() {
            promote.push(outstanding_id);
        }
    }

    for outstanding_id in promote {
        match mode {
            CommunicationMode::PeToPe => {
                queues.transfer(outstanding_id, QueueKind::Outstanding, QueueKind::Ready);
            }
            CommunicationMode::SharedMemory => {
                let time_stamp = queues.task(outstanding_id).ready_wait_times.iter().copied().max().unwrap_or(now);
                queues.task_mut(outstanding_id).time_stamp = time_stamp;
                queues.transfer(outstanding_id, QueueKind::Outstanding, QueueKind::WaitReady);
            }
        }
    }
}

/// Move every `WaitReady` task whose `time_stamp` has elapsed into `Ready`
/// (spec.md §4.1 step 2, shared-memory mode only).
pub fn promote_wait_ready(queues: &mut TaskQueues, now: i64) {
    let due: Vec<TaskId> = queues
        .list(QueueKind::WaitReady)
        .iter()
        .copied()
        .filter(|&id| queues.task(id).time_stamp <= now)
        .collect();
    for id in due {
        queues.transfer(id, QueueKind::WaitReady, QueueKind::Ready);
    }
}

/// Apply the configured completed-queue pruning policy (spec.md §4.3 step 4
/// / §9 Open Question) once the live `jobID` span exceeds `prune_span`.
pub fn prune_completed_queue(queues: &mut TaskQueues, mode: crate::config::CompletedQueuePruneMode, prune_span: i64) {
    let completed = queues.list(QueueKind::Completed);
    if completed.is_empty() {
        return;
    }
    let mut job_ids: Vec<i64> = completed.iter().map(|&id| i64::from(queues.task(id).job_id.0)).collect();
    job_ids.sort_unstable();
    let first = job_ids[0];
    let last = *job_ids.last().expect("checked non-empty above");
    if last - first <= prune_span {
        return;
    }
    let oldest_job = queues
        .list(QueueKind::Completed)
        .iter()
        .find(|&&id| i64::from(queues.task(id).job_id.0) == first)
        .copied();
    match mode {
        crate::config::CompletedQueuePruneMode::FirstMatchOnly => {
            if let Some(id) = oldest_job {
                queues.prune_completed_first(id);
            }
        }
        crate::config::CompletedQueuePruneMode::DropAllOfOldestJob => {
            if let Some(id) = oldest_job {
                let job_id = queues.task(id).job_id;
                queues.prune_completed_job(job_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{Application, IdGen, TaskInstance, TaskTemplate};

    fn chain_app() -> Application {
        let templates = vec![TaskTemplate::new("a", 0, vec![]).as_head(), TaskTemplate::new("b", 1, vec![0]).as_tail()];
        let comm = vec![vec![0, 64], vec![0, 0]];
        Application::new("chain", templates, comm).unwrap()
    }

    #[test]
    fn completion_unblocks_sole_successor_into_wait_ready_under_shared_memory() {
        let app = chain_app();
        let mut catalog = ApplicationCatalog::new();
        catalog.push(app.clone());
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(2);

        let mut task_a = TaskInstance::from_template(&app.task_list[0], job, "chain", offset.0);
        task_a.pe_id = PeId(0);
        let task_b = TaskInstance::from_template(&app.task_list[1], job, "chain", offset.0);
        let id_a = task_a.id;
        let id_b = task_b.id;

        let mut queues = TaskQueues::new();
        queues.insert(task_a, QueueKind::Running);
        queues.insert(task_b, QueueKind::Outstanding);

        let mut bandwidth = BandwidthMatrix::new(2, 1.0, 1.0);
        bandwidth.set(0, 1, 8.0);

        resolve_completion(&mut queues, &catalog, &bandwidth, CommunicationMode::SharedMemory, PeId(1), id_a, 100);

        assert_eq!(queues.state_of(id_a), Some(QueueKind::Completed));
        assert_eq!(queues.state_of(id_b), Some(QueueKind::WaitReady));
        assert_eq!(queues.task(id_b).time_stamp, 100 + 64 / 8);
        assert!(queues.task(id_b).predecessors.is_empty());
    }

    #[test]
    fn completion_unblocks_sole_successor_into_ready_under_pe_to_pe() {
        let app = chain_app();
        let mut catalog = ApplicationCatalog::new();
        catalog.push(app.clone());
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(2);

        let task_a = TaskInstance::from_template(&app.task_list[0], job, "chain", offset.0);
        let task_b = TaskInstance::from_template(&app.task_list[1], job, "chain", offset.0);
        let id_a = task_a.id;
        let id_b = task_b.id;

        let mut queues = TaskQueues::new();
        queues.insert(task_a, QueueKind::Running);
        queues.insert(task_b, QueueKind::Outstanding);

        let bandwidth = BandwidthMatrix::new(2, 1.0, 1.0);
        resolve_completion(&mut queues, &catalog, &bandwidth, CommunicationMode::PeToPe, PeId(1), id_a, 0);

        assert_eq!(queues.state_of(id_b), Some(QueueKind::Ready));
    }

    #[test]
    fn prune_first_match_only_deletes_a_single_entry() {
        let app = chain_app();
        let mut gen = IdGen::new();
        let mut queues = TaskQueues::new();
        for _ in 0..20 {
            let job = gen.alloc_job();
            let offset = gen.alloc_task_block(1);
            let mut t = TaskInstance::from_template(&app.task_list[0], job, "chain", offset.0);
            t.predecessors.clear();
            queues.insert(t, QueueKind::Completed);
        }
        let before = queues.len();
        prune_completed_queue(&mut queues, crate::config::CompletedQueuePruneMode::FirstMatchOnly, 15);
        assert_eq!(queues.len(), before - 1);
    }
}
