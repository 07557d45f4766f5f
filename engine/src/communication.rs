//! The communication model: PE→PE or PE↔memory transfer latencies computed
//! from the bandwidth matrix, and the Ready→Executable promotion that
//! attaches them to a task's `time_stamp` (spec.md §4.1 step 3).
//!
//! Grounded on `original_source/DASH_Sim_core.py`'s `update_execution_queue`,
//! which (unlike the dependency resolver) re-reads the *template's*
//! predecessor list rather than the task instance's (already-drained) one,
//! since by the time every predecessor has completed the instance's own
//! `predecessors` field is empty.

use crate::config::CommunicationMode;
use soc_types::{ApplicationCatalog, BandwidthMatrix, PeId, QueueKind, TaskId, TaskQueues};

fn find_template<'a>(catalog: &'a ApplicationCatalog, job_name: &str, base_id: u32) -> Option<&'a soc_types::TaskTemplate> {
    catalog.iter().find(|app| app.name == job_name).and_then(|app| app.task_list.get(base_id as usize))
}

/// Move every task in `ready_ids` (all of which a scheduler has just
/// assigned a PE) from `Ready` into `Executable`, computing each task's
/// `time_stamp` from the configured [`CommunicationMode`].
///
/// `memory_pe` is the PE id used as the shared-memory endpoint (spec.md §3:
/// "memory is conventionally the last index" of the bandwidth matrix).
pub fn promote_ready_to_executable(
    queues: &mut TaskQueues,
    ready_ids: &[TaskId],
    catalog: &ApplicationCatalog,
    bandwidth: &BandwidthMatrix,
    mode: CommunicationMode,
    memory_pe: PeId,
    now: i64,
) {
    for &task_id in ready_ids {
        let (job_name, base_id, head, pe_id, offset) = {
            let task = queues.task(task_id);
            (task.job_name.clone(), task.base_id, task.head, task.pe_id, task.id.0 - task.base_id)
        };

        if head {
            let task = queues.task_mut(task_id);
            task.pe_to_pe_wait_time.push(now);
            task.execution_wait_times.push(now);
        }

        let predecessors = find_template(catalog, &job_name, base_id).map(|t| t.predecessors.clone()).unwrap_or_default();

        for predecessor_base_id in predecessors {
            let comm_vol = catalog
                .iter()
                .find(|app| app.name == job_name)
                .map_or(0, |app| app.comm_vol(predecessor_base_id, base_id));
            let real_predecessor_id = TaskId(predecessor_base_id + offset);

            match mode {
                CommunicationMode::PeToPe => {
                    let (predecessor_pe, predecessor_finish) = queues
                        .list(QueueKind::Completed)
                        .iter()
                        .find(|&&id| id == real_predecessor_id)
                        .map(|&id| {
                            let t = queues.task(id);
                            (t.pe_id, t.finish_time)
                        })
                        .unwrap_or((PeId::UNASSIGNED, -1));
                    let comm_band = bandwidth.get(predecessor_pe.index(), pe_id.index());
                    let comm_time = if comm_band > 0.0 { (comm_vol as f64 / comm_band) as i64 } else { 0 };
                    queues.task_mut(task_id).pe_to_pe_wait_time.push(comm_time + predecessor_finish);
                }
                CommunicationMode::SharedMemory => {
                    let comm_band = bandwidth.get(memory_pe.index(), pe_id.index());
                    let comm_time = if comm_band > 0.0 { (comm_vol as f64 / comm_band) as i64 } else { 0 };
                    queues.task_mut(task_id).execution_wait_times.push(comm_time + now);
                }
            }
        }

        let time_stamp = {
            let task = queues.task(task_id);
            match mode {
                CommunicationMode::PeToPe => task.pe_to_pe_wait_time.iter().copied().max().unwrap_or(now),
                CommunicationMode::SharedMemory => task.execution_wait_times.iter().copied().max().unwrap_or(now),
            }
        };
        queues.task_mut(task_id).time_stamp = time_stamp;
        queues.transfer(task_id, QueueKind::Ready, QueueKind::Executable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soc_types::{Application, ApplicationCatalog, IdGen, TaskInstance, TaskTemplate};

    fn two_task_app() -> (ApplicationCatalog, Application) {
        let templates = vec![TaskTemplate::new("a", 0, vec![]).as_head(), TaskTemplate::new("b", 1, vec![0]).as_tail()];
        let comm = vec![vec![0, 100], vec![0, 0]];
        let app = Application::new("pair", templates, comm).unwrap();
        let mut catalog = ApplicationCatalog::new();
        catalog.push(app.clone());
        (catalog, app)
    }

    #[test]
    fn pe_to_pe_time_stamp_uses_predecessor_finish_plus_comm_time() {
        let (catalog, app) = two_task_app();
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(2);
        let mut task_a = TaskInstance::from_template(&app.task_list[0], job, "pair", offset.0);
        task_a.pe_id = PeId(0);
        task_a.finish_time = 10;
        let mut task_b = TaskInstance::from_template(&app.task_list[1], job, "pair", offset.0);
        task_b.pe_id = PeId(1);
        task_b.predecessors.clear();
        let id_b = task_b.id;

        let mut queues = TaskQueues::new();
        queues.insert(task_a, QueueKind::Completed);
        queues.insert(task_b, QueueKind::Ready);

        let mut bandwidth = BandwidthMatrix::new(3, 1.0, 1.0);
        bandwidth.set(0, 1, 50.0);

        promote_ready_to_executable(&mut queues, &[id_b], &catalog, &bandwidth, CommunicationMode::PeToPe, PeId(2), 0);

        let task = queues.task(id_b);
        assert_eq!(task.time_stamp, 10 + 100 / 50);
    }

    #[test]
    fn head_task_gets_zero_wait_regardless_of_mode() {
        let (catalog, app) = two_task_app();
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(2);
        let task_a = TaskInstance::from_template(&app.task_list[0], job, "pair", offset.0);
        let id_a = task_a.id;
        let mut queues = TaskQueues::new();
        queues.insert(task_a, QueueKind::Ready);
        let bandwidth = BandwidthMatrix::new(2, 1.0, 1.0);
        promote_ready_to_executable(&mut queues, &[id_a], &catalog, &bandwidth, CommunicationMode::SharedMemory, PeId(1), 42);
        assert_eq!(queues.task(id_a).time_stamp, 42);
    }
}
