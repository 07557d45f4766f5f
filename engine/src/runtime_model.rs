//! The execution-time sampling seam spec.md §9 asks for: "the current code
//! has dead randomization branches for execution time. Leave a
//! deterministic seam (`RuntimeModel::sample(task, pe, rng)`) ... default
//! implementation returns the mean." Grounded on
//! `original_source/DTPM_power_models.py`'s `get_execution_time_max_frequency`,
//! which always returns `(resource.performance[task], 1.0)` in this
//! codebase — the `randomization_factor` it also returns is unused by every
//! caller, confirming the branch is dead in the original too.

use rand_chacha::ChaCha8Rng;
use soc_types::{Pe, TaskInstance};

/// Samples a task's runtime at the owning cluster's maximum frequency, in
/// µs. The default [`MeanRuntimeModel`] is deterministic and matches the
/// original's always-mean behavior; a future model could consult `rng` to
/// draw from a distribution around `Pe::performance_for` without touching
/// any other engine code, since every caller threads the same seeded stream
/// through this one seam.
pub trait RuntimeModel: Send + Sync {
    /// Sample `task`'s runtime on `pe` at max frequency, in µs.
    fn sample(&self, task: &TaskInstance, pe: &Pe, rng: &mut ChaCha8Rng) -> f64;
}

/// Deterministic default: always returns `pe.performance_for(&task.name)`,
/// the mean runtime at max frequency. Matches spec.md §9's instruction that
/// the default implementation ignore the `rng` seam entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanRuntimeModel;

impl RuntimeModel for MeanRuntimeModel {
    fn sample(&self, task: &TaskInstance, pe: &Pe, _rng: &mut ChaCha8Rng) -> f64 {
        pe.performance_for(&task.name).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use soc_types::{ClusterId, PeId, PeKind};

    #[test]
    fn mean_model_ignores_rng_and_returns_performance() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut pe = Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1);
        pe.supported_functionalities.push("work".to_string());
        pe.performance.push(42.0);
        let task = TaskInstance {
            name: "work".to_string(),
            ..blank_task()
        };
        assert_eq!(MeanRuntimeModel.sample(&task, &pe, &mut rng), 42.0);
    }

    fn blank_task() -> TaskInstance {
        TaskInstance {
            name: String::new(),
            id: soc_types::TaskId(0),
            base_id: 0,
            job_id: soc_types::JobId(0),
            job_name: String::new(),
            predecessors: vec![],
            head: false,
            tail: false,
            pe_id: PeId::UNASSIGNED,
            start_time: -1,
            finish_time: -1,
            order: -1,
            time_stamp: -1,
            ready_wait_times: vec![],
            execution_wait_times: vec![],
            pe_to_pe_wait_time: vec![],
            dynamic_dependencies: vec![],
            task_elapsed_time_max_freq: 0.0,
            job_start: -1,
            input_packet_size: -1,
            output_packet_size: -1,
        }
    }
}
