//! The PE executor: runs one task across its DVFS sample windows,
//! accumulating static/dynamic energy exactly as the original's per-window
//! accounting loop (spec.md §4.5).
//!
//! Grounded on `original_source/processing_element.py`'s `PE.run` coroutine.
//! That function is a SimPy generator that `yield`s a (possibly large)
//! `simulation_step` between windows; translated here into a table of
//! in-flight [`RunningState`]s the `Simulation` event loop advances one tick
//! at a time (spec.md §9's single-threaded event-loop redesign). Since
//! `simulation_clk` is µs-granular by default and window boundaries always
//! land on whole microseconds, ticking one `next_boundary` check per call is
//! equivalent to the original's coroutine resuming exactly at that instant.

use crate::config::{SimConfig, SimulationMode};
use crate::error::EngineError;
use crate::runtime_model::RuntimeModel;
use rand_chacha::ChaCha8Rng;
use soc_dtpm::{num_tasks_being_executed, DtpmController};
use soc_power::{compute_dvfs_performance_slowdown, dynamic_power, extract_cdyn_alpha, lookup_profiled_power, static_power};
use soc_trace::{TaskTraceRecord, TraceSink};
use soc_types::{Cluster, Pe, PeId, QueueKind, TaskId, TaskQueues};
use std::collections::HashMap;

/// Per-task bookkeeping while a task occupies `Running`, mirroring the local
/// variables `processing_element.py`'s `run()` keeps alive across
/// `yield`-separated windows.
#[derive(Debug, Clone)]
struct RunningState {
    runtime_max_freq_us: f64,
    dynamic_energy_j: f64,
    static_energy_j: f64,
    dynamic_power_max_freq_core: f64,
    next_boundary: i64,
}

/// One task's completion, as reported by [`PeExecutor::advance`].
#[derive(Debug, Clone, Copy)]
pub struct CompletedExecution {
    /// The task that just finished.
    pub task_id: TaskId,
    /// Energy to add to the warmup-gated cumulative running total.
    pub cumulative_energy_delta: f64,
}

/// Owns every in-flight task's DVFS-window bookkeeping. One lives on the
/// `Simulation` context.
#[derive(Debug, Default)]
pub struct PeExecutor {
    running: HashMap<TaskId, RunningState>,
}

impl PeExecutor {
    /// Construct an executor tracking no in-flight tasks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin executing `task_id` on `pe_id`: occupy a slot, sample its
    /// runtime from `runtime_model`, and schedule its first window boundary.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &mut self,
        queues: &mut TaskQueues,
        pes: &mut [Pe],
        clusters: &mut [Cluster],
        runtime_model: &dyn RuntimeModel,
        rng: &mut ChaCha8Rng,
        config: &SimConfig,
        pe_id: PeId,
        task_id: TaskId,
        now: i64,
    ) -> Result<(), EngineError> {
        let cluster_id = pes[pe_id.index()].cluster_id;
        soc_dtpm::initialize_frequency(&mut clusters[cluster_id.index()])?;

        pes[pe_id.index()].occupy_slot();
        let runtime = {
            let task = queues.task(task_id);
            runtime_model.sample(task, &pes[pe_id.index()], rng)
        };
        let task = queues.task_mut(task_id);
        task.start_time = now;

        let window_remaining = config.sampling_rate - now.rem_euclid(config.sampling_rate);
        self.running.insert(
            task_id,
            RunningState {
                runtime_max_freq_us: runtime,
                dynamic_energy_j: 0.0,
                static_energy_j: 0.0,
                dynamic_power_max_freq_core: 0.0,
                next_boundary: now + window_remaining,
            },
        );
        Ok(())
    }

    /// Advance every in-flight task whose next window boundary has arrived,
    /// possibly completing it. Returns every task that finished this call.
    #[allow(clippy::too_many_arguments)]
    pub fn advance(
        &mut self,
        queues: &mut TaskQueues,
        pes: &mut [Pe],
        clusters: &mut [Cluster],
        dtpm: &mut DtpmController,
        trace: &mut dyn TraceSink,
        config: &SimConfig,
        now: i64,
    ) -> Result<Vec<CompletedExecution>, EngineError> {
        let mut finished = Vec::new();
        let running_ids: Vec<TaskId> = queues.list(QueueKind::Running).to_vec();
        for task_id in running_ids {
            let due = self.running.get(&task_id).is_some_and(|s| s.next_boundary <= now);
            if !due {
                continue;
            }
            if let Some(result) = self.step_window(queues, pes, clusters, dtpm, trace, config, task_id, now)? {
                finished.push(result);
            }
        }
        Ok(finished)
    }

    #[allow(clippy::too_many_arguments)]
    fn step_window(
        &mut self,
        queues: &mut TaskQueues,
        pes: &mut [Pe],
        clusters: &mut [Cluster],
        dtpm: &mut DtpmController,
        trace: &mut dyn TraceSink,
        config: &SimConfig,
        task_id: TaskId,
        now: i64,
    ) -> Result<Option<CompletedExecution>, EngineError> {
        let pe_id = queues.task(task_id).pe_id;
        let pe_idx = pe_id.index();
        let cluster_id = pes[pe_idx].cluster_id;
        let cluster_idx = cluster_id.index();

        let task_elapsed = queues.task(task_id).task_elapsed_time_max_freq;
        let slowdown = compute_dvfs_performance_slowdown(&clusters[cluster_idx]);
        let runtime_max_freq = self.running[&task_id].runtime_max_freq_us;
        let predicted_exec_time = (runtime_max_freq - task_elapsed) * (1.0 + slowdown);
        let window_remaining = (config.sampling_rate - now.rem_euclid(config.sampling_rate)) as f64;

        let task_complete = predicted_exec_time - window_remaining <= 0.0;
        let simulation_step = if task_complete {
            predicted_exec_time
        } else {
            window_remaining
        };
        let new_elapsed = if task_complete {
            task_elapsed
        } else {
            task_elapsed + simulation_step / (slowdown + 1.0)
        };

        let max_temp = dtpm.max_temperature_c();
        let current_leakage = static_power(clusters[cluster_idx].kind, clusters[cluster_idx].current_voltage, max_temp);
        let static_energy_delta = current_leakage * simulation_step * 1e-6;

        let n_active_tasks = num_tasks_being_executed(&clusters[cluster_idx], pes);
        let lookup = lookup_profiled_power(
            &clusters[cluster_idx].power_profile,
            clusters[cluster_idx].current_frequency,
            n_active_tasks,
            clusters[cluster_idx].num_active_cores,
        );

        let (dynamic_power_max_freq_core, cdyn_alpha) = match lookup {
            Some((max_power_consumption, freq_threshold)) if max_power_consumption > 0.0 => {
                let n_profile_cores = clusters[cluster_idx].power_profile.get(&freq_threshold).map_or(0, Vec::len) as u32;
                let volt_at_threshold = clusters[cluster_idx].voltage_for(freq_threshold).unwrap_or(clusters[cluster_idx].current_voltage);
                let per_core = (max_power_consumption - current_leakage * f64::from(n_profile_cores)) / f64::from(n_active_tasks.max(1));
                let alpha = extract_cdyn_alpha(max_power_consumption, freq_threshold, volt_at_threshold, current_leakage, n_profile_cores, n_active_tasks);
                (per_core, alpha)
            }
            _ => (0.0, 0.0),
        };

        let dynamic_power_now = dynamic_power(clusters[cluster_idx].current_frequency, clusters[cluster_idx].current_voltage, cdyn_alpha);
        let dynamic_energy_delta = dynamic_power_now * simulation_step * 1e-6;

        clusters[cluster_idx].current_power_cluster =
            dynamic_power_now * f64::from(n_active_tasks) + current_leakage * f64::from(clusters[cluster_idx].num_active_cores);
        pes[pe_idx].current_leakage_core = current_leakage;

        let counts = matches!(config.simulation_mode, SimulationMode::Performance) && now >= config.warmup_period
            || matches!(config.simulation_mode, SimulationMode::Validation);
        let mut cumulative_energy_delta = 0.0;
        if counts {
            let energy_sample = (dynamic_power_now + current_leakage) * simulation_step * 1e-6;
            pes[pe_idx].snippet_energy += energy_sample;
            pes[pe_idx].total_energy += energy_sample;
            cumulative_energy_delta = energy_sample;
        }

        {
            let state = self.running.get_mut(&task_id).expect("task must be tracked while in Running");
            state.static_energy_j += static_energy_delta;
            state.dynamic_energy_j += dynamic_energy_delta;
            state.dynamic_power_max_freq_core = dynamic_power_max_freq_core;
        }

        let task = queues.task_mut(task_id);
        task.task_elapsed_time_max_freq = new_elapsed;

        if !task_complete {
            let next_boundary = now + config.sampling_rate;
            self.running.get_mut(&task_id).expect("task must be tracked while in Running").next_boundary = next_boundary;
            dtpm.evaluate_pe(pes, clusters, queues, pe_id, now, trace)?;
            return Ok(None);
        }

        let finish_time = now;
        let state = self.running.remove(&task_id).expect("task must be tracked while in Running");
        let task_runtime = finish_time - queues.task(task_id).start_time;

        let total_energy_task = if clusters[cluster_idx].opp.is_empty() {
            state.dynamic_power_max_freq_core * task_runtime as f64 * 1e-6
        } else {
            state.dynamic_energy_j + state.static_energy_j
        };

        {
            let task = queues.task_mut(task_id);
            task.finish_time = finish_time;
            task.task_elapsed_time_max_freq = 0.0;
        }
        pes[pe_idx].release_slot();

        let _ = trace.record_task(TaskTraceRecord {
            dvfs_mode: format!("{:?}", clusters[cluster_idx].dvfs),
            task_id: task_id.0,
            cluster: clusters[cluster_idx].name.clone(),
            exec_time_us: task_runtime,
            energy_j: total_energy_task,
        });

        dtpm.evaluate_pe(pes, clusters, queues, pe_id, now, trace)?;

        Ok(Some(CompletedExecution { task_id, cumulative_energy_delta }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_model::MeanRuntimeModel;
    use rand::SeedableRng;
    use soc_types::{ClusterId, DvfsMode, IdGen, Opp, PeKind, TaskInstance, TaskTemplate};

    fn single_pe_setup() -> (TaskQueues, Vec<Pe>, Vec<Cluster>, TaskId) {
        let mut cluster = Cluster::new(ClusterId(0), "big", PeKind::Big, DvfsMode::Performance);
        cluster.opp = vec![Opp { freq_mhz: 1000, volt_mv: 1000 }];
        cluster.num_active_cores = 1;
        cluster.num_total_cores = 1;
        cluster.pe_list = vec![PeId(0)];

        let mut pe = Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1);
        pe.supported_functionalities.push("work".to_string());
        pe.performance.push(10.0);

        let template = TaskTemplate::new("work", 0, vec![]).as_head().as_tail();
        let mut gen = IdGen::new();
        let job = gen.alloc_job();
        let offset = gen.alloc_task_block(1);
        let mut task = TaskInstance::from_template(&template, job, "solo", offset.0);
        task.pe_id = PeId(0);
        let task_id = task.id;

        let mut queues = TaskQueues::new();
        queues.insert(task, QueueKind::Running);

        (queues, vec![pe], vec![cluster], task_id)
    }

    #[test]
    fn short_task_completes_within_its_first_window() {
        let (mut queues, mut pes, mut clusters, task_id) = single_pe_setup();
        let mut executor = PeExecutor::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = SimConfig {
            sampling_rate: 1000,
            ..SimConfig::default()
        };

        executor.start(&mut queues, &mut pes, &mut clusters, &MeanRuntimeModel, &mut rng, &config, PeId(0), task_id, 0).unwrap();

        let mut dtpm = soc_dtpm::DtpmController::new(
            soc_dtpm::DtpmConfig {
                sampling_rate: config.sampling_rate,
                sampling_rate_temperature: config.sampling_rate_temperature,
                util_high_threshold: config.util_high_threshold,
                util_low_threshold: config.util_low_threshold,
                warmup_period: config.warmup_period,
                trip_points: vec![],
                dtpm_trip_points: vec![],
                enable_throttling: false,
                enable_dtpm_throttling: false,
            },
            1,
            1,
        );
        let mut sink = soc_trace::NullSink;

        let finished = executor.advance(&mut queues, &mut pes, &mut clusters, &mut dtpm, &mut sink, &config, 1000).unwrap();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].task_id, task_id);
        assert_eq!(queues.task(task_id).finish_time, 1000);
        assert!(pes[0].idle);
    }
}
