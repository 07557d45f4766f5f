//! The `Simulation` context: bundles every arena, pluggable policy, and RNG
//! stream, and drives the per-tick event loop (spec.md §4.1).
//!
//! Grounded on `original_source/DASH_Sim_core.py`'s `run()` coroutine: its
//! six-step body (idle-PE DTPM pass, WaitReady promotion, scheduler
//! invocation, Executable dispatch, per-tick-reassigning scheduler flush,
//! `simulation_clk` timeout) is reproduced here as [`Simulation::step`],
//! called once per tick rather than resumed by a SimPy coroutine scheduler
//! (spec.md §9's single-threaded event-loop redesign).

use crate::communication::promote_ready_to_executable;
use crate::config::SimConfig;
use crate::dependency_resolver::{prune_completed_queue, promote_wait_ready, resolve_completion};
use crate::error::EngineError;
use crate::job_generator::{JobGenerator, SnippetState};
use crate::pe_executor::PeExecutor;
use crate::runtime_model::{MeanRuntimeModel, RuntimeModel};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use soc_dtpm::{DtpmConfig, DtpmController};
use soc_scheduler::{AssignCtx, Scheduler};
use soc_trace::TraceSink;
use soc_types::{ApplicationCatalog, BandwidthMatrix, Cluster, IdGen, JobId, Pe, PeId, QueueKind, TaskQueues};
use std::sync::Arc;

/// Everything a run needs: the six-queue state machine, every resource
/// arena, the pluggable scheduler and runtime model, the DTPM controller,
/// the PE executor, the job generator and its snippet-gating state, and the
/// two independently seeded RNG streams (spec.md §4.2).
pub struct Simulation {
    /// Current virtual time, in µs.
    pub now: i64,
    /// Engine-wide configuration.
    pub config: SimConfig,
    /// Task queues and instances.
    pub queues: TaskQueues,
    /// Processing elements, dense-indexed by [`PeId`].
    pub pes: Vec<Pe>,
    /// Clusters, dense-indexed by `ClusterId`.
    pub clusters: Vec<Cluster>,
    /// Application templates jobs are instantiated from.
    pub catalog: ApplicationCatalog,
    /// PE-to-PE / PE-to-memory bandwidth matrix.
    pub bandwidth: BandwidthMatrix,
    /// The shared-memory endpoint's PE id (spec.md §3: conventionally the
    /// last row/column of `bandwidth`).
    pub memory_pe: PeId,
    /// Task/job id allocator.
    pub ids: IdGen,
    /// Task-to-PE assignment policy.
    pub scheduler: Arc<dyn Scheduler>,
    /// Execution-time sampling policy.
    pub runtime_model: Arc<dyn RuntimeModel>,
    /// DTPM controller (DVFS, throttling, temperature).
    pub dtpm: DtpmController,
    /// Per-task DVFS-window bookkeeping for running tasks.
    pub pe_executor: PeExecutor,
    /// Job injector.
    pub job_generator: JobGenerator,
    /// Snippet injection/execution gating state.
    pub snippet: SnippetState,
    /// Trace sink every record is pushed through.
    pub trace: Box<dyn TraceSink>,
    /// `(job_id, app_id)` pairs in arrival order, for table-driven
    /// schedulers' `task_sched_ID` computation (spec.md §4.4.2).
    pub arrival_order: Vec<(JobId, soc_types::AppId)>,
    /// Warmup-gated running total of energy consumed across every PE,
    /// accumulated from both the idle-PE pass and the PE executor
    /// (spec.md §4.5 step 8 / §6 `system` trace row).
    pub cumulative_energy_j: f64,
    /// Unconditional running total of energy consumed, independent of
    /// `warmup_period` (spec.md §4.5's "always tracked" idle-energy tally).
    pub total_energy_j: f64,
    runtime_rng: ChaCha8Rng,
}

impl Simulation {
    /// Construct a simulation ready to run at `t=0`, with the given arenas,
    /// scheduler, and configuration. `memory_pe` should be the last PE id in
    /// `bandwidth`'s index space.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SimConfig,
        pes: Vec<Pe>,
        clusters: Vec<Cluster>,
        catalog: ApplicationCatalog,
        bandwidth: BandwidthMatrix,
        memory_pe: PeId,
        scheduler: Arc<dyn Scheduler>,
        job_generator: JobGenerator,
        trace: Box<dyn TraceSink>,
        dtpm_config: DtpmConfig,
    ) -> Self {
        let n_pes = pes.len();
        let n_clusters = clusters.len();
        Self {
            now: 0,
            config,
            queues: TaskQueues::new(),
            pes,
            clusters,
            catalog,
            bandwidth,
            memory_pe,
            ids: IdGen::new(),
            scheduler,
            runtime_model: Arc::new(MeanRuntimeModel),
            dtpm: DtpmController::new(dtpm_config, n_pes, n_clusters),
            pe_executor: PeExecutor::new(),
            job_generator,
            snippet: SnippetState::default(),
            trace,
            arrival_order: Vec::new(),
            cumulative_energy_j: 0.0,
            total_energy_j: 0.0,
            runtime_rng: ChaCha8Rng::seed_from_u64(0),
        }
    }

    /// Number of tasks currently live (not yet `Completed`).
    #[must_use]
    pub fn live_job_count(&self) -> u32 {
        self.arrival_order.len() as u32 - self.completed_job_count()
    }

    fn completed_job_count(&self) -> u32 {
        let mut completed_jobs: Vec<JobId> =
            self.queues.list(QueueKind::Completed).iter().map(|&id| self.queues.task(id).job_id).collect();
        completed_jobs.sort_unstable_by_key(|j| j.0);
        completed_jobs.dedup();
        completed_jobs.len() as u32
    }

    /// Whether the run should stop: either virtual time has passed
    /// `simulation_length`, or the generator has stopped injecting and every
    /// task it ever created has reached `Completed` (spec.md §4.1's "sim
    /// done" event).
    #[must_use]
    pub fn is_done(&self) -> bool {
        if self.now > self.config.simulation_length {
            return true;
        }
        self.job_generator.is_exhausted() && !self.queues.is_empty() && self.queues.len() == self.queues.list(QueueKind::Completed).len()
    }

    /// Advance the simulation by exactly one `simulation_clk` tick,
    /// reproducing `DASH_Sim_core.py::run`'s six-step body.
    ///
    /// # Errors
    /// Propagates scheduler, DTPM, or trace-sink failures.
    pub fn step(&mut self) -> Result<(), EngineError> {
        let now = self.now;
        log::trace!("tick {now}");

        // Step 1: idle-PE DTPM pass, on sampling boundaries only.
        if now.rem_euclid(self.config.sampling_rate) == 0 {
            let count_toward_totals = matches!(self.config.simulation_mode, crate::config::SimulationMode::Validation)
                || now >= self.config.warmup_period;
            let sample = self.dtpm.evaluate_idle_pes(
                &mut self.pes,
                &mut self.clusters,
                &self.queues,
                now,
                self.trace.as_mut(),
                count_toward_totals,
            )?;
            self.total_energy_j += sample.energy_consumption_delta;
            self.cumulative_energy_j += sample.cumulative_energy_delta;
        }

        // Step 2: promote WaitReady tasks whose write-back latency elapsed.
        promote_wait_ready(&mut self.queues, now);

        // Step 3: invoke the scheduler over the whole Ready list, then
        // promote newly-assigned tasks into Executable.
        let ready_ids = self.queues.list(QueueKind::Ready).to_vec();
        if !ready_ids.is_empty() {
            let mut ctx = AssignCtx {
                now,
                ready: &ready_ids,
                queues: &mut self.queues,
                pes: &mut self.pes,
                clusters: &self.clusters,
                bandwidth: &self.bandwidth,
                app_catalog: &self.catalog,
                arrival_order: &self.arrival_order,
            };
            self.scheduler.assign(&mut ctx)?;

            let assigned: Vec<_> = ready_ids.iter().copied().filter(|&id| self.queues.task(id).is_assigned()).collect();
            promote_ready_to_executable(
                &mut self.queues,
                &assigned,
                &self.catalog,
                &self.bandwidth,
                self.config.communication_mode,
                self.memory_pe,
                now,
            );
        }

        // Step 4: dispatch due Executable tasks whose PE has a free slot and
        // whose dynamic dependencies are satisfied.
        let executable_ids = self.queues.list(QueueKind::Executable).to_vec();
        let completed: Vec<_> = self.queues.list(QueueKind::Completed).to_vec();
        for task_id in executable_ids {
            let (time_stamp, pe_id, deps_satisfied) = {
                let task = self.queues.task(task_id);
                (task.time_stamp, task.pe_id, task.dynamic_dependencies_satisfied(&completed))
            };
            if time_stamp > now || !pe_id.is_assigned() || !deps_satisfied {
                continue;
            }
            if !self.pes[pe_id.index()].has_free_slot() {
                continue;
            }
            self.queues.transfer(task_id, QueueKind::Executable, QueueKind::Running);
            self.pe_executor.start(
                &mut self.queues,
                &mut self.pes,
                &mut self.clusters,
                self.runtime_model.as_ref(),
                &mut self.runtime_rng,
                &self.config,
                pe_id,
                task_id,
                now,
            )?;
        }

        // Step 5: schedulers that reassign every tick flush their leftover
        // Executable tasks back to Ready (spec.md §4.4.3, e.g. DRL).
        if self.scheduler.reassigns_every_tick() {
            let leftover = self.queues.list(QueueKind::Executable).to_vec();
            for task_id in leftover {
                self.queues.task_mut(task_id).pe_id = PeId::UNASSIGNED;
                self.queues.transfer(task_id, QueueKind::Executable, QueueKind::Ready);
            }
        }

        // Advance in-flight PE windows and resolve any completions.
        let finished =
            self.pe_executor.advance(&mut self.queues, &mut self.pes, &mut self.clusters, &mut self.dtpm, self.trace.as_mut(), &self.config, now)?;
        for completion in &finished {
            self.cumulative_energy_j += completion.cumulative_energy_delta;
            let is_tail = self.queues.task(completion.task_id).tail;
            resolve_completion(
                &mut self.queues,
                &self.catalog,
                &self.bandwidth,
                self.config.communication_mode,
                self.memory_pe,
                completion.task_id,
                now,
            );
            if is_tail {
                // A snippet is `snippet_size` jobs, not one (spec.md
                // glossary "Snippet"); `id_exec` only advances — and the
                // per-PE/per-cluster snippet accounting only resets — once
                // that many post-warmup jobs have completed, matching
                // `processing_element.py`'s `completed_jobs % snippet_size
                // == 0` guard around its `snippet_ID_exec += 1`.
                if now >= self.config.warmup_period {
                    self.snippet.completed_jobs += 1;
                    if self.snippet.completed_jobs % self.config.snippet_size.max(1) == 0 {
                        self.snippet.id_exec += 1;
                        self.rotate_snippet();
                    }
                }
                if self.config.inject_jobs_asap {
                    self.job_generator.inject_asap(now);
                }
            }
        }

        prune_completed_queue(&mut self.queues, self.config.completed_queue_prune_mode, self.config.completed_queue_prune_span);

        // Job injection: at most one new job admitted per tick.
        let live = self.live_job_count();
        if let Some((job_id, app_id)) =
            self.job_generator.maybe_inject(now, &self.config, &self.catalog, &mut self.queues, &mut self.ids, &mut self.snippet, live)?
        {
            self.arrival_order.push((job_id, app_id));
        }

        // Step 6: timeout `simulation_clk`.
        self.now += self.config.simulation_clk;
        Ok(())
    }

    fn rotate_snippet(&mut self) {
        for pe in &mut self.pes {
            pe.snippet_energy = 0.0;
        }
        for cluster in &mut self.clusters {
            cluster.snippet_power_list.clear();
            cluster.snippet_num_tasks_list.clear();
        }
    }

    /// Run until [`Self::is_done`], returning the number of ticks executed.
    ///
    /// # Errors
    /// Propagates the first error any [`Self::step`] call returns.
    pub fn run(&mut self) -> Result<u64, EngineError> {
        let mut ticks = 0u64;
        while !self.is_done() {
            self.step()?;
            ticks += 1;
        }
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_generator::JobGeneratorConfig;
    use soc_types::{Application, ClusterId, DvfsMode, Opp, PeKind, TaskTemplate};

    fn solo_app() -> Application {
        let templates = vec![TaskTemplate::new("work", 0, vec![]).as_head().as_tail()];
        Application::new("solo", templates, vec![vec![0]]).unwrap()
    }

    fn single_pe_sim(max_num_jobs: u32) -> Simulation {
        let mut cluster = Cluster::new(ClusterId(0), "big", PeKind::Big, DvfsMode::Performance);
        cluster.opp = vec![Opp { freq_mhz: 1000, volt_mv: 1000 }];
        cluster.num_active_cores = 1;
        cluster.num_total_cores = 1;
        cluster.pe_list = vec![PeId(0)];

        let mut pe = Pe::new(PeId(0), ClusterId(0), "big_0", PeKind::Big, 1);
        pe.supported_functionalities.push("work".to_string());
        pe.performance.push(10.0);

        let mut catalog = ApplicationCatalog::new();
        catalog.push(solo_app());

        let bandwidth = BandwidthMatrix::new(2, 1.0, 1.0);

        let mut config = SimConfig::default();
        config.max_num_jobs = max_num_jobs;
        config.sampling_rate = 1000;
        config.simulation_length = 5000;

        let generator = JobGenerator::new(
            JobGeneratorConfig::default(),
            ChaCha8Rng::seed_from_u64(config.selection_seed),
            ChaCha8Rng::seed_from_u64(config.interarrival_seed),
        );

        let dtpm_config = DtpmConfig {
            sampling_rate: config.sampling_rate,
            sampling_rate_temperature: config.sampling_rate_temperature,
            util_high_threshold: config.util_high_threshold,
            util_low_threshold: config.util_low_threshold,
            warmup_period: config.warmup_period,
            trip_points: vec![],
            dtpm_trip_points: vec![],
            enable_throttling: false,
            enable_dtpm_throttling: false,
        };

        Simulation::new(
            config,
            vec![pe],
            vec![cluster],
            catalog,
            bandwidth,
            PeId(1),
            soc_scheduler::registry::build("CPU_only").unwrap(),
            generator,
            Box::new(soc_trace::NullSink),
            dtpm_config,
        )
    }

    #[test]
    fn single_task_job_runs_to_completion() {
        let mut sim = single_pe_sim(1);
        sim.run().unwrap();
        assert_eq!(sim.queues.list(QueueKind::Completed).len(), 1);
        assert!(sim.pes[0].idle);
    }

    #[test]
    fn run_is_deterministic_across_two_identical_configurations() {
        let mut a = single_pe_sim(1);
        let mut b = single_pe_sim(1);
        a.run().unwrap();
        b.run().unwrap();
        assert_eq!(a.now, b.now);
        assert_eq!(a.pes[0].total_energy, b.pes[0].total_energy);
    }
}
