//! The job generator: injects new job instances into Outstanding/Ready on a
//! configurable schedule (spec.md §4.2).
//!
//! Grounded on `original_source/job_generator.py`'s `run()` coroutine,
//! translated from a SimPy generator into a per-tick `maybe_inject` call the
//! `Simulation` event loop drives directly — no coroutine runtime is
//! involved (spec.md §9's "single-threaded event loop" redesign flag).
//!
//! One deliberate simplification from the original: `job_generator.py`
//! reseeds `np.random` to `common.iteration` at every snippet boundary. That
//! is an artifact of sharing one global RNG across unrelated call sites; it
//! has no equivalent once job selection and inter-arrival timing are their
//! own independently seeded streams (spec.md §4.2's "a separate,
//! reproducibly seeded stream"), so it is not reproduced here.

use crate::error::EngineError;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use soc_types::{AppId, Application, ApplicationCatalog, IdGen, JobId, QueueKind, TaskInstance, TaskQueues};

/// Per-snippet injection quotas (`job_list[snippet][app]`) or, absent that,
/// flat selection weights (`job_probabilities[app]`). Mirrors the
/// `job_list`/`job_probabilities` pair threaded through
/// `original_source/common.py`'s module globals.
#[derive(Debug, Clone, Default)]
pub struct JobGeneratorConfig {
    /// Per-snippet, per-application target injection counts. `None` means
    /// the generator always falls back to `job_probabilities`.
    pub job_list: Option<Vec<Vec<u32>>>,
    /// Flat selection weights over the catalog, used whenever `job_list` is
    /// absent or its current snippet's quotas are already met.
    pub job_probabilities: Option<Vec<f64>>,
}

/// Tracks which snippet is being injected versus which snippet has finished
/// executing (spec.md §4.2 "Snippet gating"; §4.5 step 7 advances `id_exec`
/// on tail completion).
#[derive(Debug, Clone, Default)]
pub struct SnippetState {
    /// Index of the snippet currently being injected into.
    pub id_inj: i64,
    /// Index of the most recently fully-executed snippet.
    pub id_exec: i64,
    /// Per-application counts injected so far within the current snippet.
    pub job_counter: Vec<u32>,
    /// Running count of post-warmup tail-task completions, i.e. completed
    /// jobs (`processing_element.py`'s `common.results.completed_jobs`).
    /// `id_exec` only advances once this reaches a multiple of
    /// `snippet_size`, since a snippet is `snippet_size` jobs, not one.
    pub completed_jobs: u32,
}

impl SnippetState {
    /// Whether injection should stall: the injector has moved past what
    /// execution has finished catching up on.
    #[must_use]
    pub fn gated(&self) -> bool {
        self.id_inj > self.id_exec
    }
}

/// Drives job instantiation: selection, inter-arrival timing, and routing
/// new tasks into Outstanding or Ready.
#[derive(Debug)]
pub struct JobGenerator {
    config: JobGeneratorConfig,
    selection_rng: ChaCha8Rng,
    interarrival_rng: ChaCha8Rng,
    next_arrival_at: i64,
    jobs_injected: u32,
    exhausted: bool,
}

impl JobGenerator {
    /// Construct a generator seeded from `selection_rng`/`interarrival_rng`,
    /// ready to inject its first job at `t=0`.
    #[must_use]
    pub fn new(config: JobGeneratorConfig, selection_rng: ChaCha8Rng, interarrival_rng: ChaCha8Rng) -> Self {
        Self {
            config,
            selection_rng,
            interarrival_rng,
            next_arrival_at: 0,
            jobs_injected: 0,
            exhausted: false,
        }
    }

    /// Whether the generator has stopped permanently
    /// (`simulation_mode == validation || inject_fixed_num_jobs`, and
    /// `max_num_jobs` has been reached; spec.md §4.2/§5).
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Collapse the inter-arrival wait to fire immediately, used when a tail
    /// task completes under `inject_jobs_asap` (spec.md §4.2 last paragraph).
    pub fn inject_asap(&mut self, now: i64) {
        self.next_arrival_at = self.next_arrival_at.min(now);
    }

    /// Called once per tick. Instantiates and routes at most one job if the
    /// parallelism cap, snippet gate, and inter-arrival timer all permit it.
    #[allow(clippy::too_many_arguments)]
    pub fn maybe_inject(
        &mut self,
        now: i64,
        config: &crate::config::SimConfig,
        catalog: &ApplicationCatalog,
        queues: &mut TaskQueues,
        ids: &mut IdGen,
        snippet: &mut SnippetState,
        live_jobs: u32,
    ) -> Result<Option<(JobId, AppId)>, EngineError> {
        if self.exhausted {
            return Ok(None);
        }
        if live_jobs >= config.max_jobs_in_parallel {
            return Ok(None);
        }
        if self.config.job_list.is_some() && snippet.gated() {
            return Ok(None);
        }
        if now < self.next_arrival_at {
            return Ok(None);
        }

        let selection = self.select(catalog, snippet)?;
        let app_id = AppId(selection as u32);
        let app = catalog.get(app_id);
        let job_id = self.instantiate(app, now, queues, ids);

        if snippet.job_counter.len() != catalog.len() {
            snippet.job_counter = vec![0; catalog.len()];
        }
        snippet.job_counter[selection] += 1;
        if let Some(job_list) = &self.config.job_list {
            if let Some(row) = job_list.get(snippet.id_inj as usize) {
                let satisfied = snippet.job_counter.iter().zip(row.iter()).all(|(have, want)| have >= want);
                if satisfied && self.jobs_injected < config.max_num_jobs {
                    snippet.id_inj += 1;
                    snippet.job_counter = vec![0; catalog.len()];
                }
            }
        }

        self.jobs_injected += 1;
        if (config.simulation_mode == crate::config::SimulationMode::Validation || config.inject_fixed_num_jobs)
            && self.jobs_injected >= config.max_num_jobs
        {
            self.exhausted = true;
        }

        self.next_arrival_at = now
            + if config.fixed_injection_rate {
                config.scale as i64
            } else {
                // Exponential(mean = scale) via inverse-CDF sampling.
                (-config.scale * (1.0 - self.interarrival_rng.gen::<f64>()).ln()) as i64
            };

        Ok(Some((job_id, app_id)))
    }

    fn select(&mut self, catalog: &ApplicationCatalog, snippet: &SnippetState) -> Result<usize, EngineError> {
        if let Some(job_list) = &self.config.job_list {
            if let Some(row) = job_list.get(snippet.id_inj as usize) {
                let have = if snippet.job_counter.len() == row.len() { &snippet.job_counter[..] } else { &[][..] };
                let valid: Vec<usize> = row
                    .iter()
                    .enumerate()
                    .filter(|(i, &want)| have.get(*i).copied().unwrap_or(0) < want)
                    .map(|(i, _)| i)
                    .collect();
                if !valid.is_empty() {
                    let idx = self.selection_rng.gen_range(0..valid.len());
                    return Ok(valid[idx]);
                }
            }
        }
        if let Some(probabilities) = &self.config.job_probabilities {
            let total: f64 = probabilities.iter().sum();
            let mut draw = self.selection_rng.gen::<f64>() * total;
            for (i, &p) in probabilities.iter().enumerate() {
                if draw < p {
                    return Ok(i);
                }
                draw -= p;
            }
            return Ok(probabilities.len().saturating_sub(1));
        }
        if catalog.is_empty() {
            return Err(EngineError::NoSelectionRule);
        }
        Ok(self.selection_rng.gen_range(0..catalog.len()))
    }

    fn instantiate(&self, app: &Application, now: i64, queues: &mut TaskQueues, ids: &mut IdGen) -> JobId {
        let job_id = ids.alloc_job();
        let offset = ids.alloc_task_block(app.len() as u32);
        for template in &app.task_list {
            let mut task = TaskInstance::from_template(template, job_id, &app.name, offset.0);
            task.job_start = now;
            if task.predecessors.is_empty() {
                queues.insert(task, QueueKind::Ready);
            } else {
                queues.insert(task, QueueKind::Outstanding);
            }
        }
        job_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use rand::SeedableRng;
    use soc_types::TaskTemplate;

    fn single_task_catalog() -> ApplicationCatalog {
        let templates = vec![TaskTemplate::new("a", 0, vec![]).as_head().as_tail()];
        let app = Application::new("solo", templates, vec![vec![0]]).unwrap();
        let mut catalog = ApplicationCatalog::new();
        catalog.push(app);
        catalog
    }

    #[test]
    fn injects_head_task_directly_into_ready() {
        let catalog = single_task_catalog();
        let mut generator = JobGenerator::new(JobGeneratorConfig::default(), ChaCha8Rng::seed_from_u64(0), ChaCha8Rng::seed_from_u64(1));
        let mut queues = TaskQueues::new();
        let mut ids = IdGen::new();
        let mut snippet = SnippetState::default();
        let config = SimConfig::default();

        let (job_id, _app_id) = generator
            .maybe_inject(0, &config, &catalog, &mut queues, &mut ids, &mut snippet, 0)
            .unwrap()
            .expect("should inject on first call");

        assert_eq!(queues.list(QueueKind::Ready).len(), 1);
        assert_eq!(queues.task(queues.list(QueueKind::Ready)[0]).job_id, job_id);
    }

    #[test]
    fn parallelism_cap_stalls_injection() {
        let catalog = single_task_catalog();
        let mut generator = JobGenerator::new(JobGeneratorConfig::default(), ChaCha8Rng::seed_from_u64(0), ChaCha8Rng::seed_from_u64(1));
        let mut queues = TaskQueues::new();
        let mut ids = IdGen::new();
        let mut snippet = SnippetState::default();
        let mut config = SimConfig::default();
        config.max_jobs_in_parallel = 0;

        let result = generator.maybe_inject(0, &config, &catalog, &mut queues, &mut ids, &mut snippet, 1).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn snippet_gate_stalls_injection_of_next_snippet() {
        let catalog = single_task_catalog();
        let config_gen = JobGeneratorConfig {
            job_list: Some(vec![vec![1], vec![1]]),
            job_probabilities: None,
        };
        let mut generator = JobGenerator::new(config_gen, ChaCha8Rng::seed_from_u64(0), ChaCha8Rng::seed_from_u64(1));
        let mut queues = TaskQueues::new();
        let mut ids = IdGen::new();
        let mut snippet = SnippetState::default();
        let mut config = SimConfig::default();
        config.max_num_jobs = 2;

        generator.maybe_inject(0, &config, &catalog, &mut queues, &mut ids, &mut snippet, 0).unwrap();
        assert_eq!(snippet.id_inj, 1);

        snippet.id_exec = 0;
        let result = generator
            .maybe_inject(config.scale as i64, &config, &catalog, &mut queues, &mut ids, &mut snippet, 0)
            .unwrap();
        assert!(result.is_none());
    }
}
