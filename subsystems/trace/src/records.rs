//! The six trace record shapes (spec.md §6), pinned one-for-one against
//! `original_source/DASH_Sim_utils.py`'s `trace_tasks`/`trace_frequency`/
//! `trace_PEs`/`trace_temperature`/`trace_load`/`trace_system` functions.

/// One row of the `tasks` trace: emitted by the PE executor when a task finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTraceRecord {
    /// The owning cluster's DVFS mode, as configured (e.g. `"ondemand"`).
    pub dvfs_mode: String,
    /// The task's globally unique id.
    pub task_id: u32,
    /// The owning cluster's name.
    pub cluster: String,
    /// Execution time in µs (`finish_time - start_time`).
    pub exec_time_us: i64,
    /// Total energy (static + dynamic) consumed by this task, in joules.
    pub energy_j: f64,
}

/// One row of the `frequency` trace: emitted on every cluster frequency
/// change (spec.md §6: `PE, Timestamp, Frequency`; the original names the
/// column `PE` but writes the cluster name into it).
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTraceRecord {
    /// Cluster name.
    pub pe: String,
    /// Virtual time of the change.
    pub timestamp: i64,
    /// New frequency, in MHz.
    pub frequency_mhz: u32,
}

/// One row of the `PEs` trace: emitted per DTPM PE evaluation, carrying the
/// bounded (start, finish) interval history intersecting the sampling window.
#[derive(Debug, Clone, PartialEq)]
pub struct PeTraceRecord {
    /// Virtual time of the evaluation.
    pub timestamp: i64,
    /// The PE's dense id.
    pub pe: u32,
    /// Up to 6 `(start, finish)` pairs (12 values), zero-padded, matching
    /// `update_PE_utilization_and_info`'s fixed-width `info` list.
    pub info: Vec<i64>,
}

/// One row of the `temperature` trace: emitted once per temperature sample
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureTraceRecord {
    /// Virtual time of the sample.
    pub timestamp: i64,
    /// Debug label for the currently active snippet's job-count list
    /// (the original writes `common.current_job_list` verbatim into this
    /// column; this crate stays agnostic of job-list shape and accepts
    /// whatever label the caller formats).
    pub snippet: String,
    /// Maximum hotspot temperature, in °C.
    pub t_max_c: f64,
    /// Current throttling state index (`-1` = not throttled).
    pub throttle_state: i32,
}

/// One row of the `load` trace: emitted once per DTPM sample, per cluster
/// (non-MEM) task counts plus the system total.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTraceRecord {
    /// Virtual time of the sample.
    pub timestamp: i64,
    /// Same snippet label as [`TemperatureTraceRecord::snippet`].
    pub snippet: String,
    /// Number of tasks currently executing, one entry per non-MEM cluster,
    /// in cluster-arena order.
    pub n_per_cluster: Vec<u32>,
    /// Total number of tasks currently executing across the whole SoC.
    pub n_total: u32,
}

/// The once-per-run `system` summary row.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemTraceRecord {
    /// Debug label of the job list used for this run.
    pub job_list: String,
    /// Per-cluster DVFS mode labels, in cluster-arena order.
    pub dvfs_modes: Vec<String>,
    /// Configured little-cluster capacity (task trace generation metadata).
    pub n_little: u32,
    /// Configured big-cluster capacity (task trace generation metadata).
    pub n_big: u32,
    /// Total execution time, in µs.
    pub exec_time_us: f64,
    /// Cumulative per-job execution time, in µs.
    pub cumulative_exec_time_us: f64,
    /// Total energy consumed, in joules.
    pub energy_j: f64,
    /// Energy-delay product: `energy_j * exec_time_us * 1e-6`
    /// (seconds), **\[ADDED per spec.md §6's "...energy, EDP"\]** —
    /// the original `trace_system` has no EDP column.
    pub edp_j_s: f64,
}
