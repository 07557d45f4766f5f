//! `SimConfig`: every numeric/behavioral knob spec.md threads through prose,
//! gathered into one passed-by-reference struct per spec.md §9's "banish
//! hidden globals" instruction (generalizing `original_source/common.py`'s
//! module-level globals).

use serde::{Deserialize, Serialize};

/// Which communication model governs dependency readiness and data-transfer
/// latency (spec.md §3, §4.3, §4.5's "shared memory" vs "PE-to-PE" modes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationMode {
    /// Every transfer round-trips through a shared-memory write-back and
    /// read-in latency (`comm_vol / bandwidth[pe, memory]` each way).
    SharedMemory,
    /// Producers hand data directly to consumers
    /// (`comm_vol / bandwidth[pe_a, pe_b]`), skipping memory.
    PeToPe,
}

/// Whether the simulator is gathering full statistics from `t=0`
/// (`validation`) or only after `warmup_period` has elapsed (`performance`),
/// per spec.md §4.5 steps 3, 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationMode {
    /// Accumulate every counter immediately, ignoring `warmup_period`.
    Validation,
    /// Accumulate counters only once virtual time passes `warmup_period`.
    Performance,
}

/// Resolution of spec.md §9's completed-queue-pruning Open Question: the
/// original's `update_completed_queue` reads, on close inspection, as only
/// ever deleting the first list entry whose `jobID` matches the oldest live
/// job — not every entry of that job. Both behaviors are implemented and
/// selectable, per the explicit "do not guess — expose both... and test
/// against golden traces" instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletedQueuePruneMode {
    /// Literal parity with the original: drop only the first `Completed`
    /// entry belonging to the oldest live `jobID`.
    FirstMatchOnly,
    /// The corrected reading of spec.md §4.3 step 4's prose: drop every
    /// `Completed` entry belonging to the oldest live `jobID`.
    DropAllOfOldestJob,
}

/// Every numeric knob the engine needs, gathered into one struct so tests
/// construct a fresh, explicit configuration per case rather than reading
/// hidden globals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Virtual-time tick granularity, in µs (spec.md §4.1).
    pub simulation_clk: i64,
    /// Virtual time at which the run terminates unconditionally
    /// (spec.md §4.1/§5: `now > simulation_length`).
    pub simulation_length: i64,
    /// DTPM/utilization sampling period, in µs.
    pub sampling_rate: i64,
    /// Temperature sampling period, in µs (a multiple of `sampling_rate`).
    pub sampling_rate_temperature: i64,
    /// Upper `ondemand` utilization threshold.
    pub util_high_threshold: f64,
    /// Lower `ondemand` utilization threshold.
    pub util_low_threshold: f64,
    /// Virtual time before which samples are not accumulated into results
    /// (ignored entirely in [`SimulationMode::Validation`]).
    pub warmup_period: i64,
    /// Ceiling on the number of simultaneously live jobs
    /// (spec.md §4.2: "stall" when reached).
    pub max_jobs_in_parallel: u32,
    /// Target job count for `inject_fixed_num_jobs`/validation termination.
    pub max_num_jobs: u32,
    /// Whether inter-arrival is exactly `scale` (`true`) or exponential with
    /// mean `scale` (`false`), spec.md §4.2.
    pub fixed_injection_rate: bool,
    /// Inter-arrival scale, in µs.
    pub scale: f64,
    /// Whether the generator stops after `max_num_jobs`, independent of
    /// `simulation_mode` (spec.md §5).
    pub inject_fixed_num_jobs: bool,
    /// Whether a completed tail task interrupts the generator's
    /// inter-arrival wait to collapse idle time (spec.md §4.2 last paragraph).
    pub inject_jobs_asap: bool,
    /// Number of jobs per snippet, used for energy/temperature accounting
    /// rotation (spec.md §4.5 step 7, glossary "Snippet").
    pub snippet_size: u32,
    /// Collection mode (spec.md §4.5 steps 3, 8).
    pub simulation_mode: SimulationMode,
    /// Dependency/communication model (spec.md §3, §4.3).
    pub communication_mode: CommunicationMode,
    /// Completed-queue pruning behavior (spec.md §9 Open Question).
    pub completed_queue_prune_mode: CompletedQueuePruneMode,
    /// Live-`jobID`-span bound that triggers completed-queue pruning
    /// (spec.md §4.3 step 4: "exceeds 15", made a configured constant per
    /// spec.md §9).
    pub completed_queue_prune_span: i64,
    /// Whether the regular thermal trip-point table is active.
    pub enable_throttling: bool,
    /// Whether the DTPM-specific thermal trip-point table is active.
    pub enable_dtpm_throttling: bool,
    /// PRNG seed for the job-selection stream (spec.md §4.2).
    pub selection_seed: u64,
    /// PRNG seed for the inter-arrival stream, kept independent of
    /// `selection_seed` so either can be replayed without perturbing the
    /// other (spec.md §4.2: "a separate, reproducibly seeded stream").
    pub interarrival_seed: u64,
}

impl Default for SimConfig {
    /// Conservative defaults matching `original_source/common.py`'s
    /// module-level defaults where it has one, chosen so a demo binary can
    /// construct a runnable configuration without naming every field.
    fn default() -> Self {
        Self {
            simulation_clk: 1,
            simulation_length: 1_000_000,
            sampling_rate: 1000,
            sampling_rate_temperature: 1000,
            util_high_threshold: 0.8,
            util_low_threshold: 0.2,
            warmup_period: 0,
            max_jobs_in_parallel: 10,
            max_num_jobs: 1,
            fixed_injection_rate: true,
            scale: 1000.0,
            inject_fixed_num_jobs: true,
            inject_jobs_asap: false,
            snippet_size: 1,
            simulation_mode: SimulationMode::Performance,
            communication_mode: CommunicationMode::SharedMemory,
            completed_queue_prune_mode: CompletedQueuePruneMode::FirstMatchOnly,
            completed_queue_prune_span: 15,
            enable_throttling: false,
            enable_dtpm_throttling: false,
            selection_seed: 0,
            interarrival_seed: 1,
        }
    }
}
