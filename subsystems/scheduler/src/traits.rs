//! The `Scheduler` port and the borrowed view it operates over.
//!
//! Generalized from the host framework's
//! `subsystems/execution/src/scheduler/traits.rs` `pub trait Scheduler: Send
//! + Sync`: that trait picks a thread to run on a CPU from mutable shared
//! state reached through `&self`; this one assigns ready tasks to PEs from
//! an explicit, borrowed [`AssignCtx`] instead, since the engine (not a
//! process-wide singleton) owns every arena a scheduler touches.

use crate::error::SchedulerError;
use soc_types::{AppId, ApplicationCatalog, BandwidthMatrix, Cluster, JobId, Pe, PeId, TaskId, TaskInstance, TaskQueues};

/// The borrowed view a [`Scheduler`] assignment pass operates over: the
/// current virtual time, the list of ready task ids, and read/write access
/// to the arenas it may consult or update.
///
/// Bundled into one struct (rather than the teacher-shaped `assign(ready,
/// now, PEs, resource_matrix, jobs)` positional signature) so the trait
/// stays object-safe and new fields can be added without breaking every
/// implementation.
pub struct AssignCtx<'a> {
    /// Current virtual time.
    pub now: i64,
    /// Ids of tasks currently in the Ready queue, in stable insertion order.
    pub ready: &'a [TaskId],
    /// Task instances, for field updates (`pe_id`, `order`, `dynamic_dependencies`).
    pub queues: &'a mut TaskQueues,
    /// Processing elements, for load/availability lookups and EFT bookkeeping.
    pub pes: &'a mut [Pe],
    /// Clusters, for DVFS-aware performance lookups.
    pub clusters: &'a [Cluster],
    /// PE-to-PE / PE-to-memory bandwidth matrix.
    pub bandwidth: &'a BandwidthMatrix,
    /// Application templates, for table-driven `task_sched_ID` computation.
    pub app_catalog: &'a ApplicationCatalog,
    /// Live jobs' ids paired with the catalog id of their application,
    /// in arrival order. Maintained by the engine as jobs are admitted and
    /// retired; table-driven schedulers use it to compute `task_sched_ID`
    /// (spec.md §4.4.2).
    pub arrival_order: &'a [(JobId, AppId)],
}

impl<'a> AssignCtx<'a> {
    /// Mutable access to a ready task's instance by id.
    pub fn task_mut(&mut self, id: TaskId) -> &mut TaskInstance {
        self.queues.task_mut(id)
    }

    /// Read-only access to a task's instance by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> &TaskInstance {
        self.queues.task(id)
    }

    /// Iterate the PEs able to execute `task_name`, pairing each with its
    /// `performance` (runtime in µs at max frequency).
    pub fn eligible_pes<'b>(&'b self, task_name: &'b str) -> impl Iterator<Item = (PeId, f64)> + 'b {
        self.pes.iter().filter_map(move |pe| pe.performance_for(task_name).map(|perf| (pe.id, perf)))
    }

    /// Assign `task_id` to `pe_id`, the one mutation every scheduler
    /// performs to satisfy the port's post-condition (spec.md §4.4).
    pub fn assign_pe(&mut self, task_id: TaskId, pe_id: PeId) {
        self.task_mut(task_id).pe_id = pe_id;
    }
}

/// A pluggable task-to-PE assignment policy.
///
/// Post-condition (spec.md §4.4): after [`Scheduler::assign`] returns, every
/// task named in `ctx.ready` at call time has a `pe_id` pointing at a PE
/// whose `supported_functionalities` contains the task's name. A scheduler
/// may additionally set `order` (per-PE ordinal) and append to a task's
/// `dynamic_dependencies`. Schedulers are stateless across invocations
/// except through tables/state the caller explicitly threads back in via
/// `ctx` (e.g. `Pe::available_time`) — never through fields on `Self`,
/// which is why every method here takes `&self`, not `&mut self` (matching
/// the host framework's own `Scheduler: Send + Sync` shape, dispatched
/// through `Arc<dyn Scheduler>`).
pub trait Scheduler: Send + Sync {
    /// Scheduler name, used in configuration, logs, and trace output.
    fn name(&self) -> &str;

    /// Whether the event loop should return this scheduler's Executable
    /// tasks to Ready every tick (spec.md §4.4.3), rather than leaving an
    /// assignment in place until the PE executor consumes it.
    fn reassigns_every_tick(&self) -> bool {
        false
    }

    /// Assign every task named in `ctx.ready` to an eligible PE.
    ///
    /// # Errors
    /// Returns [`SchedulerError::NoEligiblePe`] if a ready task has no PE
    /// supporting its functionality; table-driven implementations may also
    /// return [`SchedulerError::TableEntryMissing`] or
    /// [`SchedulerError::TablePeUnknown`].
    fn assign(&self, ctx: &mut AssignCtx<'_>) -> Result<(), SchedulerError>;
}
