//! Processing elements (PEs): single compute slots in the SoC.

use crate::ids::{ClusterId, PeId};

/// Resource type, matching the SoC descriptor's `type` token (spec.md §3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeKind {
    /// Big out-of-order core.
    Big,
    /// Little in-order core.
    Little,
    /// Fixed-function accelerator.
    Acc,
    /// Generic CPU core (used by the `CPU_only` heuristic).
    Cpu,
    /// Shared memory; excluded from scheduling.
    Mem,
    /// Cache; excluded from scheduling and from the CP oracle.
    Cac,
    /// GPU.
    Gpu,
}

impl PeKind {
    /// Whether this kind participates in task scheduling (MEM and cache do not).
    #[must_use]
    pub fn is_schedulable(self) -> bool {
        !matches!(self, PeKind::Mem | PeKind::Cac)
    }
}

/// Passive placement metadata carried through from a `mesh_information` SoC
/// descriptor line. Never consulted by any in-scope logic; present only so
/// a future Gantt/mesh visualizer has somewhere to read it from.
#[derive(Debug, Clone)]
pub struct MeshPlacement {
    /// Mesh tile name.
    pub mesh_name: String,
    /// Mesh position label.
    pub position: String,
    /// Tile height.
    pub height: String,
    /// Tile width.
    pub width: String,
    /// Tile color (for plotting).
    pub color: String,
}

/// A single processing element: one compute slot, a member of exactly one cluster.
#[derive(Debug, Clone)]
pub struct Pe {
    /// Dense, globally unique id.
    pub id: PeId,
    /// Cluster this PE belongs to.
    pub cluster_id: ClusterId,
    /// Resource name (as assembled by the SoC loader, e.g. `"big_0"`).
    pub name: String,
    /// Resource type.
    pub kind: PeKind,
    /// Maximum number of concurrent task slots.
    pub capacity: u32,
    /// Task names this PE can execute.
    pub supported_functionalities: Vec<String>,
    /// Runtime in µs at max frequency, parallel to `supported_functionalities`.
    pub performance: Vec<f64>,
    /// Whether this PE currently has zero occupied slots.
    pub idle: bool,
    /// Number of currently occupied slots (<= capacity).
    pub busy_slots: u32,
    /// Rolling utilization over the last sampling window, in `[0,1]`.
    pub utilization: f64,
    /// Bounded vector of recent (start, finish) pairs intersecting the
    /// sampling window, used for the `PEs` trace record (spec.md §6).
    pub info: Vec<i64>,
    /// Optional mesh placement, passed through unexamined.
    pub mesh: Option<MeshPlacement>,
    /// Cumulative earliest-available virtual time, maintained by
    /// finish-time-aware schedulers (EFT/ETF/ETF_LB) across invocations.
    pub available_time: i64,
    /// Post-warmup samples of `utilization`, appended once per DTPM
    /// evaluation (spec.md §4.6).
    pub utilization_list: Vec<f64>,
    /// Current per-core leakage (static) power, refreshed by DTPM's idle
    /// evaluation (spec.md §4.6).
    pub current_leakage_core: f64,
    /// Energy accumulated since the last snippet rotation, in joules.
    pub snippet_energy: f64,
    /// Energy accumulated since the start of the run, in joules.
    pub total_energy: f64,
}

impl Pe {
    /// Construct an idle PE with no supported functionalities yet.
    #[must_use]
    pub fn new(id: PeId, cluster_id: ClusterId, name: impl Into<String>, kind: PeKind, capacity: u32) -> Self {
        Self {
            id,
            cluster_id,
            name: name.into(),
            kind,
            capacity,
            supported_functionalities: Vec::new(),
            performance: Vec::new(),
            idle: true,
            busy_slots: 0,
            utilization: 0.0,
            info: Vec::new(),
            mesh: None,
            available_time: 0,
            utilization_list: Vec::new(),
            current_leakage_core: 0.0,
            snippet_energy: 0.0,
            total_energy: 0.0,
        }
    }

    /// Runtime in µs at max frequency for `task_name`, if supported.
    #[must_use]
    pub fn performance_for(&self, task_name: &str) -> Option<f64> {
        self.supported_functionalities
            .iter()
            .position(|n| n == task_name)
            .map(|idx| self.performance[idx])
    }

    /// Whether this PE has a free slot to accept another task.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.busy_slots < self.capacity
    }

    /// Occupy one slot, flipping `idle` false.
    pub fn occupy_slot(&mut self) {
        self.busy_slots += 1;
        self.idle = false;
    }

    /// Release one slot, flipping `idle` true once no slots remain busy.
    pub fn release_slot(&mut self) {
        self.busy_slots = self.busy_slots.saturating_sub(1);
        self.idle = self.busy_slots == 0;
    }
}
