//! Dense, `Copy` identifiers used as the only cross-reference mechanism
//! between arenas (`Vec<Task>`, `Vec<Pe>`, `Vec<Cluster>`, `Vec<Job>`).
//!
//! Unlike the host framework's `ThreadId`/`ProcessId` (which mint values
//! from a process-wide `static AtomicU64`), these are produced by an
//! [`IdGen`] owned by the `Simulation` context, so id allocation is part of
//! the deterministic, single-writer-per-tick state rather than a hidden
//! global counter.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! dense_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// The sentinel used where the original leaves a field `-1` until assigned.
            pub const UNASSIGNED: Self = Self(u32::MAX);

            /// Whether this id has been assigned a real value.
            #[must_use]
            pub fn is_assigned(self) -> bool {
                self != Self::UNASSIGNED
            }

            /// The raw index value, for use as a `Vec` index.
            #[must_use]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::UNASSIGNED
            }
        }
    };
}

dense_id!(TaskId, "Globally unique id of a task instance within a run.");
dense_id!(JobId, "Globally unique id of a job (DAG instance) within a run.");
dense_id!(PeId, "Dense id of a processing element within the SoC.");
dense_id!(ClusterId, "Dense id of a cluster within the SoC.");
dense_id!(AppId, "Dense id of an application template in the catalog.");

/// Monotone id allocator for task and job instances.
///
/// One lives on the `Simulation` context (`soc-engine`); tests construct a
/// fresh one per case, satisfying the "no hidden globals" design note.
#[derive(Debug, Default, Clone)]
pub struct IdGen {
    next_task: u32,
    next_job: u32,
}

impl IdGen {
    /// Create a fresh allocator starting both counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a contiguous block of `count` task ids, returning the first.
    /// Job generator instantiation offsets every task template's `base_ID`
    /// by this value (spec: `ID = base_ID + offset_of_job`).
    pub fn alloc_task_block(&mut self, count: u32) -> TaskId {
        let first = self.next_task;
        self.next_task += count;
        TaskId(first)
    }

    /// Allocate the next job id.
    pub fn alloc_job(&mut self) -> JobId {
        let id = self.next_job;
        self.next_job += 1;
        JobId(id)
    }
}
