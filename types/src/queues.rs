//! The task-queue state machine (spec.md §3): Outstanding → WaitReady →
//! Ready → Executable → Running → Completed.
//!
//! Grounded on `original_source/common.py`'s `TaskQueues` class (six
//! parallel Python lists). Here the six lists are kept, plus a `states`
//! side table indexed by `TaskId` giving each task's current queue in O(1),
//! which is what makes the "exactly one queue" invariant (spec.md §8)
//! structural rather than merely asserted: moving a task calls
//! [`TaskQueues::transfer`], which cannot leave a task in two lists at once.

use crate::ids::TaskId;
use crate::task::TaskInstance;
use std::collections::HashMap;

/// Which of the six queues a task currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// Has unresolved predecessors.
    Outstanding,
    /// Predecessors done; write-back latency has not yet elapsed.
    WaitReady,
    /// Eligible for scheduler assignment.
    Ready,
    /// Assigned a PE; waiting for read-in/PE-to-PE latency.
    Executable,
    /// Held by a PE's internal slot.
    Running,
    /// Terminal.
    Completed,
}

/// Owns every live (and recently completed) task instance plus the six
/// queues as ordered lists of [`TaskId`]. Insertion order within a queue is
/// preserved (spec.md §4.1: "iteration over queues uses a stable order").
#[derive(Debug, Default)]
pub struct TaskQueues {
    tasks: HashMap<TaskId, TaskInstance>,
    outstanding: Vec<TaskId>,
    wait_ready: Vec<TaskId>,
    ready: Vec<TaskId>,
    executable: Vec<TaskId>,
    running: Vec<TaskId>,
    completed: Vec<TaskId>,
    states: HashMap<TaskId, QueueKind>,
}

impl TaskQueues {
    /// Construct an empty queue set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, kind: QueueKind) -> &mut Vec<TaskId> {
        match kind {
            QueueKind::Outstanding => &mut self.outstanding,
            QueueKind::WaitReady => &mut self.wait_ready,
            QueueKind::Ready => &mut self.ready,
            QueueKind::Executable => &mut self.executable,
            QueueKind::Running => &mut self.running,
            QueueKind::Completed => &mut self.completed,
        }
    }

    /// Read-only view of a queue's contents, in insertion order.
    #[must_use]
    pub fn list(&self, kind: QueueKind) -> &[TaskId] {
        match kind {
            QueueKind::Outstanding => &self.outstanding,
            QueueKind::WaitReady => &self.wait_ready,
            QueueKind::Ready => &self.ready,
            QueueKind::Executable => &self.executable,
            QueueKind::Running => &self.running,
            QueueKind::Completed => &self.completed,
        }
    }

    /// Insert a newly created task instance into `kind` (normally
    /// `Outstanding` or `Ready`, per the Job Generator's routing rule).
    pub fn insert(&mut self, task: TaskInstance, kind: QueueKind) {
        let id = task.id;
        self.tasks.insert(id, task);
        self.states.insert(id, kind);
        self.list_mut(kind).push(id);
    }

    /// Which queue `id` currently occupies, if it is known to this set.
    #[must_use]
    pub fn state_of(&self, id: TaskId) -> Option<QueueKind> {
        self.states.get(&id).copied()
    }

    /// Immutable access to a task instance by id.
    #[must_use]
    pub fn task(&self, id: TaskId) -> &TaskInstance {
        &self.tasks[&id]
    }

    /// Mutable access to a task instance by id, for in-place field updates
    /// that do not change its queue membership.
    pub fn task_mut(&mut self, id: TaskId) -> &mut TaskInstance {
        self.tasks.get_mut(&id).expect("task id must be tracked")
    }

    /// Move `id` from its current queue into `to`. Panics if `id` is not in
    /// `from` — callers are expected to know a task's current queue from
    /// `state_of` before calling this, which keeps the "exactly one queue"
    /// invariant structural.
    pub fn transfer(&mut self, id: TaskId, from: QueueKind, to: QueueKind) {
        let list = self.list_mut(from);
        let pos = list.iter().position(|&t| t == id).expect("task must be in `from` queue");
        list.remove(pos);
        self.list_mut(to).push(id);
        self.states.insert(id, to);
    }

    /// Number of tasks currently tracked (any queue, including Completed).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no tasks have ever been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Remove a single completed task instance from the `Completed` list and
    /// backing map (used by the dependency resolver's pruning policy,
    /// spec.md §4.3 step 4 / §9). Removes only the first matching entry.
    pub fn prune_completed_first(&mut self, id: TaskId) {
        if let Some(pos) = self.completed.iter().position(|&t| t == id) {
            self.completed.remove(pos);
            self.tasks.remove(&id);
            self.states.remove(&id);
        }
    }

    /// Remove every `Completed` entry whose `job_id` equals `job_id` (the
    /// corrected reading of spec.md §4.3 step 4 — `DropAllOfOldestJob`,
    /// as opposed to [`Self::prune_completed_first`]'s literal parity with
    /// the original's single-entry-per-call behavior).
    pub fn prune_completed_job(&mut self, job_id: crate::ids::JobId) {
        let doomed: Vec<TaskId> = self
            .completed
            .iter()
            .copied()
            .filter(|&id| self.tasks[&id].job_id == job_id)
            .collect();
        for id in doomed {
            self.completed.retain(|&t| t != id);
            self.tasks.remove(&id);
            self.states.remove(&id);
        }
    }
}
