//! Application (DAG) templates and the communication-volume matrix.
//!
//! Grounded on `original_source/common.py`'s `Tasks`/`Applications` classes;
//! `comm_vol` is a square matrix of bits, producer row by consumer column.

use crate::ids::AppId;
use crate::TypesError;

/// A task as it appears in an application template, before any job
/// instantiates it. Identified within its DAG by `base_id`, 0..n-1.
#[derive(Debug, Clone)]
pub struct TaskTemplate {
    /// Functionality name; matched against `Pe::supported_functionalities`.
    pub name: String,
    /// Dense index of this task within its DAG, 0..n-1.
    pub base_id: u32,
    /// Predecessor task `base_id`s within the same DAG.
    pub predecessors: Vec<u32>,
    /// True if this task has no predecessors (the DAG source).
    pub head: bool,
    /// True if this task has no successors (the DAG sink).
    pub tail: bool,
    /// Input packet size in bits, used by the communication model.
    pub input_packet_size: i64,
    /// Output packet size in bits, used by the communication model.
    pub output_packet_size: i64,
}

impl TaskTemplate {
    /// Construct a non-head, non-tail task template.
    #[must_use]
    pub fn new(name: impl Into<String>, base_id: u32, predecessors: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            base_id,
            predecessors,
            head: false,
            tail: false,
            input_packet_size: -1,
            output_packet_size: -1,
        }
    }

    /// Mark this template as the DAG's head (no predecessors).
    #[must_use]
    pub fn as_head(mut self) -> Self {
        self.head = true;
        self
    }

    /// Mark this template as the DAG's tail (no successors).
    #[must_use]
    pub fn as_tail(mut self) -> Self {
        self.tail = true;
        self
    }
}

/// An application template: an ordered task list plus its communication
/// volume matrix. One instance is deep-copied per job by the generator.
#[derive(Debug, Clone)]
pub struct Application {
    /// Application name, matched against job-list/probability configuration.
    pub name: String,
    /// Task templates, ordered by `base_id`.
    pub task_list: Vec<TaskTemplate>,
    /// `comm_vol[i][j]`: bits transferred from task `i` to task `j`.
    /// Invariant (spec.md §3): non-zero implies `i` is a predecessor of `j`.
    comm_vol: Vec<Vec<u64>>,
}

impl Application {
    /// Build an application from its task list and communication matrix,
    /// validating the precedence/comm_vol invariant.
    pub fn new(
        name: impl Into<String>,
        task_list: Vec<TaskTemplate>,
        comm_vol: Vec<Vec<u64>>,
    ) -> Result<Self, TypesError> {
        let n = task_list.len();
        if comm_vol.len() != n || comm_vol.iter().any(|row| row.len() != n) {
            return Err(TypesError::CommVolShapeMismatch {
                expected: n,
                got: comm_vol.len(),
            });
        }
        for (j, task) in task_list.iter().enumerate() {
            for i in 0..n {
                if comm_vol[i][j] > 0 && !task.predecessors.contains(&(i as u32)) {
                    return Err(TypesError::CommVolWithoutPrecedence { from: i as u32, to: j as u32 });
                }
            }
        }
        let heads = task_list.iter().filter(|t| t.head).count();
        let tails = task_list.iter().filter(|t| t.tail).count();
        if heads == 0 || tails == 0 {
            return Err(TypesError::MissingHeadOrTail { name: name.into() });
        }
        Ok(Self { name: name.into(), task_list, comm_vol })
    }

    /// Communication volume in bits from task `from` to task `to` (by `base_id`).
    #[must_use]
    pub fn comm_vol(&self, from: u32, to: u32) -> u64 {
        self.comm_vol[from as usize][to as usize]
    }

    /// Number of tasks in this application's DAG.
    #[must_use]
    pub fn len(&self) -> usize {
        self.task_list.len()
    }

    /// Whether this application has no tasks (always false for a valid one).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.task_list.is_empty()
    }
}

/// The catalog of application templates available for job generation,
/// indexed by dense [`AppId`].
#[derive(Debug, Clone, Default)]
pub struct ApplicationCatalog {
    apps: Vec<Application>,
}

impl ApplicationCatalog {
    /// Construct an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application template, returning its dense id.
    pub fn push(&mut self, app: Application) -> AppId {
        let id = AppId(self.apps.len() as u32);
        self.apps.push(app);
        id
    }

    /// Look up an application template by id.
    #[must_use]
    pub fn get(&self, id: AppId) -> &Application {
        &self.apps[id.index()]
    }

    /// Number of registered application templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Whether the catalog has no registered templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Iterate over all application templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Application> {
        self.apps.iter()
    }
}
