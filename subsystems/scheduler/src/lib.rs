//! # Scheduler port
//!
//! Pluggable task-to-PE assignment: greedy heuristics, table-driven
//! (ILP-family) schedulers, and the constraint-programming oracle boundary
//! (spec.md §4.4). Generalized from the host framework's
//! `subsystems/execution/src/scheduler` trait shape, dispatched through
//! `Arc<dyn Scheduler>` rather than a process-wide singleton.

#![warn(missing_docs)]

pub mod cp;
pub mod error;
pub mod greedy;
pub mod registry;
pub mod table;
pub mod traits;

pub use cp::{CpRequest, CpResponse, EligibilityTriple, JobEntry, PreBakedCpOracle, PrecedenceTriple};
pub use error::SchedulerError;
pub use greedy::{CpuOnly, Eft, Etf, EtfLb, Met, Stf};
pub use registry::{build, build_cp_oracle, build_table_driven};
pub use table::{task_sched_id, TableDriven, TableEntry};
pub use traits::{AssignCtx, Scheduler};
