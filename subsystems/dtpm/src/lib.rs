//! Dynamic thermal/power management.
//!
//! Owns the per-tick evaluation guards, DVFS policy dispatch, and
//! trip-point throttling that turn PE utilization samples into frequency
//! changes and a temperature estimate. Pure power/thermal arithmetic lives
//! in `soc-power`; this crate decides *when* to call it and what state to
//! carry between calls, grounded on `original_source/DTPM.py` and
//! `DTPM_policies.py`.

#![warn(missing_docs)]

pub mod controller;
pub mod error;
pub mod policies;

pub use controller::{num_tasks_being_executed, DtpmConfig, DtpmController, IdleEnergySample};
pub use error::DtpmError;
pub use policies::{initialize_frequency, ondemand_policy};
