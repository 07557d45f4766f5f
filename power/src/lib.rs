//! # Power and thermal numerics
//!
//! Static/dynamic power formulas, Cdyn·α extraction from profiled power
//! tables, operating-point stepping, and the linear thermal/throttling
//! model (spec.md §4.7, §4.6's numeric core). Pure functions over
//! `soc-types` records; no simulation-time bookkeeping lives here (that is
//! `soc-dtpm`'s job — this crate only computes, it does not decide *when*
//! to recompute).

#![warn(missing_docs)]

pub mod constants;
pub mod dynamic_power;
pub mod error;
pub mod opp;
pub mod static_power;
pub mod thermal;

pub use dynamic_power::{dynamic_power, extract_cdyn_alpha, lookup_profiled_power};
pub use error::PowerError;
pub use opp::compute_dvfs_performance_slowdown;
pub use static_power::{freq_hz, static_power, volt_v};
pub use thermal::{apply_trip_cap, b_column, evaluate_throttling, predict_temperature, ThrottleDecision, TripPoint};
