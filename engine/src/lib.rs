//! # SoC simulator engine
//!
//! Ties `soc-types`, `soc-power`, `soc-scheduler`, `soc-dtpm`, and
//! `soc-trace` together into a runnable discrete-event simulation: the job
//! generator, the dependency resolver, the communication model, the PE
//! executor, and the [`simulation::Simulation`] context that drives them
//! one tick at a time (spec.md §4).
//!
//! Grounded on `original_source/DASH_Sim_core.py`'s `run()` coroutine,
//! translated from SimPy's cooperative-coroutine scheduling into a single
//! stepped loop (spec.md §9's "single-threaded event loop" redesign flag) —
//! no other behavioral change is intended.

#![warn(missing_docs)]

pub mod communication;
pub mod config;
pub mod dependency_resolver;
pub mod error;
pub mod job_generator;
pub mod pe_executor;
pub mod runtime_model;
pub mod simulation;

pub use config::{CommunicationMode, CompletedQueuePruneMode, SimConfig, SimulationMode};
pub use error::EngineError;
pub use job_generator::{JobGenerator, JobGeneratorConfig, SnippetState};
pub use pe_executor::{CompletedExecution, PeExecutor};
pub use runtime_model::{MeanRuntimeModel, RuntimeModel};
pub use simulation::Simulation;
