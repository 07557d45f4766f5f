//! Trace sink port and CSV reference sink.
//!
//! Defines the six record shapes a SoC simulation emits (tasks, frequency,
//! PE evaluations, temperature, load, system summary) and the [`TraceSink`]
//! trait any consumer implements. [`CsvTraceSink`] is the reference
//! implementation, writing one append-only CSV file per record kind with a
//! header emitted on first write, matching `DASH_Sim_utils.py`'s trace
//! functions. Engines that don't want a trace file use [`NullSink`].

#![warn(missing_docs)]

mod csv_sink;
mod error;
mod records;
mod sink;

pub use csv_sink::{CsvTraceSink, TraceFlags};
pub use error::TraceError;
pub use records::{
    FrequencyTraceRecord, LoadTraceRecord, PeTraceRecord, SystemTraceRecord, TaskTraceRecord, TemperatureTraceRecord,
};
pub use sink::{NullSink, TraceSink};
