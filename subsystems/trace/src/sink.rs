//! The trace sink port (spec.md §1: "a trace sink port; only its event
//! vocabulary is defined"). Any consumer (CSV writer, Gantt plotter, a test
//! spy) implements this trait; the simulator never writes files directly.

use crate::error::TraceError;
use crate::records::{
    FrequencyTraceRecord, LoadTraceRecord, PeTraceRecord, SystemTraceRecord, TaskTraceRecord, TemperatureTraceRecord,
};

/// Structured event sink for the six trace record kinds (spec.md §6).
///
/// Each method is a no-op for sinks that do not care about that record kind
/// (the CSV reference sink gates each on its own enable flag, matching the
/// original's per-file `TRACE_*` booleans); callers should not skip calling
/// a method based on their own guess of whether it is enabled.
pub trait TraceSink {
    /// Record one finished task (spec.md §6 `tasks`).
    fn record_task(&mut self, record: TaskTraceRecord) -> Result<(), TraceError>;

    /// Record one cluster frequency change (spec.md §6 `frequency`).
    fn record_frequency(&mut self, record: FrequencyTraceRecord) -> Result<(), TraceError>;

    /// Record one PE evaluation (spec.md §6 `PEs`).
    fn record_pe(&mut self, record: PeTraceRecord) -> Result<(), TraceError>;

    /// Record one temperature sample (spec.md §6 `temperature`).
    fn record_temperature(&mut self, record: TemperatureTraceRecord) -> Result<(), TraceError>;

    /// Record one load sample (spec.md §6 `load`).
    fn record_load(&mut self, record: LoadTraceRecord) -> Result<(), TraceError>;

    /// Record the once-per-run system summary (spec.md §6 `system`).
    fn record_system(&mut self, record: SystemTraceRecord) -> Result<(), TraceError>;
}

/// A sink that discards every record. Used where no trace file is wanted
/// (e.g. unit tests of the engine that only care about queue/energy state).
#[derive(Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record_task(&mut self, _record: TaskTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }

    fn record_frequency(&mut self, _record: FrequencyTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }

    fn record_pe(&mut self, _record: PeTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }

    fn record_temperature(&mut self, _record: TemperatureTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }

    fn record_load(&mut self, _record: LoadTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }

    fn record_system(&mut self, _record: SystemTraceRecord) -> Result<(), TraceError> {
        Ok(())
    }
}
