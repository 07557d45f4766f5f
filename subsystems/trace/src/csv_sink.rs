//! CSV reference implementation of [`TraceSink`], append-only with a
//! header emitted only the first time a given trace file is written
//! (spec.md §6), one file per record kind, gated by [`TraceFlags`].

use crate::error::TraceError;
use crate::records::{
    FrequencyTraceRecord, LoadTraceRecord, PeTraceRecord, SystemTraceRecord, TaskTraceRecord, TemperatureTraceRecord,
};
use crate::sink::TraceSink;
use std::path::{Path, PathBuf};

/// Which of the six trace files are active for a run, mirroring the
/// original's per-file `TRACE_SYSTEM`/`TRACE_TASKS`/... booleans.
#[derive(Debug, Clone, Copy)]
pub struct TraceFlags {
    /// Emit the once-per-run `system` summary row.
    pub system: bool,
    /// Emit one row per finished task.
    pub tasks: bool,
    /// Emit one row per cluster frequency change.
    pub frequency: bool,
    /// Emit one row per DTPM PE evaluation.
    pub pes: bool,
    /// Emit one row per temperature sample.
    pub temperature: bool,
    /// Emit one row per load sample.
    pub load: bool,
}

impl Default for TraceFlags {
    /// All six trace files enabled, matching a fresh run with no
    /// configuration overrides.
    fn default() -> Self {
        Self { system: true, tasks: true, frequency: true, pes: true, temperature: true, load: true }
    }
}

fn open_writer(path: &Path, header: &[&str]) -> Result<csv::Writer<std::fs::File>, TraceError> {
    let write_header = !path.exists();
    let file = std::fs::OpenOptions::new().create(true).append(true).open(path).map_err(|source| TraceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if write_header {
        writer.write_record(header).map_err(|e| TraceError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;
    }
    Ok(writer)
}

/// A directory-backed CSV sink, one file per trace kind, matching the
/// original's six `common.TRACE_FILE_*` paths.
pub struct CsvTraceSink {
    dir: PathBuf,
    flags: TraceFlags,
}

impl CsvTraceSink {
    /// Construct a sink writing into `dir` (created if absent), emitting
    /// only the record kinds enabled in `flags`.
    pub fn new(dir: impl Into<PathBuf>, flags: TraceFlags) -> Result<Self, TraceError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| TraceError::Io { path: dir.display().to_string(), source })?;
        Ok(Self { dir, flags })
    }

    fn path(&self, file_stem: &str) -> PathBuf {
        self.dir.join(format!("{file_stem}.csv"))
    }

    fn write_row(&self, file_stem: &str, header: &[&str], row: &[String]) -> Result<(), TraceError> {
        let path = self.path(file_stem);
        let mut writer = open_writer(&path, header)?;
        writer.write_record(row).map_err(|e| TraceError::Io {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;
        writer.flush().map_err(|source| TraceError::Io { path: path.display().to_string(), source })
    }
}

impl TraceSink for CsvTraceSink {
    fn record_task(&mut self, record: TaskTraceRecord) -> Result<(), TraceError> {
        if !self.flags.tasks {
            return Ok(());
        }
        self.write_row(
            "tasks",
            &["DVFS_mode", "TaskID", "Cluster", "ExecTime_us", "Energy_J"],
            &[record.dvfs_mode, record.task_id.to_string(), record.cluster, record.exec_time_us.to_string(), record
                .energy_j
                .to_string()],
        )
    }

    fn record_frequency(&mut self, record: FrequencyTraceRecord) -> Result<(), TraceError> {
        if !self.flags.frequency {
            return Ok(());
        }
        self.write_row(
            "frequency",
            &["PE", "Timestamp", "Frequency"],
            &[record.pe, record.timestamp.to_string(), record.frequency_mhz.to_string()],
        )
    }

    fn record_pe(&mut self, record: PeTraceRecord) -> Result<(), TraceError> {
        if !self.flags.pes {
            return Ok(());
        }
        let info = format!("{:?}", record.info);
        self.write_row("PEs", &["Timestamp", "PE", "Info"], &[record.timestamp.to_string(), record.pe.to_string(), info])
    }

    fn record_temperature(&mut self, record: TemperatureTraceRecord) -> Result<(), TraceError> {
        if !self.flags.temperature {
            return Ok(());
        }
        self.write_row(
            "temperature",
            &["Timestamp", "Snippet", "TMax", "ThrottleState"],
            &[record.timestamp.to_string(), record.snippet, record.t_max_c.to_string(), record.throttle_state.to_string()],
        )
    }

    fn record_load(&mut self, record: LoadTraceRecord) -> Result<(), TraceError> {
        if !self.flags.load {
            return Ok(());
        }
        let mut header: Vec<String> = vec!["Timestamp".to_string(), "Snippet".to_string()];
        for idx in 0..record.n_per_cluster.len() {
            header.push(format!("N_tasks_PE_{idx}"));
        }
        header.push("N_total".to_string());
        let header_refs: Vec<&str> = header.iter().map(String::as_str).collect();

        let mut row = vec![record.timestamp.to_string(), record.snippet];
        row.extend(record.n_per_cluster.iter().map(ToString::to_string));
        row.push(record.n_total.to_string());
        self.write_row("load", &header_refs, &row)
    }

    fn record_system(&mut self, record: SystemTraceRecord) -> Result<(), TraceError> {
        if !self.flags.system {
            return Ok(());
        }
        self.write_row(
            "system",
            &["JobList", "DVFSModes", "N_little", "N_big", "ExecTime_us", "CumulativeExecTime_us", "Energy_J", "EDP_Js"],
            &[
                record.job_list,
                format!("{:?}", record.dvfs_modes),
                record.n_little.to_string(),
                record.n_big.to_string(),
                record.exec_time_us.to_string(),
                record.cumulative_exec_time_us.to_string(),
                record.energy_j.to_string(),
                record.edp_j_s.to_string(),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_written_once() {
        let dir = std::env::temp_dir().join(format!("soc_trace_test_{}", std::process::id()));
        let mut sink = CsvTraceSink::new(&dir, TraceFlags::default()).unwrap();
        sink.record_frequency(FrequencyTraceRecord { pe: "big".into(), timestamp: 0, frequency_mhz: 2000 }).unwrap();
        sink.record_frequency(FrequencyTraceRecord { pe: "big".into(), timestamp: 100, frequency_mhz: 1200 }).unwrap();
        let contents = std::fs::read_to_string(dir.join("frequency.csv")).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().next().unwrap().starts_with("PE,Timestamp,Frequency"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn disabled_kind_writes_nothing() {
        let dir = std::env::temp_dir().join(format!("soc_trace_test_disabled_{}", std::process::id()));
        let mut flags = TraceFlags::default();
        flags.tasks = false;
        let mut sink = CsvTraceSink::new(&dir, flags).unwrap();
        sink.record_task(TaskTraceRecord {
            dvfs_mode: "performance".into(),
            task_id: 0,
            cluster: "big".into(),
            exec_time_us: 10,
            energy_j: 0.1,
        })
        .unwrap();
        assert!(!dir.join("tasks.csv").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
