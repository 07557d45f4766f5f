//! `SchedulerKind -> Arc<dyn Scheduler>` factory.
//!
//! Generalizes the host framework's `SchedulerFramework::register` (which
//! stores boxed schedulers in a process-wide `static`) into a pure function
//! with no hidden state: unknown names fail loudly at configuration load
//! (spec.md §4.4), never at run time.

use crate::cp::PreBakedCpOracle;
use crate::error::SchedulerError;
use crate::greedy::{CpuOnly, Eft, Etf, EtfLb, Met, Stf};
use crate::table::TableEntry;
use crate::traits::Scheduler;
use soc_types::JobId;
use std::collections::HashMap;
use std::sync::Arc;

/// Build a scheduler from its configuration name.
///
/// Greedy heuristic names are case-sensitive and match spec.md §4.4.1
/// exactly (`"CPU_only"`, `"MET"`, `"EFT"`, `"STF"`, `"ETF"`, `"ETF_LB"`).
/// `"CP_oracle"` builds an oracle stand-in with no pre-baked tables (every
/// job lookup then fails with [`SchedulerError::CpOracleUnavailable`]); use
/// [`build_cp_oracle`] to supply tables.
///
/// # Errors
/// Returns [`SchedulerError::UnknownScheduler`] for any name this workspace
/// does not implement.
pub fn build(name: &str) -> Result<Arc<dyn Scheduler>, SchedulerError> {
    let scheduler: Arc<dyn Scheduler> = match name {
        "CPU_only" => Arc::new(CpuOnly),
        "MET" => Arc::new(Met),
        "EFT" => Arc::new(Eft),
        "STF" => Arc::new(Stf),
        "ETF" => Arc::new(Etf),
        "ETF_LB" => Arc::new(EtfLb),
        "CP_oracle" => Arc::new(PreBakedCpOracle::new(HashMap::new())),
        _ => return Err(SchedulerError::UnknownScheduler { name: name.to_string() }),
    };
    Ok(scheduler)
}

/// Build a table-driven (ILP-family) scheduler from a precomputed table.
#[must_use]
pub fn build_table_driven(name: &str, table: HashMap<u32, TableEntry>) -> Arc<dyn Scheduler> {
    Arc::new(crate::table::TableDriven::new(name, table))
}

/// Build a CP oracle stand-in from per-job pre-baked tables.
#[must_use]
pub fn build_cp_oracle(tables_by_job: HashMap<JobId, crate::cp::CpResponse>) -> Arc<dyn Scheduler> {
    Arc::new(PreBakedCpOracle::new(tables_by_job))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_build() {
        for name in ["CPU_only", "MET", "EFT", "STF", "ETF", "ETF_LB", "CP_oracle"] {
            assert!(build(name).is_ok(), "{name} should build");
        }
    }

    #[test]
    fn unknown_name_fails_loudly() {
        let err = build("quantum_annealer").unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownScheduler { .. }));
    }
}
