//! Clusters: groups of PEs sharing a voltage/frequency domain and a DVFS policy.

use crate::ids::{ClusterId, PeId};
use crate::resource::PeKind;
use std::collections::BTreeMap;

/// An operating performance point: a `(frequency_MHz, voltage_mV)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Opp {
    /// Frequency in MHz.
    pub freq_mhz: u32,
    /// Voltage in mV.
    pub volt_mv: u32,
}

/// DVFS governance mode for a cluster (spec.md §3, §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DvfsMode {
    /// Always run at the highest OPP.
    Performance,
    /// Always run at the lowest OPP.
    Powersave,
    /// Linux-style utilization-threshold governor (spec.md §4.6).
    Ondemand,
    /// Pinned to a fixed frequency in MHz.
    Constant(u32),
    /// No DVFS management (e.g. memory).
    None,
}

impl DvfsMode {
    /// Parse the `DVFS_mode` token from the SoC descriptor
    /// (`performance|powersave|ondemand|constant-<MHz>|none`).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "performance" => Some(Self::Performance),
            "powersave" => Some(Self::Powersave),
            "ondemand" => Some(Self::Ondemand),
            "none" => Some(Self::None),
            _ => token
                .strip_prefix("constant-")
                .and_then(|mhz| mhz.parse().ok())
                .map(Self::Constant),
        }
    }
}

/// A group of PEs of identical type sharing one V/f domain.
///
/// Field-for-field grounded on `original_source/clusters.py`'s `Cluster`
/// class, extended with `DTPM_trip_freq` (present in the SoC descriptor
/// grammar, spec.md §6, but absent from the Python `Cluster` class body —
/// it is read into a separate DTPM-specific throttling table there).
#[derive(Debug, Clone)]
pub struct Cluster {
    /// Dense, globally unique id.
    pub id: ClusterId,
    /// Cluster name.
    pub name: String,
    /// Shared resource type of every PE in this cluster.
    pub kind: PeKind,
    /// Member PE ids.
    pub pe_list: Vec<PeId>,
    /// DVFS governance mode.
    pub dvfs: DvfsMode,
    /// Power values keyed by active-task capacity, by frequency threshold:
    /// `power_profile[freq_threshold][n_active_tasks - 1]`.
    pub power_profile: BTreeMap<u32, Vec<f64>>,
    /// Power-gated variant of `power_profile`, used when tracing with PG.
    pub pg_profile: BTreeMap<u32, Vec<f64>>,
    /// Frequency caps (MHz) per regular thermal trip point; `-1` means no cap.
    pub trip_freq: Vec<i64>,
    /// Frequency caps (MHz) per DTPM-specific thermal trip point; `-1` means no cap.
    pub dtpm_trip_freq: Vec<i64>,
    /// Ascending list of `(freq, volt)` operating points.
    pub opp: Vec<Opp>,
    /// Current frequency in MHz (possibly throttled below `policy_frequency`).
    pub current_frequency: u32,
    /// Frequency in MHz desired by the active DVFS policy, pre-throttling.
    pub policy_frequency: u32,
    /// Current voltage in mV.
    pub current_voltage: u32,
    /// Number of currently active (powered) cores.
    pub num_active_cores: u32,
    /// Total cores ever present in this cluster (capacity ceiling).
    pub num_total_cores: u32,
    /// Current aggregate power dissipation (dynamic + static), in watts.
    pub current_power_cluster: f64,
    /// Per-(cluster, temperature-sample) snapshot of `current_power_cluster`,
    /// consumed and reset at each snippet rotation (spec.md §4.5 step 7).
    pub snippet_power_list: Vec<f64>,
    /// Per-(cluster, temperature-sample) snapshot of the number of tasks
    /// executing on this cluster at that moment.
    pub snippet_num_tasks_list: Vec<u32>,
}

impl Cluster {
    /// Construct a cluster with no PEs, OPPs, or profiles yet.
    #[must_use]
    pub fn new(id: ClusterId, name: impl Into<String>, kind: PeKind, dvfs: DvfsMode) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            pe_list: Vec::new(),
            dvfs,
            power_profile: BTreeMap::new(),
            pg_profile: BTreeMap::new(),
            trip_freq: Vec::new(),
            dtpm_trip_freq: Vec::new(),
            opp: Vec::new(),
            current_frequency: 0,
            policy_frequency: 0,
            current_voltage: 0,
            num_active_cores: 0,
            num_total_cores: 0,
            current_power_cluster: 0.0,
            snippet_power_list: Vec::new(),
            snippet_num_tasks_list: Vec::new(),
        }
    }

    /// Maximum frequency across this cluster's OPP list, or 0 if none.
    #[must_use]
    pub fn max_freq(&self) -> u32 {
        self.opp.last().map_or(0, |o| o.freq_mhz)
    }

    /// Minimum frequency across this cluster's OPP list, or 0 if none.
    #[must_use]
    pub fn min_freq(&self) -> u32 {
        self.opp.first().map_or(0, |o| o.freq_mhz)
    }

    /// Maximum voltage across this cluster's OPP list, or 0 if none.
    #[must_use]
    pub fn max_voltage(&self) -> u32 {
        self.opp.last().map_or(0, |o| o.volt_mv)
    }

    /// Minimum voltage across this cluster's OPP list, or 0 if none.
    #[must_use]
    pub fn min_voltage(&self) -> u32 {
        self.opp.first().map_or(0, |o| o.volt_mv)
    }

    /// Voltage (mV) of the OPP whose frequency equals `freq_mhz`, if present.
    #[must_use]
    pub fn voltage_for(&self, freq_mhz: u32) -> Option<u32> {
        self.opp.iter().find(|o| o.freq_mhz == freq_mhz).map(|o| o.volt_mv)
    }

    /// Index of the OPP whose frequency equals `current_frequency`, if present.
    #[must_use]
    pub fn current_opp_index(&self) -> Option<usize> {
        self.opp.iter().position(|o| o.freq_mhz == self.current_frequency)
    }
}
