//! Error type for the power/thermal numerics crate.

use thiserror::Error;

/// Errors raised while computing power, frequency, or thermal updates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PowerError {
    /// A cluster's current frequency has no matching OPP entry.
    #[error("cluster `{cluster}` frequency {freq_mhz} MHz is not in its OPP list")]
    FrequencyNotInOpp {
        /// Cluster name.
        cluster: String,
        /// Offending frequency, in MHz.
        freq_mhz: u32,
    },

    /// A constant-frequency DVFS mode named a frequency outside the OPP range.
    #[error("constant DVFS frequency {freq_mhz} MHz is outside the OPP range for cluster `{cluster}`")]
    ConstantFrequencyOutOfRange {
        /// Cluster name.
        cluster: String,
        /// Offending frequency, in MHz.
        freq_mhz: u32,
    },

    /// No power-profile entry has a frequency threshold >= the current frequency.
    #[error("power profile for cluster `{cluster}` has no threshold >= {freq_mhz} MHz")]
    PowerProfileExhausted {
        /// Cluster name.
        cluster: String,
        /// Current frequency, in MHz.
        freq_mhz: u32,
    },

    /// A DVFS mode requiring OPPs (`ondemand`, `powersave`, `constant-*`) was
    /// configured on a cluster with an empty OPP list.
    #[error("cluster `{cluster}` uses a DVFS mode that requires OPPs, but none are configured")]
    MissingOpps {
        /// Cluster name.
        cluster: String,
    },
}
