//! Error type for the DTPM crate.

use thiserror::Error;

/// Errors raised while evaluating DTPM policies or throttling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DtpmError {
    /// A cluster using `ondemand`/`powersave`/`constant-*` has no configured OPPs.
    #[error("cluster `{cluster}` uses DVFS mode `{dvfs_mode}` but has no OPPs configured")]
    MissingOpp {
        /// Offending cluster name.
        cluster: String,
        /// The DVFS mode that requires at least one OPP.
        dvfs_mode: String,
    },

    /// Both the regular and the DTPM-specific throttling tables were enabled
    /// at once; exactly one must be active.
    #[error("both regular and DTPM throttling are enabled, enable only one")]
    ConflictingThrottlingModes,

    /// An OPP-stepping call failed (propagated from `soc-power`).
    #[error(transparent)]
    Power(#[from] soc_power::PowerError),
}
