//! Error type for the data-model crate.
//!
//! Follows the host framework's per-subsystem `ExecError` pattern
//! (`subsystems/execution/src/lib.rs`) but derives `Display`/`Error` via
//! `thiserror` instead of hand-rolling them, matching the rest of the
//! example pack.

use thiserror::Error;

/// Errors raised while constructing or validating the data model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// `comm_vol` was not an n×n matrix for an n-task application.
    #[error("comm_vol matrix shape mismatch: expected {expected}x{expected}, got {got} rows")]
    CommVolShapeMismatch {
        /// Expected row/column count (number of tasks).
        expected: usize,
        /// Actual row count found.
        got: usize,
    },

    /// A non-zero `comm_vol[from][to]` entry with `from` not a predecessor of `to`.
    #[error("comm_vol[{from}][{to}] is non-zero but {from} is not a predecessor of {to}")]
    CommVolWithoutPrecedence {
        /// Source task base id.
        from: u32,
        /// Destination task base id.
        to: u32,
    },

    /// An application had no head task, no tail task, or both.
    #[error("application `{name}` must declare at least one head and one tail task")]
    MissingHeadOrTail {
        /// Application name.
        name: String,
    },
}
