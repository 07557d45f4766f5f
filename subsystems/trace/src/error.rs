//! Error type for the trace crate.

use thiserror::Error;

/// Errors raised while writing trace records to a backing sink.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The CSV sink failed to open or write a trace file.
    #[error("trace I/O error on `{path}`: {source}")]
    Io {
        /// Path of the offending trace file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
