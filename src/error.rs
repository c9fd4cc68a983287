//! Error types
//!
//! Invalid player input is never an error: the simulation step ignores it.
//! These cover the failures a caller can actually react to.

use thiserror::Error;

/// Failures of the background search worker
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The platform could not start a worker thread
    #[error("search worker unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    /// A request is already outstanding for this session
    #[error("search worker busy with request #{0}")]
    Busy(u64),
    /// The worker thread has gone away
    #[error("search worker disconnected")]
    Disconnected,
    /// The request took longer than the configured timeout
    #[error("search timed out after {0:.2}s")]
    TimedOut(f32),
    /// The worker finished without a usable move
    #[error("search produced no move")]
    NoMove,
}

/// Failures while loading settings at startup
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {var} value {value:?}")]
    Env { var: &'static str, value: String },
}
