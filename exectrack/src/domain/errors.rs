//! Structured error types for exectrack
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! A missing process name is deliberately absent: the snapshot reader
//! substitutes a placeholder and never reports it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// The kernel object could not be opened, parsed or verified.
    #[error("Failed to load eBPF program: {0}")]
    Load(String),

    /// The object loaded but the hook could not be attached.
    #[error("Failed to attach {program} to {tracepoint}: {error}")]
    Attach { program: String, tracepoint: String, error: String },

    /// Removing the hook during teardown failed.
    #[error("Failed to detach {program} from {tracepoint}: {error}")]
    Detach { program: String, tracepoint: String, error: String },

    /// Iterating a map failed partway; the partial snapshot was discarded.
    #[error("Failed to read map {map}: {error}")]
    Read { map: String, error: String },

    #[error("Tracker is closed")]
    Closed,
}
