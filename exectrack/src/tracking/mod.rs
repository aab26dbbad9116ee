//! Process execution tracking
//!
//! - `tracker`: lifecycle of the loaded kernel object and its hook
//! - `probe`: aya implementation of the kernel object
//! - `snapshot`: one-pass join of the two kernel maps
//! - `poller`: fixed-period, non-overlapping snapshot loop
//! - `report`: where snapshots go
//! - `shutdown`: signal-driven ordered teardown

pub mod poller;
pub mod probe;
pub mod report;
pub mod shutdown;
pub mod snapshot;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testing;

pub use poller::{Poller, RunningPoller, DEFAULT_INTERVAL_SECS};
pub use probe::{ExecProbe, DEFAULT_OBJECT_PATH};
pub use report::{LogSink, RecordSink};
pub use shutdown::{run_until, termination_signal};
pub use snapshot::{read_all, ExecutionMaps, SnapshotSource};
pub use tracker::{ProbeObject, Tracker};
