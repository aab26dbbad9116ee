//! # Snapshot Reader
//!
//! Joins the execution-count map with the process-name map in one pass.
//!
//! The two maps are written by the kernel independently of each other and
//! of this reader, so a PID can have a count before it has a name (or after
//! its name was evicted). A missing name becomes
//! [`UNKNOWN_PROCESS_NAME`](crate::domain::UNKNOWN_PROCESS_NAME); only a
//! failure of the count iteration itself fails the snapshot.

use std::fmt::Display;

use exectrack_common::{ProcessName, EXEC_COUNT_MAP};
use log::debug;

use crate::domain::{Pid, ProcessRecord, TrackerError};

/// Read-only access to the two kernel maps.
pub trait ExecutionMaps {
    type Error: Display;

    /// Visit every `(pid, count)` entry of the execution-count map once.
    ///
    /// # Errors
    /// Returns an error if the kernel iteration fails partway
    fn for_each_count(&self, visit: &mut dyn FnMut(u32, u64)) -> Result<(), Self::Error>;

    /// Point lookup in the process-name map. `Ok(None)` means no entry.
    ///
    /// # Errors
    /// Returns an error if the lookup itself fails
    fn lookup_name(&self, pid: u32) -> Result<Option<ProcessName>, Self::Error>;
}

/// Anything that can produce a full snapshot on demand.
pub trait SnapshotSource: Send + 'static {
    /// # Errors
    /// Returns [`TrackerError::Read`] if the snapshot could not be taken
    fn read_all(&self) -> Result<Vec<ProcessRecord>, TrackerError>;
}

/// Drain both maps into a fresh list of records.
///
/// Order follows the kernel's iteration order. No locking across the two
/// maps: a process may exit between its count and its name lookup.
///
/// # Errors
/// Returns [`TrackerError::Read`] if iterating the execution-count map fails;
/// whatever was collected before the failure is discarded.
pub fn read_all<M: ExecutionMaps + ?Sized>(maps: &M) -> Result<Vec<ProcessRecord>, TrackerError> {
    let mut records = Vec::new();

    maps.for_each_count(&mut |pid, exec_count| {
        records.push(join_record(maps, pid, exec_count));
    })
    .map_err(|e| TrackerError::Read { map: EXEC_COUNT_MAP.to_string(), error: e.to_string() })?;

    Ok(records)
}

fn join_record<M: ExecutionMaps + ?Sized>(maps: &M, pid: u32, exec_count: u64) -> ProcessRecord {
    match maps.lookup_name(pid) {
        Ok(Some(name)) => ProcessRecord {
            pid: Pid::from(pid),
            exec_count,
            name: decode_name(&name),
        },
        Ok(None) => ProcessRecord::unnamed(Pid::from(pid), exec_count),
        Err(e) => {
            debug!("Name lookup for {} failed: {e}", Pid::from(pid));
            ProcessRecord::unnamed(Pid::from(pid), exec_count)
        }
    }
}

/// Decode a `comm` buffer, truncating at the first NUL.
#[must_use]
pub fn decode_name(name: &ProcessName) -> String {
    String::from_utf8_lossy(name.as_bytes()).into_owned()
}
