//! Core value types shared by the tracker, the snapshot reader and the sinks.

use std::fmt;

/// Placeholder name used when a PID has a count but no name entry
pub const UNKNOWN_PROCESS_NAME: &str = "unknown";

/// Kernel process identifier (low half of `bpf_get_current_pid_tgid()`)
///
/// Not unique over long uptimes: the kernel recycles PIDs after exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        Pid(pid)
    }
}

/// One row of a snapshot: a PID joined with its execution count and name.
///
/// Built fresh on every poll and dropped once reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub exec_count: u64,
    pub name: String,
}

impl ProcessRecord {
    /// Record for a PID whose name lookup missed.
    #[must_use]
    pub fn unnamed(pid: Pid, exec_count: u64) -> Self {
        Self { pid, exec_count, name: UNKNOWN_PROCESS_NAME.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_display() {
        assert_eq!(Pid(1234).to_string(), "PID:1234");
    }

    #[test]
    fn test_unnamed_record_uses_placeholder() {
        let record = ProcessRecord::unnamed(Pid(7), 2);
        assert_eq!(record.name, "unknown");
        assert_eq!(record.exec_count, 2);
    }
}
