//! # Shared Data Structures (eBPF ↔ Userspace)
//!
//! Names and layouts both halves of exectrack must agree on. The kernel
//! object publishes two hash maps keyed by PID; userspace looks them up by
//! the names below. All shared values use `#[repr(C)]`.
//!
//! ## Maps
//!
//! - [`EXEC_COUNT_MAP`] - `u32` PID → `u64` number of `execve` calls
//! - [`PROCESS_NAMES_MAP`] - `u32` PID → [`ProcessName`] (`comm`, 16 bytes)

#![no_std]

// ============================================================================
// Object Contract
// ============================================================================

/// Name of the execution-count map inside the kernel object
pub const EXEC_COUNT_MAP: &str = "EXEC_COUNT";

/// Name of the process-name map inside the kernel object
pub const PROCESS_NAMES_MAP: &str = "PROCESS_NAMES";

/// Name of the tracepoint program inside the kernel object
pub const PROGRAM_NAME: &str = "trace_execve";

/// Tracepoint category the program attaches to
pub const TRACEPOINT_CATEGORY: &str = "syscalls";

/// Tracepoint event the program attaches to
pub const TRACEPOINT_NAME: &str = "sys_enter_execve";

/// Capacity of both maps
///
/// Once full, the kernel side silently stops tracking new PIDs.
pub const MAX_TRACKED_PROCESSES: u32 = 8192;

/// Length of the kernel `comm` buffer (`TASK_COMM_LEN`)
pub const COMM_LEN: usize = 16;

// ============================================================================
// Shared Data Structures
// ============================================================================

/// Short process name as captured by `bpf_get_current_comm()`
///
/// NUL-terminated or NUL-padded; names longer than 15 bytes are truncated
/// by the kernel. A buffer with no NUL at all is taken as a full 16-byte name.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessName {
    pub comm: [u8; COMM_LEN],
}

impl ProcessName {
    /// Copy `name` into a padded buffer, truncating to [`COMM_LEN`] bytes.
    #[must_use]
    pub fn new(name: &[u8]) -> Self {
        let mut comm = [0u8; COMM_LEN];
        let len = if name.len() < COMM_LEN { name.len() } else { COMM_LEN };
        comm[..len].copy_from_slice(&name[..len]);
        Self { comm }
    }

    /// The name bytes up to (not including) the first NUL.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.comm.iter().position(|&b| b == 0).unwrap_or(COMM_LEN);
        &self.comm[..end]
    }
}

#[cfg(feature = "user")]
use aya::Pod;

// Required to read ProcessName values out of a userspace aya HashMap
#[cfg(feature = "user")]
#[allow(unsafe_code)]
unsafe impl Pod for ProcessName {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_stops_at_first_nul() {
        let name = ProcessName { comm: *b"bash\0\0\0\0\0\0\0\0\0\0\0\0" };
        assert_eq!(name.as_bytes(), b"bash");
    }

    #[test]
    fn test_name_without_nul_uses_full_buffer() {
        let name = ProcessName { comm: *b"0123456789abcdef" };
        assert_eq!(name.as_bytes(), b"0123456789abcdef");
    }

    #[test]
    fn test_name_with_leading_nul_is_empty() {
        let name = ProcessName { comm: [0u8; COMM_LEN] };
        assert!(name.as_bytes().is_empty());
    }

    #[test]
    fn test_new_truncates_long_names() {
        let name = ProcessName::new(b"a-very-long-process-name");
        assert_eq!(name.as_bytes(), b"a-very-long-proc");
    }
}
