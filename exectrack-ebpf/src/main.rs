//! # eBPF Kernel-Side Instrumentation
//!
//! Counts `execve` calls per PID and remembers the caller's `comm`.
//!
//! ## Programs
//!
//! - **Tracepoint**: `trace_execve` - `syscalls/sys_enter_execve`
//!
//! ## Maps (Shared with Userspace)
//!
//! - `EXEC_COUNT` - PID → number of `execve` calls seen
//! - `PROCESS_NAMES` - PID → `comm` at the time of the last call
//!
//! Userspace only reads these maps. Entries are never removed here, so a
//! recycled PID keeps accumulating into the old counter.
//!
//! ## Build
//!
//! Always compiled in release mode (debug includes incompatible formatting code):
//! ```bash
//! cargo xtask build-ebpf
//! ```

#![no_std]
#![no_main]
#![allow(unused_unsafe)]

use aya_ebpf::{
    helpers::{bpf_get_current_comm, bpf_get_current_pid_tgid},
    macros::{map, tracepoint},
    maps::HashMap,
    programs::TracePointContext,
};
use aya_log_ebpf::debug;
use exectrack_common::{ProcessName, MAX_TRACKED_PROCESSES};

// ============================================================================
// eBPF Maps - Shared data structures between kernel and userspace
// ============================================================================

/// Map: PID → execution count
///
/// Inserted with 1 on the first `execve` of a PID, incremented afterwards.
#[map]
static EXEC_COUNT: HashMap<u32, u64> = HashMap::with_max_entries(MAX_TRACKED_PROCESSES, 0);

/// Map: PID → process name (16-byte `comm`)
///
/// Written after `EXEC_COUNT`, so userspace may briefly see a count with no name.
#[map]
static PROCESS_NAMES: HashMap<u32, ProcessName> =
    HashMap::with_max_entries(MAX_TRACKED_PROCESSES, 0);

// ============================================================================
// eBPF Program Hooks
// ============================================================================

/// Hook: syscalls/sys_enter_execve tracepoint
/// Fires on every process image replacement
#[tracepoint]
pub fn trace_execve(ctx: TracePointContext) -> u32 {
    match try_trace_execve(&ctx) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}

fn try_trace_execve(ctx: &TracePointContext) -> Result<(), i64> {
    let pid_tgid = unsafe { bpf_get_current_pid_tgid() };
    let pid = pid_tgid as u32;

    let count = unsafe { EXEC_COUNT.get(&pid).copied().unwrap_or(0) } + 1;
    unsafe {
        EXEC_COUNT.insert(&pid, &count, 0)?;
    }

    let comm = unsafe { bpf_get_current_comm()? };
    let name = ProcessName { comm };
    unsafe {
        PROCESS_NAMES.insert(&pid, &name, 0)?;
    }

    debug!(ctx, "execve pid={} count={}", pid, count);

    Ok(())
}

#[cfg(all(not(test), target_os = "none"))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 4] = *b"GPL\0";
