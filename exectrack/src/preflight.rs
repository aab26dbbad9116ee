//! Pre-flight checks for exectrack
//!
//! Validates system requirements before attempting to load eBPF programs.
//! Provides clear, actionable error messages when requirements aren't met.

#![allow(unsafe_code)] // geteuid() and setrlimit() require unsafe

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::path::Path;

/// Minimum kernel version for BPF programs on tracepoints
const MIN_KERNEL_VERSION: (u32, u32) = (4, 7);

/// Run all pre-flight checks before eBPF loading
///
/// # Errors
/// Returns an error naming the first unmet requirement
pub fn run_preflight_checks(object_path: &Path) -> Result<()> {
    check_privileges()?;
    check_kernel_version()?;
    check_object_exists(object_path)?;
    raise_memlock_limit();
    Ok(())
}

/// Check if running with sufficient privileges for eBPF
///
/// # Errors
/// Returns a "Permission denied" error when not running as root
pub fn check_privileges() -> Result<()> {
    if unsafe { libc::geteuid() } == 0 {
        return Ok(());
    }

    bail!(
        "Permission denied: exectrack requires root privileges to load eBPF programs.\n\n\
         Run with: sudo exectrack ..."
    );
}

/// Check if the kernel version is sufficient for tracepoint programs
fn check_kernel_version() -> Result<()> {
    let version_str = std::fs::read_to_string("/proc/version")
        .context("Failed to read kernel version from /proc/version")?;

    // "Linux version 6.1.0-arch1-1 ..."
    let release = version_str.split_whitespace().nth(2).unwrap_or("unknown");

    let Some(version) = parse_kernel_release(release) else {
        // Can't parse, assume it's fine
        return Ok(());
    };

    if version < MIN_KERNEL_VERSION {
        bail!(
            "Kernel version {}.{} is too old.\n\n\
             exectrack requires Linux {}.{} or newer for tracepoint eBPF programs.\n\
             Current kernel: {}",
            version.0,
            version.1,
            MIN_KERNEL_VERSION.0,
            MIN_KERNEL_VERSION.1,
            release
        );
    }

    Ok(())
}

/// Parse "major.minor[...]" out of a kernel release string
fn parse_kernel_release(release: &str) -> Option<(u32, u32)> {
    let mut parts = release.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Check that the compiled eBPF object is present
fn check_object_exists(object_path: &Path) -> Result<()> {
    if !object_path.exists() {
        bail!(
            "eBPF object not found: {}\n\n\
             Build it with: cargo xtask build-ebpf",
            object_path.display()
        );
    }
    if !object_path.is_file() {
        bail!("Not a file: {}\n\n--object must point to the compiled eBPF object.", object_path.display());
    }
    Ok(())
}

/// Lift `RLIMIT_MEMLOCK` for kernels that still charge BPF maps against it
fn raise_memlock_limit() {
    let rlim = libc::rlimit { rlim_cur: libc::RLIM_INFINITY, rlim_max: libc::RLIM_INFINITY };
    let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
    if ret == 0 {
        debug!("Removed limit on locked memory");
    } else {
        warn!("Failed to increase RLIMIT_MEMLOCK (ret {ret})");
    }
}
