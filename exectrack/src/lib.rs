//! # exectrack - eBPF Process Execution Tracker
//!
//! A small agent that attaches a tracepoint program to `execve` and
//! periodically reads back how many times each PID executed, and under
//! which name.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              Kernel: syscalls/sys_enter_execve           │
//! │  trace_execve ──▶ EXEC_COUNT (pid → u64)                 │
//! │               └─▶ PROCESS_NAMES (pid → comm[16])         │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ map iteration + lookups
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                 exectrack (this crate)                   │
//! │                                                          │
//! │  Tracker ──▶ Snapshot Reader ──▶ Poller ──▶ RecordSink   │
//! │     ▲                              ▲                     │
//! │     └──────── Shutdown (SIGINT / SIGTERM) ───────┘       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`tracking`]: tracker lifecycle, map snapshots, polling and shutdown
//! - [`inventory`]: listing of loaded BPF programs and their maps
//! - [`preflight`]: privilege, kernel and object checks before loading
//! - [`cli`]: command-line arguments
//! - [`domain`]: core types (`Pid`, `ProcessRecord`) and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! cargo xtask build-ebpf
//! sudo ./target/release/exectrack --interval 2
//! ```

pub mod cli;
pub mod domain;
pub mod inventory;
pub mod preflight;
pub mod tracking;
