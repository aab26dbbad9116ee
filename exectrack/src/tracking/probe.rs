//! # eBPF Program Loading and Attachment
//!
//! [`ExecProbe`] is the aya-backed [`ProbeObject`]: it loads the compiled
//! kernel object from disk, verifies the `trace_execve` program, attaches
//! it to `syscalls/sys_enter_execve` and exposes the two maps it fills.
//!
//! ## Maps
//!
//! - `EXEC_COUNT` - PID → execution count
//! - `PROCESS_NAMES` - PID → `comm`

use std::path::Path;

use anyhow::Context;
use aya::{
    maps::{HashMap, MapError},
    programs::{trace_point::TracePointLinkId, TracePoint},
    Ebpf,
};
use aya_log::EbpfLogger;
use exectrack_common::{
    ProcessName, EXEC_COUNT_MAP, PROCESS_NAMES_MAP, PROGRAM_NAME, TRACEPOINT_CATEGORY,
    TRACEPOINT_NAME,
};
use log::{info, warn};

use crate::domain::TrackerError;
use crate::tracking::snapshot::ExecutionMaps;
use crate::tracking::tracker::ProbeObject;

/// Default location of the object built by `cargo xtask build-ebpf`
pub const DEFAULT_OBJECT_PATH: &str = "target/bpfel-unknown-none/release/exectrack";

/// Loaded (and verified) exec-tracking kernel object.
pub struct ExecProbe {
    bpf: Ebpf,
}

impl ExecProbe {
    /// Load the object at `path` and run the verifier on `trace_execve`.
    ///
    /// Must be called from within a tokio runtime (aya-log spawns its
    /// forwarding task on it).
    ///
    /// # Errors
    /// Returns [`TrackerError::Load`] if the file cannot be parsed, a map
    /// cannot be created or the verifier rejects the program
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        info!("Loading eBPF object from {}", path.display());
        let mut bpf = Ebpf::load_file(path)
            .map_err(|e| TrackerError::Load(format!("{}: {e}", path.display())))?;

        init_ebpf_logger(&mut bpf);

        let program = tracepoint(&mut bpf).map_err(|e| TrackerError::Load(format!("{e:#}")))?;
        program.load().map_err(|e| TrackerError::Load(format!("{PROGRAM_NAME}: {e}")))?;
        info!("✓ Loaded program: {PROGRAM_NAME}");

        Ok(Self { bpf })
    }
}

fn tracepoint(bpf: &mut Ebpf) -> anyhow::Result<&mut TracePoint> {
    let program: &mut TracePoint = bpf
        .program_mut(PROGRAM_NAME)
        .with_context(|| format!("{PROGRAM_NAME} program not found"))?
        .try_into()?;
    Ok(program)
}

/// Forward `aya-log` records from the kernel to the `log` facade.
fn init_ebpf_logger(bpf: &mut Ebpf) {
    if let Err(e) = EbpfLogger::init(bpf) {
        warn!("Failed to initialize eBPF logger: {e}");
    }
}

fn tracepoint_label() -> String {
    format!("{TRACEPOINT_CATEGORY}/{TRACEPOINT_NAME}")
}

impl ProbeObject for ExecProbe {
    type Link = TracePointLinkId;

    fn attach(&mut self) -> Result<TracePointLinkId, TrackerError> {
        let attach_error = |error: String| TrackerError::Attach {
            program: PROGRAM_NAME.to_string(),
            tracepoint: tracepoint_label(),
            error,
        };

        let program = tracepoint(&mut self.bpf).map_err(|e| attach_error(format!("{e:#}")))?;
        let link = program
            .attach(TRACEPOINT_CATEGORY, TRACEPOINT_NAME)
            .map_err(|e| attach_error(e.to_string()))?;
        info!("✓ Attached tracepoint: {}", tracepoint_label());
        Ok(link)
    }

    fn detach(&mut self, link: TracePointLinkId) -> Result<(), TrackerError> {
        let detach_error = |error: String| TrackerError::Detach {
            program: PROGRAM_NAME.to_string(),
            tracepoint: tracepoint_label(),
            error,
        };

        let program = tracepoint(&mut self.bpf).map_err(|e| detach_error(format!("{e:#}")))?;
        program.detach(link).map_err(|e| detach_error(e.to_string()))
    }

    fn release(mut self) {
        match tracepoint(&mut self.bpf) {
            Ok(program) => {
                if let Err(e) = program.unload() {
                    warn!("Failed to unload {PROGRAM_NAME}: {e}");
                }
            }
            Err(e) => warn!("{e:#}"),
        }
        // Map and program descriptors close when `bpf` drops here
    }
}

impl ExecutionMaps for ExecProbe {
    type Error = anyhow::Error;

    fn for_each_count(&self, visit: &mut dyn FnMut(u32, u64)) -> anyhow::Result<()> {
        let counts: HashMap<_, u32, u64> = HashMap::try_from(
            self.bpf.map(EXEC_COUNT_MAP).with_context(|| format!("{EXEC_COUNT_MAP} map not found"))?,
        )?;

        for entry in counts.iter() {
            let (pid, count) = entry?;
            visit(pid, count);
        }
        Ok(())
    }

    fn lookup_name(&self, pid: u32) -> anyhow::Result<Option<ProcessName>> {
        let names: HashMap<_, u32, ProcessName> = HashMap::try_from(
            self.bpf
                .map(PROCESS_NAMES_MAP)
                .with_context(|| format!("{PROCESS_NAMES_MAP} map not found"))?,
        )?;

        match names.get(&pid, 0) {
            Ok(name) => Ok(Some(name)),
            Err(MapError::KeyNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
