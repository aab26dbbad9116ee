//! In-memory stand-ins for the kernel object, used by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use exectrack_common::ProcessName;

use crate::domain::TrackerError;
use crate::tracking::snapshot::ExecutionMaps;
use crate::tracking::tracker::ProbeObject;

/// Shared record of every call made on fake probes.
#[derive(Clone, Default)]
pub(crate) struct ProbeLog {
    calls: Arc<Mutex<Vec<&'static str>>>,
    live: Arc<AtomicUsize>,
}

impl ProbeLog {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub(crate) fn live_objects(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Fixed contents for the two maps, with optional injected failures.
#[derive(Clone, Default)]
pub(crate) struct FakeMaps {
    counts: Vec<(u32, u64)>,
    names: HashMap<u32, ProcessName>,
    fail_after: Option<usize>,
    fail_lookups: bool,
    panic_on_read: bool,
}

impl FakeMaps {
    pub(crate) fn new(counts: &[(u32, u64)], names: &[(u32, &str)]) -> Self {
        Self {
            counts: counts.to_vec(),
            names: names.iter().map(|(pid, name)| (*pid, ProcessName::new(name.as_bytes()))).collect(),
            fail_after: None,
            fail_lookups: false,
            panic_on_read: false,
        }
    }

    /// Iteration yields `n` entries and then fails.
    pub(crate) fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub(crate) fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub(crate) fn panicking_reads(mut self) -> Self {
        self.panic_on_read = true;
        self
    }
}

impl ExecutionMaps for FakeMaps {
    type Error = String;

    fn for_each_count(&self, visit: &mut dyn FnMut(u32, u64)) -> Result<(), String> {
        assert!(!self.panic_on_read, "map iteration blew up");
        for (i, (pid, count)) in self.counts.iter().enumerate() {
            if self.fail_after == Some(i) {
                return Err("bpf_map_get_next_key failed: Input/output error".to_string());
            }
            visit(*pid, *count);
        }
        if self.fail_after.is_some_and(|n| n >= self.counts.len()) {
            return Err("bpf_map_get_next_key failed: Input/output error".to_string());
        }
        Ok(())
    }

    fn lookup_name(&self, pid: u32) -> Result<Option<ProcessName>, String> {
        if self.fail_lookups {
            return Err("bpf_map_lookup_elem failed: Bad file descriptor".to_string());
        }
        Ok(self.names.get(&pid).copied())
    }
}

/// Loaded-object double that logs attach/detach/release/read.
pub(crate) struct FakeProbe {
    log: ProbeLog,
    maps: FakeMaps,
    fail_attach: bool,
    fail_detach: bool,
}

impl FakeProbe {
    pub(crate) fn new(log: &ProbeLog) -> Self {
        log.live.fetch_add(1, Ordering::SeqCst);
        Self { log: log.clone(), maps: FakeMaps::default(), fail_attach: false, fail_detach: false }
    }

    pub(crate) fn with_maps(mut self, maps: FakeMaps) -> Self {
        self.maps = maps;
        self
    }

    pub(crate) fn failing_attach(mut self) -> Self {
        self.fail_attach = true;
        self
    }

    pub(crate) fn failing_detach(mut self) -> Self {
        self.fail_detach = true;
        self
    }
}

impl ProbeObject for FakeProbe {
    type Link = u32;

    fn attach(&mut self) -> Result<u32, TrackerError> {
        self.log.record("attach");
        if self.fail_attach {
            return Err(TrackerError::Attach {
                program: "trace_execve".to_string(),
                tracepoint: "syscalls/sys_enter_execve".to_string(),
                error: "No such file or directory".to_string(),
            });
        }
        Ok(1)
    }

    fn detach(&mut self, _link: u32) -> Result<(), TrackerError> {
        self.log.record("detach");
        if self.fail_detach {
            return Err(TrackerError::Detach {
                program: "trace_execve".to_string(),
                tracepoint: "syscalls/sys_enter_execve".to_string(),
                error: "link not found".to_string(),
            });
        }
        Ok(())
    }

    fn release(self) {
        self.log.record("release");
        self.log.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ExecutionMaps for FakeProbe {
    type Error = String;

    fn for_each_count(&self, visit: &mut dyn FnMut(u32, u64)) -> Result<(), String> {
        self.log.record("read");
        self.maps.for_each_count(visit)
    }

    fn lookup_name(&self, pid: u32) -> Result<Option<ProcessName>, String> {
        self.maps.lookup_name(pid)
    }
}
