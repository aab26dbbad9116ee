//! Output sinks for snapshots produced by the polling loop.

use log::{info, warn};

use crate::domain::{ProcessRecord, TrackerError};

/// Receives the outcome of every tick.
pub trait RecordSink: Send + 'static {
    /// A snapshot was taken successfully.
    fn report(&mut self, records: &[ProcessRecord]);

    /// A snapshot failed; polling continues.
    fn report_error(&mut self, error: &TrackerError);
}

/// Writes each snapshot as log lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn report(&mut self, records: &[ProcessRecord]) {
        info!("{}", summary_line(records));
        for record in records {
            info!("{}", format_record(record));
        }
        info!("---");
    }

    fn report_error(&mut self, error: &TrackerError) {
        warn!("Error getting process info: {error}");
    }
}

/// Header line for a snapshot, e.g. `Tracked 2 processes:`.
#[must_use]
pub fn summary_line(records: &[ProcessRecord]) -> String {
    format!("Tracked {} processes:", records.len())
}

#[must_use]
pub fn format_record(record: &ProcessRecord) -> String {
    format!("PID: {}, Name: {}, Executions: {}", record.pid.0, record.name, record.exec_count)
}
