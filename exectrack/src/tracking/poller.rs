//! # Polling Loop
//!
//! Drives a [`SnapshotSource`] on a fixed period and hands every outcome to
//! a [`RecordSink`].
//!
//! ```text
//! Poller (idle) ──start()──▶ RunningPoller (running) ──stop().await──▶ source (stopped)
//! ```
//!
//! The source is moved onto the blocking pool for each read and moved back
//! afterwards, so two reads can never run at the same time. Missed ticks are
//! skipped rather than queued. Cancellation is only observed between ticks:
//! `stop()` waits for an in-flight read to finish. A panicking read ends the
//! loop (the source is dropped while unwinding) and is logged at error level;
//! [`RunningPoller::exited`] resolves so the owner can tear down.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::tracking::report::RecordSink;
use crate::tracking::snapshot::SnapshotSource;

/// Default poll period in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 2;

/// A configured but not yet started polling loop.
pub struct Poller<S, K> {
    source: S,
    sink: K,
    period: Duration,
}

impl<S: SnapshotSource, K: RecordSink> Poller<S, K> {
    #[must_use]
    pub fn new(source: S, sink: K, period: Duration) -> Self {
        Self { source, sink, period }
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// The first snapshot is taken one full period after this call.
    #[must_use]
    pub fn start(self) -> RunningPoller<S> {
        let cancel = CancellationToken::new();
        let exited = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            self.source,
            self.sink,
            self.period,
            cancel.clone(),
            exited.clone(),
        ));
        RunningPoller { cancel, exited, task }
    }
}

/// Handle to a running loop; the only way to get the source back is [`stop`](Self::stop).
pub struct RunningPoller<S> {
    cancel: CancellationToken,
    exited: CancellationToken,
    task: JoinHandle<Result<S>>,
}

impl<S: SnapshotSource> RunningPoller<S> {
    /// Resolves once the loop has ended for any reason.
    ///
    /// Without a prior [`stop`](Self::stop) this only happens when a read panicked.
    pub async fn exited(&self) {
        self.exited.cancelled().await;
    }

    /// Stop scheduling ticks, wait for the current one, and return the source.
    ///
    /// # Errors
    /// Returns an error if a read panicked; the source was dropped while unwinding.
    pub async fn stop(self) -> Result<S> {
        self.cancel.cancel();
        self.task.await.context("Polling task failed")?
    }
}

async fn poll_loop<S, K>(
    mut source: S,
    mut sink: K,
    period: Duration,
    cancel: CancellationToken,
    exited: CancellationToken,
) -> Result<S>
where
    S: SnapshotSource,
    K: RecordSink,
{
    // Fires on every way out of this function, including unwinding
    let _exited = exited.drop_guard();

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Polling every {:.1}s", period.as_secs_f64());

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let joined = tokio::task::spawn_blocking(move || {
            let result = source.read_all();
            (source, result)
        })
        .await;
        let (returned, result) = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Snapshot reader panicked, polling stopped: {e}");
                return Err(e).context("Snapshot reader panicked");
            }
        };
        source = returned;

        match result {
            Ok(records) => sink.report(&records),
            Err(e) => sink.report_error(&e),
        }
    }

    debug!("Polling loop stopped");
    Ok(source)
}
