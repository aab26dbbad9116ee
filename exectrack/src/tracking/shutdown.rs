//! # Shutdown Coordination
//!
//! Waits for a termination request, then tears down in a fixed order:
//! stop the polling loop, wait for its last read, close the tracker.
//! A polling loop that dies on its own ends the wait as well.

use std::future::Future;

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use tokio::signal::unix::{signal, SignalKind};

use crate::tracking::poller::RunningPoller;
use crate::tracking::snapshot::ExecutionMaps;
use crate::tracking::tracker::{ProbeObject, Tracker};

/// Resolve on SIGINT or SIGTERM with the name of the signal received.
///
/// # Errors
/// Returns an error if the signal handlers cannot be installed
pub async fn termination_signal() -> Result<&'static str> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for SIGINT")?;
            Ok("SIGINT")
        }
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

/// Run until `shutdown` resolves or the loop exits, then stop `running` and
/// close its tracker.
///
/// Teardown happens even when `shutdown` resolves to an error; that error is
/// returned afterwards.
///
/// # Errors
/// Returns the shutdown future's error, or an error if the polling task failed
pub async fn run_until<O, F>(running: RunningPoller<Tracker<O>>, shutdown: F) -> Result<()>
where
    O: ProbeObject + ExecutionMaps,
    F: Future<Output = Result<&'static str>>,
{
    let reason = tokio::select! {
        reason = shutdown => reason,
        () = running.exited() => Err(anyhow!("Polling loop exited unexpectedly")),
    };
    match &reason {
        Ok(signal) => info!("Received {signal}, shutting down..."),
        Err(e) => warn!("Shutdown listener failed ({e:#}), shutting down..."),
    }

    let mut tracker = running.stop().await?;
    tracker.close();

    reason.map(|_| ())
}
