//! # Tracker Lifecycle
//!
//! Owns the loaded kernel object and its hook. [`Tracker::open_with`] either
//! returns a fully attached tracker or releases everything it acquired;
//! [`Tracker::close`] detaches then releases and may be called any number
//! of times. Dropping a tracker closes it.

use log::{debug, info, warn};

use crate::domain::{ProcessRecord, TrackerError};
use crate::tracking::snapshot::{read_all, ExecutionMaps, SnapshotSource};

/// A kernel object that has been loaded but not necessarily attached.
pub trait ProbeObject: Send + 'static {
    /// Handle to one attachment of the program.
    type Link: Send + 'static;

    /// Hook the loaded program to its event point.
    ///
    /// # Errors
    /// Returns [`TrackerError::Attach`] if the kernel refuses the attachment
    fn attach(&mut self) -> Result<Self::Link, TrackerError>;

    /// Remove a previous attachment.
    ///
    /// # Errors
    /// Returns an error if the link is no longer known to the kernel
    fn detach(&mut self, link: Self::Link) -> Result<(), TrackerError>;

    /// Unload the program and close every map descriptor.
    fn release(self);
}

/// Single owner of a loaded [`ProbeObject`] and its attachment.
pub struct Tracker<O: ProbeObject> {
    object: Option<O>,
    link: Option<O::Link>,
}

impl<O: ProbeObject> Tracker<O> {
    /// Load with `loader`, then attach.
    ///
    /// # Errors
    /// Returns the loader's error (normally [`TrackerError::Load`]) or the
    /// attach error. In the latter case the object is already released.
    pub fn open_with<F>(loader: F) -> Result<Self, TrackerError>
    where
        F: FnOnce() -> Result<O, TrackerError>,
    {
        let mut object = loader()?;

        match object.attach() {
            Ok(link) => {
                info!("✓ Tracker attached");
                Ok(Self { object: Some(object), link: Some(link) })
            }
            Err(e) => {
                warn!("Attach failed, releasing loaded object: {e}");
                object.release();
                Err(e)
            }
        }
    }

    /// Whether the object is still loaded.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.object.is_some()
    }

    /// Detach the hook, then release the object. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            match self.object.as_mut() {
                Some(object) => {
                    if let Err(e) = object.detach(link) {
                        warn!("Failed to detach tracker hook: {e}");
                    }
                }
                None => debug!("Dropping link without a loaded object"),
            }
        }

        if let Some(object) = self.object.take() {
            object.release();
            info!("✓ Tracker closed");
        }
    }
}

impl<O: ProbeObject + ExecutionMaps> SnapshotSource for Tracker<O> {
    fn read_all(&self) -> Result<Vec<ProcessRecord>, TrackerError> {
        let object = self.object.as_ref().ok_or(TrackerError::Closed)?;
        read_all(object)
    }
}

impl<O: ProbeObject> Drop for Tracker<O> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::testing::{FakeProbe, ProbeLog};

    #[test]
    fn test_open_attaches_after_load() {
        let log = ProbeLog::default();
        let tracker = Tracker::open_with(|| Ok(FakeProbe::new(&log))).unwrap();

        assert!(tracker.is_open());
        assert_eq!(log.calls(), vec!["attach"]);
    }

    #[test]
    fn test_load_failure_is_returned_untouched() {
        let result: Result<Tracker<FakeProbe>, _> =
            Tracker::open_with(|| Err(TrackerError::Load("verifier rejected".to_string())));

        assert!(matches!(result, Err(TrackerError::Load(_))));
    }

    #[test]
    fn test_attach_failure_releases_before_returning() {
        let log = ProbeLog::default();
        let result = Tracker::open_with(|| Ok(FakeProbe::new(&log).failing_attach()));

        assert!(matches!(result, Err(TrackerError::Attach { .. })));
        assert_eq!(log.calls(), vec!["attach", "release"]);
        assert_eq!(log.live_objects(), 0);
    }

    #[test]
    fn test_close_detaches_then_releases() {
        let log = ProbeLog::default();
        let mut tracker = Tracker::open_with(|| Ok(FakeProbe::new(&log))).unwrap();

        tracker.close();

        assert!(!tracker.is_open());
        assert_eq!(log.calls(), vec!["attach", "detach", "release"]);
    }

    #[test]
    fn test_close_twice_releases_once() {
        let log = ProbeLog::default();
        let mut tracker = Tracker::open_with(|| Ok(FakeProbe::new(&log))).unwrap();

        tracker.close();
        tracker.close();
        drop(tracker);

        assert_eq!(log.count("release"), 1);
        assert_eq!(log.count("detach"), 1);
    }

    #[test]
    fn test_detach_failure_still_releases() {
        let log = ProbeLog::default();
        let mut tracker =
            Tracker::open_with(|| Ok(FakeProbe::new(&log).failing_detach())).unwrap();

        tracker.close();

        assert_eq!(log.calls(), vec!["attach", "detach", "release"]);
        assert_eq!(log.live_objects(), 0);
    }

    #[test]
    fn test_drop_closes_open_tracker() {
        let log = ProbeLog::default();
        {
            let _tracker = Tracker::open_with(|| Ok(FakeProbe::new(&log))).unwrap();
        }
        assert_eq!(log.calls(), vec!["attach", "detach", "release"]);
    }

    #[test]
    fn test_read_after_close_fails() {
        let log = ProbeLog::default();
        let mut tracker = Tracker::open_with(|| Ok(FakeProbe::new(&log))).unwrap();
        tracker.close();

        assert!(matches!(tracker.read_all(), Err(TrackerError::Closed)));
    }
}
