/*!
 * Backup Finalizer
 * Deferred release for resources whose owner never called close
 */

use crate::handle::{Handle, Release};
use crate::tracker::LeakTracker;
use log::debug;
use std::sync::Arc;

/// Deferred release action, armed at creation and disarmed by explicit close.
///
/// Holds aliases to the same handle and release function the owning
/// [`Managed`](super::Managed) holds. While armed, dropping it performs the
/// release itself and reports the slot as lost: the native resource is
/// reclaimed on every path, and only the close protocol was violated.
/// Explicit close disarms it first, which turns the drop into a no-op.
pub(crate) struct BackupFinalizer<R: Release> {
    handle: Option<Arc<Handle>>,
    release: Option<Arc<R>>,
    tracker: Option<Arc<LeakTracker>>,
}

impl<R: Release> BackupFinalizer<R> {
    pub(crate) fn armed(
        handle: Arc<Handle>,
        release: Arc<R>,
        tracker: Option<Arc<LeakTracker>>,
    ) -> Self {
        Self {
            handle: Some(handle),
            release: Some(release),
            tracker,
        }
    }

    /// Drop both aliases so the eventual drop does nothing. The close path
    /// calls this the moment it claims the release for itself.
    pub(crate) fn disarm(&mut self) {
        self.handle = None;
        self.release = None;
        self.tracker = None;
    }
}

impl<R: Release> Drop for BackupFinalizer<R> {
    fn drop(&mut self) {
        let (Some(handle), Some(release)) = (self.handle.take(), self.release.take()) else {
            return;
        };
        if handle.is_null() {
            return;
        }

        let slot = release.free(&handle);
        handle.clear();
        if let Some(tracker) = self.tracker.take() {
            tracker.lost(slot);
        }
        debug!("Backup finalizer reclaimed an unclosed handle (slot {})", slot);
    }
}
