/*!
 * Managed Resource
 * Owning state machine over one native handle
 */

use super::finalizer::BackupFinalizer;
use crate::core::errors::HandleError;
use crate::core::types::{HandleResult, RawHandle, Slot, NULL_HANDLE, SLOT_NONE};
use crate::handle::{Handle, Release};
use crate::tracker::{LeakTracker, SiteKey};
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Owning wrapper for one native resource.
///
/// Couples a [`Handle`], a [`Release`] implementation, and a leak-tracker
/// registration into a terminal Open -> Closed state machine. The first
/// release wins, whether an explicit [`close`](Self::close) or the armed
/// backup finalizer running on an unclosed drop; every later close is a
/// no-op, and every later use fails with [`HandleError::UseAfterRelease`].
///
/// All operations take `&self` and may race from any number of threads; the
/// check-closed / free / mark-closed sequence runs under one mutex, so
/// exactly one caller can perform the release.
///
/// Dropping without close still reclaims the native resource, but the
/// tracker counts it as lost. Call `close` when the release is intentional.
pub struct Managed<R: Release> {
    state: Mutex<State<R>>,
    tracker: Option<Arc<LeakTracker>>,
}

struct State<R: Release> {
    handle: Option<Arc<Handle>>,
    release: Option<Arc<R>>,
    finalizer: BackupFinalizer<R>,
    leak_slot: Slot,
    closed: bool,
}

impl<R: Release> State<R> {
    /// The live handle, or `UseAfterRelease` once released
    fn live(&self) -> HandleResult<&Arc<Handle>> {
        match &self.handle {
            Some(handle) if !handle.is_null() => Ok(handle),
            _ => Err(HandleError::UseAfterRelease),
        }
    }
}

impl<R: Release> Managed<R> {
    /// Obtain a native identifier through `init` and take ownership of it.
    ///
    /// The caller's source location becomes the tracker capture-site. `init`
    /// returning [`NULL_HANDLE`] fails the creation with
    /// [`HandleError::InvalidHandle`] and registers nothing: a failed
    /// acquisition leaves no trace in the counters and arms no finalizer.
    #[track_caller]
    pub fn create<F>(
        release: Arc<R>,
        tracker: Option<Arc<LeakTracker>>,
        init: F,
    ) -> HandleResult<Self>
    where
        F: FnOnce() -> RawHandle,
    {
        let site = SiteKey::caller();
        let raw = init();
        if raw == NULL_HANDLE {
            return Err(HandleError::InvalidHandle);
        }

        let leak_slot = match &tracker {
            Some(tracker) => tracker.open(Some(site)),
            None => SLOT_NONE,
        };

        let handle = Arc::new(Handle::new(raw));
        let finalizer = BackupFinalizer::armed(handle.clone(), release.clone(), tracker.clone());

        debug!("Opened {:?} (slot {})", handle, leak_slot);

        Ok(Self {
            state: Mutex::new(State {
                handle: Some(handle),
                release: Some(release),
                finalizer,
                leak_slot,
                closed: false,
            }),
            tracker,
        })
    }

    /// Fail unless the resource is still live.
    ///
    /// Resource-using operations call this (or [`with_handle`](Self::with_handle))
    /// first, turning released state into a detectable error instead of a
    /// dangling native call.
    pub fn validate(&self) -> HandleResult<()> {
        self.state.lock().live().map(|_| ())
    }

    /// Current native identifier.
    ///
    /// The value is a snapshot: it stops being valid the instant a racing
    /// close releases the resource. Prefer [`with_handle`](Self::with_handle)
    /// for native calls that must exclude that race.
    pub fn raw(&self) -> HandleResult<RawHandle> {
        self.state.lock().live().map(|handle| handle.get())
    }

    /// Validate, then run `f` on the identifier with the state locked, so a
    /// concurrent close cannot release the resource mid-call.
    pub fn with_handle<T>(&self, f: impl FnOnce(RawHandle) -> T) -> HandleResult<T> {
        let state = self.state.lock();
        let raw = state.live()?.get();
        Ok(f(raw))
    }

    /// Tracking slot this resource was registered under, for diagnostics
    pub fn leak_slot(&self) -> HandleResult<Slot> {
        let state = self.state.lock();
        state.live()?;
        Ok(state.leak_slot)
    }

    /// Whether the resource has been released
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Release the native resource.
    ///
    /// Idempotent: the first call from any thread frees exactly once and
    /// reports the close; every later call returns having done nothing.
    /// Never an error, so scoped cleanup can call it unconditionally.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;

        let handle = state.handle.take();
        let release = state.release.take();
        state.finalizer.disarm();

        let (Some(handle), Some(release)) = (handle, release) else {
            return;
        };
        if handle.is_null() {
            return;
        }

        let slot = release.free(&handle);
        handle.clear();
        if let Some(tracker) = &self.tracker {
            tracker.close(slot);
        }
        debug!("Closed native handle (slot {})", slot);
    }
}
