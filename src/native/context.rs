/*!
 * Echo Context
 * Reference resource wrapper over the simulated native library
 */

use super::library::EchoLib;
use crate::core::errors::HandleError;
use crate::core::types::{HandleResult, Slot, SLOT_NONE};
use crate::handle::{Handle, Release};
use crate::resource::Managed;
use crate::tracker::LeakTracker;
use std::sync::Arc;

/// Release function for [`EchoLib`] cells
struct EchoRelease {
    lib: Arc<EchoLib>,
}

impl Release for EchoRelease {
    fn free(&self, handle: &Handle) -> Slot {
        if handle.is_null() {
            return SLOT_NONE;
        }
        self.lib.release(handle.get())
    }
}

/// Owning wrapper around one [`EchoLib`] cell.
///
/// The reference embedding of [`Managed`], showing the shape a resource type
/// takes: create, perform the wrapped operation while live, close when done.
/// Dropping an unclosed context still releases the cell; the tracker counts
/// it as lost.
pub struct EchoContext {
    inner: Managed<EchoRelease>,
    lib: Arc<EchoLib>,
}

impl EchoContext {
    /// Acquire a cell and wrap it. The caller's source location becomes the
    /// tracker capture-site.
    #[track_caller]
    pub fn create(lib: Arc<EchoLib>, tracker: Option<Arc<LeakTracker>>) -> HandleResult<Self> {
        let release = Arc::new(EchoRelease { lib: lib.clone() });
        let inner = Managed::create(release, tracker, || lib.acquire())?;

        // The native side stores the slot so its release can hint it back.
        let slot = inner.leak_slot()?;
        lib.tag_slot(inner.raw()?, slot);

        Ok(Self { inner, lib })
    }

    /// The wrapped native operation
    pub fn execute(&self) -> HandleResult<String> {
        self.inner
            .with_handle(|raw| self.lib.perform(raw))?
            .ok_or(HandleError::UseAfterRelease)
    }

    /// Fail unless the context is still live
    pub fn validate(&self) -> HandleResult<()> {
        self.inner.validate()
    }

    /// Release the cell. Idempotent; see [`Managed::close`].
    pub fn close(&self) {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Tracking slot this context was registered under
    pub fn leak_slot(&self) -> HandleResult<Slot> {
        self.inner.leak_slot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerConfig;

    #[test]
    fn test_execute_echoes_payload() {
        let lib = Arc::new(EchoLib::new());
        let context = EchoContext::create(lib.clone(), None).unwrap();
        assert_eq!(context.execute().unwrap(), EchoLib::MESSAGE);
        context.close();
        assert_eq!(context.execute(), Err(HandleError::UseAfterRelease));
    }

    #[test]
    fn test_create_tags_native_cell() {
        let lib = Arc::new(EchoLib::new());
        let tracker = Arc::new(LeakTracker::new("ctx", TrackerConfig::detection_only()));
        let context = EchoContext::create(lib.clone(), Some(tracker.clone())).unwrap();

        let slot = context.leak_slot().unwrap();
        context.close();

        // Close travelled through the native hint back into the tracker.
        assert_eq!(tracker.closed_count(), 1);
        assert_eq!(slot, 0);
        assert_eq!(lib.live(), 0);
    }

    #[test]
    fn test_drop_releases_cell() {
        let lib = Arc::new(EchoLib::new());
        {
            let _context = EchoContext::create(lib.clone(), None).unwrap();
            assert_eq!(lib.live(), 1);
        }
        assert_eq!(lib.live(), 0);
        assert_eq!(lib.released(), 1);
    }
}
