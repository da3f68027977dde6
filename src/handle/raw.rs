/*!
 * Raw Handle
 * Mutable holder of one opaque native identifier
 */

use crate::core::types::{RawHandle, NULL_HANDLE};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Holder of one opaque native identifier.
///
/// `0` means absent: the handle was never populated, or the resource behind
/// it has been released. The owning [`Managed`](crate::resource::Managed) and
/// its backup finalizer share one `Handle` through an `Arc`; whichever path
/// performs the release zeroes it, so the other observes the release without
/// taking a lock.
pub struct Handle {
    value: AtomicU64,
}

impl Handle {
    /// Wrap a native identifier
    #[inline]
    pub fn new(value: RawHandle) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    /// Current identifier, `NULL_HANDLE` once released
    #[inline]
    pub fn get(&self) -> RawHandle {
        self.value.load(Ordering::Acquire)
    }

    /// Whether the identifier is absent or released
    #[inline]
    pub fn is_null(&self) -> bool {
        self.get() == NULL_HANDLE
    }

    /// Zero the identifier, returning the previous value.
    ///
    /// The winning releaser calls this once; any later call sees and returns
    /// `NULL_HANDLE`.
    #[inline]
    pub fn clear(&self) -> RawHandle {
        self.value.swap(NULL_HANDLE, Ordering::AcqRel)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle [{:#x}]", self.get())
    }
}
