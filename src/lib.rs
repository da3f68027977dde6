/*!
 * FFI Cleaner Library
 * Lifecycle and leak accounting for handles to externally-owned resources
 *
 * Three guarantees: a resource is released at most once, an unreachable
 * resource is eventually released even when its owner never called close,
 * and releases the owner forgot are counted and attributable to the place
 * the resource was opened.
 */

pub mod core;
pub mod handle;
pub mod native;
pub mod resource;
pub mod tracker;

// Re-exports
pub use crate::core::errors::HandleError;
pub use crate::core::types::{
    HandleResult, RawHandle, Slot, NULL_HANDLE, SHARED_SLOT, SLOT_NONE, SLOT_SATURATED,
};
pub use handle::{Handle, Release};
pub use native::{EchoContext, EchoLib};
pub use resource::Managed;
pub use tracker::{LeakTracker, SiteKey, SlotStats, TrackerConfig, TrackerSnapshot};
