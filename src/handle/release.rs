/*!
 * Release Contract
 * What "freeing" means for one resource type at the native boundary
 */

use super::raw::Handle;
use crate::core::types::Slot;

/// Deallocation contract a resource type supplies.
///
/// `free` performs the native release for the identifier held by `handle`
/// and returns the leak-tracking slot the release should be reported under,
/// or [`SLOT_NONE`] when the handle is already absent. A null handle is a
/// safe no-op, never an error; implementations check it first and return the
/// sentinel. Keeping this decision behind a trait isolates "what does freeing
/// mean" from the lifecycle state machine that decides *when* to free.
///
/// One implementation is shared by every instance of a resource type and runs
/// on whichever thread wins the release race, hence `Send + Sync`.
///
/// [`SLOT_NONE`]: crate::core::types::SLOT_NONE
pub trait Release: Send + Sync {
    /// Free the native resource behind `handle`, returning the slot to
    /// report the release under
    fn free(&self, handle: &Handle) -> Slot;
}
