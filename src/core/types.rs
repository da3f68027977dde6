/*!
 * Core Types
 * Common types used across the handle, resource, and tracker modules
 */

/// Opaque native identifier handed out by the externally-owned side.
///
/// The crate never interprets the value; it only stores it, passes it back
/// through [`Release`](crate::handle::Release), and zeroes it on release.
pub type RawHandle = u64;

/// A `RawHandle` that was never populated, or has been released.
pub const NULL_HANDLE: RawHandle = 0;

/// Index into a leak tracker's counter table.
///
/// Non-negative values address a tracked slot; negative values are sentinels
/// that the close/lost reporting paths silently ignore.
pub type Slot = i32;

/// Sentinel slot: tracker disabled, or no capture-site was supplied.
pub const SLOT_NONE: Slot = -1;

/// Sentinel slot: distinct-site capacity exceeded, event dropped from tracking.
pub const SLOT_SATURATED: Slot = -2;

/// Slot shared by every open when site-keyed tracking is off.
pub const SHARED_SLOT: Slot = 0;

/// Common result type for handle lifecycle operations
pub type HandleResult<T> = Result<T, super::errors::HandleError>;
