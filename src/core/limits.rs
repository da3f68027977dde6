/*!
 * Tracking Limits
 * Centralized limits and defaults for leak tracking
 */

/// Default number of distinct capture-sites a tracker follows (100)
/// Sizes the per-slot counter table; sites beyond it saturate and drop
/// rather than evict an existing slot
pub const DEFAULT_TRACKED_SITES: usize = 100;
