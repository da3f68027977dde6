/*!
 * Simulated Native Library
 * In-process stand-in for the externally-owned side of the boundary
 */

use crate::core::types::{RawHandle, Slot, NULL_HANDLE, SLOT_NONE};
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Canary stamped into every live cell. Released cells are removed outright,
/// so any miss on a non-null identifier means a double free or a forged
/// handle.
const LIVE_CANARY: u32 = 0xFEED_BEEF;

/// One simulated native allocation
struct Cell {
    canary: u32,
    /// The "allocated" payload the wrapped operation reads back
    message: String,
    /// Leak-tracking slot tagged in after creation; handed back as the
    /// release hint
    slot: Slot,
}

/// In-process simulated native library.
///
/// Stands in for the real native side: hands out opaque non-zero
/// identifiers, performs the one wrapped operation (echoing the cell's
/// payload), and releases cells exactly once. Releasing the same identifier
/// twice panics, the way a real native side would trap on a poisoned canary,
/// which makes exactly-once release directly observable in tests.
pub struct EchoLib {
    cells: DashMap<RawHandle, Cell, RandomState>,
    next_handle: AtomicU64,
    released: AtomicU64,
}

impl EchoLib {
    /// Payload every cell carries
    pub const MESSAGE: &'static str = "echo from the native side";

    pub fn new() -> Self {
        Self {
            cells: DashMap::with_hasher(RandomState::new()),
            // Non-zero base: no identifier may ever collide with NULL_HANDLE.
            next_handle: AtomicU64::new(0x1000),
            released: AtomicU64::new(0),
        }
    }

    /// Allocate a cell and return its identifier. Never `NULL_HANDLE`.
    pub fn acquire(&self) -> RawHandle {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.cells.insert(
            handle,
            Cell {
                canary: LIVE_CANARY,
                message: Self::MESSAGE.to_string(),
                slot: SLOT_NONE,
            },
        );
        handle
    }

    /// Tag a live cell with its leak-tracking slot so release can hint it
    /// back. Unknown identifiers are ignored.
    pub fn tag_slot(&self, handle: RawHandle, slot: Slot) {
        if let Some(mut cell) = self.cells.get_mut(&handle) {
            cell.slot = slot;
        }
    }

    /// The wrapped native operation: read back the cell's payload.
    /// `None` for unknown or released identifiers.
    pub fn perform(&self, handle: RawHandle) -> Option<String> {
        self.cells.get(&handle).map(|cell| {
            assert_eq!(cell.canary, LIVE_CANARY, "native cell canary corrupted");
            cell.message.clone()
        })
    }

    /// Release a cell, returning its slot hint.
    ///
    /// # Panics
    /// Panics on a double free or a forged identifier, the simulated
    /// equivalent of the native side trapping on a poisoned canary.
    pub fn release(&self, handle: RawHandle) -> Slot {
        if handle == NULL_HANDLE {
            return SLOT_NONE;
        }
        let (_, cell) = self
            .cells
            .remove(&handle)
            .unwrap_or_else(|| panic!("double free of native handle {:#x}", handle));
        assert_eq!(cell.canary, LIVE_CANARY, "native cell canary corrupted");
        self.released.fetch_add(1, Ordering::Relaxed);
        cell.slot
    }

    /// Cells still live right now: the ground truth a leak tracker's
    /// in-flight count is measured against
    pub fn live(&self) -> usize {
        self.cells.len()
    }

    /// Total cells ever released
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }
}

impl Default for EchoLib {
    fn default() -> Self {
        Self::new()
    }
}
