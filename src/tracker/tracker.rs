/*!
 * Leak Tracker
 * Process-wide open/closed/lost accounting keyed by capture-site
 */

use super::config::TrackerConfig;
use super::site::SiteKey;
use super::stats::{SlotStats, TrackerSnapshot};
use crate::core::types::{Slot, SHARED_SLOT, SLOT_NONE, SLOT_SATURATED};
use ahash::RandomState;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::info;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

/// Monotonic counters for one slot.
///
/// `open` never decrements; in-flight is derived as open - closed - lost, so
/// a snapshot always explains where every open went.
#[derive(Debug, Default)]
struct SlotCounters {
    open: AtomicU64,
    closed: AtomicU64,
    lost: AtomicU64,
}

impl SlotCounters {
    #[inline]
    fn in_flight(&self) -> i64 {
        let open = self.open.load(Ordering::Relaxed) as i64;
        let closed = self.closed.load(Ordering::Relaxed) as i64;
        let lost = self.lost.load(Ordering::Relaxed) as i64;
        open - closed - lost
    }
}

/// Process-wide registry of open/closed/lost counts for one resource type.
///
/// Counter updates are single atomic bumps taken under the shared side of
/// `sync`; count queries and snapshots take the exclusive side, so totals are
/// never read while a bump is mid-flight. The site-to-slot table is
/// insert-or-lookup on a concurrent map: the first writer for a new key wins
/// the slot, racing losers observe and reuse it.
///
/// All report paths accept sentinel and out-of-range slots and ignore them,
/// so callers can thread a slot through unconditionally.
pub struct LeakTracker {
    name: String,
    enabled: bool,
    log_sites: bool,
    fail_on_empty_site: bool,
    capacity: usize,
    /// Counter table, one entry per assignable slot. Empty when disabled.
    slots: Box<[SlotCounters]>,
    site_to_slot: DashMap<SiteKey, Slot, RandomState>,
    /// Next slot to hand out. Keeps advancing past capacity so saturation
    /// never reassigns an occupied slot.
    next_slot: AtomicI32,
    /// Shared side for counter bumps, exclusive side for consistent reads.
    sync: RwLock<()>,
}

impl LeakTracker {
    /// Construct a tracker named for the resource type it watches.
    ///
    /// A `capacity` of zero disables the tracker no matter what `enabled`
    /// says; both forms behave identically.
    ///
    /// # Panics
    /// Panics if `name` is blank. A tracker exists to be read on the
    /// monitoring boundary, so it must be identifiable.
    pub fn new(name: impl Into<String>, config: TrackerConfig) -> Self {
        let name = name.into();
        let name = name.trim().to_string();
        assert!(!name.is_empty(), "leak tracker name cannot be blank");

        let enabled = config.enabled && config.capacity > 0;
        let capacity = if enabled { config.capacity } else { 0 };

        let slots: Box<[SlotCounters]> =
            (0..capacity).map(|_| SlotCounters::default()).collect();
        let site_to_slot = DashMap::with_hasher(RandomState::new());

        if enabled && !config.log_sites {
            // Pooled mode: one slot, registered up front so snapshots list it.
            site_to_slot.insert(SiteKey::shared(), SHARED_SLOT);
        }

        if enabled {
            info!(
                "Leak tracker '{}' enabled: capacity={}, site tracking={}",
                name, capacity, config.log_sites
            );
        }

        Self {
            name,
            enabled,
            log_sites: config.log_sites,
            fail_on_empty_site: config.fail_on_empty_site,
            capacity,
            slots,
            site_to_slot,
            next_slot: AtomicI32::new(if enabled && !config.log_sites { 1 } else { 0 }),
            sync: RwLock::new(()),
        }
    }

    /// Register an open at the caller's source location.
    ///
    /// Disabled trackers skip the capture entirely, so the disabled path
    /// costs one branch.
    #[track_caller]
    pub fn open_here(&self) -> Slot {
        if !self.enabled {
            return SLOT_NONE;
        }
        self.open(Some(SiteKey::caller()))
    }

    /// Register an open for `site`, returning the slot every later close or
    /// lost report for that resource must carry.
    ///
    /// Disabled trackers and `None` captures answer [`SLOT_NONE`]; a distinct
    /// site beyond capacity answers [`SLOT_SATURATED`] and the open is
    /// dropped from tracking. Both sentinels are safe to hand back to
    /// [`close`](Self::close) and [`lost`](Self::lost).
    pub fn open(&self, site: Option<SiteKey>) -> Slot {
        if !self.enabled {
            return SLOT_NONE;
        }
        let Some(site) = site else {
            return SLOT_NONE;
        };

        let slot = if self.log_sites {
            if self.fail_on_empty_site && site.is_empty() {
                panic!(
                    "leak tracker '{}': refusing to track an empty capture-site",
                    self.name
                );
            }
            self.assign_slot(site)
        } else {
            SHARED_SLOT
        };

        if self.out_of_range(slot) {
            return slot;
        }
        let _shared = self.sync.read();
        self.slots[slot as usize].open.fetch_add(1, Ordering::Relaxed);
        slot
    }

    /// Record an explicit close for `slot`. Sentinel and out-of-range slots
    /// are ignored.
    pub fn close(&self, slot: Slot) {
        if !self.enabled || self.out_of_range(slot) {
            return;
        }
        let _shared = self.sync.read();
        self.slots[slot as usize]
            .closed
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lost reference for `slot`: the owner went away without an
    /// explicit close and the backup finalizer performed the release.
    /// Protocol accounting, not a memory-safety event.
    pub fn lost(&self, slot: Slot) {
        if !self.enabled || self.out_of_range(slot) {
            return;
        }
        let _shared = self.sync.read();
        self.slots[slot as usize]
            .lost
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Insert-or-lookup on the site table.
    fn assign_slot(&self, site: SiteKey) -> Slot {
        if let Some(existing) = self.site_to_slot.get(&site) {
            return *existing;
        }
        match self.site_to_slot.entry(site) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let next = self.next_slot.fetch_add(1, Ordering::Relaxed);
                if next as usize >= self.capacity {
                    // Saturated: the site is not remembered, so every later
                    // open from it lands here again and stays untracked.
                    return SLOT_SATURATED;
                }
                entry.insert(next);
                next
            }
        }
    }

    #[inline]
    fn out_of_range(&self, slot: Slot) -> bool {
        slot < 0 || slot as usize >= self.capacity
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Distinct sites holding a slot right now
    pub fn tracked_sites(&self) -> usize {
        self.site_to_slot.len()
    }

    /// Total opens across every slot, -1 when disabled
    pub fn open_count(&self) -> i64 {
        self.total(|counters| &counters.open)
    }

    /// Total explicit closes across every slot, -1 when disabled
    pub fn closed_count(&self) -> i64 {
        self.total(|counters| &counters.closed)
    }

    /// Total lost references across every slot, -1 when disabled
    pub fn lost_count(&self) -> i64 {
        self.total(|counters| &counters.lost)
    }

    /// Opens not yet matched by a close or a lost report, -1 when disabled
    pub fn in_flight(&self) -> i64 {
        if !self.enabled {
            return -1;
        }
        let _exclusive = self.sync.write();
        self.slots.iter().map(SlotCounters::in_flight).sum()
    }

    fn total<F>(&self, field: F) -> i64
    where
        F: Fn(&SlotCounters) -> &AtomicU64,
    {
        if !self.enabled {
            return -1;
        }
        let _exclusive = self.sync.write();
        self.slots
            .iter()
            .map(|counters| field(counters).load(Ordering::Relaxed) as i64)
            .sum()
    }

    /// Consistent view of every counter for the monitoring boundary.
    ///
    /// Taken under the exclusive side of the sync lock: no report lands
    /// between reading one slot and the next, so the aggregate always obeys
    /// open == closed + lost + in_flight.
    pub fn snapshot(&self) -> TrackerSnapshot {
        if !self.enabled {
            return TrackerSnapshot::disabled(&self.name);
        }

        let _exclusive = self.sync.write();

        let mut slots: Vec<SlotStats> = self
            .site_to_slot
            .iter()
            .filter(|entry| !self.out_of_range(*entry.value()))
            .map(|entry| {
                let slot = *entry.value();
                let counters = &self.slots[slot as usize];
                let open = counters.open.load(Ordering::Relaxed);
                let closed = counters.closed.load(Ordering::Relaxed);
                let lost = counters.lost.load(Ordering::Relaxed);
                SlotStats {
                    slot,
                    site: entry.key().as_str().to_string(),
                    open,
                    closed,
                    lost,
                    in_flight: open as i64 - closed as i64 - lost as i64,
                }
            })
            .collect();
        slots.sort_unstable_by_key(|stats| stats.slot);

        let open: i64 = slots.iter().map(|stats| stats.open as i64).sum();
        let closed: i64 = slots.iter().map(|stats| stats.closed as i64).sum();
        let lost: i64 = slots.iter().map(|stats| stats.lost as i64).sum();

        TrackerSnapshot {
            name: self.name.clone(),
            enabled: true,
            capacity: self.capacity,
            tracked_sites: slots.len(),
            open,
            closed,
            lost,
            in_flight: open - closed - lost,
            slots,
        }
    }
}
