/*!
 * Leak Tracker Tests
 * Slot assignment, sentinel handling, and counter conservation
 */

use ffi_cleaner::{
    LeakTracker, SiteKey, Slot, TrackerConfig, SHARED_SLOT, SLOT_NONE, SLOT_SATURATED,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Disabled Mode
// ============================================================================

#[test]
fn test_disabled_tracker_is_pure_noop() {
    let tracker = LeakTracker::new("disabled", TrackerConfig::default());
    assert!(!tracker.is_enabled());
    assert_eq!(tracker.capacity(), 0);

    assert_eq!(tracker.open(Some(SiteKey::label("anywhere"))), SLOT_NONE);
    assert_eq!(tracker.open_here(), SLOT_NONE);
    tracker.close(SLOT_NONE);
    tracker.close(0);
    tracker.lost(0);

    assert_eq!(tracker.open_count(), -1);
    assert_eq!(tracker.closed_count(), -1);
    assert_eq!(tracker.lost_count(), -1);
    assert_eq!(tracker.in_flight(), -1);

    let snapshot = tracker.snapshot();
    assert!(!snapshot.enabled);
    assert_eq!(snapshot.open, -1);
    assert!(snapshot.slots.is_empty());
}

#[test]
fn test_zero_capacity_equals_disabled() {
    let config = TrackerConfig {
        enabled: true,
        capacity: 0,
        ..TrackerConfig::default()
    };
    let tracker = LeakTracker::new("zero-cap", config);
    assert!(!tracker.is_enabled());
    assert_eq!(tracker.open_count(), -1);
}

// ============================================================================
// Slot Assignment
// ============================================================================

#[test]
fn test_pooled_mode_uses_shared_slot() {
    let tracker = LeakTracker::new("pooled", TrackerConfig::detection_only());
    assert_eq!(tracker.open(Some(SiteKey::label("a"))), SHARED_SLOT);
    assert_eq!(tracker.open(Some(SiteKey::label("b"))), SHARED_SLOT);
    assert_eq!(tracker.tracked_sites(), 1);
    assert_eq!(tracker.open_count(), 2);
}

#[test]
fn test_site_mode_assigns_per_site() {
    let tracker = LeakTracker::new("sites", TrackerConfig::with_sites());
    let a = tracker.open(Some(SiteKey::label("pool-a")));
    let b = tracker.open(Some(SiteKey::label("pool-b")));
    let a_again = tracker.open(Some(SiteKey::label("pool-a")));

    assert_eq!((a, b), (0, 1));
    assert_eq!(a_again, a);
    assert_eq!(tracker.tracked_sites(), 2);
}

#[test]
fn test_missing_site_is_untracked_even_when_enabled() {
    let tracker = LeakTracker::new("missing", TrackerConfig::detection_only());
    assert_eq!(tracker.open(None), SLOT_NONE);
    assert_eq!(tracker.open_count(), 0);
}

#[test]
fn test_saturation_drops_and_keeps_dropping() {
    let config = TrackerConfig {
        capacity: 3,
        ..TrackerConfig::with_sites()
    };
    let tracker = LeakTracker::new("tiny", config);

    for slot in 0..3 {
        assert_eq!(
            tracker.open(Some(SiteKey::label(format!("site-{}", slot)))),
            slot
        );
    }
    assert_eq!(tracker.open(Some(SiteKey::label("overflow"))), SLOT_SATURATED);
    assert_eq!(tracker.open(Some(SiteKey::label("overflow"))), SLOT_SATURATED);
    assert_eq!(tracker.open(Some(SiteKey::label("other-overflow"))), SLOT_SATURATED);

    // Established sites are unaffected by the overflow.
    assert_eq!(tracker.open(Some(SiteKey::label("site-1"))), 1);
    assert_eq!(tracker.tracked_sites(), 3);
    assert_eq!(tracker.open_count(), 4);
}

// ============================================================================
// Report Paths
// ============================================================================

#[test]
fn test_sentinels_and_garbage_slots_are_ignored() {
    let config = TrackerConfig {
        capacity: 1,
        ..TrackerConfig::detection_only()
    };
    let tracker = LeakTracker::new("garbage", config);
    tracker.open(Some(SiteKey::label("a")));

    for slot in [SLOT_NONE, SLOT_SATURATED, -50, 1, 100, Slot::MAX] {
        tracker.close(slot);
        tracker.lost(slot);
    }

    // Only slot 0 is in range; nothing above touched it.
    assert_eq!(tracker.closed_count(), 0);
    assert_eq!(tracker.lost_count(), 0);
    assert_eq!(tracker.in_flight(), 1);
}

#[test]
fn test_close_and_lost_are_independent_tallies() {
    let tracker = LeakTracker::new("tallies", TrackerConfig::with_sites());
    let a = tracker.open(Some(SiteKey::label("a")));
    tracker.open(Some(SiteKey::label("a")));
    tracker.open(Some(SiteKey::label("a")));

    tracker.close(a);
    tracker.lost(a);

    assert_eq!(tracker.open_count(), 3);
    assert_eq!(tracker.closed_count(), 1);
    assert_eq!(tracker.lost_count(), 1);
    assert_eq!(tracker.in_flight(), 1);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshot_is_a_full_breakdown() {
    let tracker = LeakTracker::new("breakdown", TrackerConfig::with_sites());
    let a = tracker.open(Some(SiteKey::label("alpha")));
    tracker.open(Some(SiteKey::label("alpha")));
    tracker.close(a);
    let b = tracker.open(Some(SiteKey::label("beta")));
    tracker.lost(b);

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.name, "breakdown");
    assert_eq!(snapshot.tracked_sites, 2);
    assert_eq!(snapshot.open, 3);
    assert_eq!(snapshot.closed, 1);
    assert_eq!(snapshot.lost, 1);
    assert_eq!(snapshot.in_flight, 1);
    assert_eq!(snapshot.open, snapshot.closed + snapshot.lost + snapshot.in_flight);

    let alpha = &snapshot.slots[0];
    assert_eq!(alpha.site, "alpha");
    assert_eq!((alpha.open, alpha.closed, alpha.lost), (2, 1, 0));
    assert_eq!(alpha.in_flight, 1);

    let beta = &snapshot.slots[1];
    assert_eq!(beta.site, "beta");
    assert_eq!((beta.open, beta.closed, beta.lost), (1, 0, 1));
    assert_eq!(beta.in_flight, 0);

    assert!(snapshot.has_lost());
    assert_eq!(snapshot.lost_sites().count(), 1);
}

#[test]
fn test_snapshot_serializes_to_json() {
    let tracker = LeakTracker::new("json", TrackerConfig::with_sites());
    let slot = tracker.open(Some(SiteKey::label("serialized")));
    tracker.close(slot);

    let json = serde_json::to_string(&tracker.snapshot()).unwrap();
    assert!(json.contains("\"name\":\"json\""));
    assert!(json.contains("\"serialized\""));
}

#[test]
fn test_snapshot_display_is_human_readable() {
    let tracker = LeakTracker::new("display", TrackerConfig::detection_only());
    tracker.open(Some(SiteKey::label("x")));

    let rendered = tracker.snapshot().to_string();
    assert!(rendered.contains("leak tracker 'display'"));
    assert!(rendered.contains("open=1"));
    assert!(rendered.contains("<shared>"));
}

// ============================================================================
// Conservation Property
// ============================================================================

proptest! {
    /// Any interleaving of opens with matched closes and losses keeps
    /// open == closed + lost + in_flight, in aggregate and per slot, with
    /// in-flight never negative.
    #[test]
    fn prop_counters_conserve_opens(ops in proptest::collection::vec(0u8..3u8, 1..200)) {
        let config = TrackerConfig {
            capacity: 8,
            ..TrackerConfig::with_sites()
        };
        let tracker = LeakTracker::new("conservation", config);
        let labels = ["a", "b", "c", "d"];
        let mut in_flight: Vec<Slot> = Vec::new();
        let mut opens = 0usize;

        for op in ops {
            match op {
                0 => {
                    let label = labels[opens % labels.len()];
                    let slot = tracker.open(Some(SiteKey::label(label)));
                    prop_assert!(slot >= 0);
                    in_flight.push(slot);
                    opens += 1;
                }
                1 => {
                    if let Some(slot) = in_flight.pop() {
                        tracker.close(slot);
                    }
                }
                _ => {
                    if let Some(slot) = in_flight.pop() {
                        tracker.lost(slot);
                    }
                }
            }

            let snapshot = tracker.snapshot();
            prop_assert_eq!(
                snapshot.open,
                snapshot.closed + snapshot.lost + snapshot.in_flight
            );
            prop_assert!(snapshot.in_flight >= 0);
            prop_assert_eq!(snapshot.in_flight, in_flight.len() as i64);
            for stats in &snapshot.slots {
                prop_assert!(stats.in_flight >= 0);
            }
        }
    }
}
