/*!
 * Tracker Snapshots
 * Read-only views of leak counters for the monitoring boundary
 */

use crate::core::types::Slot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Counters for one tracked slot at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SlotStats {
    pub slot: Slot,
    /// Capture-site key; empty for the shared slot
    pub site: String,
    pub open: u64,
    pub closed: u64,
    pub lost: u64,
    /// open - closed - lost; negative only if the slot was fed reports
    /// outside the lifecycle protocol
    pub in_flight: i64,
}

/// Consistent view of one tracker's counters, for external monitoring.
///
/// Aggregate counts are -1 when the tracker is disabled, so a dashboard can
/// tell "disabled" apart from "zero activity".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerSnapshot {
    pub name: String,
    pub enabled: bool,
    pub capacity: usize,
    /// Distinct sites holding a slot right now
    pub tracked_sites: usize,
    pub open: i64,
    pub closed: i64,
    pub lost: i64,
    pub in_flight: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub slots: Vec<SlotStats>,
}

impl TrackerSnapshot {
    pub(crate) fn disabled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: false,
            capacity: 0,
            tracked_sites: 0,
            open: -1,
            closed: -1,
            lost: -1,
            in_flight: -1,
            slots: Vec::new(),
        }
    }

    /// Slots that recorded at least one lost reference
    pub fn lost_sites(&self) -> impl Iterator<Item = &SlotStats> {
        self.slots.iter().filter(|stats| stats.lost > 0)
    }

    /// Whether any slot recorded a lost reference
    pub fn has_lost(&self) -> bool {
        self.enabled && self.lost > 0
    }
}

impl fmt::Display for TrackerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return write!(f, "leak tracker '{}': disabled", self.name);
        }
        writeln!(
            f,
            "leak tracker '{}': open={} closed={} lost={} in_flight={} ({} sites, capacity {})",
            self.name,
            self.open,
            self.closed,
            self.lost,
            self.in_flight,
            self.tracked_sites,
            self.capacity
        )?;
        for stats in &self.slots {
            let site = if stats.site.is_empty() {
                "<shared>"
            } else {
                stats.site.as_str()
            };
            writeln!(
                f,
                "  slot {:>3} [{}]: open={} closed={} lost={} in_flight={}",
                stats.slot, site, stats.open, stats.closed, stats.lost, stats.in_flight
            )?;
        }
        Ok(())
    }
}
