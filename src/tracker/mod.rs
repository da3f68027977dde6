/*!
 * Leak Tracker Module
 * Open/closed/lost accounting with per-site diagnostics
 */

mod config;
mod site;
mod stats;
mod tracker;

pub use config::TrackerConfig;
pub use site::SiteKey;
pub use stats::{SlotStats, TrackerSnapshot};
pub use tracker::LeakTracker;
