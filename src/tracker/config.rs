/*!
 * Tracker Configuration
 * Process-wide leak-detection settings, read once at construction
 */

use crate::core::limits::DEFAULT_TRACKED_SITES;
use serde::{Deserialize, Serialize};

/// Immutable configuration record for a [`LeakTracker`](super::LeakTracker).
///
/// Read from the environment (or built in code) at startup and handed to the
/// constructor; nothing here changes at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackerConfig {
    /// Master switch. Off means every tracker operation is a no-op and every
    /// count query answers the disabled sentinel (-1).
    pub enabled: bool,
    /// Key counters by capture-site instead of the single shared slot.
    pub log_sites: bool,
    /// Panic when site-keyed tracking stores an empty capture-site. Off by
    /// default; a harness switch for catching broken capture plumbing.
    pub fail_on_empty_site: bool,
    /// Maximum number of distinct tracked slots. `0` disables the tracker.
    pub capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_sites: false,
            fail_on_empty_site: false,
            capacity: DEFAULT_TRACKED_SITES,
        }
    }
}

impl TrackerConfig {
    /// Detection on, every open pooled into the shared slot
    pub fn detection_only() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Detection on with per-site slot assignment
    pub fn with_sites() -> Self {
        Self {
            enabled: true,
            log_sites: true,
            ..Self::default()
        }
    }

    /// Read configuration from `<PREFIX>_LEAK_*` environment variables.
    ///
    /// Recognized suffixes: `LEAK_DETECTION`, `LEAK_SITES`,
    /// `LEAK_FAIL_EMPTY_SITE` (booleans: `1`/`true`/`yes`/`on`) and
    /// `LEAK_MAX_SITES` (integer). Missing or unparseable variables fall
    /// back to the defaults.
    pub fn from_env(prefix: &str) -> Self {
        Self {
            enabled: env_bool(prefix, "LEAK_DETECTION", false),
            log_sites: env_bool(prefix, "LEAK_SITES", false),
            fail_on_empty_site: env_bool(prefix, "LEAK_FAIL_EMPTY_SITE", false),
            capacity: env_usize(prefix, "LEAK_MAX_SITES", DEFAULT_TRACKED_SITES),
        }
    }
}

fn env_key(prefix: &str, suffix: &str) -> String {
    format!("{}_{}", prefix.trim_end_matches('_'), suffix)
}

fn env_bool(prefix: &str, suffix: &str, default: bool) -> bool {
    match std::env::var(env_key(prefix, suffix)) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

fn env_usize(prefix: &str, suffix: &str, default: usize) -> usize {
    std::env::var(env_key(prefix, suffix))
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}
