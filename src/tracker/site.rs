/*!
 * Capture Sites
 * Canonical identity of the place a resource was opened
 */

use std::borrow::Cow;
use std::fmt;
use std::panic::Location;

/// Canonical string key for one open capture-site.
///
/// The tracker assigns one slot per distinct key, so everything opened from
/// the same place shares counters. Keys normally come from
/// [`SiteKey::caller`], which records `file:line:column` of the creating
/// call; an explicit [`SiteKey::label`] gives coarser grouping when several
/// code paths should count as one site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteKey(Cow<'static, str>);

impl SiteKey {
    /// Capture the caller's source location
    #[track_caller]
    #[inline]
    pub fn caller() -> Self {
        let location = Location::caller();
        SiteKey(Cow::Owned(format!(
            "{}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        )))
    }

    /// Explicit label in place of a captured location
    pub fn label(label: impl Into<Cow<'static, str>>) -> Self {
        SiteKey(label.into())
    }

    /// Key pooled opens share when site-keyed tracking is off
    pub(crate) fn shared() -> Self {
        SiteKey(Cow::Borrowed(""))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
