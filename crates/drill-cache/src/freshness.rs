//! Rebuild decision for cached drill runs.
//!
//! A cached run is valid iff the cache entry exists and the drill source was
//! not modified strictly after it. Both timestamps are optional: a failed stat
//! on either side forces a rebuild.

use std::time::SystemTime;

/// Outcome of a freshness check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// The cached run can be reused.
    Fresh,
    /// The drill must be rebuilt.
    Stale(StaleReason),
}

impl Freshness {
    /// Whether the drill must be rebuilt.
    #[must_use]
    pub fn is_stale(self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// Why a cached run cannot be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaleReason {
    /// Source modification time is unknown.
    SourceUnknown,
    /// No cache entry, or its modification time is unknown.
    CacheMissing,
    /// Source was modified after the cache entry was written.
    SourceNewer,
}

/// Decide whether a cached run is still valid.
///
/// Equal timestamps count as fresh.
#[must_use]
pub fn check(source: Option<SystemTime>, cached: Option<SystemTime>) -> Freshness {
    let Some(source) = source else {
        return Freshness::Stale(StaleReason::SourceUnknown);
    };
    let Some(cached) = cached else {
        return Freshness::Stale(StaleReason::CacheMissing);
    };
    if source > cached {
        Freshness::Stale(StaleReason::SourceNewer)
    } else {
        Freshness::Fresh
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_source_older_than_cache_is_fresh() {
        assert_eq!(check(at(10), at(20)), Freshness::Fresh);
    }

    #[test]
    fn test_equal_times_are_fresh() {
        assert_eq!(check(at(10), at(10)), Freshness::Fresh);
    }

    #[test]
    fn test_source_newer_is_stale() {
        assert_eq!(
            check(at(21), at(20)),
            Freshness::Stale(StaleReason::SourceNewer)
        );
    }

    #[test]
    fn test_missing_cache_is_stale() {
        assert_eq!(
            check(at(10), None),
            Freshness::Stale(StaleReason::CacheMissing)
        );
    }

    #[test]
    fn test_unknown_source_is_stale() {
        // Also when the cache is present
        assert!(check(None, at(10)).is_stale());
        assert_eq!(
            check(None, None),
            Freshness::Stale(StaleReason::SourceUnknown)
        );
    }
}
