use std::fmt;

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Half-open day bucket `[from, to)` with `to = from + 24h`, aligned to UTC
/// midnight. Buckets are the unit of caching and remote querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeInterval {
    fn day_starting_at(start: DateTime<Utc>) -> Self {
        Self {
            from: start,
            to: start + Duration::hours(24),
        }
    }

    /// Deterministic cache key: `<fromUnixSeconds>-<toUnixSeconds>`.
    pub fn cache_key(&self) -> String {
        format!("{}-{}", self.from.timestamp(), self.to.timestamp())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

/// Split `[from, to)` into daily buckets starting at midnight of `from`'s
/// calendar day. The buckets are a superset of the requested window: the first
/// one starts before `from` and the last one may end after `to`, which keeps
/// cache keys stable across repeated calls with slightly different bounds.
/// Callers filter by exact timestamp afterwards.
pub fn daily_intervals(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<TimeInterval> {
    let midnight = from.date_naive().and_time(NaiveTime::MIN).and_utc();

    // Always cover the day containing `from`, then keep stepping while the
    // next bucket still starts before `to`.
    let mut intervals = vec![TimeInterval::day_starting_at(midnight)];
    let mut start = midnight + Duration::hours(24);
    while start < to {
        intervals.push(TimeInterval::day_starting_at(start));
        start += Duration::hours(24);
    }

    intervals
}
