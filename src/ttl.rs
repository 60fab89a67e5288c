use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::intervals::TimeInterval;

/// A bucket whose end is older than this is considered settled: the builds in
/// it are finished and will not change.
const SETTLED_AFTER_HOURS: i64 = 12;

const SETTLED_BASE: Duration = Duration::from_secs(60 * 24 * 3600);
const RECENT_TTL: Duration = Duration::from_secs(10 * 60);

/// Max jitter added to the settled TTL, in whole hours (exclusive bound).
const SPREAD_HOURS: u64 = 7 * 24;

/// Pick a cache lifetime for one bucket.
///
/// Settled buckets get 60 days plus a random spread of up to a week so that
/// cache entries populated together do not all expire together. Recent buckets
/// may still receive new passed builds and are revalidated every 10 minutes.
pub fn cache_ttl(interval: &TimeInterval, now: DateTime<Utc>) -> Duration {
    cache_ttl_with(interval, now, &mut rand::rng())
}

pub fn cache_ttl_with<R: Rng + ?Sized>(
    interval: &TimeInterval,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Duration {
    if now - interval.to > chrono::Duration::hours(SETTLED_AFTER_HOURS) {
        let spread_hours = rng.random_range(0..SPREAD_HOURS);
        SETTLED_BASE + Duration::from_secs(spread_hours * 3600)
    } else {
        RECENT_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    fn interval_ending_at(to: DateTime<Utc>) -> TimeInterval {
        TimeInterval {
            from: to - chrono::Duration::hours(24),
            to,
        }
    }

    #[test]
    fn test_recent_bucket_gets_short_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let interval = interval_ending_at(now - chrono::Duration::hours(2));

        let ttl = cache_ttl_with(&interval, now, &mut StdRng::seed_from_u64(1));

        assert_eq!(ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_future_ending_bucket_gets_short_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let interval = interval_ending_at(now + chrono::Duration::hours(10));

        let ttl = cache_ttl_with(&interval, now, &mut StdRng::seed_from_u64(1));

        assert_eq!(ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_exactly_twelve_hours_old_is_still_recent() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let interval = interval_ending_at(now - chrono::Duration::hours(12));

        let ttl = cache_ttl_with(&interval, now, &mut StdRng::seed_from_u64(1));

        assert_eq!(ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_settled_bucket_ttl_is_within_jitter_range() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let interval = interval_ending_at(now - chrono::Duration::days(30));
        let mut rng = StdRng::seed_from_u64(42);

        let base = Duration::from_secs(60 * 24 * 3600);
        let max = base + Duration::from_secs(167 * 3600);
        for _ in 0..100 {
            let ttl = cache_ttl_with(&interval, now, &mut rng);
            assert!(ttl >= base, "ttl {ttl:?} below settled base");
            assert!(ttl <= max, "ttl {ttl:?} above settled base plus spread");
        }
    }

    #[test]
    fn test_settled_jitter_is_redrawn_per_call() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let interval = interval_ending_at(now - chrono::Duration::days(30));
        let mut rng = StdRng::seed_from_u64(7);

        let draws: Vec<Duration> = (0..20)
            .map(|_| cache_ttl_with(&interval, now, &mut rng))
            .collect();

        assert!(
            draws.iter().any(|d| *d != draws[0]),
            "expected at least two distinct jittered TTLs"
        );
    }
}
