use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};

use super::client::{BuildQuery, BuildkiteClient};
use crate::cache::Cache;
use crate::codec;
use crate::error::{ListError, Result};
use crate::intervals::{daily_intervals, TimeInterval};
use crate::models::Build;
use crate::providers::{BuildPredicate, BuildSource};
use crate::ttl::cache_ttl;

const ITEMS_PER_PAGE: u32 = 100;
const PASSED: &str = "passed";

/// Lists passed builds for one organization, one daily bucket at a time, with
/// a write-through cache in front of the Buildkite API.
pub struct BuildkiteLister<C> {
    client: BuildkiteClient,
    org: String,
    cache: C,
}

impl<C: Cache> BuildkiteLister<C> {
    pub fn new(client: BuildkiteClient, org: String, cache: C) -> Self {
        Self { client, org, cache }
    }

    /// Return all passed builds created within the bucket, from cache when
    /// possible. Cache trouble of any kind degrades to a remote fetch; only
    /// remote errors propagate.
    async fn builds_between(&self, interval: &TimeInterval, ttl: Duration) -> Result<Vec<Build>> {
        let key = interval.cache_key();

        match self.cache.get(&key) {
            Ok(Some(payload)) => match codec::decode_builds(&payload) {
                Ok(builds) => return Ok(builds),
                Err(e) => warn!("Discarding corrupt cache entry {key}: {e}"),
            },
            Ok(None) => {}
            Err(e) => warn!("Cache read failed for {key}: {e}"),
        }

        let builds = self.fetch_interval(interval).await?;

        // Best effort: the fetched builds are returned either way.
        let written = codec::encode_builds(&builds)
            .and_then(|payload| self.cache.put(&key, &payload, ttl));
        if let Err(e) = written {
            warn!("Cache write failed for {key}: {e}");
        }

        Ok(builds)
    }

    /// Page through the full bucket, accumulating records in page order.
    async fn fetch_interval(&self, interval: &TimeInterval) -> Result<Vec<Build>> {
        let mut query = BuildQuery {
            page: 1,
            per_page: ITEMS_PER_PAGE,
            created_from: interval.from,
            created_to: interval.to,
            // This implies that every build will have finished_at set.
            state: PASSED,
        };

        let mut result = Vec::new();
        loop {
            let page = self.client.list_builds_page(&self.org, &query).await?;
            result.extend(page.builds);

            match page.next_page {
                Some(next) => query.page = next,
                None => break,
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl<C: Cache> BuildSource for BuildkiteLister<C> {
    async fn list_builds(
        &self,
        from: DateTime<Utc>,
        predicate: &dyn BuildPredicate,
    ) -> std::result::Result<Vec<Build>, ListError> {
        let to = Utc::now();

        let mut res = Vec::new();
        for interval in daily_intervals(from, to) {
            info!("Querying {interval}...");
            let ttl = cache_ttl(&interval, Utc::now());

            let builds = match self.builds_between(&interval, ttl).await {
                Ok(builds) => builds,
                Err(source) => {
                    return Err(ListError {
                        partial: res,
                        source,
                    })
                }
            };

            // The daily buckets are a superset of [from, to), so the cached
            // data has to be narrowed down to the exact window here.
            res.extend(
                builds
                    .into_iter()
                    .filter(|b| b.created_at > from && b.created_at < to && predicate.matches(b)),
            );
        }

        Ok(res)
    }
}
