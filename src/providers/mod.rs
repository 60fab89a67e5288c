pub mod buildkite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ListError;
use crate::models::Build;

/// A source of passed builds for one organization.
#[async_trait]
pub trait BuildSource {
    /// List every passed build created strictly within `(from, now)` that
    /// satisfies the predicate. On failure the error carries the builds
    /// gathered from buckets that completed before the failing one.
    async fn list_builds(
        &self,
        from: DateTime<Utc>,
        predicate: &dyn BuildPredicate,
    ) -> std::result::Result<Vec<Build>, ListError>;
}

/// Caller-supplied filter, applied once per candidate build.
pub trait BuildPredicate: Send + Sync {
    fn matches(&self, build: &Build) -> bool;
}

impl<F> BuildPredicate for F
where
    F: Fn(&Build) -> bool + Send + Sync,
{
    fn matches(&self, build: &Build) -> bool {
        self(build)
    }
}
