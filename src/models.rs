use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished Buildkite build, mapped down to the fields we care about.
/// Builds are only ever fetched in the "passed" state, so all four timestamps
/// are guaranteed to be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: String,
    pub pipeline: Pipeline,
    pub branch: String,
    pub created_at: DateTime<Utc>,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
}
