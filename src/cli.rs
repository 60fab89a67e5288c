use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;

use crate::auth::Token;
use crate::cache::sqlite::SqliteCache;
use crate::cache::{Cache, NoopCache};
use crate::models::Build;
use crate::providers::buildkite::{BuildkiteClient, BuildkiteLister};
use crate::providers::{BuildPredicate, BuildSource};

#[derive(Parser)]
#[command(name = "buildlens")]
#[command(author, version, about = "Buildkite build listing tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output file path (defaults to stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Pretty print JSON output
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List passed builds from a Buildkite organization
    Buildkite {
        /// Buildkite API access token
        #[arg(short, long, env = "BUILDKITE_TOKEN")]
        token: Option<String>,

        /// Buildkite API URL
        #[arg(short, long, default_value = "https://api.buildkite.com")]
        url: String,

        /// Organization slug
        #[arg(short = 'O', long)]
        org: String,

        /// How many days back to list builds for
        #[arg(short, long, default_value_t = 1)]
        days: i64,

        /// Branch name to filter builds (optional)
        #[arg(short, long)]
        branch: Option<String>,

        /// Pipeline name to filter builds (optional)
        #[arg(short = 'P', long)]
        pipeline: Option<String>,

        /// Skip the on-disk cache entirely
        #[arg(long, default_value_t = false)]
        no_cache: bool,

        /// Cache database path
        #[arg(long)]
        cache_path: Option<PathBuf>,
    },
}

/// Predicate assembled from the CLI filter flags. Unset flags match anything.
struct BuildFilter {
    branch: Option<String>,
    pipeline: Option<String>,
}

impl BuildPredicate for BuildFilter {
    fn matches(&self, build: &Build) -> bool {
        self.branch
            .as_deref()
            .map_or(true, |branch| build.branch == branch)
            && self
                .pipeline
                .as_deref()
                .map_or(true, |pipeline| build.pipeline.name == pipeline)
    }
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Buildkite {
                token,
                url,
                org,
                days,
                branch,
                pipeline,
                no_cache,
                cache_path,
            } => {
                info!("Listing builds for organization: {}", org);

                let token = token.as_deref().map(Token::from);
                let client = BuildkiteClient::new(url, token)?;

                let cache: Box<dyn Cache> = if *no_cache {
                    Box::new(NoopCache)
                } else {
                    let path = match cache_path {
                        Some(path) => path.clone(),
                        None => SqliteCache::default_path()?,
                    };
                    Box::new(SqliteCache::open(&path)?)
                };

                let lister = BuildkiteLister::new(client, org.clone(), cache);
                let filter = BuildFilter {
                    branch: branch.clone(),
                    pipeline: pipeline.clone(),
                };

                let from = Utc::now() - Duration::days(*days);
                let builds = match lister.list_builds(from, &filter).await {
                    Ok(builds) => builds,
                    Err(err) => {
                        warn!(
                            "Listing aborted after {} builds: {}",
                            err.partial.len(),
                            err.source
                        );
                        return Err(err.into());
                    }
                };

                info!("Found {} matching builds", builds.len());

                // Serialize to JSON
                let json_output = if self.pretty {
                    serde_json::to_string_pretty(&builds)?
                } else {
                    serde_json::to_string(&builds)?
                };

                // Write to output
                if let Some(output_path) = &self.output {
                    std::fs::write(output_path, json_output)?;
                    info!("Builds written to: {}", output_path.display());
                } else {
                    println!("{}", json_output);
                }

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pipeline;
    use chrono::TimeZone;

    fn sample_build(branch: &str, pipeline: &str) -> Build {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        Build {
            id: "b-1".to_string(),
            pipeline: Pipeline {
                name: pipeline.to_string(),
            },
            branch: branch.to_string(),
            created_at: created,
            scheduled_at: created,
            started_at: created,
            finished_at: created,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = BuildFilter {
            branch: None,
            pipeline: None,
        };

        assert!(filter.matches(&sample_build("main", "deploy")));
        assert!(filter.matches(&sample_build("dev", "test")));
    }

    #[test]
    fn test_branch_filter() {
        let filter = BuildFilter {
            branch: Some("main".to_string()),
            pipeline: None,
        };

        assert!(filter.matches(&sample_build("main", "deploy")));
        assert!(!filter.matches(&sample_build("dev", "deploy")));
    }

    #[test]
    fn test_branch_and_pipeline_filter() {
        let filter = BuildFilter {
            branch: Some("main".to_string()),
            pipeline: Some("deploy".to_string()),
        };

        assert!(filter.matches(&sample_build("main", "deploy")));
        assert!(!filter.matches(&sample_build("main", "test")));
        assert!(!filter.matches(&sample_build("dev", "deploy")));
    }
}
