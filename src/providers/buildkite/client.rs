use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::error::{BuildLensError, Result};
use crate::models::{Build, Pipeline};

pub struct BuildkiteClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

/// One page of a build listing query. Buildkite caps `per_page` at 100.
#[derive(Debug, Clone, Copy)]
pub struct BuildQuery<'a> {
    pub page: u32,
    pub per_page: u32,
    pub created_from: DateTime<Utc>,
    pub created_to: DateTime<Utc>,
    pub state: &'a str,
}

#[derive(Debug)]
pub struct BuildPage {
    pub builds: Vec<Build>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct BuildkiteBuildDto {
    pub id: String,
    pub branch: String,
    pub pipeline: BuildkitePipelineDto,
    pub created_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct BuildkitePipelineDto {
    pub name: String,
}

impl BuildkiteBuildDto {
    /// Mapping to the internal struct uses a lot less memory than keeping the
    /// full API payload around. We only ever query builds in the "passed"
    /// state, which guarantees every timestamp is populated; a missing one
    /// means the query constraints were violated.
    fn into_build(self) -> Build {
        Build {
            id: self.id,
            pipeline: Pipeline {
                name: self.pipeline.name,
            },
            branch: self.branch,
            created_at: self
                .created_at
                .expect("created_at should be set on a passed build"),
            scheduled_at: self
                .scheduled_at
                .expect("scheduled_at should be set on a passed build"),
            started_at: self
                .started_at
                .expect("started_at should be set on a passed build"),
            finished_at: self
                .finished_at
                .expect("finished_at should be set on a passed build"),
        }
    }
}

impl BuildkiteClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("BuildLens/0.1.0")
            .build()
            .map_err(|e| BuildLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| BuildLensError::Config(format!("Invalid base URL: {e}")))?
            .join("v2/")
            .map_err(|e| BuildLensError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    /// Helper to build authenticated requests
    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Construct the organization builds listing URL
    fn builds_url(&self, org: &str) -> Result<Url> {
        self.api_url
            .join(&format!(
                "organizations/{}/builds",
                urlencoding::encode(org)
            ))
            .map_err(|e| BuildLensError::Config(format!("Invalid builds URL: {e}")))
    }

    /// Fetch a single page of builds for an organization
    pub async fn list_builds_page(&self, org: &str, query: &BuildQuery<'_>) -> Result<BuildPage> {
        let url = self.builds_url(org)?;

        let request = self.client.get(url).query(&[
            ("page", query.page.to_string()),
            ("per_page", query.per_page.to_string()),
            ("created_from", query.created_from.to_rfc3339()),
            ("created_to", query.created_to.to_rfc3339()),
            ("state", query.state.to_string()),
        ]);
        let request = self.auth_request(request);

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BuildLensError::Api(format!(
                "Failed to fetch builds: {status} - {body}"
            )));
        }

        let next_page = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_next_page);

        let builds = response
            .json::<Vec<BuildkiteBuildDto>>()
            .await?
            .into_iter()
            .map(BuildkiteBuildDto::into_build)
            .collect();

        Ok(BuildPage { builds, next_page })
    }
}

/// Extract the page number of the `rel="next"` link from a `Link` header,
/// e.g. `<https://api.buildkite.com/v2/...&page=2>; rel="next"`.
fn parse_next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        if !params.contains(r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}
