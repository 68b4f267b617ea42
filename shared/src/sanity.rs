use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

pub const DEFAULT_DATASET: &str = "production";
pub const DEFAULT_API_VERSION: &str = "2023-05-03";
pub const DEFAULT_POSTS_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SanityPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(rename = "publishedAt")]
    pub published_at: chrono::DateTime<chrono::Utc>,
    pub summary: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Option<Vec<serde_json::Value>>,
}

/// Decodes posts one by one: drafts without a slug or publish date are
/// skipped without hiding the rest.
fn decode_posts(values: Vec<serde_json::Value>) -> Vec<SanityPost> {
    values
        .into_iter()
        .filter_map(|value| {
            let id = value.get("_id").cloned();
            match serde_json::from_value::<SanityPost>(value) {
                Ok(post) => Some(post),
                Err(e) => {
                    warn!("Skipping malformed Sanity post {id:?}: {e}");
                    None
                }
            }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct SanityClient {
    client: reqwest::Client,
    query_url: String,
    token: Option<String>,
}

impl SanityClient {
    pub fn new(
        project_id: &str,
        dataset: &str,
        api_version: &str,
        token: Option<String>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            query_url: format!(
                "https://{project_id}.api.sanity.io/v{api_version}/data/query/{dataset}"
            ),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn with_query_url(mut self, query_url: impl Into<String>) -> Self {
        self.query_url = query_url.into();
        self
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    /// Latest posts, newest first. Any failure is logged and yields an empty list:
    /// the writing widget has its own empty state and never shows CMS errors.
    #[instrument(skip(self))]
    pub async fn latest_posts(&self, limit: usize) -> Vec<SanityPost> {
        match self.try_latest_posts(limit).await {
            Ok(posts) => posts,
            Err(e) => {
                error!("Error fetching posts from Sanity: {e:#}");
                vec![]
            }
        }
    }

    async fn try_latest_posts(&self, limit: usize) -> anyhow::Result<Vec<SanityPost>> {
        if limit == 0 {
            return Ok(vec![]);
        }

        let request = self
            .client
            .get(&self.query_url)
            .query(&[("query", latest_posts_query(limit))]);
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!(
                "Sanity API error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            );
        }

        let body: QueryResponse = response.json().await?;
        Ok(decode_posts(body.result.unwrap_or_default()))
    }
}

/// GROQ query for the `limit` most recently published posts.
pub fn latest_posts_query(limit: usize) -> String {
    format!(
        r#"*[_type == "post"] | order(publishedAt desc)[0..{}] {{
		_id,
		title,
		"slug": slug.current,
		publishedAt,
		summary,
		category
	}}"#,
        limit.saturating_sub(1)
    )
}
