use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, ACCEPT, RETRY_AFTER},
    RequestBuilder, Response, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument};

mod types;
pub use types::*;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const REPOSITORIES_PER_PAGE: usize = 12;
pub const COMMITS_PER_PAGE: usize = 3;
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);
pub const MAX_HANDLE_LEN: usize = 39;

const USER_AGENT: &str = concat!("bentolink-bio/", env!("CARGO_PKG_VERSION"));
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("GitHub rate limit exceeded, retry in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },
    #[error("GitHub API error {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Failed to reach GitHub: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// The two read-only GitHub endpoints the activity widget needs.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// `GET /users/{username}/repos?sort=pushed&per_page={per_page}`
    async fn user_repositories(
        &self,
        username: &str,
        per_page: usize,
    ) -> Result<Vec<RepositoryListing>, FetchError>;

    /// `GET /repos/{full_name}/commits?per_page={per_page}`
    async fn recent_commits(
        &self,
        full_name: &str,
        per_page: usize,
    ) -> Result<Vec<CommitListing>, FetchError>;
}

/// GitHub login rules: ASCII alphanumerics and hyphens, at most 39 characters,
/// not starting with a hyphen.
pub fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle.len() <= MAX_HANDLE_LEN
        && !handle.starts_with('-')
        && handle.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[derive(Clone, Debug)]
pub struct GithubClient {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl GithubClient {
    /// Without a token GitHub still answers, just with a lower rate limit.
    pub fn new(token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(GITHUB_API_URL)?,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> anyhow::Result<Self> {
        self.base_url = Url::parse(base_url)?;
        Ok(self)
    }

    /// Appends `segments` to the base URL, percent-encoding each one, so a
    /// caller-supplied name can never climb out of its path or add a query.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github.v3+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, FetchError> {
        let response = check_response(request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    #[instrument(skip(self))]
    async fn user_repositories(
        &self,
        username: &str,
        per_page: usize,
    ) -> Result<Vec<RepositoryListing>, FetchError> {
        let request = self
            .get(self.endpoint(["users", username, "repos"]))
            .query(&[("sort", "pushed".to_string()), ("per_page", per_page.to_string())]);
        let repos: Vec<RepositoryListing> = self.send(request).await?;
        debug!("Received {} repositories for {username}", repos.len());
        Ok(repos)
    }

    #[instrument(skip(self))]
    async fn recent_commits(
        &self,
        full_name: &str,
        per_page: usize,
    ) -> Result<Vec<CommitListing>, FetchError> {
        let request = self
            .get(self.endpoint(
                ["repos"]
                    .into_iter()
                    .chain(full_name.split('/'))
                    .chain(["commits"]),
            ))
            .query(&[("per_page", per_page.to_string())]);
        self.send(request).await
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

async fn check_response(response: Response) -> Result<Response, FetchError> {
    let status = response.status();
    if let Some(retry_after) = rate_limit_from(status, response.headers()) {
        return Err(FetchError::RateLimited { retry_after });
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(body) => body.message,
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => body,
    };
    Err(FetchError::Status {
        status: status.as_u16(),
        message,
    })
}

/// `Some(retry hint)` if the response is GitHub telling us to back off.
///
/// 429 always is. A 403 is only when the primary limit is exhausted
/// (`x-ratelimit-remaining: 0`); other 403s are real permission errors.
pub fn rate_limit_from(status: StatusCode, headers: &HeaderMap) -> Option<Duration> {
    let exhausted = status == StatusCode::FORBIDDEN
        && headers
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
    if status != StatusCode::TOO_MANY_REQUESTS && !exhausted {
        return None;
    }

    let retry_after = headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER);
    Some(retry_after)
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    #[test]
    fn too_many_requests_uses_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

        assert_eq!(
            rate_limit_from(StatusCode::TOO_MANY_REQUESTS, &headers),
            Some(Duration::from_secs(120))
        );
    }

    #[test]
    fn missing_or_garbage_retry_after_defaults_to_a_minute() {
        assert_eq!(
            rate_limit_from(StatusCode::TOO_MANY_REQUESTS, &HeaderMap::new()),
            Some(DEFAULT_RETRY_AFTER)
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(
            rate_limit_from(StatusCode::TOO_MANY_REQUESTS, &headers),
            Some(DEFAULT_RETRY_AFTER)
        );
    }

    #[test]
    fn forbidden_is_rate_limit_only_when_exhausted() {
        let mut headers = HeaderMap::new();
        assert_eq!(rate_limit_from(StatusCode::FORBIDDEN, &headers), None);

        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("0"));
        assert_eq!(
            rate_limit_from(StatusCode::FORBIDDEN, &headers),
            Some(DEFAULT_RETRY_AFTER)
        );
    }

    #[test]
    fn success_is_not_rate_limited() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));
        assert_eq!(rate_limit_from(StatusCode::OK, &headers), None);
    }

    #[test]
    fn rate_limit_error_exposes_hint() {
        let error = FetchError::RateLimited {
            retry_after: Duration::from_secs(120),
        };
        assert_eq!(error.retry_after(), Some(Duration::from_secs(120)));
        assert_eq!(
            error.to_string(),
            "GitHub rate limit exceeded, retry in 120s"
        );
    }

    #[test]
    fn empty_token_is_treated_as_anonymous() {
        let client = GithubClient::new(Some(String::new())).unwrap();
        assert!(client.token.is_none());
    }

    #[test]
    fn path_segments_cannot_escape_the_endpoint() {
        let client = GithubClient::new(None).unwrap();

        let url = client.endpoint(["users", "../user", "repos"]);
        assert!(url.path().starts_with("/users/"), "{url}");
        assert!(url.path().ends_with("/repos"), "{url}");

        let url = client.endpoint(["users", "octocat?per_page=100", "repos"]);
        assert_eq!(url.query(), None);
        assert!(url.path().starts_with("/users/octocat%3F"), "{url}");
    }

    #[test]
    fn repository_names_keep_their_owner_segment() {
        let client = GithubClient::new(None)
            .unwrap()
            .with_base_url("http://localhost:8080/api/")
            .unwrap();

        let url = client.endpoint(["repos"].into_iter().chain("octocat/hello".split('/')));
        assert_eq!(url.as_str(), "http://localhost:8080/api/repos/octocat/hello");
    }

    #[test]
    fn handles_follow_github_login_rules() {
        assert!(is_valid_handle("octocat"));
        assert!(is_valid_handle("octo-cat-42"));
        assert!(!is_valid_handle(""));
        assert!(!is_valid_handle("-octocat"));
        assert!(!is_valid_handle("../user"));
        assert!(!is_valid_handle("octocat?x=1"));
        assert!(!is_valid_handle(&"a".repeat(40)));
    }
}
