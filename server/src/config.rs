use std::time::Duration;

use serde::Deserialize;
use shared::{
    github::GithubClient,
    sanity::{SanityClient, DEFAULT_API_VERSION, DEFAULT_DATASET, DEFAULT_POSTS_LIMIT},
    REFRESH_PERIOD,
};

/// Everything the site needs from the environment (or a `.env` file).
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
    pub github_username: String,
    pub github_token: Option<String>,
    pub sanity_project_id: String,
    pub sanity_dataset: Option<String>,
    pub sanity_api_version: Option<String>,
    pub sanity_token: Option<String>,
    pub refresh_interval_in_minutes: Option<u32>,
    pub posts_limit: Option<usize>,
}

/// The non-secret part of the configuration, managed by rocket for the handlers.
#[derive(Debug, Clone)]
pub struct Site {
    pub github_username: String,
    pub posts_limit: usize,
}

impl Env {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::from_env::<Env>()?)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_in_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| Duration::from_secs(minutes as u64 * 60))
            .unwrap_or(REFRESH_PERIOD)
    }

    pub fn site(&self) -> Site {
        Site {
            github_username: self.github_username.clone(),
            posts_limit: self.posts_limit.unwrap_or(DEFAULT_POSTS_LIMIT),
        }
    }

    pub fn github_client(&self) -> anyhow::Result<GithubClient> {
        if self.github_token.is_none() {
            tracing::warn!("GITHUB_TOKEN is not set, GitHub requests use the anonymous rate limit");
        }
        GithubClient::new(self.github_token.clone())
    }

    pub fn sanity_client(&self) -> anyhow::Result<SanityClient> {
        SanityClient::new(
            &self.sanity_project_id,
            self.sanity_dataset.as_deref().unwrap_or(DEFAULT_DATASET),
            self.sanity_api_version
                .as_deref()
                .unwrap_or(DEFAULT_API_VERSION),
            self.sanity_token.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> anyhow::Result<Env> {
        Ok(envy::from_iter(
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )?)
    }

    #[test]
    fn applies_defaults() {
        let env = env(&[
            ("GITHUB_USERNAME", "octocat"),
            ("SANITY_PROJECT_ID", "abc123"),
        ])
        .unwrap();

        assert_eq!(env.refresh_interval(), REFRESH_PERIOD);
        assert_eq!(env.site().posts_limit, DEFAULT_POSTS_LIMIT);
        assert_eq!(env.site().github_username, "octocat");
        assert_eq!(
            env.sanity_client().unwrap().query_url(),
            "https://abc123.api.sanity.io/v2023-05-03/data/query/production"
        );
    }

    #[test]
    fn reads_overrides() {
        let env = env(&[
            ("GITHUB_USERNAME", "octocat"),
            ("GITHUB_TOKEN", "ghp_secret"),
            ("SANITY_PROJECT_ID", "abc123"),
            ("SANITY_DATASET", "staging"),
            ("REFRESH_INTERVAL_IN_MINUTES", "1"),
            ("POSTS_LIMIT", "6"),
        ])
        .unwrap();

        assert_eq!(env.github_token.as_deref(), Some("ghp_secret"));
        assert_eq!(env.refresh_interval(), Duration::from_secs(60));
        assert_eq!(env.site().posts_limit, 6);
        assert!(env
            .sanity_client()
            .unwrap()
            .query_url()
            .ends_with("/data/query/staging"));
    }

    #[test]
    fn username_is_required() {
        assert!(env(&[("SANITY_PROJECT_ID", "abc123")]).is_err());
    }
}
