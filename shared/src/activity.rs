use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{
    cache::ActivityCache,
    github::{
        Commit, FetchError, GithubApi, Repository, COMMITS_PER_PAGE, REPOSITORIES_PER_PAGE,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    CommitFetchFailed { message: String },
    NoCommits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedRepository {
    pub name: String,
    pub reason: SkipReason,
}

/// Result of one refresh: the repositories worth showing, in upstream push order,
/// plus the ones that were dropped and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityReport {
    pub repositories: Vec<Repository>,
    pub skipped: Vec<SkippedRepository>,
    pub fetched_at: DateTime<Utc>,
}

impl ActivityReport {
    pub fn commit_count(&self) -> usize {
        self.repositories.iter().map(|r| r.commits.len()).sum()
    }
}

#[derive(Clone)]
pub struct ActivityFetcher {
    api: Arc<dyn GithubApi>,
    cache: Arc<ActivityCache>,
}

impl ActivityFetcher {
    pub fn new(api: Arc<dyn GithubApi>, cache: Arc<ActivityCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<ActivityCache> {
        &self.cache
    }

    pub async fn fetch(&self, username: &str) -> Result<ActivityReport, FetchError> {
        self.fetch_at(username, Utc::now()).await
    }

    /// Cache-checked fetch. Only the repository listing can fail the call;
    /// per-repository commit failures end up in [`ActivityReport::skipped`].
    ///
    /// Concurrent misses for the same user are not coalesced, the last one to
    /// finish overwrites the cache entry.
    #[instrument(skip(self))]
    pub async fn fetch_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, FetchError> {
        if let Some(report) = self.cache.get_at(username, now).await {
            debug!("Serving cached activity for {username}");
            return Ok(report);
        }

        self.refresh_at(username, now).await
    }

    pub async fn refresh(&self, username: &str) -> Result<ActivityReport, FetchError> {
        self.refresh_at(username, Utc::now()).await
    }

    /// Always hits the API and overwrites the cache entry on success.
    #[instrument(skip(self))]
    pub async fn refresh_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivityReport, FetchError> {
        let listings = self
            .api
            .user_repositories(username, REPOSITORIES_PER_PAGE)
            .await?;
        let candidates = listings
            .into_iter()
            .filter(|listing| listing.is_candidate())
            .take(REPOSITORIES_PER_PAGE);

        let commit_futures = candidates.map(|listing| async move {
            let commits = self
                .api
                .recent_commits(&listing.full_name, COMMITS_PER_PAGE)
                .await;
            (listing, commits)
        });

        let mut repositories = Vec::new();
        let mut skipped = Vec::new();
        for (listing, commits) in join_all(commit_futures).await {
            let commits = match commits {
                Ok(commits) => commits,
                Err(e) => {
                    warn!("Failed to fetch commits for {}: {e}", listing.full_name);
                    skipped.push(SkippedRepository {
                        name: listing.name,
                        reason: SkipReason::CommitFetchFailed {
                            message: e.to_string(),
                        },
                    });
                    continue;
                }
            };

            if commits.is_empty() {
                skipped.push(SkippedRepository {
                    name: listing.name,
                    reason: SkipReason::NoCommits,
                });
                continue;
            }

            let commits = commits
                .into_iter()
                .take(COMMITS_PER_PAGE)
                .map(|commit| Commit::from_listing(commit, now))
                .collect();
            repositories.push(Repository::new(listing, commits));
        }

        info!(
            "Fetched {} repositories for {username} ({} skipped)",
            repositories.len(),
            skipped.len()
        );
        let report = ActivityReport {
            repositories,
            skipped,
            fetched_at: now,
        };
        self.cache.set_at(username, report.clone(), now).await;

        Ok(report)
    }
}
