use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{relative_age, text::sanitize_commit_message};

pub const SHORT_SHA_LEN: usize = 7;

/// One entry of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryListing {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub private: bool,
    pub html_url: String,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RepositoryListing {
    /// Only public repositories with some content are worth asking commits for.
    pub fn is_candidate(&self) -> bool {
        !self.private && self.size > 0
    }
}

/// One entry of `GET /repos/{full_name}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitListing {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitSignature>,
    pub committer: Option<GitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Commit {
    pub sha: String,
    pub message: String,
    pub relative_date: String,
    pub date: Option<DateTime<Utc>>,
    pub url: String,
}

impl Commit {
    /// The age label is computed here, once, and never re-derived on render.
    pub fn from_listing(listing: CommitListing, now: DateTime<Utc>) -> Self {
        let date = listing
            .commit
            .author
            .and_then(|a| a.date)
            .or_else(|| listing.commit.committer.and_then(|c| c.date));
        let relative_date = date
            .map(|date| relative_age(date, now))
            .unwrap_or_default();

        Self {
            sha: listing.sha.chars().take(SHORT_SHA_LEN).collect(),
            message: sanitize_commit_message(&listing.commit.message),
            relative_date,
            date,
            url: listing.html_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u32,
    pub size: u64,
    pub private: bool,
    pub url: String,
    pub pushed_at: Option<DateTime<Utc>>,
    pub commits: Vec<Commit>,
}

impl Repository {
    pub fn new(listing: RepositoryListing, commits: Vec<Commit>) -> Self {
        Self {
            name: listing.name,
            full_name: listing.full_name,
            description: listing.description,
            language: listing.language,
            stars: listing.stargazers_count,
            size: listing.size,
            private: listing.private,
            url: listing.html_url,
            pushed_at: listing.pushed_at,
            commits,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn decodes_github_commit_payload() {
        let payload = r#"{
            "sha": "a3f2c1d9e8b7a6f5e4d3c2b1a0f9e8d7c6b5a4f3",
            "html_url": "https://github.com/octocat/hello/commit/a3f2c1d",
            "commit": {
                "message": "Refactor layout system\n\nWith a body",
                "author": { "name": "Octo", "date": "2024-03-20T09:00:00Z" },
                "committer": { "name": "GitHub", "date": "2024-03-20T10:00:00Z" }
            }
        }"#;
        let listing: CommitListing = serde_json::from_str(payload).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let commit = Commit::from_listing(listing, now);

        assert_eq!(commit.sha, "a3f2c1d");
        assert_eq!(commit.message, "Refactor layout system");
        assert_eq!(commit.relative_date, "3h ago");
        assert_eq!(
            commit.url,
            "https://github.com/octocat/hello/commit/a3f2c1d"
        );
    }

    #[test]
    fn falls_back_to_committer_date() {
        let payload = r#"{
            "sha": "abc",
            "html_url": "u",
            "commit": {
                "message": "m",
                "author": null,
                "committer": { "date": "2024-03-19T12:00:00Z" }
            }
        }"#;
        let listing: CommitListing = serde_json::from_str(payload).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let commit = Commit::from_listing(listing, now);

        assert_eq!(commit.sha, "abc");
        assert_eq!(commit.relative_date, "Yesterday");
    }

    #[test]
    fn candidates_are_public_and_non_empty() {
        let payload = r#"[
            {"name": "a", "full_name": "u/a", "description": null, "language": "Rust",
             "stargazers_count": 3, "size": 100, "private": false,
             "html_url": "https://github.com/u/a", "pushed_at": "2024-03-01T00:00:00Z"},
            {"name": "b", "full_name": "u/b", "description": null, "language": null,
             "size": 0, "private": false, "html_url": "https://github.com/u/b", "pushed_at": null},
            {"name": "c", "full_name": "u/c", "description": "secret", "language": null,
             "size": 10, "private": true, "html_url": "https://github.com/u/c", "pushed_at": null}
        ]"#;
        let listings: Vec<RepositoryListing> = serde_json::from_str(payload).unwrap();
        let names: Vec<_> = listings
            .iter()
            .filter(|l| l.is_candidate())
            .map(|l| l.name.as_str())
            .collect();

        assert_eq!(names, vec!["a"]);
    }
}
