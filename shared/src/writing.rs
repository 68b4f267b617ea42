use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sanity::SanityPost;

pub const DEFAULT_CATEGORY: &str = "Article";
pub const DEFAULT_EXCERPT: &str = "Click to read more...";
pub const DEFAULT_READ_TIME: &str = "5 min read";
pub const EXCERPT_BUDGET: usize = 180;
pub const NEW_POST_DAYS: i64 = 14;

const WORDS_PER_MINUTE: usize = 200;
const MIN_READ_MINUTES: usize = 3;

/// A blog post as shown on the writing widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub url: String,
    pub excerpt: String,
    pub is_new: bool,
}

impl Article {
    pub fn from_post(post: SanityPost, now: DateTime<Utc>) -> Self {
        let age = now - post.published_at;
        let summary = post.summary.as_deref().map(str::trim).filter(|s| !s.is_empty());

        Self {
            date: post.published_at.format("%b %-d, %Y").to_string(),
            read_time: estimate_read_time(summary),
            url: format!("/blog/{}", post.slug),
            excerpt: summary
                .map(truncate_excerpt)
                .unwrap_or_else(|| DEFAULT_EXCERPT.to_string()),
            category: post
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            is_new: age <= chrono::Duration::days(NEW_POST_DAYS),
            id: post.id,
            title: post.title,
        }
    }
}

pub fn transform_posts(posts: Vec<SanityPost>, now: DateTime<Utc>) -> Vec<Article> {
    posts
        .into_iter()
        .map(|post| Article::from_post(post, now))
        .collect()
}

/// `max(ceil(words / 200), 3)` minutes, or a flat 5 without a summary.
pub fn estimate_read_time(summary: Option<&str>) -> String {
    let Some(summary) = summary else {
        return DEFAULT_READ_TIME.to_string();
    };
    let words = summary.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(MIN_READ_MINUTES);
    format!("{minutes} min read")
}

/// At most [`EXCERPT_BUDGET`] characters of text, plus an ellipsis when cut.
fn truncate_excerpt(summary: &str) -> String {
    if summary.chars().count() <= EXCERPT_BUDGET {
        return summary.to_string();
    }

    let excerpt: String = summary.chars().take(EXCERPT_BUDGET).collect();
    format!("{}…", excerpt.trim_end())
}
