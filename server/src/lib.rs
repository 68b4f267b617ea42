use std::sync::Arc;

use shared::{activity::ActivityFetcher, cache::ActivityCache};

pub mod config;
pub mod consts;
pub mod refresh;
pub mod render;

use config::Env;

/// Fetcher backed by the real GitHub API, with a cache as fresh as the refresh loop.
pub fn activity_fetcher(env: &Env) -> anyhow::Result<ActivityFetcher> {
    let client = env.github_client()?;
    let cache = ActivityCache::new(env.refresh_interval());
    Ok(ActivityFetcher::new(Arc::new(client), Arc::new(cache)))
}
