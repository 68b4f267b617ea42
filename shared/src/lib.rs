mod relative_time;
mod theme;

pub mod activity;
pub mod cache;
pub mod carousel;
pub mod github;
pub mod sanity;
pub mod text;
pub mod writing;

pub use relative_time::*;
pub use theme::*;

pub type GithubHandle = String;

/// How long a fetched activity report stays fresh, and how often the server refreshes it.
pub const REFRESH_PERIOD: std::time::Duration = std::time::Duration::from_secs(5 * 60);
