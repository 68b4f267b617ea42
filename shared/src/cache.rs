use std::{collections::HashMap, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{activity::ActivityReport, REFRESH_PERIOD};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Keyed cache whose entries are only served while younger than `ttl`.
///
/// Nothing is ever evicted: a stale entry stays in the map until the next
/// `set` for its key replaces it.
#[derive(Debug)]
pub struct TimedCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry<V>>>,
}

pub type ActivityCache = TimedCache<ActivityReport>;

impl<V> Default for TimedCache<V> {
    fn default() -> Self {
        Self::new(REFRESH_PERIOD)
    }
}

impl<V> TimedCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn set(&self, key: &str, value: V) {
        self.set_at(key, value, Utc::now()).await
    }

    pub async fn set_at(&self, key: &str, value: V, now: DateTime<Utc>) {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<V: Clone> TimedCache<V> {
    pub async fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now()).await
    }

    pub async fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        let age = (now - entry.stored_at).num_milliseconds();
        if age < self.ttl.as_millis() as i64 {
            Some(entry.value.clone())
        } else {
            None
        }
    }
}
