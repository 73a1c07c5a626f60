//! Per-minute request counter.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Bucket key layout: wall-clock time truncated to the minute.
pub const BUCKET_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Interval of the periodic driver.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Total for one minute bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestCount {
    pub total: u64,
    pub date: String,
}

#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    buckets: Arc<Mutex<HashMap<String, u64>>>,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the bucket of the current minute.
    pub async fn increment(&self) {
        self.increment_at(&Local::now()).await;
    }

    /// Add one to the bucket that `at` falls into.
    pub async fn increment_at<Tz>(&self, at: &DateTime<Tz>)
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let key = bucket_key(at);
        let mut buckets = self.buckets.lock().await;
        *buckets.entry(key).or_insert(0) += 1;
    }

    /// All known buckets, in no particular order.
    pub async fn snapshot(&self) -> Vec<RequestCount> {
        let buckets = self.buckets.lock().await;
        buckets
            .iter()
            .map(|(date, total)| RequestCount {
                total: *total,
                date: date.clone(),
            })
            .collect()
    }

    /// Start the background task that increments the counter every
    /// `interval`, whether or not any traffic arrives.
    ///
    /// The task is never cancelled; it ends with the runtime.
    pub fn spawn_periodic(&self, interval: Duration) -> JoinHandle<()> {
        let counter = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                counter.increment().await;
                debug!(interval_secs = interval.as_secs(), "periodic request counter tick");
            }
        })
    }
}

pub fn bucket_key<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format(BUCKET_FORMAT).to_string()
}
