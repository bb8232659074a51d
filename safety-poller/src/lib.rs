//! Authoritative in-memory post collection, refreshed by polling.
//!
//! A [`FeedRepository`] replaces its whole snapshot on every successful poll
//! and keeps the previous snapshot when a poll fails. Polling is an explicit
//! lifecycle: [`FeedRepository::start`] spawns the single poll loop and
//! [`FeedRepository::stop`] cancels it. Dropping the repository stops it too.

use chrono::{DateTime, Utc};
use safety_core::{CoreError, Post, PostSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub type PostSnapshot = Arc<Vec<Post>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Replaced { post_count: usize },
    Retained,
}

struct RepositoryInner {
    source: Arc<dyn PostSource>,
    posts: watch::Sender<PostSnapshot>,
    last_refreshed: watch::Sender<Option<DateTime<Utc>>>,
}

impl RepositoryInner {
    async fn refresh(&self) -> RefreshOutcome {
        match self.source.fetch_posts().await {
            Ok(posts) => {
                let post_count = posts.len();
                self.posts.send_replace(Arc::new(posts));
                self.last_refreshed.send_replace(Some(Utc::now()));
                debug!("Feed snapshot replaced with {} posts", post_count);
                RefreshOutcome::Replaced { post_count }
            }
            Err(error) => {
                warn!("Error fetching posts, keeping previous snapshot: {}", error);
                RefreshOutcome::Retained
            }
        }
    }
}

pub struct FeedRepository {
    inner: Arc<RepositoryInner>,
    polling_interval: Duration,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl FeedRepository {
    pub fn new(source: Arc<dyn PostSource>, polling_interval: Duration) -> Self {
        let (posts, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refreshed, _) = watch::channel(None);

        Self {
            inner: Arc::new(RepositoryInner {
                source,
                posts,
                last_refreshed,
            }),
            polling_interval,
            poller: Mutex::new(None),
        }
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    /// Fetches the full collection once. On failure the current snapshot is
    /// left untouched.
    pub async fn refresh(&self) -> RefreshOutcome {
        self.inner.refresh().await
    }

    /// Current snapshot in source order.
    pub fn current(&self) -> PostSnapshot {
        self.inner.posts.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PostSnapshot> {
        self.inner.posts.subscribe()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refreshed.borrow()
    }

    /// Starts polling: one refresh immediately, then one per interval.
    /// Returns `false` when a poll loop is already running.
    pub async fn start(&self) -> Result<bool, CoreError> {
        if self.polling_interval.is_zero() {
            return Err(CoreError::InvalidInput {
                message: "polling interval must be greater than zero".to_string(),
            });
        }

        let mut poller = self.poller.lock().await;
        if poller.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("Feed polling already running");
            return Ok(false);
        }

        let inner = Arc::clone(&self.inner);
        let polling_interval = self.polling_interval;
        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(polling_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.refresh().await;
            }
        }));

        info!("Feed polling started every {:?}", polling_interval);
        Ok(true)
    }

    /// Cancels the poll loop. Safe to call when not running.
    pub async fn stop(&self) {
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
            info!("Feed polling stopped");
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for FeedRepository {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.get_mut().take() {
            handle.abort();
        }
    }
}
