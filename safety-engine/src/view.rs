//! Presentation-facing derivations built on the ranker.

use crate::ranker::{filter_feed, global_hot_pick};
use chrono::{DateTime, TimeZone, Utc};
use safety_core::{Category, CategoryFilter, Post, ResolvedLocation};
use safety_poller::PostSnapshot;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Categories summarised on the home surface, as wire labels.
pub const HOME_DIGEST_LABELS: [&str; 4] = ["교통", "화재", "재해", "주의"];

/// Filtered feed that follows its inputs.
///
/// A background task recomputes [`filter_feed`] whenever the location, the
/// category filter or the post snapshot changes. The task ends when the
/// view is stopped or dropped, or when any input publisher goes away.
pub struct FeedView {
    output: watch::Receiver<PostSnapshot>,
    task: JoinHandle<()>,
}

impl FeedView {
    pub fn spawn(
        mut location: watch::Receiver<Option<ResolvedLocation>>,
        mut category: watch::Receiver<CategoryFilter>,
        mut posts: watch::Receiver<PostSnapshot>,
    ) -> Self {
        let initial = derive(&mut location, &mut category, &mut posts);
        let (sender, output) = watch::channel(Arc::new(initial));

        let task = tokio::spawn(async move {
            loop {
                let changed = tokio::select! {
                    changed = location.changed() => changed,
                    changed = category.changed() => changed,
                    changed = posts.changed() => changed,
                };
                if changed.is_err() {
                    debug!("Feed view input closed");
                    break;
                }

                let feed = derive(&mut location, &mut category, &mut posts);
                debug!("Feed view recomputed with {} posts", feed.len());
                sender.send_replace(Arc::new(feed));
            }
        });

        Self { output, task }
    }

    pub fn current(&self) -> PostSnapshot {
        self.output.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PostSnapshot> {
        self.output.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for FeedView {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn derive(
    location: &mut watch::Receiver<Option<ResolvedLocation>>,
    category: &mut watch::Receiver<CategoryFilter>,
    posts: &mut watch::Receiver<PostSnapshot>,
) -> Vec<Post> {
    let location = location.borrow_and_update().clone();
    let filter = category.borrow_and_update().clone();
    let posts = posts.borrow_and_update().clone();
    filter_feed(&posts, location.as_ref(), &filter)
}

/// Home surface summary: one nearby post per category and the global HOT
/// header.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeDigest {
    pub entries: Vec<(Category, Option<Post>)>,
    pub hot: Option<Post>,
}

impl HomeDigest {
    /// For each category, the first post in collection order that matches
    /// the location.
    pub fn build(
        posts: &[Post],
        location: Option<&ResolvedLocation>,
        categories: &[Category],
    ) -> Self {
        let match_key = location.map(ResolvedLocation::match_key);
        let entries = categories
            .iter()
            .map(|category| {
                let post = match_key.as_ref().and_then(|key| {
                    posts
                        .iter()
                        .find(|post| &post.location_address == key && &post.category == category)
                        .cloned()
                });
                (category.clone(), post)
            })
            .collect();

        Self {
            entries,
            hot: global_hot_pick(posts).cloned(),
        }
    }

    pub fn for_home(posts: &[Post], location: Option<&ResolvedLocation>) -> Self {
        let categories: Vec<Category> = HOME_DIGEST_LABELS
            .iter()
            .map(|label| Category::parse(label))
            .collect();
        Self::build(posts, location, &categories)
    }

    pub fn post_for(&self, category: &Category) -> Option<&Post> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == category)
            .and_then(|(_, post)| post.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// `2024.07.01 PM 03:05`
    List,
    /// `24/07/01 15:05`
    Compact,
}

impl TimestampStyle {
    fn pattern(self) -> &'static str {
        match self {
            TimestampStyle::List => "%Y.%m.%d %p %I:%M",
            TimestampStyle::Compact => "%y/%m/%d %H:%M",
        }
    }
}

pub fn format_timestamp<Tz>(timestamp: &DateTime<Utc>, tz: &Tz, style: TimestampStyle) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format(style.pattern())
        .to_string()
}
