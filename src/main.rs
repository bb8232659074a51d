use anyhow::Context;
use chrono::Local;
use safety_api::SafetyApiClient;
use safety_core::{AppConfig, ErrorReporter, Post, ResolvedLocation, TipSource};
use safety_engine::{
    format_timestamp, CategorySelector, FeedView, HomeDigest, LocationResolver, LocationStore,
    ResolutionOutcome, StaticLocationProvider, TimestampStyle,
};
use safety_poller::FeedRepository;
use safety_store::{Database, MemorySettingsStore, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config = match &config_path {
        Some(path) => AppConfig::load(path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::from_env().context("loading configuration from environment")?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &config_path {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("Using default configuration with environment overrides"),
    }
    info!("Starting safety feed against {}", config.api.base_url);
    let reporter = ErrorReporter::new();

    let settings: Arc<dyn SettingsStore> = match &config.location.cache_db_path {
        Some(path) => Arc::new(
            Database::open(Database::file_url(path))
                .await
                .context("opening location cache")?,
        ),
        None => {
            info!("No location cache configured, keeping location in memory");
            Arc::new(MemorySettingsStore::new())
        }
    };

    let client = Arc::new(SafetyApiClient::new(&config.api)?);
    let store = Arc::new(LocationStore::new(settings));
    store.load().await;

    let repository = FeedRepository::new(
        client.clone(),
        Duration::from_secs(config.feed.poll_interval_secs),
    );
    let selector = CategorySelector::new();
    selector.activate(None);

    let view = FeedView::spawn(store.subscribe(), selector.subscribe(), repository.subscribe());
    let mut feed_updates = view.subscribe();

    let resolver = LocationResolver::new(
        store.clone(),
        Arc::new(StaticLocationProvider::from_config(&config.location)),
    );
    match resolver.resolve().await {
        ResolutionOutcome::Resolved(location) => info!("Location: {}", location),
        ResolutionOutcome::PermissionDenied => warn!("Location permission denied"),
        ResolutionOutcome::NoAddressFound => warn!("No address for the current position"),
        ResolutionOutcome::Failed(error) => reporter.report_error(&error),
    }

    match client.random_tip().await {
        Ok(tip) => info!("Tip of the day [{}]: {}", tip.category, tip.tip),
        Err(error) => reporter.report_warning(&error),
    }

    repository.start().await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = feed_updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let feed = feed_updates.borrow_and_update().clone();
                let location = store.get_cached();
                let digest = HomeDigest::for_home(&repository.current(), location.as_ref());
                log_feed(&feed, &digest, location.as_ref());
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }
    }

    repository.stop().await;
    view.stop();

    match client.export_metrics().await {
        Ok(metrics) => info!("API metrics:\n{}", metrics),
        Err(error) => reporter.report_warning(&error),
    }
    Ok(())
}

fn log_feed(feed: &[Post], digest: &HomeDigest, location: Option<&ResolvedLocation>) {
    let location = location
        .map(ResolvedLocation::cache_form)
        .unwrap_or_else(|| "unknown".to_string());
    info!("{} nearby posts for {}", feed.len(), location);

    if let Some(hot) = &digest.hot {
        info!(
            "HOT {} ({} views, {}): {}",
            hot.title,
            hot.views,
            format_timestamp(&hot.timestamp, &Local, TimestampStyle::List),
            hot.message_preview(30)
        );
    }

    for (category, post) in &digest.entries {
        match post {
            Some(post) => info!(
                "[{}] {} {}",
                category.wire_label(),
                format_timestamp(&post.timestamp, &Local, TimestampStyle::Compact),
                post.title
            ),
            None => info!("[{}] no recent posts", category.wire_label()),
        }
    }

    for post in feed {
        info!(
            "{} | {} | {} | views {} comments {}",
            format_timestamp(&post.timestamp, &Local, TimestampStyle::List),
            post.category.wire_label(),
            post.title,
            post.views,
            post.comment_count
        );
    }
}
