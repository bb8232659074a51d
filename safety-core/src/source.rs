use crate::error::CoreError;
use crate::types::{Post, SafetyTip};
use async_trait::async_trait;

/// Remote source of the full post collection (`GET /posts`).
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<Post>, CoreError>;
}

/// Remote location-scoped search (`POST /posts/search/location`).
///
/// `user_location` is the match form `"<city>, <district>"`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_posts(
        &self,
        query: &str,
        user_location: &str,
    ) -> Result<Vec<Post>, CoreError>;
}

/// Tip-of-the-day source (`GET /random-tip`).
#[async_trait]
pub trait TipSource: Send + Sync {
    async fn random_tip(&self) -> Result<SafetyTip, CoreError>;
}
