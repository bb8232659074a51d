use crate::metrics::{MetricsCollector, RequestMetrics};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use safety_core::{
    ApiConfig, ApiError, CoreError, Post, PostSource, SafetyTip, SearchBackend, TipSource,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const POSTS_ENDPOINT: &str = "/posts";
pub const SEARCH_ENDPOINT: &str = "/posts/search/location";
pub const RANDOM_TIP_ENDPOINT: &str = "/random-tip";

/// Body of a location-scoped search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSearchRequest {
    pub search_query: String,
    pub user_location: String,
}

#[derive(Debug)]
pub struct SafetyApiClient {
    http_client: Client,
    base_url: String,
    metrics: Arc<MetricsCollector>,
}

impl SafetyApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            metrics: Arc::new(MetricsCollector::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn send_request<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response, CoreError> {
        let url = self.endpoint_url(endpoint);

        let mut request_builder = self.http_client.request(method.clone(), &url);
        if let Some(body) = body {
            request_builder = request_builder.json(body);
        }

        debug!("Making safety API request: {} {}", method, endpoint);
        match request_builder.send().await {
            Ok(response) => {
                let status = response.status();
                match classify_status(endpoint, status) {
                    None => {
                        debug!("Request successful: {} {}", status, endpoint);
                        Ok(response)
                    }
                    Some(api_error) => {
                        error!("Request failed with status: {} for {}", status, endpoint);
                        Err(CoreError::Api(api_error))
                    }
                }
            }
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    Err(CoreError::Api(ApiError::RequestTimeout {
                        endpoint: endpoint.to_string(),
                    }))
                } else {
                    Err(CoreError::Network(e))
                }
            }
        }
    }

    /// Sends, decodes and records one request. A body that fails to decode
    /// counts as a failed request.
    async fn request_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<T, CoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let start_time = Instant::now();

        let (status_code, result) = match self.send_request(&method, endpoint, body).await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                (Some(status_code), Self::parse_json(endpoint, response).await)
            }
            Err(e) => (error_status_code(&e), Err(e)),
        };

        self.metrics
            .record_request(RequestMetrics {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                status_code,
                response_time: start_time.elapsed(),
                success: result.is_ok(),
                error_type: result.as_ref().err().map(error_type),
            })
            .await;

        result
    }

    async fn parse_json<T: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<T, CoreError> {
        response.json().await.map_err(|e| {
            error!("Failed to parse response from {}: {}", endpoint, e);
            CoreError::Api(ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                details: e.to_string(),
            })
        })
    }

    pub async fn get_posts(&self) -> Result<Vec<Post>, CoreError> {
        let posts: Vec<Post> = self
            .request_json::<(), _>(Method::GET, POSTS_ENDPOINT, None)
            .await?;

        info!("Retrieved {} posts", posts.len());
        Ok(posts)
    }

    pub async fn search_by_location(
        &self,
        query: &str,
        user_location: &str,
    ) -> Result<Vec<Post>, CoreError> {
        let body = LocationSearchRequest {
            search_query: query.to_string(),
            user_location: user_location.to_string(),
        };
        let posts: Vec<Post> = self
            .request_json(Method::POST, SEARCH_ENDPOINT, Some(&body))
            .await?;

        info!(
            "Search '{}' in {} returned {} posts",
            query,
            user_location,
            posts.len()
        );
        Ok(posts)
    }

    pub async fn get_random_tip(&self) -> Result<SafetyTip, CoreError> {
        let tip: SafetyTip = self
            .request_json::<(), _>(Method::GET, RANDOM_TIP_ENDPOINT, None)
            .await?;

        debug!("Retrieved safety tip in category '{}'", tip.category);
        Ok(tip)
    }

    /// Metrics as pretty JSON, for logging.
    pub async fn export_metrics(&self) -> Result<String, CoreError> {
        Ok(self.metrics.export_metrics().await?)
    }

    pub async fn get_metrics(&self) -> crate::metrics::ApiMetrics {
        self.metrics.get_metrics().await
    }

    pub async fn reset_metrics(&self) {
        self.metrics.reset_metrics().await;
    }
}

/// Maps a non-success status to the matching `ApiError`.
pub fn classify_status(endpoint: &str, status: StatusCode) -> Option<ApiError> {
    if status.is_success() {
        return None;
    }

    let endpoint = endpoint.to_string();
    let status_code = status.as_u16();
    Some(match status_code {
        404 | 503 => ApiError::EndpointUnavailable { endpoint },
        408 | 504 => ApiError::RequestTimeout { endpoint },
        500..=599 => ApiError::ServerError {
            endpoint,
            status_code,
        },
        _ => ApiError::ClientError {
            endpoint,
            status_code,
        },
    })
}

fn error_status_code(error: &CoreError) -> Option<u16> {
    match error {
        CoreError::Api(ApiError::ServerError { status_code, .. })
        | CoreError::Api(ApiError::ClientError { status_code, .. }) => Some(*status_code),
        _ => None,
    }
}

fn error_type(error: &CoreError) -> String {
    match error {
        CoreError::Api(ApiError::RequestTimeout { .. }) => "timeout",
        CoreError::Api(ApiError::ServerError { .. }) => "server_error",
        CoreError::Api(ApiError::ClientError { .. }) => "client_error",
        CoreError::Api(ApiError::EndpointUnavailable { .. }) => "unavailable",
        CoreError::Api(ApiError::InvalidResponse { .. }) => "invalid_response",
        _ => "network_error",
    }
    .to_string()
}

#[async_trait]
impl PostSource for SafetyApiClient {
    async fn fetch_posts(&self) -> Result<Vec<Post>, CoreError> {
        self.get_posts().await
    }
}

#[async_trait]
impl SearchBackend for SafetyApiClient {
    async fn search_posts(
        &self,
        query: &str,
        user_location: &str,
    ) -> Result<Vec<Post>, CoreError> {
        self.search_by_location(query, user_location).await
    }
}

#[async_trait]
impl TipSource for SafetyApiClient {
    async fn random_tip(&self) -> Result<SafetyTip, CoreError> {
        self.get_random_tip().await
    }
}
