pub mod api;
pub mod metrics;


pub use api::{LocationSearchRequest, SafetyApiClient};
pub use metrics::{ApiMetrics, EndpointMetrics, MetricsCollector};
