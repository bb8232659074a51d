use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Safety API error: {0}")]
    Api(#[from] ApiError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Request timeout for {endpoint}")]
    RequestTimeout { endpoint: String },

    #[error("Server error {status_code} from {endpoint}")]
    ServerError { endpoint: String, status_code: u16 },

    #[error("Request to {endpoint} rejected with status {status_code}")]
    ClientError { endpoint: String, status_code: u16 },

    #[error("Invalid API response from {endpoint}: {details}")]
    InvalidResponse { endpoint: String, details: String },

    #[error("API endpoint unavailable: {endpoint}")]
    EndpointUnavailable { endpoint: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Permission to access location was denied")]
    PermissionDenied,

    #[error("No address found for {latitude}, {longitude}")]
    NoAddressFound { latitude: f64, longitude: f64 },

    #[error("Current position unavailable: {reason}")]
    PositionUnavailable { reason: String },

    #[error("Reverse geocoding failed: {reason}")]
    GeocodingFailed { reason: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Migration failed: {migration}")]
    MigrationFailed { migration: String },

    #[error("Query execution failed: {query}")]
    QueryFailed { query: String },

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
