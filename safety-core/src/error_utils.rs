use crate::error::*;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Api(e) => {
                error!("Safety API error details: {:?}", e);
            }
            CoreError::Location(e) => {
                error!("Location error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Store error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Api(e) => e.user_friendly_message(),
            CoreError::Location(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Api(_) => "API".to_string(),
            CoreError::Location(_) => "LOCATION".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::Internal { .. } => "INTERNAL".to_string(),
        }
    }
}

impl ErrorExt for ApiError {
    fn log_error(&self) -> &Self {
        error!("ApiError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ApiError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ApiError::RequestTimeout { .. } => {
                "The safety service took too long to respond. Please try again.".to_string()
            }
            ApiError::ServerError { .. } | ApiError::EndpointUnavailable { .. } => {
                "The safety service is temporarily unavailable.".to_string()
            }
            ApiError::ClientError { status_code, .. } => {
                format!("The safety service rejected the request ({}).", status_code)
            }
            ApiError::InvalidResponse { .. } => {
                "The safety service sent an unexpected response.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            ApiError::RequestTimeout { .. } => "API_TIMEOUT".to_string(),
            ApiError::ServerError { .. } => "API_SERVER_ERROR".to_string(),
            ApiError::ClientError { .. } => "API_CLIENT_ERROR".to_string(),
            ApiError::InvalidResponse { .. } => "API_INVALID_RESPONSE".to_string(),
            ApiError::EndpointUnavailable { .. } => "API_ENDPOINT_UNAVAILABLE".to_string(),
        }
    }
}

impl ErrorExt for LocationError {
    fn log_error(&self) -> &Self {
        error!("LocationError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LocationError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LocationError::PermissionDenied => {
                "Location permission is required to show nearby safety news.".to_string()
            }
            LocationError::NoAddressFound { .. } => {
                "Could not determine an address for your current position.".to_string()
            }
            LocationError::PositionUnavailable { .. } => {
                "Your current position is unavailable right now.".to_string()
            }
            LocationError::GeocodingFailed { .. } => {
                "Could not look up your current address.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            LocationError::PermissionDenied => "LOCATION_PERMISSION_DENIED".to_string(),
            LocationError::NoAddressFound { .. } => "LOCATION_NO_ADDRESS".to_string(),
            LocationError::PositionUnavailable { .. } => "LOCATION_UNAVAILABLE".to_string(),
            LocationError::GeocodingFailed { .. } => "LOCATION_GEOCODING_FAILED".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ConnectionFailed { .. } => {
                "Local cache could not be opened. Location will not be remembered.".to_string()
            }
            _ => "Local cache error occurred.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            StoreError::ConnectionFailed { .. } => "STORE_CONNECTION_FAILED".to_string(),
            StoreError::MigrationFailed { .. } => "STORE_MIGRATION_FAILED".to_string(),
            StoreError::QueryFailed { .. } => "STORE_QUERY_FAILED".to_string(),
            StoreError::Sql(_) => "STORE_SQL_ERROR".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

pub struct ErrorReporter {
    report_errors: bool,
    report_warnings: bool,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self {
            report_errors: true,
            report_warnings: true,
        }
    }

    pub fn with_error_reporting(mut self, enabled: bool) -> Self {
        self.report_errors = enabled;
        self
    }

    pub fn with_warning_reporting(mut self, enabled: bool) -> Self {
        self.report_warnings = enabled;
        self
    }

    pub fn report_error(&self, error: &CoreError) {
        if self.report_errors {
            error.log_error();
            info!("Error code: {}", error.error_code());
            info!("User message: {}", error.user_friendly_message());
        }
    }

    pub fn report_warning(&self, error: &CoreError) {
        if self.report_warnings {
            error.log_warn();
            info!("Error code: {}", error.error_code());
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
