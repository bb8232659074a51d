use crate::error::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_API_URL: &str = "SAFETY_FEED_API_URL";
pub const ENV_POLL_INTERVAL: &str = "SAFETY_FEED_POLL_INTERVAL_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub feed: FeedConfig,
    pub location: LocationConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            user_agent: format!("safety-feed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub poll_interval_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
        }
    }
}

/// Location settings. The coordinate and address fields drive the static
/// location provider used when no device capability is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub cache_db_path: Option<String>,
    pub permission_granted: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub district: Option<String>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            cache_db_path: None,
            permission_granted: true,
            latitude: 0.0,
            longitude: 0.0,
            city: None,
            district: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `None` keeps the history unbounded.
    pub history_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "safety_feed=info,safety_engine=info,safety_poller=info,safety_api=info"
                .to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&contents).map_err(ConfigError::from)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            debug!("Overriding api.base_url from {}", ENV_API_URL);
            self.api.base_url = url;
        }

        if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
            self.feed.poll_interval_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "feed.poll_interval_secs".to_string(),
                    value: raw.clone(),
                })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "api.base_url must not be empty".to_string(),
            }
            .into());
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                value: self.api.base_url.clone(),
            }
            .into());
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.feed.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "feed.poll_interval_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_polling() {
        let config = AppConfig::default();
        assert_eq!(config.feed.poll_interval_secs, 5);
        assert!(config.search.history_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [api]
            base_url = "https://safety.example.com"

            [location]
            city = "Seoul"
            district = "Gangnam"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://safety.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.feed.poll_interval_secs, 5);
        assert_eq!(config.location.city.as_deref(), Some("Seoul"));
        assert!(config.location.permission_granted);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let result = AppConfig::from_toml_str("[feed]\npoll_interval_secs = 0\n");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_base_url_must_parse() {
        let result = AppConfig::from_toml_str("[api]\nbase_url = \"not a url\"\n");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { ref field, .. })) if field == "api.base_url"
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| match key {
                ENV_API_URL => Some("http://10.0.0.2:8080".to_string()),
                ENV_POLL_INTERVAL => Some("15".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.feed.poll_interval_secs, 15);

        let bad = config.apply_env_overrides(|key| {
            (key == ENV_POLL_INTERVAL).then(|| "soon".to_string())
        });
        assert!(bad.is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join(format!(
            "safety-feed-config-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[feed]\npoll_interval_secs = 12\n").unwrap();

        let config = AppConfig::load(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(config.unwrap().feed.poll_interval_secs, 12);
    }

    #[test]
    fn test_missing_file() {
        let result = AppConfig::load("/nonexistent/safety-feed.toml");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::FileNotFound { .. }))
        ));
    }
}
