//! Location caching and resolution.
//!
//! [`LocationStore`] is the process-wide holder of the last resolved place
//! and its persistent cache. [`LocationResolver`] runs one resolution
//! attempt against a [`LocationProvider`]: the cached value is published
//! first and a fresh result replaces it when resolution succeeds.

use async_trait::async_trait;
use safety_core::{CoreError, ErrorExt, LocationConfig, LocationError, ResolvedLocation};
use safety_store::SettingsStore;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Persistent cache key for the resolved location, stored in cache form.
pub const USER_LOCATION_KEY: &str = "userLocation";

pub struct LocationStore {
    settings: Arc<dyn SettingsStore>,
    current: watch::Sender<Option<ResolvedLocation>>,
}

impl LocationStore {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self { settings, current }
    }

    /// Reads the persisted value into memory. A value already set in this
    /// process is kept.
    pub async fn load(&self) -> Option<ResolvedLocation> {
        let persisted = match self.settings.get_setting(USER_LOCATION_KEY).await {
            Ok(value) => value.map(|value| ResolvedLocation::from_cache_form(&value)),
            Err(e) => {
                warn!("Failed to read cached location: {}", e);
                None
            }
        };

        if let Some(location) = &persisted {
            self.current.send_if_modified(|current| {
                if current.is_none() {
                    *current = Some(location.clone());
                    true
                } else {
                    false
                }
            });
            debug!("Loaded cached location {}", location);
        }

        self.get_cached()
    }

    pub fn get_cached(&self) -> Option<ResolvedLocation> {
        self.current.borrow().clone()
    }

    /// Persists and publishes. A persistence failure is logged and the
    /// in-memory value is updated regardless.
    pub async fn set(&self, location: ResolvedLocation) {
        if let Err(e) = self
            .settings
            .save_setting(USER_LOCATION_KEY, &location.cache_form())
            .await
        {
            warn!("Failed to persist location {}: {}", location, e);
        }
        self.current.send_replace(Some(location));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ResolvedLocation>> {
        self.current.subscribe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accuracy {
    Low,
    #[default]
    Balanced,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One reverse-geocoding candidate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeocodedAddress {
    pub city: Option<String>,
    pub district: Option<String>,
}

impl GeocodedAddress {
    pub fn new(city: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            district: Some(district.into()),
        }
    }

    /// Missing parts become empty strings.
    pub fn to_resolved(&self) -> ResolvedLocation {
        ResolvedLocation::new(
            self.city.clone().unwrap_or_default(),
            self.district.clone().unwrap_or_default(),
        )
    }
}

/// Device location capability.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> Result<PermissionStatus, CoreError>;

    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinates, CoreError>;

    /// Candidates best first; may be empty.
    async fn reverse_geocode(
        &self,
        coordinates: Coordinates,
    ) -> Result<Vec<GeocodedAddress>, CoreError>;
}

/// Fixed answers for every capability call.
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    permission: PermissionStatus,
    coordinates: Coordinates,
    addresses: Vec<GeocodedAddress>,
}

impl StaticLocationProvider {
    pub fn new(
        permission: PermissionStatus,
        coordinates: Coordinates,
        addresses: Vec<GeocodedAddress>,
    ) -> Self {
        Self {
            permission,
            coordinates,
            addresses,
        }
    }

    pub fn from_config(config: &LocationConfig) -> Self {
        let permission = if config.permission_granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        };

        let addresses = match (&config.city, &config.district) {
            (None, None) => Vec::new(),
            (city, district) => vec![GeocodedAddress {
                city: city.clone(),
                district: district.clone(),
            }],
        };

        Self::new(
            permission,
            Coordinates {
                latitude: config.latitude,
                longitude: config.longitude,
            },
            addresses,
        )
    }
}

#[async_trait]
impl LocationProvider for StaticLocationProvider {
    async fn request_permission(&self) -> Result<PermissionStatus, CoreError> {
        Ok(self.permission)
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, CoreError> {
        Ok(self.coordinates)
    }

    async fn reverse_geocode(
        &self,
        _coordinates: Coordinates,
    ) -> Result<Vec<GeocodedAddress>, CoreError> {
        Ok(self.addresses.clone())
    }
}

#[derive(Debug)]
pub enum ResolutionOutcome {
    Resolved(ResolvedLocation),
    PermissionDenied,
    NoAddressFound,
    Failed(CoreError),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }
}

pub struct LocationResolver {
    store: Arc<LocationStore>,
    provider: Arc<dyn LocationProvider>,
}

impl LocationResolver {
    pub fn new(store: Arc<LocationStore>, provider: Arc<dyn LocationProvider>) -> Self {
        Self { store, provider }
    }

    pub fn store(&self) -> &Arc<LocationStore> {
        &self.store
    }

    /// One resolution attempt. Failures are logged and reported in the
    /// outcome; whatever the store held before stays published.
    pub async fn resolve(&self) -> ResolutionOutcome {
        let cached = match self.store.get_cached() {
            Some(location) => Some(location),
            None => self.store.load().await,
        };
        if let Some(location) = &cached {
            info!("Publishing cached location {}", location);
        }

        match self.fresh_location().await {
            Ok(location) => {
                info!("Resolved location {}", location);
                self.store.set(location.clone()).await;
                ResolutionOutcome::Resolved(location)
            }
            Err(CoreError::Location(LocationError::PermissionDenied)) => {
                LocationError::PermissionDenied.log_warn();
                ResolutionOutcome::PermissionDenied
            }
            Err(CoreError::Location(error @ LocationError::NoAddressFound { .. })) => {
                error.log_warn();
                ResolutionOutcome::NoAddressFound
            }
            Err(error) => {
                error.log_error();
                ResolutionOutcome::Failed(error)
            }
        }
    }

    async fn fresh_location(&self) -> Result<ResolvedLocation, CoreError> {
        if self.provider.request_permission().await? == PermissionStatus::Denied {
            return Err(LocationError::PermissionDenied.into());
        }

        let coordinates = self.provider.current_position(Accuracy::Balanced).await?;
        let candidates = self.provider.reverse_geocode(coordinates).await?;

        candidates
            .first()
            .map(GeocodedAddress::to_resolved)
            .ok_or_else(|| {
                LocationError::NoAddressFound {
                    latitude: coordinates.latitude,
                    longitude: coordinates.longitude,
                }
                .into()
            })
    }
}
