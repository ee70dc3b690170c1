//! Geolocation abstractions
//!
//! Attendance actions and logins carry the device position. The provider is a trait so the
//! tracker can be driven by fixed coordinates on the command line and by fakes in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use crate::config::GeolocationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeolocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeolocationError::InvalidCoordinates { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Source of the device position
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Ask for (or report) permission to read the position
    async fn request_permission(&self) -> Result<PermissionStatus, GeolocationError>;

    /// Read the current position
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Ask for permission, then read the position
pub async fn acquire_position<G>(provider: &G) -> Result<Coordinates, GeolocationError>
where
    G: GeolocationProvider + ?Sized,
{
    match provider.request_permission().await? {
        PermissionStatus::Granted => provider.current_position().await,
        PermissionStatus::Denied => Err(GeolocationError::PermissionDenied),
    }
}

/// Provider backed by fixed coordinates, typically from configuration or CLI flags
#[derive(Debug, Clone)]
pub struct StaticLocationProvider {
    permission_granted: bool,
    position: Option<Coordinates>,
}

impl StaticLocationProvider {
    pub fn new(permission_granted: bool, position: Option<Coordinates>) -> Self {
        Self {
            permission_granted,
            position,
        }
    }

    pub fn from_config(config: &GeolocationConfig) -> Result<Self, GeolocationError> {
        let position = match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)?),
            _ => None,
        };
        Ok(Self::new(config.permission_granted, position))
    }

    /// Replace the configured position
    pub fn with_position(mut self, position: Coordinates) -> Self {
        self.position = Some(position);
        self
    }
}

#[async_trait]
impl GeolocationProvider for StaticLocationProvider {
    async fn request_permission(&self) -> Result<PermissionStatus, GeolocationError> {
        Ok(if self.permission_granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or_else(|| {
            GeolocationError::ProviderUnavailable(
                "no coordinates configured (set geolocation.latitude/longitude or pass --lat/--lon)"
                    .to_string(),
            )
        })
    }
}
