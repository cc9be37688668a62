use std::time::Duration;

use crate::models::Coordinates;

/// Default upper bound on waiting for a position
pub const DEFAULT_GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeolocationError {
    #[error("Geolocation permission denied")]
    PermissionDenied,

    #[error("Position unavailable: {0}")]
    Unavailable(String),
}

/// Position capability supplied by the host environment
#[async_trait::async_trait]
pub trait GeolocationSource: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Position the client sent along with its request
///
/// `None` means the client did not grant location access.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientLocation(pub Option<Coordinates>);

#[async_trait::async_trait]
impl GeolocationSource for ClientLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.0.ok_or(GeolocationError::PermissionDenied)
    }
}

/// Resolves the caller's position, bounded by `timeout`
///
/// Denial, failure and timeout all collapse into `None`.
pub async fn locate(source: &dyn GeolocationSource, timeout: Duration) -> Option<Coordinates> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(Ok(coordinates)) => Some(coordinates),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Geolocation unavailable, skipping nearby stores");
            None
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Geolocation timed out, skipping nearby stores"
            );
            None
        }
    }
}
