//! Single-shot current location.
//!
//! This crate answers "where is the device right now?" once per call. It
//! returns a cached last-known reading when one is fresh enough, otherwise it
//! issues a single platform update request and waits for it with a timeout.
//! The async entry point gates everything behind the runtime location
//! permissions.
//!
//! ```ignore
//! use locatekit_location::{LocationManager, LocationOptions};
//! use std::time::Duration;
//!
//! let manager = LocationManager::system();
//! let options = LocationOptions::new()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_maximum_age(Duration::from_secs(60))
//!     .with_high_accuracy(true);
//! let location = manager.current_location(&options).await?;
//! println!("{}, {}", location.latitude, location.longitude);
//! ```

#![warn(missing_docs)]

mod backend;
mod freshness;
mod listener;
mod manager;
mod options;
mod strategy;
/// Platform-specific implementations.
pub mod sys;

#[cfg(test)]
mod testing;

use serde::{Deserialize, Serialize};

pub use backend::LocationBackend;
pub use freshness::{fresh_last_known, now_millis};
pub use listener::{ListenerId, PendingRequest, RequestState, SingleUpdateListener};
pub use locatekit_permission::{
    LOCATION_PERMISSIONS, Permission, PermissionError, PermissionManager, PermissionStatus,
    SystemPermissions,
};
pub use manager::LocationManager;
pub use options::LocationOptions;
pub use strategy::{Accuracy, Criteria, RequestStrategy};

/// Satellite based provider.
pub const GPS_PROVIDER: &str = "gps";
/// Cell and Wi-Fi based provider.
pub const NETWORK_PROVIDER: &str = "network";
/// Provider that only reports fixes requested by someone else.
pub const PASSIVE_PROVIDER: &str = "passive";

/// A geographic location with coordinates and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Altitude in meters above sea level, if available.
    pub altitude: Option<f64>,
    /// Horizontal accuracy in meters, if available.
    pub horizontal_accuracy: Option<f64>,
    /// Vertical accuracy in meters, if available.
    pub vertical_accuracy: Option<f64>,
    /// Name of the provider that produced the fix.
    pub provider: String,
    /// Timestamp as Unix epoch milliseconds.
    pub timestamp: u64,
}

impl Location {
    /// Creates a reading with coordinates only.
    pub fn new(provider: impl Into<String>, latitude: f64, longitude: f64, timestamp: u64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            horizontal_accuracy: None,
            vertical_accuracy: None,
            provider: provider.into(),
            timestamp,
        }
    }

    /// Sets the horizontal accuracy in meters.
    #[must_use]
    pub const fn with_accuracy(mut self, meters: f64) -> Self {
        self.horizontal_accuracy = Some(meters);
        self
    }

    /// Sets the altitude in meters.
    #[must_use]
    pub const fn with_altitude(mut self, meters: f64) -> Self {
        self.altitude = Some(meters);
        self
    }

    /// Returns `true` if the reading was taken at or after `cutoff` (epoch ms).
    #[must_use]
    pub const fn is_newer_than(&self, cutoff: u64) -> bool {
        self.timestamp >= cutoff
    }
}

/// Errors that can occur when accessing location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// Location permission was not granted.
    #[error("location permission denied")]
    PermissionDenied,
    /// No reading arrived before the deadline.
    #[error("location request timed out")]
    Timeout,
    /// The request completed without delivering a reading.
    #[error("location request completed without a reading")]
    NoData,
    /// Location services are disabled on the device.
    #[error("location services disabled")]
    ServiceDisabled,
    /// The platform does not know the requested provider.
    #[error("unknown location provider: {0}")]
    UnknownProvider(String),
    /// Location is not available.
    #[error("location not available")]
    NotAvailable,
    /// The permission subsystem failed.
    #[error("permission error: {0}")]
    Permission(#[from] PermissionError),
    /// The request options were rejected.
    #[error("invalid location options: {0}")]
    InvalidOptions(String),
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Result type for location operations.
pub type LocationResult<T> = Result<T, LocationError>;
