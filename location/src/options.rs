use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{LocationError, LocationResult, RequestStrategy};

/// Longest wait honoured, one day. Larger timeouts are clamped.
const MAX_TIMEOUT_MS: u64 = 24 * 60 * 60 * 1000;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Parameters of a single current-location request.
///
/// Serialized with the Geolocation-style names `timeout`, `maximumAge` and
/// `enableHighAccuracy`, durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LocationOptions {
    #[serde(rename = "timeout")]
    timeout_ms: u64,
    #[serde(rename = "maximumAge")]
    maximum_age_ms: u64,
    enable_high_accuracy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            maximum_age_ms: 0,
            enable_high_accuracy: false,
            provider: None,
        }
    }
}

impl LocationOptions {
    /// Options with a 30 s timeout, no cached readings and coarse accuracy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidOptions`] if the JSON is malformed,
    /// has unknown fields, or names an empty provider.
    pub fn from_json(json: &str) -> LocationResult<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| LocationError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// How long to wait for a fresh fix.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = duration_to_millis(timeout);
        self
    }

    /// Oldest cached reading that may be returned instead of a fresh fix.
    #[must_use]
    pub fn with_maximum_age(mut self, maximum_age: Duration) -> Self {
        self.maximum_age_ms = duration_to_millis(maximum_age);
        self
    }

    /// Prefer fine over coarse accuracy. Ignored when a provider is set.
    #[must_use]
    pub const fn with_high_accuracy(mut self, enable: bool) -> Self {
        self.enable_high_accuracy = enable;
        self
    }

    /// Ask this provider instead of letting the platform choose.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Wait bound, clamped to one day.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.min(MAX_TIMEOUT_MS))
    }

    /// Maximum age of an acceptable cached reading.
    #[must_use]
    pub const fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }

    /// Whether fine accuracy was requested.
    #[must_use]
    pub const fn enable_high_accuracy(&self) -> bool {
        self.enable_high_accuracy
    }

    /// Explicit provider, if any.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// The request strategy these options select.
    #[must_use]
    pub fn strategy(&self) -> RequestStrategy {
        self.provider.as_ref().map_or_else(
            || RequestStrategy::from_high_accuracy(self.enable_high_accuracy),
            |provider| RequestStrategy::provider(provider.clone()),
        )
    }

    /// Checks the options before any platform call is made.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidOptions`] for an empty provider name.
    pub fn validate(&self) -> LocationResult<()> {
        match self.provider.as_deref() {
            Some(provider) if provider.trim().is_empty() => Err(LocationError::InvalidOptions(
                "provider must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
