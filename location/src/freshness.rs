use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{GPS_PROVIDER, Location, LocationBackend, NETWORK_PROVIDER};

/// Current wall-clock time as Unix epoch milliseconds.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Returns a cached reading taken no earlier than `now - maximum_age`.
///
/// GPS is consulted first and wins when both providers are fresh; the network
/// provider is only queried when GPS has nothing usable.
pub fn fresh_last_known(
    backend: &dyn LocationBackend,
    now: u64,
    maximum_age: Duration,
) -> Option<Location> {
    let max_age = u64::try_from(maximum_age.as_millis()).unwrap_or(u64::MAX);
    let cutoff = now.saturating_sub(max_age);

    [GPS_PROVIDER, NETWORK_PROVIDER]
        .into_iter()
        .filter_map(|provider| backend.last_known_location(provider))
        .find(|location| location.is_newer_than(cutoff))
}
