//! Windows location backend using the WinRT Geolocator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use windows::Devices::Geolocation::{Geolocator, PositionAccuracy, PositionStatus};
use windows::Foundation::AsyncStatus;
use windows::Win32::Foundation::E_ACCESSDENIED;

use super::worker::FixWorkers;
use crate::{
    Accuracy, Criteria, GPS_PROVIDER, ListenerId, Location, LocationBackend, LocationError,
    LocationResult, NETWORK_PROVIDER, PASSIVE_PROVIDER, SingleUpdateListener, now_millis,
};

/// 100 ns ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_MILLI: i64 = 10_000;

/// How often the pending operation is checked for completion or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Backend over `Windows.Devices.Geolocation`.
#[derive(Debug, Default)]
pub struct WinRtBackend {
    workers: FixWorkers,
}

impl WinRtBackend {
    fn request(
        &self,
        accuracy: PositionAccuracy,
        provider: &'static str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        self.workers
            .spawn(listener, move |cancelled| fetch_fix(accuracy, provider, cancelled))
    }
}

impl LocationBackend for WinRtBackend {
    fn last_known_location(&self, provider: &str) -> Option<Location> {
        self.workers.last_known(provider)
    }

    fn request_single_update_with_criteria(
        &self,
        criteria: &Criteria,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        match criteria.accuracy {
            Accuracy::Fine => self.request(PositionAccuracy::High, GPS_PROVIDER, listener),
            Accuracy::Coarse => self.request(PositionAccuracy::Default, NETWORK_PROVIDER, listener),
        }
    }

    fn request_single_update_with_provider(
        &self,
        provider: &str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        match provider {
            GPS_PROVIDER => self.request(PositionAccuracy::High, GPS_PROVIDER, listener),
            NETWORK_PROVIDER => self.request(PositionAccuracy::Default, NETWORK_PROVIDER, listener),
            PASSIVE_PROVIDER => {
                if let Some(location) = self.workers.latest() {
                    listener.on_location_changed(location);
                }
                Ok(())
            }
            other => Err(LocationError::UnknownProvider(other.to_owned())),
        }
    }

    fn remove_updates(&self, listener: ListenerId) {
        self.workers.cancel(listener);
    }
}

fn winrt_error(e: &windows::core::Error) -> LocationError {
    if e.code() == E_ACCESSDENIED {
        return LocationError::ServiceDisabled;
    }
    LocationError::Unknown(e.message().to_string())
}

/// Polls `status` until the operation settles, calling `cancel` once the
/// flag is raised.
fn settle<S, C>(cancelled: &AtomicBool, mut status: S, cancel: C) -> LocationResult<()>
where
    S: FnMut() -> windows::core::Result<AsyncStatus>,
    C: FnOnce() -> windows::core::Result<()>,
{
    loop {
        if cancelled.load(Ordering::Acquire) {
            cancel().map_err(|e| winrt_error(&e))?;
            return Err(LocationError::Unknown("request cancelled".into()));
        }
        match status().map_err(|e| winrt_error(&e))? {
            AsyncStatus::Started => thread::sleep(POLL_INTERVAL),
            AsyncStatus::Canceled => {
                return Err(LocationError::Unknown("request cancelled".into()));
            }
            // Completed or Error: GetResults yields the fix or the failure.
            _ => return Ok(()),
        }
    }
}

fn fetch_fix(
    accuracy: PositionAccuracy,
    provider: &str,
    cancelled: &AtomicBool,
) -> LocationResult<Location> {
    let geolocator = Geolocator::new().map_err(|e| winrt_error(&e))?;
    if matches!(
        geolocator.LocationStatus(),
        Ok(PositionStatus::Disabled | PositionStatus::NotAvailable)
    ) {
        return Err(LocationError::ServiceDisabled);
    }
    geolocator
        .SetDesiredAccuracy(accuracy)
        .map_err(|e| winrt_error(&e))?;

    let operation = geolocator
        .GetGeopositionAsync()
        .map_err(|e| winrt_error(&e))?;
    settle(cancelled, || operation.Status(), || operation.Cancel())?;
    let position = operation.GetResults().map_err(|e| winrt_error(&e))?;

    let coord = position.Coordinate().map_err(|e| winrt_error(&e))?;
    let pos = coord
        .Point()
        .map_err(|e| winrt_error(&e))?
        .Position()
        .map_err(|e| winrt_error(&e))?;

    let timestamp = coord
        .Timestamp()
        .ok()
        .and_then(|t| u64::try_from((t.UniversalTime - UNIX_EPOCH_TICKS) / TICKS_PER_MILLI).ok())
        .unwrap_or_else(now_millis);

    Ok(Location {
        latitude: pos.Latitude,
        longitude: pos.Longitude,
        altitude: Some(pos.Altitude),
        horizontal_accuracy: coord.Accuracy().ok(),
        vertical_accuracy: coord.AltitudeAccuracy().ok().and_then(|a| a.Value().ok()),
        provider: provider.to_owned(),
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn settles_when_the_operation_completes() {
        let polls = Cell::new(0);
        let cancelled = AtomicBool::new(false);

        let result = settle(
            &cancelled,
            || {
                polls.set(polls.get() + 1);
                Ok(if polls.get() < 3 {
                    AsyncStatus::Started
                } else {
                    AsyncStatus::Completed
                })
            },
            || panic!("completed operations are not cancelled"),
        );

        assert_eq!(result, Ok(()));
        assert_eq!(polls.get(), 3);
    }

    #[test]
    fn raised_flag_cancels_the_operation() {
        let cancelled = AtomicBool::new(true);
        let cancel_calls = Cell::new(0);

        let result = settle(
            &cancelled,
            || Ok(AsyncStatus::Started),
            || {
                cancel_calls.set(cancel_calls.get() + 1);
                Ok(())
            },
        );

        assert!(matches!(result, Err(LocationError::Unknown(_))));
        assert_eq!(cancel_calls.get(), 1);
    }

    #[test]
    fn access_denied_means_service_disabled() {
        let error = windows::core::Error::from(E_ACCESSDENIED);
        assert_eq!(winrt_error(&error), LocationError::ServiceDisabled);
    }
}
