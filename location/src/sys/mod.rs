//! Platform-specific location backends.
//!
//! [`SystemBackend`] names the backend for the current target. Android and
//! Apple hosts deliver fixes from their own platform bridge by implementing
//! [`LocationBackend`](crate::LocationBackend) and passing it to
//! [`LocationManager::new`](crate::LocationManager::new).

#[cfg(any(target_os = "windows", target_os = "linux"))]
mod worker;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
pub use windows::WinRtBackend as SystemBackend;

#[cfg(target_os = "linux")]
pub use linux::GeoClueBackend as SystemBackend;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub use unsupported::UnsupportedBackend as SystemBackend;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod unsupported {
    use crate::{
        Criteria, ListenerId, Location, LocationBackend, LocationError, LocationResult,
        SingleUpdateListener,
    };

    /// Backend for targets without a built-in location service.
    #[derive(Debug, Default)]
    pub struct UnsupportedBackend;

    impl LocationBackend for UnsupportedBackend {
        fn last_known_location(&self, _provider: &str) -> Option<Location> {
            None
        }

        fn request_single_update_with_criteria(
            &self,
            _criteria: &Criteria,
            _listener: SingleUpdateListener,
        ) -> LocationResult<()> {
            Err(LocationError::NotAvailable)
        }

        fn request_single_update_with_provider(
            &self,
            _provider: &str,
            _listener: SingleUpdateListener,
        ) -> LocationResult<()> {
            Err(LocationError::NotAvailable)
        }

        fn remove_updates(&self, _listener: ListenerId) {}
    }
}
