//! Windows permission implementation using WinRT.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(permission: Permission) -> PermissionStatus {
    match permission {
        // Windows has a single location capability for both accuracy tiers.
        Permission::CoarseLocation | Permission::FineLocation => geolocator_access(),
    }
}

pub(crate) async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    // RequestAccessAsync both checks and prompts if needed
    Ok(check(permission).await)
}

fn geolocator_access() -> PermissionStatus {
    use windows::Devices::Geolocation::{GeolocationAccessStatus, Geolocator};

    match Geolocator::RequestAccessAsync().and_then(|op| op.get()) {
        Ok(GeolocationAccessStatus::Allowed) => PermissionStatus::Granted,
        Ok(GeolocationAccessStatus::Denied) => PermissionStatus::Denied,
        Ok(_) | Err(_) => PermissionStatus::NotDetermined,
    }
}
