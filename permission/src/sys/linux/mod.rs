//! Linux permission implementation.
//!
//! Traditional Linux desktops have no runtime location prompt. GeoClue2
//! applies its own agent policy when a client starts, so both location
//! permissions are reported as granted here.

use crate::{Permission, PermissionError, PermissionStatus};

pub(crate) async fn check(_permission: Permission) -> PermissionStatus {
    PermissionStatus::Granted
}

pub(crate) async fn request(_permission: Permission) -> Result<PermissionStatus, PermissionError> {
    Ok(PermissionStatus::Granted)
}
