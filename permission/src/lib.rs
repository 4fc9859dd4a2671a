//! Runtime permission gate for location access.
//!
//! This crate provides a unified API for checking and requesting the location
//! permissions a single-shot location request depends on. Hosts that own their
//! permission UI implement [`PermissionManager`]; everyone else can use
//! [`SystemPermissions`], which delegates to the platform.

#![warn(missing_docs)]

/// Platform-specific implementations.
mod sys;

use futures::future::BoxFuture;
use log::debug;

/// Types of permissions that can be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Permission {
    /// Approximate location (network/cell based).
    CoarseLocation,
    /// Precise location (GPS based).
    FineLocation,
}

impl Permission {
    /// Platform name of the permission, as used in Android manifests.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
        }
    }
}

/// The permissions a current-location request requires.
pub const LOCATION_PERMISSIONS: [Permission; 2] =
    [Permission::CoarseLocation, Permission::FineLocation];

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission is restricted (e.g., parental controls).
    Restricted,
    /// Permission has not been requested yet.
    NotDetermined,
}

impl PermissionStatus {
    /// Returns `true` if the permission is granted.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// The permission type is not supported on this platform.
    #[error("permission not supported on this platform")]
    NotSupported,
    /// An unknown error occurred.
    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Asynchronous check-and-request of a permission set.
///
/// Implementations must not block the calling thread: the returned future
/// completes once every permission has a decision.
pub trait PermissionManager: Send + Sync + std::fmt::Debug {
    /// Checks `permissions`, prompting for any that are undecided.
    ///
    /// Resolves to [`PermissionStatus::Granted`] only if every permission is
    /// granted, otherwise to the status of the first one that is not.
    fn check_permissions<'a>(
        &'a self,
        permissions: &'a [Permission],
    ) -> BoxFuture<'a, Result<PermissionStatus, PermissionError>>;
}

/// [`PermissionManager`] backed by the platform permission service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPermissions;

impl PermissionManager for SystemPermissions {
    fn check_permissions<'a>(
        &'a self,
        permissions: &'a [Permission],
    ) -> BoxFuture<'a, Result<PermissionStatus, PermissionError>> {
        Box::pin(request_all(permissions))
    }
}

/// Check the current status of a permission without requesting it.
pub async fn check(permission: Permission) -> PermissionStatus {
    sys::check(permission).await
}

/// Request a permission from the user.
///
/// If the permission has already been granted or denied, this returns
/// the current status without showing a prompt.
///
/// # Errors
/// Returns a `PermissionError` if:
/// - The permission type is not supported on this platform.
/// - An underlying platform error occurs.
pub async fn request(permission: Permission) -> Result<PermissionStatus, PermissionError> {
    sys::request(permission).await
}

/// Request every permission in order, stopping at the first one not granted.
///
/// An empty set is trivially granted.
///
/// # Errors
/// Returns the first `PermissionError` reported by the platform.
pub async fn request_all(permissions: &[Permission]) -> Result<PermissionStatus, PermissionError> {
    for &permission in permissions {
        let status = request(permission).await?;
        if !status.is_granted() {
            debug!("{} not granted: {status:?}", permission.name());
            return Ok(status);
        }
    }
    Ok(PermissionStatus::Granted)
}
