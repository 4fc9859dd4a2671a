use std::sync::Arc;

use log::debug;

use crate::{
    LOCATION_PERMISSIONS, Location, LocationBackend, LocationError, LocationOptions,
    LocationResult, PendingRequest, PermissionManager, SystemPermissions, fresh_last_known,
    now_millis, sys,
};

/// Entry point for single-shot location requests.
///
/// Build one at startup and clone it to whoever needs a location; clones share
/// the backend and permission manager.
#[derive(Debug, Clone)]
pub struct LocationManager {
    backend: Arc<dyn LocationBackend>,
    permissions: Arc<dyn PermissionManager>,
}

impl LocationManager {
    /// Creates a manager over the given platform seams.
    pub fn new(backend: Arc<dyn LocationBackend>, permissions: Arc<dyn PermissionManager>) -> Self {
        Self {
            backend,
            permissions,
        }
    }

    /// Creates a manager over this platform's location service and
    /// permission prompts.
    #[must_use]
    pub fn system() -> Self {
        Self::new(
            Arc::new(sys::SystemBackend::default()),
            Arc::new(SystemPermissions),
        )
    }

    /// The backend requests are issued against.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn LocationBackend> {
        &self.backend
    }

    /// Get the current device location.
    ///
    /// Requests the location permissions first; the location service is not
    /// touched unless both are granted. Dropping the returned future cancels
    /// any outstanding platform request.
    ///
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] if a permission is refused.
    /// - [`LocationError::Timeout`] if no fix arrived within the timeout.
    /// - Any error from the options, the permission subsystem or the backend.
    pub async fn current_location(&self, options: &LocationOptions) -> LocationResult<Location> {
        options.validate()?;

        let status = self
            .permissions
            .check_permissions(&LOCATION_PERMISSIONS)
            .await?;
        if !status.is_granted() {
            debug!("location permissions not granted: {status:?}");
            return Err(LocationError::PermissionDenied);
        }

        self.locate(options).await
    }

    /// Get the current location without checking permissions.
    ///
    /// Blocks the calling thread for up to the configured timeout. Use this
    /// only where permissions were already verified, and never on the thread
    /// that delivers platform location callbacks.
    ///
    /// # Errors
    ///
    /// Same as [`Self::current_location`], minus the permission errors.
    pub fn current_location_unchecked(&self, options: &LocationOptions) -> LocationResult<Location> {
        futures::executor::block_on(self.current_location_unchecked_async(options))
    }

    /// Async counterpart of [`Self::current_location_unchecked`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::current_location`], minus the permission errors.
    pub async fn current_location_unchecked_async(
        &self,
        options: &LocationOptions,
    ) -> LocationResult<Location> {
        options.validate()?;
        self.locate(options).await
    }

    async fn locate(&self, options: &LocationOptions) -> LocationResult<Location> {
        let backend = self.backend.as_ref();

        if let Some(location) = fresh_last_known(backend, now_millis(), options.maximum_age()) {
            debug!("using cached fix from {}", location.provider);
            return Ok(location);
        }

        let mut pending = PendingRequest::new(backend);
        pending.issue(&options.strategy())?;
        pending.wait(options.timeout()).await
    }
}
