use std::fmt;

use crate::{Criteria, ListenerId, Location, LocationResult, SingleUpdateListener};

/// The platform location service a [`LocationManager`](crate::LocationManager)
/// drives.
///
/// Implementations wrap the OS location stack. Callbacks may be delivered on
/// any thread by calling [`SingleUpdateListener::on_location_changed`], or
/// [`SingleUpdateListener::on_error`] when the fix cannot be obtained.
pub trait LocationBackend: Send + Sync + fmt::Debug {
    /// Returns the fix cached by `provider` from an earlier request, if any.
    fn last_known_location(&self, provider: &str) -> Option<Location>;

    /// Requests one update from whichever provider best matches `criteria`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the request.
    fn request_single_update_with_criteria(
        &self,
        criteria: &Criteria,
        listener: SingleUpdateListener,
    ) -> LocationResult<()>;

    /// Requests one update from the named provider.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::UnknownProvider`](crate::LocationError::UnknownProvider)
    /// if the provider does not exist, or another error if the platform
    /// rejects the request.
    fn request_single_update_with_provider(
        &self,
        provider: &str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()>;

    /// Cancels any outstanding request registered for `listener`.
    ///
    /// Cancelling an unknown or already finished request is a no-op.
    fn remove_updates(&self, listener: ListenerId);
}
