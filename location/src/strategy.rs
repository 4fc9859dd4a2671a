use log::debug;
use serde::{Deserialize, Serialize};

use crate::{LocationBackend, LocationResult, SingleUpdateListener};

/// Accuracy tier used to let the platform pick a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    /// Best available precision, usually satellite based.
    Fine,
    /// Approximate position, usually cell or Wi-Fi based.
    #[default]
    Coarse,
}

/// Provider selection criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Criteria {
    /// Requested accuracy tier.
    pub accuracy: Accuracy,
}

impl Criteria {
    /// Criteria requesting the given accuracy tier.
    #[must_use]
    pub const fn with_accuracy(accuracy: Accuracy) -> Self {
        Self { accuracy }
    }
}

/// How a single update is requested from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStrategy {
    /// Let the platform choose a provider matching the criteria.
    Criteria(Criteria),
    /// Ask a specific provider by name.
    Provider(String),
}

impl RequestStrategy {
    /// Criteria-based strategy: [`Accuracy::Fine`] when `enable` is set,
    /// [`Accuracy::Coarse`] otherwise.
    #[must_use]
    pub const fn from_high_accuracy(enable: bool) -> Self {
        let accuracy = if enable {
            Accuracy::Fine
        } else {
            Accuracy::Coarse
        };
        Self::Criteria(Criteria::with_accuracy(accuracy))
    }

    /// Provider-based strategy.
    pub fn provider(name: impl Into<String>) -> Self {
        Self::Provider(name.into())
    }

    /// Issues exactly one update request, delivering to `listener`.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by the backend.
    pub fn request_single_update(
        &self,
        backend: &dyn LocationBackend,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        debug!("{}: requesting single update via {self:?}", listener.id());
        match self {
            Self::Criteria(criteria) => backend.request_single_update_with_criteria(criteria, listener),
            Self::Provider(provider) => backend.request_single_update_with_provider(provider, listener),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, Requested};
    use crate::{LocationError, PendingRequest};

    #[test]
    fn high_accuracy_maps_to_fine() {
        assert_eq!(
            RequestStrategy::from_high_accuracy(true),
            RequestStrategy::Criteria(Criteria::with_accuracy(Accuracy::Fine))
        );
        assert_eq!(
            RequestStrategy::from_high_accuracy(false),
            RequestStrategy::Criteria(Criteria::with_accuracy(Accuracy::Coarse))
        );
    }

    #[test]
    fn dispatches_to_matching_backend_call() {
        let backend = FakeBackend::never_replies();

        let mut pending = PendingRequest::new(&backend);
        pending.issue(&RequestStrategy::from_high_accuracy(true)).unwrap();
        let mut pending_provider = PendingRequest::new(&backend);
        pending_provider.issue(&RequestStrategy::provider("network")).unwrap();

        assert_eq!(
            backend.requests(),
            vec![
                Requested::Criteria(Criteria::with_accuracy(Accuracy::Fine)),
                Requested::Provider("network".into()),
            ]
        );
    }

    #[test]
    fn backend_errors_propagate() {
        let backend = FakeBackend::never_replies();
        let mut pending = PendingRequest::new(&backend);

        let err = pending.issue(&RequestStrategy::provider("sonar")).unwrap_err();

        assert_eq!(err, LocationError::UnknownProvider("sonar".into()));
        assert!(backend.requests().is_empty());
    }
}
