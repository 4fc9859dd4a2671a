//! One-shot delivery of a location update and the bounded wait on it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError, bounded};
use futures::future::{self, Either};
use futures_timer::Delay;
use log::{debug, warn};

use crate::{Location, LocationBackend, LocationError, LocationResult, RequestStrategy};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one outstanding single-update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for handing across FFI boundaries.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// Callback handed to a [`LocationBackend`] for a single update.
///
/// Only the first delivery, reading or error, is accepted; later ones are
/// dropped. Dropping every clone without delivering completes the request
/// with no data.
#[derive(Clone)]
pub struct SingleUpdateListener {
    id: ListenerId,
    sender: Sender<LocationResult<Location>>,
}

impl fmt::Debug for SingleUpdateListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleUpdateListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl SingleUpdateListener {
    /// Identifier to pass back to [`LocationBackend::remove_updates`].
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Delivers a reading. Returns `true` if it was accepted.
    pub fn on_location_changed(&self, location: Location) -> bool {
        self.deliver(Ok(location))
    }

    /// Fails the request with a platform error. Returns `true` if it was
    /// accepted.
    pub fn on_error(&self, error: LocationError) -> bool {
        self.deliver(Err(error))
    }

    fn deliver(&self, result: LocationResult<Location>) -> bool {
        match self.sender.try_send(result) {
            Ok(()) => {
                self.sender.close();
                true
            }
            Err(TrySendError::Full(_) | TrySendError::Closed(_)) => {
                warn!("{}: dropping late location update", self.id);
                false
            }
        }
    }

    /// Returns `true` once the request no longer accepts readings.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Lifecycle of a [`PendingRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
    /// Nothing issued yet.
    Idle,
    /// Request issued, waiting for the listener.
    Waiting,
    /// The listener fired.
    Completed,
    /// The deadline passed and the request was cancelled.
    TimedOut,
    /// The waiter went away and the request was cancelled.
    Cancelled,
}

/// State of one in-flight single-update request.
///
/// Dropping a request that is still waiting cancels it with the backend.
pub struct PendingRequest<'a> {
    backend: &'a dyn LocationBackend,
    id: ListenerId,
    listener: Option<SingleUpdateListener>,
    receiver: Receiver<LocationResult<Location>>,
    state: RequestState,
}

impl fmt::Debug for PendingRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a> PendingRequest<'a> {
    /// Creates an idle request against `backend`.
    pub fn new(backend: &'a dyn LocationBackend) -> Self {
        let (sender, receiver) = bounded(1);
        let id = ListenerId::next();
        Self {
            backend,
            id,
            listener: Some(SingleUpdateListener { id, sender }),
            receiver,
            state: RequestState::Idle,
        }
    }

    /// Identifier of the listener registered for this request.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> RequestState {
        self.state
    }

    /// Issues the platform request using `strategy`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the request then stays idle. Issuing
    /// twice is rejected with [`LocationError::Unknown`].
    pub fn issue(&mut self, strategy: &RequestStrategy) -> LocationResult<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| LocationError::Unknown(format!("{} already issued", self.id)))?;
        strategy.request_single_update(self.backend, listener)?;
        self.state = RequestState::Waiting;
        Ok(())
    }

    /// Waits up to `timeout` for the listener to fire.
    ///
    /// On timeout the backend request is cancelled exactly once.
    ///
    /// # Errors
    ///
    /// - [`LocationError::Timeout`] if nothing arrived in time.
    /// - [`LocationError::NoData`] if the backend released the listener
    ///   without a reading.
    /// - The error the backend passed to [`SingleUpdateListener::on_error`].
    /// - [`LocationError::Unknown`] if the request was never issued or has
    ///   already finished.
    pub async fn wait(&mut self, timeout: Duration) -> LocationResult<Location> {
        if self.state != RequestState::Waiting {
            return Err(LocationError::Unknown(format!(
                "{} is not waiting ({:?})",
                self.id, self.state
            )));
        }

        let received = {
            let recv = self.receiver.recv();
            let deadline = Delay::new(timeout);
            futures::pin_mut!(recv, deadline);
            match future::select(recv, deadline).await {
                Either::Left((received, _)) => Some(received),
                Either::Right(((), _)) => None,
            }
        };

        match received {
            Some(Ok(Ok(location))) => {
                self.state = RequestState::Completed;
                self.receiver.close();
                debug!("{}: received fix from {}", self.id, location.provider);
                Ok(location)
            }
            Some(Ok(Err(err))) => {
                self.state = RequestState::Completed;
                self.receiver.close();
                debug!("{}: request failed: {err}", self.id);
                Err(err)
            }
            Some(Err(_)) => {
                self.state = RequestState::Completed;
                debug!("{}: listener released without a fix", self.id);
                Err(LocationError::NoData)
            }
            None => {
                self.cancel(RequestState::TimedOut);
                debug!("{}: timed out after {timeout:?}", self.id);
                Err(LocationError::Timeout)
            }
        }
    }

    fn cancel(&mut self, terminal: RequestState) {
        self.state = terminal;
        self.receiver.close();
        self.backend.remove_updates(self.id);
    }
}

impl Drop for PendingRequest<'_> {
    fn drop(&mut self) {
        if self.state == RequestState::Waiting {
            debug!("{}: waiter dropped, cancelling request", self.id);
            self.cancel(RequestState::Cancelled);
        }
    }
}
