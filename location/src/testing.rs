//! Test doubles for the platform seams.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::{
    Criteria, GPS_PROVIDER, ListenerId, Location, LocationBackend, LocationError, LocationResult,
    NETWORK_PROVIDER, PASSIVE_PROVIDER, Permission, PermissionError, PermissionManager,
    PermissionStatus, SingleUpdateListener,
};

#[derive(Debug, Clone)]
enum Reply {
    Immediately(Location),
    After(Duration, Location),
    Never,
    DropListener,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Requested {
    Criteria(Criteria),
    Provider(String),
}

#[derive(Debug)]
pub(crate) struct FakeBackend {
    reply: Reply,
    cached: Mutex<HashMap<String, Location>>,
    last_known_queries: Mutex<Vec<String>>,
    requests: Mutex<Vec<Requested>>,
    removed: Mutex<Vec<ListenerId>>,
    held: Mutex<Vec<SingleUpdateListener>>,
}

impl FakeBackend {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            cached: Mutex::default(),
            last_known_queries: Mutex::default(),
            requests: Mutex::default(),
            removed: Mutex::default(),
            held: Mutex::default(),
        }
    }

    pub(crate) fn replies_with(location: Location) -> Self {
        Self::with_reply(Reply::Immediately(location))
    }

    pub(crate) fn replies_after(delay: Duration, location: Location) -> Self {
        Self::with_reply(Reply::After(delay, location))
    }

    pub(crate) fn never_replies() -> Self {
        Self::with_reply(Reply::Never)
    }

    pub(crate) fn drops_listener() -> Self {
        Self::with_reply(Reply::DropListener)
    }

    pub(crate) fn cache(&self, location: Location) {
        self.cached
            .lock()
            .unwrap()
            .insert(location.provider.clone(), location);
    }

    pub(crate) fn last_known_queries(&self) -> Vec<String> {
        self.last_known_queries.lock().unwrap().clone()
    }

    pub(crate) fn requests(&self) -> Vec<Requested> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn removed(&self) -> Vec<ListenerId> {
        self.removed.lock().unwrap().clone()
    }

    pub(crate) fn held_listener(&self) -> Option<SingleUpdateListener> {
        self.held.lock().unwrap().last().cloned()
    }

    pub(crate) fn take_held(&self) -> Vec<SingleUpdateListener> {
        std::mem::take(&mut *self.held.lock().unwrap())
    }

    fn respond(&self, requested: Requested, listener: SingleUpdateListener) {
        self.requests.lock().unwrap().push(requested);
        match self.reply.clone() {
            Reply::Immediately(location) => {
                listener.on_location_changed(location);
            }
            Reply::After(delay, location) => {
                thread::spawn(move || {
                    thread::sleep(delay);
                    listener.on_location_changed(location);
                });
            }
            Reply::Never => self.held.lock().unwrap().push(listener),
            Reply::DropListener => drop(listener),
        }
    }
}

impl LocationBackend for FakeBackend {
    fn last_known_location(&self, provider: &str) -> Option<Location> {
        self.last_known_queries
            .lock()
            .unwrap()
            .push(provider.to_owned());
        self.cached.lock().unwrap().get(provider).cloned()
    }

    fn request_single_update_with_criteria(
        &self,
        criteria: &Criteria,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        self.respond(Requested::Criteria(*criteria), listener);
        Ok(())
    }

    fn request_single_update_with_provider(
        &self,
        provider: &str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        if ![GPS_PROVIDER, NETWORK_PROVIDER, PASSIVE_PROVIDER].contains(&provider) {
            return Err(LocationError::UnknownProvider(provider.to_owned()));
        }
        self.respond(Requested::Provider(provider.to_owned()), listener);
        Ok(())
    }

    fn remove_updates(&self, listener: ListenerId) {
        self.removed.lock().unwrap().push(listener);
    }
}

#[derive(Debug)]
pub(crate) struct FakePermissions {
    outcome: Result<PermissionStatus, PermissionError>,
    calls: AtomicUsize,
}

impl FakePermissions {
    pub(crate) const fn granting() -> Self {
        Self::with_outcome(Ok(PermissionStatus::Granted))
    }

    pub(crate) const fn denying() -> Self {
        Self::with_outcome(Ok(PermissionStatus::Denied))
    }

    pub(crate) const fn with_outcome(outcome: Result<PermissionStatus, PermissionError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PermissionManager for FakePermissions {
    fn check_permissions<'a>(
        &'a self,
        permissions: &'a [Permission],
    ) -> BoxFuture<'a, Result<PermissionStatus, PermissionError>> {
        assert_eq!(permissions, crate::LOCATION_PERMISSIONS);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}
