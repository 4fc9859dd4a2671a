//! Shared plumbing for backends that fetch a fix on a worker thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, warn};

use crate::{ListenerId, Location, LocationError, LocationResult, SingleUpdateListener};

type Registry = Arc<Mutex<HashMap<ListenerId, Arc<AtomicBool>>>>;

/// Fix cache and cancellation registry for one backend.
#[derive(Debug, Default)]
pub(crate) struct FixWorkers {
    cache: Arc<Mutex<HashMap<String, Location>>>,
    active: Registry,
}

impl FixWorkers {
    /// Last fix fetched for `provider`.
    pub(crate) fn last_known(&self, provider: &str) -> Option<Location> {
        self.cache.lock().ok()?.get(provider).cloned()
    }

    /// Most recent fix from any provider.
    pub(crate) fn latest(&self) -> Option<Location> {
        self.cache
            .lock()
            .ok()?
            .values()
            .max_by_key(|location| location.timestamp)
            .cloned()
    }

    /// Runs `fetch` on a worker thread and delivers its fix to `listener`.
    ///
    /// `fetch` should poll the flag it is given and give up once it is set.
    /// A failed fetch is delivered to the listener as an error.
    pub(crate) fn spawn<F>(&self, listener: SingleUpdateListener, fetch: F) -> LocationResult<()>
    where
        F: FnOnce(&AtomicBool) -> LocationResult<Location> + Send + 'static,
    {
        let id = listener.id();
        let cancelled = Arc::new(AtomicBool::new(false));
        self.active
            .lock()
            .map_err(|_| LocationError::Unknown("request registry poisoned".into()))?
            .insert(id, Arc::clone(&cancelled));

        let active = Arc::clone(&self.active);
        let cache = Arc::clone(&self.cache);
        let worker = thread::Builder::new()
            .name(format!("locatekit-{id}"))
            .spawn(move || {
                let result = fetch(&cancelled);
                if let Ok(mut active) = active.lock() {
                    active.remove(&id);
                }
                if cancelled.load(Ordering::Acquire) {
                    debug!("{id}: cancelled, discarding result");
                    return;
                }
                match result {
                    Ok(location) => {
                        if let Ok(mut cache) = cache.lock() {
                            cache.insert(location.provider.clone(), location.clone());
                        }
                        listener.on_location_changed(location);
                    }
                    Err(err) => {
                        warn!("{id}: fix failed: {err}");
                        listener.on_error(err);
                    }
                }
            });

        if let Err(err) = worker {
            self.cancel(id);
            return Err(LocationError::Unknown(format!(
                "failed to spawn location worker: {err}"
            )));
        }
        Ok(())
    }

    /// Flags the worker for `id` so its result is discarded.
    pub(crate) fn cancel(&self, id: ListenerId) {
        let flag = self
            .active
            .lock()
            .ok()
            .and_then(|mut active| active.remove(&id));
        if let Some(flag) = flag {
            flag.store(true, Ordering::Release);
            debug!("{id}: cancellation flagged");
        }
    }
}
