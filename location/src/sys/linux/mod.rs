//! Linux location backend using the GeoClue2 D-Bus service.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_timer::Delay;
use log::debug;
use zbus::Connection;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use super::worker::FixWorkers;
use crate::{
    Accuracy, Criteria, GPS_PROVIDER, ListenerId, Location, LocationBackend, LocationError,
    LocationResult, NETWORK_PROVIDER, PASSIVE_PROVIDER, SingleUpdateListener, now_millis,
};

const GEOCLUE_BUS: &str = "org.freedesktop.GeoClue2";
const MANAGER_PATH: &str = "/org/freedesktop/GeoClue2/Manager";
const MANAGER_IFACE: &str = "org.freedesktop.GeoClue2.Manager";
const CLIENT_IFACE: &str = "org.freedesktop.GeoClue2.Client";
const LOCATION_IFACE: &str = "org.freedesktop.GeoClue2.Location";
const PROPERTIES_IFACE: &str = "org.freedesktop.DBus.Properties";
const DESKTOP_ID: &str = "locatekit";

/// GClueAccuracyLevel values.
const ACCURACY_STREET: u32 = 6;
const ACCURACY_EXACT: u32 = 8;

/// How often the client is polled for its first fix.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Backend talking to GeoClue2 on the system bus.
///
/// Each request runs a short-lived GeoClue client on a worker thread. Fixes
/// at exact accuracy are cached as GPS readings, the rest as network ones.
#[derive(Debug, Default)]
pub struct GeoClueBackend {
    workers: FixWorkers,
}

impl GeoClueBackend {
    fn request(
        &self,
        level: u32,
        provider: &'static str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        self.workers.spawn(listener, move |cancelled| {
            futures::executor::block_on(fetch_fix(level, provider, cancelled))
        })
    }
}

impl LocationBackend for GeoClueBackend {
    fn last_known_location(&self, provider: &str) -> Option<Location> {
        self.workers.last_known(provider)
    }

    fn request_single_update_with_criteria(
        &self,
        criteria: &Criteria,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        match criteria.accuracy {
            Accuracy::Fine => self.request(ACCURACY_EXACT, GPS_PROVIDER, listener),
            Accuracy::Coarse => self.request(ACCURACY_STREET, NETWORK_PROVIDER, listener),
        }
    }

    fn request_single_update_with_provider(
        &self,
        provider: &str,
        listener: SingleUpdateListener,
    ) -> LocationResult<()> {
        match provider {
            GPS_PROVIDER => self.request(ACCURACY_EXACT, GPS_PROVIDER, listener),
            NETWORK_PROVIDER => self.request(ACCURACY_STREET, NETWORK_PROVIDER, listener),
            PASSIVE_PROVIDER => {
                // Passive never starts GeoClue; without a cached fix the
                // listener is released empty.
                if let Some(location) = self.workers.latest() {
                    listener.on_location_changed(location);
                }
                Ok(())
            }
            other => Err(LocationError::UnknownProvider(other.to_owned())),
        }
    }

    fn remove_updates(&self, listener: ListenerId) {
        self.workers.cancel(listener);
    }
}

fn dbus_error(context: &'static str) -> impl Fn(zbus::Error) -> LocationError {
    move |e| LocationError::Unknown(format!("{context}: {e}"))
}

async fn fetch_fix(level: u32, provider: &str, cancelled: &AtomicBool) -> LocationResult<Location> {
    let connection = Connection::system()
        .await
        .map_err(dbus_error("D-Bus connection failed"))?;

    let reply: (OwnedObjectPath,) = connection
        .call_method(
            Some(GEOCLUE_BUS),
            MANAGER_PATH,
            Some(MANAGER_IFACE),
            "GetClient",
            &(),
        )
        .await
        .map_err(dbus_error("GeoClue2 not available"))?
        .body()
        .deserialize()
        .map_err(dbus_error("failed to parse GetClient reply"))?;
    let client = reply.0;

    run_then_stop(
        run_client(&connection, &client, level, provider, cancelled),
        call_client(&connection, &client, "Stop"),
    )
    .await
}

/// Awaits `body`, then `stop` whatever the outcome.
async fn run_then_stop<T, S>(
    body: impl Future<Output = LocationResult<T>>,
    stop: impl Future<Output = LocationResult<S>>,
) -> LocationResult<T> {
    let result = body.await;
    if let Err(err) = stop.await {
        debug!("GeoClue client stop failed: {err}");
    }
    result
}

async fn run_client(
    connection: &Connection,
    client: &OwnedObjectPath,
    level: u32,
    provider: &str,
    cancelled: &AtomicBool,
) -> LocationResult<Location> {
    set_client_property(connection, client, "DesktopId", Value::from(DESKTOP_ID)).await?;
    set_client_property(
        connection,
        client,
        "RequestedAccuracyLevel",
        Value::from(level),
    )
    .await?;
    call_client(connection, client, "Start").await?;

    wait_for_fix(connection, client, provider, cancelled).await
}

async fn wait_for_fix(
    connection: &Connection,
    client: &OwnedObjectPath,
    provider: &str,
    cancelled: &AtomicBool,
) -> LocationResult<Location> {
    loop {
        if cancelled.load(Ordering::Acquire) {
            return Err(LocationError::Unknown("request cancelled".into()));
        }

        let value = get_property(connection, client.as_str(), CLIENT_IFACE, "Location").await?;
        let path = OwnedObjectPath::try_from(value)
            .map_err(|e| LocationError::Unknown(format!("invalid location path: {e}")))?;

        // "/" until the first fix arrives
        if path.as_str() != "/" {
            return read_location(connection, &path, provider).await;
        }
        Delay::new(POLL_INTERVAL).await;
    }
}

async fn read_location(
    connection: &Connection,
    path: &OwnedObjectPath,
    provider: &str,
) -> LocationResult<Location> {
    let latitude = f64_property(connection, path, "Latitude").await?;
    let longitude = f64_property(connection, path, "Longitude").await?;
    // GeoClue reports an unknown altitude as -DBL_MAX.
    let altitude = f64_property(connection, path, "Altitude")
        .await
        .ok()
        .filter(|altitude| *altitude > f64::MIN);
    let accuracy = f64_property(connection, path, "Accuracy").await.ok();

    Ok(Location {
        latitude,
        longitude,
        altitude,
        horizontal_accuracy: accuracy,
        vertical_accuracy: None,
        provider: provider.to_owned(),
        timestamp: now_millis(),
    })
}

async fn f64_property(
    connection: &Connection,
    path: &OwnedObjectPath,
    name: &str,
) -> LocationResult<f64> {
    let value = get_property(connection, path.as_str(), LOCATION_IFACE, name).await?;
    f64::try_from(value).map_err(|e| LocationError::Unknown(format!("invalid {name}: {e}")))
}

async fn get_property(
    connection: &Connection,
    path: &str,
    interface: &str,
    name: &str,
) -> LocationResult<OwnedValue> {
    connection
        .call_method(
            Some(GEOCLUE_BUS),
            path,
            Some(PROPERTIES_IFACE),
            "Get",
            &(interface, name),
        )
        .await
        .map_err(dbus_error("failed to get property"))?
        .body()
        .deserialize()
        .map_err(dbus_error("failed to parse property"))
}

async fn set_client_property(
    connection: &Connection,
    client: &OwnedObjectPath,
    name: &str,
    value: Value<'_>,
) -> LocationResult<()> {
    connection
        .call_method(
            Some(GEOCLUE_BUS),
            client.as_str(),
            Some(PROPERTIES_IFACE),
            "Set",
            &(CLIENT_IFACE, name, value),
        )
        .await
        .map_err(dbus_error("failed to set client property"))?;
    Ok(())
}

async fn call_client(
    connection: &Connection,
    client: &OwnedObjectPath,
    method: &str,
) -> LocationResult<()> {
    connection
        .call_method(
            Some(GEOCLUE_BUS),
            client.as_str(),
            Some(CLIENT_IFACE),
            method,
            &(),
        )
        .await
        .map_err(dbus_error("GeoClue client call failed"))?;
    Ok(())
}
