//! # Locatekit
//!
//! Single-shot "where is the device right now?" for applications.
//!
//! A request returns a cached reading when one is fresh enough, otherwise asks
//! the platform for exactly one update and waits for it with a timeout. The
//! async entry point first makes sure the location permissions are granted.
//!
//! ## Features
//!
//! - `location`: the [`LocationManager`](location::LocationManager) facade and
//!   platform backends (enabled by default).
//! - `permission`: the permission gate on its own.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! locatekit = { version = "0.1", features = ["location"] }
//! ```
//!
//! ```ignore
//! use locatekit::location::{LocationManager, LocationOptions};
//!
//! async fn get_coords(manager: &LocationManager) {
//!     let options = LocationOptions::from_json(r#"{"timeout": 5000, "maximumAge": 60000}"#)
//!         .expect("valid options");
//!     if let Ok(pos) = manager.current_location(&options).await {
//!         println!("Latitude: {}, Longitude: {}", pos.latitude, pos.longitude);
//!     }
//! }
//! ```

#[cfg(feature = "location")]
pub use locatekit_location as location;

#[cfg(feature = "permission")]
pub use locatekit_permission as permission;
