//! Desktop smoke test for locatekit-location.
//!
//! Run with: cargo run -p locatekit-location-test -- '{"timeout": 10000, "enableHighAccuracy": true}'

use locatekit_location::{LOCATION_PERMISSIONS, LocationManager, LocationOptions};
use locatekit_permission::{PermissionManager, SystemPermissions};

#[tokio::main]
async fn main() {
    println!("=== Locatekit Location Test ===\n");

    let options = match std::env::args().nth(1) {
        Some(json) => match LocationOptions::from_json(&json) {
            Ok(options) => options,
            Err(e) => {
                println!("Invalid options: {e}");
                return;
            }
        },
        None => LocationOptions::new(),
    };
    println!("Options: {options:?}\n");

    println!("Checking location permissions...");
    match SystemPermissions.check_permissions(&LOCATION_PERMISSIONS).await {
        Ok(status) => println!("Permission status: {status:?}\n"),
        Err(e) => println!("Permission check failed: {e}\n"),
    }

    let manager = LocationManager::system();

    println!("Getting current location...");
    match manager.current_location(&options).await {
        Ok(location) => {
            println!("✓ Location retrieved successfully!");
            println!("  Provider:  {}", location.provider);
            println!("  Latitude:  {:.6}°", location.latitude);
            println!("  Longitude: {:.6}°", location.longitude);
            if let Some(alt) = location.altitude {
                println!("  Altitude:  {alt:.1}m");
            }
            if let Some(acc) = location.horizontal_accuracy {
                println!("  Accuracy:  {acc:.1}m");
            }
            println!("  Timestamp: {}", location.timestamp);
        }
        Err(e) => {
            println!("✗ Failed to get location: {e}");
            return;
        }
    }

    println!("\nAsking again, accepting the cached fix...");
    let cached = options.clone().with_maximum_age(std::time::Duration::from_secs(60));
    match manager.current_location_unchecked_async(&cached).await {
        Ok(location) => println!("✓ Cached fix from {} at {}", location.provider, location.timestamp),
        Err(e) => println!("✗ Failed: {e}"),
    }
}
