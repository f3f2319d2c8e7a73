use anyhow::Result;
use rusqlite::Connection;

use crate::config::settings::LocationConfig;
use crate::db::repository::StorageRepo;

pub const UNKNOWN_LOCATION: &str = "Your Location";

fn storage_key(latitude: f64, longitude: f64) -> String {
    format!("location-name:{:.4},{:.4}", latitude, longitude)
}

/// Display name for a location: the configured name, a stored lookup, a
/// fresh reverse-geocoding lookup, or "Your Location".
pub fn display_name<F>(conn: &Connection, location: &LocationConfig, lookup: F) -> Result<String>
where
    F: FnOnce(f64, f64) -> Result<Option<String>>,
{
    if let Some(name) = &location.name {
        return Ok(name.clone());
    }

    let key = storage_key(location.latitude, location.longitude);
    if let Some(name) = StorageRepo::get(conn, &key)? {
        return Ok(name);
    }

    match lookup(location.latitude, location.longitude) {
        Ok(Some(name)) => {
            StorageRepo::set(conn, &key, &name)?;
            Ok(name)
        }
        Ok(None) => Ok(UNKNOWN_LOCATION.to_string()),
        Err(e) => {
            log::info!("Could not get location name: {:#}", e);
            Ok(UNKNOWN_LOCATION.to_string())
        }
    }
}
