use crate::app_config::AppConfig;
use crate::delivery::DeliveryClassifier;
use crate::types::Coordinates;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a working
/// configuration pointed at the public Nominatim instance.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_as(var, &or_default(var, default))
    };

    let parse_degrees = |var: &str, default: &str, limit: f64| -> Result<f64, ConfigError> {
        let value: f64 = parse_as(var, &or_default(var, default))?;
        if !value.is_finite() || value.abs() > limit {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("{value} is outside ±{limit}"),
            });
        }
        Ok(value)
    };

    let log_level = or_default("UAMAP_LOG_LEVEL", "info");
    let geocoder_base_url = or_default(
        "UAMAP_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org/",
    );
    let geocoder_user_agent = or_default("UAMAP_GEOCODER_USER_AGENT", "ukraine_map");
    let geocoder_timeout_secs = parse_u64("UAMAP_GEOCODER_TIMEOUT_SECS", "10")?;
    let country = or_default("UAMAP_COUNTRY", "Ukraine");
    let request_delay_ms = parse_u64("UAMAP_REQUEST_DELAY_MS", "500")?;

    let uploads_dir = PathBuf::from(or_default("UAMAP_UPLOADS_DIR", "uploads"));
    let output_map_path = PathBuf::from(or_default(
        "UAMAP_OUTPUT_MAP",
        "ukraine_map_circles_full.html",
    ));
    let missing_coords_path =
        PathBuf::from(or_default("UAMAP_MISSING_FILE", "missing_coordinates.txt"));

    let center_lat = parse_degrees("UAMAP_MAP_CENTER_LAT", "48.3794", 90.0)?;
    let center_lon = parse_degrees("UAMAP_MAP_CENTER_LON", "31.1656", 180.0)?;
    let map_zoom: u8 = parse_as("UAMAP_MAP_ZOOM", &or_default("UAMAP_MAP_ZOOM", "6"))?;

    let delivery = match lookup("UAMAP_AFFIRMATIVE_TOKENS") {
        Ok(raw) => {
            let classifier = DeliveryClassifier::new(raw.split(','));
            if classifier.tokens().is_empty() {
                return Err(ConfigError::InvalidEnvVar {
                    var: "UAMAP_AFFIRMATIVE_TOKENS".to_string(),
                    reason: "no non-blank tokens".to_string(),
                });
            }
            classifier
        }
        Err(_) => DeliveryClassifier::default(),
    };

    Ok(AppConfig {
        log_level,
        geocoder_base_url,
        geocoder_user_agent,
        geocoder_timeout_secs,
        country,
        request_delay_ms,
        uploads_dir,
        output_map_path,
        missing_coords_path,
        map_center: Coordinates::new(center_lat, center_lon),
        map_zoom,
        delivery,
    })
}
