use std::path::PathBuf;

use crate::delivery::DeliveryClassifier;
use crate::types::Coordinates;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub geocoder_base_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_timeout_secs: u64,
    pub country: String,
    pub request_delay_ms: u64,
    pub uploads_dir: PathBuf,
    pub output_map_path: PathBuf,
    pub missing_coords_path: PathBuf,
    pub map_center: Coordinates,
    pub map_zoom: u8,
    pub delivery: DeliveryClassifier,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("country", &self.country)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("uploads_dir", &self.uploads_dir)
            .field("output_map_path", &self.output_map_path)
            .field("missing_coords_path", &self.missing_coords_path)
            .field(
                "map_center",
                &format_args!(
                    "{}, {}",
                    self.map_center.latitude, self.map_center.longitude
                ),
            )
            .field("map_zoom", &self.map_zoom)
            .field("affirmative_tokens", &self.delivery.tokens())
            .finish()
    }
}
