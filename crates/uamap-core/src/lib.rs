pub mod app_config;
pub mod config;
pub mod delivery;
pub mod types;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use delivery::DeliveryClassifier;
pub use types::{Coordinates, InputRecord, MapMarker, MarkerColor, ResolvedPoint};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
