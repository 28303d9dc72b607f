use thiserror::Error;

/// Errors returned while talking to the geocoding service.
///
/// "No match" is not an error; see [`crate::Resolution::NotFound`].
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by geocoder (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("geocoder returned an unparseable coordinate: {value:?}")]
    InvalidCoordinate { value: String },

    #[error("invalid geocoder base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl GeocodeError {
    /// Returns `true` if repeating the same request later could succeed:
    /// network failures, 429, and 5xx responses.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(_) | GeocodeError::RateLimited { .. } => true,
            GeocodeError::UnexpectedStatus { status, .. } => *status >= 500,
            GeocodeError::Deserialize { .. }
            | GeocodeError::InvalidCoordinate { .. }
            | GeocodeError::InvalidBaseUrl { .. } => false,
        }
    }
}
