//! Wire types for the Nominatim `/search` endpoint.

use serde::Deserialize;

/// One hit from `/search?format=json`.
///
/// Nominatim encodes coordinates as decimal strings. Other fields in the
/// response are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
