//! HTTP client for the Nominatim `/search` endpoint.
//!
//! Sends one free-text query per lookup and keeps only the first hit. Status
//! handling mirrors the service's usage policy: 429 is surfaced as
//! [`GeocodeError::RateLimited`], other non-2xx responses as
//! [`GeocodeError::UnexpectedStatus`]. Nothing is retried here.

use std::time::Duration;

use reqwest::{Client, Url};
use uamap_core::{AppConfig, Coordinates};

use crate::error::GeocodeError;
use crate::resolver::{build_query, Resolution, Resolver};
use crate::types::SearchHit;

/// Client for a Nominatim-compatible geocoding service.
///
/// Use [`NominatimClient::new`] with the public instance's URL for
/// production or a mock server's URI in tests.
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    country: String,
}

impl NominatimClient {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// `country` is appended to every query built by [`Resolver::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        country: &str,
    ) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise to exactly one trailing slash so `join` appends rather
        // than replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url,
            country: country.to_owned(),
        })
    }

    /// Creates a client from the `UAMAP_GEOCODER_*` and `UAMAP_COUNTRY` settings.
    ///
    /// # Errors
    ///
    /// See [`NominatimClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, GeocodeError> {
        Self::new(
            &config.geocoder_base_url,
            &config.geocoder_user_agent,
            config.geocoder_timeout_secs,
            &config.country,
        )
    }

    /// Looks up a free-text query and returns the first hit's coordinates.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::RateLimited`] on HTTP 429.
    /// - [`GeocodeError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GeocodeError::Http`] on network or TLS failure.
    /// - [`GeocodeError::Deserialize`] if the body is not a JSON hit list.
    /// - [`GeocodeError::InvalidCoordinate`] if the first hit's `lat`/`lon`
    ///   are not decimal numbers.
    pub async fn geocode(&self, query: &str) -> Result<Resolution, GeocodeError> {
        let url = self.query_url(query);
        tracing::debug!(%query, "geocoding");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(GeocodeError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        let Some(first) = hits.into_iter().next() else {
            return Ok(Resolution::NotFound);
        };

        let latitude = parse_degrees(&first.lat)?;
        let longitude = parse_degrees(&first.lon)?;
        tracing::debug!(
            %query,
            latitude,
            longitude,
            display_name = first.display_name.as_deref().unwrap_or(""),
            "geocoded"
        );
        Ok(Resolution::Found(Coordinates::new(latitude, longitude)))
    }

    /// Builds the `/search` URL with properly percent-encoded parameters.
    fn query_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        url
    }
}

impl Resolver for NominatimClient {
    async fn resolve(&self, city: &str, region: &str) -> Result<Resolution, GeocodeError> {
        let query = build_query(city, region, &self.country);
        self.geocode(&query).await
    }
}

fn parse_degrees(raw: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate {
            value: raw.to_owned(),
        })
}
