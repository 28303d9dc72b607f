//! The coordinate-resolution seam between the pipeline and a geocoder.

use std::future::Future;

use uamap_core::Coordinates;

use crate::error::GeocodeError;

/// Outcome of a lookup that reached the service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(Coordinates),
    /// The service answered but had no match for the query.
    NotFound,
}

impl Resolution {
    #[must_use]
    pub fn coordinates(self) -> Option<Coordinates> {
        match self {
            Resolution::Found(c) => Some(c),
            Resolution::NotFound => None,
        }
    }
}

/// Translates a (city, region) pair into coordinates.
///
/// Implementations keep "no such place" ([`Resolution::NotFound`]) apart from
/// "could not ask" (`Err`), so callers may treat them differently.
pub trait Resolver: Send + Sync {
    fn resolve(
        &self,
        city: &str,
        region: &str,
    ) -> impl Future<Output = Result<Resolution, GeocodeError>> + Send;
}

/// Free-text query sent to the geocoder: `"{city}, {region}, {country}"`.
#[must_use]
pub fn build_query(city: &str, region: &str, country: &str) -> String {
    format!("{city}, {region}, {country}")
}
