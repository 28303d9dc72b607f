//! Domain types shared by the geocoder, pipeline, and CLI crates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryClassifier;

/// One spreadsheet row, projected onto the three columns the map cares about.
///
/// Equality covers all three fields; two rows that differ only in delivery
/// status are distinct records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRecord {
    pub area: String,
    pub city: String,
    pub delivery_status: String,
}

impl InputRecord {
    pub fn new(
        area: impl Into<String>,
        city: impl Into<String>,
        delivery_status: impl Into<String>,
    ) -> Self {
        Self {
            area: area.into(),
            city: city.into(),
            delivery_status: delivery_status.into(),
        }
    }

    /// Popup text shown on the record's marker: `"{city} ({area}): {status}"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({}): {}", self.city, self.area, self.delivery_status)
    }
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Result of looking up one (city, area) pair.
///
/// `coordinates: None` means the pair could not be geocoded. It is never
/// represented as `(0.0, 0.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPoint {
    pub city: String,
    pub area: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Green,
    Red,
}

impl MarkerColor {
    /// CSS color name used when rendering the marker.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MarkerColor::Green => "green",
            MarkerColor::Red => "red",
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A colored point annotation on the generated map.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub coordinates: Coordinates,
    pub color: MarkerColor,
    pub label: String,
}

impl MapMarker {
    /// Builds the marker for a record that geocoded to `coordinates`.
    ///
    /// The color comes from `classifier`; the label keeps the delivery status
    /// exactly as it appeared in the spreadsheet.
    #[must_use]
    pub fn for_record(
        record: &InputRecord,
        coordinates: Coordinates,
        classifier: &DeliveryClassifier,
    ) -> Self {
        Self {
            coordinates,
            color: classifier.color_for(&record.delivery_status),
            label: record.label(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_uses_raw_delivery_status() {
        let record = InputRecord::new("Київська", "Бровари", " Да ");
        assert_eq!(record.label(), "Бровари (Київська):  Да ");
    }

    #[test]
    fn records_differing_only_in_status_are_distinct() {
        let a = InputRecord::new("Львівська", "Львів", "да");
        let b = InputRecord::new("Львівська", "Львів", "нет");
        assert_ne!(a, b);
    }

    #[test]
    fn marker_for_affirmative_record_is_green() {
        let record = InputRecord::new("Одеська", "Одеса", "ДА");
        let marker = MapMarker::for_record(
            &record,
            Coordinates::new(46.48, 30.72),
            &DeliveryClassifier::default(),
        );
        assert_eq!(marker.color, MarkerColor::Green);
        assert_eq!(marker.label, "Одеса (Одеська): ДА");
    }

    #[test]
    fn marker_color_serializes_lowercase() {
        let json = serde_json::to_string(&MarkerColor::Red).unwrap();
        assert_eq!(json, "\"red\"");
    }

    #[test]
    fn coordinates_display_has_six_decimals() {
        assert_eq!(
            Coordinates::new(50.45, 30.5234).to_string(),
            "50.450000, 30.523400"
        );
    }
}
