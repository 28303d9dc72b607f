//! Leaflet map document builder.
//!
//! Markers are collected in memory and rendered into one HTML page that
//! loads Leaflet from a CDN and draws every marker as a circle with a popup.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{json, Value};
use uamap_core::{Coordinates, MapMarker};

const MARKER_RADIUS: u32 = 5;
const FILL_OPACITY: f64 = 0.7;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="uk">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Delivery map</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" crossorigin="" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js" crossorigin=""></script>
  <style>
    html, body { height: 100%; margin: 0; }
    #map { position: absolute; inset: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const map = L.map('map').setView([__CENTER_LAT__, __CENTER_LON__], __ZOOM__);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
      maxZoom: 18,
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);

    const markers = __MARKERS__;
    for (const m of markers) {
      const popup = document.createElement('div');
      popup.textContent = m.label;
      L.circleMarker([m.lat, m.lon], {
        radius: __RADIUS__,
        color: m.color,
        fill: true,
        fillColor: m.color,
        fillOpacity: __FILL_OPACITY__
      }).bindPopup(popup).addTo(map);
    }
  </script>
</body>
</html>
"#;

/// Accumulates markers for one run. Markers can only be added.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    center: Coordinates,
    zoom: u8,
    markers: Vec<MapMarker>,
}

impl MapBuilder {
    #[must_use]
    pub fn new(center: Coordinates, zoom: u8) -> Self {
        Self {
            center,
            zoom,
            markers: Vec::new(),
        }
    }

    pub fn add_marker(&mut self, marker: MapMarker) {
        self.markers.push(marker);
    }

    #[must_use]
    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Renders the base map and every marker as a standalone HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let payload: Vec<Value> = self
            .markers
            .iter()
            .map(|m| {
                json!({
                    "lat": m.coordinates.latitude,
                    "lon": m.coordinates.longitude,
                    "color": m.color.as_str(),
                    "label": m.label,
                })
            })
            .collect();
        // A literal "</script>" inside a label would end the script block.
        let markers = Value::Array(payload).to_string().replace("</", "<\\/");

        TEMPLATE
            .replace("__CENTER_LAT__", &self.center.latitude.to_string())
            .replace("__CENTER_LON__", &self.center.longitude.to_string())
            .replace("__ZOOM__", &self.zoom.to_string())
            .replace("__RADIUS__", &MARKER_RADIUS.to_string())
            .replace("__FILL_OPACITY__", &FILL_OPACITY.to_string())
            .replace("__MARKERS__", &markers)
    }

    /// Writes [`MapBuilder::to_html`] to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the file cannot be written.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_html())
    }
}

#[cfg(test)]
mod tests {
    use uamap_core::MarkerColor;

    use super::*;

    fn ukraine() -> MapBuilder {
        MapBuilder::new(Coordinates::new(48.3794, 31.1656), 6)
    }

    fn marker(lat: f64, lon: f64, color: MarkerColor, label: &str) -> MapMarker {
        MapMarker {
            coordinates: Coordinates::new(lat, lon),
            color,
            label: label.to_owned(),
        }
    }

    #[test]
    fn empty_map_renders_valid_document() {
        let html = ukraine().to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("setView([48.3794, 31.1656], 6)"));
        assert!(html.contains("const markers = [];"));
        assert!(!html.contains("__"), "unreplaced placeholder in output");
    }

    #[test]
    fn markers_are_rendered_with_color_and_label() {
        let mut map = ukraine();
        map.add_marker(marker(50.45, 30.52, MarkerColor::Green, "Київ (Київська): да"));
        map.add_marker(marker(46.48, 30.72, MarkerColor::Red, "Одеса (Одеська): нет"));
        assert_eq!(map.len(), 2);
        assert_eq!(map.markers()[0].color, MarkerColor::Green);
        assert_eq!(map.markers()[1].label, "Одеса (Одеська): нет");

        let html = map.to_html();
        assert!(html.contains(
            r#"{"color":"green","label":"Київ (Київська): да","lat":50.45,"lon":30.52}"#
        ));
        assert!(html.contains(r#""color":"red""#));
        assert!(html.contains("radius: 5"));
        assert!(html.contains("fillOpacity: 0.7"));
    }

    #[test]
    fn labels_cannot_close_the_script_block() {
        let mut map = ukraine();
        map.add_marker(marker(
            50.0,
            30.0,
            MarkerColor::Red,
            "</script><script>alert(1)</script>",
        ));
        let html = map.to_html();
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.html");
        fs::write(&path, "stale").unwrap();

        ukraine().save(&path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("const markers = [];"));
    }

    #[test]
    fn markers_keep_insertion_order() {
        let mut map = ukraine();
        assert!(map.is_empty());
        map.add_marker(marker(49.84, 24.03, MarkerColor::Red, "Львів (Львівська): ні"));
        map.add_marker(marker(49.99, 36.23, MarkerColor::Green, "Харків (Харківська): так"));

        let labels: Vec<&str> = map.markers().iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, ["Львів (Львівська): ні", "Харків (Харківська): так"]);
    }
}
