use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// Prefix shared by every place id minted from the spatial data source.
pub const SPATIAL_PLACE_ID_PREFIX: &str = "osm_";

/// A single opening period (kept structurally for API compatibility; the
/// upstream sources only ever provide display text, so periods stay empty).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningPeriod {
    pub open: TimePoint,
    pub close: TimePoint,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimePoint {
    /// Day of week, 0-6 (Sunday-Saturday)
    pub day: u8,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningHours {
    pub is_open: bool,
    #[serde(default)]
    pub periods: Vec<OpeningPeriod>,
    #[serde(default)]
    pub weekday_text: Vec<String>,
}

impl OpeningHours {
    /// Wrap a raw OSM `opening_hours` display string.
    pub fn from_display_text(text: &str) -> Self {
        OpeningHours {
            is_open: true,
            periods: Vec::new(),
            weekday_text: vec![text.to_string()],
        }
    }
}

/// A validated point of interest. Constructed during enrichment and treated
/// as immutable afterwards; day plans and routes share clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    pub place_id: String,
    pub name: String,
    pub coordinates: Coordinates,
    pub maps_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    /// Price level indicator, 0 (free) to 4 (very expensive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    /// Data reliability score (0-1)
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_visit: Option<String>,
    /// Admission info: "free", "~15 EUR", etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_url: Option<String>,
}

impl Poi {
    pub fn new(place_id: String, name: String, coordinates: Coordinates, maps_url: String) -> Self {
        Poi {
            place_id,
            name,
            coordinates,
            maps_url,
            opening_hours: None,
            price_level: None,
            confidence: 0.8,
            photos: None,
            address: None,
            types: None,
            visit_duration_minutes: None,
            why_visit: None,
            admission: None,
            admission_url: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Primary category tag, if any.
    pub fn primary_type(&self) -> Option<&str> {
        self.types
            .as_ref()
            .and_then(|t| t.first())
            .map(|s| s.as_str())
    }

    /// Food and drink venues skip the landmark image pipeline.
    pub fn is_food_venue(&self) -> bool {
        matches!(
            self.primary_type(),
            Some("cafe") | Some("bar") | Some("club") | Some("restaurant") | Some("pub")
        )
    }

    /// Whether this POI's coordinates came from the spatial tag source.
    pub fn is_spatial_sourced(&self) -> bool {
        self.place_id.starts_with(SPATIAL_PLACE_ID_PREFIX)
    }

    /// Minutes to plan for this stop, defaulting to an hour.
    pub fn visit_minutes_or_default(&self) -> u32 {
        self.visit_duration_minutes.unwrap_or(60)
    }
}

/// Structural validation of a POI-shaped JSON object before acceptance.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
    pub poi: Option<Poi>,
}

/// Validate that a raw POI object carries the required fields with sane
/// values. Invalid POIs are dropped by callers, not surfaced as errors.
pub fn validate_poi(raw: &serde_json::Value) -> ValidationResult {
    let mut missing = Vec::new();

    let place_id = raw
        .get("place_id")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if place_id.is_none() {
        missing.push("place_id".to_string());
    }

    let name = raw
        .get("name")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if name.is_none() {
        missing.push("name".to_string());
    }

    let coords = raw.get("coordinates");
    let lat = coords.and_then(|c| c.get("lat")).and_then(|v| v.as_f64());
    let lng = coords.and_then(|c| c.get("lng")).and_then(|v| v.as_f64());
    if !lat.is_some_and(|l| (-90.0..=90.0).contains(&l)) {
        missing.push("lat".to_string());
    }
    if !lng.is_some_and(|l| (-180.0..=180.0).contains(&l)) {
        missing.push("lng".to_string());
    }

    let maps_url = raw
        .get("maps_url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty());
    if maps_url.is_none() {
        missing.push("maps_url".to_string());
    }

    if !missing.is_empty() {
        return ValidationResult {
            is_valid: false,
            missing_fields: missing,
            poi: None,
        };
    }

    let coordinates = match Coordinates::new(lat.unwrap(), lng.unwrap()) {
        Ok(c) => c,
        Err(_) => {
            return ValidationResult {
                is_valid: false,
                missing_fields: vec!["validation_error".to_string()],
                poi: None,
            }
        }
    };

    let confidence = raw
        .get("confidence")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.8);

    let poi = Poi::new(
        place_id.unwrap().to_string(),
        name.unwrap().to_string(),
        coordinates,
        maps_url.unwrap().to_string(),
    )
    .with_confidence(confidence);

    ValidationResult {
        is_valid: true,
        missing_fields: Vec::new(),
        poi: Some(poi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_poi() -> Poi {
        Poi::new(
            "osm_node_123".to_string(),
            "Sagrada Familia".to_string(),
            Coordinates::new(41.4036, 2.1744).unwrap(),
            "https://www.google.com/maps/search/?api=1&query=Sagrada+Familia".to_string(),
        )
    }

    #[test]
    fn spatial_prefix_detection() {
        let poi = sample_poi();
        assert!(poi.is_spatial_sourced());

        let mut other = sample_poi();
        other.place_id = "starting_location".to_string();
        assert!(!other.is_spatial_sourced());
    }

    #[test]
    fn food_venue_detection() {
        let mut poi = sample_poi();
        assert!(!poi.is_food_venue());

        poi.types = Some(vec!["cafe".to_string()]);
        assert!(poi.is_food_venue());

        poi.types = Some(vec!["museum".to_string(), "cafe".to_string()]);
        assert!(!poi.is_food_venue(), "only the primary type counts");
    }

    #[test]
    fn visit_minutes_default() {
        let mut poi = sample_poi();
        assert_eq!(poi.visit_minutes_or_default(), 60);
        poi.visit_duration_minutes = Some(90);
        assert_eq!(poi.visit_minutes_or_default(), 90);
    }

    #[test]
    fn validate_poi_accepts_complete_object() {
        let raw = json!({
            "place_id": "osm_way_42",
            "name": "Park Güell",
            "coordinates": {"lat": 41.4145, "lng": 2.1527},
            "maps_url": "https://maps.example/park-guell",
            "confidence": 0.95,
        });
        let result = validate_poi(&raw);
        assert!(result.is_valid);
        let poi = result.poi.unwrap();
        assert_eq!(poi.name, "Park Güell");
        assert!((poi.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn validate_poi_reports_missing_fields() {
        let raw = json!({
            "name": "",
            "coordinates": {"lat": 95.0, "lng": 2.0},
        });
        let result = validate_poi(&raw);
        assert!(!result.is_valid);
        assert!(result.missing_fields.contains(&"place_id".to_string()));
        assert!(result.missing_fields.contains(&"name".to_string()));
        assert!(result.missing_fields.contains(&"lat".to_string()));
        assert!(result.missing_fields.contains(&"maps_url".to_string()));
    }

    #[test]
    fn opening_hours_from_display_text() {
        let hours = OpeningHours::from_display_text("Mo-Fr 09:00-18:00");
        assert!(hours.is_open);
        assert!(hours.periods.is_empty());
        assert_eq!(hours.weekday_text, vec!["Mo-Fr 09:00-18:00"]);
    }
}
