use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{BoundingBox, Coordinates, OpeningHours, Poi};
use crate::services::http::{get_json_with_retry, HttpClients};
use crate::services::llm::LandmarkSuggestion;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const NOMINATIM_LOOKUP_URL: &str = "https://nominatim.openstreetmap.org/lookup";
const PHOTON_URL: &str = "https://photon.komoot.io/api/";

/// Build a Google Maps search deep link for a place query. Plain URL
/// construction, no API key involved.
pub fn maps_search_url(query: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(query)
    )
}

/// Resolved city context used to validate every geocoding hit.
#[derive(Debug, Clone)]
pub struct CityInfo {
    pub center: Coordinates,
    pub bbox: BoundingBox,
    pub country: String,
    pub country_code: String,
    pub display_name: String,
}

/// One geocoder hit, parsed out of Nominatim's response shape.
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub coordinates: Coordinates,
    pub display_name: String,
    pub osm_type: String,
    pub osm_id: String,
    pub country_code: String,
    pub opening_hours: Option<String>,
}

/// A successful free-text geocode, tagged with the provider that won.
#[derive(Debug, Clone)]
pub struct FreeGeocode {
    pub coordinates: Coordinates,
    pub display_name: String,
    pub source: &'static str,
}

/// Nominatim-backed geocoder with strict cross-city validation. The
/// geocoder searches globally, so "Versailles Palace" would happily
/// resolve to France while building a Brussels itinerary; every strategy
/// below exists to reject such hits.
pub struct GeocoderService {
    clients: HttpClients,
    city_cache: moka::future::Cache<String, Arc<CityInfo>>,
}

impl GeocoderService {
    pub fn new(clients: HttpClients) -> Self {
        let city_cache = moka::future::Cache::builder()
            .time_to_live(Duration::from_secs(CITY_INFO_CACHE_TTL_SECONDS))
            .max_capacity(CITY_INFO_CACHE_MAX_ENTRIES)
            .build();

        GeocoderService {
            clients,
            city_cache,
        }
    }

    /// Resolve a city to its center, bounding box, and country. Cached by
    /// lowercase name; tries `featuretype=city` first, then unrestricted.
    pub async fn resolve_city(&self, city: &str) -> Option<Arc<CityInfo>> {
        let key = city.trim().to_lowercase();
        if let Some(info) = self.city_cache.get(&key).await {
            return Some(info);
        }

        let mut params = vec![
            ("q", city.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("addressdetails", "1".to_string()),
            ("featuretype", "city".to_string()),
        ];

        let mut results = self
            .clients
            .throttled_geocode(get_json_with_retry(
                &self.clients.geocoder,
                NOMINATIM_SEARCH_URL,
                &params,
            ))
            .await
            .and_then(|json| json.as_array().cloned())
            .unwrap_or_default();

        if results.is_empty() {
            params.pop();
            results = self
                .clients
                .throttled_geocode(get_json_with_retry(
                    &self.clients.geocoder,
                    NOMINATIM_SEARCH_URL,
                    &params,
                ))
                .await
                .and_then(|json| json.as_array().cloned())
                .unwrap_or_default();
        }

        let entry = results.first()?;
        let info = Arc::new(parse_city_info(entry)?);

        tracing::info!(
            "City {}: center=({:.4}, {:.4}), country={}",
            city,
            info.center.lat,
            info.center.lng,
            if info.country.is_empty() {
                "unknown"
            } else {
                info.country.as_str()
            }
        );

        self.city_cache.insert(key, info.clone()).await;
        Some(info)
    }

    /// Geocode a place name with strict city validation, in order:
    /// bounded viewbox, then distance-and-country check, then a simple
    /// query accepted only when the city appears in the display name.
    pub async fn geocode_place(&self, name: &str, city: &str) -> Option<GeocodedPlace> {
        let city_info = match self.resolve_city(city).await {
            Some(info) => info,
            None => {
                tracing::info!("Could not resolve city info for {}", city);
                return self.simple_geocode(name, city).await;
            }
        };

        if let Some(place) = self.geocode_with_viewbox(name, &city_info).await {
            return Some(place);
        }

        if let Some(place) = self
            .geocode_with_distance_check(name, city, &city_info)
            .await
        {
            return Some(place);
        }

        tracing::info!("Could not find {} in {}", name, city);
        None
    }

    /// Search within a viewbox padded ~0.3° around the city bbox, with
    /// `bounded=1` so the geocoder cannot wander. First result wins.
    async fn geocode_with_viewbox(&self, name: &str, city_info: &CityInfo) -> Option<GeocodedPlace> {
        let viewbox = city_info.bbox.padded(VIEWBOX_PADDING_DEGREES);
        let params = vec![
            ("q", name.to_string()),
            ("format", "json".to_string()),
            ("limit", "5".to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
            ("viewbox", viewbox.to_viewbox_param()),
            ("bounded", "1".to_string()),
        ];

        let results = self
            .clients
            .throttled_geocode(get_json_with_retry(
                &self.clients.geocoder,
                NOMINATIM_SEARCH_URL,
                &params,
            ))
            .await?;

        let place = results
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(parse_geocoded_place)?;

        let distance = place.coordinates.distance_to(&city_info.center);
        tracing::info!(
            "Found {} via viewbox at ({:.4}, {:.4}), {:.1}km from city center",
            name,
            place.coordinates.lat,
            place.coordinates.lng,
            distance
        );
        Some(place)
    }

    /// Query with the city (and once with the country) in the text, and
    /// reject hits more than 25km from the center or in the wrong country.
    async fn geocode_with_distance_check(
        &self,
        name: &str,
        city: &str,
        city_info: &CityInfo,
    ) -> Option<GeocodedPlace> {
        let queries = [
            format!("{}, {}", name, city),
            format!("{}, {}, {}", name, city, city_info.country),
        ];

        for query in &queries {
            let params = vec![
                ("q", query.clone()),
                ("format", "json".to_string()),
                ("limit", "5".to_string()),
                ("addressdetails", "1".to_string()),
                ("extratags", "1".to_string()),
            ];

            let results = self
                .clients
                .throttled_geocode(get_json_with_retry(
                    &self.clients.geocoder,
                    NOMINATIM_SEARCH_URL,
                    &params,
                ))
                .await
                .and_then(|json| json.as_array().cloned())
                .unwrap_or_default();

            for entry in &results {
                let Some(place) = parse_geocoded_place(entry) else {
                    continue;
                };

                let distance = place.coordinates.distance_to(&city_info.center);
                if distance > MAX_DISTANCE_FROM_CENTER_KM {
                    tracing::info!(
                        "Rejecting {} - {:.1}km from {} center (max: {}km)",
                        name,
                        distance,
                        city,
                        MAX_DISTANCE_FROM_CENTER_KM
                    );
                    continue;
                }

                if !city_info.country_code.is_empty()
                    && !place.country_code.is_empty()
                    && place.country_code != city_info.country_code
                {
                    tracing::info!(
                        "Rejecting {} - wrong country ({} vs {})",
                        name,
                        place.country_code,
                        city_info.country_code
                    );
                    continue;
                }

                tracing::info!(
                    "Found {} at ({:.4}, {:.4}), {:.1}km from city center",
                    name,
                    place.coordinates.lat,
                    place.coordinates.lng,
                    distance
                );
                return Some(place);
            }
        }

        None
    }

    /// Last-resort geocode when city info is unavailable: accept only when
    /// the city name appears in the result's display name.
    async fn simple_geocode(&self, name: &str, city: &str) -> Option<GeocodedPlace> {
        let params = vec![
            ("q", format!("{}, {}", name, city)),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
        ];

        let results = self
            .clients
            .throttled_geocode(get_json_with_retry(
                &self.clients.geocoder,
                NOMINATIM_SEARCH_URL,
                &params,
            ))
            .await?;

        let place = results
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(parse_geocoded_place)?;

        if place
            .display_name
            .to_lowercase()
            .contains(&city.to_lowercase())
        {
            Some(place)
        } else {
            let preview: String = place.display_name.chars().take(100).collect();
            tracing::info!("Rejecting {} - city name not in result: {}", name, preview);
            None
        }
    }

    /// Lift model suggestions into validated POIs. Lookups run in parallel
    /// under the geocoder's concurrency cap; results keep suggestion order
    /// and are deduplicated by name and by near-identical location.
    pub async fn lookup_landmarks(
        &self,
        suggestions: &[LandmarkSuggestion],
        city: &str,
        max_distance_km: Option<f64>,
    ) -> Vec<Poi> {
        let candidates: Vec<&LandmarkSuggestion> =
            suggestions.iter().take(MAX_LANDMARK_LOOKUPS).collect();
        tracing::info!("Looking up {} landmarks in {}", candidates.len(), city);

        let city_center = self.resolve_city(city).await.map(|info| info.center);

        let lookups = candidates.iter().map(|&suggestion| async move {
            let place = self.geocode_place(&suggestion.name, city).await?;
            Some((suggestion, place))
        });
        let results = futures::future::join_all(lookups).await;

        let mut pois = Vec::new();
        let mut seen_names = HashSet::new();
        let mut seen_coords = HashSet::new();

        for (suggestion, place) in results.into_iter().flatten() {
            if !seen_names.insert(suggestion.name.to_lowercase()) {
                continue;
            }

            // Two different names at the same rounded location are one place
            let rounded = place.coordinates.round(4);
            if !seen_coords.insert(format!("{},{}", rounded.lat, rounded.lng)) {
                continue;
            }

            if let (Some(max_km), Some(center)) = (max_distance_km, city_center) {
                let distance = place.coordinates.distance_to(&center);
                if distance > max_km {
                    tracing::info!(
                        "Dropping {} - {:.1}km from {} center (max: {}km)",
                        suggestion.name,
                        distance,
                        city,
                        max_km
                    );
                    continue;
                }
            }

            pois.push(build_landmark_poi(suggestion, &place, city));
        }

        tracing::info!("Found {} valid POIs in {}", pois.len(), city);
        pois
    }

    /// Free-text geocode via Nominatim only.
    pub async fn geocode_with_nominatim(&self, query: &str) -> Option<FreeGeocode> {
        let params = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", "1".to_string()),
            ("addressdetails", "1".to_string()),
        ];

        let results = self
            .clients
            .throttled_geocode(get_json_with_retry(
                &self.clients.geocoder,
                NOMINATIM_SEARCH_URL,
                &params,
            ))
            .await?;

        let entry = results.as_array()?.first()?.clone();
        let place = parse_geocoded_place(&entry)?;
        Some(FreeGeocode {
            coordinates: place.coordinates,
            display_name: place.display_name,
            source: "nominatim",
        })
    }

    /// Free-text geocode via Photon (often better for European addresses).
    /// Prefers results whose city property matches the requested city.
    pub async fn geocode_with_photon(&self, query: &str, city: &str) -> Option<FreeGeocode> {
        let params = vec![("q", query.to_string()), ("limit", "5".to_string())];

        let data =
            get_json_with_retry(&self.clients.geocoder, PHOTON_URL, &params).await?;
        let features = data.get("features")?.as_array()?;

        let parse_feature = |feature: &serde_json::Value| -> Option<FreeGeocode> {
            let coords = feature.get("geometry")?.get("coordinates")?.as_array()?;
            let lng = coords.first()?.as_f64()?;
            let lat = coords.get(1)?.as_f64()?;
            let props = feature.get("properties");
            let prop = |key: &str| -> String {
                props
                    .and_then(|p| p.get(key))
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            let display = format!(
                "{} {}, {}",
                prop("street"),
                prop("housenumber"),
                prop("city")
            )
            .trim_matches([' ', ','])
            .to_string();
            Some(FreeGeocode {
                coordinates: Coordinates::new(lat, lng).ok()?,
                display_name: display,
                source: "photon",
            })
        };

        if !city.is_empty() {
            let city_lower = city.to_lowercase();
            for feature in features {
                let feature_city = feature
                    .get("properties")
                    .and_then(|p| p.get("city").or_else(|| p.get("locality")))
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_lowercase();
                if !feature_city.is_empty()
                    && (feature_city.contains(&city_lower) || city_lower.contains(&feature_city))
                {
                    if let Some(result) = parse_feature(feature) {
                        return Some(result);
                    }
                }
            }
        }

        features.first().and_then(parse_feature)
    }

    /// Geocode a starting address: both geocoders run concurrently and the
    /// first valid result wins (Nominatim preferred on a tie). Returns a
    /// synthetic starting-location POI or None.
    pub async fn geocode_address(&self, address: &str, city: &str) -> Option<Poi> {
        let queries = [format!("{}, {}", address, city), address.to_string()];

        for query in &queries {
            let (nominatim, photon) = tokio::join!(
                self.geocode_with_nominatim(query),
                self.geocode_with_photon(query, city),
            );

            if let Some(result) = nominatim.or(photon) {
                tracing::info!(
                    "Geocoded starting location via {}: {}, {}",
                    result.source,
                    result.coordinates.lat,
                    result.coordinates.lng
                );
                let mut poi = Poi::new(
                    "starting_location".to_string(),
                    address.to_string(),
                    result.coordinates,
                    maps_search_url(address),
                )
                .with_confidence(1.0);
                poi.address = Some(if result.display_name.is_empty() {
                    address.to_string()
                } else {
                    result.display_name.chars().take(100).collect()
                });
                poi.types = Some(vec!["starting_point".to_string()]);
                return Some(poi);
            }
        }

        None
    }

    /// Geocode many names in parallel with a per-item timeout. Failures
    /// surface as `None` so the rest of the batch still succeeds.
    pub async fn batch_geocode(
        &self,
        names: &[String],
        city: &str,
    ) -> Vec<Option<FreeGeocode>> {
        let lookups = names.iter().map(|name| async move {
            let query = format!("{}, {}", name, city);
            tokio::time::timeout(
                Duration::from_secs(IMAGE_TIMEOUT_SECONDS),
                async {
                    match self.geocode_with_nominatim(&query).await {
                        Some(result) => Some(result),
                        None => self.geocode_with_photon(&query, city).await,
                    }
                },
            )
            .await
            .ok()
            .flatten()
        });

        futures::future::join_all(lookups).await
    }

    /// Look up a previously-issued `osm_{type}_{id}` place id.
    pub async fn get_place_details(&self, place_id: &str) -> Result<Poi> {
        let mut parts = place_id.split('_');
        let prefix = parts.next().unwrap_or("");
        let osm_type = parts.next().unwrap_or("");
        let osm_id = parts.next().unwrap_or("");

        if prefix != "osm" || osm_type.is_empty() || osm_id.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Invalid place_id format: {}",
                place_id
            )));
        }

        let type_letter = osm_type
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('N');
        let params = vec![
            ("osm_ids", format!("{}{}", type_letter, osm_id)),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
        ];

        let results = self
            .clients
            .throttled_geocode(get_json_with_retry(
                &self.clients.geocoder,
                NOMINATIM_LOOKUP_URL,
                &params,
            ))
            .await
            .ok_or_else(|| AppError::GeocoderApi("Place lookup failed".to_string()))?;

        let entry = results
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or_else(|| AppError::InvalidInput(format!("Place not found: {}", place_id)))?
            .clone();

        parse_lookup_poi(&entry)
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid place data: {}", place_id)))
    }
}

fn parse_city_info(entry: &serde_json::Value) -> Option<CityInfo> {
    let lat: f64 = entry.get("lat")?.as_str()?.parse().ok()?;
    let lng: f64 = entry.get("lon")?.as_str()?.parse().ok()?;
    let center = Coordinates::new(lat, lng).ok()?;

    // Nominatim bounding boxes come as [south, north, west, east] strings
    let bb = entry.get("boundingbox")?.as_array()?;
    let parse_edge = |i: usize| -> Option<f64> { bb.get(i)?.as_str()?.parse().ok() };
    let bbox = BoundingBox::new(
        parse_edge(0)?,
        parse_edge(2)?,
        parse_edge(1)?,
        parse_edge(3)?,
    );

    let address = entry.get("address");
    let field = |key: &str| -> String {
        address
            .and_then(|a| a.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    Some(CityInfo {
        center,
        bbox,
        country: field("country"),
        country_code: field("country_code").to_lowercase(),
        display_name: entry
            .get("display_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
    })
}

fn parse_geocoded_place(entry: &serde_json::Value) -> Option<GeocodedPlace> {
    let lat: f64 = entry.get("lat")?.as_str()?.parse().ok()?;
    let lng: f64 = entry.get("lon")?.as_str()?.parse().ok()?;
    if lat == 0.0 && lng == 0.0 {
        return None;
    }
    let coordinates = Coordinates::new(lat, lng).ok()?;

    let string_of = |value: Option<&serde_json::Value>| -> String {
        value.and_then(|v| v.as_str()).unwrap_or("").to_string()
    };

    Some(GeocodedPlace {
        coordinates,
        display_name: string_of(entry.get("display_name")),
        osm_type: {
            let t = string_of(entry.get("osm_type"));
            if t.is_empty() {
                "node".to_string()
            } else {
                t
            }
        },
        osm_id: entry
            .get("osm_id")
            .map(|v| match v {
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::String(s) => s.clone(),
                _ => String::new(),
            })
            .unwrap_or_default(),
        country_code: string_of(
            entry
                .get("address")
                .and_then(|a| a.get("country_code")),
        )
        .to_lowercase(),
        opening_hours: entry
            .get("extratags")
            .and_then(|e| e.get("opening_hours"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
    })
}

fn build_landmark_poi(suggestion: &LandmarkSuggestion, place: &GeocodedPlace, city: &str) -> Poi {
    let address_parts: Vec<&str> = place.display_name.split(',').take(3).collect();
    let short_address = if address_parts.is_empty() {
        city.to_string()
    } else {
        address_parts.join(",").trim().to_string()
    };

    let mut poi = Poi::new(
        format!("osm_{}_{}", place.osm_type, place.osm_id),
        suggestion.name.clone(),
        place.coordinates,
        maps_search_url(&format!("{}, {}", suggestion.name, city)),
    )
    .with_confidence(0.95);

    poi.opening_hours = place
        .opening_hours
        .as_deref()
        .map(OpeningHours::from_display_text);
    poi.address = Some(short_address);
    poi.types = Some(vec![suggestion.category.clone()]);
    poi.visit_duration_minutes = Some((suggestion.visit_duration_hours * 60.0) as u32);
    poi.why_visit = if suggestion.why_visit.is_empty() {
        None
    } else {
        Some(suggestion.why_visit.clone())
    };
    poi.admission = suggestion.admission.clone();
    poi.admission_url = suggestion.admission_url.clone();
    poi
}

fn parse_lookup_poi(entry: &serde_json::Value) -> Option<Poi> {
    let place = parse_geocoded_place(entry)?;

    let name = entry
        .get("name")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| {
            place
                .display_name
                .split(',')
                .next()
                .map(|s| s.trim().to_string())
        })
        .filter(|s| !s.is_empty())?;

    let category = {
        let osm_type = entry.get("type").and_then(|v| v.as_str()).unwrap_or("");
        let osm_class = entry.get("class").and_then(|v| v.as_str()).unwrap_or("");
        if !osm_type.is_empty() {
            osm_type.to_string()
        } else {
            osm_class.to_string()
        }
    };

    let address_parts: Vec<&str> = place.display_name.split(',').take(3).collect();

    let mut poi = Poi::new(
        format!("osm_{}_{}", place.osm_type, place.osm_id),
        name.clone(),
        place.coordinates,
        maps_search_url(&name),
    );
    poi.opening_hours = place
        .opening_hours
        .as_deref()
        .map(OpeningHours::from_display_text);
    poi.address = Some(address_parts.join(",").trim().to_string());
    poi.types = if category.is_empty() {
        None
    } else {
        Some(vec![category])
    };
    Some(poi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_url_encodes_query() {
        let url = maps_search_url("Ulm Minster, Ulm");
        assert_eq!(
            url,
            "https://www.google.com/maps/search/?api=1&query=Ulm%20Minster%2C%20Ulm"
        );
    }

    #[test]
    fn parse_city_info_reorders_bbox_edges() {
        let entry = json!({
            "lat": "48.3984",
            "lon": "9.9916",
            "display_name": "Ulm, Baden-Württemberg, Germany",
            "boundingbox": ["48.3349", "48.4467", "9.9107", "10.0469"],
            "address": {"country": "Germany", "country_code": "DE"},
        });
        let info = parse_city_info(&entry).unwrap();
        assert!((info.center.lat - 48.3984).abs() < 1e-9);
        assert!((info.bbox.south - 48.3349).abs() < 1e-9);
        assert!((info.bbox.north - 48.4467).abs() < 1e-9);
        assert!((info.bbox.west - 9.9107).abs() < 1e-9);
        assert!((info.bbox.east - 10.0469).abs() < 1e-9);
        assert_eq!(info.country_code, "de");
    }

    #[test]
    fn parse_geocoded_place_rejects_null_island() {
        let entry = json!({"lat": "0", "lon": "0", "display_name": "nowhere"});
        assert!(parse_geocoded_place(&entry).is_none());
    }

    #[test]
    fn parse_geocoded_place_extracts_fields() {
        let entry = json!({
            "lat": "48.39841",
            "lon": "9.99155",
            "display_name": "Ulmer Münster, Münsterplatz, Ulm, Germany",
            "osm_type": "way",
            "osm_id": 24906425,
            "address": {"country_code": "de"},
            "extratags": {"opening_hours": "Mo-Su 09:00-19:00"},
        });
        let place = parse_geocoded_place(&entry).unwrap();
        assert_eq!(place.osm_type, "way");
        assert_eq!(place.osm_id, "24906425");
        assert_eq!(place.country_code, "de");
        assert_eq!(place.opening_hours.as_deref(), Some("Mo-Su 09:00-19:00"));
    }

    #[test]
    fn landmark_poi_carries_suggestion_metadata() {
        let suggestion = LandmarkSuggestion {
            name: "Ulm Minster".to_string(),
            category: "church".to_string(),
            why_visit: "Tallest church tower in the world".to_string(),
            visit_duration_hours: 1.5,
            specialty: String::new(),
            admission: Some("free".to_string()),
            admission_url: None,
        };
        let place = GeocodedPlace {
            coordinates: Coordinates::new(48.39841, 9.99155).unwrap(),
            display_name: "Ulmer Münster, Münsterplatz, Ulm, Germany".to_string(),
            osm_type: "way".to_string(),
            osm_id: "24906425".to_string(),
            country_code: "de".to_string(),
            opening_hours: None,
        };

        let poi = build_landmark_poi(&suggestion, &place, "Ulm");
        assert_eq!(poi.place_id, "osm_way_24906425");
        assert!(poi.is_spatial_sourced());
        assert_eq!(poi.visit_duration_minutes, Some(90));
        assert_eq!(poi.types.as_deref(), Some(&["church".to_string()][..]));
        assert_eq!(poi.admission.as_deref(), Some("free"));
        assert!((poi.confidence - 0.95).abs() < 1e-9);
        assert_eq!(
            poi.address.as_deref(),
            Some("Ulmer Münster, Münsterplatz, Ulm")
        );
    }
}
