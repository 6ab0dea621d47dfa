use crate::error::{AppError, Result};
use crate::models::{OpeningHours, Poi};
use crate::services::geocoder::maps_search_url;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct PlaceDetailsResponse {
    pub success: bool,
    pub place: Poi,
    pub cached: bool,
}

/// GET /places/{place_id} - cached single-POI lookup.
pub async fn get_place_details(
    State(state): State<Arc<AppState>>,
    Path(place_id): Path<String>,
) -> Result<Json<PlaceDetailsResponse>> {
    if place_id.trim().is_empty() {
        return Err(AppError::Validation(
            "place_id must not be empty".to_string(),
        ));
    }

    let (place, cached) = state.itinerary_service.get_place_details(&place_id).await?;

    Ok(Json(PlaceDetailsResponse {
        success: true,
        place,
        cached,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LookupPoisRequest {
    pub places: Vec<LookupPlace>,
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct LookupPlace {
    pub name: String,
    #[serde(default = "default_place_type")]
    pub r#type: String,
    #[serde(default, rename = "whyVisit")]
    pub why_visit: String,
    #[serde(default = "default_estimated_minutes", rename = "estimatedMinutes")]
    pub estimated_minutes: u32,
}

fn default_place_type() -> String {
    "landmark".to_string()
}

fn default_estimated_minutes() -> u32 {
    60
}

#[derive(Debug, Serialize)]
pub struct LookupPoisResponse {
    pub success: bool,
    pub pois: Vec<Poi>,
}

/// POST /pois/lookup - lift a list of place names into enriched POIs:
/// geocode each, fetch an image, assemble the full object. Failed names
/// are dropped; the rest succeed.
pub async fn lookup_pois(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LookupPoisRequest>,
) -> Result<Json<LookupPoisResponse>> {
    if request.city.trim().is_empty() {
        return Err(AppError::Validation("city must not be empty".to_string()));
    }

    let city = request.city.clone();
    let lookups = request.places.iter().map(|place| {
        let state = state.clone();
        let city = city.clone();
        async move {
            if place.name.is_empty() {
                return None;
            }

            let geocoded = state.geocoder.geocode_place(&place.name, &city).await?;
            let image = state
                .wikipedia
                .get_image_for_landmark(&place.name, &city)
                .await;

            let mut poi = Poi::new(
                lookup_place_id(&place.name),
                place.name.clone(),
                geocoded.coordinates,
                maps_search_url(&format!("{}, {}", place.name, city)),
            )
            .with_confidence(0.85);
            poi.opening_hours = geocoded
                .opening_hours
                .as_deref()
                .map(OpeningHours::from_display_text);
            poi.photos = image.map(|url| vec![url]);
            poi.address = Some(geocoded.display_name.chars().take(150).collect());
            poi.types = Some(vec![place.r#type.clone()]);
            poi.visit_duration_minutes = Some(place.estimated_minutes);
            poi.why_visit = if place.why_visit.is_empty() {
                None
            } else {
                Some(place.why_visit.clone())
            };
            Some(poi)
        }
    });

    let pois: Vec<Poi> = futures::future::join_all(lookups)
        .await
        .into_iter()
        .flatten()
        .collect();

    Ok(Json(LookupPoisResponse { success: true, pois }))
}

/// Stable synthetic place id for name-lookup POIs (they have no OSM id
/// at this point in the flow).
fn lookup_place_id(name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    format!(
        "ai_{}_{}",
        name.to_lowercase().replace(' ', "_"),
        hasher.finish() % 10_000
    )
}
