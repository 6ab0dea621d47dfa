use crate::error::{AppError, Result};
use crate::models::{validate_poi, Coordinates, Itinerary, Poi, TimeConstraint, TransportMode, Warning};
use crate::services::itinerary::ItineraryParams;
use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CreateItineraryRequest {
    pub location: String,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub time_available: Option<TimeConstraint>,
    #[serde(default)]
    pub starting_location: Option<String>,
    #[serde(default)]
    pub starting_coordinates: Option<RawCoordinates>,
}

/// Coordinates as raw numbers so range validation happens in one place.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawCoordinates {
    pub lat: f64,
    pub lng: f64,
}

impl CreateItineraryRequest {
    fn validate(&self) -> Result<Option<Coordinates>> {
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("location must not be empty".to_string()));
        }
        match self.starting_coordinates {
            Some(raw) => Coordinates::new(raw.lat, raw.lng)
                .map(Some)
                .map_err(AppError::Validation),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub success: bool,
    pub itinerary: Itinerary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<Warning>>,
}

/// POST /itinerary - the full pipeline.
pub async fn create_itinerary(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateItineraryRequest>,
) -> Result<Json<ItineraryResponse>> {
    let starting_coordinates = request.validate()?;

    tracing::info!(
        "Itinerary request: location={}, mode={}, time={:?}",
        request.location,
        request.transport_mode,
        request.time_available
    );

    let params = ItineraryParams {
        location: request.location,
        transport_mode: request.transport_mode,
        interests: request.interests,
        time_available: request.time_available,
        starting_location: request.starting_location,
        starting_coordinates,
    };

    let (itinerary, warnings) = state.itinerary_service.create_itinerary(&params).await?;

    Ok(Json(ItineraryResponse {
        success: true,
        itinerary,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct RouteFromSelectionRequest {
    #[serde(default)]
    pub city: Option<String>,
    /// Raw POI objects; each is validated for required fields before use
    pub pois: Vec<serde_json::Value>,
    #[serde(default)]
    pub transport_mode: TransportMode,
    #[serde(default = "default_num_days")]
    pub num_days: usize,
    #[serde(default)]
    pub starting_coordinates: Option<RawCoordinates>,
}

fn default_num_days() -> usize {
    1
}

/// POST /route/from-selection - assemble from caller-provided POIs.
/// Selected POIs skip the locality filter, but objects missing required
/// fields are dropped silently.
pub async fn create_route_from_selection(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RouteFromSelectionRequest>,
) -> Result<Json<ItineraryResponse>> {
    if request.pois.is_empty() {
        return Err(AppError::Validation("pois must not be empty".to_string()));
    }
    let starting_coordinates = match request.starting_coordinates {
        Some(raw) => Some(Coordinates::new(raw.lat, raw.lng).map_err(AppError::Validation)?),
        None => None,
    };

    let mut pois: Vec<Poi> = Vec::with_capacity(request.pois.len());
    for raw in &request.pois {
        let result = validate_poi(raw);
        if !result.is_valid {
            tracing::info!(
                "Dropping selected POI, missing fields: {}",
                result.missing_fields.join(", ")
            );
            continue;
        }
        // Prefer the full object; the validator's minimal POI covers
        // payloads whose optional fields don't deserialize
        match serde_json::from_value::<Poi>(raw.clone()) {
            Ok(poi) => pois.push(poi),
            Err(_) => {
                if let Some(poi) = result.poi {
                    pois.push(poi);
                }
            }
        }
    }

    if pois.is_empty() {
        return Err(AppError::InvalidInput(
            "No valid POIs in selection".to_string(),
        ));
    }

    let city = request
        .city
        .clone()
        .unwrap_or_else(|| "Selected places".to_string());

    let itinerary = state
        .itinerary_service
        .create_route_from_selection(
            &city,
            &pois,
            request.transport_mode,
            request.num_days,
            starting_coordinates,
        )
        .await?;

    Ok(Json(ItineraryResponse {
        success: true,
        itinerary,
        warnings: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validation_rejects_blank_location() {
        let request = CreateItineraryRequest {
            location: "   ".to_string(),
            transport_mode: TransportMode::Walking,
            interests: None,
            time_available: None,
            starting_location: None,
            starting_coordinates: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_validation_rejects_bad_coordinates() {
        let request = CreateItineraryRequest {
            location: "Paris".to_string(),
            transport_mode: TransportMode::Walking,
            interests: None,
            time_available: None,
            starting_location: None,
            starting_coordinates: Some(RawCoordinates {
                lat: 95.0,
                lng: 2.0,
            }),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: CreateItineraryRequest = serde_json::from_str(
            r#"{"location": "Ulm", "interests": ["landmarks", "history"], "time_available": "day"}"#,
        )
        .unwrap();
        assert_eq!(request.transport_mode, TransportMode::Walking);
        assert_eq!(request.time_available, Some(TimeConstraint::Day));
        assert!(request.starting_coordinates.is_none());
        assert!(request.validate().is_ok());
    }
}
